use gateway_tools::{GatewayApi, GatewayApiError, GatewayConfig, SessionRequest, TransactionDetails};
use grounds_engine::{
    traits::{GatewayError, GatewayNotification, PaymentSession, PaymentSessionRequest},
    PaymentGateway,
};
use log::*;

/// The live payment gateway, as the engine sees it.
#[derive(Clone)]
pub struct GatewayClient {
    api: GatewayApi,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        if config.server_key.is_empty() {
            warn!("💳️ No gateway server key is configured. Every payment notification will be rejected.");
        }
        Ok(Self { api: GatewayApi::new(config)? })
    }
}

fn to_gateway_error(e: GatewayApiError) -> GatewayError {
    if e.is_transient() {
        GatewayError::Unavailable(e.to_string())
    } else {
        GatewayError::Unverifiable(e.to_string())
    }
}

impl PaymentGateway for GatewayClient {
    async fn verify_notification(&self, raw_payload: &[u8]) -> Result<GatewayNotification, GatewayError> {
        let verified = self.api.verify_notification(raw_payload).await.map_err(to_gateway_error)?;
        trace!("💳️ Verified notification for {}: {verified:?}", verified.order_id);
        Ok(GatewayNotification {
            external_ref: verified.order_id,
            transaction_status: verified.transaction_status,
            fraud_status: verified.fraud_status,
            gross_amount: Some(verified.gross_amount),
        })
    }

    async fn create_payment_session(&self, request: PaymentSessionRequest) -> Result<PaymentSession, GatewayError> {
        // The buyer's contact details live with the auth service, so none are sent.
        let request = SessionRequest {
            transaction_details: TransactionDetails {
                order_id: request.external_ref,
                gross_amount: request.gross_amount.value(),
            },
            customer_details: None,
        };
        let session = self.api.create_session(request).await.map_err(to_gateway_error)?;
        Ok(PaymentSession { token: session.token, redirect_url: session.redirect_url })
    }
}
