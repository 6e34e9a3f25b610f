use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::GatewayConfig,
    data_objects::{NotificationPayload, SessionRequest, SessionResponse, TransactionStatusResponse, VerifiedNotification},
    helpers::parse_gateway_amount,
    GatewayApiError,
};

#[derive(Clone)]
pub struct GatewayApi {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl GatewayApi {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let auth = format!("Basic {}", base64::encode(format!("{}:", config.server_key.reveal())));
        let mut val = HeaderValue::from_str(&auth).map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<B>,
    ) -> Result<T, GatewayApiError> {
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| GatewayApiError::RestRequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::RestResponseError(e.to_string()))?;
            Err(GatewayApiError::QueryError { status, message })
        }
    }

    /// Asks the gateway for the current state of the payment with the given order reference.
    pub async fn fetch_status(&self, order_id: &str) -> Result<TransactionStatusResponse, GatewayApiError> {
        let url = format!("{}/v2/{order_id}/status", self.config.base_url);
        debug!("Fetching gateway status for {order_id}");
        let status = self.rest_query::<TransactionStatusResponse, ()>(Method::GET, &url, None).await?;
        trace!("Gateway status for {order_id}: {status:?}");
        Ok(status)
    }

    /// Establishes that a raw notification body came from the gateway.
    ///
    /// The signature is checked against the server key first. Since a valid signature only proves that the gateway
    /// produced the payload at *some* point, the current status is then fetched from the gateway and that answer is
    /// what gets returned. A notification for an order the gateway doesn't know about is rejected.
    pub async fn verify_notification(&self, raw: &[u8]) -> Result<VerifiedNotification, GatewayApiError> {
        let payload = NotificationPayload::from_bytes(raw)?;
        if self.config.server_key.is_empty() || !payload.has_valid_signature(self.config.server_key.reveal()) {
            warn!("Rejecting notification for {}: signature mismatch", payload.order_id);
            return Err(GatewayApiError::InvalidSignature);
        }
        let status = self.fetch_status(&payload.order_id).await?;
        let order_id = status.order_id.clone().unwrap_or_else(|| payload.order_id.clone());
        if order_id != payload.order_id {
            return Err(GatewayApiError::StatusMismatch(payload.order_id, format!("gateway returned order {order_id}")));
        }
        let transaction_status = status.transaction_status.ok_or_else(|| {
            let msg = status.status_message.unwrap_or_else(|| format!("status code {}", status.status_code));
            GatewayApiError::StatusMismatch(payload.order_id.clone(), msg)
        })?;
        if transaction_status != payload.transaction_status {
            info!(
                "Notification for {order_id} said '{}', but the gateway now reports '{transaction_status}'. Using the \
                 gateway's answer.",
                payload.transaction_status
            );
        }
        let gross_amount = parse_gateway_amount(status.gross_amount.as_deref().unwrap_or(&payload.gross_amount))?;
        Ok(VerifiedNotification {
            order_id,
            transaction_status,
            fraud_status: status.fraud_status.or(payload.fraud_status),
            gross_amount,
        })
    }

    /// Opens a hosted payment page for an order.
    pub async fn create_session(&self, request: SessionRequest) -> Result<SessionResponse, GatewayApiError> {
        let url = format!("{}/v1/transactions", self.config.snap_url);
        let order_id = request.transaction_details.order_id.clone();
        debug!("Creating payment session for {order_id}");
        let session = self.rest_query::<SessionResponse, SessionRequest>(Method::POST, &url, Some(request)).await?;
        info!("Payment session created for {order_id}");
        Ok(session)
    }
}
