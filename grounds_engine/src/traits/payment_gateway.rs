use gm_common::Rupiah;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The payload could not be authenticated, or the gateway does not agree with it.
    #[error("Notification could not be verified: {0}")]
    Unverifiable(String),
    /// The gateway could not be reached, or returned an error.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// A notification the gateway has vouched for, in the gateway's own vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayNotification {
    pub external_ref: String,
    pub transaction_status: String,
    pub fraud_status: Option<String>,
    /// The amount paid, if the gateway reports one.
    #[serde(default)]
    pub gross_amount: Option<Rupiah>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSessionRequest {
    pub external_ref: String,
    pub gross_amount: Rupiah,
    pub buyer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
}

/// The external payment provider.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Authenticates a raw notification body and returns the gateway's current view of the payment it refers to.
    async fn verify_notification(&self, raw_payload: &[u8]) -> Result<GatewayNotification, GatewayError>;

    /// Opens a payment session for an order and returns the means for the buyer to pay.
    async fn create_payment_session(&self, request: PaymentSessionRequest) -> Result<PaymentSession, GatewayError>;
}
