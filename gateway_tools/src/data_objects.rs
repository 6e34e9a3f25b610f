use gm_common::Rupiah;
use serde::{Deserialize, Serialize};

use crate::{helpers::notification_signature, GatewayApiError};

/// The HTTP notification body the gateway POSTs to us. Only the fields we act on are typed; the gateway sends more.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotificationPayload {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_time: Option<String>,
}

impl NotificationPayload {
    pub fn from_bytes(raw: &[u8]) -> Result<Self, GatewayApiError> {
        serde_json::from_slice(raw).map_err(|e| GatewayApiError::JsonError(e.to_string()))
    }

    pub fn has_valid_signature(&self, server_key: &str) -> bool {
        let expected = notification_signature(&self.order_id, &self.status_code, &self.gross_amount, server_key);
        expected.eq_ignore_ascii_case(self.signature_key.trim())
    }
}

/// Response of the gateway's `GET /v2/{order_id}/status` endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TransactionStatusResponse {
    pub status_code: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
}

/// A notification whose authenticity has been established, carrying the gateway's own view of the payment state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedNotification {
    pub order_id: String,
    pub transaction_status: String,
    pub fraud_status: Option<String>,
    pub gross_amount: Rupiah,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub transaction_details: TransactionDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub redirect_url: String,
}
