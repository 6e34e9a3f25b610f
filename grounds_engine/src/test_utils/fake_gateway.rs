use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use gm_common::Rupiah;

use crate::traits::{GatewayError, GatewayNotification, PaymentGateway, PaymentSession, PaymentSessionRequest};

/// A stand-in payment gateway.
///
/// It trusts any payload that parses as a [`GatewayNotification`] in JSON, unless it has been told to reject
/// everything. Sessions are issued with a token derived from the reference.
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    reject_notifications: bool,
    unavailable: bool,
    sessions: Arc<AtomicUsize>,
}

impl FakeGateway {
    /// Every notification fails verification.
    pub fn rejecting() -> Self {
        Self { reject_notifications: true, ..Default::default() }
    }

    /// Every call fails as if the gateway were down.
    pub fn unavailable() -> Self {
        Self { unavailable: true, ..Default::default() }
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    /// A notification that does not report an amount.
    pub fn payload(external_ref: &str, transaction_status: &str, fraud_status: Option<&str>) -> Vec<u8> {
        let notification = GatewayNotification {
            external_ref: external_ref.to_string(),
            transaction_status: transaction_status.to_string(),
            fraud_status: fraud_status.map(String::from),
            gross_amount: None,
        };
        serde_json::to_vec(&notification).expect("Notification serializes")
    }

    pub fn payload_with_amount(external_ref: &str, transaction_status: &str, gross_amount: Rupiah) -> Vec<u8> {
        let notification = GatewayNotification {
            external_ref: external_ref.to_string(),
            transaction_status: transaction_status.to_string(),
            fraud_status: None,
            gross_amount: Some(gross_amount),
        };
        serde_json::to_vec(&notification).expect("Notification serializes")
    }
}

impl PaymentGateway for FakeGateway {
    async fn verify_notification(&self, raw_payload: &[u8]) -> Result<GatewayNotification, GatewayError> {
        if self.unavailable {
            return Err(GatewayError::Unavailable("fake gateway is down".to_string()));
        }
        if self.reject_notifications {
            return Err(GatewayError::Unverifiable("signature mismatch".to_string()));
        }
        serde_json::from_slice(raw_payload).map_err(|e| GatewayError::Unverifiable(e.to_string()))
    }

    async fn create_payment_session(&self, request: PaymentSessionRequest) -> Result<PaymentSession, GatewayError> {
        if self.unavailable {
            return Err(GatewayError::Unavailable("fake gateway is down".to_string()));
        }
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentSession {
            token: format!("token-{}", request.external_ref),
            redirect_url: format!("https://pay.example.test/{}", request.external_ref),
        })
    }
}
