use grounds_engine::{
    traits::{GatewayError, GatewayNotification, PaymentSession, PaymentSessionRequest},
    PaymentGateway,
};
use mockall::mock;

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn verify_notification(&self, raw_payload: &[u8]) -> Result<GatewayNotification, GatewayError>;
        async fn create_payment_session(&self, request: PaymentSessionRequest) -> Result<PaymentSession, GatewayError>;
    }
}

pub fn notification(external_ref: &str, transaction_status: &str, fraud_status: Option<&str>) -> GatewayNotification {
    GatewayNotification {
        external_ref: external_ref.to_string(),
        transaction_status: transaction_status.to_string(),
        fraud_status: fraud_status.map(String::from),
        gross_amount: None,
    }
}
