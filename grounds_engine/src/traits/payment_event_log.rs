use crate::{
    db_types::{NewPaymentEvent, PaymentEvent},
    traits::StorageError,
};

/// Append-only log of verified payment notifications and what was done with them.
#[allow(async_fn_in_trait)]
pub trait PaymentEventLog {
    async fn append_payment_event(&self, event: NewPaymentEvent) -> Result<PaymentEvent, StorageError>;

    /// In the order they were received.
    async fn fetch_payment_events(&self, external_ref: &str) -> Result<Vec<PaymentEvent>, StorageError>;
}
