use crate::{events::NotificationEvent, traits::StorageError};

/// Somewhere to put outbound notifications. The engine never reads them back.
#[allow(async_fn_in_trait)]
pub trait NotificationSink {
    async fn enqueue(&self, notification: &NotificationEvent) -> Result<(), StorageError>;
}
