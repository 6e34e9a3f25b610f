use crate::traits::{CartManagement, InventoryManagement, PaymentEventLog, StorageError, TransactionManagement};

/// The full set of behaviour a backend needs to run the marketplace engine.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase:
    Clone + InventoryManagement + TransactionManagement + CartManagement + PaymentEventLog
{
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes all connections. The backend cannot be used afterwards.
    async fn close(&mut self) -> Result<(), StorageError>;
}
