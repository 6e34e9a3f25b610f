use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database driver error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Product #{0} does not exist")]
    ProductNotFound(i64),
    #[error("Transaction #{0} does not exist")]
    TransactionNotFound(i64),
    #[error("Stored data is inconsistent: {0}")]
    Inconsistent(String),
}
