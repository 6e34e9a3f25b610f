use thiserror::Error;

use crate::{
    db_types::TransactionStatus,
    traits::{GatewayError, StorageError},
};

/// Every error the marketplace APIs return.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Malformed input: a non-positive quantity, a negative amount, a buyer ordering their own product.
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    /// The actor may not perform the requested action.
    #[error("Not allowed: {0}")]
    Authorization(String),
    /// The requested status change is not an edge of the lifecycle graph from the current status.
    #[error("Cannot move transaction #{id} from {from} to {to}. Allowed next statuses: [{}]", display_statuses(.allowed))]
    StateConflict { id: i64, from: TransactionStatus, to: TransactionStatus, allowed: Vec<TransactionStatus> },
    /// The stock needed to confirm the order is no longer available.
    #[error("Insufficient stock to confirm transaction #{0}")]
    Concurrency(i64),
    #[error("Payment gateway error: {0}")]
    ExternalService(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl MarketError {
    /// The taxonomy name of the error, as reported to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            MarketError::Validation(_) => "ValidationError",
            MarketError::NotFound(_) => "NotFoundError",
            MarketError::Authorization(_) => "AuthorizationError",
            MarketError::StateConflict { .. } => "StateConflictError",
            MarketError::Concurrency(_) => "ConcurrencyError",
            MarketError::ExternalService(_) => "ExternalServiceError",
            MarketError::Storage(_) => "StorageError",
        }
    }
}

fn display_statuses(statuses: &[TransactionStatus]) -> String {
    statuses.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
}

impl From<StorageError> for MarketError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::ProductNotFound(id) => MarketError::NotFound(format!("Product #{id}")),
            StorageError::TransactionNotFound(id) => MarketError::NotFound(format!("Transaction #{id}")),
            e => MarketError::Storage(e.to_string()),
        }
    }
}

impl From<GatewayError> for MarketError {
    fn from(e: GatewayError) -> Self {
        MarketError::ExternalService(e.to_string())
    }
}
