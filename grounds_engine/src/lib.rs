//! Grounds Market engine
//!
//! The order lifecycle and payment reconciliation engine for a coffee-waste marketplace. It keeps product stock,
//! transaction status and outbound notifications consistent while buyers and sellers act concurrently and the payment
//! gateway delivers its notifications late, twice, or out of order.
//!
//! The library is divided into two main sections:
//! 1. Storage ([`traits`] and the SQLite backend). The traits define what a backend must do. [`SqliteDatabase`] is
//!    the bundled implementation. The stored data types live in [`db_types`].
//! 2. The public API ([`mod@market_api`]). Each API is generic over the backend traits it needs.
//!
//! The engine publishes events (notifications for participants, and status changes) through the stateless hooks in
//! [`events`]. The server subscribes to them, e.g. to persist notifications.
pub mod db_types;
pub mod events;
mod market_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use market_api::{
    checkout_api::CheckoutApi,
    errors::MarketError,
    inventory_api::InventoryApi,
    order_flow_api::{OrderFlowApi, EXPIRY_NOTE},
    participant_api::ParticipantApi,
    payment_api::{PaymentApi, PaymentState},
    transaction_objects,
    transitions,
};
pub use traits::{
    CartManagement,
    InventoryManagement,
    MarketplaceDatabase,
    NotificationSink,
    PaymentEventLog,
    PaymentGateway,
    StorageError,
    TransactionManagement,
};
