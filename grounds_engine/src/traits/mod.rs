//! # Backend contracts
//!
//! The traits in this module are what a storage backend must provide to drive the marketplace engine. The engine's
//! public APIs are generic over these traits; [`crate::SqliteDatabase`] is the bundled implementation.
//!
//! * [`InventoryManagement`] owns product stock. Its conditional decrement is the only place stock is ever taken.
//! * [`TransactionManagement`] stores orders and their status history. Status changes are compare-and-swap on the
//!   expected current status, and carry their stock effect with them so both commit (or neither does).
//! * [`CartManagement`] holds buyers' cart selections.
//! * [`PaymentEventLog`] is the append-only record of verified payment notifications.
//! * [`NotificationSink`] accepts outbound notifications.
//!
//! [`PaymentGateway`] is the contract for the external payment provider. It is not a storage concern but lives here
//! for the same reason: the engine only ever sees it through a trait bound.
mod cart_management;
mod data_objects;
mod errors;
mod inventory_management;
mod marketplace_database;
mod notification_sink;
mod payment_event_log;
mod payment_gateway;
mod transaction_management;

pub use cart_management::CartManagement;
pub use data_objects::{StockEffect, TransactionQueryFilter, TransitionOutcome, TransitionUpdate};
pub use errors::StorageError;
pub use inventory_management::InventoryManagement;
pub use marketplace_database::MarketplaceDatabase;
pub use notification_sink::NotificationSink;
pub use payment_event_log::PaymentEventLog;
pub use payment_gateway::{GatewayError, GatewayNotification, PaymentGateway, PaymentSession, PaymentSessionRequest};
pub use transaction_management::TransactionManagement;
