//! # Marketplace engine public API
//!
//! The API is modular, so that callers can pick the parts they need:
//!
//! * [`inventory_api`] is the inventory ledger: availability checks, the conditional decrement, restores.
//! * [`order_flow_api`] is the order lifecycle engine. All status changes go through it.
//! * [`checkout_api`] turns cart selections into transactions and manages the cart.
//! * [`payment_api`] opens payment sessions and reconciles gateway notifications with order status.
//! * [`participant_api`] gives buyers and sellers read access to their own transactions.
//!
//! [`transitions`] holds the lifecycle graph itself, and the remaining submodules hold supporting types.
//!
//! # API usage
//!
//! Every API is created from a backend that implements the traits it needs, plus the event producers it publishes
//! to:
//!
//! ```rust,ignore
//! use grounds_engine::{events::EventProducers, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/grounds_market.db", 5).await?;
//! let api = OrderFlowApi::new(db, EventProducers::default());
//! let shipped = api.update_status(&Actor::user("alice"), 42, TransactionStatus::Shipped, details).await?;
//! ```

pub mod checkout_api;
pub mod errors;
pub mod inventory_api;
pub mod order_flow_api;
pub mod participant_api;
pub mod payment_api;
pub mod transaction_objects;
pub mod transitions;
