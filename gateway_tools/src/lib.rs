//! Client for the external payment gateway.
//!
//! The gateway talks in its own vocabulary (`capture`, `settlement`, `expire`, ...). This crate only moves that
//! vocabulary over the wire and checks that a notification is authentic. Mapping it onto order statuses is the job of
//! the engine.
mod api;
mod config;
mod error;
mod helpers;

mod data_objects;

pub use api::GatewayApi;
pub use config::GatewayConfig;
pub use data_objects::{
    CustomerDetails,
    NotificationPayload,
    SessionRequest,
    SessionResponse,
    TransactionDetails,
    TransactionStatusResponse,
    VerifiedNotification,
};
pub use error::GatewayApiError;
pub use helpers::{notification_signature, parse_gateway_amount};
