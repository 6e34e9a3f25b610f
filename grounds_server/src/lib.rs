//! # Grounds Market server
//! The HTTP front end of the Grounds Market engine. It is responsible for:
//! * Authenticating buyers and sellers with the access tokens issued by the marketplace's auth service.
//! * Exposing checkout, the order lifecycle, participant queries and payment sessions as a JSON API.
//! * Receiving payment notifications from the gateway and handing them to the engine for reconciliation.
//! * Persisting the notifications the engine publishes, and periodically cancelling stale pending orders.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/...`: The authenticated API. See [routes](routes/index.html).
//! * `/gateway/notification`: The payment gateway webhook.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod sweep_worker;

#[cfg(test)]
mod endpoint_tests;
