//! Helpers for tests of the engine and of crates built on it. Enabled by the `test_utils` feature.
mod fake_gateway;
pub mod prepare_env;

pub use fake_gateway::FakeGateway;
