use gm_common::Secret;
use log::*;

const SANDBOX_BASE_URL: &str = "https://api.sandbox.midtrans.com";
const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com/snap";

#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// Base URL of the gateway core API, used for status round-trips. e.g. "https://api.sandbox.midtrans.com"
    pub base_url: String,
    /// Base URL of the payment-session API.
    pub snap_url: String,
    /// The merchant server key. Authenticates our requests and signs the gateway's notifications.
    pub server_key: Secret<String>,
}

impl GatewayConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("GM_GATEWAY_BASE_URL").unwrap_or_else(|_| {
            warn!("GM_GATEWAY_BASE_URL not set, using the sandbox API ({SANDBOX_BASE_URL})");
            SANDBOX_BASE_URL.to_string()
        });
        let snap_url = std::env::var("GM_GATEWAY_SNAP_URL").unwrap_or_else(|_| {
            warn!("GM_GATEWAY_SNAP_URL not set, using the sandbox API ({SANDBOX_SNAP_URL})");
            SANDBOX_SNAP_URL.to_string()
        });
        let server_key = Secret::new(std::env::var("GM_GATEWAY_SERVER_KEY").unwrap_or_else(|_| {
            warn!("GM_GATEWAY_SERVER_KEY not set. Payment notifications cannot be verified and will be rejected.");
            String::default()
        }));
        Self { base_url: base_url.trim_end_matches('/').to_string(), snap_url: snap_url.trim_end_matches('/').to_string(), server_key }
    }
}
