use std::{env, net::IpAddr};

use chrono::Duration;
use gateway_tools::GatewayConfig;
use gm_common::{
    helpers::{env_flag, env_parse},
    Secret,
};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_GM_HOST: &str = "127.0.0.1";
const DEFAULT_GM_PORT: u16 = 8470;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/grounds_market.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_PENDING_ORDER_TIMEOUT_HOURS: i64 = 72;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 600;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 128;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
    /// If supplied, requests to the `/gateway` endpoints are only accepted from these addresses.
    pub gateway_whitelist: Option<Vec<IpAddr>>,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    /// Pending transactions older than this are cancelled by the sweep worker. Zero disables the sweep.
    pub pending_order_timeout: Duration,
    pub sweep_interval: std::time::Duration,
    /// Capacity of each event queue. Publishers wait when it is full.
    pub event_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GM_HOST.to_string(),
            port: DEFAULT_GM_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            gateway: GatewayConfig::default(),
            gateway_whitelist: None,
            use_x_forwarded_for: false,
            use_forwarded: false,
            pending_order_timeout: Duration::hours(DEFAULT_PENDING_ORDER_TIMEOUT_HOURS),
            sweep_interval: std::time::Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("GM_HOST").ok().unwrap_or_else(|| DEFAULT_GM_HOST.into());
        let port = env_parse("GM_PORT", DEFAULT_GM_PORT);
        let database_url = env::var("GM_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ GM_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = env_parse("GM_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let gateway = GatewayConfig::new_from_env_or_default();
        let gateway_whitelist = env::var("GM_GATEWAY_IP_WHITELIST").ok().and_then(|s| parse_whitelist(&s));
        match &gateway_whitelist {
            Some(whitelist) if whitelist.is_empty() => {
                warn!(
                    "🚨️ The gateway IP whitelist was configured, but is empty. The server will run, but won't accept \
                     any payment notifications."
                );
            },
            None => info!("🪛️ No gateway IP whitelist is set. Only notification signatures will be checked."),
            Some(v) => {
                let addrs = v.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                info!("🪛️ Gateway IP whitelist: {addrs}");
            },
        }
        let use_x_forwarded_for = env_flag("GM_USE_X_FORWARDED_FOR", false);
        let use_forwarded = env_flag("GM_USE_FORWARDED", false);
        let timeout_hours = env_parse("GM_PENDING_ORDER_TIMEOUT", DEFAULT_PENDING_ORDER_TIMEOUT_HOURS);
        let pending_order_timeout = if timeout_hours < 0 {
            warn!("🪛️ GM_PENDING_ORDER_TIMEOUT cannot be negative. The stale order sweep is disabled.");
            Duration::zero()
        } else {
            Duration::hours(timeout_hours)
        };
        let sweep_interval =
            std::time::Duration::from_secs(env_parse("GM_SWEEP_INTERVAL", DEFAULT_SWEEP_INTERVAL_SECS).max(1));
        let event_buffer_size = env_parse("GM_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE).max(1);
        Self {
            host,
            port,
            database_url,
            max_connections,
            auth,
            gateway,
            gateway_whitelist,
            use_x_forwarded_for,
            use_forwarded,
            pending_order_timeout,
            sweep_interval,
            event_buffer_size,
        }
    }
}

/// `none`, `false` or `0` explicitly disable the whitelist. Invalid entries are skipped with a warning.
pub fn parse_whitelist(s: &str) -> Option<Vec<IpAddr>> {
    if ["none", "false", "0", ""].contains(&s.trim().to_lowercase().as_str()) {
        info!("🪛️ Gateway IP whitelist is disabled.");
        return None;
    }
    let ip_addrs = s
        .split(',')
        .filter_map(|s| {
            s.trim()
                .parse()
                .map_err(|e| {
                    warn!("🪛️ Ignoring invalid IP address ({s}) in GM_GATEWAY_IP_WHITELIST: {e}");
                })
                .ok()
        })
        .collect::<Vec<IpAddr>>();
    Some(ip_addrs)
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared secret the auth service signs access tokens with (HS256).
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. No access token issued \
             elsewhere will be accepted. DO NOT operate on production like this. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { jwt_secret: Secret::new(secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("GM_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [GM_JWT_SECRET]")))?;
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError("GM_JWT_SECRET must be at least 32 characters".to_string()));
        }
        Ok(Self::new(secret))
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The parts of the configuration that request handlers need. Contains no secrets.
#[derive(Clone, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
    pub gateway_whitelist: Option<Vec<IpAddr>>,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
            gateway_whitelist: config.gateway_whitelist.clone(),
        }
    }
}
