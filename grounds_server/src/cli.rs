use std::{env, env::VarError};

const HELP: &str = include_str!("./cli-help.txt");

// Be explicit about which envars are printed, so that secrets are never shown
const DISPLAY_ENVS: [&str; 13] = [
    "RUST_LOG",
    "GM_HOST",
    "GM_PORT",
    "GM_DATABASE_URL",
    "GM_DB_MAX_CONNECTIONS",
    "GM_GATEWAY_BASE_URL",
    "GM_GATEWAY_SNAP_URL",
    "GM_GATEWAY_IP_WHITELIST",
    "GM_USE_X_FORWARDED_FOR",
    "GM_USE_FORWARDED",
    "GM_PENDING_ORDER_TIMEOUT",
    "GM_SWEEP_INTERVAL",
    "GM_EVENT_BUFFER_SIZE",
];

/// The server has no real CLI. Any argument at all prints the help text and the current (non-secret) configuration.
///
/// Returns true if the help was printed, in which case the caller should exit.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        println!("\n{HELP}\n");
        println!("Current environment values (EXCLUDING variables that contain secrets):");
        DISPLAY_ENVS.iter().for_each(|&name| println!("  {name:<35} {:<15}", env_value(name)));
    }
    has_cli_args
}

fn env_value(name: &str) -> String {
    match env::var(name) {
        Ok(s) => s,
        Err(VarError::NotPresent) => "Not set".into(),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}
