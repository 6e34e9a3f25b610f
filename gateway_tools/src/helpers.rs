use gm_common::Rupiah;
use sha2::{Digest, Sha512};

use crate::GatewayApiError;

/// The gateway quotes amounts as decimal strings, e.g. "50000.00". Rupiah has no minor unit, so any fractional part
/// must be zero.
pub fn parse_gateway_amount(amount: &str) -> Result<Rupiah, GatewayApiError> {
    let mut parts = amount.trim().split('.');
    let whole = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GatewayApiError::InvalidCurrencyAmount(amount.to_string()))?
        .parse::<i64>()
        .map_err(|e| GatewayApiError::InvalidCurrencyAmount(format!("Invalid amount: {amount}. {e}.")))?;
    match parts.next() {
        None => Ok(Rupiah::from(whole)),
        Some(frac) if !frac.is_empty() && frac.chars().all(|c| c == '0') && parts.next().is_none() => {
            Ok(Rupiah::from(whole))
        },
        Some(_) => Err(GatewayApiError::InvalidCurrencyAmount(format!("Fractional rupiah are not supported: {amount}"))),
    }
}

/// `SHA512(order_id + status_code + gross_amount + server_key)`, hex encoded. This is the `signature_key` the gateway
/// attaches to every notification.
pub fn notification_signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    format!("{:x}", hasher.finalize())
}
