//! Shared networking defaults and helpers used by every service.

use crate::error::QuoteError;
use crate::result::Result;

/// TCP port the generator serves the quote stream on.
pub const GENERATOR_PORT: u16 = 50051;
/// HTTP port of the consumer and gateway.
pub const HTTP_PORT: u16 = 8080;
/// Generator address used for local development when nothing else is configured.
pub const DEFAULT_GENERATOR_ADDR: &str = "localhost:50051";
/// Environment variable overriding the generator address for the consumer and gateway.
pub const GENERATOR_ADDR_ENV: &str = "QUOTE_SERVER_ADDR";

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

/// Check that `raw` is a non-empty `host:port` pair with a numeric port.
///
/// The host is not resolved here; DNS names like `ft:50051` are accepted as-is.
/// Returns the trimmed address.
pub fn validate_addr(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let (host, port) = trimmed
        .rsplit_once(':')
        .ok_or_else(|| QuoteError::InvalidAddress(raw.to_string()))?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return Err(QuoteError::InvalidAddress(raw.to_string()));
    }
    Ok(trimmed.to_string())
}
