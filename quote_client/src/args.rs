//! Command-line arguments for the quote consumer.
//!
//! This module defines the CLI interface using `clap`. The generator address falls back
//! to `QUOTE_SERVER_ADDR` and then to the local development default.
use clap::Parser;
use quote_common::Result;
use quote_common::net::{
    DEFAULT_GENERATOR_ADDR, GENERATOR_ADDR_ENV, HTTP_PORT, addr, validate_addr,
};
use std::time::Duration;

use crate::streaming::ClientConfig;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address of the quote generator stream (`host:port`).
    #[clap(long, env = GENERATOR_ADDR_ENV, default_value = DEFAULT_GENERATOR_ADDR)]
    pub generator_addr: String,

    /// Address the HTTP read API listens on.
    #[clap(long, env = "CONSUMER_HTTP_LISTEN", default_value_t = addr("0.0.0.0", HTTP_PORT))]
    pub http_listen: String,

    /// Seconds to wait before reconnecting after a stream failure.
    #[clap(long, env = "CONSUMER_BACKOFF_SECS", default_value_t = 5)]
    pub backoff_secs: u64,
}

/// Validated consumer configuration.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub client: ClientConfig,
    pub http_listen: String,
}

impl Args {
    pub fn into_config(self) -> Result<ConsumerConfig> {
        let generator_addr = validate_addr(&self.generator_addr)?;
        let http_listen = validate_addr(&self.http_listen)?;
        let client = ClientConfig::new(generator_addr)
            .with_backoff(Duration::from_secs(self.backoff_secs));
        Ok(ConsumerConfig {
            client,
            http_listen,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_override_defaults() {
        let config = Args::try_parse_from([
            "quote_client",
            "--generator-addr",
            "ft:50051",
            "--http-listen",
            "127.0.0.1:9000",
            "--backoff-secs",
            "1",
        ])
        .unwrap()
        .into_config()
        .unwrap();
        assert_eq!(config.client.generator_addr, "ft:50051");
        assert_eq!(config.client.backoff, Duration::from_secs(1));
        assert_eq!(config.http_listen, "127.0.0.1:9000");
    }

    #[test]
    fn malformed_generator_address_is_rejected() {
        let args = Args::try_parse_from(["quote_client", "--generator-addr", "ft"]).unwrap();
        assert!(args.into_config().is_err());
    }
}
