//! Command-line arguments for the quote generator.
//!
//! Every flag can also be supplied through the environment.
use clap::Parser;
use quote_common::net::{GENERATOR_PORT, addr, validate_addr};
use quote_common::symbols::parse_price_table;
use quote_common::{QuoteError, Result};
use std::time::Duration;

/// Initial prices used when none are configured.
pub const DEFAULT_PRICES: &str = "SBER=275.50,BTC=95400.0,ETH=2650.20";

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address the quote stream listens on.
    #[clap(long, env = "QUOTE_SERVER_LISTEN", default_value_t = addr("0.0.0.0", GENERATOR_PORT))]
    pub listen: String,

    /// Tick period in milliseconds.
    #[clap(long, env = "QUOTE_TICK_MS", default_value_t = 1000)]
    pub tick_ms: u64,

    /// Largest relative price change per tick (0.001 = ±0.1%).
    #[clap(long, env = "QUOTE_MAX_CHANGE", default_value_t = 0.001)]
    pub max_change: f64,

    /// Seed for the random walk; omit for a random seed.
    #[clap(long, env = "QUOTE_SEED")]
    pub seed: Option<u64>,

    /// Initial prices as `SYMBOL=PRICE` pairs separated by commas.
    #[clap(long, env = "QUOTE_PRICES", default_value = DEFAULT_PRICES)]
    pub prices: String,

    /// Print every tick's quotes to stdout as JSON lines.
    #[clap(long)]
    pub echo: bool,
}

/// Validated generator configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: String,
    pub tick: Duration,
    pub max_change: f64,
    pub seed: Option<u64>,
    pub prices: Vec<(String, f64)>,
    pub echo: bool,
}

impl Args {
    pub fn into_config(self) -> Result<ServerConfig> {
        let listen = validate_addr(&self.listen)?;
        if self.tick_ms == 0 {
            return Err(QuoteError::Format("--tick-ms must be positive".to_string()));
        }
        if !self.max_change.is_finite() || !(0.0..1.0).contains(&self.max_change) {
            return Err(QuoteError::Format(format!(
                "--max-change must be in [0, 1), got {}",
                self.max_change
            )));
        }
        Ok(ServerConfig {
            listen,
            tick: Duration::from_millis(self.tick_ms),
            max_change: self.max_change,
            seed: self.seed,
            prices: parse_price_table(&self.prices)?,
            echo: self.echo,
        })
    }
}
