//! Command-line arguments for the gateway.
use clap::Parser;
use quote_common::net::{
    DEFAULT_GENERATOR_ADDR, GENERATOR_ADDR_ENV, HTTP_PORT, addr, validate_addr,
};
use quote_common::symbols::{parse_symbol_list, parse_symbols};
use quote_common::{QuoteError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::collector::{DEFAULT_SYMBOLS, DEFAULT_WINDOW, GatewayConfig};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address of the quote generator stream (`host:port`).
    #[clap(long, env = GENERATOR_ADDR_ENV, default_value = DEFAULT_GENERATOR_ADDR)]
    pub generator_addr: String,

    /// Address the HTTP gateway listens on.
    #[clap(long, env = "GATEWAY_HTTP_LISTEN", default_value_t = addr("0.0.0.0", HTTP_PORT))]
    pub http_listen: String,

    /// Symbols requested for every snapshot, separated by commas or spaces.
    #[clap(long, env = "GATEWAY_SYMBOLS", default_value = DEFAULT_SYMBOLS)]
    pub symbols: String,

    /// File with symbols, one or more per line; `#` starts a comment line.
    /// Takes precedence over `--symbols`.
    #[clap(long, env = "GATEWAY_SYMBOLS_FILE")]
    pub symbols_file: Option<PathBuf>,

    /// Length of the collection window in seconds.
    #[clap(long, env = "GATEWAY_WINDOW_SECS", default_value_t = DEFAULT_WINDOW.as_secs())]
    pub window_secs: u64,
}

/// Validated gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub http_listen: String,
}

impl Args {
    pub fn into_config(self) -> Result<Config> {
        let symbols = match &self.symbols_file {
            Some(path) => read_symbols_file(path)?,
            None => parse_symbol_list(&self.symbols),
        };
        if symbols.is_empty() {
            return Err(QuoteError::ParseSymbols("symbol list is empty".to_string()));
        }
        if self.window_secs == 0 {
            return Err(QuoteError::Format("--window-secs must be positive".to_string()));
        }
        Ok(Config {
            gateway: GatewayConfig {
                generator_addr: validate_addr(&self.generator_addr)?,
                symbols,
                window: Duration::from_secs(self.window_secs),
            },
            http_listen: validate_addr(&self.http_listen)?,
        })
    }
}

fn read_symbols_file(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    parse_symbols(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn default_symbols_and_window() {
        let config = Args::try_parse_from(["quote_gateway"])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.gateway.symbols, vec!["BTC", "ETH", "SBER"]);
        assert_eq!(config.gateway.window, Duration::from_secs(5));
    }

    #[test]
    fn empty_symbol_list_is_rejected() {
        let args = Args::try_parse_from(["quote_gateway", "--symbols", " , "]).unwrap();
        assert!(matches!(args.into_config(), Err(QuoteError::ParseSymbols(_))));
    }

    #[test]
    fn symbols_file_overrides_symbols_flag() {
        let path = temp_file("gateway-symbols.txt", "# watched\nDOGE, BTC\n\nSOL\n");
        let args = Args::try_parse_from([
            "quote_gateway",
            "--symbols",
            "ETH",
            "--symbols-file",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let config = args.into_config().unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.gateway.symbols, vec!["DOGE", "BTC", "SOL"]);
    }

    #[test]
    fn symbols_file_with_only_comments_is_rejected() {
        let path = temp_file("gateway-comments.txt", "# nothing here\n");
        let args = Args::try_parse_from([
            "quote_gateway",
            "--symbols-file",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let result = args.into_config();
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(QuoteError::ParseSymbols(_))));
    }

    #[test]
    fn missing_symbols_file_is_an_io_error() {
        let args = Args::try_parse_from([
            "quote_gateway",
            "--symbols-file",
            "/nonexistent/quote-gateway-symbols.txt",
        ])
        .unwrap();
        assert!(matches!(args.into_config(), Err(QuoteError::Io(_))));
    }
}
