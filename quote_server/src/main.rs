//! Quote generator binary.
//!
//! Binds the stream listener, starts the price mutation loop and serves subscribers until
//! Ctrl+C. Bind and configuration failures are fatal; everything after that is contained
//! per subscriber.
use clap::Parser;
use log::info;
use quote_common::{CancelToken, QuoteError, Result};
use quote_server::args::Args;
use quote_server::{PriceState, QuoteGenerator, QuoteServer, UniformPerturbation};
use std::sync::Arc;

fn main() -> Result<(), QuoteError> {
    init_logger();
    let config = Args::parse().into_config()?;

    let state = PriceState::new(config.prices.iter().map(|(s, p)| (s.as_str(), *p)))?;
    let perturbation = match config.seed {
        Some(seed) => UniformPerturbation::seeded(config.max_change, seed),
        None => UniformPerturbation::new(config.max_change),
    };
    let generator = Arc::new(
        QuoteGenerator::new(state, Box::new(perturbation), config.tick).with_echo(config.echo),
    );

    let server = QuoteServer::bind(&config.listen, generator)?;
    info!("Waiting for subscribers on {}", server.local_addr()?);

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down generator...");
            cancel.cancel();
        })
        .map_err(|e| QuoteError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    server.run(cancel)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
