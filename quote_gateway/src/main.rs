//! Quote gateway binary.
use clap::Parser;
use log::info;
use quote_common::shutdown::until_signal;
use quote_common::{QuoteError, Result};
use quote_gateway::SnapshotCollector;
use quote_gateway::api::create_router;
use quote_gateway::args::Args;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), QuoteError> {
    init_logger();
    let config = Args::parse().into_config()?;

    info!("Generator address: {}", config.gateway.generator_addr);
    info!("Requested symbols: {:?}", config.gateway.symbols);
    info!("Collection window: {:?}", config.gateway.window);

    let listener = TcpListener::bind(config.http_listen.as_str()).await?;
    info!("HTTP gateway listening on {}", listener.local_addr()?);

    let collector = Arc::new(SnapshotCollector::new(config.gateway));
    axum::serve(listener, create_router(collector))
        .with_graceful_shutdown(async {
            until_signal(tokio::signal::ctrl_c()).await;
            info!("Ctrl+C received. Shutting down gateway...");
        })
        .await?;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
