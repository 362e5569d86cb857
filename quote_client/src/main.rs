//! Quote consumer binary.
//!
//! Starts the streaming client on a background thread and serves the cached quotes over
//! HTTP until Ctrl+C.
use clap::Parser;
use log::info;
use quote_client::api::create_router;
use quote_client::args::Args;
use quote_client::{QuoteCache, StreamingClient};
use quote_common::shutdown::until_signal;
use quote_common::{CancelToken, QuoteError, Result};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), QuoteError> {
    init_logger();
    let config = Args::parse().into_config()?;

    let listener = TcpListener::bind(config.http_listen.as_str()).await?;
    info!("Consumer HTTP API listening on {}", listener.local_addr()?);
    info!("   GET /health              - liveness");
    info!("   GET /quotes              - all cached quotes");
    info!("   GET /quotes/{{symbol}}     - one cached quote");

    let cache = Arc::new(QuoteCache::new());
    let client = Arc::new(StreamingClient::new(config.client, Arc::clone(&cache)));
    let cancel = CancelToken::new();
    let client_handle = client.spawn(cancel.clone());

    let shutdown = cancel.clone();
    axum::serve(listener, create_router(cache))
        .with_graceful_shutdown(async move {
            until_signal(tokio::signal::ctrl_c()).await;
            info!("Ctrl+C received. Shutting down consumer...");
            shutdown.cancel();
        })
        .await?;

    cancel.cancel();
    tokio::task::spawn_blocking(move || client_handle.join())
        .await
        .map_err(|e| QuoteError::Format(e.to_string()))?
        .map_err(|_| QuoteError::Format("streaming client thread panicked".to_string()))?;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
