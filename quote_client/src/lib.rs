//! Quote consumer: a streaming client that mirrors the generator into a local cache,
//! plus an HTTP read API over that cache.
//!
//! - `cache` — `QuoteCache`, the thread-safe symbol → price mirror.
//! - `streaming` — `StreamingClient`, the reconnecting subscription that feeds the cache.
//! - `api` — axum router serving `/health`, `/quotes` and `/quotes/{symbol}`.
//! - `args` — command-line and environment configuration.
pub mod api;
pub mod args;
pub mod cache;
pub mod streaming;

pub use cache::QuoteCache;
pub use streaming::{ClientConfig, ClientState, StreamingClient};
