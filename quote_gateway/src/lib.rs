//! Quote gateway: answers each HTTP request with a bounded-window snapshot of the
//! generator's stream.
//!
//! - `collector` — opens a session per request and reduces it latest-value-wins.
//! - `api` — axum router for `GET /quotes` with CORS handling.
//! - `args` — command-line and environment configuration.
pub mod api;
pub mod args;
pub mod collector;

pub use collector::{GatewayConfig, Snapshot, SnapshotCollector, reduce_latest};
