//! Quote generator: authoritative synthetic prices streamed over TCP.
//!
//! The crate wires together three building blocks:
//!
//! - `QuoteGenerator` — owns the `PriceState` and advances every price once per tick on
//!   a background thread.
//! - `QuoteServer` — accepts subscriber connections and spawns one streaming session per
//!   subscriber.
//! - `stream::handle_subscriber` — the per-subscriber session: reads the opening
//!   `StreamRequest`, then writes one `Quote` frame per requested symbol every tick, each
//!   round taken from a single consistent snapshot.
//!
//! Protocol (newline-delimited JSON over TCP):
//! - Subscriber sends `{"symbols": ["BTC", "ETH"]}` (empty list = every symbol).
//! - Server answers with `{"symbol": "BTC", "price": 95400.0, "timestamp": 1700000000000}`
//!   lines until the subscriber disconnects.
//! - Unknown requested symbols are silently skipped.
pub mod args;
pub mod model;
mod receiver;
pub mod stream;

pub use model::perturbation::{FixedPerturbation, Perturbation, UniformPerturbation};
pub use model::price_state::{PriceSnapshot, PriceState};
pub use model::quote_generator::QuoteGenerator;
pub use receiver::QuoteServer;
