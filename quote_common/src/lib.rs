//!
//! Common types and utilities shared by the quote generator, consumer and gateway.
//!
//! This crate aggregates:
//! - `error` — unified error type `QuoteError` used across the workspace.
//! - `result` — handy `Result<T, QuoteError>` alias.
//! - `quote` — the `Quote` message streamed to subscribers.
//! - `command` — the `StreamRequest` a subscriber sends when opening a stream.
//! - `wire` — newline-delimited JSON framing for the streaming protocol.
//! - `symbols` — symbol list and price table parsing helpers.
//! - `net` — networking defaults and address validation.
//! - `shutdown` — `CancelToken` used to stop background loops.
#![warn(missing_docs)]
pub mod command;
pub mod error;
pub mod net;
pub mod quote;
pub mod result;
pub mod shutdown;
pub mod symbols;
pub mod wire;

pub use command::StreamRequest;
pub use error::QuoteError;
pub use quote::Quote;
pub use result::Result;
pub use shutdown::CancelToken;
