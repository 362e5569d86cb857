//! Error types shared between the generator, consumer and gateway.
//!
//! The `QuoteError` enum unifies the failure cases for I/O, serialization,
//! configuration and price validation, allowing crates to propagate a single
//! error type.
use std::io;

use thiserror::Error;

/// Unified error type shared by every crate of the workspace.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// I/O error originating from sockets or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A price that is not finite or not strictly positive.
    #[error("Invalid price for {symbol}: {price}")]
    InvalidPrice {
        /// Symbol the price was supplied for.
        symbol: String,
        /// Rejected value.
        price: f64,
    },

    /// An address that is empty or not of the `host:port` form.
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    /// A symbol that is empty after trimming.
    #[error("Symbol must not be empty")]
    EmptySymbol,

    /// Error while parsing a symbol list or price table.
    #[error("Parse symbols error: {0}")]
    ParseSymbols(String),

    /// The peer closed the stream before the expected frame arrived.
    #[error("Stream closed by peer")]
    StreamClosed,
}

impl QuoteError {
    /// True when the error is a socket read/write timeout rather than a real fault.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            QuoteError::Io(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
        )
    }
}
