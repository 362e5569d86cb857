//! Subscription request sent by a subscriber when it opens a quote stream.
//!
//! The request is the first frame on a fresh connection. An empty symbol list (or
//! a missing `symbols` field) subscribes to every symbol the generator knows.
use serde::{Deserialize, Serialize};

/// Opening frame of a streaming session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamRequest {
    /// Symbols to stream; empty means all.
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl StreamRequest {
    /// Request every symbol.
    pub fn all() -> Self {
        Self::default()
    }

    /// Request only the given symbols.
    pub fn for_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}
