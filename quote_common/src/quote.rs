//! Quote data model.
//!
//! A `Quote` is the message streamed to subscribers: the symbol, its price and a
//! millisecond UTC timestamp. Quotes are minted fresh for every emission and never
//! mutated afterwards.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Market quote for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol identifier, case-sensitive.
    pub symbol: String,
    /// Current price, strictly positive.
    pub price: f64,
    /// UTC timestamp in milliseconds since Unix epoch.
    pub timestamp: u64,
}

impl Quote {
    /// Build a quote stamped with an explicit timestamp.
    pub fn new(symbol: impl Into<String>, price: f64, timestamp: u64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp,
        }
    }
}

/// Current UTC time in milliseconds since Unix epoch.
pub fn now_millis() -> u64 {
    Utc::now().timestamp_millis() as u64
}
