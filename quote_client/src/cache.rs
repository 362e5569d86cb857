//! Local mirror of the generator's prices.
//!
//! The `QuoteCache` is written only by the `StreamingClient` that owns it and read by any
//! number of HTTP handlers. Reads never touch the network: they take the shared lock,
//! copy what they need and return.

use std::collections::HashMap;

use log::debug;
use parking_lot::RwLock;

/// Symbol → last received price.
#[derive(Debug, Default)]
pub struct QuoteCache {
    quotes: RwLock<HashMap<String, f64>>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the latest price for `symbol`.
    pub(crate) fn upsert(&self, symbol: &str, price: f64) {
        self.quotes.write().insert(symbol.to_string(), price);
        debug!("Quote updated: {} = {:.2}", symbol, price);
    }

    /// Cached price for an exact symbol match.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.quotes.read().get(symbol).copied()
    }

    /// Independent copy of every cached price.
    pub fn get_all(&self) -> HashMap<String, f64> {
        self.quotes.read().clone()
    }

    pub fn len(&self) -> usize {
        self.quotes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.read().is_empty()
    }
}
