//! Authoritative price table of the generator.
//!
//! `PriceState` maps each symbol to its current price. The key set is fixed at
//! construction; only prices change afterwards. Access goes through a fair
//! reader/writer lock:
//!
//! - `PriceState::mutate` — applies one tick of perturbation to every symbol while
//!   holding the write lock, so no reader can observe a half-updated table.
//! - `PriceState::snapshot` — copies the whole table under the read lock and stamps it
//!   with a single timestamp, so every quote emitted from it belongs to the same tick.
//! - `PriceState::resolve` — turns a subscriber's requested symbols into the set that
//!   will actually be streamed, silently dropping names that are not known.

use std::collections::HashMap;

use parking_lot::RwLock;
use quote_common::quote::now_millis;
use quote_common::symbols::validate_symbol;
use quote_common::{Quote, QuoteError, Result};

use super::perturbation::Perturbation;

/// Result of one tick for a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMove {
    pub symbol: String,
    pub old: f64,
    pub new: f64,
    /// Relative change that was applied, e.g. `0.001` for +0.1%.
    pub change: f64,
}

/// Point-in-time copy of every price, stamped once.
#[derive(Debug, Clone)]
pub struct PriceSnapshot {
    prices: HashMap<String, f64>,
    /// Milliseconds since Unix epoch at the moment the copy was taken.
    pub timestamp: u64,
}

impl PriceSnapshot {
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Mint one quote per symbol in `symbols`, all carrying the snapshot timestamp.
    pub fn quotes<'a>(&'a self, symbols: &'a [String]) -> impl Iterator<Item = Quote> + 'a {
        symbols.iter().filter_map(move |symbol| {
            self.get(symbol)
                .map(|price| Quote::new(symbol.clone(), price, self.timestamp))
        })
    }
}

/// Symbol → price mapping owned by the generator.
pub struct PriceState {
    /// Symbols in configuration order. Fixed for the lifetime of the state.
    symbols: Vec<String>,
    prices: RwLock<HashMap<String, f64>>,
}

impl PriceState {
    /// Build the state from an initial price table.
    ///
    /// Fails on an empty symbol, a duplicated symbol, or a price that is not finite and
    /// strictly positive.
    pub fn new<I, S>(initial: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut symbols = Vec::new();
        let mut prices = HashMap::new();
        for (raw, price) in initial {
            let symbol = validate_symbol(raw.as_ref())?;
            if !price.is_finite() || price <= 0.0 {
                return Err(QuoteError::InvalidPrice { symbol, price });
            }
            if prices.insert(symbol.clone(), price).is_some() {
                return Err(QuoteError::ParseSymbols(format!("duplicate symbol {symbol}")));
            }
            symbols.push(symbol);
        }
        Ok(Self {
            symbols,
            prices: RwLock::new(prices),
        })
    }

    /// All known symbols in configuration order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.read().get(symbol).copied()
    }

    /// Apply one tick: `new = old * (1 + change)` for every symbol.
    ///
    /// A move that would leave the price non-positive or non-finite is discarded and the
    /// old price is kept.
    pub fn mutate(&self, perturbation: &mut dyn Perturbation) -> Vec<PriceMove> {
        let mut prices = self.prices.write();
        let mut moves = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            let Some(price) = prices.get_mut(symbol) else {
                continue;
            };
            let change = perturbation.next_change();
            let old = *price;
            let candidate = old * (1.0 + change);
            if candidate.is_finite() && candidate > 0.0 {
                *price = candidate;
            }
            moves.push(PriceMove {
                symbol: symbol.clone(),
                old,
                new: *price,
                change,
            });
        }
        moves
    }

    /// Consistent copy of all prices.
    pub fn snapshot(&self) -> PriceSnapshot {
        let prices = self.prices.read().clone();
        PriceSnapshot {
            prices,
            timestamp: now_millis(),
        }
    }

    /// Symbols to stream for a request.
    ///
    /// An empty request means every symbol. Otherwise unknown names are skipped and
    /// duplicates collapsed, keeping the requested order.
    pub fn resolve(&self, requested: &[String]) -> Vec<String> {
        if requested.is_empty() {
            return self.symbols.clone();
        }
        let mut resolved: Vec<String> = Vec::with_capacity(requested.len());
        for symbol in requested {
            if self.symbols.contains(symbol) && !resolved.contains(symbol) {
                resolved.push(symbol.clone());
            }
        }
        resolved
    }
}
