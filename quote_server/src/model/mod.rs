//! Domain models of the quote generator.
//!
//! - `price_state` — the authoritative symbol → price table and its snapshots.
//! - `perturbation` — per-tick relative change sources (random walk, fixed).
//! - `quote_generator` — owner of the state and its background mutation loop.

pub mod perturbation;
pub mod price_state;
pub mod quote_generator;
