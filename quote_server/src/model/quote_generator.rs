//! Background price generator.
//!
//! The `QuoteGenerator` owns the shared `PriceState` and a `Perturbation` source and
//! advances every price once per tick on a dedicated thread. The loop runs on a fixed
//! schedule regardless of how many subscribers are connected; subscribers only ever
//! read the state through snapshots.
//!
//! With echo enabled, every tick's prices are also printed to stdout as JSON lines.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use parking_lot::Mutex;
use quote_common::CancelToken;

use super::perturbation::Perturbation;
use super::price_state::{PriceMove, PriceState};

/// Default tick period.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Owner of the authoritative prices and their mutation loop.
pub struct QuoteGenerator {
    state: Arc<PriceState>,
    perturbation: Mutex<Box<dyn Perturbation>>,
    tick: Duration,
    echo: bool,
}

impl QuoteGenerator {
    pub fn new(state: PriceState, perturbation: Box<dyn Perturbation>, tick: Duration) -> Self {
        Self {
            state: Arc::new(state),
            perturbation: Mutex::new(perturbation),
            tick,
            echo: false,
        }
    }

    /// Print each tick's quotes to stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn state(&self) -> &Arc<PriceState> {
        &self.state
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Advance every price by one tick.
    pub fn step(&self) -> Vec<PriceMove> {
        let moves = {
            let mut perturbation = self.perturbation.lock();
            self.state.mutate(&mut **perturbation)
        };
        for mv in &moves {
            debug!(
                "{}: {:.2} -> {:.2} ({:.3}%)",
                mv.symbol,
                mv.old,
                mv.new,
                mv.change * 100.0
            );
        }
        if self.echo {
            self.echo_tick();
        }
        moves
    }

    fn echo_tick(&self) {
        let snapshot = self.state.snapshot();
        for quote in snapshot.quotes(self.state.symbols()) {
            match serde_json::to_string(&quote) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to encode quote for echo: {}", e),
            }
        }
    }

    /// Spawn the mutation loop. It stops when `cancel` fires.
    pub fn start(self: Arc<Self>, cancel: CancelToken) -> JoinHandle<()> {
        thread::spawn(move || {
            info!(
                "Price generator started: {} symbols, tick {:?}",
                self.state.symbols().len(),
                self.tick
            );
            let mut next_tick = Instant::now() + self.tick;
            loop {
                let wait = next_tick.saturating_duration_since(Instant::now());
                if cancel.wait(wait) {
                    break;
                }
                self.step();
                next_tick += self.tick;
                // Fell behind (e.g. suspended process); resume from now instead of bursting.
                let now = Instant::now();
                if next_tick < now {
                    next_tick = now + self.tick;
                }
            }
            info!("Price generator stopped");
        })
    }
}
