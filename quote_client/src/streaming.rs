//! Resilient subscription to the quote generator.
//!
//! The `StreamingClient` keeps a `QuoteCache` fresh by holding one streaming session
//! open against the generator. It is a small state machine:
//!
//! ```text
//! Connecting --ok--> Streaming --receive error--> Backoff --delay--> Connecting
//!      \--------------fail--------------------------^
//! ```
//!
//! There is no terminal failure state: transport faults always lead to `Backoff` and
//! another attempt after a fixed delay. The only way out is the `CancelToken`, which
//! moves the machine to `Stopped` from any state. While streaming, the socket uses a
//! short read timeout so cancellation is noticed even when no quotes arrive.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;
use quote_common::wire::{FrameReader, write_frame};
use quote_common::{CancelToken, Quote, QuoteError, Result, StreamRequest};
use strum_macros::Display;

use crate::cache::QuoteCache;

/// Default delay between a failure and the next connection attempt.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);
/// Upper bound for establishing the TCP connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Read timeout slice used to poll for cancellation while streaming.
pub const READ_POLL: Duration = Duration::from_millis(250);

/// Observable state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ClientState {
    Connecting,
    Streaming,
    Backoff,
    Stopped,
}

/// Connection settings of the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Generator address as `host:port`.
    pub generator_addr: String,
    pub backoff: Duration,
    pub connect_timeout: Duration,
    pub read_poll: Duration,
}

impl ClientConfig {
    pub fn new(generator_addr: impl Into<String>) -> Self {
        Self {
            generator_addr: generator_addr.into(),
            backoff: DEFAULT_BACKOFF,
            connect_timeout: CONNECT_TIMEOUT,
            read_poll: READ_POLL,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Internal machine step; `Streaming` carries its open session.
enum Step {
    Connecting,
    Streaming(FrameReader<TcpStream>),
    Backoff,
    Stopped,
}

impl Step {
    fn state(&self) -> ClientState {
        match self {
            Step::Connecting => ClientState::Connecting,
            Step::Streaming(_) => ClientState::Streaming,
            Step::Backoff => ClientState::Backoff,
            Step::Stopped => ClientState::Stopped,
        }
    }
}

/// Owner and sole writer of a `QuoteCache`.
pub struct StreamingClient {
    config: ClientConfig,
    cache: Arc<QuoteCache>,
    state: Mutex<ClientState>,
    sessions_opened: AtomicU64,
}

impl StreamingClient {
    pub fn new(config: ClientConfig, cache: Arc<QuoteCache>) -> Self {
        Self {
            config,
            cache,
            state: Mutex::new(ClientState::Connecting),
            sessions_opened: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    pub fn state(&self) -> ClientState {
        *self.state.lock()
    }

    /// How many streaming sessions have been opened so far.
    pub fn sessions_opened(&self) -> u64 {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    /// Run the state machine on a background thread.
    pub fn spawn(self: Arc<Self>, cancel: CancelToken) -> JoinHandle<()> {
        thread::spawn(move || self.run(cancel))
    }

    /// Drive the state machine until `cancel` fires.
    pub fn run(&self, cancel: CancelToken) {
        info!("Streaming client targeting {}", self.config.generator_addr);
        let mut step = Step::Connecting;
        loop {
            if cancel.is_cancelled() {
                step = Step::Stopped;
            }
            self.set_state(step.state());

            step = match step {
                Step::Connecting => match self.open_stream() {
                    Ok(reader) => {
                        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
                        info!("Stream opened, receiving quotes...");
                        Step::Streaming(reader)
                    }
                    Err(e) => {
                        warn!(
                            "Failed to open stream to {}: {}. Reconnecting in {:?}",
                            self.config.generator_addr, e, self.config.backoff
                        );
                        Step::Backoff
                    }
                },
                Step::Streaming(mut reader) => match self.receive(&mut reader, &cancel) {
                    Ok(()) => Step::Stopped,
                    Err(e) => {
                        warn!("Stream closed: {}. Reconnecting in {:?}", e, self.config.backoff);
                        Step::Backoff
                    }
                },
                Step::Backoff => {
                    if cancel.wait(self.config.backoff) {
                        Step::Stopped
                    } else {
                        Step::Connecting
                    }
                }
                Step::Stopped => break,
            };
        }
        info!("Streaming client stopped");
    }

    fn set_state(&self, next: ClientState) {
        let mut state = self.state.lock();
        if *state != next {
            debug!("Streaming client: {} -> {}", *state, next);
            *state = next;
        }
    }

    /// Connect and send an unfiltered subscription request.
    fn open_stream(&self) -> Result<FrameReader<TcpStream>> {
        info!("Connecting to generator {}", self.config.generator_addr);
        let mut stream = self.connect()?;
        stream.set_read_timeout(Some(self.config.read_poll))?;
        write_frame(&mut stream, &StreamRequest::all())?;
        Ok(FrameReader::new(stream))
    }

    fn connect(&self) -> Result<TcpStream> {
        let addrs: Vec<SocketAddr> = self.config.generator_addr.to_socket_addrs()?.collect();
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => e.into(),
            None => QuoteError::InvalidAddress(self.config.generator_addr.clone()),
        })
    }

    /// Receive quotes into the cache. `Ok` means cancelled, `Err` a stream fault.
    fn receive(&self, reader: &mut FrameReader<TcpStream>, cancel: &CancelToken) -> Result<()> {
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }
            match reader.read_frame::<Quote>() {
                Ok(quote) => self.apply(quote),
                Err(e) if e.is_timeout() => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn apply(&self, quote: Quote) {
        if !quote.price.is_finite() || quote.price <= 0.0 || quote.symbol.is_empty() {
            warn!("Ignoring malformed quote {:?}", quote);
            return;
        }
        self.cache.upsert(&quote.symbol, quote.price);
    }
}
