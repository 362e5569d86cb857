use crate::model::quote_generator::QuoteGenerator;
use crate::stream::{SessionEnd, WRITE_TIMEOUT, handle_subscriber};
use log::{debug, error, info, warn};
use quote_common::{CancelToken, QuoteError, Result};
use std::io::{self, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the accept loop checks for shutdown while idle.
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// TCP server that accepts subscribers and streams quotes to them.
///
/// Binding happens in `bind` so configuration faults surface before any thread is
/// started. `run` then drives the price generator and accepts connections, spawning
/// one session thread per subscriber. A failure while handling one subscriber is
/// logged and never stops the accept loop.
pub struct QuoteServer {
    listener: TcpListener,
    generator: Arc<QuoteGenerator>,
    sessions: Arc<AtomicUsize>,
    write_timeout: Duration,
}

impl QuoteServer {
    /// Bind a new server to `bind_addr` (e.g., `0.0.0.0:50051`).
    pub fn bind(bind_addr: &str, generator: Arc<QuoteGenerator>) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self {
            listener,
            generator,
            sessions: Arc::new(AtomicUsize::new(0)),
            write_timeout: WRITE_TIMEOUT,
        })
    }

    /// How long one write may block before a subscriber that stopped reading is dropped.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of subscriber sessions currently open.
    pub fn active_sessions(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.sessions)
    }

    /// Run on a background thread.
    pub fn spawn(self, cancel: CancelToken) -> JoinHandle<Result<()>> {
        thread::spawn(move || self.run(cancel))
    }

    /// Blocking loop: start the mutation loop, then accept subscribers until `cancel`.
    pub fn run(self, cancel: CancelToken) -> Result<()> {
        info!("Quote stream server is started on {}", self.listener.local_addr()?);
        let generator_handle = Arc::clone(&self.generator).start(cancel.clone());

        accept_loop(
            &cancel,
            || self.listener.accept(),
            |(stream, peer)| {
                if let Err(e) = stream.set_nonblocking(false) {
                    warn!("Dropping subscriber {}: {}", peer, e);
                    return;
                }
                self.spawn_session(stream, peer, cancel.clone());
            },
        );

        if generator_handle.join().is_err() {
            return Err(QuoteError::Format("price generator thread panicked".to_string()));
        }
        info!("Quote stream server stopped");
        Ok(())
    }

    fn spawn_session(&self, stream: TcpStream, peer: SocketAddr, cancel: CancelToken) {
        let state = Arc::clone(self.generator.state());
        let tick = self.generator.tick();
        let write_timeout = self.write_timeout;
        let sessions = Arc::clone(&self.sessions);
        let total = sessions.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Subscriber {} connected. Total subscribers: {}", peer, total);

        thread::spawn(move || {
            match handle_subscriber(stream, state, tick, write_timeout, cancel) {
                Ok(SessionEnd::Cancelled) => debug!("Session {} closed: shutdown", peer),
                Ok(SessionEnd::Disconnected) => info!("Subscriber {} disconnected", peer),
                Err(e) => info!("Subscriber {} dropped: {}", peer, e),
            }
            let left = sessions.fetch_sub(1, Ordering::SeqCst) - 1;
            debug!("Total subscribers: {}", left);
        });
    }
}

/// Poll `accept` until `cancel` fires, handing every connection to `on_accept`.
///
/// Accept failures (e.g. out of file descriptors) back off for `ACCEPT_POLL` like an idle
/// listener does, so a persistent fault cannot spin the loop.
fn accept_loop<C>(
    cancel: &CancelToken,
    mut accept: impl FnMut() -> io::Result<C>,
    mut on_accept: impl FnMut(C),
) {
    while !cancel.is_cancelled() {
        match accept() {
            Ok(conn) => on_accept(conn),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                cancel.wait(ACCEPT_POLL);
            }
            Err(e) => {
                error!("TCP connection error: {}", e);
                cancel.wait(ACCEPT_POLL);
            }
        }
    }
}
