//! Per-subscriber streaming session.
//!
//! A session owns one accepted TCP connection. It reads the opening `StreamRequest`,
//! resolves the symbols to serve, then every tick takes one `PriceSnapshot` and writes
//! one `Quote` frame per resolved symbol. Each session runs on its own thread with its
//! own pacing and its own socket buffer, so a slow subscriber only ever slows itself.
//!
//! The session ends when:
//! - a write fails (the subscriber went away or stopped reading past the write timeout),
//! - the subscriber hangs up while no symbols are being streamed to it, or
//! - the server is shutting down.
//!
//! Errors are returned to the caller, which logs them; they never reach other sessions
//! or the mutation loop.

use std::io::{BufWriter, ErrorKind, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use quote_common::wire::{FrameReader, write_frame};
use quote_common::{CancelToken, Result, StreamRequest};

use crate::model::price_state::PriceState;

/// How long a new connection may take to send its request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Default bound on a single write to a subscriber that stopped reading.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Server shutdown.
    Cancelled,
    /// The subscriber closed its side of the connection.
    Disconnected,
}

/// Serve one subscriber until it disconnects, errors, or `cancel` fires.
pub fn handle_subscriber(
    stream: TcpStream,
    state: Arc<PriceState>,
    tick: Duration,
    write_timeout: Duration,
    cancel: CancelToken,
) -> Result<SessionEnd> {
    let peer = stream.peer_addr()?;

    stream.set_read_timeout(Some(REQUEST_TIMEOUT))?;
    let mut reader = FrameReader::new(stream.try_clone()?);
    let request: StreamRequest = reader.read_frame()?;
    let symbols = state.resolve(&request.symbols);
    info!(
        "Subscriber {} requested {:?}, streaming {:?}",
        peer, request.symbols, symbols
    );

    stream.set_write_timeout(Some(write_timeout))?;
    let mut writer = BufWriter::new(stream);

    loop {
        if symbols.is_empty() {
            if peer_hung_up(writer.get_ref())? {
                return Ok(SessionEnd::Disconnected);
            }
        } else {
            let snapshot = state.snapshot();
            for quote in snapshot.quotes(&symbols) {
                write_frame(&mut writer, &quote)?;
            }
            writer.flush()?;
            debug!("Sent {} quotes to {}", symbols.len(), peer);
        }

        if cancel.wait(tick) {
            return Ok(SessionEnd::Cancelled);
        }
    }
}

/// Non-blocking probe for an orderly shutdown by the peer.
fn peer_hung_up(stream: &TcpStream) -> Result<bool> {
    let mut probe = [0u8; 1];
    stream.set_nonblocking(true)?;
    let result = stream.peek(&mut probe);
    stream.set_nonblocking(false)?;
    match result {
        Ok(0) => Ok(true),
        Ok(_) => Ok(false),
        Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(false),
        Err(e) => Err(e.into()),
    }
}
