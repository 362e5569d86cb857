//! Bounded-window snapshot collection.
//!
//! For every HTTP request the gateway opens a fresh streaming session against the
//! generator, reads quotes until a hard wall-clock deadline, and reduces them to one
//! quote per symbol: the last one received wins. The session is torn down afterwards and
//! never reused.
//!
//! Deadline expiry, a stream error and end-of-stream all simply end the window; whatever
//! was collected by then is the answer, possibly empty. Only failing to open the session
//! at all is reported as an error.
//!
//! Name resolution counts against the window too: it runs on a helper thread that is
//! abandoned if the resolver has not answered by the deadline.

use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, bounded};
use log::{debug, info};
use quote_common::wire::{FrameReader, write_frame};
use quote_common::{Quote, QuoteError, Result, StreamRequest};

/// Default length of the collection window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);
/// Symbols requested when none are configured.
pub const DEFAULT_SYMBOLS: &str = "BTC,ETH,SBER";

/// Latest quote per symbol observed during one window.
#[derive(Debug, Default)]
pub struct Snapshot {
    quotes: HashMap<String, Quote>,
}

impl Snapshot {
    /// Keep `quote`, replacing any earlier quote for the same symbol.
    pub fn record(&mut self, quote: Quote) {
        self.quotes.insert(quote.symbol.clone(), quote);
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Flatten into a list sorted by symbol.
    pub fn into_quotes(self) -> Vec<Quote> {
        let mut quotes: Vec<Quote> = self.quotes.into_values().collect();
        quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        quotes
    }
}

/// Latest-value-wins reduction of an ordered quote sequence.
pub fn reduce_latest<I: IntoIterator<Item = Quote>>(quotes: I) -> Vec<Quote> {
    let mut snapshot = Snapshot::default();
    for quote in quotes {
        snapshot.record(quote);
    }
    snapshot.into_quotes()
}

/// Where to collect from and for how long.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub generator_addr: String,
    pub symbols: Vec<String>,
    pub window: Duration,
}

/// Opens one short-lived session per call to `collect`.
pub struct SnapshotCollector {
    config: GatewayConfig,
}

impl SnapshotCollector {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Collect quotes for one window. Blocks for at most the window length.
    pub fn collect(&self) -> Result<Vec<Quote>> {
        let deadline = Instant::now() + self.config.window;
        let mut stream = self.connect(deadline)?;
        stream.set_write_timeout(Some(remaining(deadline)?))?;
        write_frame(
            &mut stream,
            &StreamRequest::for_symbols(self.config.symbols.iter().cloned()),
        )?;
        debug!(
            "Collecting {:?} from {} for {:?}",
            self.config.symbols, self.config.generator_addr, self.config.window
        );

        let mut reader = FrameReader::new(stream);
        let mut snapshot = Snapshot::default();
        loop {
            let Ok(left) = remaining(deadline) else {
                break;
            };
            reader.get_ref().set_read_timeout(Some(left))?;
            match reader.read_frame::<Quote>() {
                Ok(quote) => snapshot.record(quote),
                Err(e) if e.is_timeout() => break,
                Err(e) => {
                    debug!("Stream ended before the deadline: {}", e);
                    break;
                }
            }
        }

        info!("Collected {} quotes", snapshot.len());
        Ok(snapshot.into_quotes())
    }

    fn connect(&self, deadline: Instant) -> Result<TcpStream> {
        let target = self.config.generator_addr.clone();
        let addrs: Vec<SocketAddr> =
            before_deadline(deadline, move || Ok(target.to_socket_addrs()?.collect()))?;
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, remaining(deadline)?) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => e.into(),
            None => QuoteError::InvalidAddress(self.config.generator_addr.clone()),
        })
    }
}

/// Run blocking `task` on a helper thread and give up on it at `deadline`.
fn before_deadline<T, F>(deadline: Instant, task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    let left = remaining(deadline)?;
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        // The receiver is gone if the deadline already passed.
        let _ = tx.send(task());
    });
    match rx.recv_timeout(left) {
        Ok(result) => Ok(result?),
        Err(RecvTimeoutError::Timeout) => Err(io::Error::from(io::ErrorKind::TimedOut).into()),
        Err(RecvTimeoutError::Disconnected) => {
            Err(QuoteError::Format("resolver thread panicked".to_string()))
        }
    }
}

/// Time left before `deadline`, or a timeout error once it has passed.
fn remaining(deadline: Instant) -> Result<Duration> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        return Err(io::Error::from(io::ErrorKind::TimedOut).into());
    }
    Ok(left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn latest_value_wins() {
        let reduced = reduce_latest([
            Quote::new("BTC", 100.0, 1),
            Quote::new("BTC", 101.0, 2),
            Quote::new("ETH", 50.0, 3),
        ]);
        assert_eq!(
            reduced,
            vec![Quote::new("BTC", 101.0, 2), Quote::new("ETH", 50.0, 3)]
        );
    }

    #[test]
    fn empty_input_reduces_to_empty_list() {
        assert!(reduce_latest(Vec::new()).is_empty());
    }

    fn collector(addr: String, window: Duration) -> SnapshotCollector {
        SnapshotCollector::new(GatewayConfig {
            generator_addr: addr,
            symbols: vec!["BTC".to_string(), "ETH".to_string()],
            window,
        })
    }

    #[test]
    fn end_of_stream_returns_what_was_seen() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let fake = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut reader = FrameReader::new(conn.try_clone().unwrap());
            let request: StreamRequest = reader.read_frame().unwrap();
            for quote in [
                Quote::new("BTC", 100.0, 1),
                Quote::new("BTC", 101.0, 2),
                Quote::new("ETH", 50.0, 3),
            ] {
                write_frame(&mut conn, &quote).unwrap();
            }
            conn.flush().unwrap();
            request
        });

        let started = Instant::now();
        let quotes = collector(addr.to_string(), Duration::from_secs(5))
            .collect()
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(
            quotes,
            vec![Quote::new("BTC", 101.0, 2), Quote::new("ETH", 50.0, 3)]
        );
        assert_eq!(fake.join().unwrap().symbols, vec!["BTC", "ETH"]);
    }

    #[test]
    fn silent_stream_yields_empty_snapshot_at_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let fake = thread::spawn(move || {
            let (conn, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(600));
            drop(conn);
        });

        let started = Instant::now();
        let quotes = collector(addr.to_string(), Duration::from_millis(200))
            .collect()
            .unwrap();
        let elapsed = started.elapsed();
        assert!(quotes.is_empty());
        assert!(elapsed >= Duration::from_millis(150));
        assert!(elapsed < Duration::from_millis(550));
        fake.join().unwrap();
    }

    #[test]
    fn refused_connection_is_an_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let result = collector(addr.to_string(), Duration::from_secs(1)).collect();
        assert!(matches!(result, Err(QuoteError::Io(_))));
    }

    #[test]
    fn hung_blocking_step_is_cut_off_at_deadline() {
        let started = Instant::now();
        let result = before_deadline(started + Duration::from_millis(100), || {
            thread::sleep(Duration::from_secs(5));
            Ok(())
        });
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(result, Err(ref e) if e.is_timeout()));
    }

    #[test]
    fn blocking_step_within_deadline_passes_its_result_through() {
        let deadline = Instant::now() + Duration::from_secs(5);
        assert_eq!(before_deadline(deadline, || Ok(7)).unwrap(), 7);
        let failed = before_deadline(deadline, || -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        });
        assert!(matches!(failed, Err(QuoteError::Io(_))));
    }
}
