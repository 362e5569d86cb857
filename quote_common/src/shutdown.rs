//! Cooperative cancellation for background loops.
//!
//! A `CancelToken` is a cloneable handle around a crossbeam channel whose only sender
//! is dropped on `cancel()`. Every clone then observes a disconnected channel, which
//! wakes any thread blocked in `wait` immediately. Nothing is ever sent on the channel.
use std::future::{Future, pending};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};
use log::error;

/// Cloneable cancellation signal shared between a loop and its owner.
#[derive(Clone)]
pub struct CancelToken {
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    signal: Receiver<()>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: rx,
        }
    }

    /// Cancel this token and every clone of it. Idempotent.
    pub fn cancel(&self) {
        let mut trigger = match self.trigger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        trigger.take();
    }

    /// True once `cancel` has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.signal.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Sleep for up to `timeout`, waking early on cancellation.
    ///
    /// Returns `true` if the token was cancelled, `false` if the full timeout elapsed.
    pub fn wait(&self, timeout: Duration) -> bool {
        matches!(
            self.signal.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `signal` delivers, e.g. `until_signal(tokio::signal::ctrl_c())`.
///
/// If the handler cannot be installed the error is logged and this never resolves, so a
/// service keeps running instead of shutting down right after startup.
pub async fn until_signal<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to listen for the shutdown signal: {}", e);
        pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn wait_times_out_when_not_cancelled() {
        let token = CancelToken::new();
        assert!(!token.wait(Duration::from_millis(20)));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_seen_by_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        token.cancel();
        assert!(clone.is_cancelled());
        assert!(clone.wait(Duration::from_secs(5)));
    }

    #[test]
    fn cancel_wakes_a_waiting_thread() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let started = Instant::now();
        let handle = thread::spawn(move || waiter.wait(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(50));
        token.cancel();
        assert!(handle.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn delivered_signal_resolves() {
        until_signal(async { Ok(()) }).await;
    }

    #[tokio::test]
    async fn failed_signal_registration_never_resolves() {
        let failing = async { Err(io::Error::other("signal driver unavailable")) };
        let outcome =
            tokio::time::timeout(Duration::from_millis(100), until_signal(failing)).await;
        assert!(outcome.is_err());
    }
}
