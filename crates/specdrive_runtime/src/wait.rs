//! The `wait`/`done` primitive for asynchronous specs.
//!
//! A spec suspends in [`AsyncWaitHandle::wait`] until some task calls [`AsyncWaitHandle::done`]
//! or the timeout elapses. Waiting never blocks the thread, so timer tasks spawned on the same
//! current-thread runtime keep running.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Notify;

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(4000);

#[derive(Debug, Default)]
struct WaitState {
    done: AtomicBool,
    notify: Notify,
}

/// Returned by [`AsyncWaitHandle::wait`] when `done()` was not signalled in time.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("timeout waiting for spec")]
pub struct WaitTimeout {
    pub timeout: Duration,
}

/// Clones share one done flag; independent handles never interfere.
#[derive(Debug, Clone)]
pub struct AsyncWaitHandle {
    state: Arc<WaitState>,
    timeout: Duration,
}

impl Default for AsyncWaitHandle {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT)
    }
}

impl AsyncWaitHandle {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: Arc::new(WaitState::default()),
            timeout,
        }
    }

    /// A handle on the same state with a different timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            state: Arc::clone(&self.state),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_done(&self) -> bool {
        self.state.done.load(Ordering::SeqCst)
    }

    /// Signal completion and wake the waiter, if any.
    pub fn done(&self) {
        self.state.done.store(true, Ordering::SeqCst);
        self.state.notify.notify_one();
    }

    /// Suspend until `done()` is signalled, then reset the flag.
    ///
    /// ## Errors
    /// Returns [`WaitTimeout`] if the timeout elapses first. The flag is left untouched.
    pub async fn wait(&self) -> Result<(), WaitTimeout> {
        let state = &self.state;
        let signalled = async {
            loop {
                let notified = state.notify.notified();
                if state.done.swap(false, Ordering::SeqCst) {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(self.timeout, signalled).await.map_err(|_| {
            tracing::debug!(timeout_ms = self.timeout.as_millis() as u64, "wait timed out");
            WaitTimeout { timeout: self.timeout }
        })
    }
}
