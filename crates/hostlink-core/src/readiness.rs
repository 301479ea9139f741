//! One-shot readiness handshake between a trigger and its worker
//!
//! The signal starts `Pending` and moves exactly once, either to `Ready`
//! (raised by the trigger) or to `Cancelled`. Waiters block on a condvar
//! instead of sleeping, so a raise wakes them immediately.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Observable state of a [`ReadinessSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    /// Not raised yet
    Pending,
    /// Raised; the worker may invoke
    Ready,
    /// Withdrawn; the worker must not invoke
    Cancelled,
}

struct Inner {
    state: SignalState,
    /// When the signal left `Pending`
    settled_at: Option<Instant>,
}

/// Monotonic, single-transition readiness flag.
pub struct ReadinessSignal {
    inner: Mutex<Inner>,
    changed: Condvar,
}

impl ReadinessSignal {
    /// Create a pending signal.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: SignalState::Pending,
                settled_at: None,
            }),
            changed: Condvar::new(),
        }
    }

    /// Move to `Ready`. Returns `true` if this call made the transition.
    pub fn raise(&self) -> bool {
        self.settle(SignalState::Ready)
    }

    /// Move to `Cancelled`. Returns `true` if this call made the transition;
    /// a raised signal cannot be cancelled.
    pub fn cancel(&self) -> bool {
        self.settle(SignalState::Cancelled)
    }

    fn settle(&self, to: SignalState) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != SignalState::Pending {
            return false;
        }
        inner.state = to;
        inner.settled_at = Some(Instant::now());
        self.changed.notify_all();
        true
    }

    /// Current state.
    pub fn state(&self) -> SignalState {
        self.inner.lock().state
    }

    /// Whether the signal has been raised.
    pub fn is_ready(&self) -> bool {
        self.state() == SignalState::Ready
    }

    /// When the signal was raised, if it was.
    pub fn raised_at(&self) -> Option<Instant> {
        let inner = self.inner.lock();
        match inner.state {
            SignalState::Ready => inner.settled_at,
            _ => None,
        }
    }

    /// Block until the signal settles or `timeout` elapses, whichever is
    /// first. Returns the state observed on wake-up.
    pub fn wait_timeout(&self, timeout: Duration) -> SignalState {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.wait();
        };
        let mut inner = self.inner.lock();
        while inner.state == SignalState::Pending {
            if self.changed.wait_until(&mut inner, deadline).timed_out() {
                break;
            }
        }
        inner.state
    }

    /// Block until the signal settles.
    pub fn wait(&self) -> SignalState {
        let mut inner = self.inner.lock();
        while inner.state == SignalState::Pending {
            self.changed.wait(&mut inner);
        }
        inner.state
    }
}

impl Default for ReadinessSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_raise_is_one_shot() {
        let signal = ReadinessSignal::new();
        assert_eq!(signal.state(), SignalState::Pending);
        assert!(signal.raised_at().is_none());

        assert!(signal.raise());
        assert!(!signal.raise());
        assert!(!signal.cancel());
        assert!(signal.is_ready());
        assert!(signal.raised_at().is_some());
    }

    #[test]
    fn test_cancel_blocks_raise() {
        let signal = ReadinessSignal::new();
        assert!(signal.cancel());
        assert!(!signal.raise());
        assert_eq!(signal.state(), SignalState::Cancelled);
        assert!(signal.raised_at().is_none());
    }

    #[test]
    fn test_wait_timeout_expires_while_pending() {
        let signal = ReadinessSignal::new();
        let start = Instant::now();
        assert_eq!(signal.wait_timeout(Duration::from_millis(20)), SignalState::Pending);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_raise_wakes_waiter_early() {
        let signal = Arc::new(ReadinessSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                let start = Instant::now();
                let state = signal.wait_timeout(Duration::from_secs(10));
                (state, start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        signal.raise();

        let (state, waited) = waiter.join().unwrap();
        assert_eq!(state, SignalState::Ready);
        assert!(waited < Duration::from_secs(10));
    }

    #[test]
    fn test_wait_returns_after_settle() {
        let signal = Arc::new(ReadinessSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait())
        };
        thread::sleep(Duration::from_millis(10));
        signal.cancel();
        assert_eq!(waiter.join().unwrap(), SignalState::Cancelled);
    }
}
