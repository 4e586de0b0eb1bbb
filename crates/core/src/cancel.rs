//! Cooperative cancellation token
//!
//! A token is cancelled once and stays cancelled. Waiters either block on the
//! token itself ([`CancellationToken::wait_timeout`]) or register a wake-up
//! callback so that another primitive (the [`ActivityGate`]) can observe
//! cancellation while blocked on its own condition variable.
//!
//! [`ActivityGate`]: crate::gate::ActivityGate

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key for registered cancellation callbacks
    pub struct CancelKey;
}

type CancelCallback = Box<dyn Fn() + Send + Sync>;

struct Inner {
    cancelled: Mutex<bool>,
    condvar: Condvar,
    callbacks: Mutex<SlotMap<CancelKey, CancelCallback>>,
}

/// Shared cancellation flag; clones observe the same state
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: Mutex::new(false),
                condvar: Condvar::new(),
                callbacks: Mutex::new(SlotMap::with_key()),
            }),
        }
    }

    /// Request cancellation
    ///
    /// Idempotent. Wakes every `wait_timeout` caller and runs registered
    /// callbacks on the calling thread.
    pub fn cancel(&self) {
        {
            let mut cancelled = self.inner.cancelled.lock();
            if *cancelled {
                return;
            }
            *cancelled = true;
            self.inner.condvar.notify_all();
        }

        let callbacks = self.inner.callbacks.lock();
        for (_, callback) in callbacks.iter() {
            callback();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Block for up to `timeout` or until cancelled
    ///
    /// Returns `true` if the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self.inner.cancelled.lock();
        while !*cancelled {
            if self
                .inner
                .condvar
                .wait_until(&mut cancelled, deadline)
                .timed_out()
            {
                break;
            }
        }
        *cancelled
    }

    /// Register a callback to run when the token is cancelled
    ///
    /// Callbacks registered after cancellation are never called; check
    /// [`is_cancelled`](Self::is_cancelled) after registering.
    pub(crate) fn on_cancel<F>(&self, callback: F) -> CancelKey
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.callbacks.lock().insert(Box::new(callback))
    }

    pub(crate) fn remove_callback(&self, key: CancelKey) -> bool {
        self.inner.callbacks.lock().remove(key).is_some()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
