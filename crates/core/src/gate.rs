//! Activity gate
//!
//! A manual-reset binary signal. Producers (scanner notifications, session
//! login) call [`ActivityGate::open`] from any thread; the update loop is the
//! only waiter and resets the gate itself after acting on a signal.
//!
//! ```text
//!            open()                      wait returns Opened
//! Blocked ───────────▶ Signaled ──────────────────────────▶ (loop samples)
//!    ▲                                                          │
//!    └──────────────── close() / close_if_unchanged() ─────────┘
//! ```
//!
//! Waiting does not consume the signal, so an `open()` that lands after the
//! previous reset makes the next wait return immediately.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::cancel::CancellationToken;

/// Why a wait on the gate returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The gate is signaled; `epoch` identifies the latest `open()`
    Opened { epoch: u64 },
    /// The cancellation token fired
    Cancelled,
    /// The gate was disposed
    Disposed,
}

#[derive(Debug, Default)]
struct GateState {
    signaled: bool,
    /// Number of `open()` calls so far
    epoch: u64,
    disposed: bool,
}

struct Shared {
    state: Mutex<GateState>,
    condvar: Condvar,
}

/// Binary signal shared between producers and the update loop
#[derive(Clone)]
pub struct ActivityGate {
    shared: Arc<Shared>,
}

impl ActivityGate {
    /// Create a gate in the Blocked state
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(GateState::default()),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Signal the gate. Idempotent; a no-op after disposal.
    pub fn open(&self) {
        let mut state = self.shared.state.lock();
        if state.disposed {
            tracing::trace!("Ignoring open on disposed gate");
            return;
        }
        state.signaled = true;
        state.epoch = state.epoch.wrapping_add(1);
        self.shared.condvar.notify_all();
    }

    /// Block the gate. Idempotent; a no-op after disposal.
    pub fn close(&self) {
        let mut state = self.shared.state.lock();
        if state.disposed {
            tracing::trace!("Ignoring close on disposed gate");
            return;
        }
        state.signaled = false;
    }

    /// Block the gate only if no `open()` happened since `epoch`
    ///
    /// Returns `true` if the gate was closed.
    pub fn close_if_unchanged(&self, epoch: u64) -> bool {
        let mut state = self.shared.state.lock();
        if state.disposed || state.epoch != epoch {
            return false;
        }
        state.signaled = false;
        true
    }

    pub fn is_open(&self) -> bool {
        let state = self.shared.state.lock();
        state.signaled && !state.disposed
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.state.lock().disposed
    }

    /// Release the gate
    ///
    /// Wakes the waiter with [`Wake::Disposed`]. Every later operation is a
    /// no-op and every later wait returns immediately.
    pub fn dispose(&self) {
        let mut state = self.shared.state.lock();
        state.disposed = true;
        state.signaled = false;
        self.shared.condvar.notify_all();
    }

    /// Block until the gate is signaled, `token` is cancelled, or the gate is
    /// disposed
    ///
    /// Cancellation takes priority over a pending signal. The signal is left
    /// set; the caller resets it after acting on it.
    pub fn wait_until_open_or_cancelled(&self, token: &CancellationToken) -> Wake {
        // Cancellation wakes us through the gate's own condvar. The callback
        // takes the state lock, so it cannot slip between our check and wait.
        let shared = self.shared.clone();
        let key = token.on_cancel(move || {
            let _state = shared.state.lock();
            shared.condvar.notify_all();
        });

        let wake = {
            let mut state = self.shared.state.lock();
            loop {
                if token.is_cancelled() {
                    break Wake::Cancelled;
                }
                if state.disposed {
                    break Wake::Disposed;
                }
                if state.signaled {
                    break Wake::Opened { epoch: state.epoch };
                }
                self.shared.condvar.wait(&mut state);
            }
        };

        token.remove_callback(key);
        wake
    }
}

impl Default for ActivityGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActivityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("ActivityGate")
            .field("signaled", &state.signaled)
            .field("epoch", &state.epoch)
            .field("disposed", &state.disposed)
            .finish()
    }
}
