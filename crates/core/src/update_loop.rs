//! Equipment update loop
//!
//! A single background thread that samples equipment whenever the gate is
//! signaled:
//!
//! ```text
//!   ┌──────┐  gate signaled   ┌──────────┐
//!   │ Idle │ ───────────────▶ │ Sampling │
//!   └──────┘ ◀─────────────── └──────────┘
//!      │      stored + closed       │
//!      │ cancelled / disposed       │ scan error
//!      ▼                            ▼
//!   ┌─────────┐               ┌─────────┐
//!   │ Stopped │               │ Stopped │ (faulted, not restarted)
//!   └─────────┘               └─────────┘
//! ```
//!
//! Scan errors and panics are logged on the worker thread as soon as they
//! end the loop. The worker is owned: [`UpdateWorker::join`] hands the
//! [`LoopExit`] back to the owner.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use repairme_host::ChatGui;

use crate::cancel::CancellationToken;
use crate::gate::{ActivityGate, Wake};
use crate::scanner::{EquipmentSource, ScanError};
use crate::snapshot::LatestSnapshot;

/// Name of the background thread
pub const THREAD_NAME: &str = "repairme-update";

/// How the gate is reset after a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosePolicy {
    /// Always close; a signal raised during the pull is discarded
    #[default]
    Unconditional,
    /// Close only if nothing re-opened the gate during the pull
    PreserveNewSignals,
}

/// Loop behavior knobs, derived from the plugin config
#[derive(Debug, Clone, Default)]
pub struct LoopSettings {
    /// Pause after each sample; zero disables it
    pub cooldown: Duration,
    pub close_policy: ClosePolicy,
    /// Echo every sample to chat
    pub debug_chat: bool,
}

/// Why the loop stopped
#[derive(Debug)]
pub enum LoopExit {
    Cancelled,
    Disposed,
    /// A scan failed; the loop must be started again explicitly
    Faulted(ScanError),
    /// The loop panicked; same recovery as `Faulted`
    Panicked(String),
}

impl LoopExit {
    /// Whether this is an orderly shutdown rather than a failure
    pub fn is_expected(&self) -> bool {
        matches!(self, LoopExit::Cancelled | LoopExit::Disposed)
    }
}

/// State owned by the background thread
pub struct UpdateLoop<S: EquipmentSource> {
    source: Arc<S>,
    gate: ActivityGate,
    token: CancellationToken,
    latest: Arc<LatestSnapshot<S::Snapshot>>,
    chat: Option<Arc<dyn ChatGui>>,
    settings: LoopSettings,
}

impl<S: EquipmentSource> UpdateLoop<S> {
    pub fn new(
        source: Arc<S>,
        gate: ActivityGate,
        token: CancellationToken,
        latest: Arc<LatestSnapshot<S::Snapshot>>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            source,
            gate,
            token,
            latest,
            chat: None,
            settings,
        }
    }

    /// Set optional chat output for the debug echo
    pub fn with_chat(mut self, chat: Option<Arc<dyn ChatGui>>) -> Self {
        self.chat = chat;
        self
    }

    /// Run until cancelled, disposed, or a scan fails
    pub fn run(self) -> LoopExit {
        tracing::debug!("Update loop running");
        loop {
            let epoch = match self.gate.wait_until_open_or_cancelled(&self.token) {
                Wake::Opened { epoch } => epoch,
                Wake::Cancelled => return LoopExit::Cancelled,
                Wake::Disposed => return LoopExit::Disposed,
            };

            if let Err(e) = self.sample() {
                tracing::error!("Prevented update loop crash, sampling stopped: {}", e);
                return LoopExit::Faulted(e);
            }

            match self.settings.close_policy {
                ClosePolicy::Unconditional => self.gate.close(),
                ClosePolicy::PreserveNewSignals => {
                    if !self.gate.close_if_unchanged(epoch) {
                        tracing::trace!("Gate re-opened during sample, keeping signal");
                    }
                }
            }

            if self.token.is_cancelled() {
                return LoopExit::Cancelled;
            }
            if !self.settings.cooldown.is_zero() && self.token.wait_timeout(self.settings.cooldown)
            {
                return LoopExit::Cancelled;
            }
        }
    }

    fn sample(&self) -> Result<(), ScanError> {
        let snapshot = self.source.build_equipment_data()?;
        let count = self.latest.store(snapshot);
        tracing::trace!("Stored equipment snapshot #{}", count);

        if self.settings.debug_chat {
            if let Some(chat) = &self.chat {
                chat.print(&format!("RepairMe update #{}", count));
            }
        }
        Ok(())
    }
}

/// Owned handle to the background thread
pub struct UpdateWorker {
    handle: JoinHandle<LoopExit>,
    token: CancellationToken,
}

impl UpdateWorker {
    /// Spawn the loop on a named thread
    ///
    /// A panic inside the loop is caught on the worker thread and reported
    /// there, without waiting for the owner to join.
    pub fn spawn<S: EquipmentSource>(update_loop: UpdateLoop<S>) -> std::io::Result<Self> {
        let token = update_loop.token.clone();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                match panic::catch_unwind(AssertUnwindSafe(move || update_loop.run())) {
                    Ok(exit) => exit,
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        tracing::error!(
                            "RepairMe stopped unexpectedly. Restart it to continue using it: {}",
                            message
                        );
                        LoopExit::Panicked(message)
                    }
                }
            })?;
        Ok(Self { handle, token })
    }

    /// Whether the thread has finished (for any reason)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Request cooperative shutdown; observed at the next wait
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the thread and return how the loop ended
    ///
    /// Faults were already logged by the loop itself.
    pub fn join(self) -> LoopExit {
        let exit = match self.handle.join() {
            Ok(exit) => exit,
            // Only reachable if the panic hook itself panicked
            Err(payload) => LoopExit::Panicked(panic_message(payload.as_ref())),
        };
        tracing::debug!("Update loop ended: {:?}", exit);
        exit
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
