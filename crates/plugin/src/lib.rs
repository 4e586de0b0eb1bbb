//! RepairMe Plugin - Lifecycle and host bridge
//!
//! [`RepairMe`] wires the core pieces together:
//!
//! ```text
//! scanner notify ─┐
//!                 ├─▶ ActivityGate ─▶ update loop ─▶ LatestSnapshot ─▶ readers
//! session login ──┘        ▲
//! session logout ──────────┘ (close)
//! ```
//!
//! Construction subscribes to the host; [`RepairMe::start`] spawns the update
//! loop; [`RepairMe::dispose`] (or drop) tears everything down, removing the
//! session callbacks before anything else.

pub mod error;
pub mod ffi;
pub mod logging;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::instrument;

use repairme_core::{
    ActivityGate, CancellationToken, EquipmentSource, LatestSnapshot, LoopExit, PluginConfig,
    RepairMeConfig, SessionWatcher, UiProbe, UpdateLoop, UpdateWorker,
};
use repairme_host::HostInterfaces;

pub use error::LifecycleError;
pub use logging::init_logging;

#[derive(Default)]
struct Lifecycle {
    worker: Option<UpdateWorker>,
    disposed: bool,
}

/// The plugin instance
pub struct RepairMe<S: EquipmentSource> {
    host: HostInterfaces,
    source: Arc<S>,
    config: RepairMeConfig,
    gate: ActivityGate,
    probe: Arc<UiProbe>,
    watcher: SessionWatcher,
    latest: Arc<LatestSnapshot<S::Snapshot>>,
    lifecycle: Mutex<Lifecycle>,
}

impl<S: EquipmentSource> RepairMe<S> {
    /// Create the plugin and subscribe to host and scanner notifications
    ///
    /// The update loop does not run until [`start`](Self::start).
    pub fn new(host: HostInterfaces, source: Arc<S>, config: RepairMeConfig) -> Self {
        let gate = ActivityGate::new();

        let probe = Arc::new(UiProbe::new(
            host.game_gui.clone(),
            config.loading_addon_name.clone(),
            config.loading_addon_index,
        ));
        probe.refresh();

        let notify = gate.clone();
        source.set_notification_target(Some(Arc::new(move || notify.open())));

        let watcher =
            SessionWatcher::subscribe(host.client_state.clone(), probe.clone(), gate.clone());

        Self {
            host,
            source,
            config,
            gate,
            probe,
            watcher,
            latest: Arc::new(LatestSnapshot::new()),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Load the config file, install logging, and create the plugin
    ///
    /// A missing config file is created with defaults; an unreadable one is
    /// reported and replaced by defaults in memory.
    pub fn from_config_file(host: HostInterfaces, source: Arc<S>) -> Self {
        let loaded = RepairMeConfig::load();
        let config = loaded.as_ref().cloned().unwrap_or_default();
        init_logging(&config);
        if let Err(e) = loaded {
            tracing::warn!("Using default config: {}", e);
        }
        Self::new(host, source, config)
    }

    /// Spawn the update loop
    ///
    /// A loop that already ended (faulted or panicked) is reaped and replaced.
    ///
    /// # Errors
    /// - [`LifecycleError::AlreadyRunning`] if the loop is still running
    /// - [`LifecycleError::Disposed`] after [`dispose`](Self::dispose)
    /// - [`LifecycleError::Spawn`] if the thread could not be created
    #[instrument(skip_all)]
    pub fn start(&self) -> Result<(), LifecycleError> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.disposed {
            tracing::warn!("Refusing to start a disposed plugin");
            return Err(LifecycleError::Disposed);
        }

        if let Some(worker) = lifecycle.worker.take() {
            if !worker.is_finished() {
                lifecycle.worker = Some(worker);
                tracing::warn!("Update loop already running");
                return Err(LifecycleError::AlreadyRunning);
            }
            worker.join();
        }

        let update_loop = UpdateLoop::new(
            self.source.clone(),
            self.gate.clone(),
            CancellationToken::new(),
            self.latest.clone(),
            self.config.loop_settings(),
        )
        .with_chat(self.host.chat.clone());

        lifecycle.worker = Some(UpdateWorker::spawn(update_loop)?);
        tracing::info!("RepairMe update loop started");
        Ok(())
    }

    /// Tear the plugin down
    ///
    /// Idempotent. Order: session callbacks, scanner target, cancellation,
    /// gate, then joining the worker. Returns how the worker ended, if one
    /// was running.
    #[instrument(skip_all)]
    pub fn dispose(&self) -> Option<LoopExit> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.disposed {
            return None;
        }
        lifecycle.disposed = true;

        self.watcher.unsubscribe();
        self.source.set_notification_target(None);

        let worker = lifecycle.worker.take();
        if let Some(worker) = &worker {
            worker.cancel();
        }
        self.gate.dispose();

        let exit = worker.map(UpdateWorker::join);
        tracing::info!("RepairMe disposed");
        exit
    }

    /// The most recent equipment snapshot, `None` before the first sample
    pub fn latest_snapshot(&self) -> Option<Arc<S::Snapshot>> {
        self.latest.latest()
    }

    /// Number of snapshots taken so far
    pub fn sample_count(&self) -> u64 {
        self.latest.sample_count()
    }

    /// Logged in and not on the loading screen
    pub fn is_active(&self) -> bool {
        self.watcher.is_active()
    }

    /// Whether an update loop thread is alive
    pub fn is_running(&self) -> bool {
        self.lifecycle
            .lock()
            .worker
            .as_ref()
            .is_some_and(|w| !w.is_finished())
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.lock().disposed
    }

    pub fn gate(&self) -> &ActivityGate {
        &self.gate
    }

    pub fn probe(&self) -> &UiProbe {
        &self.probe
    }

    pub fn config(&self) -> &RepairMeConfig {
        &self.config
    }
}

impl<S: EquipmentSource> Drop for RepairMe<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
