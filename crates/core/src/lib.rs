//! RepairMe Core - Equipment update loop
//!
//! This crate contains the event loop that keeps an equipment snapshot fresh:
//! - [`gate`] - manual-reset signal the loop waits on
//! - [`cancel`] - cooperative cancellation token
//! - [`probe`] - loading screen visibility probe
//! - [`session`] - login/logout watcher driving the gate
//! - [`scanner`] - the equipment source seam
//! - [`snapshot`] - latest snapshot cell
//! - [`update_loop`] - the background loop and its owned worker
//! - [`config`] - TOML configuration
//!
//! # Re-exports
//!
//! The host interfaces crate is re-exported as [`host`].

pub use repairme_host as host;

pub mod cancel;
pub mod config;
pub mod gate;
pub mod probe;
pub mod scanner;
pub mod session;
pub mod snapshot;
pub mod update_loop;

pub use cancel::CancellationToken;
pub use config::{ConfigError, ConfigResult, PluginConfig, RepairMeConfig};
pub use gate::{ActivityGate, Wake};
pub use probe::UiProbe;
pub use scanner::{EquipmentSource, NotifyFn, ScanError};
pub use session::SessionWatcher;
pub use snapshot::LatestSnapshot;
pub use update_loop::{
    ClosePolicy, LoopExit, LoopSettings, UpdateLoop, UpdateWorker,
};
