//! Equipment source seam
//!
//! The equipment scanner lives outside this crate. The update loop only needs
//! two things from it: a synchronous pull of the current snapshot, and a
//! single-slot "data changed" notification target it can point at the gate.

use std::sync::Arc;

/// Callback the scanner invokes when new equipment data is available
pub type NotifyFn = Arc<dyn Fn() + Send + Sync>;

/// Error raised while building an equipment snapshot
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The scanner could not read equipment state
    #[error("Equipment scan failed: {0}")]
    Message(String),

    /// Any other failure reported by the scanner
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Producer of equipment snapshots
///
/// Implementations must be callable from the update loop's thread while the
/// host delivers notifications from its own threads.
pub trait EquipmentSource: Send + Sync + 'static {
    /// Snapshot type handed to readers
    type Snapshot: Send + Sync + 'static;

    /// Build the current equipment snapshot
    ///
    /// Expected to be bounded; the loop does not enforce a timeout.
    fn build_equipment_data(&self) -> Result<Self::Snapshot, ScanError>;

    /// Replace the notification target
    ///
    /// There is a single slot: setting a target drops the previous one,
    /// `None` detaches it.
    fn set_notification_target(&self, target: Option<NotifyFn>);
}
