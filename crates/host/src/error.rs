//! Error types for host queries

use crate::ui::UiHandle;

/// Error type for UI object queries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UiError {
    /// The handle no longer points at a live UI object
    #[error("UI object {0:?} is no longer valid")]
    Stale(UiHandle),

    /// No handle has been resolved for the requested object
    #[error("UI object {name}#{index} not resolved")]
    Absent { name: String, index: u32 },
}
