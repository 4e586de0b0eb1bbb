//! Error types for plugin lifecycle operations

/// Error type for `start`
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The update loop is already running
    #[error("Update loop already running")]
    AlreadyRunning,

    /// The plugin has been disposed
    #[error("Plugin already disposed")]
    Disposed,

    /// The OS refused to create the worker thread
    #[error("Failed to spawn update loop: {0}")]
    Spawn(#[from] std::io::Error),
}
