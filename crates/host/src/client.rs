//! Client state and chat output interfaces

use crate::session::SessionEvents;

/// Client login state
pub trait ClientState: Send + Sync {
    /// Whether a character is currently logged in
    fn is_logged_in(&self) -> bool;

    /// The publisher that fires login/logout events for this client
    fn session_events(&self) -> &SessionEvents;
}

/// Chat window output
pub trait ChatGui: Send + Sync {
    /// Print a line to the local chat log
    fn print(&self, message: &str);
}
