//! Host service bundle
//!
//! The host hands the plugin its services once, at construction. All of them
//! live for the plugin's lifetime and are shared with the background loop.

use std::sync::Arc;

use crate::client::{ChatGui, ClientState};
use crate::ui::GameGui;

/// Host services used by the plugin
#[derive(Clone)]
pub struct HostInterfaces {
    /// Login state and session events (required)
    pub client_state: Arc<dyn ClientState>,

    /// UI object lookup (required)
    pub game_gui: Arc<dyn GameGui>,

    /// Chat output (optional)
    pub chat: Option<Arc<dyn ChatGui>>,
}

impl HostInterfaces {
    /// Create a new bundle from the required services
    pub fn new(client_state: Arc<dyn ClientState>, game_gui: Arc<dyn GameGui>) -> Self {
        Self {
            client_state,
            game_gui,
            chat: None,
        }
    }

    /// Set optional chat output
    pub fn with_chat(mut self, chat: Option<Arc<dyn ChatGui>>) -> Self {
        self.chat = chat;
        self
    }
}

impl std::fmt::Debug for HostInterfaces {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostInterfaces")
            .field("chat", &self.chat.is_some())
            .finish_non_exhaustive()
    }
}
