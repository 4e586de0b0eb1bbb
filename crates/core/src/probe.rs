//! Loading screen probe
//!
//! Tracks a host UI object by name and index and answers "is it visible?".
//! The host may invalidate the handle between frames, so a failed query
//! re-resolves the handle once and retries. If that fails too the probe
//! reports "not visible", which lets sampling proceed instead of stalling it
//! on a UI lookup glitch.

use std::sync::Arc;

use parking_lot::Mutex;

use repairme_host::{GameGui, UiError, UiHandle};

/// Re-resolvable reference to a host UI object
pub struct UiProbe {
    gui: Arc<dyn GameGui>,
    name: String,
    index: u32,
    handle: Mutex<Option<UiHandle>>,
}

impl UiProbe {
    /// Create a probe for `name`/`index` without resolving it yet
    pub fn new(gui: Arc<dyn GameGui>, name: impl Into<String>, index: u32) -> Self {
        Self {
            gui,
            name: name.into(),
            index,
            handle: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// The currently stored handle, if any
    pub fn handle(&self) -> Option<UiHandle> {
        *self.handle.lock()
    }

    /// Re-resolve the handle from the host
    ///
    /// An absent object is stored as absent; it is not an error.
    pub fn refresh(&self) {
        let handle = self.gui.ui_object_by_name(&self.name, self.index);
        tracing::debug!("Resolved {}#{} -> {:?}", self.name, self.index, handle);
        *self.handle.lock() = handle;
    }

    /// Whether the UI object is currently visible
    ///
    /// Never fails: one stale lookup triggers a refresh and retry, a second
    /// failure yields `false`.
    pub fn is_visible(&self) -> bool {
        if self.handle().is_none() {
            self.refresh();
        }

        match self.query() {
            Ok(visible) => visible,
            Err(first) => {
                tracing::debug!("{} is being problematic: {}", self.name, first);
                self.refresh();
                match self.query() {
                    Ok(visible) => visible,
                    Err(second) => {
                        tracing::debug!("{} is nowhere to be found: {}", self.name, second);
                        false
                    }
                }
            }
        }
    }

    fn query(&self) -> Result<bool, UiError> {
        // Copy the handle out so the host call runs without our lock held
        match self.handle() {
            Some(handle) => self.gui.is_visible(handle),
            None => Err(UiError::Absent {
                name: self.name.clone(),
                index: self.index,
            }),
        }
    }
}

impl std::fmt::Debug for UiProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiProbe")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("handle", &self.handle())
            .finish()
    }
}
