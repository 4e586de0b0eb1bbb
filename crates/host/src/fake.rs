//! In-memory host for tests
//!
//! `FakeHost` implements every host interface with plain state that tests
//! can script: login state, named UI objects with visibility, stale handles
//! and a captured chat log.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::{ChatGui, ClientState};
use crate::error::UiError;
use crate::interfaces::HostInterfaces;
use crate::session::SessionEvents;
use crate::ui::{GameGui, UiHandle};

#[derive(Default)]
struct UiState {
    /// (name, index) -> current address
    named: HashMap<(String, u32), usize>,
    /// live address -> visibility
    live: HashMap<usize, bool>,
    next_addr: usize,
}

impl UiState {
    fn allocate(&mut self, visible: bool) -> usize {
        self.next_addr += 0x100;
        let addr = 0x1000 + self.next_addr;
        self.live.insert(addr, visible);
        addr
    }
}

/// Scriptable host implementation
#[derive(Default)]
pub struct FakeHost {
    logged_in: AtomicBool,
    events: SessionEvents,
    ui: Mutex<UiState>,
    lookups: AtomicUsize,
    visibility_queries: AtomicUsize,
    chat: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bundle this host as plugin interfaces, chat included
    pub fn interfaces(self: &Arc<Self>) -> HostInterfaces {
        HostInterfaces::new(self.clone(), self.clone()).with_chat(Some(self.clone()))
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.logged_in.store(logged_in, Ordering::SeqCst);
    }

    /// Mark logged in and fire login listeners
    pub fn login(&self) {
        self.set_logged_in(true);
        self.events.fire_login();
    }

    /// Mark logged out and fire logout listeners
    pub fn logout(&self) {
        self.set_logged_in(false);
        self.events.fire_logout();
    }

    /// Create (or recreate) a UI object; any previous handle for it goes stale
    pub fn add_ui_object(&self, name: &str, index: u32, visible: bool) -> UiHandle {
        let mut ui = self.ui.lock();
        let addr = ui.allocate(visible);
        if let Some(old) = ui.named.insert((name.to_string(), index), addr) {
            ui.live.remove(&old);
        }
        UiHandle::from_raw(addr).expect("fake addresses are non-zero")
    }

    /// Destroy a UI object; lookups return `None` and old handles go stale
    pub fn remove_ui_object(&self, name: &str, index: u32) {
        let mut ui = self.ui.lock();
        if let Some(old) = ui.named.remove(&(name.to_string(), index)) {
            ui.live.remove(&old);
        }
    }

    /// Move a UI object to a new address, keeping its visibility
    pub fn relocate_ui_object(&self, name: &str, index: u32) -> Option<UiHandle> {
        let visible = {
            let ui = self.ui.lock();
            let addr = *ui.named.get(&(name.to_string(), index))?;
            ui.live.get(&addr).copied().unwrap_or(false)
        };
        Some(self.add_ui_object(name, index, visible))
    }

    /// Change the visibility of an existing UI object
    pub fn set_visible(&self, name: &str, index: u32, visible: bool) {
        let mut ui = self.ui.lock();
        if let Some(addr) = ui.named.get(&(name.to_string(), index)).copied() {
            ui.live.insert(addr, visible);
        }
    }

    /// Number of `ui_object_by_name` calls so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of `is_visible` calls so far
    pub fn visibility_query_count(&self) -> usize {
        self.visibility_queries.load(Ordering::SeqCst)
    }

    pub fn chat_messages(&self) -> Vec<String> {
        self.chat.lock().clone()
    }
}

impl ClientState for FakeHost {
    fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    fn session_events(&self) -> &SessionEvents {
        &self.events
    }
}

impl GameGui for FakeHost {
    fn ui_object_by_name(&self, name: &str, index: u32) -> Option<UiHandle> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let ui = self.ui.lock();
        ui.named
            .get(&(name.to_string(), index))
            .and_then(|addr| UiHandle::from_raw(*addr))
    }

    fn is_visible(&self, handle: UiHandle) -> Result<bool, UiError> {
        self.visibility_queries.fetch_add(1, Ordering::SeqCst);
        self.ui
            .lock()
            .live
            .get(&handle.addr())
            .copied()
            .ok_or(UiError::Stale(handle))
    }
}

impl ChatGui for FakeHost {
    fn print(&self, message: &str) {
        self.chat.lock().push(message.to_string());
    }
}
