//! Host services backed by bridge callbacks
//!
//! The native bridge cannot implement Rust traits, so it hands over plain
//! function pointers at load time. This module wraps them in the host
//! interfaces the core expects:
//!
//! - [`BridgeClientState`]: login flag set by the login/logout exports,
//!   session events on the process-wide publisher
//! - [`CallbackGui`]: UI lookup and visibility reads
//! - [`CallbackScanner`]: equipment reads plus the notification slot

use std::ffi::{c_char, CString};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use repairme_core::{EquipmentSource, NotifyFn, ScanError};
use repairme_host::{ClientState, GameGui, SessionEvents, UiError, UiHandle};

/// Look up a UI object by name and index
///
/// Returns the object's address, or 0 if there is no such object.
pub type LookupUiFn = unsafe extern "C" fn(name: *const c_char, index: u32) -> usize;

/// Read the visibility flag of the object at `addr` into `visible`
///
/// Returns `false` if `addr` no longer refers to a live object.
pub type VisibilityFn = unsafe extern "C" fn(addr: usize, visible: *mut bool) -> bool;

/// Write up to `capacity` per-slot condition values into `out`
///
/// Returns the number written, or a negative value if the scan failed.
pub type ScanFn = unsafe extern "C" fn(out: *mut f32, capacity: usize) -> isize;

/// Most equipment slots a single scan may report
pub const MAX_EQUIPMENT_SLOTS: usize = 16;

static CLIENT: LazyLock<Arc<BridgeClientState>> =
    LazyLock::new(|| Arc::new(BridgeClientState::default()));

/// The client state shared by every plugin instance in the process
pub fn client_state() -> Arc<BridgeClientState> {
    CLIENT.clone()
}

/// Client state driven by the login/logout exports
#[derive(Debug, Default)]
pub struct BridgeClientState {
    logged_in: AtomicBool,
}

impl BridgeClientState {
    pub(crate) fn set_logged_in(&self, logged_in: bool) {
        self.logged_in.store(logged_in, Ordering::SeqCst);
    }
}

impl ClientState for BridgeClientState {
    fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    fn session_events(&self) -> &SessionEvents {
        SessionEvents::global()
    }
}

/// [`GameGui`] over the bridge's UI callbacks
pub struct CallbackGui {
    lookup: LookupUiFn,
    visible: VisibilityFn,
}

impl CallbackGui {
    pub fn new(lookup: LookupUiFn, visible: VisibilityFn) -> Self {
        Self { lookup, visible }
    }
}

impl GameGui for CallbackGui {
    fn ui_object_by_name(&self, name: &str, index: u32) -> Option<UiHandle> {
        let Ok(name) = CString::new(name) else {
            tracing::debug!("UI object name {:?} contains a NUL byte", name);
            return None;
        };
        // SAFETY: the bridge keeps its callbacks valid while the plugin is loaded
        let addr = unsafe { (self.lookup)(name.as_ptr(), index) };
        UiHandle::from_raw(addr)
    }

    fn is_visible(&self, handle: UiHandle) -> Result<bool, UiError> {
        let mut visible = false;
        // SAFETY: `visible` outlives the call; the callback only writes through it
        if unsafe { (self.visible)(handle.addr(), &mut visible) } {
            Ok(visible)
        } else {
            Err(UiError::Stale(handle))
        }
    }
}

/// Per-slot equipment condition, in percent
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentCondition(pub Vec<f32>);

/// [`EquipmentSource`] over the bridge's scan callback
///
/// The bridge reports new data through the notify export, which lands in
/// [`notify`](Self::notify).
pub struct CallbackScanner {
    scan: ScanFn,
    target: Mutex<Option<NotifyFn>>,
}

impl CallbackScanner {
    pub fn new(scan: ScanFn) -> Self {
        Self {
            scan,
            target: Mutex::new(None),
        }
    }

    /// Invoke the current notification target, if any
    pub fn notify(&self) {
        let target = self.target.lock().clone();
        if let Some(target) = target {
            target();
        }
    }
}

impl EquipmentSource for CallbackScanner {
    type Snapshot = EquipmentCondition;

    fn build_equipment_data(&self) -> Result<EquipmentCondition, ScanError> {
        let mut slots = [0.0f32; MAX_EQUIPMENT_SLOTS];
        // SAFETY: `slots` is valid for `MAX_EQUIPMENT_SLOTS` writes
        let written = unsafe { (self.scan)(slots.as_mut_ptr(), slots.len()) };
        if written < 0 {
            return Err(ScanError::Message(format!(
                "equipment scan failed with code {}",
                written
            )));
        }
        let count = written.unsigned_abs().min(MAX_EQUIPMENT_SLOTS);
        Ok(EquipmentCondition(slots[..count].to_vec()))
    }

    fn set_notification_target(&self, target: Option<NotifyFn>) {
        *self.target.lock() = target;
    }
}
