//! C-compatible exports called by the host bridge
//!
//! The bridge loads one [`RepairMe`] through [`repairme_plugin_load`] and
//! forwards the client's login/logout notifications. Those are published on
//! the process-wide [`SessionEvents`], which is where the bridge client state
//! (and so every instance built on it) is subscribed.

use std::ffi::c_char;
use std::panic::UnwindSafe;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use tracing::instrument;

use repairme_host::{HostInterfaces, SessionEvents};

use super::bridge::{self, CallbackGui, CallbackScanner, LookupUiFn, ScanFn, VisibilityFn};
use crate::RepairMe;

// Plugin metadata - static strings with null terminators for C compatibility
static NAME: &[u8] = b"RepairMe\0";
static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();

/// The instance owned by the bridge, between load and unload
struct LoadedPlugin {
    plugin: RepairMe<CallbackScanner>,
    scanner: Arc<CallbackScanner>,
}

static LOADED: LazyLock<Mutex<Option<LoadedPlugin>>> = LazyLock::new(|| Mutex::new(None));

/// Called when the bridge loads the plugin
///
/// Reads the config file, installs logging and starts the update loop.
/// Returns `false` if a callback is missing, the plugin is already loaded, or
/// the loop could not be started.
///
/// # Safety
/// The callbacks must be safe to call from any thread until
/// [`repairme_plugin_unload`] returns.
#[no_mangle]
#[instrument(skip_all)]
pub unsafe extern "C" fn repairme_plugin_load(
    lookup: Option<LookupUiFn>,
    visible: Option<VisibilityFn>,
    scan: Option<ScanFn>,
) -> bool {
    let (Some(lookup), Some(visible), Some(scan)) = (lookup, visible, scan) else {
        tracing::error!("Refusing to load RepairMe: bridge callback is null");
        return false;
    };
    guarded("load", false, || load(lookup, visible, scan))
}

fn load(lookup: LookupUiFn, visible: VisibilityFn, scan: ScanFn) -> bool {
    let mut loaded = LOADED.lock();
    if loaded.is_some() {
        tracing::warn!("RepairMe is already loaded");
        return false;
    }

    let scanner = Arc::new(CallbackScanner::new(scan));
    let host = HostInterfaces::new(
        bridge::client_state(),
        Arc::new(CallbackGui::new(lookup, visible)),
    );
    let plugin = RepairMe::from_config_file(host, scanner.clone());
    if let Err(e) = plugin.start() {
        tracing::error!("Failed to start RepairMe: {}", e);
        return false;
    }

    *loaded = Some(LoadedPlugin { plugin, scanner });
    tracing::info!("RepairMe loaded");
    true
}

/// Called when the bridge unloads the plugin
///
/// Returns `false` if nothing was loaded.
#[no_mangle]
#[instrument]
pub extern "C" fn repairme_plugin_unload() -> bool {
    guarded("unload", false, || {
        let Some(loaded) = LOADED.lock().take() else {
            tracing::debug!("Unload without a loaded plugin");
            return false;
        };
        let exit = loaded.plugin.dispose();
        tracing::info!("RepairMe unloaded, update loop ended: {:?}", exit);
        true
    })
}

/// Called from the bridge when a character logs in
#[no_mangle]
#[instrument]
pub extern "C" fn repairme_on_login() {
    guarded("login", (), || {
        bridge::client_state().set_logged_in(true);
        SessionEvents::global().fire_login();
    });
}

/// Called from the bridge when a character logs out
#[no_mangle]
#[instrument]
pub extern "C" fn repairme_on_logout() {
    guarded("logout", (), || {
        bridge::client_state().set_logged_in(false);
        SessionEvents::global().fire_logout();
    });
}

/// Called from the bridge when the equipment state changed
#[no_mangle]
pub extern "C" fn repairme_notify_equipment_changed() {
    guarded("equipment", (), || {
        let scanner = LOADED.lock().as_ref().map(|l| l.scanner.clone());
        if let Some(scanner) = scanner {
            scanner.notify();
        }
    });
}

/// Copy the latest per-slot condition values into `out`
///
/// Writes at most `capacity` values and returns how many the snapshot holds,
/// or -1 if nothing is loaded or no sample was taken yet.
///
/// # Safety
/// `out` must be valid for `capacity` writes, or null with `capacity` 0.
#[no_mangle]
pub unsafe extern "C" fn repairme_latest_condition(out: *mut f32, capacity: usize) -> isize {
    let snapshot = LOADED
        .lock()
        .as_ref()
        .and_then(|l| l.plugin.latest_snapshot());
    let Some(snapshot) = snapshot else {
        return -1;
    };

    let count = snapshot.0.len().min(capacity);
    if count > 0 && !out.is_null() {
        std::ptr::copy_nonoverlapping(snapshot.0.as_ptr(), out, count);
    }
    snapshot.0.len() as isize
}

#[no_mangle]
pub extern "C" fn repairme_get_name() -> *const c_char {
    NAME.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn repairme_get_version() -> *const c_char {
    VERSION.as_ptr() as *const c_char
}

/// Keep panics from unwinding into the host
fn guarded<T>(event: &str, fallback: T, f: impl FnOnce() -> T + UnwindSafe) -> T {
    match std::panic::catch_unwind(f) {
        Ok(value) => value,
        Err(_) => {
            tracing::error!("Panic while dispatching {} event", event);
            fallback
        }
    }
}
