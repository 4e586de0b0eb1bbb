//! UI object handles and the game GUI interface
//!
//! The host owns every UI object. The plugin only ever holds a [`UiHandle`],
//! an opaque address that the host can dereference. A handle is not owned and
//! may be invalidated by the host at any time (screen transitions, UI
//! teardown); dereferencing a stale handle yields [`UiError::Stale`] instead of
//! faulting.

use std::fmt;
use std::num::NonZeroUsize;

use crate::error::UiError;

/// Non-owning reference to a host UI object
///
/// A handle is just the object's address as reported by the host. Only the
/// [`GameGui`] that produced it can tell whether it is still valid.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UiHandle(NonZeroUsize);

impl UiHandle {
    /// Wrap a raw address, returning `None` for null
    #[inline]
    pub const fn from_raw(addr: usize) -> Option<Self> {
        match NonZeroUsize::new(addr) {
            Some(nz) => Some(Self(nz)),
            None => None,
        }
    }

    /// Get the raw address
    #[inline]
    pub const fn addr(&self) -> usize {
        self.0.get()
    }
}

impl fmt::Debug for UiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UiHandle({:#x})", self.addr())
    }
}

/// Game GUI interface
///
/// Implemented by the host bridge. Both methods are called from the plugin's
/// background thread as well as from host event callbacks.
pub trait GameGui: Send + Sync {
    /// Look up a UI object by name and index
    ///
    /// Returns `None` if the host has no such object right now.
    fn ui_object_by_name(&self, name: &str, index: u32) -> Option<UiHandle>;

    /// Read the visibility flag of a UI object
    ///
    /// # Errors
    /// [`UiError::Stale`] if the handle no longer refers to a live object.
    fn is_visible(&self, handle: UiHandle) -> Result<bool, UiError>;
}
