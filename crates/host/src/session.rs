//! Login/logout event publisher
//!
//! Follows the listener registry pattern: callbacks live in a slotmap behind
//! an `RwLock` and are removed by the [`ListenerKey`] returned at
//! registration.
//!
//! Firing holds the read lock for the duration of the callbacks, and removal
//! takes the write lock. Once [`SessionEvents::remove_listener`] returns, the
//! callback is not running and will never run again, so its captured state can
//! be torn down safely.
//!
//! # Example
//!
//! ```ignore
//! use repairme_host::SessionEvents;
//!
//! let events = SessionEvents::global();
//! let key = events.on_login(|| tracing::info!("Logged in"));
//!
//! // Later, unregister before dropping anything the callback uses
//! events.remove_listener(key);
//! ```

use std::sync::LazyLock;

use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key for registered session listeners, used for removal
    pub struct ListenerKey;
}

/// Session lifecycle events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Login,
    Logout,
}

/// Callback for session events (no payload)
pub type SessionCallback = Box<dyn Fn() + Send + Sync>;

struct Listener {
    event: SessionEvent,
    callback: SessionCallback,
}

/// Registry of login/logout callbacks
pub struct SessionEvents {
    listeners: RwLock<SlotMap<ListenerKey, Listener>>,
}

static GLOBAL: LazyLock<SessionEvents> = LazyLock::new(SessionEvents::new);

impl SessionEvents {
    /// Create an empty publisher
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(SlotMap::with_key()),
        }
    }

    /// The process-wide publisher fed by the host bridge
    pub fn global() -> &'static SessionEvents {
        &GLOBAL
    }

    /// Register a callback to be called when a character logs in
    ///
    /// # Returns
    /// A key that can be used to unregister the callback via `remove_listener`.
    pub fn on_login<F>(&self, callback: F) -> ListenerKey
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(SessionEvent::Login, Box::new(callback))
    }

    /// Register a callback to be called when a character logs out
    ///
    /// # Returns
    /// A key that can be used to unregister the callback via `remove_listener`.
    pub fn on_logout<F>(&self, callback: F) -> ListenerKey
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(SessionEvent::Logout, Box::new(callback))
    }

    fn register(&self, event: SessionEvent, callback: SessionCallback) -> ListenerKey {
        self.listeners.write().insert(Listener { event, callback })
    }

    /// Remove a listener by its key
    ///
    /// Blocks until any in-flight dispatch has finished. Must not be called
    /// from inside a session callback.
    ///
    /// Returns `true` if the listener was found and removed.
    pub fn remove_listener(&self, key: ListenerKey) -> bool {
        self.listeners.write().remove(key).is_some()
    }

    /// Number of registered listeners for an event
    pub fn listener_count(&self, event: SessionEvent) -> usize {
        self.listeners
            .read()
            .values()
            .filter(|l| l.event == event)
            .count()
    }

    /// Fire all login callbacks
    pub fn fire_login(&self) {
        self.fire(SessionEvent::Login);
    }

    /// Fire all logout callbacks
    pub fn fire_logout(&self) {
        self.fire(SessionEvent::Logout);
    }

    fn fire(&self, event: SessionEvent) {
        tracing::debug!("Firing {:?}", event);
        let listeners = self.listeners.read();
        for (_, listener) in listeners.iter() {
            if listener.event == event {
                (listener.callback)();
            }
        }
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_fire_only_matching_event() {
        let events = SessionEvents::new();
        let logins = Arc::new(AtomicUsize::new(0));
        let logouts = Arc::new(AtomicUsize::new(0));

        let l = logins.clone();
        events.on_login(move || {
            l.fetch_add(1, Ordering::SeqCst);
        });
        let l = logouts.clone();
        events.on_logout(move || {
            l.fetch_add(1, Ordering::SeqCst);
        });

        events.fire_login();
        events.fire_login();
        events.fire_logout();

        assert_eq!(logins.load(Ordering::SeqCst), 2);
        assert_eq!(logouts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_removed_listener_is_not_called() {
        let events = SessionEvents::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let c = calls.clone();
        let key = events.on_login(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(events.listener_count(SessionEvent::Login), 1);

        assert!(events.remove_listener(key));
        assert!(!events.remove_listener(key));
        assert_eq!(events.listener_count(SessionEvent::Login), 0);

        events.fire_login();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_waits_for_in_flight_dispatch() {
        use std::time::Duration;

        let events = Arc::new(SessionEvents::new());
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        let (s, f) = (started.clone(), finished.clone());
        let key = events.on_login(move || {
            s.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            f.fetch_add(1, Ordering::SeqCst);
        });

        let firing = {
            let events = events.clone();
            std::thread::spawn(move || events.fire_login())
        };
        while started.load(Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }

        events.remove_listener(key);
        // The callback must have completed before removal returned
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        firing.join().unwrap();
    }
}
