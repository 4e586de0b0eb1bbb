//! Session watcher
//!
//! Couples host login/logout events to the probe and the gate:
//! - login: the old UI handle is presumed stale, so refresh the probe, then
//!   open the gate to force a prompt first sample
//! - logout: close the gate; equipment state is meaningless while logged out
//!
//! The watcher also answers whether the session is *active*: logged in and
//! not sitting on the loading screen. That value is recomputed on every call
//! because it must reflect the live UI.

use std::sync::Arc;

use parking_lot::Mutex;

use repairme_host::{ClientState, ListenerKey};

use crate::gate::ActivityGate;
use crate::probe::UiProbe;

/// Login/logout subscription bound to a probe and a gate
pub struct SessionWatcher {
    client: Arc<dyn ClientState>,
    probe: Arc<UiProbe>,
    keys: Mutex<Option<(ListenerKey, ListenerKey)>>,
}

impl SessionWatcher {
    /// Subscribe to the client's session events
    pub fn subscribe(
        client: Arc<dyn ClientState>,
        probe: Arc<UiProbe>,
        gate: ActivityGate,
    ) -> Self {
        let events = client.session_events();

        let login_key = {
            let probe = probe.clone();
            let gate = gate.clone();
            events.on_login(move || {
                probe.refresh();
                gate.open();
            })
        };
        let logout_key = events.on_logout(move || gate.close());

        tracing::debug!("Session watcher subscribed");
        Self {
            client,
            probe,
            keys: Mutex::new(Some((login_key, logout_key))),
        }
    }

    /// Remove both session callbacks
    ///
    /// Idempotent. When this returns no callback is running and none will run
    /// again.
    pub fn unsubscribe(&self) {
        if let Some((login_key, logout_key)) = self.keys.lock().take() {
            let events = self.client.session_events();
            events.remove_listener(login_key);
            events.remove_listener(logout_key);
            tracing::debug!("Session watcher unsubscribed");
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.keys.lock().is_some()
    }

    /// Logged in and the loading screen is not visible
    pub fn is_active(&self) -> bool {
        self.client.is_logged_in() && !self.probe.is_visible()
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repairme_host::fake::FakeHost;
    use repairme_host::SessionEvent;

    const NAME: &str = "NowLoading";

    fn setup() -> (Arc<FakeHost>, Arc<UiProbe>, ActivityGate, SessionWatcher) {
        let host = FakeHost::new();
        let probe = Arc::new(UiProbe::new(host.clone(), NAME, 1));
        let gate = ActivityGate::new();
        let watcher = SessionWatcher::subscribe(host.clone(), probe.clone(), gate.clone());
        (host, probe, gate, watcher)
    }

    #[test]
    fn test_login_refreshes_probe_and_opens_gate() {
        let (host, probe, gate, _watcher) = setup();
        let handle = host.add_ui_object(NAME, 1, false);

        host.login();

        assert_eq!(probe.handle(), Some(handle));
        assert!(gate.is_open());
    }

    #[test]
    fn test_gate_follows_latest_session_event() {
        let (host, _probe, gate, _watcher) = setup();
        let sequence = [true, false, false, true, true, false, true];

        for login in sequence {
            if login {
                host.login();
            } else {
                host.logout();
            }
            assert_eq!(gate.is_open(), login);
        }
    }

    #[test]
    fn test_unsubscribe_is_idempotent_and_stops_callbacks() {
        let (host, _probe, gate, watcher) = setup();
        let events = host.session_events();
        assert_eq!(events.listener_count(SessionEvent::Login), 1);
        assert_eq!(events.listener_count(SessionEvent::Logout), 1);

        watcher.unsubscribe();
        watcher.unsubscribe();
        assert!(!watcher.is_subscribed());
        assert_eq!(events.listener_count(SessionEvent::Login), 0);
        assert_eq!(events.listener_count(SessionEvent::Logout), 0);

        host.login();
        assert!(!gate.is_open());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let (host, _probe, _gate, watcher) = setup();
        drop(watcher);
        assert_eq!(host.session_events().listener_count(SessionEvent::Login), 0);
    }

    #[test]
    fn test_is_active_tracks_login_and_loading_screen() {
        let (host, _probe, _gate, watcher) = setup();
        host.add_ui_object(NAME, 1, true);
        assert!(!watcher.is_active());

        host.login();
        assert!(!watcher.is_active());

        host.set_visible(NAME, 1, false);
        assert!(watcher.is_active());

        // A vanished loading screen counts as not loading
        host.remove_ui_object(NAME, 1);
        assert!(watcher.is_active());

        host.logout();
        assert!(!watcher.is_active());
    }
}
