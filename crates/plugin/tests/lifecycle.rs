mod common;

use common::{fixture, settle, wait_for};
use repairme::LifecycleError;
use repairme_core::LoopExit;
use repairme_host::{ClientState, SessionEvent};

#[test]
fn test_second_start_is_rejected() {
    let f = fixture();
    f.plugin.start().unwrap();
    assert!(f.plugin.is_running());

    assert!(matches!(
        f.plugin.start(),
        Err(LifecycleError::AlreadyRunning)
    ));

    // Still exactly one loop: one signal, one sample
    f.scanner.notify();
    assert!(wait_for(|| f.plugin.sample_count() == 1));
    settle();
    assert_eq!(f.scanner.scans(), 1);
}

#[test]
fn test_dispose_stops_loop_and_is_idempotent() {
    let f = fixture();
    f.plugin.start().unwrap();

    let exit = f.plugin.dispose();
    assert!(matches!(exit, Some(LoopExit::Cancelled)));
    assert!(f.plugin.is_disposed());
    assert!(!f.plugin.is_running());

    assert!(f.plugin.dispose().is_none());
    assert!(matches!(f.plugin.start(), Err(LifecycleError::Disposed)));
}

#[test]
fn test_dispose_without_start() {
    let f = fixture();
    assert!(f.plugin.dispose().is_none());
    assert!(f.plugin.gate().is_disposed());
}

#[test]
fn test_dispose_unsubscribes_before_detaching_scanner() {
    let f = fixture();
    let events = f.host.session_events();
    assert_eq!(events.listener_count(SessionEvent::Login), 1);

    f.plugin.start().unwrap();
    f.plugin.dispose();

    assert_eq!(f.scanner.listeners_at_detach(), Some(0));
    assert!(!f.scanner.has_target());
    assert_eq!(events.listener_count(SessionEvent::Login), 0);
    assert_eq!(events.listener_count(SessionEvent::Logout), 0);
}

#[test]
fn test_events_after_dispose_are_harmless() {
    let f = fixture();
    f.plugin.start().unwrap();
    f.plugin.dispose();

    f.host.login();
    f.host.logout();
    f.scanner.notify();
    f.plugin.gate().open();
    f.plugin.gate().close();

    assert!(!f.plugin.gate().is_open());
    assert_eq!(f.plugin.sample_count(), 0);
}

#[test]
fn test_restart_after_scan_fault() {
    let f = fixture();
    f.scanner.set_failing(true);
    f.plugin.start().unwrap();

    f.scanner.notify();
    assert!(wait_for(|| !f.plugin.is_running()));
    assert!(f.plugin.latest_snapshot().is_none());

    f.scanner.set_failing(false);
    f.plugin.start().unwrap();
    // The signal that faulted the old loop is still pending
    assert!(wait_for(|| f.plugin.sample_count() == 1));
    assert_eq!(f.plugin.latest_snapshot().unwrap().sequence, 1);
}

#[test]
fn test_drop_disposes() {
    let f = fixture();
    f.plugin.start().unwrap();
    let host = f.host.clone();
    drop(f);

    let events = host.session_events();
    assert_eq!(events.listener_count(SessionEvent::Login), 0);
}
