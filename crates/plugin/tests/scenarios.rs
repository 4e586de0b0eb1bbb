mod common;

use common::{fixture, fixture_with, settle, wait_for, LOADING};
use repairme_core::RepairMeConfig;

#[test]
fn test_login_samples_once_then_logout_stays_idle() {
    let f = fixture();
    f.plugin.start().unwrap();
    assert!(f.plugin.latest_snapshot().is_none());

    f.host.login();
    assert!(wait_for(|| f.plugin.sample_count() == 1));
    assert!(wait_for(|| !f.plugin.gate().is_open()));

    let first = f.plugin.latest_snapshot().unwrap();
    assert_eq!(first.sequence, 1);
    assert_eq!(first.condition, vec![100.0, 87.5, 42.0]);

    f.host.logout();
    assert!(!f.plugin.gate().is_open());
    settle();
    assert_eq!(f.plugin.sample_count(), 1);
    assert_eq!(f.scanner.scans(), 1);
}

#[test]
fn test_login_refreshes_loading_probe() {
    let f = fixture();
    let before = f.plugin.probe().handle();
    let after = f.host.relocate_ui_object(LOADING, 1);

    f.host.login();
    assert_ne!(before, after);
    assert_eq!(f.plugin.probe().handle(), after);
}

#[test]
fn test_scanner_notification_triggers_sample() {
    let f = fixture();
    f.plugin.start().unwrap();

    f.scanner.notify();
    assert!(wait_for(|| f.plugin.sample_count() == 1));

    f.scanner.notify();
    assert!(wait_for(|| f.plugin.sample_count() == 2));
    assert_eq!(f.plugin.latest_snapshot().unwrap().sequence, 2);
}

#[test]
fn test_notifications_before_wake_are_not_queued() {
    let f = fixture();
    f.scanner.notify();
    f.scanner.notify();

    f.plugin.start().unwrap();
    assert!(wait_for(|| f.plugin.sample_count() == 1));
    settle();
    assert_eq!(f.plugin.sample_count(), 1);
}

#[test]
fn test_logout_suppresses_pending_signal() {
    let f = fixture();
    f.scanner.notify();
    f.host.logout();

    f.plugin.start().unwrap();
    settle();
    assert_eq!(f.plugin.sample_count(), 0);
}

#[test]
fn test_is_active() {
    let f = fixture();
    assert!(!f.plugin.is_active());

    f.host.login();
    assert!(f.plugin.is_active());

    f.host.set_visible(LOADING, 1, true);
    assert!(!f.plugin.is_active());

    f.host.set_visible(LOADING, 1, false);
    f.host.relocate_ui_object(LOADING, 1);
    assert!(f.plugin.is_active());
}

#[test]
fn test_custom_loading_addon() {
    let f = fixture_with(RepairMeConfig {
        loading_addon_name: "FadeMiddle".to_string(),
        loading_addon_index: 2,
        ..RepairMeConfig::default()
    });
    f.host.add_ui_object("FadeMiddle", 2, true);
    f.host.login();

    assert_eq!(f.plugin.probe().name(), "FadeMiddle");
    assert!(!f.plugin.is_active());
}

#[test]
fn test_debug_chat_echo() {
    let f = fixture_with(RepairMeConfig {
        debug_chat: true,
        ..RepairMeConfig::default()
    });
    f.plugin.start().unwrap();

    f.host.login();
    assert!(wait_for(|| f.host.chat_messages().len() == 1));
    assert_eq!(f.host.chat_messages()[0], "RepairMe update #1");
}
