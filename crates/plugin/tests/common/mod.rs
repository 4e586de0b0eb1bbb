//! Shared fixtures for plugin integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use repairme::RepairMe;
use repairme_core::{EquipmentSource, NotifyFn, RepairMeConfig, ScanError};
use repairme_host::fake::FakeHost;
use repairme_host::{ClientState, SessionEvent};

pub const LOADING: &str = "NowLoading";

/// Equipment condition per slot, plus the scan that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentData {
    pub sequence: u64,
    pub condition: Vec<f32>,
}

/// Scanner stand-in with a single notification slot
#[derive(Default)]
pub struct FakeScanner {
    scans: AtomicU64,
    fail: AtomicBool,
    explode: AtomicBool,
    target: Mutex<Option<NotifyFn>>,
    /// Host whose login listeners are counted when the target is detached
    watched_host: Mutex<Option<Arc<FakeHost>>>,
    listeners_at_detach: Mutex<Option<usize>>,
}

impl FakeScanner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Invoke the registered target, as the real scanner does on new data
    pub fn notify(&self) {
        let target = self.target.lock().clone();
        if let Some(target) = target {
            target();
        }
    }

    pub fn has_target(&self) -> bool {
        self.target.lock().is_some()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make the next scan panic instead of returning
    pub fn set_exploding(&self, explode: bool) {
        self.explode.store(explode, Ordering::SeqCst);
    }

    pub fn scans(&self) -> u64 {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn watch_host(&self, host: Arc<FakeHost>) {
        *self.watched_host.lock() = Some(host);
    }

    pub fn listeners_at_detach(&self) -> Option<usize> {
        *self.listeners_at_detach.lock()
    }
}

impl EquipmentSource for FakeScanner {
    type Snapshot = EquipmentData;

    fn build_equipment_data(&self) -> Result<EquipmentData, ScanError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ScanError::Message("equipment container missing".into()));
        }
        if self.explode.load(Ordering::SeqCst) {
            panic!("equipment container corrupted");
        }
        let sequence = self.scans.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(EquipmentData {
            sequence,
            condition: vec![100.0, 87.5, 42.0],
        })
    }

    fn set_notification_target(&self, target: Option<NotifyFn>) {
        if target.is_none() {
            if let Some(host) = self.watched_host.lock().as_ref() {
                let events = host.session_events();
                *self.listeners_at_detach.lock() = Some(
                    events.listener_count(SessionEvent::Login)
                        + events.listener_count(SessionEvent::Logout),
                );
            }
        }
        *self.target.lock() = target;
    }
}

pub struct Fixture {
    pub host: Arc<FakeHost>,
    pub scanner: Arc<FakeScanner>,
    pub plugin: RepairMe<FakeScanner>,
}

pub fn fixture() -> Fixture {
    fixture_with(RepairMeConfig::default())
}

pub fn fixture_with(config: RepairMeConfig) -> Fixture {
    let host = FakeHost::new();
    host.add_ui_object(LOADING, 1, false);
    let scanner = FakeScanner::new();
    scanner.watch_host(host.clone());
    let plugin = RepairMe::new(host.interfaces(), scanner.clone(), config);
    Fixture {
        host,
        scanner,
        plugin,
    }
}

/// Poll `condition` for up to five seconds
pub fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Give the loop a chance to do something it should not
pub fn settle() {
    std::thread::sleep(Duration::from_millis(40));
}
