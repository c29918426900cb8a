// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use consumption_kernel::config::Config;
use consumption_kernel::types::id::MachineId;
use consumption_kernel::types::Timestamp;
use consumption_node::errors::{StorageError, TransportError};
use consumption_node::platform::{Clock, Delivery, Platform};
use consumption_node::tracker::Tracker;

pub const MACHINE: u32 = 12345;
pub const START: Timestamp = 1_700_000_000;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub endpoint: String,
    pub credential: String,
    pub machine_id: u32,
    pub body: String,
}

/// Settable clock shared between a test and a `HostPlatform`.
#[derive(Debug, Clone)]
pub struct TestClock(pub Arc<AtomicU32>);

impl TestClock {
    pub fn new(now: Timestamp) -> Self {
        Self(Arc::new(AtomicU32::new(now)))
    }

    pub fn advance(&self, secs: u32) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> Timestamp {
        self.0.load(Ordering::SeqCst)
    }
}

/// In-memory platform with scripted transport behaviour.
#[derive(Default)]
pub struct MockPlatform {
    now: AtomicU32,
    blob: Mutex<Option<Vec<u8>>>,
    sent: Mutex<Vec<Sent>>,
    send_calls: AtomicU32,
    store_calls: AtomicU32,
    fail_sends: AtomicU32,
    offline: AtomicBool,
    fail_store: AtomicBool,
    entered: Mutex<Option<Sender<()>>>,
    gate: Mutex<Option<Receiver<()>>>,
}

impl MockPlatform {
    pub fn new(now: Timestamp) -> Arc<Self> {
        let platform = Self::default();
        platform.now.store(now, Ordering::SeqCst);
        Arc::new(platform)
    }

    pub fn set_now(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u32) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// The next `n` sends fail with a 500.
    pub fn fail_next_sends(&self, n: u32) {
        self.fail_sends.store(n, Ordering::SeqCst);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_store_failing(&self, failing: bool) {
        self.fail_store.store(failing, Ordering::SeqCst);
    }

    pub fn send_calls(&self) -> u32 {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn store_calls(&self) -> u32 {
        self.store_calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Sent> {
        lock(&self.sent).clone()
    }

    pub fn blob(&self) -> Option<Vec<u8>> {
        lock(&self.blob).clone()
    }

    pub fn set_blob(&self, blob: Option<Vec<u8>>) {
        *lock(&self.blob) = blob;
    }

    /// Makes every send announce itself on the first channel and wait for a
    /// message on the second before completing.
    pub fn install_gate(&self) -> (Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *lock(&self.entered) = Some(entered_tx);
        *lock(&self.gate) = Some(release_rx);
        (entered_rx, release_tx)
    }
}

impl Platform for MockPlatform {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }

    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(lock(&self.blob).clone())
    }

    fn store(&self, blob: &[u8]) -> Result<(), StorageError> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(StorageError::TooLarge {
                size: blob.len(),
                limit: 0,
            });
        }
        *lock(&self.blob) = Some(blob.to_vec());
        Ok(())
    }

    fn send(&self, delivery: &Delivery<'_>) -> Result<(), TransportError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(tx) = lock(&self.entered).as_ref() {
            let _ = tx.send(());
        }
        if let Some(rx) = lock(&self.gate).as_ref() {
            let _ = rx.recv();
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable);
        }
        let pending = self.fail_sends.load(Ordering::SeqCst);
        if pending > 0 {
            self.fail_sends.store(pending - 1, Ordering::SeqCst);
            return Err(TransportError::Rejected(500));
        }

        lock(&self.sent).push(Sent {
            endpoint: delivery.endpoint.to_string(),
            credential: delivery.credential.to_string(),
            machine_id: delivery.machine_id.0,
            body: String::from_utf8_lossy(delivery.payload).into_owned(),
        });
        Ok(())
    }
}

pub fn sync_config(capacity: u32, interval: u32) -> Config {
    Config {
        machine_id: MachineId(MACHINE),
        enable_external_sync: true,
        buffer_capacity: capacity,
        aggregation_interval_seconds: interval,
        endpoint: "https://collector.test/consumption".to_string(),
        credential: "demo-api-key-12345".to_string(),
        max_retry_attempts: 3,
    }
}

pub fn tracker_with(config: Config) -> (Arc<MockPlatform>, Tracker<Arc<MockPlatform>>) {
    let platform = MockPlatform::new(START);
    let tracker = Tracker::new(platform.clone());
    tracker.init(Some(config)).unwrap();
    (platform, tracker)
}
