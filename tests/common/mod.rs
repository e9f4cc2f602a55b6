//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use postboard::realtime::{ChangeEvent, ChangeNotifier};
use postboard::store::{MemoryBlobStore, MemoryRecordStore};

/// Notifier that keeps every event it is handed
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ChangeEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.name()).collect()
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn notify(&self, event: ChangeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// In-memory collaborators for one test
pub struct Fixture {
    pub records: Arc<MemoryRecordStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            records: Arc::new(MemoryRecordStore::new()),
            blobs: Arc::new(MemoryBlobStore::default()),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
