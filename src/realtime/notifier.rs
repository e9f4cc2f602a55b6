//! # Change Notifier
//!
//! Best-effort fan-out of change events. Publishing never blocks and never
//! fails the caller: events sent while nobody is subscribed are dropped, and
//! there is no replay for subscribers that connect later.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::debug;

use super::event::ChangeEvent;
use crate::posts::model::{DeletedPost, Post};
use crate::settings::model::Settings;

/// Default number of events buffered per subscriber before it starts lagging
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Sink the lifecycle managers publish into after each committed write
pub trait ChangeNotifier: Send + Sync {
    /// Publish an event to all current subscribers
    fn notify(&self, event: ChangeEvent);

    fn post_upserted(&self, post: &Post) {
        self.notify(ChangeEvent::PostUpsert(post.clone()));
    }

    fn post_deleted(&self, id: &str) {
        self.notify(ChangeEvent::PostDelete(DeletedPost { id: id.to_string() }));
    }

    fn settings_updated(&self, settings: &Settings) {
        self.notify(ChangeEvent::SettingsUpdate(settings.clone()));
    }
}

/// Notifier backed by a tokio broadcast channel
#[derive(Debug)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<ChangeEvent>,
    published: AtomicU64,
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl BroadcastNotifier {
    /// Create a notifier buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: AtomicU64::new(0),
        }
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Number of events published since start
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl ChangeNotifier for BroadcastNotifier {
    fn notify(&self, event: ChangeEvent) {
        self.published.fetch_add(1, Ordering::Relaxed);
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => debug!(event = name, receivers, "change broadcast"),
            Err(_) => debug!(event = name, "change dropped, no subscribers"),
        }
    }
}
