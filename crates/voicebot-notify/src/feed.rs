use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;
use tracing::{error, info, warn};
use voicebot_core::{EventBus, Notification, SessionEvent, Severity};

struct FeedInner {
    /// Newest first.
    entries: VecDeque<Notification>,
    next_id: u64,
}

/// Append-only, newest-first log of system events.
///
/// Ids come from a counter that is never reset, so eviction of old entries
/// cannot produce a repeated or smaller id.
pub struct NotificationFeed {
    inner: Mutex<FeedInner>,
    retention: Option<usize>,
    events: Option<EventBus>,
}

impl NotificationFeed {
    /// Create a feed keeping at most `retention` entries. `0` keeps everything.
    pub fn new(retention: usize) -> Self {
        Self {
            inner: Mutex::new(FeedInner {
                entries: VecDeque::new(),
                next_id: 1,
            }),
            retention: (retention > 0).then_some(retention),
            events: None,
        }
    }

    /// Publish a `NotificationPosted` event for every post.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Prepend a notification and return it.
    pub fn post(&self, message: impl Into<String>, severity: Severity) -> Notification {
        let message = message.into();
        let notification = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            let notification = Notification {
                id: inner.next_id,
                message,
                severity,
                timestamp: Utc::now(),
                read: false,
            };
            inner.next_id += 1;
            inner.entries.push_front(notification.clone());
            if let Some(limit) = self.retention {
                inner.entries.truncate(limit);
            }
            notification
        };

        match severity {
            Severity::Info | Severity::Success => {
                info!(id = notification.id, severity = %severity, "{}", notification.message)
            }
            Severity::Warning => {
                warn!(id = notification.id, "{}", notification.message)
            }
            Severity::Error => {
                error!(id = notification.id, "{}", notification.message)
            }
        }

        if let Some(events) = &self.events {
            events.publish(SessionEvent::NotificationPosted {
                notification: notification.clone(),
            });
        }
        notification
    }

    /// Mark one notification as read. Returns `false` if the id is unknown
    /// (never posted or already evicted). Calling it twice is harmless.
    pub fn mark_read(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.entries.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        for n in inner.entries.iter_mut() {
            n.read = true;
        }
    }

    /// Snapshot of the feed, newest first.
    pub fn list(&self) -> Vec<Notification> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.iter().cloned().collect()
    }

    pub fn unread_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of notifications with the given severity still in the feed.
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.iter().filter(|n| n.severity == severity).count()
    }
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new(50)
    }
}
