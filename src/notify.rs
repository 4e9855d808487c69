//! Transient user notifications.
//!
//! Effects report the result of mutating calls here. Entries dismiss
//! themselves once their time-to-live has elapsed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Oldest entries are dropped beyond this many.
const MAX_NOTIFICATIONS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

/// Sink for user-visible notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: String);
}

/// In-memory queue of auto-dismissing notifications.
pub struct NotificationCenter {
    ttl: Duration,
    next_id: AtomicU64,
    entries: Mutex<VecDeque<Notification>>,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: AtomicU64::new(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Notifications still visible now.
    pub fn active(&self) -> Vec<Notification> {
        self.active_at(Instant::now())
    }

    /// Notifications still visible at `now`. Expired entries are dropped.
    pub fn active_at(&self, now: Instant) -> Vec<Notification> {
        let mut entries = self.entries.lock();
        entries.retain(|entry| !entry.is_expired(now));
        entries.iter().cloned().collect()
    }

    /// Every notification not yet pruned, expired or not.
    pub fn history(&self) -> Vec<Notification> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Dismiss a notification early. Returns false if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, level: NotificationLevel, message: String) {
        match level {
            NotificationLevel::Success => tracing::info!(message = %message, "Notification"),
            NotificationLevel::Error => tracing::warn!(message = %message, "Notification"),
        }

        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            level,
            message,
            created_at: Instant::now(),
            ttl: self.ttl,
        };

        let mut entries = self.entries.lock();
        entries.push_back(notification);
        while entries.len() > MAX_NOTIFICATIONS {
            entries.pop_front();
        }
    }
}
