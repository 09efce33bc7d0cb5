use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A dismissible message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub text: String,
}

/// Sink for user-facing notifications; returns the id used to dismiss
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, text: &str) -> u64;
}

/// In-memory notification queue
#[derive(Debug, Default)]
pub struct NotificationCenter {
    next_id: AtomicU64,
    active: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently shown notifications, oldest first
    pub fn active(&self) -> Vec<Notification> {
        self.active.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Returns false when `id` was not shown
    pub fn dismiss(&self, id: u64) -> bool {
        match self.active.lock() {
            Ok(mut active) => {
                let before = active.len();
                active.retain(|n| n.id != id);
                active.len() != before
            }
            Err(_) => false,
        }
    }

    /// Remove and return everything shown
    pub fn drain(&self) -> Vec<Notification> {
        self.active
            .lock()
            .map(|mut a| std::mem::take(&mut *a))
            .unwrap_or_default()
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, level: NotificationLevel, text: &str) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        if let Ok(mut active) = self.active.lock() {
            active.push(Notification {
                id,
                level,
                text: text.to_string(),
            });
        }
        id
    }
}
