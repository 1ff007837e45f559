use crate::domain::model::{Notification, NotificationLevel};
use crate::domain::ports::Notifier;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Prints notifications to stderr, one line each. Clones share the error count.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier {
    errors: Arc<AtomicUsize>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error notifications printed so far.
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let at = notification.at.format("%H:%M:%S%.3f");
        match notification.level {
            NotificationLevel::Success => {
                tracing::debug!("notification at {}: {}", at, notification.message);
                eprintln!("✅ {}", notification.message);
            }
            NotificationLevel::Error => {
                self.errors.fetch_add(1, Ordering::SeqCst);
                tracing::debug!("error notification at {}: {}", at, notification.message);
                eprintln!("❌ {}", notification.message);
            }
        }
    }
}

/// Keeps every notification in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.notifications().iter().filter(|n| n.is_error()).count()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
