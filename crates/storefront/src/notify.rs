//! Transient user-visible notifications.
//!
//! A failed storefront operation always ends in one error notice. Success
//! notices (usually the server's `msg`) come only from mutations and account
//! steps; reads succeed silently. Front ends decide how to show them; the
//! library only hands them to a [`Notifier`].

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    /// A success notice stamped now.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
            at: Utc::now(),
        }
    }

    /// An error notice stamped now.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Receives notices produced by storefront operations.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(notice = %notice.text, "storefront notice"),
            NoticeLevel::Error => tracing::warn!(notice = %notice.text, "storefront notice"),
        }
    }
}

/// Keeps every notice in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notices so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Texts of error notices, oldest first.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.texts(NoticeLevel::Error)
    }

    /// Texts of success notices, oldest first.
    #[must_use]
    pub fn successes(&self) -> Vec<String> {
        self.texts(NoticeLevel::Success)
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn texts(&self, level: NoticeLevel) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.text)
            .collect()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_log_is_shared_between_clones() {
        let log = NoticeLog::new();
        let handle = log.clone();

        handle.notify(Notice::success("Added to cart"));
        handle.notify(Notice::error("Update failed"));

        assert_eq!(log.successes(), vec!["Added to cart".to_string()]);
        assert_eq!(log.errors(), vec!["Update failed".to_string()]);
    }

    #[test]
    fn test_drain_empties_the_log() {
        let log = NoticeLog::new();
        log.notify(Notice::error("Remove failed"));

        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(drained.first().is_some_and(Notice::is_error));
        assert!(log.notices().is_empty());
    }
}
