//! Warning and error reporting
//!
//! Library code never prints. Anything worth telling the user is handed to
//! a [`Reporter`], which the caller injects. Reporters are shared across
//! worker threads, so they must be `Send + Sync`.

use std::sync::Mutex;

/// Sink for warning- and error-level notices
pub trait Reporter: Send + Sync {
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Discards every notice
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Buffers notices in arrival order.
///
/// Each notice is pushed whole under the lock, so messages from parallel
/// workers never interleave.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: NoticeLevel, message: &str) {
        let notice = Notice {
            level,
            message: message.to_string(),
        };
        // A poisoned lock only means another thread panicked mid-push.
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }

    /// Drain everything collected so far
    pub fn take(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Messages of the given level, in arrival order
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        let guard = match self.notices.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(NoticeLevel::Warn)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(NoticeLevel::Error)
    }
}

impl Reporter for CollectingReporter {
    fn warn(&self, message: &str) {
        self.push(NoticeLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(NoticeLevel::Error, message);
    }
}
