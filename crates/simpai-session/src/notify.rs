//! User-facing notifications.
//!
//! Controllers report outcomes ("Analysis complete!", "Please upload a PDF
//! first.") through a [`Notifier`] instead of printing, so the CLI decides how
//! they are shown and tests can assert on them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Sink for transient notifications and streamed tokens.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    /// Called once per streamed token, after it was appended to the transcript.
    fn token(&self, _token: &str) {}

    fn info(&self, message: &str) {
        self.notify(Notice {
            level: NoticeLevel::Info,
            message: message.to_string(),
        });
    }

    fn success(&self, message: &str) {
        self.notify(Notice {
            level: NoticeLevel::Success,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notice {
            level: NoticeLevel::Error,
            message: message.to_string(),
        });
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }

    fn token(&self, token: &str) {
        (**self).token(token);
    }
}

/// Keeps every notice and token in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
    tokens: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    /// Messages of error-level notices, in order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.messages(NoticeLevel::Error)
    }

    #[must_use]
    pub fn successes(&self) -> Vec<String> {
        self.messages(NoticeLevel::Success)
    }

    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        lock(&self.tokens).clone()
    }

    fn messages(&self, level: NoticeLevel) -> Vec<String> {
        lock(&self.notices)
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        lock(&self.notices).push(notice);
    }

    fn token(&self, token: &str) {
        lock(&self.tokens).push(token.to_string());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
