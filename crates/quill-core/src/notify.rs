//! Toast notification channel.
//!
//! Core services push toasts; the front end drains and renders them. The
//! handle is cloneable and every clone shares one queue.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Notification severity. The set is closed; rendering matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl ToastKind {
    /// Terminal glyph rendered in front of the message.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Error => "✗",
            Self::Info => "i",
            Self::Warning => "!",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

/// A transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

/// Cloneable producer/consumer handle over a shared toast queue.
#[derive(Clone, Default)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

#[derive(Default)]
struct NotifierInner {
    next_id: AtomicU64,
    queue: Mutex<VecDeque<Toast>>,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a toast. Ids are monotonically increasing per notifier.
    pub fn push(&self, message: impl Into<String>, kind: ToastKind) {
        let toast = Toast {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.into(),
            kind,
        };
        tracing::debug!("toast [{}]: {}", toast.kind.label(), toast.message);
        let mut queue = self
            .inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        queue.push_back(toast);
    }

    /// Take all queued toasts, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        let mut queue = self
            .inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        queue.drain(..).collect()
    }
}
