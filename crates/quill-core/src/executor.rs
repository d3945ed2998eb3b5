//! Async action wrapper: busy flag plus success/failure notifications.
//!
//! The executor owns a single busy flag. Concurrent invocations on the same
//! executor share that flag and race last-writer-wins; callers serialize
//! usage per logical action.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::notify::{Notifier, ToastKind};

const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";

/// Messages and callbacks applied around one executed action.
///
/// On failure the error's own message wins; `error_message` is the fallback
/// for errors that render empty.
pub struct ActionOptions<'a, T> {
    pub success_message: Option<&'a str>,
    pub error_message: Option<&'a str>,
    pub on_success: Option<Box<dyn FnOnce(&T) + 'a>>,
    pub on_error: Option<Box<dyn FnOnce(&Error) + 'a>>,
}

impl<T> Default for ActionOptions<'_, T> {
    fn default() -> Self {
        Self {
            success_message: None,
            error_message: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl<'a, T> ActionOptions<'a, T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn success_message(mut self, message: &'a str) -> Self {
        self.success_message = Some(message);
        self
    }

    #[must_use]
    pub fn error_message(mut self, message: &'a str) -> Self {
        self.error_message = Some(message);
        self
    }

    #[must_use]
    pub fn on_success(mut self, callback: impl FnOnce(&T) + 'a) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_error(mut self, callback: impl FnOnce(&Error) + 'a) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

/// Wraps asynchronous operations with a busy flag and toast dispatch.
#[derive(Clone)]
pub struct ActionExecutor {
    busy: Arc<AtomicBool>,
    notifier: Notifier,
}

impl ActionExecutor {
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            notifier,
        }
    }

    /// Whether an action is currently in flight on this executor.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Run `operation` with the busy flag held for its whole duration.
    ///
    /// Success queues `success_message` (when given) and invokes
    /// `on_success`; failure queues an error toast and invokes `on_error`,
    /// then re-raises the error to the caller.
    pub async fn execute<T, F>(&self, operation: F, options: ActionOptions<'_, T>) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _busy = BusyGuard::acquire(&self.busy);

        match operation.await {
            Ok(value) => {
                if let Some(message) = options.success_message {
                    self.notifier.push(message, ToastKind::Success);
                }
                if let Some(on_success) = options.on_success {
                    on_success(&value);
                }
                Ok(value)
            }
            Err(error) => {
                let rendered = error.to_string();
                let message = if rendered.is_empty() {
                    options.error_message.unwrap_or(DEFAULT_ERROR_MESSAGE)
                } else {
                    rendered.as_str()
                };
                self.notifier.push(message, ToastKind::Error);
                if let Some(on_error) = options.on_error {
                    on_error(&error);
                }
                Err(error)
            }
        }
    }
}

/// Scoped hold on the busy flag, released on every exit path.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
