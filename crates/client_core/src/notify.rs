//! Error toasts.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use tracing::debug;

pub const FALLBACK_ERROR_MESSAGE: &str =
    "Something went wrong on our side, please try again or contact us.";
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub ttl: Duration,
}

/// Receives toasts for display. Implementations must not block.
pub trait ToastSink: Send + Sync {
    fn push(&self, toast: Toast);
}

impl<T: ToastSink + ?Sized> ToastSink for Arc<T> {
    fn push(&self, toast: Toast) {
        (**self).push(toast);
    }
}

/// In-memory sink; the renderer drains it.
#[derive(Clone, Default)]
pub struct ToastQueue {
    inner: Arc<Mutex<VecDeque<Toast>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Toast> {
        let mut queue = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        queue.drain(..).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        let queue = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        queue.iter().map(|toast| toast.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ToastSink for ToastQueue {
    fn push(&self, toast: Toast) {
        let mut queue = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        queue.push_back(toast);
    }
}

/// Picks the one message to show: the primary message, else the override,
/// else [`FALLBACK_ERROR_MESSAGE`]. Empty strings count as absent.
pub fn resolve_error_message<'a>(
    primary: Option<&'a str>,
    override_message: Option<&'a str>,
) -> &'a str {
    primary
        .filter(|message| !message.is_empty())
        .or(override_message.filter(|message| !message.is_empty()))
        .unwrap_or(FALLBACK_ERROR_MESSAGE)
}

pub struct NotificationBridge<S> {
    sink: S,
    ttl: Duration,
}

impl<S: ToastSink> NotificationBridge<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            ttl: DEFAULT_TOAST_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn notify_error(&self, error: &dyn std::error::Error, override_message: Option<&str>) {
        let message = error.to_string();
        self.notify_error_message(Some(&message), override_message);
    }

    pub fn notify_error_message(&self, message: Option<&str>, override_message: Option<&str>) {
        let message = resolve_error_message(message, override_message);
        debug!(toast = message, "showing error toast");
        self.sink.push(Toast {
            message: message.to_string(),
            ttl: self.ttl,
        });
    }
}
