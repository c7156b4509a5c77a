//! Last-call-wins debouncing for high-frequency triggers.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::task::JoinHandle;
use tracing::trace;

pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Wraps a side-effecting callback so it fires once per quiescent period.
///
/// Every [`call`](Self::call) cancels the pending invocation and schedules a
/// new one `delay` later with the latest arguments. Multiple positional
/// arguments are passed as a tuple and reach the callback unchanged.
///
/// Scheduling always goes through a spawned tokio task, so a zero delay still
/// defers the callback. Dropping the handle does not cancel a scheduled call.
///
/// # Panics
///
/// [`call`](Self::call) panics when used outside a tokio runtime.
pub struct Debounced<A> {
    callback: Arc<dyn Fn(A) + Send + Sync>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

pub fn debounce<A, F>(callback: F, delay: Duration) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced {
        callback: Arc::new(callback),
        delay,
        pending: Mutex::new(None),
    }
}

impl<A: Send + 'static> Debounced<A> {
    /// Uses [`DEFAULT_DEBOUNCE_DELAY`].
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        debounce(callback, DEFAULT_DEBOUNCE_DELAY)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn call(&self, args: A) {
        let callback = Arc::clone(&self.callback);
        let delay = self.delay;

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            if !previous.is_finished() {
                trace!(?delay, "superseding pending debounced call");
            }
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback(args);
        }));
    }

    /// Drops the scheduled call, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        match pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
