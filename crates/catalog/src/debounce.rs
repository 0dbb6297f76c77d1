//! Trailing-edge debouncer for keystroke-driven actions.
//!
//! A burst of `schedule` calls inside the quiet window collapses into one
//! execution of the last scheduled action. Once the window elapses the action
//! is detached and runs to completion; later schedules only replace actions
//! that have not fired yet.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Debounce coordinator owning at most one pending action
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `action` after the quiet window unless another action is scheduled
    /// first. Must be called from within a Tokio runtime.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!("Quiet window elapsed, firing debounced action");
            // Detach so aborting this timer can no longer reach the action
            tokio::spawn(action);
        });

        if let Some(previous) = self.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Drop the pending action, if it has not fired yet
    pub fn cancel_pending(&self) {
        if let Some(pending) = self.lock().take() {
            pending.abort();
        }
    }

    /// Whether an action is waiting for its quiet window to elapse
    pub fn is_pending(&self) -> bool {
        self.lock()
            .as_ref()
            .map(|timer| !timer.is_finished())
            .unwrap_or(false)
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::sleep;

    type Calls = Arc<Mutex<Vec<String>>>;

    fn record(calls: &Calls, value: &str) -> impl Future<Output = ()> + Send + 'static {
        let calls = Arc::clone(calls);
        let value = value.to_string();
        async move {
            calls.lock().unwrap().push(value);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_call() {
        let calls: Calls = Arc::default();
        let debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(record(&calls, "a"));
        sleep(Duration::from_millis(40)).await;
        debouncer.schedule(record(&calls, "ab"));
        sleep(Duration::from_millis(40)).await;
        debouncer.schedule(record(&calls, "abc"));

        sleep(Duration::from_millis(499)).await;
        assert!(calls.lock().unwrap().is_empty());
        assert!(debouncer.is_pending());

        sleep(Duration::from_millis(10)).await;
        assert_eq!(*calls.lock().unwrap(), vec!["abc".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_fire() {
        let calls: Calls = Arc::default();
        let debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(record(&calls, "first"));
        sleep(Duration::from_millis(600)).await;
        debouncer.schedule(record(&calls, "second"));
        sleep(Duration::from_millis(600)).await;

        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending() {
        let calls: Calls = Arc::default();
        let debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(record(&calls, "dropped"));
        debouncer.cancel_pending();
        assert!(!debouncer.is_pending());

        sleep(Duration::from_secs(1)).await;
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_action_is_not_cancelled() {
        let calls: Calls = Arc::default();
        let debouncer = Debouncer::new(Duration::from_millis(500));

        let slow_calls = Arc::clone(&calls);
        debouncer.schedule(async move {
            sleep(Duration::from_millis(300)).await;
            slow_calls.lock().unwrap().push("slow".to_string());
        });

        // Fires at 500ms, still in flight at 600ms
        sleep(Duration::from_millis(600)).await;
        debouncer.schedule(record(&calls, "next"));
        debouncer.cancel_pending();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(*calls.lock().unwrap(), vec!["slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending() {
        let calls: Calls = Arc::default();
        let debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(record(&calls, "never"));
        drop(debouncer);

        sleep(Duration::from_secs(1)).await;
        assert!(calls.lock().unwrap().is_empty());
    }
}
