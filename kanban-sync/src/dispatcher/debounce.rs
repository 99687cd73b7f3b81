//! Restartable delay timer

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs a task after a quiet period; restarting cancels the previous one.
#[derive(Debug, Default)]
pub(crate) struct DebounceTimer {
    handle: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    /// Cancel any armed timer and run `task` after `delay`.
    ///
    /// `task` must not await anything it cannot afford to lose: only the
    /// delay is guaranteed to be the cancellation point.
    pub fn restart<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Disarm without running the task
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_restart_runs_only_last_task() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::default();

        for value in 1..=3 {
            let fired = Arc::clone(&fired);
            timer.restart(Duration::from_millis(300), async move {
                fired.store(value, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::default();
        let counter = Arc::clone(&fired);
        timer.restart(Duration::from_millis(50), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
