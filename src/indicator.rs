//! Loading indicator driven by an independent timer task.
//!
//! While the session waits for the first token, the UI animates a
//! "thinking" placeholder on a periodic tick. The tick runs on its own
//! spawned task and must be cancelled exactly once, on first content
//! arrival or on terminal error; stopping twice is a no-op, and dropping
//! the handle stops the task so it can never outlive its session.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;

/// Handle to a spawned ticker task. Owned by one session.
#[derive(Debug)]
pub struct LoadingIndicator {
    handle: Option<JoinHandle<()>>,
}

impl LoadingIndicator {
    /// Spawn a ticker that invokes `tick` every `period` until stopped.
    ///
    /// The first tick fires one full period after the spawn.
    pub fn spawn<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            loop {
                interval.tick().await;
                tick();
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Stop the ticker. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether the ticker has already been stopped.
    pub fn is_stopped(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for LoadingIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_indicator(period: Duration) -> (LoadingIndicator, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let indicator = LoadingIndicator::spawn(period, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (indicator, ticks)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_periodically() {
        let (mut indicator, ticks) = counting_indicator(Duration::from_millis(500));

        time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        indicator.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticking() {
        let (mut indicator, ticks) = counting_indicator(Duration::from_millis(500));

        time::sleep(Duration::from_millis(600)).await;
        indicator.stop();
        let seen = ticks.load(Ordering::SeqCst);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn double_stop_is_a_noop() {
        let (mut indicator, _ticks) = counting_indicator(Duration::from_millis(500));

        indicator.stop();
        assert!(indicator.is_stopped());
        indicator.stop();
        assert!(indicator.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_the_task() {
        let (indicator, ticks) = counting_indicator(Duration::from_millis(500));

        drop(indicator);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
