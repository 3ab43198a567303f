//! Simulated analysis progress.
//!
//! The ticker is purely cosmetic: it advances a counter while the real
//! upload is pending and carries no correctness weight. Each analysis
//! attempt owns exactly one ticker; cancelling aborts the task, is
//! idempotent and also happens on drop.

use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

/// Handle to a running progress ticker task.
pub struct ProgressTicker {
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// Spawn a task calling `tick` every `period` (first call after one
    /// period) until `tick` returns `false` or the ticker is cancelled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !tick() {
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Abort the task. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// True while the task has been neither cancelled nor finished.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Random step in `[0, max)`.
pub fn random_increment(max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    rand::thread_rng().gen_range(0.0..max)
}

/// Add `increment` to `current` without passing `cap`.
pub fn advance(current: f64, increment: f64, cap: f64) -> f64 {
    (current + increment).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_ticker(period_ms: u64) -> (ProgressTicker, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let ticker = ProgressTicker::start(Duration::from_millis(period_ms), move || {
            c.fetch_add(1, Ordering::SeqCst);
            true
        });
        (ticker, count)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_periodically() {
        let (ticker, count) = counting_ticker(200);
        tokio::time::sleep(Duration::from_millis(1010)).await;
        assert!(count.load(Ordering::SeqCst) >= 4);
        assert!(ticker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_after_cancel() {
        let (mut ticker, count) = counting_ticker(200);
        tokio::time::sleep(Duration::from_millis(450)).await;
        ticker.cancel();
        let seen = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert!(!ticker.is_active());

        // Second cancel is a no-op.
        ticker.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let (ticker, count) = counting_ticker(100);
        drop(ticker);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_tick_returns_false() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let ticker = ProgressTicker::start(Duration::from_millis(100), move || {
            c.fetch_add(1, Ordering::SeqCst) < 2
        });
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!ticker.is_active());
    }

    #[test]
    fn advance_is_capped() {
        assert_eq!(advance(90.0, 14.0, 95.0), 95.0);
        assert_eq!(advance(10.0, 5.0, 95.0), 15.0);
    }

    #[test]
    fn random_increment_in_range() {
        for _ in 0..200 {
            let step = random_increment(15.0);
            assert!((0.0..15.0).contains(&step));
        }
        assert_eq!(random_increment(0.0), 0.0);
    }
}
