use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Handle to a running recurring timer.
pub trait TimerHandle: Send + Sync {
    /// Stop the timer. Idempotent; a fire racing a cancel may still run its
    /// tick, so callers needing exactly-once semantics guard their own state.
    fn cancel(&self);
}

/// Recurring-timer capability injected into the bridge.
pub trait Scheduler: Send + Sync {
    /// Run `tick` after `initial_delay` and then every `period` until it
    /// returns `false` or the returned handle is cancelled.
    ///
    /// Ticks are short and non-blocking; implementations may run them on any
    /// thread.
    fn every(
        &self,
        initial_delay: Duration,
        period: Duration,
        tick: Box<dyn FnMut() -> bool + Send>,
    ) -> Box<dyn TimerHandle>;
}

/// Production [`Scheduler`] backed by the Tokio runtime.
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Create a scheduler bound to the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a runtime context.
    pub fn new() -> Self {
        Self::with_handle(tokio::runtime::Handle::current())
    }

    /// Create a scheduler bound to an explicit runtime handle.
    pub fn with_handle(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn every(
        &self,
        initial_delay: Duration,
        period: Duration,
        mut tick: Box<dyn FnMut() -> bool + Send>,
    ) -> Box<dyn TimerHandle> {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        self.handle.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => return,
                _ = tokio::time::sleep(initial_delay) => {}
            }

            // The first interval tick completes immediately, so the first
            // fire lands at `initial_delay` and later ones every `period`.
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if !tick() {
                            break;
                        }
                    }
                }
            }
        });

        Box::new(TokioTimerHandle { token })
    }
}

struct TokioTimerHandle {
    token: CancellationToken,
}

impl TimerHandle for TokioTimerHandle {
    fn cancel(&self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_initial_delay_then_every_period() {
        let scheduler = TokioScheduler::new();
        let fires = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fires);
        let _handle = scheduler.every(
            Duration::from_millis(1000),
            Duration::from_millis(500),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        );

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_returning_false_stops_the_timer() {
        let scheduler = TokioScheduler::new();
        let fires = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fires);
        let _handle = scheduler.every(
            Duration::from_millis(10),
            Duration::from_millis(10),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_timer() {
        let scheduler = TokioScheduler::new();
        let fires = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fires);
        let handle = scheduler.every(
            Duration::from_millis(10),
            Duration::from_millis(10),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        );

        tokio::time::sleep(Duration::from_millis(25)).await;
        handle.cancel();
        handle.cancel(); // idempotent
        let seen = fires.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(fires.load(Ordering::SeqCst) <= seen + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_initial_delay_prevents_any_fire() {
        let scheduler = TokioScheduler::new();
        let fires = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fires);
        let handle = scheduler.every(
            Duration::from_millis(1000),
            Duration::from_millis(500),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        );

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 0);
    }
}
