use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

use crate::carrier::{select_carrier, CarrierSession, SessionRegistry};
use crate::scheduler::{Scheduler, TimerHandle};
use crate::sync::lock;

/// Deferred send action, executed once a carrier becomes available.
pub type DeferredSend = Box<dyn FnOnce(Arc<dyn CarrierSession>) + Send>;

enum State {
    Waiting(DeferredSend),
    Done,
}

struct Inner {
    state: Mutex<State>,
    timer: Mutex<Option<Box<dyn TimerHandle>>>,
}

/// Retry loop waiting for a carrier to appear.
///
/// Created when an outbound send finds no connected session. Each timer fire
/// re-runs carrier selection; the first hit executes the deferred send and
/// stops the timer. There is no retry limit and no timeout — the task waits
/// indefinitely, so a bridge that never sees a carrier leaks the timer
/// unless [`cancel`](CarrierWaitTask::cancel) is called (shutdown does).
pub struct CarrierWaitTask {
    inner: Arc<Inner>,
}

impl CarrierWaitTask {
    /// Start a wait task that retries selection every `period` after an
    /// `initial_delay` grace, then runs `action` with the carrier it found.
    pub fn spawn(
        scheduler: &dyn Scheduler,
        registry: Arc<dyn SessionRegistry>,
        initial_delay: Duration,
        period: Duration,
        action: DeferredSend,
    ) -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(State::Waiting(action)),
            timer: Mutex::new(None),
        });

        let tick_inner = Arc::clone(&inner);
        let handle = scheduler.every(
            initial_delay,
            period,
            Box::new(move || tick_inner.tick(registry.as_ref())),
        );

        // The timer may have fired (or the task been cancelled) before the
        // handle lands in its slot; re-check so the handle never outlives
        // a completed task.
        *lock(&inner.timer) = Some(handle);
        if inner.is_done() {
            inner.cancel_timer();
        }

        debug!(?initial_delay, ?period, "waiting for a carrier");
        Self { inner }
    }

    /// Cancel without running the deferred action. Idempotent, also after
    /// the task already completed.
    pub fn cancel(&self) {
        {
            let mut state = lock(&self.inner.state);
            if let State::Waiting(_) = *state {
                debug!("carrier wait task cancelled");
            }
            *state = State::Done;
        }
        self.inner.cancel_timer();
    }

    /// Whether the deferred action ran or the task was cancelled.
    pub fn is_done(&self) -> bool {
        self.inner.is_done()
    }
}

impl Inner {
    /// One timer fire. Returns `false` when the timer should stop.
    fn tick(&self, registry: &dyn SessionRegistry) -> bool {
        let sessions = registry.connected_sessions();
        let Some(carrier) = select_carrier(&sessions) else {
            return true;
        };

        // Whoever moves the state out of Waiting owns the action; a racing
        // cancel or second fire finds Done and does nothing.
        let action = {
            let mut state = lock(&self.state);
            match std::mem::replace(&mut *state, State::Done) {
                State::Waiting(action) => action,
                State::Done => return false,
            }
        };

        debug!(carrier = carrier.name(), "carrier found, running deferred send");
        action(carrier);
        self.cancel_timer();
        false
    }

    fn is_done(&self) -> bool {
        matches!(*lock(&self.state), State::Done)
    }

    fn cancel_timer(&self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.cancel();
        }
    }
}
