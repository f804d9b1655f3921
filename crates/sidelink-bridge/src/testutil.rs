//! Fakes shared by the unit tests: an in-memory session registry and a
//! manually stepped scheduler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::carrier::{CarrierSession, SessionRegistry};
use crate::scheduler::{Scheduler, TimerHandle};

/// Carrier session that records every payload it relays.
pub struct FakeSession {
    name: String,
    sent: Mutex<Vec<Vec<u8>>>,
    failing: AtomicBool,
}

impl FakeSession {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            sent: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        })
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    /// Make every subsequent send fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl CarrierSession for FakeSession {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, payload: &[u8]) -> std::io::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("session refused the frame"));
        }
        self.sent.lock().unwrap().push(payload.to_vec());
        Ok(())
    }
}

/// Registry whose connected set is mutated explicitly by the test.
pub struct FakeRegistry {
    sessions: Mutex<Vec<Arc<FakeSession>>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn connect(&self, session: Arc<FakeSession>) {
        self.sessions.lock().unwrap().push(session);
    }

    pub fn disconnect(&self, name: &str) {
        self.sessions.lock().unwrap().retain(|s| s.name() != name);
    }
}

impl SessionRegistry for FakeRegistry {
    fn connected_sessions(&self) -> Vec<Arc<dyn CarrierSession>> {
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn CarrierSession>)
            .collect()
    }
}

/// Scheduler whose timers only fire when the test calls [`fire_all`].
///
/// [`fire_all`]: ManualScheduler::fire_all
pub struct ManualScheduler {
    timers: Mutex<Vec<ManualTimer>>,
}

struct ManualTimer {
    tick: Box<dyn FnMut() -> bool + Send>,
    stopped: bool,
    cancelled: Arc<AtomicBool>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            timers: Mutex::new(Vec::new()),
        }
    }

    /// Fire every live timer once, in creation order.
    pub fn fire_all(&self) {
        let mut timers = self.timers.lock().unwrap();
        for timer in timers.iter_mut() {
            if timer.stopped || timer.cancelled.load(Ordering::SeqCst) {
                continue;
            }
            if !(timer.tick)() {
                timer.stopped = true;
            }
        }
    }

    /// Timers that are neither self-stopped nor cancelled.
    pub fn active_timers(&self) -> usize {
        self.timers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.stopped && !t.cancelled.load(Ordering::SeqCst))
            .count()
    }
}

impl Scheduler for ManualScheduler {
    fn every(
        &self,
        _initial_delay: Duration,
        _period: Duration,
        tick: Box<dyn FnMut() -> bool + Send>,
    ) -> Box<dyn TimerHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.timers.lock().unwrap().push(ManualTimer {
            tick,
            stopped: false,
            cancelled: Arc::clone(&cancelled),
        });
        Box::new(ManualTimerHandle { cancelled })
    }
}

struct ManualTimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle for ManualTimerHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
