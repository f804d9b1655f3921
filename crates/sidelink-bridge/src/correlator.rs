use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

use crate::sync::lock;

/// Normalized correlation key for a pending roster query.
///
/// Server names are matched case-insensitively and ignoring surrounding
/// whitespace, mirroring how the proxy resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(server: &str) -> Self {
        Self(server.trim().to_lowercase())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-use callback fulfilled when the correlated roster arrives.
pub type RosterWaiter = Box<dyn FnOnce(Vec<String>) + Send>;

/// Identifies one registered waiter, for targeted removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterId(u64);

/// Thread-safe map from query key to the waiters awaiting its response.
///
/// Invariant: a key present in the map has at least one waiter; delivery
/// removes the whole entry, so waiters fire exactly once.
pub struct ResponseCorrelator {
    pending: Mutex<HashMap<QueryKey, Vec<(WaiterId, RosterWaiter)>>>,
    next_id: AtomicU64,
}

impl ResponseCorrelator {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Append a waiter for `key`. Insertion order is delivery order.
    pub fn register(&self, key: QueryKey, waiter: RosterWaiter) -> WaiterId {
        let id = WaiterId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.pending).entry(key).or_default().push((id, waiter));
        id
    }

    /// Remove a single waiter if it is still registered.
    ///
    /// Used when a send fails after registration: the caller saw the error,
    /// so its waiter must not linger and fire on a response to someone
    /// else's query. Removal is by identity, so a discard racing a delivery
    /// that already consumed the waiter touches nothing. Returns whether the
    /// waiter was present.
    pub fn discard(&self, key: &QueryKey, id: WaiterId) -> bool {
        let mut pending = lock(&self.pending);
        let Some(waiters) = pending.get_mut(key) else {
            return false;
        };
        let before = waiters.len();
        waiters.retain(|(waiter_id, _)| *waiter_id != id);
        let removed = waiters.len() < before;
        if waiters.is_empty() {
            pending.remove(key);
        }
        removed
    }

    /// Remove every waiter for `key` and invoke them in registration order.
    ///
    /// The entry is taken out under the lock and the callbacks run after it
    /// is released, so a waiter may re-enter the correlator. A response with
    /// no registered waiters is ignored.
    pub fn deliver(&self, key: &QueryKey, players: &[String]) {
        let waiters = lock(&self.pending).remove(key);

        match waiters {
            None => debug!(%key, "roster response without registered waiters, ignoring"),
            Some(waiters) => {
                debug!(%key, waiters = waiters.len(), "delivering roster response");
                for (_, waiter) in waiters {
                    waiter(players.to_vec());
                }
            }
        }
    }

    /// Number of waiters currently registered for `key`.
    pub fn waiting(&self, key: &QueryKey) -> usize {
        lock(&self.pending).get(key).map_or(0, Vec::len)
    }

    /// Drop every pending waiter without invoking it (shutdown path).
    pub fn clear(&self) {
        let dropped: usize = {
            let mut pending = lock(&self.pending);
            let count = pending.values().map(Vec::len).sum();
            pending.clear();
            count
        };
        if dropped > 0 {
            debug!(dropped, "dropped pending roster waiters");
        }
    }
}

impl Default for ResponseCorrelator {
    fn default() -> Self {
        Self::new()
    }
}
