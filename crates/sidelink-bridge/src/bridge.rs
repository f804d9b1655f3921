use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use sidelink_frame::Message;
use tracing::{debug, trace, warn};

use crate::carrier::{select_carrier, CarrierSession, SessionRegistry};
use crate::correlator::{QueryKey, ResponseCorrelator, RosterWaiter};
use crate::error::{BridgeError, Result};
use crate::scheduler::Scheduler;
use crate::sync::lock;
use crate::wait::CarrierWaitTask;

/// Sideband channel name used by the upstream routing proxy.
pub const DEFAULT_CHANNEL: &str = "BungeeCord";

/// Bridge tuning knobs.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Sideband channel the bridge listens and sends on.
    pub channel: String,
    /// Grace before the first carrier retry.
    pub retry_initial_delay: Duration,
    /// Cadence of subsequent carrier retries.
    pub retry_period: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_owned(),
            retry_initial_delay: Duration::from_secs(1),
            retry_period: Duration::from_millis(500),
        }
    }
}

/// Public face of the bridge: relocation, roster queries, inbound dispatch.
///
/// Every operation is non-blocking. "Waiting for a carrier" is modeled as a
/// timer-driven [`CarrierWaitTask`], never as a blocked call, so the invoking
/// context (a server tick, an event-dispatch thread) never stalls.
pub struct ClusterBridge {
    config: BridgeConfig,
    registry: Arc<dyn SessionRegistry>,
    scheduler: Arc<dyn Scheduler>,
    correlator: ResponseCorrelator,
    wait_tasks: Mutex<Vec<CarrierWaitTask>>,
}

impl ClusterBridge {
    /// Create a bridge with default configuration.
    pub fn new(registry: Arc<dyn SessionRegistry>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_config(registry, scheduler, BridgeConfig::default())
    }

    /// Create a bridge with explicit configuration.
    pub fn with_config(
        registry: Arc<dyn SessionRegistry>,
        scheduler: Arc<dyn Scheduler>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            config,
            registry,
            scheduler,
            correlator: ResponseCorrelator::new(),
            wait_tasks: Mutex::new(Vec::new()),
        }
    }

    /// Current bridge configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Ask the proxy to move `target` to `destination`. Fire-and-forget.
    ///
    /// The proxy relocates whichever session carries a Connect frame, so the
    /// target itself is the preferred carrier while it is connected. A
    /// disconnected target falls back to the generic carrier-or-wait path.
    pub fn relocate(&self, target: &str, destination: &str) -> Result<()> {
        if destination.trim().is_empty() {
            return Err(BridgeError::EmptyServerName);
        }

        let payload = Message::Relocate {
            destination: destination.to_owned(),
        }
        .encode()?;

        if let Some(session) = self.find_session(target) {
            trace!(target, destination, "relocating via the target session");
            return self.send_via(&session, &payload);
        }
        self.dispatch(payload)
    }

    /// Ask the proxy for the roster of `server`.
    ///
    /// `on_result` is registered before the query leaves, so a fast response
    /// cannot slip past it. Concurrent queries for one server accumulate
    /// waiters; a single response fulfills all of them. On a synchronous
    /// relay failure the waiter is deregistered again — a caller that saw
    /// the error will not also get a callback for someone else's query.
    pub fn query_roster(&self, server: &str, on_result: RosterWaiter) -> Result<()> {
        if server.trim().is_empty() {
            return Err(BridgeError::EmptyServerName);
        }

        let payload = Message::RosterQuery {
            server: server.to_owned(),
        }
        .encode()?;

        // Register before the query leaves, never after.
        let key = QueryKey::new(server);
        let waiter_id = self.correlator.register(key.clone(), on_result);

        let sent = self.dispatch(payload);
        if sent.is_err() {
            self.correlator.discard(&key, waiter_id);
        }
        sent
    }

    /// Entry point for the external session-message dispatcher.
    ///
    /// Frames on other channels are ignored; malformed frames are logged and
    /// dropped; nothing on this path is fatal to the bridge.
    pub fn on_inbound_frame(&self, channel: &str, payload: &[u8]) {
        if channel != self.config.channel {
            return;
        }

        match Message::decode(payload) {
            Ok(Some(Message::RosterResponse { server, players })) => {
                self.correlator.deliver(&QueryKey::new(&server), &players);
            }
            Ok(Some(other)) => {
                trace!(frame = ?other, "ignoring non-response sideband message");
            }
            Ok(None) => trace!("ignoring unrecognized sideband tag"),
            Err(err) => warn!(error = %err, "dropping malformed sideband frame"),
        }
    }

    /// Cancel outstanding carrier wait tasks and drop pending waiters.
    ///
    /// Dropping is fine: once the bridge is torn down no response can
    /// arrive. Safe to call more than once.
    pub fn shutdown(&self) {
        let tasks = std::mem::take(&mut *lock(&self.wait_tasks));
        for task in &tasks {
            task.cancel();
        }
        debug!(wait_tasks = tasks.len(), "bridge shut down");
        self.correlator.clear();
    }

    /// Wait tasks still polling for a carrier (completed ones are pruned).
    pub fn pending_wait_tasks(&self) -> usize {
        let mut tasks = lock(&self.wait_tasks);
        tasks.retain(|t| !t.is_done());
        tasks.len()
    }

    /// Waiters currently registered for `server`'s roster.
    pub fn pending_roster_waiters(&self, server: &str) -> usize {
        self.correlator.waiting(&QueryKey::new(server))
    }

    fn find_session(&self, name: &str) -> Option<Arc<dyn CarrierSession>> {
        self.registry
            .connected_sessions()
            .into_iter()
            .find(|s| s.name() == name)
    }

    /// Send now through a random carrier, or defer until one appears.
    fn dispatch(&self, payload: Bytes) -> Result<()> {
        let sessions = self.registry.connected_sessions();
        match select_carrier(&sessions) {
            Some(carrier) => self.send_via(&carrier, &payload),
            None => {
                self.defer(payload);
                Ok(())
            }
        }
    }

    fn send_via(&self, carrier: &Arc<dyn CarrierSession>, payload: &[u8]) -> Result<()> {
        carrier.send(payload).map_err(|source| BridgeError::Send {
            carrier: carrier.name().to_owned(),
            source,
        })
    }

    fn defer(&self, payload: Bytes) {
        debug!("no carrier connected, deferring send");
        let task = CarrierWaitTask::spawn(
            self.scheduler.as_ref(),
            Arc::clone(&self.registry),
            self.config.retry_initial_delay,
            self.config.retry_period,
            Box::new(move |carrier| {
                // The caller returned long ago; a failed deferred relay can
                // only be logged.
                if let Err(err) = carrier.send(&payload) {
                    warn!(carrier = carrier.name(), error = %err, "deferred send failed");
                }
            }),
        );

        let mut tasks = lock(&self.wait_tasks);
        tasks.retain(|t| !t.is_done());
        tasks.push(task);
    }
}
