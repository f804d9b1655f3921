use std::sync::Arc;

use rand::seq::IndexedRandom;

/// A connected client session able to relay one frame to the routing proxy.
///
/// The bridge does not own sessions; it looks them up transiently from the
/// [`SessionRegistry`] at send time and retains no identity between sends.
pub trait CarrierSession: Send + Sync {
    /// Stable session name, used for targeting and logging.
    fn name(&self) -> &str;

    /// Relay an encoded frame to the proxy over this session.
    fn send(&self, payload: &[u8]) -> std::io::Result<()>;
}

/// Source of the currently connected sessions.
///
/// Injected into the bridge rather than reached through a global so tests
/// can substitute a fake registry.
pub trait SessionRegistry: Send + Sync {
    /// Snapshot of the sessions connected right now.
    fn connected_sessions(&self) -> Vec<Arc<dyn CarrierSession>>;
}

/// Pick a carrier uniformly at random, or `None` if nothing is connected.
pub fn select_carrier(sessions: &[Arc<dyn CarrierSession>]) -> Option<Arc<dyn CarrierSession>> {
    sessions.choose(&mut rand::rng()).cloned()
}
