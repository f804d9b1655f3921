//! Carrier-relayed sideband bridge to a cluster routing proxy.
//!
//! The local node has no connection of its own to the routing proxy; it can
//! only reach it by piggy-backing a frame onto an already-connected client
//! session (a "carrier"). This crate provides the pieces that make that
//! indirection workable:
//!
//! - carrier selection over the currently connected sessions,
//! - a cancellable retry loop that waits for a carrier to appear,
//! - single-shot response correlation for query-style operations,
//! - the [`ClusterBridge`] façade tying them together.
//!
//! Session lookup and timer scheduling are injected capabilities
//! ([`SessionRegistry`], [`Scheduler`]) so tests can substitute fakes.

pub mod bridge;
pub mod carrier;
pub mod correlator;
pub mod error;
pub mod scheduler;
pub mod wait;

mod sync;

#[cfg(test)]
pub(crate) mod testutil;

pub use bridge::{BridgeConfig, ClusterBridge, DEFAULT_CHANNEL};
pub use carrier::{select_carrier, CarrierSession, SessionRegistry};
pub use correlator::{QueryKey, ResponseCorrelator, RosterWaiter, WaiterId};
pub use error::{BridgeError, Result};
pub use scheduler::{Scheduler, TimerHandle, TokioScheduler};
pub use wait::{CarrierWaitTask, DeferredSend};
