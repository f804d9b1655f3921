//! Cluster sideband messaging bridge relayed through carrier sessions.
//!
//! A node in a multi-process game-server cluster has no direct connection to
//! the central routing proxy. To reach it, the bridge piggy-backs frames onto
//! already-connected client sessions ("carriers"), retrying until one is
//! available, and correlates query responses back to single-shot callbacks.
//!
//! This crate re-exports the public API of the workspace:
//!
//! - [`frame`]: wire codec and typed sideband messages.
//! - [`bridge`]: carrier selection, the wait-task retry loop, response
//!   correlation, and the [`ClusterBridge`] façade.
//!
//! See `examples/loopback.rs` for end-to-end wiring against an in-memory
//! registry and a simulated proxy.

pub use sidelink_bridge as bridge;
pub use sidelink_frame as frame;

pub use sidelink_bridge::{
    select_carrier, BridgeConfig, BridgeError, CarrierSession, CarrierWaitTask, ClusterBridge,
    QueryKey, ResponseCorrelator, RosterWaiter, Scheduler, SessionRegistry, TimerHandle,
    TokioScheduler, WaiterId, DEFAULT_CHANNEL,
};
pub use sidelink_frame::{FrameError, Message};
