//! Cluster bootstrap state machine.
//!
//! `NotStarted -> WaitingForRouter -> ApplyingTopology -> WaitingForHealthy
//! -> BootstrappingShards -> Ready`, with `Failed(reason)` reachable from
//! every waiting or applying state.

mod bootstrapper;
mod clock;
mod state;
mod topology_apply;
pub use bootstrapper::*;
pub use clock::*;
pub use state::*;
pub use topology_apply::*;

#[cfg(test)]
mod clock_test;
