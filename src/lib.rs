//! Ephemeral Tarantool Cartridge clusters for integration tests.
//!
//! A [`ClusterBuilder`] reads the instance and topology documents, a
//! caller-supplied [`ContainerRuntime`] runs the node processes, and
//! [`CartridgeCluster::start`] drives the bootstrap until the cluster is
//! ready for [`CartridgeCluster::execute_command`] and friends.

mod bootstrap;
mod cluster;
mod config;
mod constants;
mod errors;
mod executor;
mod runtime;
mod topology;
pub mod utils;

pub use bootstrap::*;
pub use cluster::*;
pub use config::*;
pub use errors::*;
pub use executor::*;
pub use runtime::*;
pub use topology::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;
