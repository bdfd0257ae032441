use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::CLUSTER_HEALTHY_PROBE;
use crate::constants::DEFAULT_COLLISION_MARKER;
use crate::constants::ROUTER_UP_PROBE;
use crate::constants::VSHARD_BOOTSTRAP_COMMAND;
use crate::Error;
use crate::Result;

/// Timing profile for the health convergence wait
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapProfile {
    /// Community images converge quickly: 10s
    #[default]
    Default,
    /// SDK/enterprise images with SSL take longer: 60s
    Enterprise,
}

impl BootstrapProfile {
    pub fn healthy_timeout(&self) -> Duration {
        match self {
            BootstrapProfile::Default => Duration::from_secs(10),
            BootstrapProfile::Enterprise => Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub profile: BootstrapProfile,

    /// How long to wait for the router to answer (unit: milliseconds)
    /// Default: 60000
    #[serde(default = "default_router_timeout_ms")]
    pub router_timeout_ms: u64,

    /// Overrides the profile's health timeout (unit: milliseconds)
    #[serde(default)]
    pub healthy_timeout_ms: Option<u64>,

    /// Pause between two probe calls (unit: milliseconds)
    /// Default: 1000
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Truthy once the entry node has loaded cartridge
    #[serde(default = "default_router_up_probe")]
    pub router_up_probe: String,

    /// Truthy once roles and config converged on every node
    #[serde(default = "default_cluster_healthy_probe")]
    pub cluster_healthy_probe: String,

    /// Issued once after the cluster is healthy
    #[serde(default = "default_shard_bootstrap_command")]
    pub shard_bootstrap_command: String,

    /// Substring of the topology error that means "already applied".
    /// Tied to the cartridge version in the image.
    #[serde(default = "default_collision_marker")]
    pub collision_marker: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            profile: BootstrapProfile::default(),
            router_timeout_ms: default_router_timeout_ms(),
            healthy_timeout_ms: None,
            poll_interval_ms: default_poll_interval_ms(),
            router_up_probe: default_router_up_probe(),
            cluster_healthy_probe: default_cluster_healthy_probe(),
            shard_bootstrap_command: default_shard_bootstrap_command(),
            collision_marker: default_collision_marker(),
        }
    }
}

impl BootstrapConfig {
    pub fn router_timeout(&self) -> Duration {
        Duration::from_millis(self.router_timeout_ms)
    }

    pub fn healthy_timeout(&self) -> Duration {
        self.healthy_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.profile.healthy_timeout())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig("poll_interval_ms must be positive".into()));
        }

        if self.router_timeout_ms == 0 || self.healthy_timeout_ms == Some(0) {
            return Err(Error::InvalidConfig("bootstrap timeouts must be positive".into()));
        }

        for (name, expr) in [
            ("router_up_probe", &self.router_up_probe),
            ("cluster_healthy_probe", &self.cluster_healthy_probe),
            ("shard_bootstrap_command", &self.shard_bootstrap_command),
        ] {
            if expr.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{name} cannot be empty")));
            }
        }

        if self.collision_marker.is_empty() {
            return Err(Error::InvalidConfig("collision_marker cannot be empty".into()));
        }
        Ok(())
    }
}

fn default_router_timeout_ms() -> u64 {
    60_000
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_router_up_probe() -> String {
    ROUTER_UP_PROBE.into()
}
fn default_cluster_healthy_probe() -> String {
    CLUSTER_HEALTHY_PROBE.into()
}
fn default_shard_bootstrap_command() -> String {
    VSHARD_BOOTSTRAP_COMMAND.into()
}
fn default_collision_marker() -> String {
    DEFAULT_COLLISION_MARKER.into()
}
