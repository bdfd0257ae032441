//! Handle to one running Tarantool Cartridge cluster.
//!
//! ## Lifecycle
//! `Created -> Starting -> Ready`, or `Failed` when the runtime refuses to
//! start or the bootstrap stops short of `Ready`. `start()` may be called
//! once. Every execute operation requires `Ready` and a running container.
//!
//! ## Example
//! ```ignore
//! let cluster = ClusterBuilder::new("cartridge/instances.yml", "cartridge/replicasets.yml")?
//!     .with_router_password("testapp-cluster-cookie")
//!     .build(runtime)?;
//! cluster.start().await?;
//! let reply = cluster.execute_command_decoded("return box.info.status").await?;
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::LogLevel;
use crate::BuildArgs;
use crate::Clock;
use crate::ClusterBootstrapper;
use crate::ClusterLayout;
use crate::CollisionPredicate;
use crate::ContainerRuntime;
use crate::Error;
use crate::ExecOutput;
use crate::HarnessConfig;
use crate::RemoteExecutor;
use crate::Result;
use crate::TopologySource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterState {
    Created,
    Starting,
    Ready,
    Failed,
    Stopped,
}

/// How a container port is published on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PortBinding {
    /// Bound to the same port number on the host
    Fixed(u16),
    /// Published on a runtime-chosen host port, see `Startable::mapped_port`
    Published(u16),
}

impl PortBinding {
    pub fn container_port(&self) -> u16 {
        match self {
            PortBinding::Fixed(port) | PortBinding::Published(port) => *port,
        }
    }
}

/// Host directory mounted over the application directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryBinding {
    pub host_path: String,
    pub container_path: String,
}

/// Everything the runtime needs to create the container
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub exposed_ports: BTreeSet<u16>,
    pub port_bindings: Vec<PortBinding>,
    pub build_args: BuildArgs,
    pub instance_dir: String,
    pub directory_binding: Option<DirectoryBinding>,
}

pub struct CartridgeCluster<R> {
    pub(super) runtime: Arc<R>,
    pub(super) executor: Arc<RemoteExecutor<R>>,
    pub(super) layout: ClusterLayout,
    pub(super) source: TopologySource,
    pub(super) config: HarnessConfig,
    pub(super) container_spec: ContainerSpec,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) is_collision: CollisionPredicate,
    pub(super) state: Mutex<ClusterState>,
}

impl<R> std::fmt::Debug for CartridgeCluster<R> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("CartridgeCluster")
            .field("state", &*self.state.lock())
            .field("source", &self.source)
            .field("container_spec", &self.container_spec)
            .finish()
    }
}

impl<R> CartridgeCluster<R>
where
    R: ContainerRuntime,
{
    /// Starts the container and bootstraps the cluster.
    ///
    /// On bootstrap failure the container is stopped and the handle stays
    /// unusable; the returned error carries the failure reason and cause.
    pub async fn start(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if *state != ClusterState::Created {
                return Err(Error::NotReady(format!(
                    "start() can only be called once, cluster is {:?}",
                    *state
                )));
            }
            *state = ClusterState::Starting;
        }

        info!("Tarantool Cartridge cluster is starting");
        if let Err(e) = self.runtime.start().await {
            error!("Container failed to start: {}", e);
            self.set_state(ClusterState::Failed);
            return Err(e.into());
        }

        let mut bootstrapper = ClusterBootstrapper::new(
            self.layout.clone(),
            self.executor.clone(),
            self.runtime.clone(),
            self.source.clone(),
            self.config.bootstrap.clone(),
            self.config.retry.topology,
        )
        .with_clock(self.clock.clone())
        .with_collision_predicate(self.is_collision.clone());

        if let Err(failure) = bootstrapper.run().await {
            self.set_state(ClusterState::Failed);
            if let Err(e) = self.runtime.stop().await {
                error!("Failed to stop cluster after bootstrap failure: {}", e);
            }
            return Err(failure.into());
        }

        self.set_state(ClusterState::Ready);
        info!("Tarantool Cartridge cluster is started");
        if let Ok(port) = self.router_port() {
            info!("Tarantool Cartridge router is listening at {}:{}", self.router_host(), port);
        }
        if let Ok(port) = self.api_port() {
            info!("Tarantool Cartridge HTTP API is available at {}:{}", self.router_host(), port);
        }
        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        self.runtime.stop().await?;
        self.set_state(ClusterState::Stopped);
        info!("Tarantool Cartridge cluster is stopped");
        Ok(())
    }

    pub fn state(&self) -> ClusterState {
        *self.state.lock()
    }

    /// Evaluates an expression on the router. Nonzero exit codes come back
    /// as classified [`ExecutionError`](crate::ExecutionError)s.
    pub async fn execute_command(
        &self,
        expression: &str,
    ) -> Result<ExecOutput> {
        self.ensure_ready()?;
        let output = self.executor.evaluate(expression).await?;
        Ok(self.executor.check(output)?)
    }

    pub async fn execute_command_decoded(
        &self,
        expression: &str,
    ) -> Result<Value> {
        self.ensure_ready()?;
        Ok(self.executor.evaluate_decoded(expression).await?)
    }

    /// Decodes the list of returned values into `T`
    pub async fn execute_command_decoded_as<T: DeserializeOwned>(
        &self,
        expression: &str,
    ) -> Result<T> {
        self.ensure_ready()?;
        Ok(self.executor.evaluate_decoded_as(expression).await?)
    }

    /// Copies a local Lua script into the container and runs it on the router
    pub async fn execute_script(
        &self,
        script_path: &str,
    ) -> Result<ExecOutput> {
        self.ensure_ready()?;
        let output = self.executor.run_script(script_path).await?;
        Ok(self.executor.check(output)?)
    }

    pub async fn execute_script_decoded(
        &self,
        script_path: &str,
    ) -> Result<Value> {
        self.ensure_ready()?;
        Ok(self.executor.run_script_decoded(script_path).await?)
    }

    pub async fn set_log_level(
        &self,
        level: LogLevel,
    ) -> Result<()> {
        debug!("Setting log_level to {:?}", level);
        if let Err(e) = self.execute_command(&level.command()).await {
            error!("Failed to set log_level to {:?}: {}", level, e);
            return Err(e);
        }
        Ok(())
    }

    pub fn router_host(&self) -> &str {
        &self.config.router.host
    }

    /// Host port of the router binary protocol
    pub fn router_port(&self) -> Result<u16> {
        self.host_port(self.config.router.port)
    }

    /// Host port of the router HTTP API
    pub fn api_port(&self) -> Result<u16> {
        self.host_port(self.config.router.api_port)
    }

    pub fn router_username(&self) -> &str {
        &self.config.router.username
    }

    pub fn router_password(&self) -> &str {
        &self.config.router.password
    }

    pub fn exposed_ports(&self) -> &BTreeSet<u16> {
        &self.container_spec.exposed_ports
    }

    pub fn port_bindings(&self) -> &[PortBinding] {
        &self.container_spec.port_bindings
    }

    pub fn build_args(&self) -> &BuildArgs {
        &self.container_spec.build_args
    }

    pub fn instance_dir(&self) -> &str {
        &self.container_spec.instance_dir
    }

    pub fn directory_binding(&self) -> Option<&DirectoryBinding> {
        self.container_spec.directory_binding.as_ref()
    }

    pub fn container_spec(&self) -> &ContainerSpec {
        &self.container_spec
    }

    /// The runtime the cluster was built around
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn layout(&self) -> &ClusterLayout {
        &self.layout
    }

    pub fn topology_source(&self) -> &TopologySource {
        &self.source
    }

    fn host_port(
        &self,
        container_port: u16,
    ) -> Result<u16> {
        if self.config.router.use_fixed_ports {
            return Ok(container_port);
        }
        Ok(self.runtime.mapped_port(container_port)?)
    }

    fn ensure_ready(&self) -> Result<()> {
        let state = self.state();
        if state != ClusterState::Ready {
            return Err(Error::NotReady(format!("cluster is {state:?}")));
        }
        if !self.runtime.is_running() {
            return Err(Error::NotReady("container is not running".into()));
        }
        Ok(())
    }

    fn set_state(
        &self,
        state: ClusterState,
    ) {
        *self.state.lock() = state;
    }
}
