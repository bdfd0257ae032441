//! Fluent construction of a [`CartridgeCluster`].
//!
//! The builder starts from [`HarnessConfig::new`] (defaults, `CONFIG_PATH`
//! file, `CARTRIDGE__*` environment) or from an explicit configuration, lets
//! the caller override single settings, and assembles the cluster handle in
//! [`ClusterBuilder::build`]. Documents are parsed and validated there, so a
//! malformed instance or topology file fails before the container starts.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use tracing::info;

use super::CartridgeCluster;
use super::ClusterState;
use super::ContainerSpec;
use super::DirectoryBinding;
use super::PortBinding;
use crate::load_instances;
use crate::load_topology;
use crate::marker_predicate;
use crate::utils::path::normalize_binding_path;
use crate::BuildArgs;
use crate::Clock;
use crate::ClusterLayout;
use crate::CollisionPredicate;
use crate::ContainerRuntime;
use crate::Error;
use crate::HarnessConfig;
use crate::RemoteExecutor;
use crate::RemoteTarget;
use crate::Result;
use crate::TokioClock;
use crate::TopologySource;

pub struct ClusterBuilder {
    instances_path: String,
    topology_path: String,
    config: HarnessConfig,
    build_args: BuildArgs,
    directory_binding: Option<String>,
    clock: Option<Arc<dyn Clock>>,
    collision_predicate: Option<CollisionPredicate>,
}

impl ClusterBuilder {
    /// Creates a builder with configuration loaded from the environment
    ///
    /// # Arguments
    /// * `instances_path` - instance document (`instances.yml`)
    /// * `topology_path` - replica set document (`.yml`) or topology Lua script
    pub fn new(
        instances_path: impl Into<String>,
        topology_path: impl Into<String>,
    ) -> Result<Self> {
        Self::from_config(instances_path, topology_path, HarnessConfig::new()?)
    }

    /// Constructs the builder from an in-memory configuration
    pub fn from_config(
        instances_path: impl Into<String>,
        topology_path: impl Into<String>,
        config: HarnessConfig,
    ) -> Result<Self> {
        let instances_path = instances_path.into();
        let topology_path = topology_path.into();
        if instances_path.is_empty() {
            return Err(Error::InvalidConfig("instance file path must not be empty".into()));
        }
        if topology_path.is_empty() {
            return Err(Error::InvalidConfig("topology file path must not be empty".into()));
        }

        Ok(Self {
            instances_path,
            topology_path,
            config,
            build_args: BuildArgs::default(),
            directory_binding: None,
            clock: None,
            collision_predicate: None,
        })
    }

    /// Replaces the entire harness configuration
    pub fn with_config(
        mut self,
        config: HarnessConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Connect to the router over SSL. The cluster must listen with SSL.
    pub fn with_ssl(
        mut self,
        ssl: bool,
    ) -> Self {
        self.config.transport.ssl = ssl;
        self
    }

    /// Client key and certificate paths inside the container; selects mutual TLS
    pub fn with_key_and_cert_files(
        mut self,
        key_file: impl Into<String>,
        cert_file: impl Into<String>,
    ) -> Self {
        self.config.transport.key_file = Some(key_file.into());
        self.config.transport.cert_file = Some(cert_file.into());
        self
    }

    pub fn with_router_host(
        mut self,
        host: impl Into<String>,
    ) -> Self {
        self.config.router.host = host.into();
        self
    }

    pub fn with_router_port(
        mut self,
        port: u16,
    ) -> Self {
        self.config.router.port = port;
        self
    }

    pub fn with_api_port(
        mut self,
        port: u16,
    ) -> Self {
        self.config.router.api_port = port;
        self
    }

    pub fn with_router_username(
        mut self,
        username: impl Into<String>,
    ) -> Self {
        self.config.router.username = username.into();
        self
    }

    /// Usually the `cluster_cookie` passed to `cartridge.cfg`
    pub fn with_router_password(
        mut self,
        password: impl Into<String>,
    ) -> Self {
        self.config.router.password = password.into();
        self
    }

    /// Publish every exposed port on the same host port
    pub fn with_use_fixed_ports(
        mut self,
        use_fixed_ports: bool,
    ) -> Self {
        self.config.router.use_fixed_ports = use_fixed_ports;
        self
    }

    /// Directory inside the container that holds the application
    pub fn with_instance_dir(
        mut self,
        instance_dir: impl Into<String>,
    ) -> Self {
        self.config.router.instance_dir = instance_dir.into();
        self
    }

    /// Host directory to mount over the instance directory
    pub fn with_directory_binding(
        mut self,
        host_path: impl Into<String>,
    ) -> Self {
        self.directory_binding = Some(host_path.into());
        self
    }

    /// Image build arguments; `TARANTOOL_*` variables from the environment
    /// fill in whatever is missing
    pub fn with_build_args(
        mut self,
        build_args: HashMap<String, String>,
    ) -> Self {
        self.build_args = BuildArgs::new(build_args);
        self
    }

    /// Sets the clock the bootstrap polls and backs off with
    pub fn with_clock(
        mut self,
        clock: Arc<dyn Clock>,
    ) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Overrides how a topology error is recognised as "already applied"
    pub fn with_collision_predicate(
        mut self,
        is_collision: CollisionPredicate,
    ) -> Self {
        self.collision_predicate = Some(is_collision);
        self
    }

    /// Validates the configuration, parses both documents and assembles the
    /// cluster handle around `runtime`.
    pub fn build<R>(
        self,
        runtime: R,
    ) -> Result<CartridgeCluster<R>>
    where
        R: ContainerRuntime,
    {
        let layout = self.load_layout()?;
        let config = self.config.validate()?;
        let build_args = self.build_args.merged_with_env();

        let source = TopologySource::infer(&self.topology_path, &self.instances_path, build_args.run_dir());
        debug!("Topology source: {:?}", source);

        let container_spec = ContainerSpec {
            port_bindings: port_bindings(&layout, config.router.use_fixed_ports),
            exposed_ports: layout.exposed_ports().clone(),
            build_args,
            directory_binding: self.directory_binding.as_deref().map(|host_path| DirectoryBinding {
                host_path: normalize_binding_path(host_path),
                container_path: config.router.instance_dir.clone(),
            }),
            instance_dir: config.router.instance_dir.clone(),
        };
        info!(
            "Cluster with {} instances, exposing ports {:?}",
            layout.instances().len(),
            container_spec.exposed_ports
        );

        let runtime = Arc::new(runtime);
        let executor = Arc::new(RemoteExecutor::new(runtime.clone(), RemoteTarget::from_config(&config)));
        let is_collision = self
            .collision_predicate
            .unwrap_or_else(|| marker_predicate(config.bootstrap.collision_marker.clone()));

        Ok(CartridgeCluster {
            runtime,
            executor,
            layout,
            source,
            container_spec,
            clock: self.clock.unwrap_or_else(|| Arc::new(TokioClock)),
            is_collision,
            config,
            state: Mutex::new(ClusterState::Created),
        })
    }

    /// Only replica set documents are parsed; a topology script is opaque.
    fn load_layout(&self) -> Result<ClusterLayout> {
        let instances = load_instances(&self.instances_path)?;
        let topology = match TopologySource::infer(&self.topology_path, &self.instances_path, "") {
            TopologySource::StructuredFile { .. } => Some(load_topology(&self.topology_path)?),
            TopologySource::Script { .. } => None,
        };
        Ok(ClusterLayout::new(instances, topology)?)
    }
}

fn port_bindings(
    layout: &ClusterLayout,
    use_fixed_ports: bool,
) -> Vec<PortBinding> {
    layout
        .exposed_ports()
        .iter()
        .map(|&port| {
            if use_fixed_ports {
                PortBinding::Fixed(port)
            } else {
                PortBinding::Published(port)
            }
        })
        .collect()
}
