use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::interpret_script_reply;
use super::marker_predicate;
use super::poll_until;
use super::setup_command;
use super::ApplyOutcome;
use super::BootstrapState;
use super::Clock;
use super::CollisionPredicate;
use super::TokioClock;
use super::TopologySource;
use crate::is_truthy;
use crate::BootstrapCause;
use crate::BootstrapConfig;
use crate::BootstrapFailure;
use crate::ClusterLayout;
use crate::CommandExecutable;
use crate::FailureReason;
use crate::FileTransferable;
use crate::RemoteExecutor;
use crate::RetryPolicy;
use crate::SystemError;

/// Drives a freshly started cluster to `Ready`.
///
/// Runs as one sequential future: every remote call is awaited before the
/// next step is taken and nothing is spawned. Time is read and waited on
/// only through the injected [`Clock`].
pub struct ClusterBootstrapper<R> {
    layout: ClusterLayout,
    executor: Arc<RemoteExecutor<R>>,
    runtime: Arc<R>,
    source: TopologySource,
    settings: BootstrapConfig,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    is_collision: CollisionPredicate,
    state: BootstrapState,
    history: Vec<BootstrapState>,
}

impl<R> ClusterBootstrapper<R>
where
    R: CommandExecutable + FileTransferable,
{
    pub fn new(
        layout: ClusterLayout,
        executor: Arc<RemoteExecutor<R>>,
        runtime: Arc<R>,
        source: TopologySource,
        settings: BootstrapConfig,
        retry: RetryPolicy,
    ) -> Self {
        let is_collision = marker_predicate(settings.collision_marker.clone());
        Self {
            layout,
            executor,
            runtime,
            source,
            settings,
            retry,
            clock: Arc::new(TokioClock),
            is_collision,
            state: BootstrapState::NotStarted,
            history: vec![BootstrapState::NotStarted],
        }
    }

    pub fn with_clock(
        mut self,
        clock: Arc<dyn Clock>,
    ) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_collision_predicate(
        mut self,
        is_collision: CollisionPredicate,
    ) -> Self {
        self.is_collision = is_collision;
        self
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Every state entered so far, `NotStarted` first
    pub fn history(&self) -> &[BootstrapState] {
        &self.history
    }

    /// Runs the state machine to a terminal state.
    pub async fn run(&mut self) -> Result<(), BootstrapFailure> {
        info!(
            "Bootstrapping cluster: {} instances, {} replica sets",
            self.layout.instances().len(),
            self.layout.topology().map_or(0, |t| t.len())
        );

        self.wait_for_router().await?;
        self.apply_topology().await?;
        self.wait_for_healthy().await?;
        self.bootstrap_shards().await?;

        self.transition(BootstrapState::Ready);
        info!("Tarantool Cartridge cluster is ready");
        Ok(())
    }

    async fn wait_for_router(&mut self) -> Result<(), BootstrapFailure> {
        self.transition(BootstrapState::WaitingForRouter);
        if let Some(router) = self.layout.router() {
            debug!("Waiting for router replica set {}", router.id);
        }

        let probe = self.settings.router_up_probe.clone();
        let outcome = poll_until(
            self.clock.as_ref(),
            self.settings.poll_interval(),
            self.settings.router_timeout(),
            || self.probe(&probe),
        )
        .await;

        if let Err(cause) = outcome {
            return Err(self.fail(FailureReason::RouterTimeout, cause));
        }
        info!("Router is up");
        Ok(())
    }

    async fn apply_topology(&mut self) -> Result<(), BootstrapFailure> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            self.transition(BootstrapState::ApplyingTopology { attempt });

            let outcome = self.apply_once().await;
            match outcome {
                ApplyOutcome::Applied => info!("Topology applied"),
                ApplyOutcome::AlreadyApplied => info!("Topology is already applied"),
                ApplyOutcome::Tentative => {
                    warn!("Topology call timed out, the cluster is reloading; health check will confirm")
                }
                ApplyOutcome::Failed(cause) => {
                    if attempt >= max_attempts {
                        return Err(self.fail(FailureReason::TopologyError, cause));
                    }
                    warn!(
                        "Failed to apply topology (attempt {}): {}. Retrying in {:?}",
                        attempt,
                        cause,
                        self.retry.backoff_delay()
                    );
                    self.clock.sleep(self.retry.backoff_delay()).await;
                    attempt += 1;
                    continue;
                }
            }
            return Ok(());
        }
    }

    async fn apply_once(&self) -> ApplyOutcome {
        match &self.source {
            TopologySource::Script { path } => match self.executor.run_script_decoded(path).await {
                Ok(reply) => interpret_script_reply(&reply, &self.is_collision),
                Err(e) if e.is_timeout() => ApplyOutcome::Tentative,
                Err(e) => ApplyOutcome::Failed(e.into()),
            },
            TopologySource::StructuredFile {
                topology_file,
                instances_file,
                run_dir,
            } => {
                let argv = setup_command(topology_file, instances_file, run_dir);
                debug!("Applying topology with {:?}", argv);

                match self.runtime.exec(argv).await {
                    Ok(output) if output.is_success() => ApplyOutcome::Applied,
                    Ok(output) => ApplyOutcome::Failed(BootstrapCause::TopologyReply(format!(
                        "cartridge CLI exited with code {}: {}{}",
                        output.exit_code, output.stdout, output.stderr
                    ))),
                    Err(e) => ApplyOutcome::Failed(SystemError::Runtime(e).into()),
                }
            }
        }
    }

    async fn wait_for_healthy(&mut self) -> Result<(), BootstrapFailure> {
        self.transition(BootstrapState::WaitingForHealthy);

        let probe = self.settings.cluster_healthy_probe.clone();
        let outcome = poll_until(
            self.clock.as_ref(),
            self.settings.poll_interval(),
            self.settings.healthy_timeout(),
            || self.probe(&probe),
        )
        .await;

        if let Err(cause) = outcome {
            return Err(self.fail(FailureReason::HealthTimeout, cause));
        }
        info!("Cluster is healthy");
        Ok(())
    }

    async fn bootstrap_shards(&mut self) -> Result<(), BootstrapFailure> {
        self.transition(BootstrapState::BootstrappingShards);

        let command = self.settings.shard_bootstrap_command.clone();
        let result = match self.executor.evaluate(&command).await {
            Ok(output) => self.executor.check(output).map(|_| ()),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            return Err(self.fail(FailureReason::ShardBootstrapError, e));
        }
        Ok(())
    }

    /// One probe call: satisfied when the reply is truthy.
    async fn probe(
        &self,
        expression: &str,
    ) -> Result<(), BootstrapCause> {
        match self.executor.evaluate_decoded(expression).await {
            Ok(value) if is_truthy(&value) => Ok(()),
            Ok(value) => {
                debug!("Probe answered {:?}", value);
                Err(BootstrapCause::ProbeValue(value))
            }
            Err(e) => {
                warn!("Probe failed: {}", e);
                Err(e.into())
            }
        }
    }

    fn transition(
        &mut self,
        next: BootstrapState,
    ) {
        debug!("Bootstrap state {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    fn fail(
        &mut self,
        reason: FailureReason,
        cause: impl Into<BootstrapCause>,
    ) -> BootstrapFailure {
        let failure = BootstrapFailure::new(reason, cause);
        error!("{}", failure);
        self.transition(BootstrapState::Failed(reason));
        failure
    }
}
