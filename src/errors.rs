//! Cartridge Test Harness Error Hierarchy
//!
//! Errors are grouped by the layer that raises them: document parsing,
//! configuration loading, remote execution against the running cluster and
//! the terminal outcomes of the bootstrap state machine.

use std::fmt;
use std::time::Duration;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Instance or topology document is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Harness settings could not be loaded or merged
    #[error(transparent)]
    Settings(#[from] config::ConfigError),

    /// Harness settings were loaded but are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Remote execution, decoding and container runtime failures
    #[error(transparent)]
    System(#[from] SystemError),

    /// Cluster never reached the ready state
    #[error(transparent)]
    Bootstrap(#[from] BootstrapFailure),

    /// The cluster handle cannot serve requests in its current lifecycle state
    #[error("Cluster is not ready: {0}")]
    NotReady(String),
}

/// Failures raised while turning instance/topology documents into typed
/// structures. Always fatal, never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `advertise_uri` does not end with `:<port>`
    #[error("Instance {instance} has malformed advertise endpoint {endpoint:?}")]
    MalformedEndpoint { instance: String, endpoint: String },

    /// A field required for this entry is absent
    #[error("Entry {entry} is missing required field `{field}`")]
    MissingField { entry: String, field: &'static str },

    /// A field is present but its value is not acceptable
    #[error("Entry {entry} has invalid field `{field}`: {reason}")]
    InvalidField {
        entry: String,
        field: &'static str,
        reason: String,
    },

    /// The document is not well-formed YAML or not a mapping of entries
    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] serde_yaml::Error),

    /// The document could not be read from disk
    #[error("Failed to read document {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },

    /// A well-formed topology has exactly one router replica set
    #[error("Topology must contain exactly one router replica set, found {found}")]
    RouterCount { found: usize },

    /// A replica set lists an instance that the instance document does not define
    #[error("Replica set {replicaset} references unknown instance {member}")]
    UnknownMember { replicaset: String, member: String },

    /// An instance is listed by more than one replica set
    #[error("Instance {member} belongs to both {first} and {second}")]
    DuplicateMember {
        member: String,
        first: String,
        second: String,
    },

    /// An instance is not assigned to any replica set
    #[error("Instance {instance} is not assigned to any replica set")]
    UnassignedInstance { instance: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SystemError {
    /// A remote call that ran out of time, as opposed to one that failed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SystemError::Execution(e) if e.is_timeout())
    }
}

/// Classified failure of a single remote evaluation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionError {
    /// The expression itself raised an error on the router
    #[error("Script error (exit code {exit_code}): {stderr}")]
    Script {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// The request never produced a result: connection refused, bad
    /// credentials, interpreter crash or a runtime-level exec failure
    #[error("Transport error (exit code {exit_code:?}): {stderr}")]
    Transport {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// The request did not complete in time
    #[error("Remote call timed out after {after:?}")]
    Timeout { after: Duration },
}

impl ExecutionError {
    pub fn is_script(&self) -> bool {
        matches!(self, ExecutionError::Script { .. })
    }

    /// Timeouts are a transport-class failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ExecutionError::Transport { .. } | ExecutionError::Timeout { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutionError::Timeout { .. })
    }

    pub fn stdout(&self) -> &str {
        match self {
            ExecutionError::Script { stdout, .. } | ExecutionError::Transport { stdout, .. } => stdout,
            ExecutionError::Timeout { .. } => "",
        }
    }

    pub fn stderr(&self) -> &str {
        match self {
            ExecutionError::Script { stderr, .. } | ExecutionError::Transport { stderr, .. } => stderr,
            ExecutionError::Timeout { .. } => "",
        }
    }
}

/// A zero exit code whose stdout is not a YAML document.
#[derive(Debug, thiserror::Error)]
#[error("Failed to decode structured reply {stdout:?}: {source}")]
pub struct DecodeError {
    pub stdout: String,
    #[source]
    pub source: serde_yaml::Error,
}

/// Failures reported by the container runtime collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("Container failed to start: {0}")]
    Start(String),

    #[error("Container failed to stop: {0}")]
    Stop(String),

    #[error("Exec in container failed: {0}")]
    Exec(String),

    #[error("Failed to copy {local} to {remote}: {reason}")]
    CopyFile {
        local: String,
        remote: String,
        reason: String,
    },

    #[error("Port {0} is not mapped")]
    PortNotMapped(u16),
}

/// Why the bootstrap state machine stopped in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    RouterTimeout,
    TopologyError,
    HealthTimeout,
    ShardBootstrapError,
}

impl fmt::Display for FailureReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            FailureReason::RouterTimeout => "router timeout",
            FailureReason::TopologyError => "topology error",
            FailureReason::HealthTimeout => "health timeout",
            FailureReason::ShardBootstrapError => "shard bootstrap error",
        };
        f.write_str(name)
    }
}

/// The originating cause attached to a bootstrap failure.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapCause {
    /// The probe answered, but never with a truthy value
    #[error("probe answered {0:?}")]
    ProbeValue(serde_yaml::Value),

    /// The remote call itself failed or its reply was unreadable
    #[error(transparent)]
    System(#[from] SystemError),

    /// The topology call returned an error value that is not a collision
    #[error("topology call returned error: {0}")]
    TopologyReply(String),
}

impl From<ExecutionError> for BootstrapCause {
    fn from(e: ExecutionError) -> Self {
        BootstrapCause::System(SystemError::Execution(e))
    }
}

impl From<DecodeError> for BootstrapCause {
    fn from(e: DecodeError) -> Self {
        BootstrapCause::System(SystemError::Decode(e))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Cluster bootstrap failed with {reason}: {cause}")]
pub struct BootstrapFailure {
    pub reason: FailureReason,
    #[source]
    pub cause: BootstrapCause,
}

impl BootstrapFailure {
    pub fn new(
        reason: FailureReason,
        cause: impl Into<BootstrapCause>,
    ) -> Self {
        Self {
            reason,
            cause: cause.into(),
        }
    }
}

// ============== Conversion Implementations ============== //
impl From<ExecutionError> for Error {
    fn from(e: ExecutionError) -> Self {
        Error::System(SystemError::Execution(e))
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::System(SystemError::Decode(e))
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Self {
        Error::System(SystemError::Runtime(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::System(SystemError::Io(e))
    }
}
