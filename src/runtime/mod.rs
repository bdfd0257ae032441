//! Boundary to the container runtime that hosts the cluster processes.
//!
//! Starting containers, building images and binding directories belong to
//! the runtime. The harness only needs three small capabilities from it,
//! injected as one handle per cluster.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::RuntimeError;

/// Exit code and captured streams of one `exec` call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn new(
        exit_code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn success(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout, "")
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Container lifecycle and port publishing
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Startable: Send + Sync {
    /// Starts every node process; returns once the runtime reports them started
    async fn start(&self) -> Result<(), RuntimeError>;

    async fn stop(&self) -> Result<(), RuntimeError>;

    fn is_running(&self) -> bool;

    /// Host port the runtime published for a container port
    fn mapped_port(
        &self,
        internal_port: u16,
    ) -> Result<u16, RuntimeError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandExecutable: Send + Sync {
    /// Runs `argv` inside the container without a shell
    async fn exec(
        &self,
        argv: Vec<String>,
    ) -> Result<ExecOutput, RuntimeError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait FileTransferable: Send + Sync {
    async fn copy_file(
        &self,
        local_path: &str,
        remote_path: &str,
    ) -> Result<(), RuntimeError>;
}

/// Everything the cluster handle needs from its runtime.
pub trait ContainerRuntime: Startable + CommandExecutable + FileTransferable {}

impl<T> ContainerRuntime for T where T: Startable + CommandExecutable + FileTransferable {}
