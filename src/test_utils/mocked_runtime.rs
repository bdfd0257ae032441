use async_trait::async_trait;

use crate::CommandExecutable;
use crate::ExecOutput;
use crate::FileTransferable;
use crate::MockCommandExecutable;
use crate::MockFileTransferable;
use crate::MockStartable;
use crate::RuntimeError;
use crate::Startable;

/// Runtime assembled from the three capability mocks, for tests that pin
/// exact call counts with mockall expectations.
pub(crate) struct MockedRuntime {
    pub(crate) lifecycle: MockStartable,
    pub(crate) commands: MockCommandExecutable,
    pub(crate) files: MockFileTransferable,
}

impl MockedRuntime {
    pub(crate) fn new() -> Self {
        Self {
            lifecycle: MockStartable::new(),
            commands: MockCommandExecutable::new(),
            files: MockFileTransferable::new(),
        }
    }
}

#[async_trait]
impl Startable for MockedRuntime {
    async fn start(&self) -> Result<(), RuntimeError> {
        self.lifecycle.start().await
    }

    async fn stop(&self) -> Result<(), RuntimeError> {
        self.lifecycle.stop().await
    }

    fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    fn mapped_port(
        &self,
        internal_port: u16,
    ) -> Result<u16, RuntimeError> {
        self.lifecycle.mapped_port(internal_port)
    }
}

#[async_trait]
impl CommandExecutable for MockedRuntime {
    async fn exec(
        &self,
        argv: Vec<String>,
    ) -> Result<ExecOutput, RuntimeError> {
        self.commands.exec(argv).await
    }
}

#[async_trait]
impl FileTransferable for MockedRuntime {
    async fn copy_file(
        &self,
        local_path: &str,
        remote_path: &str,
    ) -> Result<(), RuntimeError> {
        self.files.copy_file(local_path, remote_path).await
    }
}
