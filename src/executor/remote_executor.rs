use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tokio::time::timeout;
use tracing::debug;
use tracing::warn;

use super::decode_output;
use super::escape_lua;
use super::render_request;
use super::Credentials;
use super::Endpoint;
use super::ExitCodes;
use crate::constants::EXIT_CONNECT_FAILED;
use crate::constants::EXIT_EVAL_TIMEOUT;
use crate::constants::EXIT_SCRIPT_ERROR;
use crate::constants::REMOTE_SCRIPT_DIR;
use crate::CommandExecutable;
use crate::DecodeError;
use crate::ExecOutput;
use crate::ExecutionError;
use crate::FileTransferable;
use crate::HarnessConfig;
use crate::SystemError;
use crate::TransportConfig;

/// Everything needed to address the router from inside the container
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    pub transport: TransportConfig,
    pub endpoint: Endpoint,
    pub credentials: Credentials,
    pub connect_timeout: Duration,
    pub eval_timeout: Duration,
    /// Client-side bound on one exec round trip
    pub request_timeout: Duration,
    pub script_error_codes: Vec<i32>,
}

impl RemoteTarget {
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            transport: config.transport.transport(),
            endpoint: Endpoint::new(config.router.host.clone(), config.router.port),
            credentials: Credentials {
                username: config.router.username.clone(),
                password: config.router.password.clone(),
            },
            connect_timeout: config.transport.connect_timeout(),
            eval_timeout: config.transport.eval_timeout(),
            request_timeout: config.transport.request_timeout(),
            script_error_codes: config.transport.script_error_codes.clone(),
        }
    }

    /// Exit codes classified as script errors. Never empty: the chunk
    /// exits with the first one, so an empty list falls back to the
    /// default code on both sides.
    pub fn script_codes(&self) -> &[i32] {
        if self.script_error_codes.is_empty() {
            &[EXIT_SCRIPT_ERROR]
        } else {
            self.script_error_codes.as_slice()
        }
    }

    fn exit_codes(&self) -> ExitCodes {
        ExitCodes {
            connect: EXIT_CONNECT_FAILED,
            script: self.script_codes()[0],
            timeout: EXIT_EVAL_TIMEOUT,
        }
    }
}

/// Evaluates expressions on the router through the container runtime.
///
/// Every call is an independent `exec`; nothing is cached between calls and
/// nothing is retried here.
pub struct RemoteExecutor<R> {
    runtime: Arc<R>,
    target: RemoteTarget,
}

impl<R> std::fmt::Debug for RemoteExecutor<R> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("RemoteExecutor").field("target", &self.target).finish()
    }
}

impl<R> RemoteExecutor<R>
where
    R: CommandExecutable + FileTransferable,
{
    pub fn new(
        runtime: Arc<R>,
        target: RemoteTarget,
    ) -> Self {
        Self { runtime, target }
    }

    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }

    /// Sends one expression and returns the raw exit code and streams.
    ///
    /// Only failures that leave no exit code to inspect are errors here: the
    /// runtime could not exec at all (`Transport`), or the round trip
    /// exceeded `request_timeout` (`Timeout`).
    pub async fn evaluate(
        &self,
        expression: &str,
    ) -> Result<ExecOutput, ExecutionError> {
        let argv = render_request(
            &self.target.transport,
            &self.target.endpoint,
            &self.target.credentials,
            expression,
            self.target.connect_timeout,
            self.target.eval_timeout,
            self.target.exit_codes(),
        );

        debug!(
            "evaluate on {}:{}: {}",
            self.target.endpoint.host, self.target.endpoint.port, expression
        );

        match timeout(self.target.request_timeout, self.runtime.exec(argv)).await {
            Err(_) => {
                warn!("remote call timed out after {:?}", self.target.request_timeout);
                Err(ExecutionError::Timeout {
                    after: self.target.request_timeout,
                })
            }
            Ok(Err(e)) => Err(ExecutionError::Transport {
                exit_code: None,
                stdout: String::new(),
                stderr: e.to_string(),
            }),
            Ok(Ok(output)) => Ok(output),
        }
    }

    /// Maps a nonzero exit code to its failure class.
    pub fn check(
        &self,
        output: ExecOutput,
    ) -> Result<ExecOutput, ExecutionError> {
        classify(output, self.target.script_codes(), self.target.eval_timeout)
    }

    /// Checks the exit code, then parses stdout.
    pub fn decode(
        &self,
        output: ExecOutput,
    ) -> Result<Value, SystemError> {
        let output = self.check(output)?;
        Ok(decode_output(&output)?)
    }

    pub async fn evaluate_decoded(
        &self,
        expression: &str,
    ) -> Result<Value, SystemError> {
        let output = self.evaluate(expression).await?;
        self.decode(output)
    }

    pub async fn evaluate_decoded_as<T: DeserializeOwned>(
        &self,
        expression: &str,
    ) -> Result<T, SystemError> {
        let value = self.evaluate_decoded(expression).await?;
        let stdout = serde_yaml::to_string(&value).unwrap_or_default();
        serde_yaml::from_value(value).map_err(|source| SystemError::Decode(DecodeError { stdout, source }))
    }

    /// Copies a local script into the container and runs it with `dofile`.
    pub async fn run_script(
        &self,
        local_path: &str,
    ) -> Result<ExecOutput, SystemError> {
        let remote_path = remote_script_path(local_path);
        debug!("copy script {} to {}", local_path, remote_path);
        self.runtime.copy_file(local_path, &remote_path).await?;

        let expression = format!("return dofile('{}')", escape_lua(&remote_path));
        Ok(self.evaluate(&expression).await?)
    }

    pub async fn run_script_decoded(
        &self,
        local_path: &str,
    ) -> Result<Value, SystemError> {
        let output = self.run_script(local_path).await?;
        self.decode(output)
    }
}

pub(crate) fn classify(
    output: ExecOutput,
    script_error_codes: &[i32],
    eval_timeout: Duration,
) -> Result<ExecOutput, ExecutionError> {
    let code = output.exit_code;
    if code == 0 {
        return Ok(output);
    }

    let ExecOutput { stdout, stderr, .. } = output;
    if script_error_codes.contains(&code) {
        return Err(ExecutionError::Script {
            exit_code: code,
            stdout,
            stderr,
        });
    }
    if code == EXIT_EVAL_TIMEOUT {
        warn!("remote eval timed out: {}", stderr);
        return Err(ExecutionError::Timeout { after: eval_timeout });
    }
    Err(ExecutionError::Transport {
        exit_code: Some(code),
        stdout,
        stderr,
    })
}

/// `/tmp/<basename>` of a local script path. Windows separators count too.
pub fn remote_script_path(local_path: &str) -> String {
    let normalized = local_path.replace('\\', "/");
    let name = match Path::new(&normalized).file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => normalized.clone(),
    };
    format!("{REMOTE_SCRIPT_DIR}/{name}")
}
