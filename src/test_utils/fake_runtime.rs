use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::CommandExecutable;
use crate::ExecOutput;
use crate::FileTransferable;
use crate::RuntimeError;
use crate::Startable;

/// One scripted answer to an `exec` call
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Output(ExecOutput),
    Error(RuntimeError),
    /// Never completes
    Hang,
}

impl Reply {
    pub(crate) fn yaml(stdout: &str) -> Self {
        Reply::Output(ExecOutput::success(stdout))
    }

    pub(crate) fn exit(
        code: i32,
        stderr: &str,
    ) -> Self {
        Reply::Output(ExecOutput::new(code, "", stderr))
    }
}

#[derive(Debug)]
struct Rule {
    pattern: String,
    /// The last reply repeats once the others are used up
    replies: VecDeque<Reply>,
}

/// Container runtime double. `exec` answers with the replies scripted for
/// the first pattern found in the argv.
#[derive(Debug, Default)]
pub(crate) struct FakeRuntime {
    running: AtomicBool,
    start_error: Mutex<Option<RuntimeError>>,
    stop_error: Mutex<Option<RuntimeError>>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    mapped_ports: Mutex<HashMap<u16, u16>>,
    rules: Mutex<Vec<Rule>>,
    exec_calls: Mutex<Vec<Vec<String>>>,
    copies: Mutex<Vec<(String, String)>>,
    copy_error: Mutex<Option<RuntimeError>>,
}

impl FakeRuntime {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(
        &self,
        pattern: &str,
        replies: Vec<Reply>,
    ) -> &Self {
        self.rules.lock().push(Rule {
            pattern: pattern.to_string(),
            replies: replies.into(),
        });
        self
    }

    pub(crate) fn fail_start(
        &self,
        error: RuntimeError,
    ) {
        *self.start_error.lock() = Some(error);
    }

    pub(crate) fn fail_stop(
        &self,
        error: RuntimeError,
    ) {
        *self.stop_error.lock() = Some(error);
    }

    pub(crate) fn fail_copy(
        &self,
        error: RuntimeError,
    ) {
        *self.copy_error.lock() = Some(error);
    }

    pub(crate) fn map_port(
        &self,
        internal: u16,
        external: u16,
    ) {
        self.mapped_ports.lock().insert(internal, external);
    }

    pub(crate) fn set_running(
        &self,
        running: bool,
    ) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub(crate) fn exec_calls(&self) -> Vec<Vec<String>> {
        self.exec_calls.lock().clone()
    }

    /// Number of exec calls whose argv mentions `pattern`
    pub(crate) fn calls_matching(
        &self,
        pattern: &str,
    ) -> usize {
        self.exec_calls
            .lock()
            .iter()
            .filter(|argv| argv.iter().any(|arg| arg.contains(pattern)))
            .count()
    }

    pub(crate) fn copies(&self) -> Vec<(String, String)> {
        self.copies.lock().clone()
    }

    pub(crate) fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    fn next_reply(
        &self,
        argv: &[String],
    ) -> Option<Reply> {
        let mut rules = self.rules.lock();
        let rule = rules
            .iter_mut()
            .find(|rule| argv.iter().any(|arg| arg.contains(&rule.pattern)))?;

        if rule.replies.len() > 1 {
            rule.replies.pop_front()
        } else {
            rule.replies.front().cloned()
        }
    }
}

#[async_trait]
impl Startable for FakeRuntime {
    async fn start(&self) -> Result<(), RuntimeError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.start_error.lock().clone() {
            return Err(e);
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), RuntimeError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        match self.stop_error.lock().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn mapped_port(
        &self,
        internal_port: u16,
    ) -> Result<u16, RuntimeError> {
        self.mapped_ports
            .lock()
            .get(&internal_port)
            .copied()
            .ok_or(RuntimeError::PortNotMapped(internal_port))
    }
}

#[async_trait]
impl CommandExecutable for FakeRuntime {
    async fn exec(
        &self,
        argv: Vec<String>,
    ) -> Result<ExecOutput, RuntimeError> {
        let reply = self.next_reply(&argv);
        self.exec_calls.lock().push(argv);

        match reply {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Error(e)) => Err(e),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(RuntimeError::Exec("no scripted reply".to_string())),
        }
    }
}

#[async_trait]
impl FileTransferable for FakeRuntime {
    async fn copy_file(
        &self,
        local_path: &str,
        remote_path: &str,
    ) -> Result<(), RuntimeError> {
        if let Some(e) = self.copy_error.lock().clone() {
            return Err(e);
        }
        self.copies.lock().push((local_path.to_string(), remote_path.to_string()));
        Ok(())
    }
}
