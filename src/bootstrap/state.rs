use std::fmt;

use crate::FailureReason;

/// Lifecycle of one bootstrap run. `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    NotStarted,
    WaitingForRouter,
    /// 1-based attempt counter
    ApplyingTopology { attempt: u32 },
    WaitingForHealthy,
    BootstrappingShards,
    Ready,
    Failed(FailureReason),
}

impl BootstrapState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BootstrapState::Ready | BootstrapState::Failed(_))
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            BootstrapState::NotStarted => f.write_str("NotStarted"),
            BootstrapState::WaitingForRouter => f.write_str("WaitingForRouter"),
            BootstrapState::ApplyingTopology { attempt } => write!(f, "ApplyingTopology(attempt {attempt})"),
            BootstrapState::WaitingForHealthy => f.write_str("WaitingForHealthy"),
            BootstrapState::BootstrappingShards => f.write_str("BootstrappingShards"),
            BootstrapState::Ready => f.write_str("Ready"),
            BootstrapState::Failed(reason) => write!(f, "Failed({reason})"),
        }
    }
}
