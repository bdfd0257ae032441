use std::path::Path;
use std::sync::Arc;

use serde_yaml::Value;

use crate::reply_error;
use crate::BootstrapCause;

/// Decides whether a topology error text means "already applied".
pub type CollisionPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Predicate matching any error text that contains `marker`.
pub fn marker_predicate(marker: impl Into<String>) -> CollisionPredicate {
    let marker = marker.into();
    Arc::new(move |text: &str| text.contains(&marker))
}

/// How the declared topology is pushed into the running cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologySource {
    /// A replica set document applied with the cartridge CLI
    StructuredFile {
        topology_file: String,
        instances_file: String,
        run_dir: String,
    },
    /// A Lua script copied into the container and evaluated on the router
    Script { path: String },
}

impl TopologySource {
    /// `.yml`/`.yaml` documents go through the CLI, anything else is a script.
    pub fn infer(
        topology_path: &str,
        instances_path: &str,
        run_dir: &str,
    ) -> Self {
        let extension = Path::new(topology_path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("yml") | Some("yaml") => TopologySource::StructuredFile {
                topology_file: file_name(topology_path),
                instances_file: file_name(instances_path),
                run_dir: run_dir.to_string(),
            },
            _ => TopologySource::Script {
                path: topology_path.to_string(),
            },
        }
    }
}

/// argv of the cartridge CLI call applying a replica set document
pub fn setup_command(
    topology_file: &str,
    instances_file: &str,
    run_dir: &str,
) -> Vec<String> {
    vec![
        "cartridge".to_string(),
        "replicasets".to_string(),
        format!("--run-dir={run_dir}"),
        format!("--file={topology_file}"),
        format!("--cfg={instances_file}"),
        "setup".to_string(),
        "--bootstrap-vshard".to_string(),
    ]
}

fn file_name(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    match normalized.rsplit_once('/') {
        Some((_, name)) => name.to_string(),
        None => normalized,
    }
}

/// Result of one topology application attempt
#[derive(Debug)]
pub enum ApplyOutcome {
    Applied,
    /// The cluster reported a collision: a previous run already applied it
    AlreadyApplied,
    /// The call timed out while the cluster was reconfiguring. Confirmed
    /// later by the health probe.
    Tentative,
    Failed(BootstrapCause),
}

impl ApplyOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ApplyOutcome::Failed(_))
    }
}

/// Interprets the decoded reply of a topology script.
///
/// A `nil, err` reply is a failure unless the error text is a collision.
/// Every other reply counts as applied.
pub fn interpret_script_reply(
    reply: &Value,
    is_collision: &CollisionPredicate,
) -> ApplyOutcome {
    match reply_error(reply) {
        None => ApplyOutcome::Applied,
        Some(text) if is_collision(&text) => ApplyOutcome::AlreadyApplied,
        Some(text) => ApplyOutcome::Failed(BootstrapCause::TopologyReply(text)),
    }
}
