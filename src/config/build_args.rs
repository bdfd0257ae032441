use std::collections::HashMap;
use std::env;

use crate::constants::BUILD_ARG_ENV_VARS;
use crate::constants::DEFAULT_RUN_DIR;
use crate::constants::ENV_TARANTOOL_RUNDIR;

/// Image build arguments forwarded untouched to the container runtime.
///
/// Kept outside [`HarnessConfig`](crate::HarnessConfig) because the `config`
/// crate folds key case, and these keys are Dockerfile `ARG` names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    args: HashMap<String, String>,
}

impl BuildArgs {
    pub fn new(args: HashMap<String, String>) -> Self {
        Self { args }
    }

    /// Fills in the well-known `TARANTOOL_*` variables from the process
    /// environment. Explicit entries win.
    pub fn merged_with_env(mut self) -> Self {
        for name in BUILD_ARG_ENV_VARS {
            if self.args.contains_key(name) {
                continue;
            }
            if let Ok(value) = env::var(name) {
                self.args.insert(name.to_string(), value);
            }
        }
        self
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// Run directory the cartridge CLI uses inside the container
    pub fn run_dir(&self) -> &str {
        self.get(ENV_TARANTOOL_RUNDIR).unwrap_or(DEFAULT_RUN_DIR)
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.args
    }
}
