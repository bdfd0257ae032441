//! Doubles and fixtures shared by the unit tests
mod fake_runtime;
mod fixtures;
mod manual_clock;
mod mocked_runtime;

pub(crate) use fake_runtime::*;
pub(crate) use fixtures::*;
pub(crate) use manual_clock::*;
pub(crate) use mocked_runtime::*;

use std::sync::Arc;
use std::time::Duration;

use crate::Credentials;
use crate::Endpoint;
use crate::RemoteExecutor;
use crate::RemoteTarget;
use crate::TransportConfig;

pub(crate) const ROUTER_PROBE: &str = "cartridge ~= nil";
pub(crate) const HEALTH_PROBE: &str = "is_healthy";
pub(crate) const SHARD_BOOTSTRAP: &str = "admin_bootstrap_vshard";
pub(crate) const SCRIPT_RUN: &str = "dofile";
pub(crate) const CLI_SETUP: &str = "replicasets";

pub(crate) fn test_target(transport: TransportConfig) -> RemoteTarget {
    RemoteTarget {
        transport,
        endpoint: Endpoint::new("localhost", 3301),
        credentials: Credentials {
            username: "admin".to_string(),
            password: "secret-cluster-cookie".to_string(),
        },
        connect_timeout: Duration::from_secs(3),
        eval_timeout: Duration::from_secs(30),
        request_timeout: Duration::from_secs(60),
        script_error_codes: vec![3],
    }
}

pub(crate) fn plain_executor(runtime: &Arc<FakeRuntime>) -> RemoteExecutor<FakeRuntime> {
    RemoteExecutor::new(runtime.clone(), test_target(TransportConfig::Plain))
}
