// -
// Router endpoint defaults

pub(crate) const DEFAULT_ROUTER_HOST: &str = "localhost";
pub(crate) const DEFAULT_ROUTER_PORT: u16 = 3301;
pub(crate) const DEFAULT_API_PORT: u16 = 8081;
pub(crate) const DEFAULT_ROUTER_USERNAME: &str = "admin";
pub(crate) const DEFAULT_ROUTER_PASSWORD: &str = "testapp-cluster-cookie";

// -
// Container layout

pub(crate) const DEFAULT_INSTANCE_DIR: &str = "/app";
pub(crate) const DEFAULT_RUN_DIR: &str = "/tmp/run";
/// Scripts are copied here before `dofile()` runs them
pub(crate) const REMOTE_SCRIPT_DIR: &str = "/tmp";

// -
// Remote expressions

pub(crate) const ROUTER_UP_PROBE: &str =
    "local cartridge = package.loaded['cartridge'] return assert(cartridge ~= nil)";
pub(crate) const CLUSTER_HEALTHY_PROBE: &str =
    "local cartridge = package.loaded['cartridge'] return assert(cartridge) and assert(cartridge.is_healthy())";
pub(crate) const VSHARD_BOOTSTRAP_COMMAND: &str = "return require('cartridge').admin_bootstrap_vshard()";

/// Error text cartridge returns when the topology is already applied
pub(crate) const DEFAULT_COLLISION_MARKER: &str = "collision with another server";

// -
// Exit codes of the remote request chunk

pub(crate) const EXIT_CONNECT_FAILED: i32 = 2;
pub(crate) const EXIT_SCRIPT_ERROR: i32 = 3;
pub(crate) const EXIT_EVAL_TIMEOUT: i32 = 4;

// -
// Build argument passthrough

pub(crate) const ENV_TARANTOOL_RUNDIR: &str = "TARANTOOL_RUNDIR";

pub(crate) const BUILD_ARG_ENV_VARS: [&str; 9] = [
    "TARANTOOL_VERSION",
    "TARANTOOL_SERVER_USER",
    "TARANTOOL_SERVER_UID",
    "TARANTOOL_SERVER_GROUP",
    "TARANTOOL_SERVER_GID",
    "TARANTOOL_WORKDIR",
    ENV_TARANTOOL_RUNDIR,
    "TARANTOOL_DATADIR",
    "TARANTOOL_INSTANCES_FILE",
];
