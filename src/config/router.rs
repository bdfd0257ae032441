use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_API_PORT;
use crate::constants::DEFAULT_INSTANCE_DIR;
use crate::constants::DEFAULT_ROUTER_HOST;
use crate::constants::DEFAULT_ROUTER_PASSWORD;
use crate::constants::DEFAULT_ROUTER_PORT;
use crate::constants::DEFAULT_ROUTER_USERNAME;
use crate::Error;
use crate::Result;

/// Where and how the harness reaches the cluster entry node
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RouterConfig {
    /// Router hostname as seen from inside the container
    /// Default: "localhost"
    #[serde(default = "default_host")]
    pub host: String,

    /// Router binary port inside the container
    /// Default: 3301
    #[serde(default = "default_port")]
    pub port: u16,

    /// Router HTTP API port inside the container
    /// Default: 8081
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Default: "admin"
    #[serde(default = "default_username")]
    pub username: String,

    /// Usually the `cluster_cookie` passed to `cartridge.cfg`
    #[serde(default = "default_password")]
    pub password: String,

    /// Bind every exposed port to the same host port instead of a random one
    /// Default: false
    #[serde(default)]
    pub use_fixed_ports: bool,

    /// Directory inside the container that holds the application
    /// Default: "/app"
    #[serde(default = "default_instance_dir")]
    pub instance_dir: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_port: default_api_port(),
            username: default_username(),
            password: default_password(),
            use_fixed_ports: false,
            instance_dir: default_instance_dir(),
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::InvalidConfig("router host cannot be empty".into()));
        }
        if self.port == 0 {
            return Err(Error::InvalidConfig("router port must be non-zero".into()));
        }
        if self.api_port == 0 {
            return Err(Error::InvalidConfig("router api_port must be non-zero".into()));
        }
        if self.username.is_empty() {
            return Err(Error::InvalidConfig("router username cannot be empty".into()));
        }
        if self.instance_dir.is_empty() {
            return Err(Error::InvalidConfig("instance_dir cannot be empty".into()));
        }
        Ok(())
    }
}

fn default_host() -> String {
    DEFAULT_ROUTER_HOST.into()
}
fn default_port() -> u16 {
    DEFAULT_ROUTER_PORT
}
fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}
fn default_username() -> String {
    DEFAULT_ROUTER_USERNAME.into()
}
fn default_password() -> String {
    DEFAULT_ROUTER_PASSWORD.into()
}
fn default_instance_dir() -> String {
    DEFAULT_INSTANCE_DIR.into()
}
