use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::EXIT_SCRIPT_ERROR;
use crate::Error;
use crate::Result;

/// How the request chunk connects to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    Plain,
    Ssl,
    MutualTls { cert_path: String, key_path: String },
}

impl TransportConfig {
    /// Picks the transport from whichever options are populated.
    ///
    /// Both cert and key present means mutual TLS regardless of `ssl`; otherwise
    /// `ssl` selects server-side SSL; otherwise plain. Empty paths count as
    /// absent.
    pub fn select(
        ssl: bool,
        cert_path: Option<&str>,
        key_path: Option<&str>,
    ) -> Self {
        let cert_path = cert_path.filter(|p| !p.is_empty());
        let key_path = key_path.filter(|p| !p.is_empty());

        match (cert_path, key_path) {
            (Some(cert), Some(key)) => TransportConfig::MutualTls {
                cert_path: cert.to_string(),
                key_path: key.to_string(),
            },
            _ if ssl => TransportConfig::Ssl,
            _ => TransportConfig::Plain,
        }
    }

    pub fn is_secure(&self) -> bool {
        !matches!(self, TransportConfig::Plain)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransportSettings {
    /// Use SSL as connection transport. The cluster must listen with SSL.
    /// Default: false
    #[serde(default)]
    pub ssl: bool,

    /// Path to the client private key inside the container
    #[serde(default)]
    pub key_file: Option<String>,

    /// Path to the client certificate inside the container
    #[serde(default)]
    pub cert_file: Option<String>,

    /// net.box connect timeout (unit: milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Remote eval timeout (unit: milliseconds)
    #[serde(default = "default_eval_timeout_ms")]
    pub eval_timeout_ms: u64,

    /// Upper bound for one exec round trip (unit: milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Exit codes meaning "the expression raised"
    #[serde(default = "default_script_error_codes")]
    pub script_error_codes: Vec<i32>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            ssl: false,
            key_file: None,
            cert_file: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            eval_timeout_ms: default_eval_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            script_error_codes: default_script_error_codes(),
        }
    }
}

impl TransportSettings {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::select(self.ssl, self.cert_file.as_deref(), self.key_file.as_deref())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn eval_timeout(&self) -> Duration {
        Duration::from_millis(self.eval_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let has_key = self.key_file.as_deref().is_some_and(|p| !p.is_empty());
        let has_cert = self.cert_file.as_deref().is_some_and(|p| !p.is_empty());
        if has_key != has_cert {
            return Err(Error::InvalidConfig(
                "key_file and cert_file must be configured together".into(),
            ));
        }

        if self.connect_timeout_ms == 0 || self.eval_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(Error::InvalidConfig("transport timeouts must be positive".into()));
        }

        if self.request_timeout_ms < self.eval_timeout_ms {
            return Err(Error::InvalidConfig(format!(
                "request_timeout_ms ({}) must not be shorter than eval_timeout_ms ({})",
                self.request_timeout_ms, self.eval_timeout_ms
            )));
        }

        if self.script_error_codes.is_empty() {
            return Err(Error::InvalidConfig(
                "script_error_codes must list at least one exit code".into(),
            ));
        }

        if self.script_error_codes.contains(&0) {
            return Err(Error::InvalidConfig(
                "exit code 0 cannot be classified as a script error".into(),
            ));
        }
        Ok(())
    }
}

fn default_connect_timeout_ms() -> u64 {
    3000
}
fn default_eval_timeout_ms() -> u64 {
    30000
}
fn default_request_timeout_ms() -> u64 {
    60000
}
fn default_script_error_codes() -> Vec<i32> {
    vec![EXIT_SCRIPT_ERROR]
}
