use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::ConfigError;

/// One node process as declared in `instances.yml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    /// Full key, usually `<app>.<instance>`
    pub id: String,
    pub workdir: String,
    pub advertise_host: Option<String>,
    /// Binary port taken from `advertise_uri`
    pub advertise_port: Option<u16>,
    pub http_port: Option<u16>,
}

impl InstanceSpec {
    /// Instance name without the application prefix: `testapp.router` -> `router`
    pub fn name(&self) -> &str {
        self.id.split_once('.').map(|(_, name)| name).unwrap_or(&self.id)
    }

    /// Whether a topology member id refers to this instance
    pub fn is_named(
        &self,
        member: &str,
    ) -> bool {
        self.id == member || self.name() == member
    }
}

#[derive(Debug, Deserialize)]
struct RawInstance {
    workdir: Option<String>,
    advertise_uri: Option<String>,
    http_port: Option<u16>,
}

/// Parses an instance document: a mapping of instance id ->
/// `{workdir, advertise_uri?, http_port?}`.
pub fn parse_instances(doc: &str) -> Result<BTreeMap<String, InstanceSpec>, ConfigError> {
    let raw: BTreeMap<String, RawInstance> = serde_yaml::from_str(doc)?;

    let mut instances = BTreeMap::new();
    for (id, entry) in raw {
        let workdir = entry.workdir.ok_or_else(|| ConfigError::MissingField {
            entry: id.clone(),
            field: "workdir",
        })?;

        let (advertise_host, advertise_port) = match entry.advertise_uri {
            Some(uri) => {
                let (host, port) = split_endpoint(&id, &uri)?;
                (Some(host), Some(port))
            }
            None => (None, None),
        };

        instances.insert(
            id.clone(),
            InstanceSpec {
                id,
                workdir,
                advertise_host,
                advertise_port,
                http_port: entry.http_port,
            },
        );
    }

    debug!("parsed {} instances", instances.len());
    Ok(instances)
}

pub fn load_instances(path: impl AsRef<Path>) -> Result<BTreeMap<String, InstanceSpec>, ConfigError> {
    parse_instances(&read_document(path.as_ref())?)
}

/// Every port that must be published: all HTTP ports plus all advertised
/// binary ports.
pub fn exposed_ports<'a, I>(instances: I) -> BTreeSet<u16>
where
    I: IntoIterator<Item = &'a InstanceSpec>,
{
    instances
        .into_iter()
        .flat_map(|spec| [spec.http_port, spec.advertise_port])
        .flatten()
        .collect()
}

/// Splits `host:port` on the last `:`.
fn split_endpoint(
    instance: &str,
    endpoint: &str,
) -> Result<(String, u16), ConfigError> {
    let malformed = || ConfigError::MalformedEndpoint {
        instance: instance.to_string(),
        endpoint: endpoint.to_string(),
    };

    let (host, port) = endpoint.rsplit_once(':').ok_or_else(malformed)?;
    let port: u16 = port.trim().parse().map_err(|_| malformed())?;
    if port == 0 {
        return Err(malformed());
    }
    Ok((host.to_string(), port))
}

pub(super) fn read_document(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.display().to_string(),
        source,
    })
}
