use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::instance::read_document;
use crate::ConfigError;

const ROUTER_PREFIX: &str = "router";

/// One replica set as declared in `replicasets.yml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyNode {
    pub id: String,
    pub members: BTreeSet<String>,
    pub roles: Vec<String>,
    /// Derived: some member id starts with "router", ignoring case
    pub is_router: bool,
    /// Required for storage replica sets, absent for the router
    pub weight: Option<u32>,
    /// Required for storage replica sets, absent for the router
    pub vshard_group: Option<String>,
    pub all_rw: bool,
}

#[derive(Debug, Deserialize)]
struct RawReplicaset {
    instances: Option<Vec<String>>,
    roles: Option<Vec<String>>,
    weight: Option<u32>,
    vshard_group: Option<String>,
    all_rw: Option<bool>,
}

/// Case-insensitive prefix test on a member id.
pub fn is_router_member(member: &str) -> bool {
    member
        .get(..ROUTER_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ROUTER_PREFIX))
}

/// Parses a topology document: a mapping of replica set id ->
/// `{instances, roles, weight?, vshard_group?, all_rw}`.
///
/// Fails on the first malformed entry, then checks that exactly one replica
/// set is a router.
pub fn parse_topology(doc: &str) -> Result<BTreeMap<String, TopologyNode>, ConfigError> {
    let raw: BTreeMap<String, RawReplicaset> = serde_yaml::from_str(doc)?;

    let mut nodes = BTreeMap::new();
    for (id, entry) in raw {
        let node = parse_node(id.clone(), entry)?;
        nodes.insert(id, node);
    }

    let routers = nodes.values().filter(|n| n.is_router).count();
    if routers != 1 {
        return Err(ConfigError::RouterCount { found: routers });
    }

    debug!("parsed {} replica sets", nodes.len());
    Ok(nodes)
}

pub fn load_topology(path: impl AsRef<Path>) -> Result<BTreeMap<String, TopologyNode>, ConfigError> {
    parse_topology(&read_document(path.as_ref())?)
}

fn parse_node(
    id: String,
    entry: RawReplicaset,
) -> Result<TopologyNode, ConfigError> {
    let missing = |field| ConfigError::MissingField {
        entry: id.clone(),
        field,
    };
    let empty = |field| ConfigError::InvalidField {
        entry: id.clone(),
        field,
        reason: "must not be empty".into(),
    };

    let members: BTreeSet<String> = entry.instances.ok_or_else(|| missing("instances"))?.into_iter().collect();
    if members.is_empty() {
        return Err(empty("instances"));
    }

    let roles = entry.roles.ok_or_else(|| missing("roles"))?;
    if roles.is_empty() {
        return Err(empty("roles"));
    }

    let all_rw = entry.all_rw.ok_or_else(|| missing("all_rw"))?;

    let is_router = members.iter().any(|m| is_router_member(m));
    let (weight, vshard_group) = if is_router {
        (None, None)
    } else {
        (
            Some(entry.weight.ok_or_else(|| missing("weight"))?),
            Some(entry.vshard_group.ok_or_else(|| missing("vshard_group"))?),
        )
    };

    Ok(TopologyNode {
        id,
        members,
        roles,
        is_router,
        weight,
        vshard_group,
        all_rw,
    })
}
