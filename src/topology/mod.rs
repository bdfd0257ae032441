//! Typed view of the cluster documents.
//!
//! The instance document tells which node processes exist and which ports
//! they listen on; the topology document tells how they are grouped into
//! replica sets. Parsing is synchronous and all-or-nothing: any problem is a
//! [`ConfigError`] and no partial result is returned.

mod instance;
mod replicaset;
pub use instance::*;
pub use replicaset::*;


use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::ConfigError;

/// Parsed instances together with the optional declared topology
#[derive(Debug, Clone)]
pub struct ClusterLayout {
    instances: BTreeMap<String, InstanceSpec>,
    topology: Option<BTreeMap<String, TopologyNode>>,
    exposed_ports: BTreeSet<u16>,
}

impl ClusterLayout {
    /// Validates membership when a topology is present and freezes the
    /// exposed port set.
    pub fn new(
        instances: BTreeMap<String, InstanceSpec>,
        topology: Option<BTreeMap<String, TopologyNode>>,
    ) -> Result<Self, ConfigError> {
        if let Some(nodes) = &topology {
            validate_membership(&instances, nodes)?;
        }
        let exposed_ports = exposed_ports(instances.values());
        Ok(Self {
            instances,
            topology,
            exposed_ports,
        })
    }

    pub fn instances(&self) -> &BTreeMap<String, InstanceSpec> {
        &self.instances
    }

    pub fn topology(&self) -> Option<&BTreeMap<String, TopologyNode>> {
        self.topology.as_ref()
    }

    pub fn exposed_ports(&self) -> &BTreeSet<u16> {
        &self.exposed_ports
    }

    /// The router replica set, when a topology was declared
    pub fn router(&self) -> Option<&TopologyNode> {
        self.topology.as_ref()?.values().find(|n| n.is_router)
    }
}

/// Every instance belongs to exactly one replica set and every member names
/// a declared instance.
pub fn validate_membership(
    instances: &BTreeMap<String, InstanceSpec>,
    nodes: &BTreeMap<String, TopologyNode>,
) -> Result<(), ConfigError> {
    // instance id -> owning replica set
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();

    for node in nodes.values() {
        for member in &node.members {
            let spec = instances
                .values()
                .find(|spec| spec.is_named(member))
                .ok_or_else(|| ConfigError::UnknownMember {
                    replicaset: node.id.clone(),
                    member: member.clone(),
                })?;

            if let Some(first) = owners.insert(spec.id.as_str(), node.id.as_str()) {
                return Err(ConfigError::DuplicateMember {
                    member: spec.id.clone(),
                    first: first.to_string(),
                    second: node.id.clone(),
                });
            }
        }
    }

    if let Some(spec) = instances.values().find(|spec| !owners.contains_key(spec.id.as_str())) {
        return Err(ConfigError::UnassignedInstance {
            instance: spec.id.clone(),
        });
    }
    Ok(())
}
