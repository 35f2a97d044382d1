//! LLDP neighbor lookup for physical port adjacency
//!
//! Remote entries in `LLDP-MIB` are indexed `timeMark.localPortNum.remIndex`.
//! Junos numbers local LLDP ports by ifIndex, so the local port number is
//! what ties a neighbor to a physical port.

use arbor_core::SnmpTable;
use arbor_snmp::{QueryError, SnmpSource};
use std::collections::BTreeMap;
use tracing::debug;

use crate::mibs::lldp;

/// A remote table entry seen on one local port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Full remote table index
    pub key: String,
    /// `lldpRemPortId` as walked
    pub port_id: String,
}

/// Local port number -> remote table entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LldpKeys {
    by_local_port: BTreeMap<String, RemoteEntry>,
}

impl LldpKeys {
    pub fn get(&self, local_port: &str) -> Option<&RemoteEntry> {
        self.by_local_port.get(local_port)
    }

    pub fn len(&self) -> usize {
        self.by_local_port.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_local_port.is_empty()
    }
}

/// LLDP neighbor information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LldpNeighbor {
    /// Local port number (ifIndex)
    pub local_port: String,
    pub system_name: String,
    /// Port description, or the port id when the neighbor sends none
    pub port: String,
}

impl LldpNeighbor {
    /// Adjacency string published on the local port
    pub fn adjacent(&self) -> String {
        if self.system_name.is_empty() {
            return self.port.clone();
        }
        format!("{} through {}", self.system_name, self.port)
    }
}

/// Extract the local port number from a remote table index
pub fn parse_local_port(index: &str) -> Option<&str> {
    let parts: Vec<&str> = index.split('.').collect();
    let local = match parts.as_slice() {
        [_, local, _] => *local,
        [local] => *local,
        _ => return None,
    };
    (!local.is_empty()).then_some(local)
}

/// Build the local port key set from an `lldpRemPortId` walk
pub fn build_lldp_keys(table: &SnmpTable) -> LldpKeys {
    let mut by_local_port = BTreeMap::new();
    for (index, values) in table.iter() {
        let Some(local) = parse_local_port(index) else {
            debug!(index = %index, "Skipping LLDP entry with unexpected index");
            continue;
        };
        by_local_port.insert(
            local.to_string(),
            RemoteEntry {
                key: index.to_string(),
                port_id: values.get(lldp::REM_PORT_ID).cloned().unwrap_or_default(),
            },
        );
    }
    debug!("Found {} LLDP neighbors", by_local_port.len());
    LldpKeys { by_local_port }
}

/// Neighbors may omit the system name and port description. An absent
/// object is not an error here; anything else from the source still is.
fn optional(result: Result<String, QueryError>) -> Result<Option<String>, QueryError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(QueryError::NoSuchValue { .. } | QueryError::ErrorResponse { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Query the neighbor seen on `local_port`, if any
pub fn query_neighbor<S: SnmpSource>(
    source: &mut S,
    keys: &LldpKeys,
    local_port: &str,
) -> Result<Option<LldpNeighbor>, QueryError> {
    let Some(entry) = keys.get(local_port) else {
        return Ok(None);
    };

    let system_name =
        optional(source.get_property(lldp::MIB, lldp::REM_SYS_NAME, &entry.key))?
            .unwrap_or_default();
    let port = optional(source.get_property(lldp::MIB, lldp::REM_PORT_DESC, &entry.key))?
        .filter(|description| !description.trim().is_empty())
        .unwrap_or_else(|| entry.port_id.clone());

    Ok(Some(LldpNeighbor {
        local_port: local_port.to_string(),
        system_name,
        port,
    }))
}
