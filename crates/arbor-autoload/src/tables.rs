//! Memoized views over the SNMP source
//!
//! Every view is fetched at most once per session. Build steps ask for the
//! view they need and get an `Arc` back, so several steps share one walk.

use arbor_core::{
    group_by_field, AttributeBag, IndexGroups, Memo, NodeId, NodeKind, Resource, ResourceTree,
    SnmpTable,
};
use arbor_snmp::{QueryError, SnmpSource};
use std::collections::{BTreeMap, HashMap};
use std::net::Ipv6Addr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::lldp::{build_lldp_keys, LldpKeys};
use crate::mibs::{etherlike, if_mib, ip, juniper, juniper_if, lag, lldp, mau, snmpv2};

/// Port name -> node
pub type PortsByName = HashMap<String, NodeId>;

/// SNMP source wrapped with compute-once views
pub struct CachedTables<S> {
    source: S,
    system_description: Memo<String>,
    ipv4_addresses: Memo<SnmpTable>,
    ipv6_addresses: Memo<SnmpTable>,
    contents: Memo<SnmpTable>,
    content_groups: Memo<IndexGroups>,
    interface_chassis: Memo<SnmpTable>,
    interfaces: Memo<SnmpTable>,
    interface_extensions: Memo<SnmpTable>,
    duplex: Memo<SnmpTable>,
    auto_negotiation: Memo<BTreeMap<String, bool>>,
    aggregation: Memo<SnmpTable>,
    lldp_keys: Memo<LldpKeys>,
    physical_by_name: Memo<PortsByName>,
    logical_by_name: Memo<PortsByName>,
}

fn walk_once<S: SnmpSource>(
    memo: &mut Memo<SnmpTable>,
    source: &mut S,
    mib: &str,
    table: &str,
) -> Result<Arc<SnmpTable>, QueryError> {
    memo.get_or_try_init(|| {
        let rows = source.walk(mib, table)?;
        debug!(mib, table, rows = rows.len(), "Walked table");
        Ok(rows)
    })
}

/// Split an `ipv6AddrEntry` index (`ifIndex.<16 address octets>`)
pub fn parse_ipv6_index(index: &str) -> Option<(&str, Ipv6Addr)> {
    let (if_index, rest) = index.split_once('.')?;
    if if_index.is_empty() || !if_index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let octets = rest
        .split('.')
        .map(|octet| octet.parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;
    let octets: [u8; 16] = octets.try_into().ok()?;
    Some((if_index, Ipv6Addr::from(octets)))
}

/// The owner and address columns of an IPv6 row are not accessible on
/// real agents; derive whichever is missing from the row index.
fn with_ipv6_index_columns(index: &str, values: &AttributeBag) -> AttributeBag {
    let mut values = values.clone();
    if values.contains_key(ip::IF_INDEX) && values.contains_key(ip::IPV6_ADDR) {
        return values;
    }
    match parse_ipv6_index(index) {
        Some((if_index, address)) => {
            values
                .entry(ip::IF_INDEX.to_string())
                .or_insert_with(|| if_index.to_string());
            values
                .entry(ip::IPV6_ADDR.to_string())
                .or_insert_with(|| address.to_string());
        }
        None => debug!(index = %index, "IPv6 address index is not ifIndex plus 16 octets"),
    }
    values
}

impl<S: SnmpSource> CachedTables<S> {
    /// Wrap an already configured source
    pub fn new(source: S) -> Self {
        Self {
            source,
            system_description: Memo::new(),
            ipv4_addresses: Memo::new(),
            ipv6_addresses: Memo::new(),
            contents: Memo::new(),
            content_groups: Memo::new(),
            interface_chassis: Memo::new(),
            interfaces: Memo::new(),
            interface_extensions: Memo::new(),
            duplex: Memo::new(),
            auto_negotiation: Memo::new(),
            aggregation: Memo::new(),
            lldp_keys: Memo::new(),
            physical_by_name: Memo::new(),
            logical_by_name: Memo::new(),
        }
    }

    /// Direct access for point lookups
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// `sysDescr.0`
    pub fn system_description(&mut self) -> Result<Arc<String>, QueryError> {
        let source = &mut self.source;
        self.system_description.get_or_try_init(|| {
            source.get_property(snmpv2::MIB, snmpv2::SYS_DESCR, snmpv2::SCALAR)
        })
    }

    /// IPv4 address table, ordered by owning interface
    pub fn ipv4_addresses(&mut self) -> Result<Arc<SnmpTable>, QueryError> {
        let source = &mut self.source;
        self.ipv4_addresses.get_or_try_init(|| {
            let table = source.walk(ip::IPV4_MIB, ip::IPV4_TABLE)?;
            debug!(rows = table.len(), "Walked IPv4 address table");
            Ok(table.sorted_by_field(ip::IF_INDEX))
        })
    }

    /// IPv6 address table, ordered by owning interface
    pub fn ipv6_addresses(&mut self) -> Result<Arc<SnmpTable>, QueryError> {
        let source = &mut self.source;
        self.ipv6_addresses.get_or_try_init(|| {
            let table = source.walk(ip::IPV6_MIB, ip::IPV6_TABLE)?;
            debug!(rows = table.len(), "Walked IPv6 address table");
            let table: SnmpTable = table
                .iter()
                .map(|(index, values)| (index.to_string(), with_ipv6_index_columns(index, values)))
                .collect();
            Ok(table.sorted_by_field(ip::IF_INDEX))
        })
    }

    /// `jnxContentsTable`
    pub fn contents(&mut self) -> Result<Arc<SnmpTable>, QueryError> {
        walk_once(
            &mut self.contents,
            &mut self.source,
            juniper::MIB,
            juniper::CONTENTS_TABLE,
        )
    }

    /// Content rows grouped by container type
    pub fn content_groups(&mut self) -> Result<Arc<IndexGroups>, QueryError> {
        if let Some(groups) = self.content_groups.get() {
            return Ok(groups);
        }
        let contents = self.contents()?;
        Ok(self
            .content_groups
            .get_or_init(|| group_by_field(&contents, juniper::CONTAINER_INDEX)))
    }

    /// `ifChassisTable`: ifIndex -> FPC, PIC, port
    pub fn interface_chassis(&mut self) -> Result<Arc<SnmpTable>, QueryError> {
        walk_once(
            &mut self.interface_chassis,
            &mut self.source,
            juniper_if::MIB,
            juniper_if::CHASSIS_TABLE,
        )
    }

    /// `ifTable`
    pub fn interfaces(&mut self) -> Result<Arc<SnmpTable>, QueryError> {
        walk_once(&mut self.interfaces, &mut self.source, if_mib::MIB, if_mib::IF_TABLE)
    }

    /// `ifXTable`: alias and high-capacity speed
    pub fn interface_extensions(&mut self) -> Result<Arc<SnmpTable>, QueryError> {
        walk_once(
            &mut self.interface_extensions,
            &mut self.source,
            if_mib::MIB,
            if_mib::IFX_TABLE,
        )
    }

    /// `dot3StatsDuplexStatus` by ifIndex
    pub fn duplex(&mut self) -> Result<Arc<SnmpTable>, QueryError> {
        walk_once(
            &mut self.duplex,
            &mut self.source,
            etherlike::MIB,
            etherlike::DUPLEX_STATUS,
        )
    }

    /// Autonegotiation admin state by ifIndex
    pub fn auto_negotiation(&mut self) -> Result<Arc<BTreeMap<String, bool>>, QueryError> {
        let source = &mut self.source;
        self.auto_negotiation.get_or_try_init(|| {
            let table = source.walk(mau::MIB, mau::AUTONEG_ADMIN_STATUS)?;
            debug!(rows = table.len(), "Walked autonegotiation table");
            Ok(auto_negotiation_by_interface(&table))
        })
    }

    /// `dot3adAggPortAttachedAggID` by member ifIndex
    pub fn aggregation(&mut self) -> Result<Arc<SnmpTable>, QueryError> {
        walk_once(&mut self.aggregation, &mut self.source, lag::MIB, lag::ATTACHED_AGG_ID)
    }

    /// Local port -> remote LLDP entry
    pub fn lldp_keys(&mut self) -> Result<Arc<LldpKeys>, QueryError> {
        let source = &mut self.source;
        self.lldp_keys.get_or_try_init(|| {
            let table = source.walk(lldp::MIB, lldp::REM_PORT_ID)?;
            Ok(build_lldp_keys(&table))
        })
    }

    /// Physical ports by name. Only valid once every port has been built.
    pub fn physical_ports_by_name(&mut self, tree: &ResourceTree) -> Arc<PortsByName> {
        self.physical_by_name
            .get_or_init(|| ports_by_name(tree, NodeKind::PhysicalPort))
    }

    /// Logical ports by name. Only valid once every port has been built.
    pub fn logical_ports_by_name(&mut self, tree: &ResourceTree) -> Arc<PortsByName> {
        self.logical_by_name
            .get_or_init(|| ports_by_name(tree, NodeKind::LogicalPort))
    }
}

/// Reduce `ifMauAutoNegAdminStatus` rows (`ifIndex.mauIndex`) to one flag
/// per interface
fn auto_negotiation_by_interface(table: &SnmpTable) -> BTreeMap<String, bool> {
    let mut by_interface = BTreeMap::new();
    for (index, values) in table.iter() {
        let interface = index.split('.').next().unwrap_or(index);
        let enabled = values
            .get(mau::AUTONEG_ADMIN_STATUS)
            .map(|v| matches!(v.trim(), "enabled" | "1"))
            .unwrap_or(false);
        by_interface.insert(interface.to_string(), enabled);
    }
    by_interface
}

fn ports_by_name(tree: &ResourceTree, kind: NodeKind) -> PortsByName {
    let mut by_name = PortsByName::new();
    for node in tree.nodes_of(kind) {
        let name = match &node.resource {
            Resource::PhysicalPort(port) => &port.name,
            Resource::LogicalPort(port) => &port.name,
            _ => continue,
        };
        if let Some(previous) = by_name.insert(name.clone(), node.id) {
            warn!(
                name = %name,
                kind = %kind,
                previous = previous.as_usize(),
                index = %node.index,
                "Duplicate port name, keeping the last one"
            );
        }
    }
    by_name
}
