//! Port discovery and attribute association
//!
//! Interfaces are enumerated from `ifChassisTable`. Ethernet interfaces hang
//! off the PIC (or FPC) that hosts them and aggregates hang off the root.
//! Unit interfaces (`xe-0/0/0.0`) never become nodes, but addresses configured
//! on them are credited to their base port.

use arbor_core::{
    Duplex, LogicalPort, NodeId, NodeKind, PhysicalPort, PortAttribute, Resource, ResourceTree,
    SnmpTable, TreeError,
};
use arbor_snmp::SnmpSource;
use std::collections::BTreeMap;
use tracing::{debug, info, trace, warn};

use crate::builder::BuildContext;
use crate::error::AutoloadError;
use crate::lldp::query_neighbor;
use crate::mibs::{etherlike, if_mib, ip, juniper_if, lag};
use crate::tables::PortsByName;

/// How an interface is represented in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceClass<'a> {
    Physical,
    Aggregate,
    /// Logical unit of the named base interface
    Unit { base: &'a str },
    Other,
}

/// Classify an interface by name and `ifType`
pub fn classify<'a>(name: &'a str, if_type: &str) -> InterfaceClass<'a> {
    if let Some((base, _)) = name.split_once('.') {
        return InterfaceClass::Unit { base };
    }
    let if_type = if_type.trim();
    if if_mib::TYPE_ETHERNET.contains(&if_type) {
        InterfaceClass::Physical
    } else if if_mib::TYPE_LAG.contains(&if_type) {
        InterfaceClass::Aggregate
    } else {
        InterfaceClass::Other
    }
}

/// Container of a physical port: sub-module `fpc.pic`, else module `fpc`
///
/// Both numbers are the agent's 1-based values, matching the contents
/// table indexes, not the 0-based slots in the interface name.
pub fn physical_parent(tree: &ResourceTree, chassis_ports: &SnmpTable, if_index: &str) -> Option<NodeId> {
    let fpc = chassis_ports.value(if_index, juniper_if::FPC)?;
    if let Some(pic) = chassis_ports.value(if_index, juniper_if::PIC) {
        if let Some(sub_module) = tree.find(NodeKind::SubModule, &format!("{}.{}", fpc, pic)) {
            return Some(sub_module);
        }
    }
    tree.find(NodeKind::Module, fpc)
}

/// Port speed in Mbps, preferring `ifHighSpeed` over `ifSpeed`
fn bandwidth(interfaces: &SnmpTable, extensions: &SnmpTable, if_index: &str) -> u64 {
    extensions
        .value(if_index, if_mib::IF_HIGH_SPEED)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .or_else(|| {
            interfaces
                .value(if_index, if_mib::IF_SPEED)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|bps| bps / 1_000_000)
        })
        .unwrap_or(0)
}

fn text(table: &SnmpTable, if_index: &str, field: &str) -> String {
    table
        .value(if_index, field)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Build physical and logical ports, then associate their attributes
pub fn build_ports<S: SnmpSource>(ctx: &mut BuildContext<S>) -> Result<(), AutoloadError> {
    let chassis_ports = ctx.tables.interface_chassis()?;
    let interfaces = ctx.tables.interfaces()?;
    let extensions = ctx.tables.interface_extensions()?;
    let root = ctx.tree.root_id().ok_or(TreeError::NoRoot)?;

    // ifIndex -> base interface name
    let mut units: BTreeMap<String, String> = BTreeMap::new();

    for if_index in chassis_ports.indexes() {
        let name = interfaces
            .value(if_index, if_mib::IF_DESCR)
            .map(str::trim)
            .ok_or_else(|| AutoloadError::missing(if_mib::IF_TABLE, if_mib::IF_DESCR, if_index))?;
        let if_type = interfaces.value(if_index, if_mib::IF_TYPE).unwrap_or_default();

        match classify(name, if_type) {
            InterfaceClass::Unit { base } => {
                units.insert(if_index.to_string(), base.to_string());
            }
            InterfaceClass::Aggregate => {
                let port = LogicalPort {
                    name: name.to_string(),
                    description: text(&extensions, if_index, if_mib::IF_ALIAS),
                    ..Default::default()
                };
                ctx.tree.attach(root, if_index, Resource::LogicalPort(port))?;
                debug!(index = %if_index, name = %name, "Attached aggregate");
            }
            InterfaceClass::Physical => {
                let Some(parent) = physical_parent(&ctx.tree, &chassis_ports, if_index) else {
                    warn!(
                        kind = %NodeKind::PhysicalPort,
                        index = %if_index,
                        name = %name,
                        fpc = chassis_ports.value(if_index, juniper_if::FPC).unwrap_or_default(),
                        pic = chassis_ports.value(if_index, juniper_if::PIC).unwrap_or_default(),
                        "Dropping orphan, no module or sub-module found"
                    );
                    continue;
                };
                let port = PhysicalPort {
                    name: name.to_string(),
                    description: text(&extensions, if_index, if_mib::IF_ALIAS),
                    mac_address: text(&interfaces, if_index, if_mib::IF_PHYS_ADDRESS),
                    mtu: text(&interfaces, if_index, if_mib::IF_MTU).parse().unwrap_or(0),
                    bandwidth: bandwidth(&interfaces, &extensions, if_index),
                    ..Default::default()
                };
                ctx.tree.attach(parent, if_index, Resource::PhysicalPort(port))?;
                debug!(index = %if_index, name = %name, "Attached port");
            }
            InterfaceClass::Other => {
                trace!(index = %if_index, name = %name, if_type = %if_type, "Skipping interface");
            }
        }
    }

    associate_link_state(ctx)?;
    associate_addresses(ctx, &units)?;
    associate_members(ctx)?;

    info!(
        physical = ctx.tree.nodes_of(NodeKind::PhysicalPort).count(),
        logical = ctx.tree.nodes_of(NodeKind::LogicalPort).count(),
        "Built ports"
    );
    Ok(())
}

fn physical_port_mut(tree: &mut ResourceTree, id: NodeId) -> Option<&mut PhysicalPort> {
    match tree.get_mut(id).map(|node| &mut node.resource) {
        Some(Resource::PhysicalPort(port)) => Some(port),
        _ => None,
    }
}

/// Duplex, autonegotiation and, where the schema publishes it, LLDP adjacency
fn associate_link_state<S: SnmpSource>(ctx: &mut BuildContext<S>) -> Result<(), AutoloadError> {
    let ports: Vec<(NodeId, String)> = ctx
        .tree
        .nodes_of(NodeKind::PhysicalPort)
        .map(|node| (node.id, node.index.clone()))
        .collect();
    if ports.is_empty() {
        return Ok(());
    }

    let duplex = ctx.tables.duplex()?;
    let auto_negotiation = ctx.tables.auto_negotiation()?;
    let lldp_keys = if ctx.schema.allows(PortAttribute::Adjacent) {
        Some(ctx.tables.lldp_keys()?)
    } else {
        None
    };

    for (id, if_index) in ports {
        let adjacent = match &lldp_keys {
            Some(keys) => query_neighbor(ctx.tables.source_mut(), keys, &if_index)?
                .map(|neighbor| neighbor.adjacent()),
            None => None,
        };
        if let Some(port) = physical_port_mut(&mut ctx.tree, id) {
            port.duplex = duplex
                .value(&if_index, etherlike::DUPLEX_STATUS)
                .map(Duplex::from_snmp);
            port.auto_negotiation = auto_negotiation.get(&if_index).copied();
            port.adjacent = adjacent;
        }
    }
    Ok(())
}

/// Resolve the port an address row belongs to
fn address_owner(
    tree: &ResourceTree,
    units: &BTreeMap<String, String>,
    physical_by_name: &PortsByName,
    logical_by_name: &PortsByName,
    if_index: &str,
) -> Option<NodeId> {
    if let Some(id) = tree
        .find(NodeKind::PhysicalPort, if_index)
        .or_else(|| tree.find(NodeKind::LogicalPort, if_index))
    {
        return Some(id);
    }
    let base = units.get(if_index)?;
    physical_by_name
        .get(base)
        .or_else(|| logical_by_name.get(base))
        .copied()
}

fn push_address(tree: &mut ResourceTree, id: NodeId, address: String, v6: bool) {
    let (ipv4, ipv6) = match tree.get_mut(id).map(|node| &mut node.resource) {
        Some(Resource::PhysicalPort(port)) => (&mut port.ipv4_addresses, &mut port.ipv6_addresses),
        Some(Resource::LogicalPort(port)) => (&mut port.ipv4_addresses, &mut port.ipv6_addresses),
        _ => return,
    };
    let addresses = if v6 { ipv6 } else { ipv4 };
    if !addresses.contains(&address) {
        addresses.push(address);
    }
}

/// Attribute IPv4 and IPv6 addresses to ports by ifIndex or unit base name
fn associate_addresses<S: SnmpSource>(
    ctx: &mut BuildContext<S>,
    units: &BTreeMap<String, String>,
) -> Result<(), AutoloadError> {
    let physical_by_name = ctx.tables.physical_ports_by_name(&ctx.tree);
    let logical_by_name = ctx.tables.logical_ports_by_name(&ctx.tree);
    let ipv4 = ctx.tables.ipv4_addresses()?;
    let ipv6 = ctx.tables.ipv6_addresses()?;

    for (table, address_field, v6) in [(&ipv4, ip::IPV4_ADDR, false), (&ipv6, ip::IPV6_ADDR, true)] {
        for (index, values) in table.iter() {
            let Some(if_index) = values.get(ip::IF_INDEX) else {
                continue;
            };
            let address = values
                .get(address_field)
                .cloned()
                .unwrap_or_else(|| index.to_string());
            match address_owner(&ctx.tree, units, &physical_by_name, &logical_by_name, if_index) {
                Some(id) => push_address(&mut ctx.tree, id, address, v6),
                None => trace!(address = %address, if_index = %if_index, "Address without port"),
            }
        }
    }
    Ok(())
}

/// Fill aggregate member lists from `dot3adAggPortAttachedAggID`
fn associate_members<S: SnmpSource>(ctx: &mut BuildContext<S>) -> Result<(), AutoloadError> {
    if ctx.tree.nodes_of(NodeKind::LogicalPort).next().is_none() {
        return Ok(());
    }
    let membership = ctx.tables.aggregation()?;

    for (member, values) in membership.iter() {
        let Some(aggregate) = values
            .get(lag::ATTACHED_AGG_ID)
            .and_then(|agg| ctx.tree.find(NodeKind::LogicalPort, agg.trim()))
        else {
            continue;
        };
        let Some(name) = ctx
            .tree
            .find(NodeKind::PhysicalPort, member)
            .and_then(|id| ctx.tree.get(id))
            .and_then(|node| match &node.resource {
                Resource::PhysicalPort(port) => Some(port.name.clone()),
                _ => None,
            })
        else {
            continue;
        };
        if let Some(Resource::LogicalPort(port)) =
            ctx.tree.get_mut(aggregate).map(|node| &mut node.resource)
        {
            port.associated_ports.push(name);
        }
    }
    Ok(())
}
