//! Hierarchy build steps
//!
//! Each step reads the cached views it needs and attaches one kind of node
//! to parents created by an earlier step. Hardware comes from
//! `jnxContentsTable`, whose rows are indexed `container.L1.L2.L3`.

use arbor_core::{
    group_by, parse_identification, Component, NodeId, NodeKind, Resource, ResourceTree,
    RootDevice, SchemaVariant, SnmpTable, TreeError,
};
use arbor_snmp::SnmpSource;
use tracing::{debug, info, warn};

use crate::error::AutoloadError;
use crate::mibs::{juniper, snmpv2};
use crate::tables::CachedTables;

/// Mutable state shared by the build steps of one session
pub struct BuildContext<S> {
    pub schema: SchemaVariant,
    /// Resource name assigned to the root device
    pub resource_name: String,
    pub tree: ResourceTree,
    pub tables: CachedTables<S>,
}

impl<S: SnmpSource> BuildContext<S> {
    pub fn new(schema: SchemaVariant, resource_name: impl Into<String>, tables: CachedTables<S>) -> Self {
        Self {
            schema,
            resource_name: resource_name.into(),
            tree: ResourceTree::new(),
            tables,
        }
    }
}

/// A build step
pub type BuildStep<S> = fn(&mut BuildContext<S>) -> Result<(), AutoloadError>;

/// Parsed `jnxContentsTable` row index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentIndex<'a> {
    pub container: &'a str,
    pub l1: &'a str,
    pub l2: &'a str,
    pub l3: &'a str,
}

impl<'a> ContentIndex<'a> {
    /// Container and L1 are required; missing L2/L3 read as "0"
    pub fn parse(index: &'a str) -> Option<Self> {
        let mut parts = index.split('.');
        let container = parts.next().filter(|p| !p.is_empty())?;
        let l1 = parts.next().filter(|p| !p.is_empty())?;
        Some(Self {
            container,
            l1,
            l2: parts.next().unwrap_or("0"),
            l3: parts.next().unwrap_or("0"),
        })
    }

    /// Sub-module key, `"{module}.{slot}"`
    pub fn sub_module_key(&self) -> String {
        format!("{}.{}", self.l1, self.l2)
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Hardware attributes of one content row
pub fn content_component(contents: &SnmpTable, index: &str) -> Result<Component, AutoloadError> {
    let values = contents
        .get(index)
        .ok_or_else(|| AutoloadError::missing(juniper::CONTENTS_TABLE, juniper::MODEL, index))?;

    let model = non_empty(values.get(juniper::MODEL))
        .map(str::to_string)
        .or_else(|| {
            non_empty(values.get(juniper::TYPE))
                .and_then(|t| t.rsplit("::").next())
                .map(str::to_string)
        })
        .ok_or_else(|| AutoloadError::missing(juniper::CONTENTS_TABLE, juniper::MODEL, index))?;

    Ok(Component {
        model,
        serial_number: values.get(juniper::SERIAL_NO).cloned().unwrap_or_default(),
        description: non_empty(values.get(juniper::DESCR)).map(str::to_string),
        version: non_empty(values.get(juniper::REVISION)).map(str::to_string),
    })
}

/// Attach unless a node of the same kind already has `index`
fn attach_once(
    tree: &mut ResourceTree,
    parent: NodeId,
    index: String,
    resource: Resource,
) -> Result<bool, AutoloadError> {
    let kind = resource.kind();
    if tree.find(kind, &index).is_some() {
        warn!(kind = %kind, index = %index, "Skipping duplicate entry");
        return Ok(false);
    }
    tree.attach(parent, index.as_str(), resource)?;
    debug!(kind = %kind, index = %index, "Attached");
    Ok(true)
}

fn rows_in_container(contents: &SnmpTable, indexes: &[String]) -> SnmpTable {
    indexes
        .iter()
        .filter_map(|index| {
            contents
                .get(index)
                .map(|values| (index.clone(), values.clone()))
        })
        .collect()
}

/// Build the root device from the system group
pub fn build_root<S: SnmpSource>(ctx: &mut BuildContext<S>) -> Result<(), AutoloadError> {
    let description = ctx.tables.system_description()?;
    let source = ctx.tables.source_mut();
    let object_id = source.get_property(snmpv2::MIB, snmpv2::SYS_OBJECT_ID, snmpv2::SCALAR)?;
    let identification = parse_identification(&object_id, &description)?;

    let contact_name = source.get_property(snmpv2::MIB, snmpv2::SYS_CONTACT, snmpv2::SCALAR)?;
    let system_name = source.get_property(snmpv2::MIB, snmpv2::SYS_NAME, snmpv2::SCALAR)?;
    let location = source.get_property(snmpv2::MIB, snmpv2::SYS_LOCATION, snmpv2::SCALAR)?;

    info!(
        vendor = %identification.vendor,
        model = %identification.model,
        os_version = %identification.os_version,
        "Identified device"
    );

    ctx.tree.insert_root(RootDevice {
        name: ctx.resource_name.clone(),
        shell_type: Some(ctx.schema.shell_type()),
        vendor: identification.vendor,
        model: identification.model,
        os_version: identification.os_version,
        contact_name,
        system_name,
        location,
    })?;
    Ok(())
}

/// One chassis per distinct `jnxContentsChassisId` in the chassis container
pub fn build_chassis<S: SnmpSource>(ctx: &mut BuildContext<S>) -> Result<(), AutoloadError> {
    let contents = ctx.tables.contents()?;
    let groups = ctx.tables.content_groups()?;
    let root = ctx.tree.root_id().ok_or(TreeError::NoRoot)?;

    let mut built = 0;
    for index in groups.get(juniper::CONTAINER_CHASSIS) {
        let chassis_id = contents
            .value(index, juniper::CHASSIS_ID)
            .ok_or_else(|| AutoloadError::missing(juniper::CONTENTS_TABLE, juniper::CHASSIS_ID, index))?;
        if ctx.tree.find(NodeKind::Chassis, chassis_id).is_some() {
            continue;
        }
        let component = content_component(&contents, index)?;
        if attach_once(&mut ctx.tree, root, chassis_id.to_string(), Resource::Chassis(component))? {
            built += 1;
        }
    }

    info!(count = built, "Built chassis");
    Ok(())
}

/// Attach every row of `container` to the chassis named by its
/// `jnxContentsChassisId`, keyed by L1
fn build_chassis_members<S: SnmpSource>(
    ctx: &mut BuildContext<S>,
    container: &str,
    kind: NodeKind,
    make: fn(Component) -> Resource,
) -> Result<usize, AutoloadError> {
    let contents = ctx.tables.contents()?;
    let groups = ctx.tables.content_groups()?;
    let members = rows_in_container(&contents, groups.get(container));

    let by_chassis = group_by(&members, |index, values| {
        let chassis = values.get(juniper::CHASSIS_ID).cloned();
        if chassis.is_none() {
            warn!(kind = %kind, index = %index, "Dropping entry without chassis id");
        }
        chassis
    });

    let mut built = 0;
    for (chassis_id, children) in by_chassis.iter() {
        let Some(parent) = ctx.tree.find(NodeKind::Chassis, chassis_id) else {
            for index in children {
                warn!(kind = %kind, index = %index, chassis = %chassis_id, "Dropping orphan, chassis not found");
            }
            continue;
        };
        for index in children {
            let Some(slot) = ContentIndex::parse(index).map(|c| c.l1.to_string()) else {
                warn!(kind = %kind, index = %index, "Dropping entry with malformed index");
                continue;
            };
            let component = content_component(&contents, index)?;
            if attach_once(&mut ctx.tree, parent, slot, make(component))? {
                built += 1;
            }
        }
    }
    Ok(built)
}

pub fn build_power_modules<S: SnmpSource>(ctx: &mut BuildContext<S>) -> Result<(), AutoloadError> {
    let built = build_chassis_members(
        ctx,
        juniper::CONTAINER_POWER,
        NodeKind::PowerModule,
        Resource::PowerModule,
    )?;
    info!(count = built, "Built power modules");
    Ok(())
}

pub fn build_modules<S: SnmpSource>(ctx: &mut BuildContext<S>) -> Result<(), AutoloadError> {
    let built = build_chassis_members(ctx, juniper::CONTAINER_FPC, NodeKind::Module, Resource::Module)?;
    info!(count = built, "Built modules");
    Ok(())
}

/// PICs, grouped under the FPC named by their L1 index
pub fn build_sub_modules<S: SnmpSource>(ctx: &mut BuildContext<S>) -> Result<(), AutoloadError> {
    let contents = ctx.tables.contents()?;
    let groups = ctx.tables.content_groups()?;
    let members = rows_in_container(&contents, groups.get(juniper::CONTAINER_PIC));
    let by_module = group_by(&members, |index, _| {
        ContentIndex::parse(index).map(|c| c.l1.to_string())
    });

    let mut built = 0;
    for (module, children) in by_module.iter() {
        let Some(parent) = ctx.tree.find(NodeKind::Module, module) else {
            for index in children {
                warn!(kind = %NodeKind::SubModule, index = %index, module = %module, "Dropping orphan, module not found");
            }
            continue;
        };
        for index in children {
            let Some(key) = ContentIndex::parse(index).map(|c| c.sub_module_key()) else {
                continue;
            };
            let component = content_component(&contents, index)?;
            if attach_once(&mut ctx.tree, parent, key, Resource::SubModule(component))? {
                built += 1;
            }
        }
    }

    info!(count = built, "Built sub-modules");
    Ok(())
}
