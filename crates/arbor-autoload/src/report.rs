//! Turning the finished tree into an autoload report

use arbor_core::{
    Component, NodeKind, PortAttribute, Resource, ResourceNode, ResourceTree, RootDevice,
    SchemaVariant, ShellType,
};
use serde::{Deserialize, Serialize};

/// Consumes the finished resource tree exactly once
pub trait ReportBuilder {
    type Output;

    fn build(&self, tree: ResourceTree) -> Self::Output;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub relative_address: String,
    pub model: String,
    pub name: String,
    pub unique_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// Empty for attributes of the root device
    pub relative_address: String,
    pub name: String,
    pub value: String,
}

/// Flat resource and attribute listing of a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoloadDetails {
    pub resources: Vec<ResourceRecord>,
    pub attributes: Vec<AttributeRecord>,
}

impl AutoloadDetails {
    pub fn resource(&self, relative_address: &str) -> Option<&ResourceRecord> {
        self.resources
            .iter()
            .find(|r| r.relative_address == relative_address)
    }

    pub fn attribute(&self, relative_address: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.relative_address == relative_address && a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Builds [`AutoloadDetails`], publishing only attributes the device's
/// schema allows
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoloadDetailsBuilder;

fn schema_of(root: &RootDevice) -> SchemaVariant {
    match root.shell_type {
        Some(ShellType::Firewall) => SchemaVariant::Firewall,
        Some(shell_type) => SchemaVariant::Networking { shell_type },
        None => SchemaVariant::Networking {
            shell_type: ShellType::Router,
        },
    }
}

fn generic_model(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Root => "",
        NodeKind::Chassis => "GenericChassis",
        NodeKind::PowerModule => "GenericPowerPort",
        NodeKind::Module => "GenericModule",
        NodeKind::SubModule => "GenericSubModule",
        NodeKind::PhysicalPort => "GenericPort",
        NodeKind::LogicalPort => "GenericPortChannel",
    }
}

/// Address segment of one node
fn segment(node: &ResourceNode) -> String {
    let index = node.index.as_str();
    match node.kind() {
        NodeKind::Root => String::new(),
        NodeKind::Chassis => format!("CH{}", index),
        NodeKind::PowerModule => format!("PP{}", index),
        NodeKind::Module => format!("M{}", index),
        NodeKind::SubModule => format!("SM{}", index.rsplit('.').next().unwrap_or(index)),
        NodeKind::PhysicalPort => format!("P{}", index),
        NodeKind::LogicalPort => format!("PC{}", index),
    }
}

/// `CH1/M1/SM2/P513` style address of a node
pub fn relative_address(tree: &ResourceTree, node: &ResourceNode) -> String {
    tree.ancestry(node.id)
        .iter()
        .map(|n| segment(n))
        .collect::<Vec<_>>()
        .join("/")
}

fn resource_name(node: &ResourceNode) -> String {
    match &node.resource {
        Resource::Root(root) => root.name.clone(),
        Resource::Chassis(_) => format!("Chassis {}", node.index),
        Resource::PowerModule(_) => format!("PP{}", node.index),
        Resource::Module(_) => format!("Module {}", node.index),
        Resource::SubModule(_) => format!("SubModule {}", node.index),
        Resource::PhysicalPort(port) => port.name.replace('/', "-"),
        Resource::LogicalPort(port) => port.name.clone(),
    }
}

struct Attributes<'a> {
    address: &'a str,
    out: &'a mut Vec<AttributeRecord>,
}

impl Attributes<'_> {
    fn push(&mut self, name: &str, value: impl Into<String>) {
        self.out.push(AttributeRecord {
            relative_address: self.address.to_string(),
            name: name.to_string(),
            value: value.into(),
        });
    }
}

fn component_attributes(attrs: &mut Attributes<'_>, kind: NodeKind, component: &Component) {
    attrs.push("Model", component.model.as_str());
    attrs.push("Serial Number", component.serial_number.as_str());
    if kind == NodeKind::PowerModule {
        if let Some(description) = &component.description {
            attrs.push(PortAttribute::Description.name(), description.as_str());
        }
    }
    if let Some(version) = &component.version {
        attrs.push("Version", version.as_str());
    }
}

fn bool_value(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl ReportBuilder for AutoloadDetailsBuilder {
    type Output = AutoloadDetails;

    fn build(&self, tree: ResourceTree) -> AutoloadDetails {
        let mut details = AutoloadDetails::default();
        let Some(root) = tree.root() else {
            return details;
        };
        let schema = schema_of(root);
        let family = schema.family();

        for (_, node) in tree.walk() {
            let address = relative_address(&tree, node);
            if node.kind() != NodeKind::Root {
                details.resources.push(ResourceRecord {
                    relative_address: address.clone(),
                    model: format!("{}.{}", family, generic_model(node.kind())),
                    name: resource_name(node),
                    unique_id: format!("{}.{}", root.name, address),
                });
            }

            let mut attrs = Attributes {
                address: &address,
                out: &mut details.attributes,
            };
            match &node.resource {
                Resource::Root(root) => {
                    attrs.push("Vendor", root.vendor.as_str());
                    attrs.push("Model", root.model.as_str());
                    attrs.push("OS Version", root.os_version.as_str());
                    attrs.push("Contact Name", root.contact_name.as_str());
                    attrs.push("System Name", root.system_name.as_str());
                    attrs.push("Location", root.location.as_str());
                }
                Resource::Chassis(c)
                | Resource::PowerModule(c)
                | Resource::Module(c)
                | Resource::SubModule(c) => component_attributes(&mut attrs, node.kind(), c),
                Resource::PhysicalPort(port) => {
                    for attribute in schema.port_attributes() {
                        let value = match attribute {
                            PortAttribute::MacAddress => Some(port.mac_address.clone()),
                            PortAttribute::Ipv4Address => Some(port.ipv4_addresses.join(",")),
                            PortAttribute::Ipv6Address => Some(port.ipv6_addresses.join(",")),
                            PortAttribute::Description => Some(port.description.clone()),
                            PortAttribute::Bandwidth => Some(port.bandwidth.to_string()),
                            PortAttribute::Mtu => Some(port.mtu.to_string()),
                            PortAttribute::Duplex => port.duplex.map(|d| d.as_str().to_string()),
                            PortAttribute::AutoNegotiation => {
                                port.auto_negotiation.map(|a| bool_value(a).to_string())
                            }
                            PortAttribute::Adjacent => port.adjacent.clone(),
                        };
                        if let Some(value) = value {
                            attrs.push(attribute.name(), value);
                        }
                    }
                }
                Resource::LogicalPort(port) => {
                    attrs.push(PortAttribute::Description.name(), port.description.as_str());
                    attrs.push(PortAttribute::Ipv4Address.name(), port.ipv4_addresses.join(","));
                    attrs.push(PortAttribute::Ipv6Address.name(), port.ipv6_addresses.join(","));
                    attrs.push("Associated Ports", port.associated_ports.join(","));
                }
            }
        }
        details
    }
}
