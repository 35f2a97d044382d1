//! Resource tree for a discovered device
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`]. Parent/child
//! edges are stored as ids, and every node is also reachable through its
//! `(kind, index)` key, so placing a component under its container is a
//! lookup rather than a pointer chase.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::schema::ShellType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Root device already exists")]
    RootExists,
    #[error("Root device has not been built")]
    NoRoot,
    #[error("Unknown parent node {0:?}")]
    UnknownParent(NodeId),
    #[error("Duplicate {kind} index {index}")]
    DuplicateIndex { kind: NodeKind, index: String },
}

/// Arena slot of a resource node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Chassis,
    PowerModule,
    Module,
    SubModule,
    PhysicalPort,
    LogicalPort,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::Chassis => "chassis",
            Self::PowerModule => "power module",
            Self::Module => "module",
            Self::SubModule => "sub-module",
            Self::PhysicalPort => "physical port",
            Self::LogicalPort => "logical port",
        };
        write!(f, "{}", name)
    }
}

/// The device itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootDevice {
    /// Resource name assigned by the caller
    pub name: String,
    pub shell_type: Option<ShellType>,
    pub vendor: String,
    pub model: String,
    pub os_version: String,
    pub contact_name: String,
    pub system_name: String,
    pub location: String,
}

/// Hardware component attributes shared by chassis, power modules, modules
/// and sub-modules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub model: String,
    pub serial_number: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Port duplex state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duplex {
    Full,
    Half,
    Unknown,
}

impl Duplex {
    /// Map an `EtherLike-MIB::dot3StatsDuplexStatus` value
    pub fn from_snmp(value: &str) -> Self {
        match value.trim() {
            "fullDuplex" | "3" => Self::Full,
            "halfDuplex" | "2" => Self::Half,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::Half => "Half",
            Self::Unknown => "Unknown",
        }
    }
}

/// A physical interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalPort {
    pub name: String,
    pub description: String,
    pub mac_address: String,
    pub mtu: u32,
    /// Speed in Mbps
    pub bandwidth: u64,
    pub ipv4_addresses: Vec<String>,
    pub ipv6_addresses: Vec<String>,
    pub duplex: Option<Duplex>,
    pub auto_negotiation: Option<bool>,
    /// LLDP neighbor, "<system> through <port>"
    pub adjacent: Option<String>,
}

/// A link aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalPort {
    pub name: String,
    pub description: String,
    pub ipv4_addresses: Vec<String>,
    pub ipv6_addresses: Vec<String>,
    /// Names of member physical ports
    pub associated_ports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
    Root(RootDevice),
    Chassis(Component),
    PowerModule(Component),
    Module(Component),
    SubModule(Component),
    PhysicalPort(PhysicalPort),
    LogicalPort(LogicalPort),
}

impl Resource {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Root(_) => NodeKind::Root,
            Self::Chassis(_) => NodeKind::Chassis,
            Self::PowerModule(_) => NodeKind::PowerModule,
            Self::Module(_) => NodeKind::Module,
            Self::SubModule(_) => NodeKind::SubModule,
            Self::PhysicalPort(_) => NodeKind::PhysicalPort,
            Self::LogicalPort(_) => NodeKind::LogicalPort,
        }
    }

    /// Hardware attributes, for component kinds
    pub fn component(&self) -> Option<&Component> {
        match self {
            Self::Chassis(c) | Self::PowerModule(c) | Self::Module(c) | Self::SubModule(c) => {
                Some(c)
            }
            _ => None,
        }
    }
}

/// A node in the resource tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: NodeId,
    /// Index of this node within its kind (chassis id, slot, ifIndex, ...)
    pub index: String,
    pub resource: Resource,
    /// Non-owning lookup key of the container
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl ResourceNode {
    pub fn kind(&self) -> NodeKind {
        self.resource.kind()
    }
}

/// Inventory tree of a single device
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceTree {
    nodes: Vec<ResourceNode>,
    #[serde(skip)]
    by_key: HashMap<(NodeKind, String), NodeId>,
}

impl ResourceTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the root node. Must be the first insertion.
    pub fn insert_root(&mut self, root: RootDevice) -> Result<NodeId, TreeError> {
        if self.root_id().is_some() {
            return Err(TreeError::RootExists);
        }
        Ok(self.push(String::new(), Resource::Root(root), None))
    }

    /// Create a node under `parent`
    pub fn attach(
        &mut self,
        parent: NodeId,
        index: impl Into<String>,
        resource: Resource,
    ) -> Result<NodeId, TreeError> {
        let index = index.into();
        if parent.0 >= self.nodes.len() {
            return Err(TreeError::UnknownParent(parent));
        }
        let kind = resource.kind();
        if kind == NodeKind::Root {
            return Err(TreeError::RootExists);
        }
        if self.by_key.contains_key(&(kind, index.clone())) {
            return Err(TreeError::DuplicateIndex { kind, index });
        }

        let id = self.push(index, resource, Some(parent));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    fn push(&mut self, index: String, resource: Resource, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.by_key.insert((resource.kind(), index.clone()), id);
        self.nodes.push(ResourceNode {
            id,
            index,
            resource,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Look up a node by kind and index
    pub fn find(&self, kind: NodeKind, index: &str) -> Option<NodeId> {
        self.by_key.get(&(kind, index.to_string())).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ResourceNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.nodes.first().map(|node| node.id)
    }

    /// Get the root device
    pub fn root(&self) -> Option<&RootDevice> {
        match self.nodes.first().map(|node| &node.resource) {
            Some(Resource::Root(root)) => Some(root),
            _ => None,
        }
    }

    /// Get children of a node
    pub fn children(&self, id: NodeId) -> Vec<&ResourceNode> {
        self.nodes
            .get(id.0)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| self.nodes.get(child.0))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nodes of one kind, in creation order
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter().filter(move |node| node.kind() == kind)
    }

    /// Index path from the root down to `id` (root excluded)
    pub fn ancestry(&self, id: NodeId) -> Vec<&ResourceNode> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(id.0);
        while let Some(node) = current {
            if node.kind() == NodeKind::Root {
                break;
            }
            path.push(node);
            current = node.parent.and_then(|p| self.nodes.get(p.0));
        }
        path.reverse();
        path
    }

    /// Depth-first, pre-order traversal with node depth (root = 0)
    pub fn walk(&self) -> Vec<(usize, &ResourceNode)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, NodeId)> = self.root_id().map(|r| (0, r)).into_iter().collect();
        while let Some((depth, id)) = stack.pop() {
            if let Some(node) = self.nodes.get(id.0) {
                out.push((depth, node));
                for child in node.children.iter().rev() {
                    stack.push((depth + 1, *child));
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes per kind
    pub fn counts(&self) -> HashMap<NodeKind, usize> {
        let mut counts = HashMap::new();
        for node in &self.nodes {
            *counts.entry(node.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Human-readable outline of the tree
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (depth, node) in self.walk() {
            let label = match &node.resource {
                Resource::Root(root) => format!(
                    "{} {} {} (JUNOS {})",
                    root.name, root.vendor, root.model, root.os_version
                ),
                Resource::PhysicalPort(port) => format!("port {} [{}]", port.name, node.index),
                Resource::LogicalPort(port) => {
                    format!("aggregate {} [{}]", port.name, node.index)
                }
                other => format!(
                    "{} {} {}",
                    node.kind(),
                    node.index,
                    other.component().map(|c| c.model.as_str()).unwrap_or_default()
                ),
            };
            out.push_str(&"  ".repeat(depth));
            out.push_str(label.trim_end());
            out.push('\n');
        }
        out
    }
}
