//! Arbor Core - Core types for SNMP inventory discovery
//!
//! This crate provides the foundational types for the Arbor system:
//! - Indexed attribute tables as returned by an SNMP walk
//! - Container-index grouping of flat tables into parent/child sets
//! - Compute-once slots for memoized views
//! - Shell schema resolution (networking vs firewall)
//! - Device identification parsing
//! - The arena-backed resource tree handed to report builders

pub mod grouping;
pub mod identity;
pub mod memo;
pub mod resource;
pub mod schema;
pub mod table;

pub use grouping::{group_by, group_by_field, IndexGroups};
pub use identity::{parse_identification, Identification, IdentityError};
pub use memo::Memo;
pub use resource::{
    Component, Duplex, LogicalPort, NodeId, NodeKind, PhysicalPort, Resource, ResourceNode,
    ResourceTree, RootDevice, TreeError,
};
pub use schema::{PortAttribute, SchemaError, SchemaVariant, ShellType};
pub use table::{AttributeBag, SnmpTable, TableRow};
