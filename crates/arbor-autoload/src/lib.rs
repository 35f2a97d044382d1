//! Arbor Autoload - SNMP inventory discovery for Juniper devices
//!
//! A [`DiscoverySession`] validates the device OS and then runs a fixed
//! pipeline of build steps against a memoized view of the SNMP source:
//! - root device identification
//! - chassis, power modules, modules (FPC) and sub-modules (PIC)
//! - physical ports, aggregates and their addresses, link state and LLDP
//!   adjacency
//!
//! The finished tree is handed to a [`ReportBuilder`].

pub mod builder;
pub mod error;
pub mod lldp;
pub mod mibs;
pub mod ports;
pub mod report;
pub mod session;
pub mod tables;

#[cfg(test)]
mod testing;

pub use builder::{BuildContext, BuildStep, ContentIndex};
pub use error::AutoloadError;
pub use lldp::{LldpKeys, LldpNeighbor};
pub use report::{AttributeRecord, AutoloadDetails, AutoloadDetailsBuilder, ReportBuilder, ResourceRecord};
pub use session::{DiscoverySession, DiscoveryState, SessionOptions, Stage};
pub use tables::CachedTables;
