//! Arbor SNMP - The remote-query seam used by discovery sessions
//!
//! Discovery only ever talks to a device through [`SnmpSource`]: point
//! lookups, table walks, and the one-time MIB/error-pattern setup. This crate
//! also provides [`SnapshotSource`], which answers those calls from a recorded
//! JSON dump of a device's MIB tables.

pub mod snapshot;
pub mod source;

pub use snapshot::{Snapshot, SnapshotRow, SnapshotSource};
pub use source::{ErrorPatterns, QueryError, SnmpSource};
