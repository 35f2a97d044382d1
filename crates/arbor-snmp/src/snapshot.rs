//! Snapshot-backed SNMP source
//!
//! A snapshot is a JSON dump of the scalars and tables a device exposes:
//!
//! ```json
//! {
//!   "mibs": ["IF-MIB", "JUNIPER-MIB"],
//!   "properties": { "SNMPv2-MIB::sysName": { "0": "mx-lab" } },
//!   "tables": {
//!     "IF-MIB::ifTable": [ { "index": "513", "ifDescr": "ge-0/0/0", "ifMtu": 1514 } ]
//!   }
//! }
//! ```
//!
//! Walking a name that is not a recorded table yields that column from the
//! MIB's tables, and a property lookup falls back to table cells, mirroring
//! how an agent answers GET and GETNEXT for columnar objects.

use arbor_core::{AttributeBag, SnmpTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::source::{ErrorPatterns, QueryError, SnmpSource};

/// A single recorded table row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub index: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl SnapshotRow {
    fn bag(&self) -> AttributeBag {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), cell_to_string(v)))
            .collect()
    }

    fn cell(&self, field: &str) -> Option<String> {
        self.values.get(field).map(cell_to_string)
    }
}

fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Recorded device state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// MIB modules the agent supports. When absent, every MIB loads.
    #[serde(default)]
    pub mibs: Option<Vec<String>>,
    /// `"MIB::object"` -> index -> value
    #[serde(default)]
    pub properties: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
    /// `"MIB::table"` -> rows in walk order
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<SnapshotRow>>,
}

impl Snapshot {
    /// Load a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, QueryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a snapshot from a JSON string
    pub fn from_json(content: &str) -> Result<Self, QueryError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// MIBs every agent implements; always loaded
const BUILTIN_MIBS: &[&str] = &["SNMPv2-MIB"];

fn qualified(mib: &str, name: &str) -> String {
    format!("{}::{}", mib, name)
}

/// SNMP source that answers from a [`Snapshot`]
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: Snapshot,
    mib_sources: Option<PathBuf>,
    loaded_mibs: Vec<String>,
    errors: ErrorPatterns,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            mib_sources: None,
            loaded_mibs: Vec::new(),
            errors: ErrorPatterns::default(),
        }
    }

    /// Load from a JSON snapshot file
    pub fn from_file(path: &Path) -> Result<Self, QueryError> {
        let snapshot = Snapshot::from_file(path)?;
        debug!(
            path = %path.display(),
            tables = snapshot.tables.len(),
            "Loaded SNMP snapshot"
        );
        Ok(Self::new(snapshot))
    }

    pub fn loaded_mibs(&self) -> &[String] {
        &self.loaded_mibs
    }

    pub fn mib_sources(&self) -> Option<&Path> {
        self.mib_sources.as_deref()
    }

    fn ensure_loaded(&self, mib: &str) -> Result<(), QueryError> {
        if BUILTIN_MIBS.contains(&mib) || self.loaded_mibs.iter().any(|m| m == mib) {
            Ok(())
        } else {
            Err(QueryError::MibNotLoaded(mib.to_string()))
        }
    }

    /// Rows of every table in `mib` that carry `column`, reduced to that column
    fn walk_column(&self, mib: &str, column: &str) -> Vec<(String, AttributeBag)> {
        let prefix = qualified(mib, "");
        self.snapshot
            .tables
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .flat_map(|(_, rows)| rows.iter())
            .filter_map(|row| {
                row.cell(column).map(|value| {
                    let mut values = AttributeBag::new();
                    values.insert(column.to_string(), value);
                    (row.index.clone(), values)
                })
            })
            .collect()
    }

    fn lookup(&self, mib: &str, field: &str, index: &str) -> Option<String> {
        if let Some(value) = self
            .snapshot
            .properties
            .get(&qualified(mib, field))
            .and_then(|by_index| by_index.get(index))
        {
            return Some(cell_to_string(value));
        }

        let prefix = qualified(mib, "");
        self.snapshot
            .tables
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .flat_map(|(_, rows)| rows.iter())
            .find(|row| row.index == index)
            .and_then(|row| row.cell(field))
    }
}

impl SnmpSource for SnapshotSource {
    fn update_mib_sources(&mut self, path: &Path) -> Result<(), QueryError> {
        debug!(path = %path.display(), "MIB source registered");
        self.mib_sources = Some(path.to_path_buf());
        Ok(())
    }

    fn load_mib(&mut self, name: &str) -> Result<(), QueryError> {
        if let Some(available) = &self.snapshot.mibs {
            if !BUILTIN_MIBS.contains(&name) && !available.iter().any(|m| m == name) {
                return Err(QueryError::MibLoad {
                    name: name.to_string(),
                    reason: "not supported by the recorded agent".to_string(),
                });
            }
        }
        if !self.loaded_mibs.iter().any(|m| m == name) {
            self.loaded_mibs.push(name.to_string());
        }
        trace!(mib = name, "MIB loaded");
        Ok(())
    }

    fn set_snmp_errors(&mut self, patterns: &[&str]) -> Result<(), QueryError> {
        self.errors = ErrorPatterns::compile(patterns)?;
        Ok(())
    }

    fn get_property(&mut self, mib: &str, field: &str, index: &str) -> Result<String, QueryError> {
        self.ensure_loaded(mib)?;
        let target = format!("{}.{}", qualified(mib, field), index);
        let value = self
            .lookup(mib, field, index)
            .ok_or_else(|| QueryError::NoSuchValue {
                mib: mib.to_string(),
                field: field.to_string(),
                index: index.to_string(),
            })?;
        trace!(target = %target, value = %value, "get");
        self.errors.check(&target, value)
    }

    fn walk(&mut self, mib: &str, table: &str) -> Result<SnmpTable, QueryError> {
        self.ensure_loaded(mib)?;
        let target = qualified(mib, table);

        let rows: Vec<(String, AttributeBag)> = match self.snapshot.tables.get(&target) {
            Some(rows) => rows.iter().map(|row| (row.index.clone(), row.bag())).collect(),
            None => self.walk_column(mib, table),
        };

        for (index, values) in &rows {
            for value in values.values() {
                if self.errors.is_error(value) {
                    return Err(QueryError::ErrorResponse {
                        target: format!("{}.{}", target, index),
                        response: value.clone(),
                    });
                }
            }
        }

        debug!(target = %target, rows = rows.len(), "walk");
        Ok(rows.into_iter().collect())
    }
}
