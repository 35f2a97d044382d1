//! Indexed attribute tables as returned by an SNMP walk

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Column name -> value for a single table row
pub type AttributeBag = BTreeMap<String, String>;

/// A single row of a walked table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row index (e.g. "7.1.0.0" for a Juniper contents entry)
    pub index: String,
    /// Column values for this row
    pub values: AttributeBag,
}

/// An indexed table that preserves the order in which rows were walked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpTable {
    rows: Vec<TableRow>,
}

impl SnmpTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Insert a row, replacing an existing row with the same index in place
    pub fn insert(&mut self, index: impl Into<String>, values: AttributeBag) {
        let index = index.into();
        match self.rows.iter_mut().find(|row| row.index == index) {
            Some(row) => row.values = values,
            None => self.rows.push(TableRow { index, values }),
        }
    }

    /// Get the attribute bag for an index
    pub fn get(&self, index: &str) -> Option<&AttributeBag> {
        self.rows
            .iter()
            .find(|row| row.index == index)
            .map(|row| &row.values)
    }

    /// Get a single cell
    pub fn value(&self, index: &str, field: &str) -> Option<&str> {
        self.get(index)
            .and_then(|values| values.get(field))
            .map(|v| v.as_str())
    }

    /// Row indexes in walk order
    pub fn indexes(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.index.as_str())
    }

    /// Rows in walk order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeBag)> {
        self.rows
            .iter()
            .map(|row| (row.index.as_str(), &row.values))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return the table with rows stably sorted by the value of `field`.
    ///
    /// Numeric values sort numerically and before non-numeric ones; rows
    /// missing the field go last.
    pub fn sorted_by_field(mut self, field: &str) -> Self {
        self.rows.sort_by(|a, b| {
            compare_cells(
                a.values.get(field).map(|s| s.as_str()),
                b.values.get(field).map(|s| s.as_str()),
            )
        });
        self
    }
}

fn compare_cells(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl FromIterator<(String, AttributeBag)> for SnmpTable {
    fn from_iter<T: IntoIterator<Item = (String, AttributeBag)>>(iter: T) -> Self {
        let mut table = SnmpTable::new();
        for (index, values) in iter {
            table.insert(index, values);
        }
        table
    }
}

/// Build an attribute bag from string pairs
pub fn bag<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> AttributeBag {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
