//! Container-index grouping
//!
//! Inverts a flat `child index -> attribute bag` table into
//! `container index -> [child index]`, keeping children in the order they
//! were walked.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::table::{AttributeBag, SnmpTable};

/// Child indexes grouped by the container that declared them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexGroups {
    groups: BTreeMap<String, Vec<String>>,
}

impl IndexGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Children declared under `container`, in walk order
    pub fn get(&self, container: &str) -> &[String] {
        self.groups
            .get(container)
            .map(|children| children.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, container: &str) -> bool {
        self.groups.contains_key(container)
    }

    /// All containers with their children
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(container, children)| (container.as_str(), children.as_slice()))
    }

    /// Number of distinct containers
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn push(&mut self, container: String, child: &str) {
        self.groups
            .entry(container)
            .or_default()
            .push(child.to_string());
    }
}

impl<K, V> FromIterator<(K, V)> for IndexGroups
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            groups: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }
}

/// Group rows by a container key computed from each row.
///
/// Rows for which `key` returns `None` belong to no container and are skipped.
pub fn group_by<F>(table: &SnmpTable, mut key: F) -> IndexGroups
where
    F: FnMut(&str, &AttributeBag) -> Option<String>,
{
    let mut groups = IndexGroups::new();
    for (index, values) in table.iter() {
        if let Some(container) = key(index, values) {
            groups.push(container, index);
        }
    }
    groups
}

/// Group rows by the value of their `field` column
pub fn group_by_field(table: &SnmpTable, field: &str) -> IndexGroups {
    group_by(table, |_, values| values.get(field).cloned())
}
