//! The SNMP source trait and its error type

use arbor_core::SnmpTable;
use regex::Regex;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("No value for {mib}::{field}.{index}")]
    NoSuchValue {
        mib: String,
        field: String,
        index: String,
    },
    #[error("Error response for {target}: {response}")]
    ErrorResponse { target: String, response: String },
    #[error("MIB {0} is not loaded")]
    MibNotLoaded(String),
    #[error("Failed to load MIB {name}: {reason}")]
    MibLoad { name: String, reason: String },
    #[error("Invalid error pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A remote management-information source
///
/// All calls block. Setup calls (`update_mib_sources`, `load_mib`,
/// `set_snmp_errors`) are made once, before the first query.
pub trait SnmpSource {
    /// Register the directory compiled MIB definitions are loaded from
    fn update_mib_sources(&mut self, path: &Path) -> Result<(), QueryError>;

    /// Load a MIB module by name
    fn load_mib(&mut self, name: &str) -> Result<(), QueryError>;

    /// Register response patterns that must be treated as errors
    fn set_snmp_errors(&mut self, patterns: &[&str]) -> Result<(), QueryError>;

    /// Point lookup of a scalar attribute
    fn get_property(&mut self, mib: &str, field: &str, index: &str) -> Result<String, QueryError>;

    /// Bulk retrieval of a table or column. May be empty, never partial.
    fn walk(&mut self, mib: &str, table: &str) -> Result<SnmpTable, QueryError>;
}

impl<S: SnmpSource + ?Sized> SnmpSource for &mut S {
    fn update_mib_sources(&mut self, path: &Path) -> Result<(), QueryError> {
        (**self).update_mib_sources(path)
    }

    fn load_mib(&mut self, name: &str) -> Result<(), QueryError> {
        (**self).load_mib(name)
    }

    fn set_snmp_errors(&mut self, patterns: &[&str]) -> Result<(), QueryError> {
        (**self).set_snmp_errors(patterns)
    }

    fn get_property(&mut self, mib: &str, field: &str, index: &str) -> Result<String, QueryError> {
        (**self).get_property(mib, field, index)
    }

    fn walk(&mut self, mib: &str, table: &str) -> Result<SnmpTable, QueryError> {
        (**self).walk(mib, table)
    }
}

impl<S: SnmpSource + ?Sized> SnmpSource for Box<S> {
    fn update_mib_sources(&mut self, path: &Path) -> Result<(), QueryError> {
        (**self).update_mib_sources(path)
    }

    fn load_mib(&mut self, name: &str) -> Result<(), QueryError> {
        (**self).load_mib(name)
    }

    fn set_snmp_errors(&mut self, patterns: &[&str]) -> Result<(), QueryError> {
        (**self).set_snmp_errors(patterns)
    }

    fn get_property(&mut self, mib: &str, field: &str, index: &str) -> Result<String, QueryError> {
        (**self).get_property(mib, field, index)
    }

    fn walk(&mut self, mib: &str, table: &str) -> Result<SnmpTable, QueryError> {
        (**self).walk(mib, table)
    }
}

/// Compiled set of response patterns that classify a value as an error
#[derive(Debug, Clone, Default)]
pub struct ErrorPatterns {
    patterns: Vec<Regex>,
}

impl ErrorPatterns {
    pub fn compile(patterns: &[&str]) -> Result<Self, QueryError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| QueryError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_error(&self, response: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(response))
    }

    /// Pass `response` through, or fail if it matches a registered pattern
    pub fn check(&self, target: &str, response: String) -> Result<String, QueryError> {
        if self.is_error(&response) {
            return Err(QueryError::ErrorResponse {
                target: target.to_string(),
                response,
            });
        }
        Ok(response)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
