//! Errors that abort a discovery session

use arbor_core::{IdentityError, SchemaError, TreeError};
use arbor_snmp::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutoloadError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Configuration error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Unsupported device: '{description}' does not match any of {supported:?}")]
    UnsupportedDevice {
        description: String,
        supported: Vec<String>,
    },
    #[error(transparent)]
    Identification(#[from] IdentityError),
    #[error("Remote query failed: {0}")]
    Query(#[from] QueryError),
    #[error("Missing {field} for {table} index {index}")]
    MissingAttribute {
        table: String,
        field: String,
        index: String,
    },
    #[error("Invalid resource tree: {0}")]
    Tree(#[from] TreeError),
}

impl AutoloadError {
    pub(crate) fn missing(table: &str, field: &str, index: &str) -> Self {
        Self::MissingAttribute {
            table: table.to_string(),
            field: field.to_string(),
            index: index.to_string(),
        }
    }

    /// Whether the failure is in the caller's configuration rather than the device
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Schema(_))
    }
}
