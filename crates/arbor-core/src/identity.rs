//! Device identification parsing
//!
//! Vendor and model come from `sysObjectID`, which resolves to something like
//! `JUNIPER-MIB::jnxProductNameMX960`. Older agents drop the `Name` part of the
//! marker, so a looser pattern is tried second. The OS version is the token
//! following `JUNOS ` in `sysDescr`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

static PRODUCT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<vendor>\w+)-\S*?jnxProductName(?P<model>\S+)").expect("valid regex")
});

static PRODUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<vendor>\w+)-\S*?jnxProduct(?P<model>\S+)").expect("valid regex")
});

static OS_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"JUNOS (?P<version>\S*?)(?:#/|\s|$)").expect("valid regex")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Malformed device identification '{object_id}': no jnxProduct marker found")]
    Malformed { object_id: String },
}

/// Structured identification of a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub vendor: String,
    pub model: String,
    pub os_version: String,
}

/// Parse vendor, model and OS version from the raw identification strings
pub fn parse_identification(
    object_id: &str,
    description: &str,
) -> Result<Identification, IdentityError> {
    let (vendor, model) = parse_vendor_model(object_id)?;
    Ok(Identification {
        vendor,
        model,
        os_version: parse_os_version(description).unwrap_or_default(),
    })
}

/// Extract (vendor, model) from an object identifier string
pub fn parse_vendor_model(object_id: &str) -> Result<(String, String), IdentityError> {
    let captures = PRODUCT_NAME
        .captures(object_id)
        .or_else(|| PRODUCT.captures(object_id))
        .ok_or_else(|| IdentityError::Malformed {
            object_id: object_id.to_string(),
        })?;

    Ok((
        title_case(&captures["vendor"]),
        captures["model"].to_string(),
    ))
}

/// Extract the JUNOS version token from a system description
pub fn parse_os_version(description: &str) -> Option<String> {
    OS_VERSION
        .captures(description)
        .map(|c| c["version"].to_string())
        .filter(|v| !v.is_empty())
}

/// Uppercase the first letter of every whitespace-separated word and
/// lowercase the rest
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
