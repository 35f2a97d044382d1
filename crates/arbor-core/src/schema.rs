//! Shell schema resolution
//!
//! A device is autoloaded either under the networking schema (switches and
//! routers) or the firewall schema. The variant is chosen once, from the
//! shell-type label, and decides the resource family and which port
//! attributes may be published.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Labels accepted by the networking schema
pub const NETWORKING_SHELL_TYPES: &[&str] = &["Switch", "Router"];

/// Labels accepted by the firewall schema
pub const FIREWALL_SHELL_TYPES: &[&str] = &["Firewall"];

/// Platform prefix that may precede a shell-type label (e.g. "CS_Router")
const SHELL_TYPE_PREFIX: &str = "CS_";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unknown shell type '{0}': expected one of Switch, Router, Firewall")]
    UnknownShellType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShellType {
    Firewall,
    Switch,
    Router,
}

impl ShellType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Firewall => "Firewall",
            Self::Switch => "Switch",
            Self::Router => "Router",
        }
    }
}

impl fmt::Display for ShellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Port attributes a schema may publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortAttribute {
    MacAddress,
    Ipv4Address,
    Ipv6Address,
    Description,
    Bandwidth,
    Mtu,
    Duplex,
    AutoNegotiation,
    Adjacent,
}

impl PortAttribute {
    /// Attribute name as it appears in the autoload report
    pub fn name(&self) -> &'static str {
        match self {
            Self::MacAddress => "MAC Address",
            Self::Ipv4Address => "IPv4 Address",
            Self::Ipv6Address => "IPv6 Address",
            Self::Description => "Port Description",
            Self::Bandwidth => "Bandwidth",
            Self::Mtu => "MTU",
            Self::Duplex => "Duplex",
            Self::AutoNegotiation => "Auto Negotiation",
            Self::Adjacent => "Adjacent",
        }
    }
}

const NETWORKING_PORT_ATTRIBUTES: &[PortAttribute] = &[
    PortAttribute::MacAddress,
    PortAttribute::Ipv4Address,
    PortAttribute::Ipv6Address,
    PortAttribute::Description,
    PortAttribute::Bandwidth,
    PortAttribute::Mtu,
    PortAttribute::Duplex,
    PortAttribute::AutoNegotiation,
    PortAttribute::Adjacent,
];

const FIREWALL_PORT_ATTRIBUTES: &[PortAttribute] = &[
    PortAttribute::MacAddress,
    PortAttribute::Ipv4Address,
    PortAttribute::Ipv6Address,
    PortAttribute::Description,
    PortAttribute::Bandwidth,
    PortAttribute::Mtu,
    PortAttribute::Duplex,
    PortAttribute::AutoNegotiation,
];

/// Schema governing a discovery session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schema", rename_all = "lowercase")]
pub enum SchemaVariant {
    Networking { shell_type: ShellType },
    Firewall,
}

impl SchemaVariant {
    /// Resolve a shell-type label against the two schema label sets
    pub fn resolve(label: &str) -> Result<Self, SchemaError> {
        let bare = label.strip_prefix(SHELL_TYPE_PREFIX).unwrap_or(label);

        if NETWORKING_SHELL_TYPES.contains(&bare) {
            let shell_type = if bare == "Switch" {
                ShellType::Switch
            } else {
                ShellType::Router
            };
            return Ok(Self::Networking { shell_type });
        }
        if FIREWALL_SHELL_TYPES.contains(&bare) {
            return Ok(Self::Firewall);
        }
        Err(SchemaError::UnknownShellType(label.to_string()))
    }

    pub fn shell_type(&self) -> ShellType {
        match self {
            Self::Networking { shell_type } => *shell_type,
            Self::Firewall => ShellType::Firewall,
        }
    }

    /// Resource family of the root device (e.g. "CS_Router")
    pub fn family(&self) -> String {
        format!("{}{}", SHELL_TYPE_PREFIX, self.shell_type())
    }

    /// Model name of the root resource
    pub fn root_model(&self) -> &'static str {
        match self {
            Self::Networking { .. } => "GenericNetworkingResource",
            Self::Firewall => "GenericFirewallResource",
        }
    }

    /// Port attributes legal under this schema
    pub fn port_attributes(&self) -> &'static [PortAttribute] {
        match self {
            Self::Networking { .. } => NETWORKING_PORT_ATTRIBUTES,
            Self::Firewall => FIREWALL_PORT_ATTRIBUTES,
        }
    }

    pub fn allows(&self, attribute: PortAttribute) -> bool {
        self.port_attributes().contains(&attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_networking_labels() {
        for label in ["Switch", "Router", "CS_Switch", "CS_Router"] {
            let variant = SchemaVariant::resolve(label).unwrap();
            assert!(matches!(variant, SchemaVariant::Networking { .. }), "{label}");
        }
        assert_eq!(
            SchemaVariant::resolve("CS_Router").unwrap().shell_type(),
            ShellType::Router
        );
    }

    #[test]
    fn test_resolve_firewall_labels() {
        assert_eq!(SchemaVariant::resolve("Firewall").unwrap(), SchemaVariant::Firewall);
        assert_eq!(SchemaVariant::resolve("CS_Firewall").unwrap(), SchemaVariant::Firewall);
    }

    #[test]
    fn test_resolve_unknown_label() {
        for label in ["", "switch", "Loadbalancer", "CS_", "Router "] {
            assert_eq!(
                SchemaVariant::resolve(label),
                Err(SchemaError::UnknownShellType(label.to_string()))
            );
        }
    }

    #[test]
    fn test_firewall_omits_adjacent() {
        let firewall = SchemaVariant::Firewall;
        let router = SchemaVariant::resolve("Router").unwrap();
        assert!(!firewall.allows(PortAttribute::Adjacent));
        assert!(router.allows(PortAttribute::Adjacent));
        assert!(firewall.allows(PortAttribute::Duplex));
        assert_eq!(router.family(), "CS_Router");
        assert_eq!(firewall.family(), "CS_Firewall");
    }
}
