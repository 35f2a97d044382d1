//! MIB modules, tables and columns queried during autoload

/// MIB modules loaded when a session is constructed, in load order
pub const REQUIRED_MIBS: &[&str] = &[
    juniper::MIB,
    juniper_if::MIB,
    if_mib::MIB,
    "JUNIPER-CHASSIS-DEFINES-MIB",
    lag::MIB,
    etherlike::MIB,
    ip::IPV4_MIB,
    ip::IPV6_MIB,
    lldp::MIB,
    mau::MIB,
];

/// Agent responses that are errors rather than values
pub const SNMP_ERRORS: &[&str] = &[
    r"No\s+Such\s+Object\s+currently\s+exists",
    r"No\s+Such\s+Instance\s+currently\s+exists",
];

/// Default directory of compiled MIB definitions
pub const DEFAULT_MIB_PATH: &str = "mibs";

pub mod snmpv2 {
    pub const MIB: &str = "SNMPv2-MIB";
    pub const SYS_OBJECT_ID: &str = "sysObjectID";
    pub const SYS_DESCR: &str = "sysDescr";
    pub const SYS_CONTACT: &str = "sysContact";
    pub const SYS_NAME: &str = "sysName";
    pub const SYS_LOCATION: &str = "sysLocation";
    /// Instance index of scalar objects
    pub const SCALAR: &str = "0";
}

pub mod juniper {
    pub const MIB: &str = "JUNIPER-MIB";
    pub const CONTENTS_TABLE: &str = "jnxContentsTable";
    pub const CONTAINER_INDEX: &str = "jnxContentsContainerIndex";
    pub const CHASSIS_ID: &str = "jnxContentsChassisId";
    pub const MODEL: &str = "jnxContentsModel";
    pub const TYPE: &str = "jnxContentsType";
    pub const DESCR: &str = "jnxContentsDescr";
    pub const SERIAL_NO: &str = "jnxContentsSerialNo";
    pub const REVISION: &str = "jnxContentsRevision";

    /// Container types of `jnxContainersTable`
    pub const CONTAINER_CHASSIS: &str = "1";
    pub const CONTAINER_POWER: &str = "2";
    pub const CONTAINER_FPC: &str = "7";
    pub const CONTAINER_PIC: &str = "8";
}

pub mod juniper_if {
    pub const MIB: &str = "JUNIPER-IF-MIB";
    pub const CHASSIS_TABLE: &str = "ifChassisTable";
    pub const FPC: &str = "ifChassisFpc";
    pub const PIC: &str = "ifChassisPic";
    pub const PORT: &str = "ifChassisPort";
    pub const LOGICAL_UNIT: &str = "ifChassisLogicalUnit";
}

pub mod if_mib {
    pub const MIB: &str = "IF-MIB";
    pub const IF_TABLE: &str = "ifTable";
    pub const IFX_TABLE: &str = "ifXTable";
    pub const IF_DESCR: &str = "ifDescr";
    pub const IF_TYPE: &str = "ifType";
    pub const IF_MTU: &str = "ifMtu";
    pub const IF_SPEED: &str = "ifSpeed";
    pub const IF_PHYS_ADDRESS: &str = "ifPhysAddress";
    pub const IF_ALIAS: &str = "ifAlias";
    pub const IF_HIGH_SPEED: &str = "ifHighSpeed";

    pub const TYPE_ETHERNET: &[&str] = &["ethernetCsmacd", "6"];
    pub const TYPE_LAG: &[&str] = &["ieee8023adLag", "161"];
}

pub mod ip {
    pub const IPV4_MIB: &str = "IP-MIB";
    pub const IPV4_TABLE: &str = "ipAddrTable";
    pub const IPV4_ADDR: &str = "ipAdEntAddr";
    pub const IPV6_MIB: &str = "IPV6-MIB";
    pub const IPV6_TABLE: &str = "ipv6AddrEntry";
    pub const IPV6_ADDR: &str = "ipv6AddrAddress";
    /// Owning interface column; both address tables are sorted and matched on it
    pub const IF_INDEX: &str = "ipAdEntIfIndex";
}

pub mod etherlike {
    pub const MIB: &str = "EtherLike-MIB";
    pub const DUPLEX_STATUS: &str = "dot3StatsDuplexStatus";
}

pub mod mau {
    pub const MIB: &str = "MAU-MIB";
    pub const AUTONEG_ADMIN_STATUS: &str = "ifMauAutoNegAdminStatus";
}

pub mod lag {
    pub const MIB: &str = "IEEE8023-LAG-MIB";
    pub const ATTACHED_AGG_ID: &str = "dot3adAggPortAttachedAggID";
}

pub mod lldp {
    pub const MIB: &str = "LLDP-MIB";
    pub const REM_PORT_ID: &str = "lldpRemPortId";
    pub const REM_SYS_NAME: &str = "lldpRemSysName";
    pub const REM_PORT_DESC: &str = "lldpRemPortDesc";
}
