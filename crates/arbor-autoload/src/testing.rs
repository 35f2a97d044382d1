//! In-memory SNMP source that records every call

use arbor_core::table::bag;
use arbor_core::SnmpTable;
use arbor_snmp::{ErrorPatterns, QueryError, SnmpSource};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::mibs::{
    etherlike, if_mib, ip, juniper, juniper_if, lag, lldp, mau, snmpv2,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    UpdateMibSources(PathBuf),
    LoadMib(String),
    SetSnmpErrors(usize),
    Get(String, String, String),
    Walk(String, String),
}

#[derive(Debug, Default)]
pub struct FakeSource {
    properties: HashMap<(String, String, String), String>,
    tables: HashMap<(String, String), SnmpTable>,
    errors: ErrorPatterns,
    pub calls: Vec<Call>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, mib: &str, field: &str, index: &str, value: &str) -> Self {
        self.properties.insert(
            (mib.to_string(), field.to_string(), index.to_string()),
            value.to_string(),
        );
        self
    }

    pub fn with_table(mut self, mib: &str, table: &str, rows: &[(&str, &[(&str, &str)])]) -> Self {
        let table_rows = rows
            .iter()
            .map(|(index, values)| (index.to_string(), bag(values.iter().copied())))
            .collect();
        self.tables
            .insert((mib.to_string(), table.to_string()), table_rows);
        self
    }

    pub fn walk_count(&self, mib: &str, table: &str) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Walk(m, t) if m == mib && t == table))
            .count()
    }

    pub fn walked(&self, mib: &str) -> bool {
        self.calls
            .iter()
            .any(|call| matches!(call, Call::Walk(m, _) if m == mib))
    }

    pub fn get_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Get(..)))
            .count()
    }

    pub fn query_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Get(..) | Call::Walk(..)))
            .count()
    }
}

impl SnmpSource for FakeSource {
    fn update_mib_sources(&mut self, path: &Path) -> Result<(), QueryError> {
        self.calls.push(Call::UpdateMibSources(path.to_path_buf()));
        Ok(())
    }

    fn load_mib(&mut self, name: &str) -> Result<(), QueryError> {
        self.calls.push(Call::LoadMib(name.to_string()));
        Ok(())
    }

    fn set_snmp_errors(&mut self, patterns: &[&str]) -> Result<(), QueryError> {
        self.calls.push(Call::SetSnmpErrors(patterns.len()));
        self.errors = ErrorPatterns::compile(patterns)?;
        Ok(())
    }

    fn get_property(&mut self, mib: &str, field: &str, index: &str) -> Result<String, QueryError> {
        self.calls.push(Call::Get(
            mib.to_string(),
            field.to_string(),
            index.to_string(),
        ));
        let value = self
            .properties
            .get(&(mib.to_string(), field.to_string(), index.to_string()))
            .cloned()
            .ok_or_else(|| QueryError::NoSuchValue {
                mib: mib.to_string(),
                field: field.to_string(),
                index: index.to_string(),
            })?;
        self.errors.check(&format!("{}::{}.{}", mib, field, index), value)
    }

    fn walk(&mut self, mib: &str, table: &str) -> Result<SnmpTable, QueryError> {
        self.calls.push(Call::Walk(mib.to_string(), table.to_string()));
        Ok(self
            .tables
            .get(&(mib.to_string(), table.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

pub const MX_DESCRIPTION: &str =
    "Juniper Networks, Inc. mx960 internet router, kernel JUNOS 12.1R6.5 #0: 2013-04-25 built by builder";

/// A small MX960: one chassis, two PEMs, two FPCs with three PICs, five
/// ethernet ports, one aggregate and a few unit interfaces. FPC 9, PIC 5/1
/// and port 517 have no container and must be dropped.
///
/// `ifChassisFpc`, `ifChassisPic` and the contents L1/L2 indexes count from
/// 1 while interface names count from 0, so `xe-0/0/0` sits on FPC 1 PIC 1.
pub fn mx960() -> FakeSource {
    FakeSource::new()
        .with_property(snmpv2::MIB, snmpv2::SYS_OBJECT_ID, "0", "JUNIPER-MIB::jnxProductNameMX960")
        .with_property(snmpv2::MIB, snmpv2::SYS_DESCR, "0", MX_DESCRIPTION)
        .with_property(snmpv2::MIB, snmpv2::SYS_CONTACT, "0", "noc@example.net")
        .with_property(snmpv2::MIB, snmpv2::SYS_NAME, "0", "mx-lab")
        .with_property(snmpv2::MIB, snmpv2::SYS_LOCATION, "0", "rack 12")
        .with_table(
            juniper::MIB,
            juniper::CONTENTS_TABLE,
            &[
                ("1.1.0.0", &[
                    (juniper::CONTAINER_INDEX, "1"),
                    (juniper::CHASSIS_ID, "1"),
                    (juniper::MODEL, "CHAS-BP-MX960-S"),
                    (juniper::DESCR, "MX960"),
                    (juniper::SERIAL_NO, "JN11A"),
                ]),
                ("2.1.0.0", &[
                    (juniper::CONTAINER_INDEX, "2"),
                    (juniper::CHASSIS_ID, "1"),
                    (juniper::MODEL, "PWR-MX960-AC-S"),
                    (juniper::DESCR, "PEM 0"),
                    (juniper::SERIAL_NO, "QCS1"),
                    (juniper::REVISION, "REV 03"),
                ]),
                ("2.2.0.0", &[
                    (juniper::CONTAINER_INDEX, "2"),
                    (juniper::CHASSIS_ID, "1"),
                    (juniper::MODEL, ""),
                    (juniper::TYPE, "JUNIPER-CHASSIS-DEFINES-MIB::jnxMX960PEM"),
                    (juniper::DESCR, "PEM 1"),
                    (juniper::SERIAL_NO, "QCS2"),
                ]),
                ("4.1.0.0", &[
                    (juniper::CONTAINER_INDEX, "4"),
                    (juniper::CHASSIS_ID, "1"),
                    (juniper::MODEL, "FFANTRAY-MX960-HC-S"),
                ]),
                ("7.1.0.0", &[
                    (juniper::CONTAINER_INDEX, "7"),
                    (juniper::CHASSIS_ID, "1"),
                    (juniper::MODEL, "MPC-3D-16XGE-SFPP"),
                    (juniper::SERIAL_NO, "CAAB1"),
                    (juniper::REVISION, "REV 26"),
                ]),
                ("7.2.0.0", &[
                    (juniper::CONTAINER_INDEX, "7"),
                    (juniper::CHASSIS_ID, "1"),
                    (juniper::MODEL, "MPC7E-MRATE"),
                    (juniper::SERIAL_NO, "CAAB2"),
                ]),
                ("7.9.0.0", &[
                    (juniper::CONTAINER_INDEX, "7"),
                    (juniper::CHASSIS_ID, "9"),
                    (juniper::MODEL, "MPC-GHOST"),
                    (juniper::SERIAL_NO, "CAAB9"),
                ]),
                ("8.1.1.0", &[
                    (juniper::CONTAINER_INDEX, "8"),
                    (juniper::CHASSIS_ID, "1"),
                    (juniper::MODEL, "4x 10GE(LAN) SFP+"),
                    (juniper::SERIAL_NO, "BUILTIN"),
                ]),
                ("8.1.2.0", &[
                    (juniper::CONTAINER_INDEX, "8"),
                    (juniper::CHASSIS_ID, "1"),
                    (juniper::MODEL, "4x 10GE(LAN) SFP+"),
                    (juniper::SERIAL_NO, "BUILTIN"),
                ]),
                ("8.2.1.0", &[
                    (juniper::CONTAINER_INDEX, "8"),
                    (juniper::CHASSIS_ID, "1"),
                    (juniper::MODEL, "MRATE-12xQSFPP-XGE-XLGE-CGE"),
                    (juniper::SERIAL_NO, "BUILTIN"),
                ]),
                ("8.5.1.0", &[
                    (juniper::CONTAINER_INDEX, "8"),
                    (juniper::CHASSIS_ID, "1"),
                    (juniper::MODEL, "PIC-GHOST"),
                    (juniper::SERIAL_NO, "BUILTIN"),
                ]),
            ],
        )
        .with_table(
            juniper_if::MIB,
            juniper_if::CHASSIS_TABLE,
            &[
                ("513", &[(juniper_if::FPC, "1"), (juniper_if::PIC, "1"), (juniper_if::PORT, "0")]),
                ("514", &[(juniper_if::FPC, "1"), (juniper_if::PIC, "1"), (juniper_if::PORT, "1")]),
                ("515", &[(juniper_if::FPC, "1"), (juniper_if::PIC, "2"), (juniper_if::PORT, "0")]),
                ("516", &[(juniper_if::FPC, "2"), (juniper_if::PIC, "9"), (juniper_if::PORT, "0")]),
                ("517", &[(juniper_if::FPC, "6"), (juniper_if::PIC, "1"), (juniper_if::PORT, "0")]),
                ("600", &[(juniper_if::FPC, "0"), (juniper_if::PIC, "0")]),
                ("601", &[(juniper_if::FPC, "1"), (juniper_if::PIC, "1"), (juniper_if::LOGICAL_UNIT, "0")]),
                ("602", &[(juniper_if::LOGICAL_UNIT, "0")]),
                ("700", &[]),
            ],
        )
        .with_table(
            if_mib::MIB,
            if_mib::IF_TABLE,
            &[
                ("513", &[
                    (if_mib::IF_DESCR, "xe-0/0/0"),
                    (if_mib::IF_TYPE, "ethernetCsmacd"),
                    (if_mib::IF_MTU, "1514"),
                    (if_mib::IF_SPEED, "4294967295"),
                    (if_mib::IF_PHYS_ADDRESS, "00:1f:12:aa:00:01"),
                ]),
                ("514", &[
                    (if_mib::IF_DESCR, "xe-0/0/1"),
                    (if_mib::IF_TYPE, "ethernetCsmacd"),
                    (if_mib::IF_MTU, "9192"),
                    (if_mib::IF_SPEED, "4294967295"),
                    (if_mib::IF_PHYS_ADDRESS, "00:1f:12:aa:00:02"),
                ]),
                ("515", &[
                    (if_mib::IF_DESCR, "xe-0/1/0"),
                    (if_mib::IF_TYPE, "6"),
                    (if_mib::IF_MTU, "1514"),
                    (if_mib::IF_SPEED, "1000000000"),
                    (if_mib::IF_PHYS_ADDRESS, "00:1f:12:aa:00:03"),
                ]),
                ("516", &[
                    (if_mib::IF_DESCR, "et-1/8/0"),
                    (if_mib::IF_TYPE, "ethernetCsmacd"),
                    (if_mib::IF_MTU, "1514"),
                    (if_mib::IF_PHYS_ADDRESS, "00:1f:12:aa:01:00"),
                ]),
                ("517", &[
                    (if_mib::IF_DESCR, "xe-5/0/0"),
                    (if_mib::IF_TYPE, "ethernetCsmacd"),
                ]),
                ("600", &[
                    (if_mib::IF_DESCR, "ae0"),
                    (if_mib::IF_TYPE, "ieee8023adLag"),
                    (if_mib::IF_MTU, "1514"),
                ]),
                ("601", &[
                    (if_mib::IF_DESCR, "xe-0/0/0.0"),
                    (if_mib::IF_TYPE, "propVirtual"),
                ]),
                ("602", &[
                    (if_mib::IF_DESCR, "ae0.0"),
                    (if_mib::IF_TYPE, "propVirtual"),
                ]),
                ("700", &[
                    (if_mib::IF_DESCR, "lo0"),
                    (if_mib::IF_TYPE, "softwareLoopback"),
                ]),
            ],
        )
        .with_table(
            if_mib::MIB,
            if_mib::IFX_TABLE,
            &[
                ("513", &[(if_mib::IF_ALIAS, "to core-sw1"), (if_mib::IF_HIGH_SPEED, "10000")]),
                ("514", &[(if_mib::IF_ALIAS, ""), (if_mib::IF_HIGH_SPEED, "10000")]),
                ("516", &[(if_mib::IF_HIGH_SPEED, "100000")]),
                ("600", &[(if_mib::IF_ALIAS, "uplink bundle"), (if_mib::IF_HIGH_SPEED, "20000")]),
            ],
        )
        .with_table(
            ip::IPV4_MIB,
            ip::IPV4_TABLE,
            &[
                ("10.1.1.1", &[(ip::IPV4_ADDR, "10.1.1.1"), (ip::IF_INDEX, "602")]),
                ("192.168.1.1", &[(ip::IPV4_ADDR, "192.168.1.1"), (ip::IF_INDEX, "514")]),
                ("10.0.0.1", &[(ip::IPV4_ADDR, "10.0.0.1"), (ip::IF_INDEX, "601")]),
                ("127.0.0.1", &[(ip::IPV4_ADDR, "127.0.0.1"), (ip::IF_INDEX, "700")]),
            ],
        )
        .with_table(
            ip::IPV6_MIB,
            ip::IPV6_TABLE,
            &[
                ("700.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.1", &[("ipv6AddrPfxLength", "128")]),
                ("601.32.1.13.184.0.0.0.0.0.0.0.0.0.0.0.1", &[("ipv6AddrPfxLength", "64")]),
            ],
        )
        .with_table(
            etherlike::MIB,
            etherlike::DUPLEX_STATUS,
            &[
                ("513", &[(etherlike::DUPLEX_STATUS, "fullDuplex")]),
                ("514", &[(etherlike::DUPLEX_STATUS, "halfDuplex")]),
                ("515", &[(etherlike::DUPLEX_STATUS, "unknown")]),
            ],
        )
        .with_table(
            mau::MIB,
            mau::AUTONEG_ADMIN_STATUS,
            &[
                ("513.1", &[(mau::AUTONEG_ADMIN_STATUS, "enabled")]),
                ("514.1", &[(mau::AUTONEG_ADMIN_STATUS, "disabled")]),
            ],
        )
        .with_table(
            lag::MIB,
            lag::ATTACHED_AGG_ID,
            &[
                ("513", &[(lag::ATTACHED_AGG_ID, "600")]),
                ("514", &[(lag::ATTACHED_AGG_ID, "600")]),
                ("515", &[(lag::ATTACHED_AGG_ID, "0")]),
            ],
        )
        .with_table(
            lldp::MIB,
            lldp::REM_PORT_ID,
            &[("0.513.1", &[(lldp::REM_PORT_ID, "xe-0/0/5")])],
        )
        .with_property(lldp::MIB, lldp::REM_SYS_NAME, "0.513.1", "core-sw1")
        .with_property(lldp::MIB, lldp::REM_PORT_DESC, "0.513.1", "uplink to mx")
}
