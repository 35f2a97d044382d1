//! Discovery session: setup, OS validation and the build pipeline
//!
//! A session moves forward through [`DiscoveryState`] one stage at a time.
//! Any failure aborts the session and the partial tree is discarded.

use arbor_core::SchemaVariant;
use arbor_snmp::SnmpSource;
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::builder::{
    build_chassis, build_modules, build_power_modules, build_root, build_sub_modules,
    BuildContext, BuildStep,
};
use crate::error::AutoloadError;
use crate::mibs::{DEFAULT_MIB_PATH, REQUIRED_MIBS, SNMP_ERRORS};
use crate::ports::build_ports;
use crate::report::ReportBuilder;
use crate::tables::CachedTables;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryState {
    Initialized,
    OsValidated,
    RootBuilt,
    ChassisBuilt,
    PowerModulesBuilt,
    ModulesBuilt,
    SubModulesBuilt,
    PortsBuilt,
    Reported,
}

impl DiscoveryState {
    /// The only state this one may move to
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Initialized => Some(Self::OsValidated),
            Self::OsValidated => Some(Self::RootBuilt),
            Self::RootBuilt => Some(Self::ChassisBuilt),
            Self::ChassisBuilt => Some(Self::PowerModulesBuilt),
            Self::PowerModulesBuilt => Some(Self::ModulesBuilt),
            Self::ModulesBuilt => Some(Self::SubModulesBuilt),
            Self::SubModulesBuilt => Some(Self::PortsBuilt),
            Self::PortsBuilt => Some(Self::Reported),
            Self::Reported => None,
        }
    }
}

impl fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Caller-supplied session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Name given to the root resource
    pub resource_name: String,
    /// Switch, Router or Firewall, optionally `CS_` prefixed
    pub shell_type: String,
    /// Directory of compiled MIB definitions
    pub mib_path: PathBuf,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            resource_name: String::new(),
            shell_type: "Router".to_string(),
            mib_path: PathBuf::from(DEFAULT_MIB_PATH),
        }
    }
}

/// One step of the build pipeline and the state it reaches
pub struct Stage<S> {
    pub name: &'static str,
    pub reached: DiscoveryState,
    pub run: BuildStep<S>,
}

/// Build steps in execution order
pub fn stages<S: SnmpSource>() -> [Stage<S>; 6] {
    [
        Stage {
            name: "root",
            reached: DiscoveryState::RootBuilt,
            run: build_root,
        },
        Stage {
            name: "chassis",
            reached: DiscoveryState::ChassisBuilt,
            run: build_chassis,
        },
        Stage {
            name: "power modules",
            reached: DiscoveryState::PowerModulesBuilt,
            run: build_power_modules,
        },
        Stage {
            name: "modules",
            reached: DiscoveryState::ModulesBuilt,
            run: build_modules,
        },
        Stage {
            name: "sub-modules",
            reached: DiscoveryState::SubModulesBuilt,
            run: build_sub_modules,
        },
        Stage {
            name: "ports",
            reached: DiscoveryState::PortsBuilt,
            run: build_ports,
        },
    ]
}

/// Compile supported-OS patterns for case-insensitive search
pub fn compile_supported_os(patterns: &[String]) -> Result<Vec<Regex>, AutoloadError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    AutoloadError::Configuration(format!(
                        "invalid supported OS pattern '{}': {}",
                        pattern, e
                    ))
                })
        })
        .collect()
}

/// A single autoload run against one device
pub struct DiscoverySession<S> {
    id: Uuid,
    state: DiscoveryState,
    started_at: DateTime<Utc>,
    ctx: BuildContext<S>,
}

impl<S: SnmpSource> DiscoverySession<S> {
    /// Resolve the schema, then prepare the source. An unknown shell type
    /// fails before the source is touched.
    pub fn new(mut source: S, options: &SessionOptions) -> Result<Self, AutoloadError> {
        let schema = SchemaVariant::resolve(&options.shell_type)?;

        source.update_mib_sources(&options.mib_path)?;
        for mib in REQUIRED_MIBS {
            source.load_mib(mib)?;
        }
        source.set_snmp_errors(SNMP_ERRORS)?;

        let id = Uuid::new_v4();
        info!(
            session = %id,
            resource = %options.resource_name,
            shell_type = %schema.shell_type(),
            "Autoload session created"
        );

        Ok(Self {
            id,
            state: DiscoveryState::Initialized,
            started_at: Utc::now(),
            ctx: BuildContext::new(schema, options.resource_name.clone(), CachedTables::new(source)),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    pub fn schema(&self) -> SchemaVariant {
        self.ctx.schema
    }

    fn advance(&mut self, to: DiscoveryState) {
        debug_assert_eq!(self.state.next(), Some(to));
        debug!(from = %self.state, to = %to, "State transition");
        self.state = to;
    }

    /// The device must describe itself with a supported OS
    fn validate_os(&mut self, supported_os: &[String]) -> Result<(), AutoloadError> {
        let patterns = compile_supported_os(supported_os)?;
        let description = self.ctx.tables.system_description()?;

        if !patterns.iter().any(|p| p.is_match(&description)) {
            return Err(AutoloadError::UnsupportedDevice {
                description: description.to_string(),
                supported: supported_os.to_vec(),
            });
        }
        self.advance(DiscoveryState::OsValidated);
        Ok(())
    }

    fn run(&mut self, supported_os: &[String]) -> Result<(), AutoloadError> {
        self.validate_os(supported_os)?;
        for stage in stages::<S>() {
            debug!(stage = stage.name, "Running build step");
            (stage.run)(&mut self.ctx)?;
            self.advance(stage.reached);
        }
        Ok(())
    }

    /// Validate the device OS, build the full tree and hand it to `report`
    pub fn discover<R: ReportBuilder>(
        mut self,
        supported_os: &[String],
        report: &R,
    ) -> Result<R::Output, AutoloadError> {
        let span = info_span!("autoload", session = %self.id);
        let _enter = span.enter();

        self.run(supported_os)?;

        let elapsed = Utc::now() - self.started_at;
        info!(
            nodes = self.ctx.tree.len(),
            elapsed_ms = elapsed.num_milliseconds(),
            "Autoload complete\n{}",
            self.ctx.tree.summary()
        );
        self.advance(DiscoveryState::Reported);
        Ok(report.build(self.ctx.tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mibs::juniper;
    use crate::report::AutoloadDetailsBuilder;
    use crate::testing::{mx960, Call, FakeSource};
    use arbor_core::{NodeKind, ShellType};
    use arbor_snmp::{Snapshot, SnapshotSource};
    use std::collections::HashMap;

    fn options(shell_type: &str) -> SessionOptions {
        SessionOptions {
            resource_name: "mx-lab".to_string(),
            shell_type: shell_type.to_string(),
            mib_path: PathBuf::from("/opt/mibs"),
        }
    }

    fn supported(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_states_move_forward_only() {
        let mut state = DiscoveryState::Initialized;
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            assert!(next > state);
            visited.push(next);
            state = next;
        }
        assert_eq!(visited.len(), 9);
        assert_eq!(state, DiscoveryState::Reported);

        let reached: Vec<_> = stages::<FakeSource>().iter().map(|s| s.reached).collect();
        assert_eq!(reached, visited[2..8].to_vec());
    }

    #[test]
    fn test_unknown_shell_type_touches_nothing() {
        let mut source = FakeSource::new();
        let err = DiscoverySession::new(&mut source, &options("Toaster"))
            .err()
            .unwrap();
        assert!(err.is_configuration());
        assert!(source.calls.is_empty());
    }

    #[test]
    fn test_construction_prepares_source() {
        let mut source = FakeSource::new();
        let session = DiscoverySession::new(&mut source, &options("CS_Firewall")).unwrap();
        assert_eq!(session.schema(), SchemaVariant::Firewall);
        assert_eq!(session.state(), DiscoveryState::Initialized);
        drop(session);

        let mut expected = vec![Call::UpdateMibSources(PathBuf::from("/opt/mibs"))];
        expected.extend(REQUIRED_MIBS.iter().map(|m| Call::LoadMib(m.to_string())));
        expected.push(Call::SetSnmpErrors(2));
        assert_eq!(source.calls, expected);
    }

    #[test]
    fn test_unsupported_os_runs_no_build_step() {
        let mut source = mx960();
        let session = DiscoverySession::new(&mut source, &options("Router")).unwrap();
        let err = session
            .discover(&supported(&["IOS", "NX-OS"]), &AutoloadDetailsBuilder)
            .unwrap_err();

        assert!(matches!(err, AutoloadError::UnsupportedDevice { .. }));
        assert_eq!(source.query_count(), 1);
        assert!(source.calls.iter().all(|c| !matches!(c, Call::Walk(..))));
    }

    #[test]
    fn test_empty_supported_set_rejects() {
        let mut source = mx960();
        let session = DiscoverySession::new(&mut source, &options("Router")).unwrap();
        let err = session.discover(&[], &AutoloadDetailsBuilder).unwrap_err();
        assert!(matches!(err, AutoloadError::UnsupportedDevice { .. }));
    }

    #[test]
    fn test_invalid_supported_pattern() {
        let session = DiscoverySession::new(mx960(), &options("Router")).unwrap();
        let err = session
            .discover(&supported(&["JUNOS("]), &AutoloadDetailsBuilder)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_pipeline_reaches_ports_built() {
        let mut session = DiscoverySession::new(mx960(), &options("Switch")).unwrap();
        session.run(&supported(&["junos"])).unwrap();

        assert_eq!(session.state(), DiscoveryState::PortsBuilt);
        let root = session.ctx.tree.root().unwrap();
        assert_eq!(root.shell_type, Some(ShellType::Switch));
        assert_eq!(session.ctx.tree.nodes_of(NodeKind::PhysicalPort).count(), 4);
    }

    #[test]
    fn test_discover_end_to_end() {
        let mut source = mx960();
        let session = DiscoverySession::new(&mut source, &options("Router")).unwrap();
        let details = session
            .discover(&supported(&["JUNOS"]), &AutoloadDetailsBuilder)
            .unwrap();

        assert_eq!(details.resources.len(), 13);
        assert_eq!(details.attribute("", "Model"), Some("MX960"));
        assert_eq!(details.attribute("CH1/M1/SM1/P513", "IPv4 Address"), Some("10.0.0.1"));

        let mut walks: HashMap<(String, String), usize> = HashMap::new();
        for call in &source.calls {
            if let Call::Walk(mib, table) = call {
                *walks.entry((mib.clone(), table.clone())).or_insert(0) += 1;
            }
        }
        assert!(walks.values().all(|count| *count == 1));
        assert_eq!(walks.len(), 10);
    }

    #[test]
    fn test_discover_from_snapshot() {
        let snapshot = Snapshot::from_json(include_str!("../../../demos/mx960.json")).unwrap();
        let session =
            DiscoverySession::new(SnapshotSource::new(snapshot), &options("CS_Router")).unwrap();
        let details = session
            .discover(&supported(&["JUNOS"]), &AutoloadDetailsBuilder)
            .unwrap();

        assert_eq!(details.resources.len(), 13);
        assert_eq!(details.attribute("", "OS Version"), Some("18.4R2.7"));
        assert_eq!(details.attribute("CH1/PP2", "Model"), Some("jnxMX960PEM"));

        let port = "CH1/M1/SM1/P513";
        assert_eq!(details.attribute(port, "IPv4 Address"), Some("10.10.0.1"));
        assert_eq!(details.attribute(port, "IPv6 Address"), Some("2001:db8::1"));
        assert_eq!(details.attribute(port, "Duplex"), Some("Full"));
        assert_eq!(
            details.attribute(port, "Adjacent"),
            Some("core-sw1 through to mx-lab et-0/0/0")
        );
        assert_eq!(details.attribute("CH1/M2/SM2/P516", "Auto Negotiation"), Some("False"));
        assert_eq!(details.attribute("PC600", "IPv4 Address"), Some("10.20.0.1"));
        assert_eq!(details.attribute("PC600", "Associated Ports"), Some("et-0/0/0,et-0/0/1"));
    }

    #[test]
    fn test_failure_aborts_without_report() {
        let source = mx960().with_table(
            juniper::MIB,
            juniper::CONTENTS_TABLE,
            &[("1.1.0.0", &[(juniper::CONTAINER_INDEX, "1"), (juniper::MODEL, "MX960")])],
        );
        let session = DiscoverySession::new(source, &options("Router")).unwrap();
        let err = session
            .discover(&supported(&["JUNOS"]), &AutoloadDetailsBuilder)
            .unwrap_err();
        assert!(matches!(err, AutoloadError::MissingAttribute { .. }));
    }
}
