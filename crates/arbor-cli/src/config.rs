//! Configuration loading

use anyhow::Result;
use arbor_autoload::mibs::DEFAULT_MIB_PATH;
use arbor_autoload::SessionOptions;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub snmp: SnmpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Name given to the root resource
    #[serde(default = "default_resource_name")]
    pub resource_name: String,
    /// Switch, Router or Firewall
    #[serde(default = "default_shell_type")]
    pub shell_type: String,
    /// Patterns matched case-insensitively against sysDescr
    #[serde(default = "default_supported_os")]
    pub supported_os: Vec<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            resource_name: default_resource_name(),
            shell_type: default_shell_type(),
            supported_os: default_supported_os(),
        }
    }
}

fn default_resource_name() -> String {
    "juniper-device".to_string()
}

fn default_shell_type() -> String {
    "Router".to_string()
}

fn default_supported_os() -> Vec<String> {
    vec!["JUNOS".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnmpConfig {
    /// JSON snapshot the device is answered from
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    /// Directory of compiled MIB definitions
    #[serde(default = "default_mib_path")]
    pub mib_path: PathBuf,
}

impl Default for SnmpConfig {
    fn default() -> Self {
        Self {
            snapshot: None,
            mib_path: default_mib_path(),
        }
    }
}

fn default_mib_path() -> PathBuf {
    PathBuf::from(DEFAULT_MIB_PATH)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Resource and attribute records
    #[default]
    Json,
    /// Indented tree outline
    Summary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Session settings for the autoload engine
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            resource_name: self.device.resource_name.clone(),
            shell_type: self.device.shell_type.clone(),
            mib_path: self.snmp.mib_path.clone(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let config = Config {
        snmp: SnmpConfig {
            snapshot: Some(PathBuf::from("device.json")),
            ..Default::default()
        },
        ..Default::default()
    };

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)?;
    Ok(())
}
