//! Arbor - Main entry point
//!
//! Runs one autoload session against a recorded SNMP snapshot and prints the
//! discovered inventory.

mod config;

use anyhow::{Context, Result};
use arbor_autoload::{AutoloadDetailsBuilder, DiscoverySession, ReportBuilder};
use arbor_core::ResourceTree;
use arbor_snmp::SnapshotSource;
use clap::Parser;
use config::OutputFormat;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(about = "Juniper SNMP inventory autoload")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "arbor.toml")]
    config: PathBuf,

    /// SNMP snapshot to answer queries from
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Shell type (Switch, Router, Firewall)
    #[arg(long)]
    shell_type: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write a default configuration file and exit
    #[arg(long)]
    init: bool,
}

/// Indented outline of the tree
struct SummaryReport;

impl ReportBuilder for SummaryReport {
    type Output = String;

    fn build(&self, tree: ResourceTree) -> String {
        tree.summary()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Arbor v{}", env!("CARGO_PKG_VERSION"));

    if args.init {
        config::save_default_config(&args.config)
            .with_context(|| format!("Failed to write {}", args.config.display()))?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    // Load configuration
    let mut config = config::load_config(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    if let Some(snapshot) = args.snapshot {
        config.snmp.snapshot = Some(snapshot);
    }
    if let Some(shell_type) = args.shell_type {
        config.device.shell_type = shell_type;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }

    let snapshot = config
        .snmp
        .snapshot
        .clone()
        .context("No SNMP snapshot configured; pass --snapshot or set [snmp] snapshot")?;

    info!(
        resource = %config.device.resource_name,
        shell_type = %config.device.shell_type,
        snapshot = %snapshot.display(),
        "Configuration loaded"
    );

    let source = SnapshotSource::from_file(&snapshot)
        .with_context(|| format!("Failed to load snapshot {}", snapshot.display()))?;
    let session = DiscoverySession::new(source, &config.session_options())
        .context("Failed to start autoload session")?;
    let supported_os = &config.device.supported_os;

    match config.output.format {
        OutputFormat::Json => {
            let details = session
                .discover(supported_os, &AutoloadDetailsBuilder)
                .context("Autoload failed")?;
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        OutputFormat::Summary => {
            let summary = session
                .discover(supported_os, &SummaryReport)
                .context("Autoload failed")?;
            print!("{}", summary);
        }
    }

    Ok(())
}
