//! mpm-merge - Multipart scene merger
//!
//! Runs as a Stash plugin task: reads the host's JSON document from stdin,
//! merges scenes whose files are split parts of one recording, and writes a
//! single JSON result to stdout. Logs go to stderr.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mpm_common::config::{load_toml_config, resolve_config_path, TomlConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mpm_merge::config::MergeConfig;
use mpm_merge::models::{PluginInput, PluginOutput};
use mpm_merge::services::{ExecutionStrategy, StashClient};
use mpm_merge::{workflow, MergeError};

/// Command-line arguments for mpm-merge
#[derive(Parser, Debug)]
#[command(name = "mpm-merge")]
#[command(about = "Merge multi-part scenes into single scenes")]
#[command(version)]
struct Args {
    /// Read plugin input from this file instead of stdin
    #[arg(short, long, env = "MPM_INPUT")]
    input: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "MPM_CONFIG")]
    config: Option<PathBuf>,

    /// Trace the merge calls without performing them
    #[arg(long, env = "MPM_DRY_RUN")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = match resolve_config_path(args.config.as_deref()) {
        Some(path) => load_toml_config(&path),
        None => Ok(TomlConfig::default()),
    };
    let level = toml_config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize tracing (stderr only; stdout carries the plugin result)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mpm_merge={level},mpm_common={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let toml_config = match toml_config {
        Ok(config) => config,
        Err(e) => fail(MergeError::from(e)),
    };

    let input = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open plugin input {}", path.display()))?;
            PluginInput::from_reader(BufReader::new(file))
        }
        None => PluginInput::from_reader(io::stdin().lock()),
    };

    let mut config = MergeConfig::resolve(&input, &toml_config);
    if args.dry_run {
        config.strategy = ExecutionStrategy::Trace;
    }

    let client = match StashClient::new(&config) {
        Ok(client) => client,
        Err(e) => fail(e),
    };

    match workflow::run(&config, &client, &client).await {
        Ok(report) => {
            println!("{}", PluginOutput::success(report).to_json());
            Ok(())
        }
        Err(e) => fail(e),
    }
}

/// Report a fatal error to the host and exit
fn fail(err: MergeError) -> ! {
    let message = match &err {
        MergeError::Http(_) | MergeError::Connection(_) => err.to_string(),
        _ => format!("Error: {}", err),
    };
    error!("{}", message);
    println!("{}", PluginOutput::failure(&message).to_json());
    std::process::exit(err.exit_code());
}
