//! # Netcafe CLI Library
//!
//! Command parsing and dispatch for the `netcafe` binary.
//!
//! ## Module Organization
//! ```text
//! netcafe_cli/
//! ├── lib.rs     ◄─── You are here (clap commands, dispatch, tracing)
//! ├── demo.rs    ◄─── Seeded end-to-end business day
//! └── error.rs   ◄─── CliError with stable codes
//! ```
//!
//! ## Commands
//! - `netcafe demo [--minutes N]` - seed a café and run a day of sessions
//! - `netcafe config show` - print the effective configuration
//! - `netcafe config init [--force]` - write the default `netcafe.toml`

pub mod demo;
pub mod error;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use netcafe_engine::EngineConfig;

use error::{CliError, ErrorCode};

#[derive(Debug, Parser)]
#[command(name = "netcafe", about = "Netcafe counter CLI", long_about = None)]
pub struct Cli {
    /// Path to netcafe.toml; the platform config directory when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Seed a café and run a scripted day of sessions
    Demo(demo::DemoArgs),
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration (file + NETCAFE_* overrides)
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Runs one parsed command.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Demo(args) => {
            let config = EngineConfig::load(cli.config)?;
            demo::run(config, args, cli.json).await
        }
        Commands::Config(ConfigCommand {
            command: ConfigSubcommand::Show,
        }) => show_config(cli.config, cli.json),
        Commands::Config(ConfigCommand {
            command: ConfigSubcommand::Init { force },
        }) => init_config(cli.config, force),
    }
}

fn show_config(path: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let config = EngineConfig::load(path)?;
    let rendered = if json {
        serde_json::to_string_pretty(&config)?
    } else {
        toml::to_string_pretty(&config)?
    };
    println!("{}", rendered);
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<(), CliError> {
    let path = path
        .or_else(EngineConfig::default_config_path)
        .ok_or_else(|| {
            CliError::new(ErrorCode::ConfigError, "Could not determine config directory")
        })?;

    if path.exists() && !force {
        return Err(CliError::new(
            ErrorCode::ConfigError,
            format!("{} already exists (use --force to overwrite)", path.display()),
        ));
    }

    EngineConfig::default().save(Some(path.clone()))?;
    info!(path = %path.display(), "Config written");
    println!("Wrote {}", path.display());
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=netcafe_engine=trace` - Trace the engine only
/// - Default: INFO, DEBUG for netcafe crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,netcafe=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
