//! Binary entry point for content-import.
//!
//! Imports `.content` and `.xml` resources from files, archives and URLs.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{OutputFormat, cmd_check, cmd_config, cmd_import};
use content_importer::config::ImporterConfig;
use content_importer::observability;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Environment variable naming the configuration file.
const CONFIG_PATH_ENV: &str = "CONTENT_IMPORT_CONFIG_PATH";

/// content-import - Imports .content and .xml resources into a content store.
#[derive(Parser)]
#[command(name = "content-import")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Import resources.
    Import {
        /// Files, `jar:`/`zip:` archive entries or http(s) URLs.
        #[arg(required = true)]
        locations: Vec<String>,

        /// Import in no particular order instead of argument order.
        #[arg(long)]
        unordered: bool,

        /// Summary format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Do not print per-resource messages.
        #[arg(long)]
        no_console: bool,

        /// Spool XML batches into this directory instead of the configured importer.
        #[arg(long)]
        spool_dir: Option<PathBuf>,
    },

    /// Check whether resources can be imported.
    Check {
        /// Files, `jar:`/`zip:` archive entries or http(s) URLs.
        #[arg(required = true)]
        locations: Vec<String>,
    },

    /// Manage configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config.with_env_overrides(),
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: ImporterConfig) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Import {
            locations,
            unordered,
            format,
            no_console,
            spool_dir,
        } => {
            let config = match spool_dir {
                Some(dir) => config.with_spool_dir(dir),
                None => config,
            };
            cmd_import(&config, &locations, unordered, format, no_console)
        },

        Commands::Check { locations } => cmd_check(&config, &locations),

        Commands::Config { show } => cmd_config(&config, show),
    }
}

/// Loads configuration.
fn load_config(path: Option<&Path>) -> anyhow::Result<ImporterConfig> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return ImporterConfig::load_from_file(config_path)
            .with_context(|| format!("config file {}", config_path.display()));
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        if !config_path.trim().is_empty() {
            return ImporterConfig::load_from_file(Path::new(&config_path))
                .with_context(|| format!("config file {config_path} (from {CONFIG_PATH_ENV})"));
        }
    }

    // Otherwise, load from default location
    Ok(ImporterConfig::load_default())
}
