//! Command handlers module.
//!
//! - `import.rs`: Import and check commands
//! - `config.rs`: Configuration display command

mod config;
mod import;

use clap::ValueEnum;

pub use config::cmd_config;
pub use import::{cmd_check, cmd_import};

/// Summary output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Text,
    /// JSON report on stdout.
    Json,
}
