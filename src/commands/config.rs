//! Config command handler.

use content_importer::config::{ImporterConfig, ImporterKind};
use std::process::ExitCode;

/// Config command.
pub fn cmd_config(config: &ImporterConfig, show: bool) -> anyhow::Result<ExitCode> {
    if !show {
        println!("Use --show to display the current configuration.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Current Configuration");
    println!("=====================");
    println!();

    println!("Importer:");
    println!("  Kind: {}", config.importer.kind.as_str());
    match config.importer.kind {
        ImporterKind::Http => {
            println!(
                "  Endpoint: {}",
                config.importer.endpoint.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  Token: {}",
                if config.importer.token.is_some() {
                    "[REDACTED]"
                } else {
                    "(not set)"
                }
            );
        },
        ImporterKind::Directory => {
            println!("  Spool Directory: {}", config.importer.spool_dir.display());
        },
    }
    println!("  Timeout: {}ms", config.importer.http.timeout_ms);
    println!(
        "  Connect Timeout: {}ms",
        config.importer.http.connect_timeout_ms
    );
    println!();

    println!("Converter:");
    match &config.converter.command {
        Some(command) => {
            println!("  Command: {command}");
            if !config.converter.args.is_empty() {
                println!("  Args: {}", config.converter.args.join(" "));
            }
        },
        None => println!("  (none - .content resources will fail)"),
    }
    println!();

    println!("Reporting:");
    println!("  Log: {}", config.reporting.log);
    println!("  Console: {}", config.reporting.console);
    println!();

    println!("Logging:");
    println!(
        "  Format: {}",
        config.logging.format.as_deref().unwrap_or("pretty")
    );
    println!(
        "  Level: {}",
        config.logging.level.as_deref().unwrap_or("(default)")
    );
    match &config.logging.file {
        Some(file) => println!("  File: {}", file.display()),
        None => println!("  File: (stderr)"),
    }

    Ok(ExitCode::SUCCESS)
}
