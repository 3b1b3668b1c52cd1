//! Import and check command handlers.

use super::OutputFormat;
use anyhow::Context;
use content_importer::DocumentImporter;
use content_importer::config::ImporterConfig;
use content_importer::import::{
    ConsoleSink, ContentConverter, ImportCoordinator, ImportEvent, ImportOutcome, ImportReport,
    Reporter, SkipReason, TracingSink,
};
use content_importer::importers::{UnconfiguredConverter, build_converter, build_importer};
use content_importer::resource::{HttpSettings, ResourceConnector, ResourceLocator};
use std::collections::HashSet;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

/// Stream receiving per-resource success lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfoStream {
    Stdout,
    Stderr,
}

/// Executes the import command.
pub fn cmd_import(
    config: &ImporterConfig,
    locations: &[String],
    unordered: bool,
    format: OutputFormat,
    no_console: bool,
) -> anyhow::Result<ExitCode> {
    let importer = build_importer(&config.importer).context("building document importer")?;
    let converter = build_converter(&config.converter);
    let reporter = build_reporter(config, format, no_console);

    let report = run_import(
        importer,
        converter,
        reporter,
        config.importer.http,
        locations,
        unordered,
    );

    match format {
        OutputFormat::Text => print_summary(&report),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
    }

    Ok(exit_code(import_succeeded(&report)))
}

/// Executes the check command.
pub fn cmd_check(config: &ImporterConfig, locations: &[String]) -> anyhow::Result<ExitCode> {
    let reporter = build_reporter(config, OutputFormat::Text, false);
    let results = check_locations(reporter, config.importer.http, locations);

    for (raw, valid) in &results {
        println!("{}: {raw}", if *valid { "valid" } else { "invalid" });
    }

    Ok(exit_code(results.iter().all(|(_, valid)| *valid)))
}

/// Resolves the locations and imports the parsable ones as one batch.
fn run_import(
    importer: Arc<dyn DocumentImporter>,
    converter: Arc<dyn ContentConverter>,
    reporter: Reporter,
    http: HttpSettings,
    locations: &[String],
    unordered: bool,
) -> ImportReport {
    let (locators, mut report) = resolve_locations(locations, &reporter);

    let coordinator = ImportCoordinator::new(importer, converter, reporter)
        .with_connector(ResourceConnector::new().with_http_settings(http));

    // Skip the batch when every location was unparsable.
    if !locators.is_empty() || report.is_empty() {
        let batch = if unordered {
            let set: HashSet<ResourceLocator> = locators.into_iter().collect();
            coordinator.import_unordered(Some(&set))
        } else {
            coordinator.import_ordered(Some(&locators))
        };
        report.merge(batch);
    }

    report
}

/// Skipped resources do not fail an import; failed ones do.
fn import_succeeded(report: &ImportReport) -> bool {
    !report.has_failures()
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Validates each location in argument order.
fn check_locations(
    reporter: Reporter,
    http: HttpSettings,
    locations: &[String],
) -> Vec<(String, bool)> {
    // Validation never reaches the importer or the converter.
    let coordinator = ImportCoordinator::new(
        Arc::new(NoopImporter),
        Arc::new(UnconfiguredConverter),
        reporter.clone(),
    )
    .with_connector(ResourceConnector::new().with_http_settings(http));

    locations
        .iter()
        .map(|raw| {
            let valid = match ResourceLocator::resolve(raw) {
                Ok(locator) => coordinator.is_valid_resource(Some(&locator)),
                Err(e) => {
                    report_unparsable(raw, &e, &reporter);
                    false
                },
            };
            (raw.clone(), valid)
        })
        .collect()
}

struct NoopImporter;

impl DocumentImporter for NoopImporter {
    fn import_xml(&self, _xml: &str) -> content_importer::Result<()> {
        Ok(())
    }
}

/// JSON output owns stdout, so console info lines move to stderr.
const fn info_stream(format: OutputFormat) -> InfoStream {
    match format {
        OutputFormat::Text => InfoStream::Stdout,
        OutputFormat::Json => InfoStream::Stderr,
    }
}

fn build_reporter(config: &ImporterConfig, format: OutputFormat, no_console: bool) -> Reporter {
    let mut reporter = Reporter::silent();
    if config.reporting.log {
        reporter = reporter.with_log(Arc::new(TracingSink));
    }
    if config.reporting.console && !no_console {
        let console = match info_stream(format) {
            InfoStream::Stdout => ConsoleSink::new(),
            InfoStream::Stderr => ConsoleSink::with_writers(io::stderr(), io::stderr()),
        };
        reporter = reporter.with_console(Arc::new(console));
    }
    reporter
}

/// Resolves raw locations, reporting the unparsable ones as not found.
fn resolve_locations(
    locations: &[String],
    reporter: &Reporter,
) -> (Vec<ResourceLocator>, ImportReport) {
    let mut report = ImportReport::new();
    let mut locators = Vec::with_capacity(locations.len());

    for raw in locations {
        match ResourceLocator::resolve(raw) {
            Ok(locator) => locators.push(locator),
            Err(e) => {
                report_unparsable(raw, &e, reporter);
                report.record(
                    raw.clone(),
                    ImportOutcome::Skipped {
                        reason: SkipReason::NotFound,
                    },
                );
            },
        }
    }

    (locators, report)
}

fn report_unparsable(raw: &str, error: &content_importer::Error, reporter: &Reporter) {
    tracing::debug!(location = %raw, error = %error, "Unparsable location");
    reporter.emit(&ImportEvent::ResourceNotFound {
        resource: raw.to_string(),
    });
}

fn print_summary(report: &ImportReport) {
    println!();
    println!("Import completed:");
    println!("  Imported:        {}", report.succeeded());
    println!("  Skipped:         {}", report.skipped());
    println!("  Failed:          {}", report.failed());
    println!("  Total processed: {}", report.total());

    let failures: Vec<_> = report
        .entries()
        .iter()
        .filter_map(|entry| match &entry.outcome {
            ImportOutcome::Failed { file_name, error } => Some((file_name, error)),
            _ => None,
        })
        .collect();

    if !failures.is_empty() {
        println!();
        println!("Errors ({}):", failures.len());
        for (file_name, error) in failures.iter().take(10) {
            println!("  - {file_name}: {error}");
        }
        if failures.len() > 10 {
            println!("  ... and {} more", failures.len() - 10);
        }
    }
}
