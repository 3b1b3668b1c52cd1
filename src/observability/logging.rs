//! Structured logging configuration.

use crate::config::LoggingSettings;
use crate::{Error, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default filter when nothing else is configured.
const DEFAULT_LEVEL: &str = "warn";

/// Filter used when verbose output is requested.
const VERBOSE_LEVEL: &str = "debug";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name, falling back to [`LogFormat::Pretty`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Level filter.
    pub filter: EnvFilter,
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: EnvFilter::new(DEFAULT_LEVEL),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from settings and the verbose flag.
    ///
    /// The filter is taken from `RUST_LOG` when set, else `debug` when
    /// `verbose`, else the configured level, else `warn`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the chosen filter does not parse.
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Result<Self> {
        Self::from_settings_with(settings, verbose, std::env::var("RUST_LOG").ok())
    }

    fn from_settings_with(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        rust_log: Option<String>,
    ) -> Result<Self> {
        let format = settings
            .and_then(|s| s.format.as_deref())
            .map(LogFormat::parse)
            .unwrap_or_default();

        let directive = rust_log
            .filter(|v| !v.trim().is_empty())
            .or_else(|| verbose.then(|| VERBOSE_LEVEL.to_string()))
            .or_else(|| settings.and_then(|s| s.level.clone()))
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

        let filter = EnvFilter::try_new(&directive)
            .map_err(|e| Error::InvalidInput(format!("log filter '{directive}': {e}")))?;

        Ok(Self {
            format,
            filter,
            file: settings.and_then(|s| s.file.clone()),
        })
    }
}
