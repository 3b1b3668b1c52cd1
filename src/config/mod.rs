//! Configuration management.
//!
//! Configuration is read from a TOML file and then adjusted from the
//! environment:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `CONTENT_IMPORT_ENDPOINT` | Sets the HTTP import endpoint and selects the HTTP importer |
//! | `CONTENT_IMPORT_TOKEN` | Bearer token for the HTTP importer |
//! | `CONTENT_IMPORT_LOG_FORMAT` | `pretty` or `json` |
//! | `CONTENT_IMPORT_LOG_LEVEL` | Default log level |

use crate::resource::HttpSettings;
use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the application directory under the platform config dir.
const APP_DIR: &str = "content-importer";

/// Main configuration for the importer.
#[derive(Debug, Clone, Default)]
pub struct ImporterConfig {
    /// Where XML batches are sent.
    pub importer: ImporterSettings,
    /// How `.content` resources are converted.
    pub converter: ConverterSettings,
    /// Which report sinks are enabled.
    pub reporting: ReportingSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Destination kind for XML batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImporterKind {
    /// POST batches to an HTTP endpoint.
    Http,
    /// Write batches into a spool directory.
    #[default]
    Directory,
}

impl ImporterKind {
    /// Parses an importer kind string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for unknown kinds.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "http" | "https" => Ok(Self::Http),
            "directory" | "dir" | "spool" => Ok(Self::Directory),
            other => Err(Error::InvalidInput(format!("unknown importer kind: {other}"))),
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Directory => "directory",
        }
    }
}

/// Document importer settings.
#[derive(Debug, Clone)]
pub struct ImporterSettings {
    /// Importer kind.
    pub kind: ImporterKind,
    /// HTTP endpoint receiving XML batches.
    pub endpoint: Option<String>,
    /// Bearer token for the HTTP endpoint.
    pub token: Option<SecretString>,
    /// HTTP timeouts, also used for remote resources.
    pub http: HttpSettings,
    /// Spool directory for the directory importer.
    pub spool_dir: PathBuf,
}

impl Default for ImporterSettings {
    fn default() -> Self {
        Self {
            kind: ImporterKind::default(),
            endpoint: None,
            token: None,
            http: HttpSettings::default(),
            spool_dir: PathBuf::from("import-spool"),
        }
    }
}

/// External converter for `.content` resources.
#[derive(Debug, Clone, Default)]
pub struct ConverterSettings {
    /// Program reading `.content` on stdin and writing an XML batch to stdout.
    pub command: Option<String>,
    /// Extra arguments for the program.
    pub args: Vec<String>,
}

/// Report sink switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingSettings {
    /// Send events to the structured log.
    pub log: bool,
    /// Print events to stdout/stderr.
    pub console: bool,
}

impl Default for ReportingSettings {
    fn default() -> Self {
        Self {
            log: true,
            console: true,
        }
    }
}

/// Logging settings from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Default level or filter directive.
    pub level: Option<String>,
    /// Log file; logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Importer section.
    pub importer: Option<ConfigFileImporter>,
    /// Converter section.
    pub converter: Option<ConfigFileConverter>,
    /// Reporting section.
    pub reporting: Option<ConfigFileReporting>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Importer section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileImporter {
    /// Importer kind.
    pub kind: Option<String>,
    /// HTTP endpoint.
    pub endpoint: Option<String>,
    /// Bearer token.
    pub token: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
    /// Spool directory.
    pub spool_dir: Option<String>,
}

/// Converter section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileConverter {
    /// Converter program.
    pub command: Option<String>,
    /// Converter arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Reporting section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileReporting {
    /// Structured log sink.
    pub log: Option<bool>,
    /// Console sink.
    pub console: Option<bool>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Log format.
    pub format: Option<String>,
    /// Log level.
    pub level: Option<String>,
    /// Log file.
    pub file: Option<String>,
}

impl ImporterConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/.config/content-importer/` on Linux,
    ///    `~/Library/Application Support/content-importer/` on macOS)
    /// 2. XDG-style `~/.config/content-importer/`
    ///
    /// Returns default configuration if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join(APP_DIR).join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join(APP_DIR)
                .join("config.toml"),
        ];

        for candidate in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from_file(candidate) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %candidate.display(), error = %e, "Ignoring config file");
                },
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `ImporterConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(importer) = file.importer {
            if let Some(kind) = importer.kind {
                config.importer.kind = ImporterKind::parse(&kind)?;
            } else if importer.endpoint.is_some() {
                config.importer.kind = ImporterKind::Http;
            }
            config.importer.endpoint = importer.endpoint;
            config.importer.token = importer.token.map(SecretString::from);
            if let Some(timeout_ms) = importer.timeout_ms {
                config.importer.http.timeout_ms = timeout_ms;
            }
            if let Some(connect_timeout_ms) = importer.connect_timeout_ms {
                config.importer.http.connect_timeout_ms = connect_timeout_ms;
            }
            if let Some(spool_dir) = importer.spool_dir {
                config.importer.spool_dir = PathBuf::from(spool_dir);
            }
        }
        if let Some(converter) = file.converter {
            config.converter.command = converter.command.filter(|c| !c.trim().is_empty());
            config.converter.args = converter.args;
        }
        if let Some(reporting) = file.reporting {
            if let Some(v) = reporting.log {
                config.reporting.log = v;
            }
            if let Some(v) = reporting.console {
                config.reporting.console = v;
            }
        }
        if let Some(logging) = file.logging {
            config.logging.format = logging.format;
            config.logging.level = logging.level;
            config.logging.file = logging.file.map(PathBuf::from);
        }

        Ok(config)
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from a variable lookup.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = lookup("CONTENT_IMPORT_ENDPOINT") {
            self.importer.endpoint = Some(endpoint);
            self.importer.kind = ImporterKind::Http;
        }
        if let Some(token) = lookup("CONTENT_IMPORT_TOKEN") {
            self.importer.token = Some(SecretString::from(token));
        }
        if let Some(format) = lookup("CONTENT_IMPORT_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(level) = lookup("CONTENT_IMPORT_LOG_LEVEL") {
            self.logging.level = Some(level);
        }
        self
    }

    /// Sets the spool directory and selects the directory importer.
    #[must_use]
    pub fn with_spool_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.importer.kind = ImporterKind::Directory;
        self.importer.spool_dir = path.into();
        self
    }
}
