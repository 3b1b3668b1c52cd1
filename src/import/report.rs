//! Dual-channel reporting of import events.
//!
//! Every event is delivered to two independent sinks: a structured log sink
//! ([`TracingSink`]) and a console sink ([`ConsoleSink`]). A [`Reporter`]
//! holds both and either can be switched off.

use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Warning emitted when no resource collection is passed.
pub const RESOURCE_SET_NULL: &str = "The passed set of resources was null";

/// Warning emitted for an empty resource collection.
pub const RESOURCE_SET_EMPTY: &str = "The passed set of resources was empty";

/// Error emitted when converting or importing a resource fails.
pub const CONTENT_IMPORT_FAILED: &str = "Content import failed! See error message below:";

/// Placeholder used when a locator itself is missing.
pub const NULL_RESOURCE: &str = "null";

/// Severity of an import event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Progress information.
    Info,
    /// Recoverable problem; the resource or batch was skipped.
    Warning,
    /// A resource failed to import.
    Error,
}

/// Something worth reporting during an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ImportEvent {
    /// No resource collection was passed.
    ResourceSetNull,
    /// The resource collection was empty.
    ResourceSetEmpty,
    /// A resource could not be reached.
    ResourceNotFound {
        /// Locator string, or `null` for a missing locator.
        resource: String,
    },
    /// A resource does not end with a supported suffix.
    UnsupportedType {
        /// Locator string.
        resource: String,
    },
    /// Converting or importing a resource failed.
    ImportFailed {
        /// Locator string.
        resource: String,
        /// Derived dispatch file name.
        file_name: String,
        /// Error text.
        error: String,
    },
    /// A resource was imported.
    ImportSucceeded {
        /// Locator string.
        resource: String,
        /// Derived dispatch file name.
        file_name: String,
    },
}

impl ImportEvent {
    /// Returns the severity of the event.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::ImportSucceeded { .. } => Severity::Info,
            Self::ImportFailed { .. } => Severity::Error,
            Self::ResourceSetNull
            | Self::ResourceSetEmpty
            | Self::ResourceNotFound { .. }
            | Self::UnsupportedType { .. } => Severity::Warning,
        }
    }

    /// Returns the underlying error text of a failure event.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::ImportFailed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for ImportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceSetNull => f.write_str(RESOURCE_SET_NULL),
            Self::ResourceSetEmpty => f.write_str(RESOURCE_SET_EMPTY),
            Self::ResourceNotFound { resource } => {
                write!(f, "Resource file not found: '{resource}'")
            },
            Self::UnsupportedType { resource } => write!(
                f,
                "Resource type not supported: '{resource}'. Supported types are: '.content' and '.xml'"
            ),
            Self::ImportFailed { .. } => f.write_str(CONTENT_IMPORT_FAILED),
            Self::ImportSucceeded { file_name, .. } => {
                write!(f, "Content import of: '{file_name}' succeeded.")
            },
        }
    }
}

/// Destination for import events.
pub trait ReportSink: Send + Sync {
    /// Delivers one event.
    fn emit(&self, event: &ImportEvent);
}

/// Sink that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn emit(&self, event: &ImportEvent) {
        match event {
            ImportEvent::ResourceSetNull | ImportEvent::ResourceSetEmpty => {
                tracing::warn!("{event}");
            },
            ImportEvent::ResourceNotFound { resource }
            | ImportEvent::UnsupportedType { resource } => {
                tracing::warn!(resource = %resource, "{event}");
            },
            ImportEvent::ImportFailed {
                resource,
                file_name,
                error,
            } => {
                tracing::error!(
                    resource = %resource,
                    file_name = %file_name,
                    error = %error,
                    "{event}"
                );
            },
            ImportEvent::ImportSucceeded {
                resource,
                file_name,
            } => {
                tracing::info!(resource = %resource, file_name = %file_name, "{event}");
            },
        }
    }
}

type SharedWriter = Mutex<Box<dyn Write + Send>>;

/// Sink that prints events for a human operator.
///
/// Info events go to the output stream, warnings and errors to the error
/// stream. Failures print the error text on the line after the message.
pub struct ConsoleSink {
    out: SharedWriter,
    err: SharedWriter,
}

impl ConsoleSink {
    /// Creates a sink writing to stdout and stderr.
    #[must_use]
    pub fn new() -> Self {
        Self::with_writers(io::stdout(), io::stderr())
    }

    /// Creates a sink writing to the given streams.
    pub fn with_writers(
        out: impl Write + Send + 'static,
        err: impl Write + Send + 'static,
    ) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            err: Mutex::new(Box::new(err)),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink").finish_non_exhaustive()
    }
}

impl ReportSink for ConsoleSink {
    fn emit(&self, event: &ImportEvent) {
        let stream = match event.severity() {
            Severity::Info => &self.out,
            Severity::Warning | Severity::Error => &self.err,
        };
        let mut writer = stream.lock().unwrap_or_else(PoisonError::into_inner);
        // Console output is best effort; a closed pipe must not stop the batch.
        let _ = writeln!(writer, "{event}");
        if let Some(detail) = event.detail() {
            let _ = writeln!(writer, "{detail}");
        }
        let _ = writer.flush();
    }
}

/// Sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ImportEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<ImportEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the events of the given severity.
    #[must_use]
    pub fn with_severity(&self, severity: Severity) -> Vec<ImportEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.severity() == severity)
            .collect()
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, event: &ImportEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Delivers events to a log sink and a console sink.
#[derive(Clone, Default)]
pub struct Reporter {
    log: Option<Arc<dyn ReportSink>>,
    console: Option<Arc<dyn ReportSink>>,
}

impl Reporter {
    /// Reporter with a [`TracingSink`] and a stdout/stderr [`ConsoleSink`].
    #[must_use]
    pub fn standard() -> Self {
        Self {
            log: Some(Arc::new(TracingSink)),
            console: Some(Arc::new(ConsoleSink::new())),
        }
    }

    /// Reporter that drops every event.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    /// Replaces the log sink.
    #[must_use]
    pub fn with_log(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.log = Some(sink);
        self
    }

    /// Replaces the console sink.
    #[must_use]
    pub fn with_console(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.console = Some(sink);
        self
    }

    /// Disables the log sink.
    #[must_use]
    pub fn without_log(mut self) -> Self {
        self.log = None;
        self
    }

    /// Disables the console sink.
    #[must_use]
    pub fn without_console(mut self) -> Self {
        self.console = None;
        self
    }

    /// Delivers an event to every enabled sink, log sink first.
    pub fn emit(&self, event: &ImportEvent) {
        for sink in [&self.log, &self.console].into_iter().flatten() {
            sink.emit(event);
        }
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("log", &self.log.is_some())
            .field("console", &self.console.is_some())
            .finish()
    }
}
