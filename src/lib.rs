//! # Content Importer
//!
//! Imports content resources into a content store.
//!
//! Resources are addressed by URL-style locators: local files, entries inside
//! ZIP/JAR archives, or HTTP resources. Each resource is validated, classified
//! by its file extension and routed to the matching conversion path:
//!
//! - `.content` resources are parsed by a [`TextContentParser`], serialized to
//!   an XML batch document and handed to the [`DocumentImporter`]
//! - `.xml` resources are passed to the [`DocumentImporter`] verbatim
//!
//! Every resource yields an [`ImportOutcome`]; a failing resource never aborts
//! the rest of the batch.
//!
//! ## Example
//!
//! ```rust,ignore
//! use content_importer::{ImportCoordinator, Reporter, ResourceLocator};
//! use content_importer::importers::{DirectoryImporter, UnconfiguredConverter};
//! use std::sync::Arc;
//!
//! let coordinator = ImportCoordinator::new(
//!     Arc::new(DirectoryImporter::new("./spool")?),
//!     Arc::new(UnconfiguredConverter),
//!     Reporter::standard(),
//! );
//! let locators = vec![ResourceLocator::parse("file:///srv/import/site.xml")?];
//! let report = coordinator.import_ordered(Some(&locators));
//! assert_eq!(report.succeeded(), 1);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod import;
pub mod importers;
pub mod observability;
pub mod resource;

pub use config::ImporterConfig;
pub use import::{
    ContentConverter, ContentSetWriter, DocumentImporter, ImportCoordinator, ImportEvent,
    ImportOutcome, ImportReport, ParseThenWrite, ReportSink, Reporter, Severity, SkipReason,
    TextContentParser,
};
pub use resource::ResourceLocator;

/// Error type for content import operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Unparsable locator, bad configuration value |
/// | `NotFound` | A resource, archive or archive entry cannot be reached |
/// | `UnsupportedScheme` | Locator scheme is not file, jar, zip, http or https |
/// | `OperationFailed` | I/O, archive, HTTP, converter process or importer failures |
/// | `NotImplemented` | A required collaborator is not configured |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A resource could not be reached.
    ///
    /// Raised when:
    /// - A local file does not exist or is not a regular file
    /// - An archive does not contain the requested entry
    /// - A remote resource answers with a non-success status
    #[error("resource '{resource}' not found: {cause}")]
    NotFound {
        /// The resource locator.
        resource: String,
        /// The underlying cause.
        cause: String,
    },

    /// The locator uses a scheme that cannot be opened.
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Reading a stream or archive fails
    /// - The converter process exits unsuccessfully
    /// - The document importer rejects a payload
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A collaborator needed for the operation is not configured.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from any displayable cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for content import operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("bad locator".to_string());
        assert_eq!(err.to_string(), "invalid input: bad locator");

        let err = Error::operation("import_xml", "rejected");
        assert_eq!(err.to_string(), "operation 'import_xml' failed: rejected");

        let err = Error::NotFound {
            resource: "file:///missing.xml".to_string(),
            cause: "no such file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "resource 'file:///missing.xml' not found: no such file"
        );

        let err = Error::UnsupportedScheme("ftp".to_string());
        assert_eq!(err.to_string(), "unsupported scheme: ftp");
    }
}
