//! Concrete collaborators for the import pipeline.
//!
//! | Type | Role |
//! |------|------|
//! | [`HttpDocumentImporter`] | POSTs XML batches to an endpoint |
//! | [`DirectoryImporter`] | Spools XML batches into a directory |
//! | [`CommandConverter`] | Converts `.content` through an external program |
//! | [`UnconfiguredConverter`] | Fails every `.content` conversion |

mod command;
mod directory;
mod http;

pub use command::{CommandConverter, FILE_NAME_ENV, LOCATOR_ENV};
pub use directory::DirectoryImporter;
pub use http::HttpDocumentImporter;

use crate::config::{ConverterSettings, ImporterKind, ImporterSettings};
use crate::import::{ContentConverter, DocumentImporter};
use crate::resource::ResourceLocator;
use crate::{Error, Result};
use std::io::Read;
use std::sync::Arc;

/// Converter used when no conversion program is configured.
///
/// `.xml` resources still import; every `.content` resource fails with
/// [`Error::NotImplemented`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredConverter;

impl ContentConverter for UnconfiguredConverter {
    fn to_xml(
        &self,
        _reader: &mut dyn Read,
        _locator: &ResourceLocator,
        file_name: &str,
    ) -> Result<String> {
        Err(Error::NotImplemented(format!(
            "no content converter configured for {file_name}"
        )))
    }
}

/// Builds the document importer selected by the settings.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the HTTP importer has no endpoint, or an
/// error if the spool directory cannot be prepared.
pub fn build_importer(settings: &ImporterSettings) -> Result<Arc<dyn DocumentImporter>> {
    match settings.kind {
        ImporterKind::Http => {
            let endpoint = settings.endpoint.as_deref().ok_or_else(|| {
                Error::InvalidInput("http importer requires an endpoint".to_string())
            })?;
            let mut importer =
                HttpDocumentImporter::new(endpoint).with_http_settings(settings.http);
            if let Some(token) = &settings.token {
                importer = importer.with_token(token.clone());
            }
            tracing::debug!(endpoint, "Using HTTP importer");
            Ok(Arc::new(importer))
        },
        ImporterKind::Directory => {
            let importer = DirectoryImporter::new(&settings.spool_dir)?;
            tracing::debug!(dir = %settings.spool_dir.display(), "Using directory importer");
            Ok(Arc::new(importer))
        },
    }
}

/// Builds the content converter selected by the settings.
#[must_use]
pub fn build_converter(settings: &ConverterSettings) -> Arc<dyn ContentConverter> {
    match &settings.command {
        Some(program) => Arc::new(CommandConverter::new(program, settings.args.clone())),
        None => Arc::new(UnconfiguredConverter),
    }
}
