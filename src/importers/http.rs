//! HTTP document importer.

use crate::import::DocumentImporter;
use crate::resource::{HttpSettings, build_http_client};
use crate::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};

/// Sends XML batches to a document-import endpoint.
///
/// Each batch is one `POST` with `Content-Type: application/xml`. Any
/// non-success status is treated as a rejected import.
pub struct HttpDocumentImporter {
    /// Import endpoint.
    endpoint: String,
    /// Optional bearer token.
    token: Option<SecretString>,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl HttpDocumentImporter {
    /// Content type sent with every batch.
    pub const XML_CONTENT_TYPE: &'static str = "application/xml; charset=utf-8";

    /// Creates an importer for the given endpoint with default timeouts.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            client: build_http_client(HttpSettings::default()),
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets HTTP client timeouts.
    #[must_use]
    pub fn with_http_settings(mut self, settings: HttpSettings) -> Self {
        self.client = build_http_client(settings);
        self
    }

    /// Returns the import endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DocumentImporter for HttpDocumentImporter {
    fn import_xml(&self, xml: &str) -> Result<()> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, Self::XML_CONTENT_TYPE)
            .body(xml.to_string());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().map_err(|e| {
            let error_kind = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connect"
            } else if e.is_request() {
                "request"
            } else {
                "unknown"
            };
            tracing::error!(
                endpoint = %self.endpoint,
                error = %e,
                error_kind = error_kind,
                "Import request failed"
            );
            Error::OperationFailed {
                operation: "import_xml".to_string(),
                cause: format!("{error_kind} error: {e}"),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(
                endpoint = %self.endpoint,
                status = %status,
                body = %body,
                "Import endpoint rejected batch"
            );
            return Err(Error::OperationFailed {
                operation: "import_xml".to_string(),
                cause: format!("endpoint returned status: {status} - {body}"),
            });
        }

        tracing::debug!(endpoint = %self.endpoint, bytes = xml.len(), "Batch imported");
        Ok(())
    }
}

impl std::fmt::Debug for HttpDocumentImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDocumentImporter")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}
