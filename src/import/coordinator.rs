//! Batch import coordinator.
//!
//! Validates each resource, routes it by suffix and hands the resulting XML
//! to the [`DocumentImporter`]. A failing resource is reported and skipped;
//! the batch always runs to the end.

use super::outcome::{ImportOutcome, ImportReport, SkipReason};
use super::report::{ImportEvent, NULL_RESOURCE, Reporter};
use super::traits::{ContentConverter, DocumentImporter};
use crate::Result;
use crate::resource::{ResourceConnector, ResourceKind, ResourceLocator};
use std::collections::HashSet;
use std::sync::Arc;

/// Imports batches of `.content` and `.xml` resources.
pub struct ImportCoordinator {
    importer: Arc<dyn DocumentImporter>,
    converter: Arc<dyn ContentConverter>,
    reporter: Reporter,
    connector: ResourceConnector,
}

impl ImportCoordinator {
    /// Creates a coordinator.
    #[must_use]
    pub fn new(
        importer: Arc<dyn DocumentImporter>,
        converter: Arc<dyn ContentConverter>,
        reporter: Reporter,
    ) -> Self {
        Self {
            importer,
            converter,
            reporter,
            connector: ResourceConnector::new(),
        }
    }

    /// Replaces the connector used to reach resources.
    #[must_use]
    pub fn with_connector(mut self, connector: ResourceConnector) -> Self {
        self.connector = connector;
        self
    }

    /// Imports resources in the given order.
    ///
    /// Use this when later resources depend on content created by earlier
    /// ones.
    pub fn import_ordered(&self, locators: Option<&[ResourceLocator]>) -> ImportReport {
        self.process_all(locators)
    }

    /// Imports resources in no particular order.
    pub fn import_unordered(&self, locators: Option<&HashSet<ResourceLocator>>) -> ImportReport {
        self.process_all(locators)
    }

    /// Imports every resource of the collection, one at a time.
    ///
    /// A missing or empty collection is reported as a warning and yields an
    /// empty report.
    pub fn process_all<'a, I>(&self, locators: Option<I>) -> ImportReport
    where
        I: IntoIterator<Item = &'a ResourceLocator>,
    {
        let mut report = ImportReport::new();

        let Some(locators) = locators else {
            self.reporter.emit(&ImportEvent::ResourceSetNull);
            return report;
        };

        let mut locators = locators.into_iter().peekable();
        if locators.peek().is_none() {
            self.reporter.emit(&ImportEvent::ResourceSetEmpty);
            return report;
        }

        for locator in locators {
            let outcome = self.process_one(locator);
            report.record(locator.as_str(), outcome);
        }

        tracing::debug!(
            total = report.total(),
            succeeded = report.succeeded(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Import batch finished"
        );

        report
    }

    /// Checks that a resource can be imported.
    ///
    /// The resource must be reachable and its full locator string must end
    /// with `.content` or `.xml`. Reachability is checked first. Problems are
    /// reported as warnings.
    pub fn is_valid_resource(&self, locator: Option<&ResourceLocator>) -> bool {
        match locator {
            Some(locator) => self.validate(locator).is_ok(),
            None => {
                self.reporter.emit(&ImportEvent::ResourceNotFound {
                    resource: NULL_RESOURCE.to_string(),
                });
                false
            },
        }
    }

    fn validate(&self, locator: &ResourceLocator) -> std::result::Result<(), SkipReason> {
        if let Err(e) = self.connector.probe(locator) {
            tracing::debug!(resource = %locator, error = %e, "Resource probe failed");
            self.reporter.emit(&ImportEvent::ResourceNotFound {
                resource: locator.to_string(),
            });
            return Err(SkipReason::NotFound);
        }

        if !locator.has_supported_suffix() {
            self.reporter.emit(&ImportEvent::UnsupportedType {
                resource: locator.to_string(),
            });
            return Err(SkipReason::UnsupportedType);
        }

        Ok(())
    }

    fn process_one(&self, locator: &ResourceLocator) -> ImportOutcome {
        let _span = tracing::debug_span!("import_resource", resource = %locator).entered();

        if let Err(reason) = self.validate(locator) {
            return ImportOutcome::Skipped { reason };
        }

        let file_name = locator.dispatch_file_name();
        let result = match ResourceKind::from_name(file_name) {
            Some(ResourceKind::Content) => self.import_content(locator, file_name),
            Some(ResourceKind::Xml) => self.import_xml(locator),
            None => {
                // Raw locator passed the suffix check but the derived name did not
                self.reporter.emit(&ImportEvent::UnsupportedType {
                    resource: locator.to_string(),
                });
                return ImportOutcome::Skipped {
                    reason: SkipReason::UnsupportedType,
                };
            },
        };

        match result {
            Ok(()) => {
                self.reporter.emit(&ImportEvent::ImportSucceeded {
                    resource: locator.to_string(),
                    file_name: file_name.to_string(),
                });
                ImportOutcome::Succeeded {
                    file_name: file_name.to_string(),
                }
            },
            Err(e) => {
                let error = e.to_string();
                self.reporter.emit(&ImportEvent::ImportFailed {
                    resource: locator.to_string(),
                    file_name: file_name.to_string(),
                    error: error.clone(),
                });
                ImportOutcome::Failed {
                    file_name: file_name.to_string(),
                    error,
                }
            },
        }
    }

    fn import_content(&self, locator: &ResourceLocator, file_name: &str) -> Result<()> {
        let xml = {
            let mut stream = self.connector.open_stream(locator)?;
            self.converter.to_xml(&mut stream, locator, file_name)?
        };
        self.importer.import_xml(&xml)
    }

    fn import_xml(&self, locator: &ResourceLocator) -> Result<()> {
        let xml = self.connector.read_text(locator)?;
        self.importer.import_xml(&xml)
    }
}

impl std::fmt::Debug for ImportCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportCoordinator")
            .field("reporter", &self.reporter)
            .field("connector", &self.connector)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::import::report::{MemorySink, Severity};
    use std::io::Read;
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingImporter {
        calls: Mutex<Vec<String>>,
        reject: Option<String>,
    }

    impl RecordingImporter {
        fn rejecting(payload: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reject: Some(payload.to_string()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DocumentImporter for RecordingImporter {
        fn import_xml(&self, xml: &str) -> Result<()> {
            self.calls.lock().unwrap().push(xml.to_string());
            if self.reject.as_deref() == Some(xml) {
                return Err(Error::operation("import_xml", "Exception"));
            }
            Ok(())
        }
    }

    /// Wraps the raw content in a batch element.
    struct WrappingConverter;

    impl ContentConverter for WrappingConverter {
        fn to_xml(
            &self,
            reader: &mut dyn Read,
            _locator: &ResourceLocator,
            file_name: &str,
        ) -> Result<String> {
            let mut text = String::new();
            reader
                .read_to_string(&mut text)
                .map_err(|e| Error::operation("read", e))?;
            Ok(format!("<batch name=\"{file_name}\">{text}</batch>"))
        }
    }

    struct Fixture {
        importer: Arc<RecordingImporter>,
        log: Arc<MemorySink>,
        console: Arc<MemorySink>,
        coordinator: ImportCoordinator,
    }

    fn fixture_with(importer: RecordingImporter) -> Fixture {
        let importer = Arc::new(importer);
        let log = Arc::new(MemorySink::new());
        let console = Arc::new(MemorySink::new());
        let coordinator = ImportCoordinator::new(
            importer.clone(),
            Arc::new(WrappingConverter),
            Reporter::silent()
                .with_log(log.clone())
                .with_console(console.clone()),
        );
        Fixture {
            importer,
            log,
            console,
            coordinator,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingImporter::default())
    }

    fn write(dir: &Path, name: &str, body: &str) -> ResourceLocator {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        ResourceLocator::from_path(&path).unwrap()
    }

    #[test]
    fn test_null_collection() {
        let f = fixture();
        let report = f.coordinator.import_ordered(None);

        assert!(report.is_empty());
        assert_eq!(f.log.events(), vec![ImportEvent::ResourceSetNull]);
        assert_eq!(f.console.events(), vec![ImportEvent::ResourceSetNull]);
        assert!(f.importer.calls().is_empty());
    }

    #[test]
    fn test_empty_collection() {
        let f = fixture();
        let report = f.coordinator.import_unordered(Some(&HashSet::new()));

        assert!(report.is_empty());
        assert_eq!(f.log.events(), vec![ImportEvent::ResourceSetEmpty]);
        assert!(f.importer.calls().is_empty());
    }

    #[test]
    fn test_missing_locator_is_invalid() {
        let f = fixture();
        assert!(!f.coordinator.is_valid_resource(None));
        assert_eq!(
            f.log.events(),
            vec![ImportEvent::ResourceNotFound {
                resource: "null".to_string()
            }]
        );
    }

    #[test]
    fn test_unreachable_resource() {
        let f = fixture();
        let locator = ResourceLocator::parse("file://this-file-does-not-exist.content").unwrap();

        let report = f.coordinator.import_ordered(Some(&[locator.clone()]));

        assert_eq!(
            report.entries()[0].outcome,
            ImportOutcome::Skipped {
                reason: SkipReason::NotFound
            }
        );
        assert_eq!(
            f.log.events(),
            vec![ImportEvent::ResourceNotFound {
                resource: locator.to_string()
            }]
        );
        assert!(f.importer.calls().is_empty());
    }

    #[test]
    fn test_unsupported_type() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture();
        let locator = write(dir.path(), "notes.txt", "hello");

        let report = f.coordinator.import_ordered(Some(&[locator.clone()]));

        assert_eq!(report.skipped(), 1);
        assert_eq!(
            f.log.with_severity(Severity::Warning),
            vec![ImportEvent::UnsupportedType {
                resource: locator.to_string()
            }]
        );
        assert!(f.importer.calls().is_empty());
    }

    #[test]
    fn test_missing_file_reported_before_type() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture();
        let locator = ResourceLocator::from_path(&dir.path().join("missing.txt")).unwrap();

        assert!(!f.coordinator.is_valid_resource(Some(&locator)));
        assert!(matches!(
            f.log.events().as_slice(),
            [ImportEvent::ResourceNotFound { .. }]
        ));
    }

    #[test]
    fn test_xml_imported_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture();
        let locator = write(dir.path(), "batch.xml", "<batch><content/></batch>");

        let report = f.coordinator.import_ordered(Some(&[locator.clone()]));

        assert_eq!(report.succeeded(), 1);
        assert_eq!(f.importer.calls(), vec!["<batch><content/></batch>"]);
        let expected = ImportEvent::ImportSucceeded {
            resource: locator.to_string(),
            file_name: locator.path().to_string(),
        };
        assert_eq!(f.log.events(), vec![expected.clone()]);
        assert_eq!(f.console.events(), vec![expected]);
    }

    #[test]
    fn test_content_converted_before_import() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture();
        let locator = write(dir.path(), "pages.content", "id:home");

        let report = f.coordinator.import_ordered(Some(&[locator.clone()]));

        assert_eq!(report.succeeded(), 1);
        assert_eq!(
            f.importer.calls(),
            vec![format!("<batch name=\"{}\">id:home</batch>", locator.path())]
        );
    }

    #[test]
    fn test_importer_failure_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture_with(RecordingImporter::rejecting("<first/>"));
        let first = write(dir.path(), "first.xml", "<first/>");
        let second = write(dir.path(), "second.xml", "<second/>");

        let report = f
            .coordinator
            .import_ordered(Some(&[first.clone(), second.clone()]));

        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(f.importer.calls(), vec!["<first/>", "<second/>"]);

        let errors = f.log.with_severity(Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].detail().unwrap().contains("Exception"));
    }

    #[test]
    fn test_dispatch_name_disagreeing_with_raw_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let f = fixture();
        let base = write(dir.path(), "page.txt", "plain text");
        let locator = ResourceLocator::parse(&format!("{base}?v=.xml")).unwrap();

        let report = f.coordinator.import_ordered(Some(&[locator]));

        assert_eq!(
            report.entries()[0].outcome,
            ImportOutcome::Skipped {
                reason: SkipReason::UnsupportedType
            }
        );
        assert!(f.importer.calls().is_empty());
    }
}
