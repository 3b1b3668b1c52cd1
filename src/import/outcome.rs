//! Per-resource import outcomes.

use serde::Serialize;

/// Why a resource was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The resource (or the locator itself) could not be reached.
    NotFound,
    /// The resource does not have a supported suffix.
    UnsupportedType,
}

/// Result of processing one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    /// The resource was imported.
    Succeeded {
        /// Derived dispatch file name.
        file_name: String,
    },
    /// The resource was not imported and no import was attempted.
    Skipped {
        /// Why the resource was skipped.
        reason: SkipReason,
    },
    /// Conversion or import was attempted and failed.
    Failed {
        /// Derived dispatch file name.
        file_name: String,
        /// Error text.
        error: String,
    },
}

impl ImportOutcome {
    /// Returns whether the resource was imported.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Returns whether the resource was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Returns whether the resource failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome for one resource of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// Locator string, or `null` for a missing locator.
    pub resource: String,
    /// What happened to the resource.
    #[serde(flatten)]
    pub outcome: ImportOutcome,
}

/// Outcomes of a batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    entries: Vec<ReportEntry>,
}

impl ImportReport {
    /// Creates an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records the outcome for a resource.
    pub fn record(&mut self, resource: impl Into<String>, outcome: ImportOutcome) {
        self.entries.push(ReportEntry {
            resource: resource.into(),
            outcome,
        });
    }

    /// Appends the entries of another report.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Returns the entries in processing order.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Number of imported resources.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(ImportOutcome::is_success)
    }

    /// Number of skipped resources.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(ImportOutcome::is_skipped)
    }

    /// Number of failed resources.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(ImportOutcome::is_failure)
    }

    /// Number of resources processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no resource was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether any resource failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, predicate: impl Fn(&ImportOutcome) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.outcome))
            .count()
    }
}
