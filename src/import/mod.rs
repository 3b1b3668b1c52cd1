//! Content import pipeline.
//!
//! # Flow
//!
//! ```text
//! locator ─▶ probe ─▶ suffix check ─▶ dispatch name
//!                                         │
//!                 ┌───────────────────────┴──────────────┐
//!             .content                                  .xml
//!     open stream ─▶ ContentConverter             read text
//!                 └──────────────▶ DocumentImporter ◀────┘
//! ```
//!
//! Each resource ends as an [`ImportOutcome`]; events are delivered through
//! a [`Reporter`] to a log sink and a console sink.
//!
//! # Supported Resources
//!
//! | Suffix | Conversion |
//! |--------|------------|
//! | `.content` | Parsed and serialized to an XML batch |
//! | `.xml` | Imported verbatim |

pub mod coordinator;
pub mod outcome;
pub mod report;
pub mod traits;

pub use coordinator::ImportCoordinator;
pub use outcome::{ImportOutcome, ImportReport, ReportEntry, SkipReason};
pub use report::{
    ConsoleSink, ImportEvent, MemorySink, ReportSink, Reporter, Severity, TracingSink,
};
pub use traits::{
    ContentConverter, ContentSetWriter, DocumentImporter, ParseThenWrite, TextContentParser,
};
