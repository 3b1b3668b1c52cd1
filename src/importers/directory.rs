//! Spool-directory document importer.

use crate::import::DocumentImporter;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

const PREFIX: &str = "batch-";
const SUFFIX: &str = ".xml";

/// Writes each XML batch to a numbered file in a directory.
///
/// Files are named `batch-00001.xml`, `batch-00002.xml`, ... Numbering
/// continues after the highest batch already present, so earlier runs are
/// never overwritten.
#[derive(Debug)]
pub struct DirectoryImporter {
    dir: PathBuf,
    last: AtomicUsize,
}

impl DirectoryImporter {
    /// Creates the importer, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or listed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::operation("create_spool_dir", format!("{}: {e}", dir.display()))
        })?;
        let last = highest_batch(&dir)?;

        Ok(Self {
            dir,
            last: AtomicUsize::new(last),
        })
    }

    /// Returns the spool directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentImporter for DirectoryImporter {
    fn import_xml(&self, xml: &str) -> Result<()> {
        let seq = self.last.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.dir.join(format!("{PREFIX}{seq:05}{SUFFIX}"));
        std::fs::write(&path, xml)
            .map_err(|e| Error::operation("write_batch", format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), bytes = xml.len(), "Batch spooled");
        Ok(())
    }
}

fn highest_batch(dir: &Path) -> Result<usize> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::operation("read_spool_dir", format!("{}: {e}", dir.display())))?;

    Ok(entries
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            name.to_str()?
                .strip_prefix(PREFIX)?
                .strip_suffix(SUFFIX)?
                .parse::<usize>()
                .ok()
        })
        .max()
        .unwrap_or(0))
}
