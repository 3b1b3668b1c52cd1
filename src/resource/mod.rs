//! Resource locators and connections.
//!
//! A [`ResourceLocator`] names a byte-readable location:
//!
//! | Scheme | Example | Notes |
//! |--------|---------|-------|
//! | `file` | `file:///srv/import/site.xml` | Local file |
//! | `jar`, `zip` | `jar:file:///srv/site.jar!/pages/home.content` | Entry inside a ZIP container |
//! | `http`, `https` | `https://cms.example.com/export/site.xml` | Remote resource |
//!
//! Connections are opened through a [`ResourceConnector`].

mod connection;
mod kind;

pub use connection::{HttpSettings, ResourceConnector, build_http_client};
pub use kind::ResourceKind;

use crate::{Error, Result};
use std::fmt;
use std::path::Path;
use url::Url;

/// Schemes a locator may use.
pub const SUPPORTED_SCHEMES: [&str; 5] = ["file", "jar", "zip", "http", "https"];

/// Separator between an archive location and the entry inside it.
pub const ARCHIVE_SEPARATOR: &str = "!/";

/// Immutable handle identifying a byte-readable resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocator {
    url: Url,
}

impl ResourceLocator {
    /// Parses a locator from a URL string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the string is not a valid URL.
    pub fn parse(raw: &str) -> Result<Self> {
        Url::parse(raw)
            .map(|url| Self { url })
            .map_err(|e| Error::InvalidInput(format!("invalid resource locator '{raw}': {e}")))
    }

    /// Creates a `file:` locator for a filesystem path.
    ///
    /// Relative paths are resolved against the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the path cannot be made absolute or
    /// expressed as a URL.
    pub fn from_path(path: &Path) -> Result<Self> {
        let absolute = std::path::absolute(path).map_err(|e| {
            Error::InvalidInput(format!("cannot resolve path '{}': {e}", path.display()))
        })?;
        Url::from_file_path(&absolute)
            .map(|url| Self { url })
            .map_err(|()| {
                Error::InvalidInput(format!(
                    "path '{}' cannot be expressed as a file URL",
                    absolute.display()
                ))
            })
    }

    /// Resolves a user-supplied location.
    ///
    /// Strings carrying a supported scheme are parsed as URLs; anything else
    /// is treated as a filesystem path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if neither interpretation succeeds.
    pub fn resolve(raw: &str) -> Result<Self> {
        match Url::parse(raw) {
            Ok(url) if SUPPORTED_SCHEMES.contains(&url.scheme()) => Ok(Self { url }),
            _ => Self::from_path(Path::new(raw)),
        }
    }

    /// Returns the full locator string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the URL scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Returns the URL path.
    ///
    /// For archive locators this is the whole opaque part after the scheme,
    /// e.g. `file:///srv/site.jar!/pages/home.content`.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Returns the underlying URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns whether the locator points into an archive container.
    #[must_use]
    pub fn is_archive(&self) -> bool {
        matches!(self.scheme(), "jar" | "zip")
    }

    /// Returns the archive location of an archive locator.
    ///
    /// For `jar:file:///srv/site.jar!/home.content` this is
    /// `file:///srv/site.jar`.
    #[must_use]
    pub fn archive_location(&self) -> Option<&str> {
        if !self.is_archive() {
            return None;
        }
        self.path()
            .split_once(ARCHIVE_SEPARATOR)
            .map(|(location, _)| location)
    }

    /// Returns the entry path inside the archive, without a leading `/`.
    #[must_use]
    pub fn archive_entry(&self) -> Option<&str> {
        if !self.is_archive() {
            return None;
        }
        self.path()
            .split_once(ARCHIVE_SEPARATOR)
            .map(|(_, entry)| entry)
    }

    /// Derives the file name used to pick the conversion path.
    ///
    /// If the path contains `!`, everything before the first `!` is dropped.
    /// The name is then the remainder starting at the first `/`.
    ///
    /// This is intentionally independent from [`Self::has_supported_suffix`],
    /// which looks at the raw locator string. The two can disagree for
    /// locators carrying a query string or several `!` markers.
    #[must_use]
    pub fn dispatch_file_name(&self) -> &str {
        let path = self.path();
        let path = path.find('!').map_or(path, |idx| &path[idx..]);
        path.find('/').map_or(path, |idx| &path[idx..])
    }

    /// Returns whether the raw locator string ends with a supported suffix.
    #[must_use]
    pub fn has_supported_suffix(&self) -> bool {
        ResourceKind::from_name(self.as_str()).is_some()
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceLocator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Url> for ResourceLocator {
    fn from(url: Url) -> Self {
        Self { url }
    }
}
