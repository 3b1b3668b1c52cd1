//! Resource kinds recognised by the importer.

use std::fmt;

/// Kind of an importable resource, decided by file name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Proprietary text content, converted to an XML batch before import.
    Content,
    /// XML batch document, imported verbatim.
    Xml,
}

impl ResourceKind {
    /// All supported kinds, in the order they are listed to users.
    pub const ALL: [Self; 2] = [Self::Content, Self::Xml];

    /// Returns the file suffix for this kind, including the leading dot.
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Content => ".content",
            Self::Xml => ".xml",
        }
    }

    /// Classifies a name by its suffix.
    ///
    /// Matching is case-sensitive: `page.XML` is not an XML resource.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| name.ends_with(kind.suffix()))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/site/articles.content", Some(ResourceKind::Content); "content file")]
    #[test_case("/site/batch.xml", Some(ResourceKind::Xml); "xml file")]
    #[test_case("jar:file:/a.jar!/afile.content", Some(ResourceKind::Content); "archive entry")]
    #[test_case("/notes.txt", None; "text file")]
    #[test_case("/batch.XML", None; "uppercase suffix")]
    #[test_case("/archive.xml.gz", None; "compressed xml")]
    #[test_case("", None; "empty name")]
    fn test_from_name(name: &str, expected: Option<ResourceKind>) {
        assert_eq!(ResourceKind::from_name(name), expected);
    }

    #[test]
    fn test_display_is_suffix() {
        assert_eq!(ResourceKind::Content.to_string(), ".content");
        assert_eq!(ResourceKind::Xml.to_string(), ".xml");
    }
}
