//! Collaborator traits for the import pipeline.
//!
//! The coordinator only routes resources; the actual work happens behind
//! these seams:
//!
//! - [`TextContentParser`] turns a `.content` stream into a content set
//! - [`ContentSetWriter`] serializes a content set as an XML batch document
//! - [`DocumentImporter`] persists an XML batch in the content store
//!
//! [`ContentConverter`] is the object-safe combination of the first two that
//! the coordinator holds. [`ParseThenWrite`] builds one from a parser and a
//! writer.

use crate::resource::ResourceLocator;
use crate::{Error, Result};
use std::io::{Read, Write};

/// Imports XML batch documents into the content store.
pub trait DocumentImporter: Send + Sync {
    /// Imports one XML batch document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the document or cannot be
    /// reached.
    fn import_xml(&self, xml: &str) -> Result<()>;
}

/// Parses the proprietary text content format.
pub trait TextContentParser: Send + Sync {
    /// Structured result of a parse.
    type ContentSet;

    /// Parses a `.content` stream.
    ///
    /// `locator` and `file_name` identify the resource for relative
    /// references and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is unreadable or malformed.
    fn parse(
        &self,
        reader: &mut dyn Read,
        locator: &ResourceLocator,
        file_name: &str,
    ) -> Result<Self::ContentSet>;
}

/// Serializes content sets as XML batch documents.
pub trait ContentSetWriter<S>: Send + Sync {
    /// Writes `set` to `out` as a complete XML batch document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    fn write(&self, set: &S, out: &mut dyn Write) -> Result<()>;
}

/// Converts a `.content` stream into XML batch text.
pub trait ContentConverter: Send + Sync {
    /// Reads a `.content` stream and returns the equivalent XML batch.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or serialization fails.
    fn to_xml(
        &self,
        reader: &mut dyn Read,
        locator: &ResourceLocator,
        file_name: &str,
    ) -> Result<String>;
}

/// Converter that parses a content set and then serializes it.
#[derive(Debug, Clone)]
pub struct ParseThenWrite<P, W> {
    parser: P,
    writer: W,
}

impl<P, W> ParseThenWrite<P, W> {
    /// Combines a parser and a writer.
    pub const fn new(parser: P, writer: W) -> Self {
        Self { parser, writer }
    }
}

impl<P, W> ContentConverter for ParseThenWrite<P, W>
where
    P: TextContentParser,
    W: ContentSetWriter<P::ContentSet>,
{
    fn to_xml(
        &self,
        reader: &mut dyn Read,
        locator: &ResourceLocator,
        file_name: &str,
    ) -> Result<String> {
        let set = self.parser.parse(reader, locator, file_name)?;

        let mut buffer = Vec::new();
        self.writer.write(&set, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| Error::operation("serialize_content_set", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Parses `key=value` lines.
    struct PairParser;

    impl TextContentParser for PairParser {
        type ContentSet = Vec<(String, String)>;

        fn parse(
            &self,
            reader: &mut dyn Read,
            _locator: &ResourceLocator,
            file_name: &str,
        ) -> Result<Self::ContentSet> {
            let mut text = String::new();
            reader
                .read_to_string(&mut text)
                .map_err(|e| Error::operation("read_content", e))?;
            text.lines()
                .map(|line| {
                    line.split_once('=')
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .ok_or_else(|| {
                            Error::InvalidInput(format!("{file_name}: malformed line '{line}'"))
                        })
                })
                .collect()
        }
    }

    struct PairWriter;

    impl ContentSetWriter<Vec<(String, String)>> for PairWriter {
        fn write(&self, set: &Vec<(String, String)>, out: &mut dyn Write) -> Result<()> {
            let mut xml = String::from("<batch>");
            for (key, value) in set {
                xml.push_str(&format!("<content id=\"{key}\">{value}</content>"));
            }
            xml.push_str("</batch>");
            out.write_all(xml.as_bytes())
                .map_err(|e| Error::operation("write_batch", e))
        }
    }

    fn locator() -> ResourceLocator {
        ResourceLocator::parse("file:///site/pages.content").unwrap()
    }

    #[test]
    fn test_parse_then_write() {
        let converter = ParseThenWrite::new(PairParser, PairWriter);
        let mut input = Cursor::new("home=Welcome\nabout=About us");

        let xml = converter
            .to_xml(&mut input, &locator(), "/site/pages.content")
            .unwrap();

        assert_eq!(
            xml,
            "<batch><content id=\"home\">Welcome</content><content id=\"about\">About us</content></batch>"
        );
    }

    #[test]
    fn test_parse_error_propagates() {
        let converter = ParseThenWrite::new(PairParser, PairWriter);
        let mut input = Cursor::new("no separator here");

        let err = converter
            .to_xml(&mut input, &locator(), "/site/pages.content")
            .unwrap_err();

        assert!(err.to_string().contains("/site/pages.content"));
    }
}
