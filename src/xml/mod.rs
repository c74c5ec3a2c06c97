//! Reading and writing SED-ML documents as XML.
//!
//! Reading parses the input into a `roxmltree` DOM and converts it into the object model,
//! element by element. Writing emits XML text directly from the object model. MathML
//! is handled by a dedicated codec that both directions share.

use crate::{SedDocument, SedError, SedErrorCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod mathml;
mod namespaces;
mod reader;
mod writer;

pub use mathml::{read_mathml_string, write_mathml_string};
pub use namespaces::{
    MATHML_XMLNS, SEDML_DEFAULT_LEVEL, SEDML_DEFAULT_VERSION, SEDML_XMLNS_L1, SEDML_XMLNS_L1V2,
    SedNamespaces, get_level_version, get_sed_namespace_uri, is_sed_namespace,
    parse_sed_namespace_uri_scheme, sed_namespace_uri_scheme, supported_namespaces,
};

/// Options of [`SedDocument::from_xml_string_with`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReadOptions {
    /// Treat unknown elements and attributes as errors instead of skipping them.
    pub strict: bool,
}

/// Options of [`SedDocument::to_xml_string_with`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteOptions {
    /// Number of spaces per nesting level. Zero writes every element on its own line
    /// without indentation.
    pub indent: usize,
    /// Emit the `<?xml ...?>` declaration.
    pub xml_declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            indent: 2,
            xml_declaration: true,
        }
    }
}

/// An error found while reading SED-ML (or MathML) XML, with its source location.
///
/// `line` and `column` are 1-based, or `0` if the location is unknown.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[error("line {line}:{column}: {message}")]
pub struct SedXmlError {
    pub code: SedErrorCode,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl SedXmlError {
    #[must_use]
    pub fn new(code: SedErrorCode, message: impl Into<String>) -> SedXmlError {
        SedXmlError {
            code,
            message: message.into(),
            line: 0,
            column: 0,
        }
    }

    /// Attach a location, unless one is already known.
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> SedXmlError {
        if self.line == 0 {
            self.line = line;
            self.column = column;
        }
        self
    }

    /// Attach the location of an XML node, unless a location is already known.
    #[must_use]
    pub(crate) fn at_node(self, node: roxmltree::Node<'_, '_>) -> SedXmlError {
        let position = node.document().text_pos_at(node.range().start);
        self.at(position.row, position.col)
    }

    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        self.code
    }
}

impl From<SedXmlError> for SedError {
    fn from(value: SedXmlError) -> Self {
        SedError::new(value.code, value.message).at(value.line, value.column)
    }
}

/// Errors of reading or writing SED-ML files.
#[derive(Error, Debug)]
pub enum SedFileError {
    #[error("Cannot access `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Xml(#[from] SedXmlError),
}

impl SedDocument {
    /// Read a document from a SED-ML XML string, using the default [`ReadOptions`].
    pub fn from_xml_string(xml: &str) -> Result<SedDocument, SedXmlError> {
        SedDocument::from_xml_string_with(xml, &ReadOptions::default())
    }

    /// Read a document from a SED-ML XML string.
    pub fn from_xml_string_with(
        xml: &str,
        options: &ReadOptions,
    ) -> Result<SedDocument, SedXmlError> {
        reader::read_document(xml, options)
    }

    /// Read a document from a SED-ML file, using the default [`ReadOptions`].
    pub fn from_xml_file(path: impl AsRef<Path>) -> Result<SedDocument, SedFileError> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|source| SedFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Read {} bytes from `{}`.", xml.len(), path.display());
        Ok(SedDocument::from_xml_string(&xml)?)
    }

    /// Write this document as a SED-ML XML string, using the default [`WriteOptions`].
    #[must_use]
    pub fn to_xml_string(&self) -> String {
        self.to_xml_string_with(&WriteOptions::default())
    }

    /// Write this document as a SED-ML XML string.
    #[must_use]
    pub fn to_xml_string_with(&self, options: &WriteOptions) -> String {
        writer::write_document(self, options)
    }

    /// Write this document into a SED-ML file, using the default [`WriteOptions`].
    pub fn write_xml_file(&self, path: impl AsRef<Path>) -> Result<(), SedFileError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_xml_string()).map_err(|source| SedFileError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{SedDocument, Validation};
    use test_generator::test_resources;

    /// Read a sample document, check that it survives writing to XML and JSON, and return it.
    fn read_and_round_trip(path: &str) -> SedDocument {
        let document = SedDocument::from_xml_file(path)
            .unwrap_or_else(|e| panic!("Failed to read `{path}`: {e}"));

        let xml = document.to_xml_string();
        let from_xml = SedDocument::from_xml_string(&xml)
            .unwrap_or_else(|e| panic!("Failed to re-read `{path}`: {e}\n{xml}"));
        assert_eq!(from_xml, document, "XML round trip of `{path}`");

        let json = document.to_json_string().unwrap();
        let from_json = SedDocument::from_json_string(&json).unwrap();
        assert_eq!(from_json, document, "JSON round trip of `{path}`");
        document
    }

    #[test_resources("models/*.sedml")]
    fn valid_documents(path: &str) {
        let document = read_and_round_trip(path);
        let issues = document.check();
        assert!(issues.is_empty(), "Unexpected issues in `{path}`: {issues:?}");
        assert!(document.validate().is_ok());
    }

    #[test_resources("models/invalid/*.sedml")]
    fn invalid_documents(path: &str) {
        let content = std::fs::read_to_string(path).unwrap();
        let expected = content
            .lines()
            .find_map(|line| line.trim().strip_prefix("<!-- expected-errors:"))
            .and_then(|rest| rest.trim_end_matches("-->").trim().parse::<usize>().ok())
            .unwrap_or_else(|| panic!("`{path}` does not declare its expected errors"));

        let document = read_and_round_trip(path);
        let issues = document.check();
        assert_eq!(issues.len(), expected, "Issues of `{path}`: {issues:#?}");
        assert!(issues.iter().all(|issue| issue.is_error()));
    }

    #[test]
    fn missing_file() {
        let error = SedDocument::from_xml_file("models/does-not-exist.sedml").unwrap_err();
        assert!(matches!(error, crate::SedFileError::Io { .. }));
    }
}
