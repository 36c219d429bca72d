//! Error types for docx-oxml operations.

use thiserror::Error;

use crate::parts::NoteKind;

/// Errors that can occur while reading, editing or classifying document content.
#[derive(Error, Debug)]
pub enum Error {
    /// An operation the element's content model forbids.
    #[error("content model violation: {0}")]
    Constraint(String),

    /// An attribute value present in the tree does not match its declared type.
    #[error("invalid value {value:?} for attribute {attribute}: expected {expected}")]
    Parse {
        attribute: String,
        value: String,
        expected: &'static str,
    },

    /// A note reference whose id has no matching note in its collection.
    #[error("no {kind} with id {id}")]
    Lookup { id: String, kind: NoteKind },

    /// Sniffing matched no registered image format.
    #[error("unrecognized image format (header {})", hex_prefix(.prefix))]
    UnrecognizedFormat { prefix: Vec<u8> },

    #[error("invalid image stream: {0}")]
    InvalidImage(String),

    #[error("invalid path query: {0}")]
    InvalidQuery(String),

    #[error("unknown namespace prefix: {0}")]
    UnknownPrefix(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Well-formed input that is still not a usable XML part.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
}

pub type Result<T> = std::result::Result<T, Error>;

fn hex_prefix(prefix: &[u8]) -> String {
    prefix
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_format_shows_prefix() {
        let err = Error::UnrecognizedFormat {
            prefix: vec![0x00, 0xAB, 0x10],
        };
        assert_eq!(
            err.to_string(),
            "unrecognized image format (header 00 ab 10)"
        );
    }

    #[test]
    fn test_lookup_names_collection() {
        let err = Error::Lookup {
            id: "99".to_string(),
            kind: NoteKind::Footnote,
        };
        assert_eq!(err.to_string(), "no footnote with id 99");
    }
}
