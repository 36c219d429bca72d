//! Namespace-qualified names and the fixed namespace table.

use std::fmt;

use crate::error::{Error, Result};

/// WordprocessingML main namespace.
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Office document relationships.
pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// DrawingML WordprocessingML drawing.
pub const WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
/// DrawingML main.
pub const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// DrawingML picture.
pub const PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
/// Markup compatibility.
pub const MC: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
/// Word 2010 extensions.
pub const W14: &str = "http://schemas.microsoft.com/office/word/2010/wordml";
/// The reserved `xml` namespace.
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Known prefix → namespace URI pairs, in serialization order.
pub const NAMESPACES: &[(&str, &str)] = &[
    ("w", W),
    ("r", R),
    ("wp", WP),
    ("a", A),
    ("pic", PIC),
    ("mc", MC),
    ("w14", W14),
    ("xml", XML),
];

/// Look up the namespace URI for a known prefix.
pub fn namespace_uri(prefix: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| *uri)
}

/// Look up the conventional prefix for a known namespace URI.
pub fn known_prefix(uri: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(_, u)| *u == uri)
        .map(|(p, _)| *p)
}

/// A borrowed namespace-qualified name.
///
/// An empty `ns` means "no namespace" (unprefixed attributes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName<'a> {
    pub ns: &'a str,
    pub local: &'a str,
}

impl<'a> QName<'a> {
    pub const fn new(ns: &'a str, local: &'a str) -> Self {
        Self { ns, local }
    }

    /// Name in the WordprocessingML main namespace.
    pub const fn w(local: &'a str) -> Self {
        Self::new(W, local)
    }

    /// Name without a namespace.
    pub const fn local(local: &'a str) -> Self {
        Self::new("", local)
    }

    pub fn to_owned_name(self) -> Name {
        Name {
            ns: self.ns.into(),
            local: self.local.into(),
        }
    }
}

impl fmt::Display for QName<'_> {
    /// `w:p` for known namespaces, Clark notation (`{uri}local`) otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ns.is_empty() {
            return f.write_str(self.local);
        }
        match known_prefix(self.ns) {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{{{}}}{}", self.ns, self.local),
        }
    }
}

/// Resolve a prefixed tag such as `"w:footnote"` against the known namespaces.
///
/// Unprefixed tags resolve to no namespace.
pub fn qn(tag: &str) -> Result<QName<'_>> {
    match tag.split_once(':') {
        Some((prefix, local)) => {
            let ns =
                namespace_uri(prefix).ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))?;
            Ok(QName::new(ns, local))
        }
        None => Ok(QName::local(tag)),
    }
}

/// An owned namespace-qualified name, as stored in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub ns: Box<str>,
    pub local: Box<str>,
}

impl Name {
    pub fn as_qname(&self) -> QName<'_> {
        QName::new(&self.ns, &self.local)
    }

    pub fn matches(&self, name: QName<'_>) -> bool {
        &*self.local == name.local && &*self.ns == name.ns
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_qname().fmt(f)
    }
}

impl From<QName<'_>> for Name {
    fn from(name: QName<'_>) -> Self {
        name.to_owned_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qn_resolves_known_prefix() {
        let name = qn("w:footnote").unwrap();
        assert_eq!(name, QName::w("footnote"));
        assert_eq!(name.to_string(), "w:footnote");
    }

    #[test]
    fn test_qn_unknown_prefix() {
        assert!(matches!(qn("zz:thing"), Err(Error::UnknownPrefix(p)) if p == "zz"));
    }

    #[test]
    fn test_qn_unprefixed() {
        assert_eq!(qn("id").unwrap(), QName::local("id"));
    }

    #[test]
    fn test_display_unknown_namespace_uses_clark_notation() {
        let name = QName::new("urn:example", "thing");
        assert_eq!(name.to_string(), "{urn:example}thing");
    }

    #[test]
    fn test_owned_name_matches() {
        let name = QName::w("p").to_owned_name();
        assert!(name.matches(QName::w("p")));
        assert!(!name.matches(QName::new(R, "p")));
    }
}
