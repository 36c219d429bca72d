//! Content blocks handed out by the document layer.

use crate::error::{Error, Result};
use crate::oxml::{self, OxmlElement};
use crate::parts::{Document, PartKind};
use crate::xml::{NodeId, XmlTree};

/// A paragraph located in one part of a [`Document`].
///
/// This is a plain handle; reading through it requires the document that
/// owns the part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Paragraph {
    pub part: PartKind,
    pub node: NodeId,
}

impl Paragraph {
    pub fn new(part: PartKind, node: NodeId) -> Self {
        Self { part, node }
    }

    /// The `w:p` element behind this handle.
    pub fn element(&self) -> oxml::Paragraph {
        oxml::Paragraph(self.node)
    }

    fn tree<'d>(&self, doc: &'d Document) -> Result<&'d XmlTree> {
        doc.tree(self.part)
            .ok_or_else(|| Error::Constraint(format!("document has no {:?} part", self.part)))
    }

    pub fn text(&self, doc: &Document) -> Result<String> {
        let tree = self.tree(doc)?;
        oxml::Paragraph::try_wrap(tree, self.node)?.text(tree)
    }

    /// Paragraph style id, if one is set.
    pub fn style(&self, doc: &Document) -> Result<Option<String>> {
        let tree = self.tree(doc)?;
        oxml::Paragraph::try_wrap(tree, self.node)?.style(tree)
    }

    pub fn run_count(&self, doc: &Document) -> Result<usize> {
        let tree = self.tree(doc)?;
        Ok(oxml::Paragraph::try_wrap(tree, self.node)?.runs(tree)?.len())
    }
}
