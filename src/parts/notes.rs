//! Notes parts and the [`Note`] proxy.

use std::cell::OnceCell;

use super::document::Document;
use super::resolver::NotesIndex;
use super::{NoteKind, PartKind};
use crate::error::{Error, Result};
use crate::oxml::{
    EndnoteReference, Endnotes, FootnoteReference, Footnotes, NoteElement, NoteReferenceElement,
    NoteType, NotesRoot, OxmlElement,
};
use crate::text::Paragraph;
use crate::xml::{self, NodeId, QName, XmlTree};

/// A footnotes or endnotes part.
#[derive(Debug, Clone)]
pub struct NotesPart {
    kind: NoteKind,
    tree: XmlTree,
}

impl NotesPart {
    /// An empty part of the given kind.
    pub fn new(kind: NoteKind) -> Self {
        let root = match kind {
            NoteKind::Footnote => Footnotes::schema().tag,
            NoteKind::Endnote => Endnotes::schema().tag,
        };
        Self {
            kind,
            tree: XmlTree::new(root),
        }
    }

    /// Parse `footnotes.xml` or `endnotes.xml`, checking the root element
    /// matches `kind`.
    pub fn from_xml(kind: NoteKind, bytes: &[u8]) -> Result<Self> {
        let tree = xml::parse(bytes)?;
        match kind {
            NoteKind::Footnote => Footnotes::try_wrap(&tree, tree.root()).map(|_| ())?,
            NoteKind::Endnote => Endnotes::try_wrap(&tree, tree.root()).map(|_| ())?,
        }
        Ok(Self { kind, tree })
    }

    pub fn kind(&self) -> NoteKind {
        self.kind
    }

    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut XmlTree {
        &mut self.tree
    }

    pub fn to_xml(&self) -> String {
        xml::to_xml(&self.tree)
    }

    /// Every direct note element, in document order.
    pub fn note_nodes(&self) -> Result<Vec<NodeId>> {
        let root = self.tree.root();
        Ok(match self.kind {
            NoteKind::Footnote => nodes(Footnotes(root).footnote_lst(&self.tree)?),
            NoteKind::Endnote => nodes(Endnotes(root).endnote_lst(&self.tree)?),
        })
    }

    /// Append a note holding `text` in a single paragraph; returns its id.
    pub fn add_note(&mut self, text: &str) -> Result<i64> {
        match self.kind {
            NoteKind::Footnote => add_note_to(Footnotes(self.tree.root()), &mut self.tree, text),
            NoteKind::Endnote => add_note_to(Endnotes(self.tree.root()), &mut self.tree, text),
        }
    }
}

fn nodes<E: OxmlElement>(elements: Vec<E>) -> Vec<NodeId> {
    elements.into_iter().map(OxmlElement::node).collect()
}

fn add_note_to<R: NotesRoot>(root: R, tree: &mut XmlTree, text: &str) -> Result<i64> {
    let note = root.add_note(tree)?;
    let id = note
        .id(tree)?
        .ok_or_else(|| Error::Constraint("new note has no id".to_string()))?;
    if let Some(paragraph) = note.paragraphs(tree)?.first() {
        let run = paragraph.add_run(tree)?;
        run.add_text(tree, text)?;
    }
    Ok(id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Direct,
    Reference,
}

/// A proxy over a footnote, an endnote, or a reference to one.
///
/// Asking a reference for its paragraphs resolves it to the direct note with
/// the same id in the same collection. The resolved paragraphs and the index
/// used to find them are cached on the proxy for its whole life; the proxy
/// borrows the document, so the notes cannot change underneath it.
#[derive(Debug)]
pub struct Note<'d> {
    doc: &'d Document,
    kind: NoteKind,
    node: NodeId,
    role: Role,
    paragraphs: OnceCell<Vec<Paragraph>>,
    index: OnceCell<NotesIndex>,
}

impl<'d> Note<'d> {
    pub(crate) fn direct(doc: &'d Document, kind: NoteKind, node: NodeId) -> Self {
        Self::with_role(doc, kind, node, Role::Direct)
    }

    pub(crate) fn reference(doc: &'d Document, kind: NoteKind, node: NodeId) -> Self {
        Self::with_role(doc, kind, node, Role::Reference)
    }

    fn with_role(doc: &'d Document, kind: NoteKind, node: NodeId, role: Role) -> Self {
        Self {
            doc,
            kind,
            node,
            role,
            paragraphs: OnceCell::new(),
            index: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> NoteKind {
        self.kind
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_reference(&self) -> bool {
        self.role == Role::Reference
    }

    /// Part holding the underlying element.
    pub fn part(&self) -> PartKind {
        match self.role {
            Role::Direct => PartKind::Notes(self.kind),
            Role::Reference => PartKind::Main,
        }
    }

    fn tree(&self) -> Result<&'d XmlTree> {
        self.doc
            .tree(self.part())
            .ok_or_else(|| Error::Constraint(format!("document has no {} part", self.kind)))
    }

    /// Local element name: `footnote`, `endnote`, `footnoteReference` or
    /// `endnoteReference`.
    pub fn name(&self) -> &'d str {
        self.tree()
            .ok()
            .and_then(|tree| tree.name(self.node))
            .map(|name| name.local)
            .unwrap_or_default()
    }

    /// The `w:id` attribute exactly as written.
    pub fn raw_id(&self) -> Option<&'d str> {
        self.tree().ok()?.attribute(self.node, QName::w("id"))
    }

    /// Typed note id. References always have one; direct notes may not.
    pub fn id(&self) -> Result<Option<i64>> {
        let tree = self.tree()?;
        match (self.role, self.kind) {
            (Role::Direct, NoteKind::Footnote) => crate::oxml::Footnote(self.node).id(tree),
            (Role::Direct, NoteKind::Endnote) => crate::oxml::Endnote(self.node).id(tree),
            (Role::Reference, NoteKind::Footnote) => FootnoteReference(self.node).id(tree).map(Some),
            (Role::Reference, NoteKind::Endnote) => EndnoteReference(self.node).id(tree).map(Some),
        }
    }

    /// Role of a direct note. References have none.
    pub fn note_type(&self) -> Result<Option<NoteType>> {
        let tree = self.tree()?;
        match (self.role, self.kind) {
            (Role::Reference, _) => Ok(None),
            (Role::Direct, NoteKind::Footnote) => crate::oxml::Footnote(self.node).note_type(tree),
            (Role::Direct, NoteKind::Endnote) => crate::oxml::Endnote(self.node).note_type(tree),
        }
    }

    /// The index this proxy resolves against, built on first use.
    pub fn index(&self) -> Result<&NotesIndex> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let built = NotesIndex::build(self.doc)?;
        Ok(self.index.get_or_init(|| built))
    }

    /// Paragraphs of the note, resolving a reference to its target first.
    pub fn paragraphs(&self) -> Result<&[Paragraph]> {
        if let Some(paragraphs) = self.paragraphs.get() {
            return Ok(paragraphs);
        }
        let resolved = match self.role {
            Role::Direct => self.own_paragraphs()?,
            Role::Reference => {
                let raw = self.raw_id().ok_or_else(|| {
                    Error::Constraint(format!("{} reference without an id", self.kind))
                })?;
                self.index()?.resolve(self.kind, raw)?.to_vec()
            }
        };
        Ok(self.paragraphs.get_or_init(|| resolved))
    }

    fn own_paragraphs(&self) -> Result<Vec<Paragraph>> {
        let tree = self.tree()?;
        Ok(tree
            .children_by_tag(self.node, QName::w("p"))
            .map(|p| Paragraph::new(self.part(), p))
            .collect())
    }

    /// The direct note this proxy stands for: itself for a direct note, the
    /// resolved target for a reference.
    pub fn target(&self) -> Result<Note<'d>> {
        match self.role {
            Role::Direct => Ok(Note::direct(self.doc, self.kind, self.node)),
            Role::Reference => {
                let raw = self.raw_id().ok_or_else(|| {
                    Error::Constraint(format!("{} reference without an id", self.kind))
                })?;
                let found = self.index()?.lookup(self.kind, raw)?;
                Ok(Note::direct(self.doc, self.kind, found.element))
            }
        }
    }

    /// Text of every paragraph, one line each.
    pub fn text(&self) -> Result<String> {
        let mut lines = Vec::new();
        for paragraph in self.paragraphs()? {
            lines.push(paragraph.text(self.doc)?);
        }
        Ok(lines.join("\n"))
    }
}
