//! The main document part and the document aggregate.

use std::sync::atomic::{AtomicU64, Ordering};

use super::notes::{Note, NotesPart};
use super::{NoteKind, PartKind};
use crate::error::{Error, Result};
use crate::oxml::element::define_element;
use crate::oxml::schema::{ChildSpec, ElementSchema};
use crate::oxml::{
    Body, Endnote, EndnoteReference, Footnote, FootnoteReference, OxmlElement,
    Paragraph as ParagraphElement, Run, SimpleType,
};
use crate::text::Paragraph;
use crate::xml::{self, NodeId, QName, XmlTree};

/// Source of notes versions. Shared by every document in the process, so
/// a version identifies one state of one document.
static NOTES_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_notes_version() -> u64 {
    NOTES_GENERATION.fetch_add(1, Ordering::Relaxed)
}

pub static DOCUMENT: ElementSchema = ElementSchema {
    tag: QName::w("document"),
    children: &[ChildSpec::zero_or_one(QName::w("body"))],
    attributes: &[],
};

define_element! {
    /// `<w:document>`: root of the main document part.
    pub struct DocumentElement => DOCUMENT;
}

/// The main document part (`word/document.xml`).
#[derive(Debug, Clone)]
pub struct DocumentPart {
    tree: XmlTree,
}

impl DocumentPart {
    /// An empty document with a body.
    pub fn new() -> Self {
        let mut tree = XmlTree::new(DOCUMENT.tag);
        let body = tree.create_element(QName::w("body"));
        tree.append_child(tree.root(), body);
        Self { tree }
    }

    /// Parse `document.xml`, checking the root element.
    pub fn from_xml(bytes: &[u8]) -> Result<Self> {
        let tree = xml::parse(bytes)?;
        DocumentElement::try_wrap(&tree, tree.root())?;
        Ok(Self { tree })
    }

    pub fn element(&self) -> DocumentElement {
        DocumentElement(self.tree.root())
    }

    /// The `w:body`, created if missing.
    pub fn body(&mut self) -> Result<Body> {
        self.element().get_or_add(&mut self.tree)
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
}

impl Default for DocumentPart {
    fn default() -> Self {
        Self::new()
    }
}

/// One direct note as seen by the reference resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectNote {
    pub kind: NoteKind,
    /// The id as an integer, when it parses as one.
    pub id: Option<i64>,
    /// The `w:id` attribute exactly as written.
    pub raw_id: Option<String>,
    pub element: NodeId,
    pub paragraphs: Vec<Paragraph>,
}

/// A document: the main part plus its optional notes parts.
///
/// Every mutable access to a notes part gives [`Document::notes_version`]
/// a fresh value, which is how cached note indexes detect that they are
/// stale. Versions are drawn from a process-wide counter and a clone gets
/// its own, so an index built for one document never passes as current for
/// another.
#[derive(Debug)]
pub struct Document {
    main: DocumentPart,
    footnotes: Option<NotesPart>,
    endnotes: Option<NotesPart>,
    notes_version: u64,
}

impl Document {
    pub fn new(main: DocumentPart) -> Self {
        Self {
            main,
            footnotes: None,
            endnotes: None,
            notes_version: next_notes_version(),
        }
    }

    /// Attach a notes part, replacing any existing part of the same kind.
    pub fn with_notes(mut self, part: NotesPart) -> Self {
        self.set_notes_part(part);
        self
    }

    pub fn set_notes_part(&mut self, part: NotesPart) {
        self.notes_version = next_notes_version();
        match part.kind() {
            NoteKind::Footnote => self.footnotes = Some(part),
            NoteKind::Endnote => self.endnotes = Some(part),
        }
    }

    pub fn main(&self) -> &DocumentPart {
        &self.main
    }

    pub fn main_mut(&mut self) -> &mut DocumentPart {
        &mut self.main
    }

    pub fn notes_part(&self, kind: NoteKind) -> Option<&NotesPart> {
        match kind {
            NoteKind::Footnote => self.footnotes.as_ref(),
            NoteKind::Endnote => self.endnotes.as_ref(),
        }
    }

    /// Mutable access to a notes part; counts as a change to the notes.
    pub fn notes_part_mut(&mut self, kind: NoteKind) -> Option<&mut NotesPart> {
        self.notes_version = next_notes_version();
        match kind {
            NoteKind::Footnote => self.footnotes.as_mut(),
            NoteKind::Endnote => self.endnotes.as_mut(),
        }
    }

    pub fn footnotes_part(&self) -> Option<&NotesPart> {
        self.notes_part(NoteKind::Footnote)
    }

    pub fn endnotes_part(&self) -> Option<&NotesPart> {
        self.notes_part(NoteKind::Endnote)
    }

    /// Stamp of the current notes state, unique within the process.
    pub fn notes_version(&self) -> u64 {
        self.notes_version
    }

    /// The tree backing a part, if the document has that part.
    pub fn tree(&self, part: PartKind) -> Option<&XmlTree> {
        match part {
            PartKind::Main => Some(self.main.tree()),
            PartKind::Notes(kind) => self.notes_part(kind).map(NotesPart::tree),
        }
    }

    /// Every direct note, footnotes first, each in document order.
    pub fn all_direct_notes(&self) -> Result<Vec<DirectNote>> {
        let mut out = Vec::new();
        for part in [&self.footnotes, &self.endnotes].into_iter().flatten() {
            let kind = part.kind();
            let tree = part.tree();
            for node in part.note_nodes()? {
                let raw_id = tree.attribute(node, QName::w("id"));
                let paragraphs = tree
                    .children_by_tag(node, QName::w("p"))
                    .map(|p| Paragraph::new(PartKind::Notes(kind), p))
                    .collect();
                out.push(DirectNote {
                    kind,
                    id: raw_id.and_then(|raw| i64::from_xml(raw).ok()),
                    raw_id: raw_id.map(str::to_string),
                    element: node,
                    paragraphs,
                });
            }
        }
        log::debug!("collected {} direct notes", out.len());
        Ok(out)
    }

    /// Every direct note as a proxy, footnotes first.
    pub fn notes(&self) -> Result<Vec<Note<'_>>> {
        let mut out = Vec::new();
        for part in [&self.footnotes, &self.endnotes].into_iter().flatten() {
            for node in part.note_nodes()? {
                out.push(Note::direct(self, part.kind(), node));
            }
        }
        Ok(out)
    }

    /// Every footnote and endnote reference in the main story, in document order.
    pub fn note_references(&self) -> Result<Vec<Note<'_>>> {
        let tree = self.main.tree();
        let refs = tree
            .descendants(tree.root())
            .filter_map(|node| {
                if FootnoteReference::wrap(tree, node).is_some() {
                    Some(Note::reference(self, NoteKind::Footnote, node))
                } else if EndnoteReference::wrap(tree, node).is_some() {
                    Some(Note::reference(self, NoteKind::Endnote, node))
                } else {
                    None
                }
            })
            .collect();
        Ok(refs)
    }

    /// Add a note of `kind` whose text is `text`, and mark it with a
    /// reference in a new run at the end of `paragraph`.
    ///
    /// Creates the notes part when the document has none. Returns the id
    /// of the new note.
    pub fn add_note(&mut self, kind: NoteKind, paragraph: ParagraphElement, text: &str) -> Result<i64> {
        if self.notes_part(kind).is_none() {
            self.set_notes_part(NotesPart::new(kind));
        }
        let part = self
            .notes_part_mut(kind)
            .ok_or_else(|| Error::Constraint(format!("document has no {kind} part")))?;
        let id = part.add_note(text)?;

        let tree = self.main.tree_mut();
        let run: Run = paragraph.add_run(tree)?;
        match kind {
            NoteKind::Footnote => run.add_footnote_reference(tree, id).map(|_| ())?,
            NoteKind::Endnote => run.add_endnote_reference(tree, id).map(|_| ())?,
        }
        Ok(id)
    }

    /// Check every direct note against its content model.
    pub fn validate_notes(&self) -> Result<()> {
        for note in self.all_direct_notes()? {
            let Some(tree) = self.tree(PartKind::Notes(note.kind)) else {
                continue;
            };
            match note.kind {
                NoteKind::Footnote => Footnote::try_wrap(tree, note.element)?.validate(tree)?,
                NoteKind::Endnote => Endnote::try_wrap(tree, note.element)?.validate(tree)?,
            }
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DocumentPart::default())
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            main: self.main.clone(),
            footnotes: self.footnotes.clone(),
            endnotes: self.endnotes.clone(),
            notes_version: next_notes_version(),
        }
    }
}
