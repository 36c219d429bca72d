//! Document parts and the note proxy layer.
//!
//! A [`Document`] owns the main document tree plus the optional footnotes
//! and endnotes parts. Footnote and endnote content is reached through
//! [`Note`] proxies, which resolve reference marks to the direct note they
//! point at using a [`NotesIndex`].

mod document;
mod notes;
pub mod resolver;

pub use crate::oxml::NoteKind;
pub use document::{DirectNote, Document, DocumentPart};
pub use notes::{Note, NotesPart};
pub use resolver::{NoteResolver, NotesIndex};

/// Which part of a [`Document`] a node lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// The main document story (`word/document.xml`).
    Main,
    /// A notes part (`word/footnotes.xml` or `word/endnotes.xml`).
    Notes(NoteKind),
}

impl PartKind {
    /// Conventional part name inside a package.
    pub fn part_name(self) -> &'static str {
        match self {
            PartKind::Main => "/word/document.xml",
            PartKind::Notes(NoteKind::Footnote) => "/word/footnotes.xml",
            PartKind::Notes(NoteKind::Endnote) => "/word/endnotes.xml",
        }
    }
}
