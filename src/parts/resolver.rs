//! Resolution of note references to note content.
//!
//! A [`NotesIndex`] maps note ids to direct notes, separately for footnotes
//! and endnotes. A reference's `w:id` is looked up twice at most: first as
//! the exact string written in the document, then coerced to an integer.
//! The second attempt catches ids that differ only in formatting, such as
//! `"03"` against `"3"` or surrounding whitespace.
//!
//! [`NoteResolver`] keeps one index alive across many resolutions and
//! rebuilds it when [`Document::notes_version`] moves.

use std::collections::HashMap;

use super::NoteKind;
use super::document::{DirectNote, Document};
use super::notes::Note;
use crate::error::{Error, Result};
use crate::oxml::SimpleType;
use crate::text::Paragraph;

/// Direct notes keyed by collection and id.
#[derive(Debug, Clone)]
pub struct NotesIndex {
    version: u64,
    notes: Vec<DirectNote>,
    by_raw: HashMap<(NoteKind, String), usize>,
    by_id: HashMap<(NoteKind, i64), usize>,
}

impl NotesIndex {
    /// Index every direct note of `doc`.
    ///
    /// When two notes of one kind share an id, the later one wins.
    pub fn build(doc: &Document) -> Result<Self> {
        let notes = doc.all_direct_notes()?;
        let mut by_raw = HashMap::new();
        let mut by_id = HashMap::new();
        for (i, note) in notes.iter().enumerate() {
            if let Some(raw) = &note.raw_id {
                by_raw.insert((note.kind, raw.clone()), i);
            }
            if let Some(id) = note.id {
                by_id.insert((note.kind, id), i);
            }
        }
        log::debug!(
            "built notes index: {} notes at version {}",
            notes.len(),
            doc.notes_version()
        );
        Ok(Self {
            version: doc.notes_version(),
            notes,
            by_raw,
            by_id,
        })
    }

    /// The document notes version this index was built from.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_current(&self, doc: &Document) -> bool {
        self.version == doc.notes_version()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn notes(&self) -> &[DirectNote] {
        &self.notes
    }

    /// Direct note with an integer id.
    pub fn get(&self, kind: NoteKind, id: i64) -> Option<&DirectNote> {
        self.by_id.get(&(kind, id)).map(|&i| &self.notes[i])
    }

    /// Direct note for a raw reference id: exact string first, then the id
    /// coerced to an integer.
    pub fn lookup(&self, kind: NoteKind, raw_id: &str) -> Result<&DirectNote> {
        if let Some(&i) = self.by_raw.get(&(kind, raw_id.to_string())) {
            return Ok(&self.notes[i]);
        }
        i64::from_xml(raw_id)
            .ok()
            .and_then(|id| self.get(kind, id))
            .ok_or_else(|| Error::Lookup {
                id: raw_id.to_string(),
                kind,
            })
    }

    /// Paragraphs of the note a reference points at.
    pub fn resolve(&self, kind: NoteKind, raw_id: &str) -> Result<&[Paragraph]> {
        self.lookup(kind, raw_id).map(|note| note.paragraphs.as_slice())
    }
}

/// A note index cache that outlives individual [`Note`] proxies.
#[derive(Debug, Default)]
pub struct NoteResolver {
    index: Option<NotesIndex>,
    builds: usize,
}

impl NoteResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current index for `doc`, rebuilt if the notes changed since it was
    /// built.
    pub fn index(&mut self, doc: &Document) -> Result<&NotesIndex> {
        let stale = self.index.as_ref().is_none_or(|index| !index.is_current(doc));
        if stale {
            log::trace!("rebuilding notes index at version {}", doc.notes_version());
            self.index = Some(NotesIndex::build(doc)?);
            self.builds += 1;
        }
        self.index
            .as_ref()
            .ok_or_else(|| Error::Constraint("notes index unavailable".to_string()))
    }

    /// Paragraphs of a note. Direct notes resolve to their own content
    /// without consulting the index.
    pub fn resolve(&mut self, doc: &Document, note: &Note<'_>) -> Result<Vec<Paragraph>> {
        if !note.is_reference() {
            return Ok(note.paragraphs()?.to_vec());
        }
        let raw = note
            .raw_id()
            .ok_or_else(|| Error::Constraint(format!("{} reference without an id", note.kind())))?;
        self.resolve_id(doc, note.kind(), raw)
    }

    /// Paragraphs of the note with `raw_id` in the `kind` collection.
    pub fn resolve_id(&mut self, doc: &Document, kind: NoteKind, raw_id: &str) -> Result<Vec<Paragraph>> {
        Ok(self.index(doc)?.resolve(kind, raw_id)?.to_vec())
    }

    /// How many times the index has been built.
    pub fn builds(&self) -> usize {
        self.builds
    }
}
