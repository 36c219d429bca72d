//! Footnote and endnote element types.
//!
//! Both collections share one shape: a root (`w:footnotes`/`w:endnotes`)
//! holding direct notes, each with an id, an optional role and a list of
//! paragraphs. Reference marks in running text (`w:footnoteReference`/
//! `w:endnoteReference`) carry only the id of the note they point at.

use std::fmt;

use super::element::{OxmlElement, define_element};
use super::schema::{AttrKind, AttrSpec, ChildSpec, ElementSchema};
use super::simpletypes::NoteType;
use super::text::Paragraph;
use crate::error::Result;
use crate::xml::{QName, XmlTree};

const ID: QName<'static> = QName::w("id");
const TYPE: QName<'static> = QName::w("type");
const CUSTOM_MARK_FOLLOWS: QName<'static> = QName::w("customMarkFollows");

/// Which note collection an element belongs to. Ids are unique per kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
pub enum NoteKind {
    Footnote,
    Endnote,
}

impl NoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteKind::Footnote => "footnote",
            NoteKind::Endnote => "endnote",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Schemas
// ============================================================================

pub static FOOTNOTES: ElementSchema = ElementSchema {
    tag: QName::w("footnotes"),
    children: &[ChildSpec::zero_or_more(QName::w("footnote"))],
    attributes: &[],
};

pub static ENDNOTES: ElementSchema = ElementSchema {
    tag: QName::w("endnotes"),
    children: &[ChildSpec::zero_or_more(QName::w("endnote"))],
    attributes: &[],
};

const NOTE_CHILDREN: &[ChildSpec] = &[
    ChildSpec::zero_or_one(QName::w("rPr")),
    ChildSpec::zero_or_more(QName::w("p")),
];

const NOTE_ATTRIBUTES: &[AttrSpec] = &[
    AttrSpec::optional(TYPE, AttrKind::Token(NoteType::TOKENS)),
    AttrSpec::optional(ID, AttrKind::Int),
];

pub static FOOTNOTE: ElementSchema = ElementSchema {
    tag: QName::w("footnote"),
    children: NOTE_CHILDREN,
    attributes: NOTE_ATTRIBUTES,
};

pub static ENDNOTE: ElementSchema = ElementSchema {
    tag: QName::w("endnote"),
    children: NOTE_CHILDREN,
    attributes: NOTE_ATTRIBUTES,
};

const REFERENCE_ATTRIBUTES: &[AttrSpec] = &[
    AttrSpec::required(ID, AttrKind::Int),
    AttrSpec::optional(CUSTOM_MARK_FOLLOWS, AttrKind::Bool),
];

pub static FOOTNOTE_REFERENCE: ElementSchema = ElementSchema {
    tag: QName::w("footnoteReference"),
    children: &[],
    attributes: REFERENCE_ATTRIBUTES,
};

pub static ENDNOTE_REFERENCE: ElementSchema = ElementSchema {
    tag: QName::w("endnoteReference"),
    children: &[],
    attributes: REFERENCE_ATTRIBUTES,
};

define_element! {
    /// `<w:footnotes>`: root of the footnotes part.
    pub struct Footnotes => FOOTNOTES;
}

define_element! {
    /// `<w:endnotes>`: root of the endnotes part.
    pub struct Endnotes => ENDNOTES;
}

define_element! {
    /// `<w:footnote>`
    pub struct Footnote => FOOTNOTE;
}

define_element! {
    /// `<w:endnote>`
    pub struct Endnote => ENDNOTE;
}

define_element! {
    /// `<w:footnoteReference>`
    pub struct FootnoteReference => FOOTNOTE_REFERENCE;
}

define_element! {
    /// `<w:endnoteReference>`
    pub struct EndnoteReference => ENDNOTE_REFERENCE;
}

// ============================================================================
// Shared behavior
// ============================================================================

/// A direct note: `w:footnote` or `w:endnote`.
pub trait NoteElement: OxmlElement {
    const KIND: NoteKind;

    fn id(self, tree: &XmlTree) -> Result<Option<i64>> {
        self.attr(tree, ID)
    }

    fn set_id(self, tree: &mut XmlTree, id: Option<i64>) -> Result<()> {
        self.set_attr(tree, ID, id.as_ref())
    }

    /// The raw `w:id` string, before integer parsing.
    fn raw_id(self, tree: &XmlTree) -> Option<&str> {
        tree.attribute(self.node(), ID)
    }

    /// Role of the note; `None` means an ordinary note.
    fn note_type(self, tree: &XmlTree) -> Result<Option<NoteType>> {
        self.attr(tree, TYPE)
    }

    fn set_note_type(self, tree: &mut XmlTree, value: Option<NoteType>) -> Result<()> {
        self.set_attr(tree, TYPE, value.as_ref())
    }

    fn paragraphs(self, tree: &XmlTree) -> Result<Vec<Paragraph>> {
        self.children(tree)
    }

    fn add_paragraph(self, tree: &mut XmlTree) -> Result<Paragraph> {
        self.add(tree)
    }
}

impl NoteElement for Footnote {
    const KIND: NoteKind = NoteKind::Footnote;
}

impl NoteElement for Endnote {
    const KIND: NoteKind = NoteKind::Endnote;
}

/// A reference mark: `w:footnoteReference` or `w:endnoteReference`.
pub trait NoteReferenceElement: OxmlElement {
    const KIND: NoteKind;

    fn id(self, tree: &XmlTree) -> Result<i64> {
        self.required_attr(tree, ID)
    }

    fn set_id(self, tree: &mut XmlTree, id: i64) -> Result<()> {
        self.set_attr(tree, ID, Some(&id))
    }

    fn raw_id(self, tree: &XmlTree) -> Option<&str> {
        tree.attribute(self.node(), ID)
    }

    fn custom_mark_follows(self, tree: &XmlTree) -> Result<Option<bool>> {
        self.attr(tree, CUSTOM_MARK_FOLLOWS)
    }

    fn set_custom_mark_follows(self, tree: &mut XmlTree, value: Option<bool>) -> Result<()> {
        self.set_attr(tree, CUSTOM_MARK_FOLLOWS, value.as_ref())
    }
}

impl NoteReferenceElement for FootnoteReference {
    const KIND: NoteKind = NoteKind::Footnote;
}

impl NoteReferenceElement for EndnoteReference {
    const KIND: NoteKind = NoteKind::Endnote;
}

/// A notes part root: `w:footnotes` or `w:endnotes`.
pub trait NotesRoot: OxmlElement {
    type Note: NoteElement;

    /// Every note anywhere below the root, in document order.
    fn note_lst(self, tree: &XmlTree) -> Result<Vec<Self::Note>> {
        let path = format!(".//{}", <Self::Note as OxmlElement>::schema().tag);
        Ok(tree
            .query(self.node(), &path)?
            .into_iter()
            .map(<Self::Note as OxmlElement>::from_node)
            .collect())
    }

    /// One past the highest id in use, and never below 1.
    ///
    /// Separator notes conventionally take ids -1 and 0, so they never
    /// influence the result.
    fn next_available_id(self, tree: &XmlTree) -> Result<i64> {
        let mut max: i64 = 0;
        for note in self.note_lst(tree)? {
            if let Some(id) = note.id(tree)? {
                max = max.max(id);
            }
        }
        Ok(max + 1)
    }

    /// Append an ordinary note with the next free id and one empty paragraph.
    fn add_note(self, tree: &mut XmlTree) -> Result<Self::Note> {
        let id = self.next_available_id(tree)?;
        let note = self.add::<Self::Note>(tree)?;
        note.set_id(tree, Some(id))?;
        note.add_paragraph(tree)?;
        log::debug!("added {} {}", <Self::Note as NoteElement>::KIND, id);
        Ok(note)
    }
}

impl NotesRoot for Footnotes {
    type Note = Footnote;
}

impl NotesRoot for Endnotes {
    type Note = Endnote;
}

impl Footnotes {
    pub fn footnote_lst(self, tree: &XmlTree) -> Result<Vec<Footnote>> {
        self.note_lst(tree)
    }

    pub fn add_footnote(self, tree: &mut XmlTree) -> Result<Footnote> {
        self.add_note(tree)
    }
}

impl Endnotes {
    pub fn endnote_lst(self, tree: &XmlTree) -> Result<Vec<Endnote>> {
        self.note_lst(tree)
    }

    pub fn add_endnote(self, tree: &mut XmlTree) -> Result<Endnote> {
        self.add_note(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::xml::parse;

    const FOOTNOTES_XML: &str = r#"<w:footnotes xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>
  <w:footnote w:type="continuationSeparator" w:id="0"><w:p/></w:footnote>
  <w:footnote w:id="1"><w:p><w:r><w:t>First</w:t></w:r></w:p></w:footnote>
  <w:footnote w:id="3"><w:p><w:r><w:t>Third</w:t></w:r></w:p><w:p><w:r><w:t>More</w:t></w:r></w:p></w:footnote>
</w:footnotes>"#;

    #[test]
    fn test_footnote_lst() {
        let tree = parse(FOOTNOTES_XML.as_bytes()).unwrap();
        let root = Footnotes::try_wrap(&tree, tree.root()).unwrap();
        let notes = root.footnote_lst(&tree).unwrap();
        assert_eq!(notes.len(), 4);

        let ids: Vec<_> = notes.iter().map(|n| n.id(&tree).unwrap()).collect();
        assert_eq!(ids, vec![Some(-1), Some(0), Some(1), Some(3)]);
        assert_eq!(
            notes[0].note_type(&tree).unwrap(),
            Some(NoteType::Separator)
        );
        assert_eq!(notes[2].note_type(&tree).unwrap(), None);
        assert_eq!(notes[3].paragraphs(&tree).unwrap().len(), 2);
    }

    #[test]
    fn test_next_available_id() {
        let tree = parse(FOOTNOTES_XML.as_bytes()).unwrap();
        let root = Footnotes(tree.root());
        assert_eq!(root.next_available_id(&tree).unwrap(), 4);

        let empty = XmlTree::new(ENDNOTES.tag);
        assert_eq!(Endnotes(empty.root()).next_available_id(&empty).unwrap(), 1);
    }

    #[test]
    fn test_add_footnote() {
        let mut tree = parse(FOOTNOTES_XML.as_bytes()).unwrap();
        let root = Footnotes(tree.root());
        let note = root.add_footnote(&mut tree).unwrap();

        assert_eq!(note.id(&tree).unwrap(), Some(4));
        assert_eq!(note.paragraphs(&tree).unwrap().len(), 1);
        assert_eq!(root.footnote_lst(&tree).unwrap().last(), Some(&note));
        note.validate(&tree).unwrap();
    }

    #[test]
    fn test_malformed_note_type() {
        let source = r#"<w:endnote xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" w:type="sidebar"/>"#;
        let tree = parse(source.as_bytes()).unwrap();
        let note = Endnote(tree.root());
        assert!(matches!(
            note.note_type(&tree),
            Err(Error::Parse { ref value, .. }) if value == "sidebar"
        ));
    }

    #[test]
    fn test_reference_requires_id() {
        let mut tree = XmlTree::new(FOOTNOTE_REFERENCE.tag);
        let reference = FootnoteReference(tree.root());
        assert!(matches!(reference.id(&tree), Err(Error::Constraint(_))));

        reference.set_id(&mut tree, 7).unwrap();
        assert_eq!(reference.id(&tree).unwrap(), 7);
        assert_eq!(reference.raw_id(&tree), Some("7"));
        assert_eq!(reference.custom_mark_follows(&tree).unwrap(), None);
    }

    #[test]
    fn test_note_properties_precede_paragraphs() {
        let mut tree = XmlTree::new(FOOTNOTE.tag);
        let note = Footnote(tree.root());
        note.add_paragraph(&mut tree).unwrap();
        note.get_or_add_by_tag(&mut tree, QName::w("rPr")).unwrap();
        let first = tree.children(note.node())[0];
        assert_eq!(tree.name(first), Some(QName::w("rPr")));
    }
}
