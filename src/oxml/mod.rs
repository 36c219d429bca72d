//! Typed element wrappers over the XML tree.
//!
//! Each wrapper type declares its content model as a static
//! [`ElementSchema`]; the [`OxmlElement`] trait exposes one generic engine
//! over those tables for child access, canonical insertion and typed
//! attributes.

pub mod element;
pub mod note;
pub mod schema;
pub mod simpletypes;
pub mod text;

pub use element::OxmlElement;
pub use note::{
    Endnote, EndnoteReference, Endnotes, Footnote, FootnoteReference, Footnotes, NoteElement,
    NoteKind, NoteReferenceElement, NotesRoot,
};
pub use schema::{AttrKind, AttrSpec, AttrUse, Cardinality, ChildSpec, ElementSchema};
pub use simpletypes::{NoteType, SimpleType, VerticalAlignRun, XsdInt, XsdString};
pub use text::{Body, Paragraph, ParagraphProperties, Run, RunProperties, Text};
