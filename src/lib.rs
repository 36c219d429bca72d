//! # docx-oxml
//!
//! Structural layer of a WordprocessingML document object model.
//!
//! ## Features
//!
//! - Declarative element schemas: child order, cardinality and typed
//!   attributes enforced by one generic engine
//! - Typed wrappers over document, paragraph, run and note elements
//! - Footnote and endnote reference resolution with a cached id index
//! - Image format sniffing (PNG, JPEG, GIF, TIFF, BMP) with pixel size and
//!   resolution
//!
//! ## Quick Start
//!
//! ```
//! use docx_oxml::{Document, DocumentPart, NoteKind, NoteResolver};
//!
//! let mut doc = Document::new(DocumentPart::new());
//! let body = doc.main_mut().body()?;
//! let tree = doc.main_mut().tree_mut();
//! let paragraph = body.add_paragraph(tree)?;
//! doc.add_note(NoteKind::Footnote, paragraph, "A footnote.")?;
//!
//! let mut resolver = NoteResolver::new();
//! for reference in doc.note_references()? {
//!     let paragraphs = resolver.resolve(&doc, &reference)?;
//!     assert_eq!(paragraphs[0].text(&doc)?, "A footnote.");
//! }
//! # Ok::<(), docx_oxml::Error>(())
//! ```
//!
//! ## Images
//!
//! ```no_run
//! use docx_oxml::image::Image;
//!
//! let image = Image::from_file("figure.jpg")?;
//! println!("{} {}", image.content_type(), image.sha1());
//! # Ok::<(), docx_oxml::Error>(())
//! ```

pub mod error;
pub mod image;
pub mod oxml;
pub mod parts;
pub mod text;
pub(crate) mod util;
pub mod xml;

pub use error::{Error, Result};
pub use image::{Image, ImageFormat, ImageRegistry};
pub use parts::{Document, DocumentPart, Note, NoteKind, NoteResolver, NotesPart, PartKind};
