//! Generic XML tree primitive.
//!
//! The object model layers typed element wrappers over this untyped tree:
//! - [`XmlTree`]: arena of element and text nodes addressed by [`NodeId`]
//! - [`QName`]/[`Name`]: namespace-qualified names over a fixed namespace table
//! - [`parse`]/[`to_xml`]: conversion from and to XML text
//! - [`XmlTree::query`]: restricted path queries

pub mod name;
mod parser;
mod query;
mod tree;
mod writer;

pub use name::{Name, QName, qn};
pub use parser::parse;
pub use tree::{Attribute, Descendants, NodeData, NodeId, XmlNode, XmlTree};
pub use writer::to_xml;
