//! Schema descriptors: the declared content model of each element type.
//!
//! Every element type owns one static [`ElementSchema`] listing its
//! permitted children (in canonical order, with cardinality) and its
//! permitted attributes (with value kind and optionality). A single generic
//! engine consults that table for every structural operation, so child
//! ordering, singleton cardinality and attribute typing are enforced the same
//! way for all element types.
//!
//! ```text
//!   <w:footnote w:id="1">          ElementSchema (w:footnote)
//!     <w:rPr/>            ◄──────  0: w:rPr   ZeroOrOne
//!     <w:p/>              ◄──────  1: w:p     ZeroOrMore
//!     <w:p/>
//!   </w:footnote>
//! ```

use super::simpletypes::SimpleType;
use crate::error::{Error, Result};
use crate::xml::{NodeId, QName, XmlTree};

/// How many instances of a child kind the content model permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Optional singleton.
    ZeroOrOne,
    /// Required singleton.
    One,
    /// Repeated, possibly absent.
    ZeroOrMore,
}

impl Cardinality {
    pub fn is_singleton(self) -> bool {
        matches!(self, Cardinality::ZeroOrOne | Cardinality::One)
    }
}

/// One permitted child kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSpec {
    pub tag: QName<'static>,
    pub cardinality: Cardinality,
}

impl ChildSpec {
    pub const fn zero_or_one(tag: QName<'static>) -> Self {
        Self {
            tag,
            cardinality: Cardinality::ZeroOrOne,
        }
    }

    pub const fn one(tag: QName<'static>) -> Self {
        Self {
            tag,
            cardinality: Cardinality::One,
        }
    }

    pub const fn zero_or_more(tag: QName<'static>) -> Self {
        Self {
            tag,
            cardinality: Cardinality::ZeroOrMore,
        }
    }
}

/// Value kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Int,
    /// Enumerated token with its permitted values.
    Token(&'static [&'static str]),
    String,
    Bool,
}

/// Presence rule of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrUse {
    Required,
    /// Absent values read as `default` when one is declared.
    Optional { default: Option<&'static str> },
}

/// One permitted attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSpec {
    pub name: QName<'static>,
    pub kind: AttrKind,
    pub usage: AttrUse,
}

impl AttrSpec {
    pub const fn required(name: QName<'static>, kind: AttrKind) -> Self {
        Self {
            name,
            kind,
            usage: AttrUse::Required,
        }
    }

    pub const fn optional(name: QName<'static>, kind: AttrKind) -> Self {
        Self {
            name,
            kind,
            usage: AttrUse::Optional { default: None },
        }
    }

    pub const fn with_default(name: QName<'static>, kind: AttrKind, default: &'static str) -> Self {
        Self {
            name,
            kind,
            usage: AttrUse::Optional {
                default: Some(default),
            },
        }
    }

    pub fn is_required(&self) -> bool {
        self.usage == AttrUse::Required
    }

    pub fn default(&self) -> Option<&'static str> {
        match self.usage {
            AttrUse::Optional { default } => default,
            AttrUse::Required => None,
        }
    }
}

/// The content model of one element type.
#[derive(Debug)]
pub struct ElementSchema {
    pub tag: QName<'static>,
    /// Permitted children in canonical order.
    pub children: &'static [ChildSpec],
    pub attributes: &'static [AttrSpec],
}

impl ElementSchema {
    /// Position and spec of a declared child tag.
    pub fn child_spec(&self, tag: QName<'_>) -> Result<(usize, &ChildSpec)> {
        self.children
            .iter()
            .enumerate()
            .find(|(_, spec)| spec.tag == tag)
            .ok_or_else(|| {
                Error::Constraint(format!("{} is not a permitted child of {}", tag, self.tag))
            })
    }

    pub fn attr_spec(&self, name: QName<'_>) -> Result<&AttrSpec> {
        self.attributes
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| {
                Error::Constraint(format!("{} is not a permitted attribute of {}", name, self.tag))
            })
    }

    fn declared_index(&self, tree: &XmlTree, node: NodeId) -> Option<usize> {
        let name = tree.name(node)?;
        self.children.iter().position(|spec| spec.tag == name)
    }

    // ------------------------------------------------------------------
    // Child access
    // ------------------------------------------------------------------

    /// First child with a declared tag, or `None`.
    pub fn first_child(&self, tree: &XmlTree, node: NodeId, tag: QName<'_>) -> Result<Option<NodeId>> {
        self.child_spec(tag)?;
        Ok(tree.first_child_by_tag(node, tag))
    }

    /// Every child with a declared tag, in document order.
    pub fn children_of(&self, tree: &XmlTree, node: NodeId, tag: QName<'_>) -> Result<Vec<NodeId>> {
        self.child_spec(tag)?;
        Ok(tree.children_by_tag(node, tag).collect())
    }

    /// Canonical position for a new child with `tag`, computed against the
    /// children currently present.
    ///
    /// The slot is right after the last child whose declared position is at
    /// or before `tag`'s (so same-tag siblings keep insertion order), or the
    /// first slot when no such child exists. Undeclared children are skipped.
    pub fn insertion_index(&self, tree: &XmlTree, node: NodeId, tag: QName<'_>) -> Result<usize> {
        let (target, _) = self.child_spec(tag)?;
        let index = tree
            .children(node)
            .iter()
            .enumerate()
            .filter(|&(_, &child)| {
                self.declared_index(tree, child)
                    .is_some_and(|declared| declared <= target)
            })
            .map(|(pos, _)| pos + 1)
            .last()
            .unwrap_or(0);
        Ok(index)
    }

    /// Insert a detached element at its canonical position under `node`.
    ///
    /// Rejects a second instance of a singleton child.
    pub fn insert(&self, tree: &mut XmlTree, node: NodeId, child: NodeId) -> Result<()> {
        self.check_insert(tree, node, child)?;
        self.insert_unchecked(tree, node, child)
    }

    /// Check that `child` may be placed under `node` without touching the tree.
    ///
    /// `child` itself is not counted as an existing singleton, so moving an
    /// element within its own parent passes.
    pub fn check_insert(&self, tree: &XmlTree, node: NodeId, child: NodeId) -> Result<()> {
        let tag = tree
            .name(child)
            .ok_or_else(|| Error::Constraint(format!("cannot insert text under {}", self.tag)))?;
        let (_, spec) = self.child_spec(tag)?;
        if spec.cardinality.is_singleton()
            && tree
                .children_by_tag(node, tag)
                .any(|existing| existing != child)
        {
            return Err(Error::Constraint(format!(
                "{} already has a {} child",
                self.tag, spec.tag
            )));
        }
        Ok(())
    }

    /// Place a detached `child` at its canonical position under `node`.
    /// Callers run [`ElementSchema::check_insert`] first.
    pub fn insert_unchecked(&self, tree: &mut XmlTree, node: NodeId, child: NodeId) -> Result<()> {
        let tag = tree
            .name(child)
            .ok_or_else(|| Error::Constraint(format!("cannot insert text under {}", self.tag)))?
            .to_owned_name();
        let tag = tag.as_qname();
        let index = self.insertion_index(tree, node, tag)?;
        log::trace!("inserting {} under {} at {}", tag, self.tag, index);
        tree.insert_child(node, child, index);
        Ok(())
    }

    /// Create an empty child with `tag` and insert it at its canonical position.
    pub fn add(&self, tree: &mut XmlTree, node: NodeId, tag: QName<'_>) -> Result<NodeId> {
        let (_, spec) = self.child_spec(tag)?;
        let child = tree.create_element(spec.tag);
        self.insert(tree, node, child)?;
        Ok(child)
    }

    /// Existing singleton child, or a newly inserted empty one.
    pub fn get_or_add(&self, tree: &mut XmlTree, node: NodeId, tag: QName<'_>) -> Result<NodeId> {
        let (_, spec) = self.child_spec(tag)?;
        if !spec.cardinality.is_singleton() {
            return Err(Error::Constraint(format!(
                "{} is repeated under {}; use add",
                spec.tag, self.tag
            )));
        }
        match tree.first_child_by_tag(node, tag) {
            Some(existing) => Ok(existing),
            None => self.add(tree, node, tag),
        }
    }

    /// Detach every child with `tag`, returning how many were removed.
    ///
    /// Removing a required singleton is rejected.
    pub fn remove(&self, tree: &mut XmlTree, node: NodeId, tag: QName<'_>) -> Result<usize> {
        let (_, spec) = self.child_spec(tag)?;
        if spec.cardinality == Cardinality::One {
            return Err(Error::Constraint(format!(
                "{} is required under {}",
                spec.tag, self.tag
            )));
        }
        let matching: Vec<NodeId> = tree.children_by_tag(node, tag).collect();
        for &child in &matching {
            tree.remove_child(node, child);
        }
        Ok(matching.len())
    }

    // ------------------------------------------------------------------
    // Attribute access
    // ------------------------------------------------------------------

    fn checked_spec<T: SimpleType>(&self, name: QName<'_>) -> Result<&AttrSpec> {
        let spec = self.attr_spec(name)?;
        if !T::accepts(spec.kind) {
            return Err(Error::Constraint(format!(
                "{} on {} is declared as {:?}, not {}",
                spec.name,
                self.tag,
                spec.kind,
                std::any::type_name::<T>()
            )));
        }
        Ok(spec)
    }

    /// Typed attribute value.
    ///
    /// Absent optional attributes read as their declared default, or `None`
    /// without one. Absent required attributes and malformed values are errors.
    pub fn get_attr<T: SimpleType>(&self, tree: &XmlTree, node: NodeId, name: QName<'_>) -> Result<Option<T>> {
        let spec = self.checked_spec::<T>(name)?;
        let raw = match (tree.attribute(node, name), spec.usage) {
            (Some(raw), _) => raw,
            (None, AttrUse::Optional { default: Some(default) }) => default,
            (None, AttrUse::Optional { default: None }) => return Ok(None),
            (None, AttrUse::Required) => {
                return Err(Error::Constraint(format!(
                    "required attribute {} missing on {}",
                    spec.name, self.tag
                )));
            }
        };
        parse_value(spec, raw).map(Some)
    }

    /// Store a typed attribute value; `None` removes an optional attribute.
    ///
    /// Writing an optional attribute's default removes it as well, since the
    /// absent attribute already reads as that value.
    pub fn set_attr<T: SimpleType>(
        &self,
        tree: &mut XmlTree,
        node: NodeId,
        name: QName<'_>,
        value: Option<&T>,
    ) -> Result<()> {
        let spec = *self.checked_spec::<T>(name)?;
        let Some(value) = value else {
            if spec.is_required() {
                return Err(Error::Constraint(format!(
                    "required attribute {} cannot be removed from {}",
                    spec.name, self.tag
                )));
            }
            tree.remove_attribute(node, spec.name);
            return Ok(());
        };

        let raw = value.to_xml();
        if let AttrKind::Token(tokens) = spec.kind
            && !tokens.contains(&raw.as_str())
        {
            return Err(Error::Constraint(format!(
                "{raw:?} is not a permitted value of {}",
                spec.name
            )));
        }
        if spec.default() == Some(raw.as_str()) {
            tree.remove_attribute(node, spec.name);
        } else {
            tree.set_attribute(node, spec.name, raw);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Construction and auditing
    // ------------------------------------------------------------------

    /// Allocate a detached element of this type, with required attributes
    /// that declare a default filled in.
    pub fn new_element(&self, tree: &mut XmlTree) -> NodeId {
        let node = tree.create_element(self.tag);
        for spec in self.attributes.iter().filter(|s| s.is_required()) {
            if let Some(default) = spec.default() {
                tree.set_attribute(node, spec.name, default);
            }
        }
        node
    }

    /// Check an existing element against this content model.
    ///
    /// Reports the first violation found: children out of canonical order,
    /// a repeated singleton, a missing required child, or a missing or
    /// malformed attribute. Undeclared children are ignored.
    pub fn validate(&self, tree: &XmlTree, node: NodeId) -> Result<()> {
        let mut last = 0;
        let mut counts = vec![0usize; self.children.len()];
        for &child in tree.children(node) {
            let Some(index) = self.declared_index(tree, child) else {
                continue;
            };
            if index < last {
                return Err(Error::Constraint(format!(
                    "{} appears after {} in {}",
                    self.children[index].tag, self.children[last].tag, self.tag
                )));
            }
            last = index;
            counts[index] += 1;
        }
        for (spec, count) in self.children.iter().zip(counts) {
            if spec.cardinality.is_singleton() && count > 1 {
                return Err(Error::Constraint(format!(
                    "{} appears {} times in {}",
                    spec.tag, count, self.tag
                )));
            }
            if spec.cardinality == Cardinality::One && count == 0 {
                return Err(Error::Constraint(format!(
                    "{} is missing required {}",
                    self.tag, spec.tag
                )));
            }
        }
        for spec in self.attributes {
            match tree.attribute(node, spec.name) {
                Some(raw) => check_kind(spec, raw)?,
                None if spec.is_required() => {
                    return Err(Error::Constraint(format!(
                        "required attribute {} missing on {}",
                        spec.name, self.tag
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }
}

fn parse_value<T: SimpleType>(spec: &AttrSpec, raw: &str) -> Result<T> {
    if let AttrKind::Token(tokens) = spec.kind
        && !tokens.contains(&raw)
    {
        return Err(parse_error(spec, raw, "a declared token"));
    }
    T::from_xml(raw).map_err(|invalid| parse_error(spec, raw, invalid.expected))
}

fn check_kind(spec: &AttrSpec, raw: &str) -> Result<()> {
    match spec.kind {
        AttrKind::Int => parse_value::<i64>(spec, raw).map(|_| ()),
        AttrKind::Bool => parse_value::<bool>(spec, raw).map(|_| ()),
        AttrKind::Token(_) | AttrKind::String => parse_value::<String>(spec, raw).map(|_| ()),
    }
}

fn parse_error(spec: &AttrSpec, raw: &str, expected: &'static str) -> Error {
    Error::Parse {
        attribute: spec.name.to_string(),
        value: raw.to_string(),
        expected,
    }
}
