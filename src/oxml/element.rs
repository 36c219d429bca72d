//! The typed-wrapper trait shared by every element type.

use super::schema::ElementSchema;
use super::simpletypes::SimpleType;
use crate::error::{Error, Result};
use crate::xml::{NodeId, QName, XmlTree};

/// A typed view of one element in an [`XmlTree`].
///
/// Wrappers are `Copy` handles around a [`NodeId`]; the tree itself is passed
/// to every accessor. All structural behavior comes from [`Self::schema`], so
/// an implementation only supplies the schema and the node conversion.
pub trait OxmlElement: Copy {
    fn schema() -> &'static ElementSchema;

    /// Wrap a node without checking its tag.
    fn from_node(node: NodeId) -> Self;

    fn node(self) -> NodeId;

    /// Wrap a node if its tag matches this element type.
    fn wrap(tree: &XmlTree, node: NodeId) -> Option<Self> {
        tree.is_element(node, Self::schema().tag)
            .then(|| Self::from_node(node))
    }

    /// Wrap a node, failing with a constraint error on a tag mismatch.
    fn try_wrap(tree: &XmlTree, node: NodeId) -> Result<Self> {
        Self::wrap(tree, node).ok_or_else(|| {
            let found = tree
                .name(node)
                .map(|name| name.to_string())
                .unwrap_or_else(|| "text".to_string());
            Error::Constraint(format!("expected {}, found {}", Self::schema().tag, found))
        })
    }

    /// Allocate a detached instance with defaulted required attributes.
    fn new_detached(tree: &mut XmlTree) -> Self {
        Self::from_node(Self::schema().new_element(tree))
    }

    // ------------------------------------------------------------------
    // Typed children
    // ------------------------------------------------------------------

    /// First child of type `C`.
    fn child<C: OxmlElement>(self, tree: &XmlTree) -> Result<Option<C>> {
        Ok(Self::schema()
            .first_child(tree, self.node(), C::schema().tag)?
            .map(C::from_node))
    }

    /// Every child of type `C`, in document order.
    fn children<C: OxmlElement>(self, tree: &XmlTree) -> Result<Vec<C>> {
        Ok(Self::schema()
            .children_of(tree, self.node(), C::schema().tag)?
            .into_iter()
            .map(C::from_node)
            .collect())
    }

    /// Existing singleton child of type `C`, or a new one in canonical position.
    fn get_or_add<C: OxmlElement>(self, tree: &mut XmlTree) -> Result<C> {
        let (_, spec) = Self::schema().child_spec(C::schema().tag)?;
        if !spec.cardinality.is_singleton() {
            return Err(Error::Constraint(format!(
                "{} is repeated under {}; use add",
                spec.tag,
                Self::schema().tag
            )));
        }
        match self.child::<C>(tree)? {
            Some(existing) => Ok(existing),
            None => self.add::<C>(tree),
        }
    }

    /// A new child of type `C` in canonical position.
    fn add<C: OxmlElement>(self, tree: &mut XmlTree) -> Result<C> {
        Self::schema().child_spec(C::schema().tag)?;
        let child = C::new_detached(tree);
        Self::schema().insert(tree, self.node(), child.node())?;
        Ok(child)
    }

    /// Move an existing element of type `C` into canonical position here.
    ///
    /// On a content-model error the child stays where it was.
    fn insert<C: OxmlElement>(self, tree: &mut XmlTree, child: C) -> Result<()> {
        Self::schema().check_insert(tree, self.node(), child.node())?;
        tree.detach(child.node());
        Self::schema().insert_unchecked(tree, self.node(), child.node())
    }

    /// Remove every child of type `C`, returning how many were removed.
    fn remove<C: OxmlElement>(self, tree: &mut XmlTree) -> Result<usize> {
        Self::schema().remove(tree, self.node(), C::schema().tag)
    }

    // ------------------------------------------------------------------
    // Untyped children
    // ------------------------------------------------------------------

    /// First child with a declared tag that has no wrapper type.
    fn child_by_tag(self, tree: &XmlTree, tag: QName<'_>) -> Result<Option<NodeId>> {
        Self::schema().first_child(tree, self.node(), tag)
    }

    fn get_or_add_by_tag(self, tree: &mut XmlTree, tag: QName<'_>) -> Result<NodeId> {
        Self::schema().get_or_add(tree, self.node(), tag)
    }

    fn remove_by_tag(self, tree: &mut XmlTree, tag: QName<'_>) -> Result<usize> {
        Self::schema().remove(tree, self.node(), tag)
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    fn attr<T: SimpleType>(self, tree: &XmlTree, name: QName<'_>) -> Result<Option<T>> {
        Self::schema().get_attr(tree, self.node(), name)
    }

    /// Value of a required attribute.
    fn required_attr<T: SimpleType>(self, tree: &XmlTree, name: QName<'_>) -> Result<T> {
        self.attr(tree, name)?.ok_or_else(|| {
            Error::Constraint(format!(
                "required attribute {} missing on {}",
                name,
                Self::schema().tag
            ))
        })
    }

    fn set_attr<T: SimpleType>(self, tree: &mut XmlTree, name: QName<'_>, value: Option<&T>) -> Result<()> {
        Self::schema().set_attr(tree, self.node(), name, value)
    }

    /// Check this element against its content model.
    fn validate(self, tree: &XmlTree) -> Result<()> {
        Self::schema().validate(tree, self.node())
    }
}

/// Declare a `Copy` wrapper type over [`NodeId`] bound to a static schema.
macro_rules! define_element {
    ($(#[$meta:meta])* $vis:vis struct $name:ident => $schema:path;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name(pub $crate::xml::NodeId);

        impl $crate::oxml::element::OxmlElement for $name {
            fn schema() -> &'static $crate::oxml::schema::ElementSchema {
                &$schema
            }

            fn from_node(node: $crate::xml::NodeId) -> Self {
                Self(node)
            }

            fn node(self) -> $crate::xml::NodeId {
                self.0
            }
        }
    };
}

pub(crate) use define_element;
