//! Arena-backed XML element tree.

use super::name::{Name, QName};

/// Identifier of a node within an [`XmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root element ID (always 0).
    pub const ROOT: NodeId = NodeId(0);
}

/// An attribute on an element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Name,
    pub value: String,
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element { name: Name, attributes: Vec<Attribute> },
    Text(String),
}

/// A node in the tree.
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub data: NodeData,
    /// Parent node (None for the root and for detached nodes).
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
}

impl XmlNode {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An XML document as an ordered tree of element and text nodes.
///
/// Nodes are never freed: removing a child detaches it, and its `NodeId`
/// stays valid but unreachable from the root.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<XmlNode>,
    /// Prefix declarations seen while parsing, reused when serializing.
    pub(crate) declared: Vec<(String, String)>,
}

impl XmlTree {
    /// Create a tree whose root element has the given name.
    pub fn new(root: QName<'_>) -> Self {
        Self {
            nodes: vec![XmlNode::new(NodeData::Element {
                name: root.to_owned_name(),
                attributes: Vec::new(),
            })],
            declared: Vec::new(),
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut XmlNode> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Get the number of allocated nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(XmlNode::new(data));
        id
    }

    /// Allocate a detached, empty element.
    pub fn create_element(&mut self, name: QName<'_>) -> NodeId {
        self.alloc(NodeData::Element {
            name: name.to_owned_name(),
            attributes: Vec::new(),
        })
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    /// Append text under `parent`, merging with a trailing text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        if let Some(&last) = self.children(parent).last()
            && let Some(NodeData::Text(existing)) = self.node_mut(last).map(|n| &mut n.data)
        {
            existing.push_str(text);
            return last;
        }
        let id = self.create_text(text);
        self.append_child(parent, id);
        id
    }

    /// Element name, or `None` for text nodes.
    pub fn name(&self, id: NodeId) -> Option<QName<'_>> {
        match &self.node(id)?.data {
            NodeData::Element { name, .. } => Some(name.as_qname()),
            NodeData::Text(_) => None,
        }
    }

    /// Whether `id` is an element with exactly this name.
    pub fn is_element(&self, id: NodeId, name: QName<'_>) -> bool {
        self.name(id) == Some(name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children of a node in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Element children with the given tag, in document order.
    pub fn children_by_tag<'a>(
        &'a self,
        id: NodeId,
        tag: QName<'a>,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.is_element(child, tag))
    }

    /// First element child with the given tag.
    pub fn first_child_by_tag(&self, id: NodeId, tag: QName<'_>) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.is_element(child, tag))
    }

    /// All attributes of an element (empty for text nodes).
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.node(id).map(|n| &n.data) {
            Some(NodeData::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    /// Raw string value of an attribute.
    pub fn attribute(&self, id: NodeId, name: QName<'_>) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name.matches(name))
            .map(|a| a.value.as_str())
    }

    /// Store or overwrite an attribute. No-op on text nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: QName<'_>, value: impl Into<String>) {
        let value = value.into();
        if let Some(NodeData::Element { attributes, .. }) = self.node_mut(id).map(|n| &mut n.data)
        {
            match attributes.iter_mut().find(|a| a.name.matches(name)) {
                Some(existing) => existing.value = value,
                None => attributes.push(Attribute {
                    name: name.to_owned_name(),
                    value,
                }),
            }
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, id: NodeId, name: QName<'_>) -> Option<String> {
        if let Some(NodeData::Element { attributes, .. }) = self.node_mut(id).map(|n| &mut n.data)
        {
            let pos = attributes.iter().position(|a| a.name.matches(name))?;
            return Some(attributes.remove(pos).value);
        }
        None
    }

    /// Index of `child` among `parent`'s children.
    pub fn position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Insert `child` under `parent` at `position` (clamped to the child count).
    ///
    /// A child that is currently attached elsewhere is moved.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, position: usize) {
        if parent == child || self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        self.detach(child);
        if let Some(parent_node) = self.node_mut(parent) {
            let position = position.min(parent_node.children.len());
            parent_node.children.insert(position, child);
        }
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = Some(parent);
        }
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let end = self.children(parent).len();
        self.insert_child(parent, child, end);
    }

    /// Detach `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(pos) = self.position(parent, child) else {
            return false;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.remove(pos);
        }
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = None;
        }
        true
    }

    /// Detach a node from whatever parent it has.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(NodeData::Text(text)) = self.node(node).map(|n| &n.data) {
                out.push_str(text);
            }
        }
        out
    }

    /// Iterate over `id` and all its descendants in depth-first document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }
}

/// Depth-first iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order so they're visited left-to-right
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(local: &str) -> QName<'_> {
        QName::w(local)
    }

    #[test]
    fn test_tree_creation() {
        let tree = XmlTree::new(w("document"));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.name(tree.root()), Some(w("document")));
        assert!(tree.parent(tree.root()).is_none());
    }

    #[test]
    fn test_insert_child_positions() {
        let mut tree = XmlTree::new(w("body"));
        let a = tree.create_element(w("a"));
        let b = tree.create_element(w("b"));
        let c = tree.create_element(w("c"));
        tree.append_child(NodeId::ROOT, a);
        tree.append_child(NodeId::ROOT, c);
        tree.insert_child(NodeId::ROOT, b, 1);

        assert_eq!(tree.children(NodeId::ROOT), &[a, b, c]);
        assert_eq!(tree.parent(b), Some(NodeId::ROOT));
    }

    #[test]
    fn test_insert_child_moves_attached_node() {
        let mut tree = XmlTree::new(w("body"));
        let p1 = tree.create_element(w("p"));
        let p2 = tree.create_element(w("p"));
        let r = tree.create_element(w("r"));
        tree.append_child(NodeId::ROOT, p1);
        tree.append_child(NodeId::ROOT, p2);
        tree.append_child(p1, r);
        tree.append_child(p2, r);

        assert!(tree.children(p1).is_empty());
        assert_eq!(tree.children(p2), &[r]);
        assert_eq!(tree.parent(r), Some(p2));
    }

    #[test]
    fn test_remove_child() {
        let mut tree = XmlTree::new(w("body"));
        let p = tree.create_element(w("p"));
        tree.append_child(NodeId::ROOT, p);

        assert!(tree.remove_child(NodeId::ROOT, p));
        assert!(!tree.remove_child(NodeId::ROOT, p));
        assert!(tree.children(NodeId::ROOT).is_empty());
        assert!(tree.parent(p).is_none());
    }

    #[test]
    fn test_children_by_tag_skips_other_tags() {
        let mut tree = XmlTree::new(w("body"));
        let p1 = tree.create_element(w("p"));
        let tbl = tree.create_element(w("tbl"));
        let p2 = tree.create_element(w("p"));
        for child in [p1, tbl, p2] {
            tree.append_child(NodeId::ROOT, child);
        }

        let paragraphs: Vec<_> = tree.children_by_tag(NodeId::ROOT, w("p")).collect();
        assert_eq!(paragraphs, vec![p1, p2]);
        assert_eq!(tree.first_child_by_tag(NodeId::ROOT, w("tbl")), Some(tbl));
    }

    #[test]
    fn test_attributes() {
        let mut tree = XmlTree::new(w("footnote"));
        let root = tree.root();
        tree.set_attribute(root, w("id"), "1");
        tree.set_attribute(root, w("id"), "2");

        assert_eq!(tree.attribute(root, w("id")), Some("2"));
        assert_eq!(tree.attributes(root).len(), 1);
        assert_eq!(tree.remove_attribute(root, w("id")).as_deref(), Some("2"));
        assert_eq!(tree.attribute(root, w("id")), None);
    }

    #[test]
    fn test_text_and_descendants() {
        let mut tree = XmlTree::new(w("p"));
        let r1 = tree.create_element(w("r"));
        let t1 = tree.create_text("Hello, ");
        let r2 = tree.create_element(w("r"));
        let t2 = tree.create_text("World!");
        tree.append_child(NodeId::ROOT, r1);
        tree.append_child(r1, t1);
        tree.append_child(NodeId::ROOT, r2);
        tree.append_child(r2, t2);

        assert_eq!(tree.text(NodeId::ROOT), "Hello, World!");
        let order: Vec<_> = tree.descendants(NodeId::ROOT).collect();
        assert_eq!(order, vec![NodeId::ROOT, r1, t1, r2, t2]);
    }
}
