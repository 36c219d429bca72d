//! Serialization of an [`XmlTree`] back to XML text.

use std::collections::BTreeSet;

use super::name::{XML, known_prefix};
use super::tree::{NodeData, NodeId, XmlTree};
use crate::util::escape_xml;

/// Prefix assignment for every namespace used in a tree.
struct PrefixMap {
    entries: Vec<(String, String)>,
}

impl PrefixMap {
    fn build(tree: &XmlTree) -> Self {
        let mut used: BTreeSet<&str> = BTreeSet::new();
        for id in tree.descendants(tree.root()) {
            if let Some(NodeData::Element { name, attributes }) = tree.node(id).map(|n| &n.data) {
                used.insert(&name.ns);
                for attr in attributes {
                    used.insert(&attr.name.ns);
                }
            }
        }
        used.remove("");
        used.remove(XML);

        let mut entries: Vec<(String, String)> = Vec::new();
        let mut generated = 0;
        for uri in used {
            let declared = tree
                .declared
                .iter()
                .find(|(p, u)| u == uri && !p.is_empty())
                .map(|(p, _)| p.clone());
            let prefix = declared
                .or_else(|| known_prefix(uri).map(str::to_string))
                .unwrap_or_else(|| {
                    generated += 1;
                    format!("ns{generated}")
                });
            entries.push((prefix, uri.to_string()));
        }
        Self { entries }
    }

    fn prefix(&self, uri: &str) -> Option<&str> {
        if uri == XML {
            return Some("xml");
        }
        self.entries
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(p, _)| p.as_str())
    }
}

fn qualified(prefixes: &PrefixMap, ns: &str, local: &str) -> String {
    match prefixes.prefix(ns) {
        Some(prefix) if !ns.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

/// Serialize the tree as a standalone XML document.
pub fn to_xml(tree: &XmlTree) -> String {
    let prefixes = PrefixMap::build(tree);
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    write_node(tree, tree.root(), &prefixes, true, &mut out);
    out
}

fn write_node(tree: &XmlTree, id: NodeId, prefixes: &PrefixMap, is_root: bool, out: &mut String) {
    let Some(node) = tree.node(id) else {
        return;
    };
    match &node.data {
        NodeData::Text(text) => out.push_str(&escape_xml(text)),
        NodeData::Element { name, attributes } => {
            let tag = qualified(prefixes, &name.ns, &name.local);
            out.push('<');
            out.push_str(&tag);
            if is_root {
                for (prefix, uri) in &prefixes.entries {
                    out.push_str(&format!(" xmlns:{}=\"{}\"", prefix, escape_xml(uri)));
                }
            }
            for attr in attributes {
                out.push_str(&format!(
                    " {}=\"{}\"",
                    qualified(prefixes, &attr.name.ns, &attr.name.local),
                    escape_xml(&attr.value)
                ));
            }
            if node.children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for &child in &node.children {
                write_node(tree, child, prefixes, false, out);
            }
            out.push_str(&format!("</{tag}>"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{QName, parse};

    #[test]
    fn test_serialize_built_tree() {
        let mut tree = XmlTree::new(QName::w("p"));
        let r = tree.create_element(QName::w("r"));
        let t = tree.create_element(QName::w("t"));
        tree.append_child(tree.root(), r);
        tree.append_child(r, t);
        tree.append_text(t, "a < b");
        tree.set_attribute(t, QName::new(XML, "space"), "preserve");

        let xml = to_xml(&tree);
        assert!(xml.ends_with(
            "<w:p xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:r><w:t xml:space=\"preserve\">a &lt; b</w:t></w:r></w:p>"
        ));
    }

    #[test]
    fn test_round_trip_keeps_structure() {
        let source = r#"<w:footnotes xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:footnote w:id="1"><w:p><w:r><w:t>Note</w:t></w:r></w:p></w:footnote></w:footnotes>"#;
        let tree = parse(source.as_bytes()).unwrap();
        let reparsed = parse(to_xml(&tree).as_bytes()).unwrap();

        assert_eq!(tree.node_count(), reparsed.node_count());
        assert_eq!(reparsed.text(reparsed.root()), "Note");
        let note = reparsed.children(reparsed.root())[0];
        assert_eq!(reparsed.attribute(note, QName::w("id")), Some("1"));
    }

    #[test]
    fn test_unknown_namespace_gets_generated_prefix() {
        let mut tree = XmlTree::new(QName::new("urn:example", "root"));
        tree.set_attribute(tree.root(), QName::local("plain"), "1");
        let xml = to_xml(&tree);
        assert!(xml.contains("<ns1:root xmlns:ns1=\"urn:example\" plain=\"1\"/>"));
    }
}
