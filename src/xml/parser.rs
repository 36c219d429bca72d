//! XML part parsing into an [`XmlTree`].

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::name::{Name, QName, XML};
use super::tree::{NodeId, XmlTree};
use crate::error::{Error, Result};
use crate::util::{decode_text, extract_xml_encoding, resolve_entity, strip_bom};

/// In-scope namespace declarations for one open element.
#[derive(Default)]
struct Scope {
    bindings: Vec<(String, String)>,
}

struct Namespaces {
    scopes: Vec<Scope>,
}

impl Namespaces {
    fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    fn resolve(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML);
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.bindings.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

/// Split `prefix:local` into its parts (prefix is empty when absent).
fn split_name(raw: &str) -> (&str, &str) {
    raw.split_once(':').unwrap_or(("", raw))
}

/// Parse an XML part into a tree.
///
/// Adjacent text, CDATA and entity references are joined before the
/// whitespace check: a run that is whitespace only once joined is dropped
/// unless the enclosing element carries `xml:space="preserve"`, which is
/// how WordprocessingML marks significant whitespace.
pub fn parse(bytes: &[u8]) -> Result<XmlTree> {
    let bytes = strip_bom(bytes);
    let content = decode_text(bytes, extract_xml_encoding(bytes));

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(false);

    let mut tree: Option<XmlTree> = None;
    let mut stack: Vec<NodeId> = Vec::new();
    let mut namespaces = Namespaces::new();
    let mut declared: Vec<(String, String)> = Vec::new();
    let mut pending = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                flush_text(&mut tree, &stack, &mut pending);
                let id = open_element(&e, &mut tree, &stack, &mut namespaces, &mut declared)?;
                stack.push(id);
            }
            Event::Empty(e) => {
                flush_text(&mut tree, &stack, &mut pending);
                open_element(&e, &mut tree, &stack, &mut namespaces, &mut declared)?;
                namespaces.scopes.pop();
            }
            Event::End(_) => {
                flush_text(&mut tree, &stack, &mut pending);
                stack.pop();
                namespaces.scopes.pop();
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                pending.push_str(&unescape(&raw)?);
            }
            Event::CData(e) => {
                pending.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity) {
                    pending.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut tree =
        tree.ok_or_else(|| Error::MalformedXml("document has no root element".to_string()))?;
    tree.declared = declared;
    Ok(tree)
}

fn open_element(
    e: &BytesStart<'_>,
    tree: &mut Option<XmlTree>,
    stack: &[NodeId],
    namespaces: &mut Namespaces,
    declared: &mut Vec<(String, String)>,
) -> Result<NodeId> {
    // Namespace declarations apply to the element carrying them, so collect
    // them before resolving any names.
    let mut scope = Scope::default();
    let mut raw_attributes: Vec<(String, String)> = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw_value = String::from_utf8_lossy(&attr.value).into_owned();
        let value = unescape(&raw_value)?.into_owned();
        if key == "xmlns" {
            scope.bindings.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            if !declared.iter().any(|(p, _)| p == prefix) {
                declared.push((prefix.to_string(), value.clone()));
            }
            scope.bindings.push((prefix.to_string(), value));
        } else {
            raw_attributes.push((key, value));
        }
    }
    namespaces.scopes.push(scope);

    let raw_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let (prefix, local) = split_name(&raw_name);
    let ns = match namespaces.resolve(prefix) {
        Some(uri) => uri,
        None if prefix.is_empty() => "",
        None => return Err(Error::UnknownPrefix(prefix.to_string())),
    };
    let name = Name {
        ns: ns.into(),
        local: local.into(),
    };

    let tree = tree.get_or_insert_with(|| XmlTree::new(name.as_qname()));
    let id = match stack.last() {
        Some(&parent) => {
            let id = tree.create_element(name.as_qname());
            tree.append_child(parent, id);
            id
        }
        None => tree.root(),
    };

    for (key, value) in raw_attributes {
        let (prefix, local) = split_name(&key);
        // Unprefixed attributes are in no namespace, regardless of any default.
        let ns = if prefix.is_empty() {
            ""
        } else {
            namespaces
                .resolve(prefix)
                .ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))?
        };
        tree.set_attribute(id, QName::new(ns, local), value);
    }

    Ok(id)
}

/// Move buffered character data into the open element.
fn flush_text(tree: &mut Option<XmlTree>, stack: &[NodeId], pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let text = std::mem::take(pending);
    let (Some(tree), Some(&parent)) = (tree.as_mut(), stack.last()) else {
        return;
    };
    let preserve = tree.attribute(parent, QName::new(XML, "space")) == Some("preserve");
    if text.trim().is_empty() && !preserve {
        return;
    }
    tree.append_text(parent, &text);
}
