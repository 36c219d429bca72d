//! A restricted path query language over [`XmlTree`].
//!
//! Supported syntax covers what the object model needs:
//!
//! - `w:p` / `./w:p`: element children
//! - `.//w:footnote` / `//w:footnote`: descendants at any depth
//! - `w:r/w:t`, `w:body//w:footnoteReference`: multi-step paths
//! - `*`: any element
//! - `w:footnote[@w:id='3']`, `w:footnote[@w:type]`: attribute predicates
//!
//! Prefixes resolve against the fixed namespace table.

use std::collections::{HashMap, HashSet};

use super::name::{QName, qn};
use super::tree::{NodeId, XmlTree};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Test<'a> {
    Any,
    Name(QName<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Predicate<'a> {
    attribute: QName<'a>,
    value: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step<'a> {
    axis: Axis,
    test: Test<'a>,
    predicate: Option<Predicate<'a>>,
}

fn parse_predicate(raw: &str) -> Result<Predicate<'_>> {
    let body = raw
        .strip_prefix('@')
        .ok_or_else(|| Error::InvalidQuery(format!("unsupported predicate [{raw}]")))?;
    match body.split_once('=') {
        None => Ok(Predicate {
            attribute: qn(body.trim())?,
            value: None,
        }),
        Some((name, value)) => {
            let value = value.trim();
            let unquoted = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
                .ok_or_else(|| Error::InvalidQuery(format!("unquoted value in [{raw}]")))?;
            Ok(Predicate {
                attribute: qn(name.trim())?,
                value: Some(unquoted),
            })
        }
    }
}

fn parse_step(raw: &str, axis: Axis) -> Result<Step<'_>> {
    let (name, predicate) = match raw.split_once('[') {
        Some((name, rest)) => {
            let inner = rest
                .strip_suffix(']')
                .ok_or_else(|| Error::InvalidQuery(format!("unterminated predicate in {raw}")))?;
            (name, Some(parse_predicate(inner)?))
        }
        None => (raw, None),
    };
    let test = match name {
        "" => return Err(Error::InvalidQuery("empty step".to_string())),
        "*" => Test::Any,
        name => Test::Name(qn(name)?),
    };
    Ok(Step {
        axis,
        test,
        predicate,
    })
}

fn parse_path(path: &str) -> Result<Vec<Step<'_>>> {
    let mut rest = path.trim();
    rest = rest.strip_prefix('.').unwrap_or(rest);

    let mut steps = Vec::new();
    let mut axis = Axis::Child;
    if let Some(r) = rest.strip_prefix("//") {
        axis = Axis::Descendant;
        rest = r;
    } else if let Some(r) = rest.strip_prefix('/') {
        rest = r;
    }

    while !rest.is_empty() {
        let end = rest.find('/').unwrap_or(rest.len());
        steps.push(parse_step(&rest[..end], axis)?);
        rest = &rest[end..];
        if let Some(r) = rest.strip_prefix("//") {
            axis = Axis::Descendant;
            rest = r;
        } else if let Some(r) = rest.strip_prefix('/') {
            axis = Axis::Child;
            rest = r;
        }
    }

    if steps.is_empty() {
        return Err(Error::InvalidQuery(format!("empty path {path:?}")));
    }
    Ok(steps)
}

fn matches(tree: &XmlTree, id: NodeId, step: &Step<'_>) -> bool {
    let name_ok = match step.test {
        Test::Any => tree.name(id).is_some(),
        Test::Name(name) => tree.is_element(id, name),
    };
    if !name_ok {
        return false;
    }
    match &step.predicate {
        None => true,
        Some(pred) => match (tree.attribute(id, pred.attribute), pred.value) {
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
            (None, _) => false,
        },
    }
}

impl XmlTree {
    /// Evaluate a path query relative to `context`, returning matching
    /// elements in document order without duplicates.
    pub fn query(&self, context: NodeId, path: &str) -> Result<Vec<NodeId>> {
        let steps = parse_path(path)?;
        let mut current = vec![context];

        for step in &steps {
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for &ctx in &current {
                let candidates: Vec<NodeId> = match step.axis {
                    Axis::Child => self.children(ctx).to_vec(),
                    Axis::Descendant => self.descendants(ctx).skip(1).collect(),
                };
                for id in candidates {
                    if matches(self, id, step) && seen.insert(id) {
                        next.push(id);
                    }
                }
            }
            if current.len() > 1 && step.axis == Axis::Descendant {
                let order: HashMap<NodeId, usize> = self
                    .descendants(context)
                    .enumerate()
                    .map(|(i, id)| (id, i))
                    .collect();
                next.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
            }
            current = next;
        }

        Ok(current)
    }
}
