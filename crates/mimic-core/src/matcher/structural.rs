//! Structural equality for semi-structured documents.
//!
//! Both XML and JSON documents are decoded into the same [`Node`] tree and
//! compared with one recursive walk:
//!
//! - lists are compared pairwise by index (sibling order matters)
//! - maps must have the same key set, in any order
//! - scalars must be of the same kind and carry the same value
//! - a text leaf equal to [`IGNORE_PLACEHOLDER`] on either side matches any
//!   subtree, including nested maps and lists
//!
//! XML elements become maps whose entries are attributes (`@name`) and child
//! elements (repeated sibling tags become a list under one key). An element
//! holding only text becomes a text leaf.

use std::collections::HashMap;
use std::fmt;

use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};
use sxd_document::parser;

/// Leaf value that matches any subtree.
pub const IGNORE_PLACEHOLDER: &str = "${xmlunit.ignore}";

const ATTRIBUTE_PREFIX: char = '@';
const TEXT_KEY: &str = "#text";

/// Decoded document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Node>),
    Map(HashMap<String, Node>),
}

impl Node {
    fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::Text(_) => "string",
            Node::List(_) => "list",
            Node::Map(_) => "map",
        }
    }

    fn is_placeholder(&self) -> bool {
        matches!(self, Node::Text(text) if text == IGNORE_PLACEHOLDER)
    }

    /// Decode an XML document.
    pub fn from_xml(document: &str) -> Result<Node, String> {
        let package = parser::parse(document).map_err(|e| format!("{e:?}"))?;
        let document = package.as_document();
        let root = document
            .root()
            .children()
            .into_iter()
            .find_map(|child| match child {
                ChildOfRoot::Element(element) => Some(element),
                _ => None,
            })
            .ok_or_else(|| "document has no root element".to_string())?;

        let mut top = HashMap::with_capacity(1);
        top.insert(root.name().local_part().to_string(), decode_element(root));
        Ok(Node::Map(top))
    }

    /// Decode a JSON document.
    pub fn from_json(document: &str) -> Result<Node, String> {
        let value: serde_json::Value = serde_json::from_str(document).map_err(|e| e.to_string())?;
        Ok(Node::from(value))
    }
}

fn decode_element(element: Element<'_>) -> Node {
    let mut entries: HashMap<String, Node> = HashMap::new();

    for attribute in element.attributes() {
        entries.insert(
            format!("{ATTRIBUTE_PREFIX}{}", attribute.name().local_part()),
            Node::Text(attribute.value().to_string()),
        );
    }

    let mut text = String::new();
    for child in element.children() {
        match child {
            ChildOfElement::Element(child) => {
                let name = child.name().local_part().to_string();
                let node = decode_element(child);
                // decode_element never yields a list, so an existing list is a
                // run of repeated siblings.
                let merged = match entries.remove(&name) {
                    None => node,
                    Some(Node::List(mut siblings)) => {
                        siblings.push(node);
                        Node::List(siblings)
                    }
                    Some(previous) => Node::List(vec![previous, node]),
                };
                entries.insert(name, merged);
            }
            ChildOfElement::Text(fragment) => text.push_str(fragment.text()),
            _ => {}
        }
    }

    let text = text.trim();
    if entries.is_empty() {
        return Node::Text(text.to_string());
    }
    if !text.is_empty() {
        entries.insert(TEXT_KEY.to_string(), Node::Text(text.to_string()));
    }
    Node::Map(entries)
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Node::Text(s),
            Value::Array(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Map(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => f.write_str("null"),
            Node::Bool(b) => write!(f, "{b}"),
            Node::Number(n) => write!(f, "{n}"),
            Node::Text(s) => write!(f, "{s:?}"),
            Node::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Node::Map(entries) => {
                // Sorted so the same tree always renders the same way.
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {}", entries[key])?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Compare two trees. Returns an empty string when they match, otherwise a
/// description of the first differing subtrees.
pub fn compare(expected: &Node, actual: &Node) -> String {
    let mut path = Vec::new();
    walk(expected, actual, &mut path).unwrap_or_default()
}

fn walk(expected: &Node, actual: &Node, path: &mut Vec<String>) -> Option<String> {
    if expected.is_placeholder() || actual.is_placeholder() {
        return None;
    }

    match (expected, actual) {
        (Node::List(left), Node::List(right)) => {
            if left.len() != right.len() {
                return Some(format_diff(path, expected, actual));
            }
            for (index, (l, r)) in left.iter().zip(right).enumerate() {
                path.push(index.to_string());
                let diff = walk(l, r, path);
                path.pop();
                if diff.is_some() {
                    return diff;
                }
            }
            None
        }
        (Node::Map(left), Node::Map(right)) => {
            if left.len() != right.len() {
                return Some(format_diff(path, expected, actual));
            }
            for (key, l) in left {
                let Some(r) = right.get(key) else {
                    return Some(format_diff(path, expected, actual));
                };
                path.push(key.clone());
                let diff = walk(l, r, path);
                path.pop();
                if diff.is_some() {
                    return diff;
                }
            }
            None
        }
        (Node::Text(l), Node::Text(r)) if l == r => None,
        (Node::Number(l), Node::Number(r)) if l == r => None,
        (Node::Bool(l), Node::Bool(r)) if l == r => None,
        (Node::Null, Node::Null) => None,
        _ => Some(format_diff(path, expected, actual)),
    }
}

fn format_diff(path: &[String], expected: &Node, actual: &Node) -> String {
    let location = if path.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", path.join("/"))
    };
    if expected.kind() != actual.kind() {
        format!(
            "at {location}: expected {} {expected} but found {} {actual}",
            expected.kind(),
            actual.kind()
        )
    } else {
        format!("at {location}: {expected} is different than {actual}")
    }
}

/// Diff of two XML documents, as reported by the `ShouldEqualXML` matcher.
pub fn diff_xml(actual: &str, expected: &str) -> String {
    let expected = match Node::from_xml(expected) {
        Ok(node) => node,
        Err(e) => return format!("error decoding expected document `{expected}`, err is: {e}"),
    };
    let actual_node = match Node::from_xml(actual) {
        Ok(node) => node,
        Err(e) => return format!("error decoding `{actual}`, err is: {e}"),
    };
    compare(&expected, &actual_node)
}

/// Diff of two JSON documents, as reported by the `ShouldEqualJSON` matcher.
pub fn diff_json(actual: &str, expected: &str) -> String {
    let expected = match Node::from_json(expected) {
        Ok(node) => node,
        Err(e) => return format!("error decoding expected document `{expected}`, err is: {e}"),
    };
    let actual_node = match Node::from_json(actual) {
        Ok(node) => node,
        Err(e) => return format!("error decoding `{actual}`, err is: {e}"),
    };
    compare(&expected, &actual_node)
}
