//! Body matching configuration and evaluation.
//!
//! A body rule is either one [`StringMatcher`] applied to the whole body text,
//! or a map from path expression to [`StringMatcher`] applied to values
//! extracted from a structured (JSON or form-encoded) body.

use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::{trace, warn};

use super::field_matcher::{header_values, MultiMap};
use super::registry::MatcherRegistry;
use super::string_matcher::StringMatcher;
use crate::urlencoded;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body matching rule. Exactly one form is ever populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyMatcher {
    /// Matcher applied to the raw body text.
    Whole(StringMatcher),

    /// Path expression to matcher, applied to the parsed body.
    Fields(BTreeMap<String, StringMatcher>),
}

impl BodyMatcher {
    pub fn matches(&self, headers: &MultiMap, body: &str) -> bool {
        self.matches_in(MatcherRegistry::global(), headers, body)
    }

    /// Check if a body matches this matcher.
    ///
    /// A body that cannot be parsed, or that lacks one of the declared paths,
    /// never matches the `Fields` form.
    pub fn matches_in(&self, registry: &MatcherRegistry, headers: &MultiMap, body: &str) -> bool {
        let fields = match self {
            BodyMatcher::Whole(matcher) => return matcher.matches_in(registry, body),
            BodyMatcher::Fields(fields) => fields,
        };

        let document = match form_document(headers, body) {
            Some(document) => document,
            None => match serde_json::from_str::<Value>(body) {
                Ok(document) => document,
                Err(e) => {
                    trace!(error = %e, "Body is not a structured document");
                    return false;
                }
            },
        };

        fields.iter().all(|(path, matcher)| {
            let Some(value) = extract_path(&document, path) else {
                trace!(path = %path, "Path not found in body");
                return false;
            };
            matcher.matches_in(registry, &value_text(value))
        })
    }
}

/// Reinterpret a form-encoded body as a flat JSON object.
///
/// Returns `None` when the body is not form-encoded or cannot be decoded, in
/// which case the caller falls back to the raw text.
fn form_document(headers: &MultiMap, body: &str) -> Option<Value> {
    let is_form = header_values(headers, "Content-Type")
        .and_then(|values| values.first())
        .is_some_and(|content_type| {
            content_type
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .eq_ignore_ascii_case(FORM_CONTENT_TYPE)
        });
    if !is_form {
        return None;
    }

    match urlencoded::parse(body) {
        Ok(pairs) => {
            let object = urlencoded::group(pairs)
                .into_iter()
                .map(|(key, mut values)| {
                    let value = if values.len() == 1 {
                        Value::String(values.remove(0))
                    } else {
                        Value::Array(values.into_iter().map(Value::String).collect())
                    };
                    (key, value)
                })
                .collect();
            Some(Value::Object(object))
        }
        Err(e) => {
            warn!(error = %e, "Failed to read request body as encoded form");
            None
        }
    }
}

/// Extract a value from a parsed document with a dotted path.
///
/// Supports:
/// - `user.name` / `$.user.name` - nested field
/// - `items[0]`, `items.[0]`, `items.0` - array index
/// - `items[*].id` - first element that yields a value
pub fn extract_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let path = path.strip_prefix('$').unwrap_or(path);
    navigate(document, path)
}

fn navigate<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }

    if let Some(bracketed) = path.strip_prefix('[') {
        let end = bracketed.find(']')?;
        let index = &bracketed[..end];
        let rest = &bracketed[end + 1..];
        let rest = rest.strip_prefix('.').unwrap_or(rest);
        let items = value.as_array()?;

        if index == "*" {
            return items.iter().find_map(|item| navigate(item, rest));
        }
        // [:0] is accepted as a synonym for [0]
        let index = index.strip_prefix(':').unwrap_or(index);
        let item = items.get(index.parse::<usize>().ok()?)?;
        return navigate(item, rest);
    }

    let end = path.find(|c: char| c == '.' || c == '[').unwrap_or(path.len());
    let (segment, rest) = path.split_at(end);
    let rest = rest.strip_prefix('.').unwrap_or(rest);

    let next = match value {
        Value::Object(map) => map.get(segment)?,
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
        _ => return None,
    };
    navigate(next, rest)
}

/// Text form of an extracted value, whatever its JSON type.
///
/// Floats print in plain decimal with the fewest digits that round-trip, so
/// `1.0` reads `"1"` and `1e3` reads `"1000"`.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) if n.is_f64() => n.as_f64().map(|f| f.to_string()).unwrap_or_default(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => value.to_string(),
    }
}

impl Serialize for BodyMatcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BodyMatcher::Whole(matcher) => matcher.serialize(serializer),
            BodyMatcher::Fields(fields) => fields.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for BodyMatcher {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        BodyMatcher::from_value(value).map_err(de::Error::custom)
    }
}

impl BodyMatcher {
    /// Interpret a buffered rule document.
    ///
    /// An object whose `matcher` key names a registered matcher is the
    /// whole-body form; any other object is a path map. A single-path rule
    /// whose path is literally `matcher` is therefore read as whole-body.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let names_registered_matcher = match &value {
            Value::Object(map) => map
                .get("matcher")
                .and_then(Value::as_str)
                .is_some_and(|name| MatcherRegistry::global().contains(name)),
            // Bare scalars are the whole-body shorthand.
            _ => true,
        };

        if names_registered_matcher {
            StringMatcher::deserialize(value).map(BodyMatcher::Whole)
        } else {
            BTreeMap::<String, StringMatcher>::deserialize(value).map(BodyMatcher::Fields)
        }
    }
}
