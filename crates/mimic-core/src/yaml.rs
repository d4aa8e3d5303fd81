//! YAML reading that keeps the source spelling of numeric scalars.
//!
//! `serde_yaml` resolves a plain scalar before any visitor sees it, so `1.0`,
//! `1.10` and `1e3` would reach a matcher as floats and be printed back as
//! something else. Documents are read in two passes instead: the first builds
//! a `serde_yaml::Value` to learn the shape of every node, the second walks
//! the same text and takes each numeric leaf with `deserialize_str`, which
//! hands over the scalar as written.

use std::fmt;

use serde::de::{self, DeserializeOwned, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserializer;
use serde_json::{Map, Number, Value};
use serde_yaml::{Mapping, Value as Yaml};

use crate::error::LoadError;

/// Parse a YAML document into a JSON value.
///
/// A number whose JSON rendering equals its source stays a number. Any other
/// spelling (`1.10`, `1e3`, `0x1F`, `+5`) becomes a string holding the text
/// as written. A blank document is `null`.
pub fn to_json(text: &str) -> Result<Value, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    let shape: Yaml = serde_yaml::from_str(text)?;
    Shaped(&shape).deserialize(serde_yaml::Deserializer::from_str(text))
}

/// Deserialize `T` from YAML through [`to_json`].
pub fn from_str<T: DeserializeOwned>(text: &str) -> Result<T, LoadError> {
    let value = to_json(text)?;
    Ok(serde_json::from_value(value)?)
}

fn number_leaf(number: &serde_yaml::Number, text: String) -> Value {
    let rendered = if let Some(u) = number.as_u64() {
        Some(Number::from(u))
    } else if let Some(i) = number.as_i64() {
        Some(Number::from(i))
    } else {
        number.as_f64().and_then(Number::from_f64)
    };

    match rendered {
        Some(n) if n.to_string() == text => Value::Number(n),
        _ => Value::String(text),
    }
}

/// Reads one node, guided by its already-parsed shape.
struct Shaped<'a>(&'a Yaml);

impl<'de> DeserializeSeed<'de> for Shaped<'_> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        match self.0 {
            Yaml::Number(number) => {
                let text = deserializer.deserialize_str(SourceText)?;
                Ok(number_leaf(number, text))
            }
            Yaml::Sequence(items) => deserializer.deserialize_seq(SequenceVisitor(items)),
            Yaml::Mapping(mapping) => deserializer.deserialize_map(MappingVisitor(mapping)),
            Yaml::Null => {
                deserializer.deserialize_ignored_any(IgnoredAny)?;
                Ok(Value::Null)
            }
            Yaml::Bool(b) => {
                deserializer.deserialize_ignored_any(IgnoredAny)?;
                Ok(Value::Bool(*b))
            }
            Yaml::String(s) => {
                deserializer.deserialize_ignored_any(IgnoredAny)?;
                Ok(Value::String(s.clone()))
            }
            Yaml::Tagged(_) => {
                deserializer.deserialize_ignored_any(IgnoredAny)?;
                serde_json::to_value(self.0).map_err(de::Error::custom)
            }
        }
    }
}

struct SourceText;

impl<'de> Visitor<'de> for SourceText {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a scalar")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(v)
    }
}

/// Mapping keys are taken as written: `1.0:` is the key `"1.0"`.
struct KeyText;

impl<'de> DeserializeSeed<'de> for KeyText {
    type Value = String;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_str(SourceText)
    }
}

struct SequenceVisitor<'a>(&'a [Yaml]);

impl<'de> Visitor<'de> for SequenceVisitor<'_> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a sequence of {} items", self.0.len())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(self.0.len());
        for shape in self.0 {
            match seq.next_element_seed(Shaped(shape))? {
                Some(item) => items.push(item),
                None => return Err(de::Error::invalid_length(items.len(), &self)),
            }
        }
        Ok(Value::Array(items))
    }
}

struct MappingVisitor<'a>(&'a Mapping);

impl<'de> Visitor<'de> for MappingVisitor<'_> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a mapping of {} entries", self.0.len())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut object = Map::new();
        for (_, shape) in self.0 {
            let Some(key) = map.next_key_seed(KeyText)? else {
                return Err(de::Error::invalid_length(object.len(), &self));
            };
            let value = map.next_value_seed(Shaped(shape))?;
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::StringMatcher;
    use serde_json::json;

    #[test]
    fn test_numeric_spelling_is_kept() {
        let value = to_json("a: 1.0\nb: 1.10\nc: 1e3\nd: 200\ne: 0x1F\n").unwrap();
        assert_eq!(
            value,
            json!({"a": 1.0, "b": "1.10", "c": "1e3", "d": 200, "e": "0x1F"})
        );
    }

    #[test]
    fn test_string_matcher_scalars_keep_source_text() {
        for text in ["1.0", "1.10", "1e3"] {
            let shorthand: StringMatcher = from_str(text).unwrap();
            assert_eq!(shorthand.value(), text);

            let explicit: StringMatcher =
                from_str(&format!("matcher: ShouldEqual\nvalue: {text}\n")).unwrap();
            assert_eq!(explicit.value(), text);
        }
    }

    #[test]
    fn test_other_scalars_and_nesting() {
        let value = to_json(
            "list:\n  - x\n  - true\n  - ~\n  - [1, 2.50]\nquoted: '1.10'\n1.0: key\nnested:\n  deep: -3\n",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({
                "list": ["x", true, null, [1, "2.50"]],
                "quoted": "1.10",
                "1.0": "key",
                "nested": {"deep": -3}
            })
        );
    }

    #[test]
    fn test_anchors_are_followed() {
        let value = to_json("base: &v 1.10\ncopy: *v\n").unwrap();
        assert_eq!(value, json!({"base": "1.10", "copy": "1.10"}));
    }

    #[test]
    fn test_blank_document_is_null() {
        assert_eq!(to_json("").unwrap(), Value::Null);
        assert_eq!(to_json("  \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_syntax_error() {
        assert!(to_json("- a: [").is_err());
        assert!(matches!(
            from_str::<StringMatcher>("- a: ["),
            Err(LoadError::Yaml(_))
        ));
    }
}
