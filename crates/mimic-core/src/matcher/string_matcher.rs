//! A single `(matcher, value)` pair evaluated against one observed string.
//!
//! Accepted input shapes, in JSON or YAML:
//!
//! - a bare scalar, `"test"`, meaning `ShouldEqual` on that value
//! - an explicit object, `{"matcher": "ShouldMatch", "value": "^a"}`
//!
//! Output is always the explicit object.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{error, trace};

use super::registry::{Expectation, MatcherRegistry, DEFAULT_MATCHER};
use crate::error::MatcherError;

/// Validated matcher name plus expected value.
///
/// Immutable once built; cheap to clone (a compiled pattern is shared).
#[derive(Debug, Clone)]
pub struct StringMatcher {
    matcher: String,
    expected: Expectation,
}

impl StringMatcher {
    /// Build a matcher validated against the global registry.
    pub fn new(matcher: impl Into<String>, value: impl Into<String>) -> Result<Self, MatcherError> {
        Self::new_in(MatcherRegistry::global(), matcher, value)
    }

    /// Build a matcher validated against `registry`.
    ///
    /// Fails with [`MatcherError::UnknownMatcher`] if the name is not
    /// registered and with [`MatcherError::InvalidPattern`] if the matcher is
    /// pattern-based and `value` does not compile.
    pub fn new_in(
        registry: &MatcherRegistry,
        matcher: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, MatcherError> {
        let matcher = matcher.into();
        let value = value.into();

        let Some(assertion) = registry.get(&matcher) else {
            return Err(MatcherError::UnknownMatcher(matcher));
        };

        let expected = if assertion.is_pattern_based() {
            Expectation::with_pattern(value.as_str()).map_err(|e| MatcherError::InvalidPattern {
                matcher: matcher.clone(),
                pattern: value.clone(),
                reason: e.to_string(),
            })?
        } else {
            Expectation::new(value)
        };

        Ok(Self { matcher, expected })
    }

    /// Shorthand form: default matcher on `value`.
    pub fn equal(value: impl Into<String>) -> Self {
        Self {
            matcher: DEFAULT_MATCHER.to_string(),
            expected: Expectation::new(value),
        }
    }

    pub fn matcher(&self) -> &str {
        &self.matcher
    }

    pub fn value(&self) -> &str {
        self.expected.value()
    }

    /// Re-check this matcher against `registry`.
    pub fn validate_in(&self, registry: &MatcherRegistry) -> Result<(), MatcherError> {
        Self::new_in(registry, self.matcher.as_str(), self.value()).map(|_| ())
    }

    pub fn validate(&self) -> Result<(), MatcherError> {
        self.validate_in(MatcherRegistry::global())
    }

    /// Evaluate against the global registry.
    pub fn matches(&self, value: &str) -> bool {
        self.matches_in(MatcherRegistry::global(), value)
    }

    /// Evaluate against `registry`.
    ///
    /// A name missing from the registry is logged and treated as a non-match;
    /// evaluation never fails.
    pub fn matches_in(&self, registry: &MatcherRegistry, value: &str) -> bool {
        let Some(assertion) = registry.get(&self.matcher) else {
            error!(matcher = %self.matcher, "Invalid matcher");
            return false;
        };

        let diff = assertion.evaluate(value, &self.expected);
        if !diff.is_empty() {
            trace!(matcher = %self.matcher, "Value doesn't match:\n{diff}");
            return false;
        }
        true
    }
}

impl PartialEq for StringMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.matcher == other.matcher && self.value() == other.value()
    }
}

impl Eq for StringMatcher {}

impl fmt::Display for StringMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.matcher, self.value())
    }
}

impl Serialize for StringMatcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StringMatcher", 2)?;
        state.serialize_field("matcher", &self.matcher)?;
        state.serialize_field("value", self.value())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for StringMatcher {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StringMatcherVisitor)
    }
}

/// Explicit `{matcher, value}` object. Unknown keys are ignored.
#[derive(Deserialize)]
struct ExplicitMatcher {
    #[serde(default)]
    matcher: String,
    #[serde(default, deserialize_with = "scalar_text")]
    value: String,
}

struct StringMatcherVisitor;

impl<'de> Visitor<'de> for StringMatcherVisitor {
    type Value = StringMatcher;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string or a {matcher, value} object")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(float_text(v)))
    }

    fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let explicit = ExplicitMatcher::deserialize(de::value::MapAccessDeserializer::new(map))?;
        StringMatcher::new(explicit.matcher, explicit.value).map_err(de::Error::custom)
    }
}

/// Deserialize a scalar (string, number, boolean or null) as its text form.
pub(crate) fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarTextVisitor;

    impl<'de> Visitor<'de> for ScalarTextVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(float_text(v))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(ScalarTextVisitor)
}

/// Text of a float scalar as JSON prints it, so `1.0` stays `"1.0"`.
///
/// Only the loader's YAML reader sees the source spelling; a float reaching
/// a visitor has already lost it.
pub(crate) fn float_text(v: f64) -> String {
    serde_json::Number::from_f64(v).map_or_else(|| v.to_string(), |n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::registry::{SHOULD_MATCH, SHOULD_NOT_EQUAL};
    use tracing_test::traced_test;

    #[test]
    fn test_shorthand_json_round_trip() {
        let matcher: StringMatcher = serde_json::from_str(r#""test""#).unwrap();
        assert_eq!(matcher.matcher(), DEFAULT_MATCHER);
        assert_eq!(matcher.value(), "test");

        let serialized = serde_json::to_string(&matcher).unwrap();
        assert_eq!(serialized, r#"{"matcher":"ShouldEqual","value":"test"}"#);
    }

    #[test]
    fn test_explicit_json_round_trip() {
        let input = r#"{"matcher":"ShouldEqual","value":"test2"}"#;
        let matcher: StringMatcher = serde_json::from_str(input).unwrap();
        assert_eq!(matcher.matcher(), "ShouldEqual");
        assert_eq!(matcher.value(), "test2");
        assert_eq!(serde_json::to_string(&matcher).unwrap(), input);
    }

    #[test]
    fn test_yaml_shapes() {
        let shorthand: StringMatcher = serde_yaml::from_str("test").unwrap();
        assert_eq!(shorthand, StringMatcher::equal("test"));

        let explicit: StringMatcher =
            serde_yaml::from_str("matcher: ShouldContainSubstring\nvalue: test2\n").unwrap();
        assert_eq!(explicit.matcher(), "ShouldContainSubstring");
        assert_eq!(explicit.value(), "test2");

        let flow: StringMatcher =
            serde_yaml::from_str(r#"{"matcher":"ShouldEqual","value":"test2"}"#).unwrap();
        assert_eq!(flow.value(), "test2");

        assert!(serde_yaml::to_string(&explicit).is_ok());
    }

    #[test]
    fn test_scalar_shorthands_become_text() {
        let number: StringMatcher = serde_yaml::from_str("30").unwrap();
        assert_eq!(number.value(), "30");
        let boolean: StringMatcher = serde_json::from_str("true").unwrap();
        assert_eq!(boolean.value(), "true");
        let explicit: StringMatcher = serde_yaml::from_str("matcher: ShouldEqual\nvalue: 5").unwrap();
        assert_eq!(explicit.value(), "5");
    }

    #[test]
    fn test_float_scalars_keep_decimal_point() {
        let shorthand: StringMatcher = serde_yaml::from_str("1.0").unwrap();
        assert_eq!(shorthand.value(), "1.0");
        let explicit: StringMatcher = serde_json::from_str(r#"{"matcher": "ShouldEqual", "value": 2.0}"#).unwrap();
        assert_eq!(explicit.value(), "2.0");
        let set: crate::matcher::StringMatcherSet = serde_yaml::from_str("[1.0]").unwrap();
        assert_eq!(set[0].value(), "1.0");
    }

    #[test]
    fn test_unknown_matcher_rejected_on_parse() {
        let err = serde_json::from_str::<StringMatcher>(r#"{"matcher":"ShouldBeAwesome","value":"x"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid matcher"), "{err}");
    }

    #[test]
    fn test_missing_matcher_rejected_on_parse() {
        let err = serde_json::from_str::<StringMatcher>(r#"{"value":"x"}"#).unwrap_err();
        assert!(err.to_string().contains(r#"invalid matcher """#), "{err}");
    }

    #[test]
    fn test_invalid_regex_rejected_on_parse() {
        let err = serde_json::from_str::<StringMatcher>(r#"{"matcher":"ShouldNotMatch","value":"(("}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid regular expression"), "{err}");
    }

    #[test]
    fn test_array_is_not_a_string_matcher() {
        assert!(serde_json::from_str::<StringMatcher>(r#"["ShouldEqual", "x"]"#).is_err());
    }

    #[test]
    fn test_new_validates() {
        assert!(matches!(
            StringMatcher::new("Nope", "x"),
            Err(MatcherError::UnknownMatcher(name)) if name == "Nope"
        ));
        assert!(matches!(
            StringMatcher::new(SHOULD_MATCH, "[a-"),
            Err(MatcherError::InvalidPattern { .. })
        ));
        assert!(StringMatcher::new(SHOULD_MATCH, "^a").is_ok());
    }

    #[test]
    fn test_matches() {
        let equal = StringMatcher::equal("abc");
        assert!(equal.matches("abc"));
        assert!(!equal.matches("abcd"));

        let not_equal = StringMatcher::new(SHOULD_NOT_EQUAL, "abc").unwrap();
        assert!(!not_equal.matches("abc"));
        assert!(not_equal.matches("abcd"));

        let pattern = StringMatcher::new(SHOULD_MATCH, r"^/api/v\d+").unwrap();
        assert!(pattern.matches("/api/v2/items"));
        assert!(!pattern.matches("/api/items"));
    }

    #[test]
    #[traced_test]
    fn test_name_missing_from_registry_is_logged_non_match() {
        let empty = MatcherRegistry::builder().build();
        let matcher = StringMatcher::equal("abc");

        assert!(!matcher.matches_in(&empty, "abc"));
        assert!(logs_contain("Invalid matcher"));
        assert!(matcher.validate_in(&empty).is_err());
        assert!(matcher.validate().is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(StringMatcher::equal("x").to_string(), r#"ShouldEqual "x""#);
    }
}
