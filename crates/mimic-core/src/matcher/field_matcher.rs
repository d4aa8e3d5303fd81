//! Matchers for multi-valued fields (headers and query parameters).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Deref;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::registry::MatcherRegistry;
use super::string_matcher::{float_text, StringMatcher};

/// Observed multi-valued fields: name to values in arrival order.
pub type MultiMap = HashMap<String, Vec<String>>;

/// Conjunction of string matchers over a multi-valued field.
///
/// Every matcher must be satisfied by at least one observed value. The search
/// for each matcher is independent, so one observed value may satisfy several
/// matchers.
///
/// Accepts a bare scalar, a single matcher object or a list; always serializes
/// as a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StringMatcherSet(Vec<StringMatcher>);

impl StringMatcherSet {
    pub fn new(matchers: Vec<StringMatcher>) -> Self {
        Self(matchers)
    }

    pub fn matches(&self, values: &[String]) -> bool {
        self.matches_in(MatcherRegistry::global(), values)
    }

    pub fn matches_in(&self, registry: &MatcherRegistry, values: &[String]) -> bool {
        // More constraints than values can never be satisfied.
        if self.0.len() > values.len() {
            return false;
        }
        self.0
            .iter()
            .all(|matcher| values.iter().any(|v| matcher.matches_in(registry, v)))
    }

    pub fn into_inner(self) -> Vec<StringMatcher> {
        self.0
    }
}

impl Deref for StringMatcherSet {
    type Target = [StringMatcher];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<StringMatcher>> for StringMatcherSet {
    fn from(matchers: Vec<StringMatcher>) -> Self {
        Self(matchers)
    }
}

impl From<StringMatcher> for StringMatcherSet {
    fn from(matcher: StringMatcher) -> Self {
        Self(vec![matcher])
    }
}

impl<'de> Deserialize<'de> for StringMatcherSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StringMatcherSetVisitor)
    }
}

struct StringMatcherSetVisitor;

impl<'de> Visitor<'de> for StringMatcherSetVisitor {
    type Value = StringMatcherSet;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string, a {matcher, value} object or a list of them")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(v).into())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(v).into())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(v.to_string()).into())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(v.to_string()).into())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(v.to_string()).into())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(StringMatcher::equal(float_text(v)).into())
    }

    fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        // Single object - wrap in a one-entry set
        let matcher = StringMatcher::deserialize(de::value::MapAccessDeserializer::new(map))?;
        Ok(matcher.into())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut matchers = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(matcher) = seq.next_element::<StringMatcher>()? {
            matchers.push(matcher);
        }
        Ok(StringMatcherSet(matchers))
    }
}

/// Field name to [`StringMatcherSet`].
///
/// Every declared field must be observed and satisfy its set. Serialized with
/// sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MultiFieldMatcher(BTreeMap<String, StringMatcherSet>);

impl MultiFieldMatcher {
    pub fn new(fields: BTreeMap<String, StringMatcherSet>) -> Self {
        Self(fields)
    }

    /// Match with exact field-name lookup (query parameters).
    pub fn matches(&self, fields: &MultiMap) -> bool {
        self.matches_in(MatcherRegistry::global(), fields)
    }

    pub fn matches_in(&self, registry: &MatcherRegistry, fields: &MultiMap) -> bool {
        if self.0.len() > fields.len() {
            return false;
        }
        self.0.iter().all(|(name, set)| {
            fields
                .get(name)
                .is_some_and(|values| set.matches_in(registry, values))
        })
    }

    /// Match with case-insensitive field-name lookup (HTTP headers).
    ///
    /// An exact name wins over a case-insensitive one.
    pub fn matches_headers(&self, headers: &MultiMap) -> bool {
        self.matches_headers_in(MatcherRegistry::global(), headers)
    }

    pub fn matches_headers_in(&self, registry: &MatcherRegistry, headers: &MultiMap) -> bool {
        if self.0.len() > headers.len() {
            return false;
        }
        self.0.iter().all(|(name, set)| {
            header_values(headers, name).is_some_and(|values| set.matches_in(registry, values))
        })
    }

    pub fn get(&self, name: &str) -> Option<&StringMatcherSet> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StringMatcherSet)> {
        self.0.iter()
    }
}

impl FromIterator<(String, StringMatcherSet)> for MultiFieldMatcher {
    fn from_iter<I: IntoIterator<Item = (String, StringMatcherSet)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Values of a header, looked up by exact name first, then ignoring case.
pub(crate) fn header_values<'a>(headers: &'a MultiMap, name: &str) -> Option<&'a Vec<String>> {
    headers.get(name).or_else(|| {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values)
    })
}
