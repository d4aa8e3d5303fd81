//! Registry of named comparison predicates.
//!
//! A [`MatcherRegistry`] is built once through [`RegistryBuilder`] and is
//! immutable afterwards, so it can be shared freely between threads. The
//! process-wide default returned by [`MatcherRegistry::global`] holds the
//! built-in matchers and is the one consulted when rule definitions are
//! deserialized.
//!
//! Every built-in predicate is registered together with a negated counterpart
//! that inverts the boolean outcome.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::assertions;

pub const SHOULD_EQUAL: &str = "ShouldEqual";
pub const SHOULD_NOT_EQUAL: &str = "ShouldNotEqual";
pub const SHOULD_RESEMBLE: &str = "ShouldResemble";
pub const SHOULD_NOT_RESEMBLE: &str = "ShouldNotResemble";
pub const SHOULD_ALMOST_EQUAL: &str = "ShouldAlmostEqual";
pub const SHOULD_NOT_ALMOST_EQUAL: &str = "ShouldNotAlmostEqual";
pub const SHOULD_CONTAIN_SUBSTRING: &str = "ShouldContainSubstring";
pub const SHOULD_NOT_CONTAIN_SUBSTRING: &str = "ShouldNotContainSubstring";
pub const SHOULD_START_WITH: &str = "ShouldStartWith";
pub const SHOULD_NOT_START_WITH: &str = "ShouldNotStartWith";
pub const SHOULD_END_WITH: &str = "ShouldEndWith";
pub const SHOULD_NOT_END_WITH: &str = "ShouldNotEndWith";
pub const SHOULD_EQUAL_JSON: &str = "ShouldEqualJSON";
pub const SHOULD_NOT_EQUAL_JSON: &str = "ShouldNotEqualJSON";
pub const SHOULD_EQUAL_XML: &str = "ShouldEqualXML";
pub const SHOULD_NOT_EQUAL_XML: &str = "ShouldNotEqualXML";
pub const SHOULD_MATCH: &str = "ShouldMatch";
pub const SHOULD_NOT_MATCH: &str = "ShouldNotMatch";
pub const SHOULD_BE_EMPTY: &str = "ShouldBeEmpty";
pub const SHOULD_NOT_BE_EMPTY: &str = "ShouldNotBeEmpty";

/// Matcher implied by the shorthand (bare string) form.
pub const DEFAULT_MATCHER: &str = SHOULD_EQUAL;

/// Comparison predicate: empty string on success, explanation on failure.
pub type Predicate = fn(&str, &Expectation) -> String;

static GLOBAL: Lazy<MatcherRegistry> =
    Lazy::new(|| RegistryBuilder::new().with_defaults().build());

/// Expected side of a comparison.
///
/// Pattern-based matchers carry their compiled expression so it is built once
/// per rule instead of once per request.
#[derive(Debug, Clone)]
pub struct Expectation {
    value: String,
    pattern: Option<Arc<Regex>>,
}

impl Expectation {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            pattern: None,
        }
    }

    /// Build an expectation whose value is compiled as a regular expression.
    pub fn with_pattern(value: impl Into<String>) -> Result<Self, regex::Error> {
        let value = value.into();
        let regex = Regex::new(&value)?;
        Ok(Self {
            value,
            pattern: Some(Arc::new(regex)),
        })
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_deref()
    }
}

/// A registered predicate, possibly negated.
#[derive(Clone)]
pub struct Assertion {
    base: String,
    predicate: Predicate,
    negated: bool,
    pattern_based: bool,
}

impl Assertion {
    /// Evaluate against an observed value.
    ///
    /// A negated assertion inverts the outcome of its base predicate: it
    /// succeeds exactly when the base fails.
    pub fn evaluate(&self, actual: &str, expected: &Expectation) -> String {
        let diff = (self.predicate)(actual, expected);
        if !self.negated {
            return diff;
        }
        if diff.is_empty() {
            format!(
                "Expected {actual:?} not to satisfy {} {:?} (but it did)!",
                self.base,
                expected.value()
            )
        } else {
            String::new()
        }
    }

    /// Whether the expected value must compile as a regular expression.
    pub fn is_pattern_based(&self) -> bool {
        self.pattern_based
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Name of the positive predicate this assertion is built on.
    pub fn base(&self) -> &str {
        &self.base
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("base", &self.base)
            .field("negated", &self.negated)
            .field("pattern_based", &self.pattern_based)
            .finish()
    }
}

/// Immutable mapping from matcher name to predicate.
#[derive(Debug, Clone)]
pub struct MatcherRegistry {
    assertions: HashMap<String, Assertion>,
}

impl MatcherRegistry {
    /// Process-wide registry holding the built-in matchers.
    pub fn global() -> &'static MatcherRegistry {
        &GLOBAL
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&Assertion> {
        self.assertions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.assertions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.assertions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }
}

/// Builder for a [`MatcherRegistry`].
///
/// There is no way to add a predicate once [`build`](Self::build) has been
/// called.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    assertions: HashMap<String, Assertion>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every built-in matcher and its negated form.
    #[must_use]
    pub fn with_defaults(self) -> Self {
        self.register_pair(SHOULD_EQUAL, SHOULD_NOT_EQUAL, assertions::should_equal)
            .register_pair(
                SHOULD_RESEMBLE,
                SHOULD_NOT_RESEMBLE,
                assertions::should_resemble,
            )
            .register_pair(
                SHOULD_ALMOST_EQUAL,
                SHOULD_NOT_ALMOST_EQUAL,
                assertions::should_almost_equal,
            )
            .register_pair(
                SHOULD_CONTAIN_SUBSTRING,
                SHOULD_NOT_CONTAIN_SUBSTRING,
                assertions::should_contain_substring,
            )
            .register_pair(
                SHOULD_START_WITH,
                SHOULD_NOT_START_WITH,
                assertions::should_start_with,
            )
            .register_pair(
                SHOULD_END_WITH,
                SHOULD_NOT_END_WITH,
                assertions::should_end_with,
            )
            .register_pair(
                SHOULD_EQUAL_JSON,
                SHOULD_NOT_EQUAL_JSON,
                assertions::should_equal_json,
            )
            .register_pair(
                SHOULD_EQUAL_XML,
                SHOULD_NOT_EQUAL_XML,
                assertions::should_equal_xml,
            )
            .register_pattern_pair(SHOULD_MATCH, SHOULD_NOT_MATCH, assertions::should_match)
            .register_pair(
                SHOULD_BE_EMPTY,
                SHOULD_NOT_BE_EMPTY,
                assertions::should_be_empty,
            )
    }

    /// Register a single predicate under `name`, replacing any previous one.
    #[must_use]
    pub fn register(mut self, name: &str, predicate: Predicate) -> Self {
        self.insert(name, name, predicate, false, false);
        self
    }

    /// Register a predicate and its negated counterpart.
    #[must_use]
    pub fn register_pair(mut self, name: &str, negated_name: &str, predicate: Predicate) -> Self {
        self.insert(name, name, predicate, false, false);
        self.insert(negated_name, name, predicate, true, false);
        self
    }

    /// Like [`register_pair`](Self::register_pair), for predicates whose
    /// expected value is a regular expression validated at parse time.
    #[must_use]
    pub fn register_pattern_pair(
        mut self,
        name: &str,
        negated_name: &str,
        predicate: Predicate,
    ) -> Self {
        self.insert(name, name, predicate, false, true);
        self.insert(negated_name, name, predicate, true, true);
        self
    }

    fn insert(
        &mut self,
        name: &str,
        base: &str,
        predicate: Predicate,
        negated: bool,
        pattern_based: bool,
    ) {
        self.assertions.insert(
            name.to_owned(),
            Assertion {
                base: base.to_owned(),
                predicate,
                negated,
                pattern_based,
            },
        );
    }

    pub fn build(self) -> MatcherRegistry {
        MatcherRegistry {
            assertions: self.assertions,
        }
    }
}
