//! Named string matchers and their composites.
//!
//! Every comparison in a rule is a [`StringMatcher`]: a matcher name looked up
//! in a [`MatcherRegistry`] plus an expected value. Composites build on it:
//!
//! - [`StringMatcherSet`] - all matchers satisfied by some value of a
//!   multi-valued field
//! - [`MultiFieldMatcher`] - field name to set, for headers and query
//!   parameters
//! - [`BodyMatcher`] - whole-body matcher, or path map over a JSON or
//!   form-encoded body
//!
//! # Module Structure
//!
//! - `registry` - matcher names, predicates and the global registry
//! - `assertions` - built-in predicates
//! - `structural` - order-insensitive JSON/XML comparison with a wildcard
//! - `string_matcher` - single `(matcher, value)` pair
//! - `field_matcher` - sets and field maps
//! - `body_matcher` - body rules

mod assertions;
mod body_matcher;
mod field_matcher;
mod registry;
mod string_matcher;
mod structural;

pub use body_matcher::{extract_path, value_text, BodyMatcher};
pub use field_matcher::{MultiFieldMatcher, MultiMap, StringMatcherSet};
pub use registry::{
    Assertion, Expectation, MatcherRegistry, Predicate, RegistryBuilder, DEFAULT_MATCHER,
    SHOULD_ALMOST_EQUAL, SHOULD_BE_EMPTY, SHOULD_CONTAIN_SUBSTRING, SHOULD_END_WITH,
    SHOULD_EQUAL, SHOULD_EQUAL_JSON, SHOULD_EQUAL_XML, SHOULD_MATCH, SHOULD_NOT_ALMOST_EQUAL,
    SHOULD_NOT_BE_EMPTY, SHOULD_NOT_CONTAIN_SUBSTRING, SHOULD_NOT_END_WITH, SHOULD_NOT_EQUAL,
    SHOULD_NOT_EQUAL_JSON, SHOULD_NOT_EQUAL_XML, SHOULD_NOT_MATCH, SHOULD_NOT_RESEMBLE,
    SHOULD_NOT_START_WITH, SHOULD_RESEMBLE, SHOULD_START_WITH,
};
pub use string_matcher::StringMatcher;
pub use structural::{compare, diff_json, diff_xml, Node, IGNORE_PLACEHOLDER};
