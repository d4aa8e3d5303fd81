//! Mimic request-matching engine.
//!
//! Rule documents (JSON or YAML) describe which requests a mock answers.
//! This crate turns them into validated, immutable matchers and evaluates
//! them against observed requests. Evaluation never fails: a request either
//! satisfies a rule or it does not.

pub mod error;
pub mod loader;
pub mod matcher;
pub mod request;
pub mod urlencoded;
pub mod yaml;

pub use error::{LoadError, MatcherError};
pub use loader::{load_mocks_file, load_mocks_str, Format, LoadReport, MockDefinition, RejectedMock};
pub use matcher::{
    BodyMatcher, MatcherRegistry, MultiFieldMatcher, MultiMap, StringMatcher, StringMatcherSet,
};
pub use request::{RequestMatcher, RequestView};
