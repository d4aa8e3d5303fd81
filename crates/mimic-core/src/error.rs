//! Error types for rule parsing and loading.
//!
//! Evaluation never produces an error: a request that does not satisfy a rule
//! is a plain `false`. Only building matchers and loading rule documents can
//! fail.

use std::path::PathBuf;

/// Configuration error raised while building a matcher from its definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    /// The matcher name is not present in the registry.
    #[error("invalid matcher {0:?}")]
    UnknownMatcher(String),

    /// A pattern-based matcher was given an expression that does not compile.
    #[error("invalid regular expression provided to {matcher:?} operator: {pattern}: {reason}")]
    InvalidPattern {
        matcher: String,
        pattern: String,
        reason: String,
    },
}

/// Failure to read or decode a whole rule document.
///
/// Individual invalid rules inside a well-formed document are not a
/// `LoadError`; they are reported in [`crate::loader::LoadReport::rejected`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_matcher_message() {
        let err = MatcherError::UnknownMatcher("ShouldBeAwesome".to_string());
        assert_eq!(err.to_string(), r#"invalid matcher "ShouldBeAwesome""#);
    }

    #[test]
    fn test_invalid_pattern_message_names_operator() {
        let err = MatcherError::InvalidPattern {
            matcher: "ShouldMatch".to_string(),
            pattern: "((".to_string(),
            reason: "unclosed group".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains(r#""ShouldMatch""#));
        assert!(message.contains("(("));
    }
}
