//! Built-in comparison predicates.
//!
//! Every predicate returns an empty string when `actual` satisfies the
//! expectation and a human-readable explanation otherwise. Negated forms are
//! derived by the registry and are not written here.

use super::registry::Expectation;
use super::structural;
use regex::Regex;

const DEFAULT_TOLERANCE: f64 = 0.000_000_000_1;

pub fn should_equal(actual: &str, expected: &Expectation) -> String {
    if actual == expected.value() {
        return String::new();
    }
    format!(
        "Expected: {:?}\nActual:   {actual:?}\n(Should equal)!",
        expected.value()
    )
}

/// Deep resemblance. Two strings resemble each other exactly when they are
/// equal; only the explanation differs from [`should_equal`].
pub fn should_resemble(actual: &str, expected: &Expectation) -> String {
    if actual == expected.value() {
        return String::new();
    }
    format!(
        "Expected: {:?}\nActual:   {actual:?}\n(Should resemble)!",
        expected.value()
    )
}

/// Numeric comparison with tolerance.
///
/// The expected value is either `"<number>"` or `"<number>, <delta>"`.
pub fn should_almost_equal(actual: &str, expected: &Expectation) -> String {
    let (target, delta) = match parse_tolerance(expected.value()) {
        Ok(parsed) => parsed,
        Err(e) => return e,
    };
    let Ok(actual_number) = actual.trim().parse::<f64>() else {
        return format!("The actual value {actual:?} is not a number");
    };

    if (actual_number - target).abs() <= delta {
        String::new()
    } else {
        format!("Expected {actual_number} to almost equal {target} (but it didn't)!")
    }
}

fn parse_tolerance(expected: &str) -> Result<(f64, f64), String> {
    let (target, delta) = match expected.split_once(',') {
        Some((target, delta)) => (target.trim(), Some(delta.trim())),
        None => (expected.trim(), None),
    };
    let target = target
        .parse::<f64>()
        .map_err(|_| format!("The expected value {target:?} is not a number"))?;
    let delta = match delta {
        Some(delta) => delta
            .parse::<f64>()
            .map_err(|_| format!("The tolerance {delta:?} is not a number"))?,
        None => DEFAULT_TOLERANCE,
    };
    Ok((target, delta))
}

pub fn should_contain_substring(actual: &str, expected: &Expectation) -> String {
    if actual.contains(expected.value()) {
        return String::new();
    }
    format!(
        "Expected {actual:?} to contain substring {:?} (but it didn't)!",
        expected.value()
    )
}

pub fn should_start_with(actual: &str, expected: &Expectation) -> String {
    if actual.starts_with(expected.value()) {
        return String::new();
    }
    format!(
        "Expected {actual:?} to start with {:?} (but it didn't)!",
        expected.value()
    )
}

pub fn should_end_with(actual: &str, expected: &Expectation) -> String {
    if actual.ends_with(expected.value()) {
        return String::new();
    }
    format!(
        "Expected {actual:?} to end with {:?} (but it didn't)!",
        expected.value()
    )
}

pub fn should_equal_json(actual: &str, expected: &Expectation) -> String {
    structural::diff_json(actual, expected.value())
}

pub fn should_equal_xml(actual: &str, expected: &Expectation) -> String {
    structural::diff_xml(actual, expected.value())
}

/// Unanchored regular expression search.
pub fn should_match(actual: &str, expected: &Expectation) -> String {
    let matched = match expected.pattern() {
        Some(regex) => regex.is_match(actual),
        // Only reachable for matchers built against a registry that does not
        // flag this predicate as pattern-based.
        None => Regex::new(expected.value())
            .map(|regex| regex.is_match(actual))
            .unwrap_or(false),
    };
    if matched {
        return String::new();
    }
    format!(
        "Expected {actual:?} to match {:?} (but it didn't)!",
        expected.value()
    )
}

/// The expected value is ignored.
pub fn should_be_empty(actual: &str, _expected: &Expectation) -> String {
    if actual.is_empty() {
        return String::new();
    }
    format!("Expected {actual:?} to be empty (but it wasn't)!")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect(value: &str) -> Expectation {
        Expectation::new(value)
    }

    #[test]
    fn test_should_equal() {
        assert!(should_equal("test", &expect("test")).is_empty());
        let diff = should_equal("other", &expect("test"));
        assert!(diff.contains("\"test\""));
        assert!(diff.contains("\"other\""));
    }

    #[test]
    fn test_should_resemble() {
        assert!(should_resemble("a", &expect("a")).is_empty());
        assert!(should_resemble("a", &expect("b")).contains("resemble"));
    }

    #[test]
    fn test_should_almost_equal_default_tolerance() {
        assert!(should_almost_equal("3.14", &expect("3.14")).is_empty());
        assert!(should_almost_equal(" 2 ", &expect("2.0")).is_empty());
        assert!(!should_almost_equal("3.15", &expect("3.14")).is_empty());
    }

    #[test]
    fn test_should_almost_equal_with_delta() {
        assert!(should_almost_equal("3.15", &expect("3.14, 0.02")).is_empty());
        assert!(!should_almost_equal("3.20", &expect("3.14,0.02")).is_empty());
    }

    #[test]
    fn test_should_almost_equal_non_numeric() {
        assert!(should_almost_equal("abc", &expect("1")).contains("not a number"));
        assert!(should_almost_equal("1", &expect("abc")).contains("not a number"));
        assert!(should_almost_equal("1", &expect("1, x")).contains("tolerance"));
    }

    #[test]
    fn test_substring_prefix_suffix() {
        assert!(should_contain_substring("/api/v1", &expect("api")).is_empty());
        assert!(!should_contain_substring("/v1", &expect("api")).is_empty());
        assert!(should_start_with("/api/v1", &expect("/api")).is_empty());
        assert!(!should_start_with("v1/api", &expect("/api")).is_empty());
        assert!(should_end_with("data.json", &expect(".json")).is_empty());
        assert!(!should_end_with("data.xml", &expect(".json")).is_empty());
    }

    #[test]
    fn test_should_match_uses_compiled_pattern() {
        let expectation = Expectation::with_pattern(r"^/api/v\d+/").unwrap();
        assert!(should_match("/api/v1/users", &expectation).is_empty());
        assert!(!should_match("/api/users", &expectation).is_empty());
    }

    #[test]
    fn test_should_match_without_compiled_pattern() {
        assert!(should_match("abc123", &expect(r"\d+")).is_empty());
        assert!(!should_match("abc", &expect("((")).is_empty());
    }

    #[test]
    fn test_should_be_empty() {
        assert!(should_be_empty("", &expect("ignored")).is_empty());
        assert!(!should_be_empty(" ", &expect("")).is_empty());
    }

    #[test]
    fn test_should_equal_json() {
        assert!(should_equal_json(r#"{"a":1}"#, &expect(r#"{ "a" : 1 }"#)).is_empty());
        assert!(!should_equal_json("not json", &expect(r#"{"a":1}"#)).is_empty());
    }

    #[test]
    fn test_should_equal_xml() {
        assert!(should_equal_xml("<a>1</a>", &expect("<a>1</a>")).is_empty());
        assert!(!should_equal_xml("<a>2</a>", &expect("<a>1</a>")).is_empty());
    }
}
