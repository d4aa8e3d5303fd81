//! Wire-format contracts for rule documents in JSON and YAML.

use mimic_core::matcher::{
    BodyMatcher, MultiFieldMatcher, StringMatcher, StringMatcherSet, DEFAULT_MATCHER,
};
use mimic_core::request::RequestMatcher;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Deserialize, serialize, deserialize again and serialize again; both
/// serialized forms must be identical.
fn assert_canonical<T: DeserializeOwned + Serialize>(input: &str, expected: &str) {
    let first: T = serde_json::from_str(input).unwrap();
    let first_out = serde_json::to_string(&first).unwrap();
    assert_eq!(first_out, expected, "input: {input}");

    let second: T = serde_json::from_str(&first_out).unwrap();
    assert_eq!(serde_json::to_string(&second).unwrap(), first_out);
}

#[test]
fn shorthand_string_matcher_round_trip() {
    let matcher: StringMatcher = serde_json::from_str(r#""test""#).unwrap();
    assert_eq!(matcher.matcher(), DEFAULT_MATCHER);
    assert_eq!(matcher.value(), "test");
    assert_eq!(
        serde_json::to_string(&matcher).unwrap(),
        r#"{"matcher":"ShouldEqual","value":"test"}"#
    );
}

#[test]
fn canonical_forms_are_idempotent() {
    assert_canonical::<StringMatcher>(
        r#"{"value":"x","matcher":"ShouldEndWith"}"#,
        r#"{"matcher":"ShouldEndWith","value":"x"}"#,
    );
    assert_canonical::<StringMatcherSet>(
        r#""a""#,
        r#"[{"matcher":"ShouldEqual","value":"a"}]"#,
    );
    assert_canonical::<MultiFieldMatcher>(
        r#"{"b": "2", "a": ["1", {"matcher": "ShouldNotBeEmpty", "value": ""}]}"#,
        r#"{"a":[{"matcher":"ShouldEqual","value":"1"},{"matcher":"ShouldNotBeEmpty","value":""}],"b":[{"matcher":"ShouldEqual","value":"2"}]}"#,
    );
    assert_canonical::<BodyMatcher>(
        r#"{"matcher": "ShouldEqualJSON", "value": "{}"}"#,
        r#"{"matcher":"ShouldEqualJSON","value":"{}"}"#,
    );
    assert_canonical::<BodyMatcher>(
        r#"{"user.name": "alice"}"#,
        r#"{"user.name":{"matcher":"ShouldEqual","value":"alice"}}"#,
    );
    assert_canonical::<RequestMatcher>(
        r#"{"headers": {"Accept": "text/html"}, "method": "GET"}"#,
        r#"{"method":{"matcher":"ShouldEqual","value":"GET"},"headers":{"Accept":[{"matcher":"ShouldEqual","value":"text/html"}]}}"#,
    );
}

#[test]
fn yaml_and_json_agree() {
    let yaml = r#"
method: POST
path:
  matcher: ShouldStartWith
  value: /api
query_params:
  page: "1"
  sort:
    - asc
    - matcher: ShouldNotEqual
      value: desc
headers:
  Content-Type: application/json
body:
  user.name: alice
"#;
    let json = r#"{
        "method": "POST",
        "path": {"matcher": "ShouldStartWith", "value": "/api"},
        "query_params": {
            "page": "1",
            "sort": ["asc", {"matcher": "ShouldNotEqual", "value": "desc"}]
        },
        "headers": {"Content-Type": "application/json"},
        "body": {"user.name": "alice"}
    }"#;

    let from_yaml: RequestMatcher = serde_yaml::from_str(yaml).unwrap();
    let from_json: RequestMatcher = serde_json::from_str(json).unwrap();
    assert_eq!(from_yaml, from_json);

    // YAML output parses back to the same rule.
    let yaml_out = serde_yaml::to_string(&from_yaml).unwrap();
    let reparsed: RequestMatcher = serde_yaml::from_str(&yaml_out).unwrap();
    assert_eq!(reparsed, from_json);
}

#[test]
fn unknown_matcher_is_a_parse_error_in_both_formats() {
    let json_err =
        serde_json::from_str::<RequestMatcher>(r#"{"path": {"matcher": "ShouldBeNice"}}"#)
            .unwrap_err();
    assert!(json_err.to_string().contains("ShouldBeNice"), "{json_err}");

    let yaml_err =
        serde_yaml::from_str::<RequestMatcher>("path:\n  matcher: ShouldBeNice\n").unwrap_err();
    assert!(yaml_err.to_string().contains("ShouldBeNice"), "{yaml_err}");
}

#[test]
fn wildcard_sentinel_survives_round_trip() {
    let input = r#"{"matcher":"ShouldEqualXML","value":"<a><b>${xmlunit.ignore}</b></a>"}"#;
    let matcher: StringMatcher = serde_json::from_str(input).unwrap();
    assert_eq!(serde_json::to_string(&matcher).unwrap(), input);
    assert!(matcher.matches("<a><b><c>anything</c></b></a>"));
}
