//! Property tests for matcher laws.

use mimic_core::matcher::{
    compare, Expectation, MatcherRegistry, Node, StringMatcher, StringMatcherSet,
    IGNORE_PLACEHOLDER,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const PAIRS: [(&str, &str); 10] = [
    ("ShouldEqual", "ShouldNotEqual"),
    ("ShouldResemble", "ShouldNotResemble"),
    ("ShouldAlmostEqual", "ShouldNotAlmostEqual"),
    ("ShouldContainSubstring", "ShouldNotContainSubstring"),
    ("ShouldStartWith", "ShouldNotStartWith"),
    ("ShouldEndWith", "ShouldNotEndWith"),
    ("ShouldEqualJSON", "ShouldNotEqualJSON"),
    ("ShouldEqualXML", "ShouldNotEqualXML"),
    ("ShouldMatch", "ShouldNotMatch"),
    ("ShouldBeEmpty", "ShouldNotBeEmpty"),
];

/// Inputs that exercise every predicate: plain text, numbers, documents.
fn sample_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9 ]{0,12}",
        (-1000i32..1000).prop_map(|n| n.to_string()),
        "[a-z]{1,4}".prop_map(|k| format!(r#"{{"{k}": 1}}"#)),
        "[a-z]{1,4}".prop_map(|k| format!("<{k}>1</{k}>")),
    ]
}

fn json_tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn expectation_for(name: &str, value: &str) -> Expectation {
    let registry = MatcherRegistry::global();
    if registry.get(name).is_some_and(|a| a.is_pattern_based()) {
        Expectation::with_pattern(regex::escape(value)).unwrap()
    } else {
        Expectation::new(value)
    }
}

proptest! {
    #[test]
    fn negated_matcher_inverts_outcome(actual in sample_text(), expected in sample_text()) {
        let registry = MatcherRegistry::global();
        for (positive, negated) in PAIRS {
            let expectation = expectation_for(positive, &expected);
            let pos = registry.get(positive).unwrap().evaluate(&actual, &expectation).is_empty();
            let neg = registry.get(negated).unwrap().evaluate(&actual, &expectation).is_empty();
            prop_assert_eq!(pos, !neg, "{} on {:?} / {:?}", positive, actual, expected);
        }
    }

    #[test]
    fn evaluation_is_deterministic(actual in sample_text(), expected in sample_text()) {
        let registry = MatcherRegistry::global();
        for name in registry.names() {
            let expectation = expectation_for(name, &expected);
            let assertion = registry.get(name).unwrap();
            prop_assert_eq!(
                assertion.evaluate(&actual, &expectation),
                assertion.evaluate(&actual, &expectation)
            );
        }
    }

    #[test]
    fn more_matchers_than_values_never_match(
        matchers in prop::collection::vec("[a-z]{0,3}", 1..6),
        values in prop::collection::vec("[a-z]{0,3}", 0..6),
    ) {
        let set = StringMatcherSet::new(matchers.iter().map(StringMatcher::equal).collect());
        if set.len() > values.len() {
            prop_assert!(!set.matches(&values));
        }
    }

    #[test]
    fn structural_equality_is_reflexive(tree in json_tree()) {
        let node = Node::from(tree);
        prop_assert_eq!(compare(&node, &node), "");
    }

    #[test]
    fn placeholder_matches_any_subtree(tree in json_tree(), extra in json_tree()) {
        let expected = Node::from(json!({"fixed": extra.clone(), "free": IGNORE_PLACEHOLDER}));
        let actual = Node::from(json!({"fixed": extra, "free": tree}));
        prop_assert_eq!(compare(&expected, &actual), "");
        prop_assert_eq!(compare(&actual, &expected), "");
    }

    #[test]
    fn key_order_is_irrelevant(
        entries in prop::collection::btree_map("[a-z]{1,4}", -100i32..100, 1..6),
    ) {
        let render = |pairs: Vec<(&String, &i32)>| {
            let body: Vec<String> = pairs.iter().map(|(k, v)| format!(r#""{k}": {v}"#)).collect();
            format!("{{{}}}", body.join(", "))
        };
        let forward = render(entries.iter().collect());
        let backward = render(entries.iter().rev().collect());

        let matcher = StringMatcher::new("ShouldEqualJSON", forward).unwrap();
        prop_assert!(matcher.matches(&backward));
    }

    #[test]
    fn list_order_matters(a in "[a-z]{1,4}", b in "[a-z]{1,4}") {
        prop_assume!(a != b);
        let expected = Node::from(json!([a.clone(), b.clone()]));
        let actual = Node::from(json!([b, a]));
        prop_assert_ne!(compare(&expected, &actual), "");
    }
}
