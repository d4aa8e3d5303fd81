//! Core validation logic for mock definition documents.

use mimic_core::loader::MockDefinition;
use mimic_core::matcher::{MatcherRegistry, SHOULD_BE_EMPTY, SHOULD_NOT_BE_EMPTY};
use serde_json::Value;
use similar::TextDiff;
use std::path::Path;
use tracing::debug;

use crate::types::{IssueCode, LintIssue, LintOptions, LintResult};

/// Minimum similarity for a registered name to be offered as a fix.
const SUGGESTION_THRESHOLD: f32 = 0.6;

/// Validate every entry of a parsed document.
pub fn validate_document(
    file: &Path,
    entries: &[Value],
    result: &mut LintResult,
    options: &LintOptions,
) {
    for (idx, entry) in entries.iter().enumerate() {
        validate_mock(file, entry, idx, result, options);
    }
}

/// Validate a single mock definition.
pub fn validate_mock(
    file: &Path,
    entry: &Value,
    idx: usize,
    result: &mut LintResult,
    options: &LintOptions,
) {
    let location = format!("mocks[{idx}]");

    match serde_json::from_value::<MockDefinition>(entry.clone()) {
        Ok(_) => result.mocks_loaded += 1,
        Err(e) => {
            let message = e.to_string();
            debug!(file = %file.display(), %location, %message, "Mock rejected");

            let mut issue =
                LintIssue::new(IssueCode::RejectedMock, message.as_str(), file).at(location.as_str());
            let mut unknown = Vec::new();
            collect_unknown_matchers(entry, &location, &mut unknown);
            if let Some(suggestion) = unknown
                .iter()
                .filter(|(_, name)| message.contains(&format!("{name:?}")))
                .find_map(|(_, name)| closest_matcher(name))
            {
                issue = issue.suggest(format!("did you mean \"{suggestion}\"?"));
            }
            result.add_issue(issue);
        }
    }

    if options.require_response && entry.get("response").is_none() {
        result.add_issue(
            LintIssue::new(IssueCode::MissingResponse, "Mock has no response", file)
                .at(location.as_str())
                .suggest("Add a \"response\" to the mock definition"),
        );
    }

    check_ambiguous_body(file, entry, &location, result);
    check_ignored_values(file, entry, &location, result);
}

/// A body map naming a registered `matcher` is read as the whole-body form.
/// Its other keys are dropped, and a lone `matcher` key is never a path.
fn check_ambiguous_body(file: &Path, entry: &Value, location: &str, result: &mut LintResult) {
    let Some(body) = entry
        .get("request")
        .and_then(|r| r.get("body"))
        .and_then(Value::as_object)
    else {
        return;
    };

    let names_matcher = body
        .get("matcher")
        .and_then(Value::as_str)
        .is_some_and(|name| MatcherRegistry::global().contains(name));
    if !names_matcher {
        return;
    }

    let dropped: Vec<&str> = body
        .keys()
        .map(String::as_str)
        .filter(|key| *key != "matcher" && *key != "value")
        .collect();

    let issue = if !dropped.is_empty() {
        LintIssue::new(
            IssueCode::AmbiguousBody,
            format!(
                "Body rule is read as a whole-body matcher; paths {} are ignored",
                dropped.join(", ")
            ),
            file.to_path_buf(),
        )
        .suggest("Write the \"matcher\" path as \"$.matcher\" to keep a path map")
    } else if !body.contains_key("value") {
        LintIssue::new(
            IssueCode::AmbiguousBody,
            "Body rule is read as a whole-body matcher, not as a path named \"matcher\"",
            file.to_path_buf(),
        )
        .suggest("Add a \"value\" key, or use the \"$.matcher\" path")
    } else {
        return;
    };
    result.add_issue(issue.at(format!("{location}.request.body")));
}

/// `ShouldBeEmpty` and its negation ignore the expected value.
fn check_ignored_values(file: &Path, entry: &Value, location: &str, result: &mut LintResult) {
    let mut found = Vec::new();
    walk_matchers(entry, location, &mut |path, object| {
        let name = object.get("matcher").and_then(Value::as_str);
        let value = object.get("value").and_then(Value::as_str).unwrap_or_default();
        if let Some(name) = name {
            if (name == SHOULD_BE_EMPTY || name == SHOULD_NOT_BE_EMPTY) && !value.is_empty() {
                found.push((path.to_string(), name.to_string()));
            }
        }
    });

    for (path, name) in found {
        result.add_issue(
            LintIssue::new(
                IssueCode::IgnoredValue,
                format!("{name} ignores its value"),
                file.to_path_buf(),
            )
            .at(path),
        );
    }
}

/// Collect `(location, name)` for every `matcher` key naming an unregistered
/// matcher.
fn collect_unknown_matchers(value: &Value, location: &str, found: &mut Vec<(String, String)>) {
    let registry = MatcherRegistry::global();
    walk_matchers(value, location, &mut |path, object| {
        if let Some(name) = object.get("matcher").and_then(Value::as_str) {
            if !registry.contains(name) {
                found.push((path.to_string(), name.to_string()));
            }
        }
    });
}

/// Visit every object holding a `matcher` key.
fn walk_matchers(
    value: &Value,
    location: &str,
    visit: &mut dyn FnMut(&str, &serde_json::Map<String, Value>),
) {
    match value {
        Value::Object(object) => {
            if object.contains_key("matcher") {
                visit(location, object);
            }
            for (key, child) in object {
                walk_matchers(child, &format!("{location}.{key}"), visit);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                walk_matchers(child, &format!("{location}[{idx}]"), visit);
            }
        }
        _ => {}
    }
}

/// Closest registered matcher name, if any is similar enough.
pub fn closest_matcher(name: &str) -> Option<&'static str> {
    let names = MatcherRegistry::global().names();
    if let Some(exact) = names.iter().find(|n| n.eq_ignore_ascii_case(name)) {
        return Some(*exact);
    }

    names
        .into_iter()
        .map(|candidate| (candidate, TextDiff::from_chars(name, candidate).ratio()))
        .filter(|(_, ratio)| *ratio >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}
