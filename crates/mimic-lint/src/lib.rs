//! Mock definition linting library for Mimic.
//!
//! Validates JSON and YAML rule documents with the same parser the server
//! uses, so a file that lints clean loads clean. Can be used as a library or
//! through the `mimic-lint` CLI binary.
//!
//! # Example
//!
//! ```no_run
//! use mimic_lint::{lint_directory, lint_file, LintOptions};
//! use std::path::Path;
//!
//! // Lint a single file
//! let result = lint_file(Path::new("mocks.yaml"), &LintOptions::default());
//!
//! // Lint a directory
//! let result = lint_directory(Path::new("./mocks"), &LintOptions::default());
//!
//! if result.has_errors() {
//!     eprintln!("Found {} errors", result.errors);
//! }
//! ```

mod types;
mod validator;

use std::path::{Path, PathBuf};

use mimic_core::loader::{parse_document, Format, MockDefinition};
use mimic_core::request::RequestView;

pub use types::{IssueCode, LintIssue, LintOptions, LintResult, MockMatch, Severity};
pub use validator::{closest_matcher, validate_document, validate_mock};

const RULE_EXTENSIONS: [&str; 3] = ["json", "yml", "yaml"];

/// Lint a single mock definition file.
pub fn lint_file(path: &Path, options: &LintOptions) -> LintResult {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            let mut result = LintResult::new();
            result.files_checked = 1;
            result.add_issue(LintIssue::new(
                IssueCode::Unreadable,
                format!("Failed to read file: {e}"),
                path.to_path_buf(),
            ));
            return result;
        }
    };

    lint_str(&content, Format::from_path(path), path, options)
}

/// Lint all rule files in a directory (non-recursive).
pub fn lint_directory(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();

    let files = match collect_rule_files(path) {
        Ok(files) => files,
        Err(e) => {
            result.add_issue(LintIssue::new(
                IssueCode::Unreadable,
                format!("Failed to read directory: {e}"),
                path.to_path_buf(),
            ));
            return result;
        }
    };

    for file in files {
        result.merge(lint_file(&file, options));
    }
    result
}

/// Lint a document held in memory. `source` only labels the issues.
pub fn lint_str(text: &str, format: Format, source: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;

    let entries = match parse_document(text, format) {
        Ok(entries) => entries,
        Err(e) => {
            result.add_issue(
                LintIssue::new(IssueCode::Syntax, e.to_string(), source.to_path_buf())
                    .suggest("Check for syntax errors"),
            );
            return result;
        }
    };

    validate_document(source, &entries, &mut result, options);
    result
}

/// Rule files under `path`: the file itself, or the `.json`, `.yml` and
/// `.yaml` files directly inside a directory, sorted.
pub fn collect_rule_files(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_rule_file(p))
        .collect();
    files.sort();
    Ok(files)
}

fn is_rule_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| RULE_EXTENSIONS.iter().any(|r| ext.eq_ignore_ascii_case(r)))
}

/// Mocks in `files` whose request rule matches `request`, in file order.
///
/// Files or entries that do not load are skipped; linting reports them.
pub fn find_matches(files: &[PathBuf], request: &RequestView) -> Vec<MockMatch> {
    let mut matches = Vec::new();
    for file in files {
        let Ok(text) = std::fs::read_to_string(file) else {
            continue;
        };
        let Ok(entries) = parse_document(&text, Format::from_path(file)) else {
            continue;
        };
        for (index, entry) in entries.into_iter().enumerate() {
            let matched = serde_json::from_value::<MockDefinition>(entry)
                .is_ok_and(|mock| mock.request.matches(request));
            if matched {
                matches.push(MockMatch {
                    file: file.clone(),
                    index,
                });
            }
        }
    }
    matches
}
