//! Issues, codes and the aggregated lint report.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The server would refuse the document or the mock.
    Error,
    /// The mock loads but probably does not do what was intended.
    Warning,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// What a lint issue is about. The code decides the severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    /// E001: a file or directory could not be read.
    Unreadable,
    /// E002: the document is not well-formed JSON or YAML.
    Syntax,
    /// E003: the loader rejects the mock.
    RejectedMock,
    /// W001: the mock declares no response.
    MissingResponse,
    /// W002: a body rule is read as the whole-body form.
    AmbiguousBody,
    /// W003: a value given to a matcher that ignores it.
    IgnoredValue,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::Unreadable => "E001",
            IssueCode::Syntax => "E002",
            IssueCode::RejectedMock => "E003",
            IssueCode::MissingResponse => "W001",
            IssueCode::AmbiguousBody => "W002",
            IssueCode::IgnoredValue => "W003",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            IssueCode::Unreadable | IssueCode::Syntax | IssueCode::RejectedMock => Severity::Error,
            IssueCode::MissingResponse | IssueCode::AmbiguousBody | IssueCode::IgnoredValue => {
                Severity::Warning
            }
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IssueCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LintIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    pub file: PathBuf,
    /// Where in the document, e.g. `mocks[2].request.body`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl LintIssue {
    pub fn new(code: IssueCode, message: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            file: file.into(),
            location: None,
            suggestion: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Issues and counters over every linted file.
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    pub issues: Vec<LintIssue>,
    pub files_checked: usize,
    /// Mocks the loader would accept
    pub mocks_loaded: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl LintResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: LintIssue) {
        match issue.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings > 0
    }

    /// No errors; warnings are allowed.
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Fold a per-file result into this one.
    pub fn merge(&mut self, other: LintResult) {
        self.files_checked += other.files_checked;
        self.mocks_loaded += other.mocks_loaded;
        other.issues.into_iter().for_each(|issue| self.add_issue(issue));
    }
}

#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Report W001 for mocks without a response.
    pub require_response: bool,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            require_response: true,
        }
    }
}

/// A loaded mock that matches a sample request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockMatch {
    pub file: PathBuf,
    /// Position of the mock in its document
    pub index: usize,
}
