//! Loading mock definitions from JSON or YAML rule documents.
//!
//! A document holds a single definition or a list of them. Entries are
//! validated one by one: an invalid entry is reported and skipped without
//! affecting its neighbours.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::LoadError;
use crate::request::{RequestMatcher, RequestView};
use crate::yaml;

/// A request rule plus the opaque parts the server acts on when it matches.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MockDefinition {
    pub request: RequestMatcher,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// Rule document syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// `.yml` and `.yaml` files are YAML; everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}

/// An entry that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedMock {
    /// Position of the entry in the document
    pub index: usize,
    pub message: String,
}

/// Outcome of loading one document.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub mocks: Vec<MockDefinition>,
    pub rejected: Vec<RejectedMock>,
}

impl LoadReport {
    /// Index of the first loaded mock whose request rule matches.
    pub fn first_match(&self, request: &RequestView) -> Option<usize> {
        self.mocks
            .iter()
            .position(|mock| mock.request.matches(request))
    }

    /// Indices of every loaded mock whose request rule matches.
    pub fn all_matches(&self, request: &RequestView) -> Vec<usize> {
        self.mocks
            .iter()
            .enumerate()
            .filter(|(_, mock)| mock.request.matches(request))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Split a document into its raw entries.
///
/// A list yields its items, an empty document yields nothing and anything
/// else is a single entry.
///
/// YAML scalars keep their source spelling; see [`crate::yaml`].
pub fn parse_document(text: &str, format: Format) -> Result<Vec<Value>, LoadError> {
    let document: Value = match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => yaml::to_json(text)?,
    };

    Ok(match document {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    })
}

/// Validate raw entries independently.
pub fn load_entries(entries: Vec<Value>) -> LoadReport {
    let mut report = LoadReport::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<MockDefinition>(entry) {
            Ok(mock) => report.mocks.push(mock),
            Err(e) => {
                error!(index, error = %e, "Rejected mock definition");
                report.rejected.push(RejectedMock {
                    index,
                    message: e.to_string(),
                });
            }
        }
    }
    debug!(
        loaded = report.mocks.len(),
        rejected = report.rejected.len(),
        "Loaded mock definitions"
    );
    report
}

pub fn load_mocks_str(text: &str, format: Format) -> Result<LoadReport, LoadError> {
    parse_document(text, format).map(load_entries)
}

pub fn load_mocks_file<P: AsRef<Path>>(path: P) -> Result<LoadReport, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_mocks_str(&text, Format::from_path(path))
}
