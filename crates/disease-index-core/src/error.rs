//! Error types for the core pipeline.
//!
//! Fatal conditions get a typed error so callers can tell them apart;
//! per-record problems are reported as [`RecordIssue`] values instead and
//! never abort a batch.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid symptom lexicon configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexiconError {
    #[error("lexicon has no categories")]
    Empty,

    #[error("category name must not be empty")]
    EmptyCategoryName,

    #[error("duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("category '{0}' has no phrases")]
    NoPhrases(String),

    #[error("phrase '{phrase}' in category '{category}' is not in normalized form (expected '{normalized}')")]
    NotNormalized {
        category: String,
        phrase: String,
        normalized: String,
    },

    #[error("failed to build phrase matcher: {0}")]
    Matcher(String),
}

/// The input collection as a whole could not be used.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("input collection is not a JSON object")]
    NotAnObject,

    #[error("input collection has no 'diseases' (or 'enfermedades') array")]
    MissingDiseases,

    #[error("malformed input collection: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A single record could not be decoded at all and was skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record #{position} is not a JSON object")]
    NotAnObject { position: usize },

    #[error("record #{position} has neither an id nor a url")]
    Unidentifiable { position: usize },
}

/// A recoverable problem inside a record; the offending field degrades to empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssue {
    pub record: String,
    pub field: String,
    pub message: String,
}

impl RecordIssue {
    pub fn new(record: &str, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            record: record.to_string(),
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}: {}: {}", self.record, self.field, self.message)
    }
}

/// Failure to assemble the unified artifact.
#[derive(Debug, Error)]
pub enum UnifyError {
    #[error("input artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("input artifact {} is malformed: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Two different addresses derived the same identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("identifier {id} of '{address}' collides with '{existing}'")]
pub struct IdCollision {
    pub id: String,
    pub address: String,
    pub existing: String,
}
