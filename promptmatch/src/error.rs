//! Error types for prompt matching and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Error kind reported for a rejected match request.
///
/// The `Display` output is the exact message returned to API callers, so
/// variants must stay coarse: an unknown situation and a valid but unmapped
/// combination both surface as [`MatchError::InvalidPrompt`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchError {
    /// Request is not an object, lacks a field, or a field is blank or of the
    /// wrong type.
    #[error("Missing Data")]
    MissingData,

    /// Fields are well formed but no prompt exists for them.
    #[error("Invalid Prompt")]
    InvalidPrompt,

    /// Request shape could not be mapped onto a typed request.
    #[error("Invalid data format")]
    InvalidFormat,
}

impl MatchError {
    /// Returns the user-visible message.
    pub fn message(&self) -> &'static str {
        match self {
            MatchError::MissingData => "Missing Data",
            MatchError::InvalidPrompt => "Invalid Prompt",
            MatchError::InvalidFormat => "Invalid data format",
        }
    }

    /// Whether this is a structural (shape) error rather than a semantic one.
    pub fn is_structural(&self) -> bool {
        matches!(self, MatchError::MissingData | MatchError::InvalidFormat)
    }
}

/// Error raised while building a [`Config`](crate::Config).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML config could not be parsed.
    #[error("parse yaml config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON config could not be parsed.
    #[error("parse json config: {0}")]
    Json(#[from] serde_json::Error),

    /// Profile name is not one of development, production, testing, default.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    /// A vocabulary has no values.
    #[error("vocabulary {0} is empty")]
    EmptyVocabulary(&'static str),

    /// The criteria table has no entries.
    #[error("criteria table is empty")]
    EmptyTable,

    /// Two table entries share an id.
    #[error("duplicate prompt id: {0}")]
    DuplicateId(String),

    /// A table entry has a blank id or attribute.
    #[error("prompt {id:?}: field {field} is blank")]
    BlankField { id: String, field: &'static str },
}
