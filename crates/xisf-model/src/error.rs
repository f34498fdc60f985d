//! Error types for the data model and validator (C7).

use thiserror::Error;

/// A single structural fault found by the validator, naming the entity and
/// the requirement it violates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path to the offending entity, e.g. `"images[0].bounds"`.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors raised while constructing or validating the in-memory model.
#[derive(Debug, Error)]
#[must_use]
pub enum Error {
    #[error("missing required attribute: {0}")]
    MissingRequiredAttribute(&'static str),

    #[error("unknown enum value {value:?} for {field}")]
    UnknownEnumValue { field: &'static str, value: String },

    #[error("invalid identifier {0:?}: must match ^[_A-Za-z][_A-Za-z0-9]*(:[_A-Za-z][_A-Za-z0-9]*)*$")]
    InvalidIdentifier(String),

    #[error("invalid uid {0:?}: must match ^[_A-Za-z][_A-Za-z0-9]*$")]
    InvalidUid(String),

    #[error("invalid range: lower bound {lower} is not less than upper bound {upper}")]
    InvalidRange { lower: String, upper: String },

    #[error("validation failed with {} error(s)", .0.len())]
    ValidationFailed(Vec<ValidationIssue>),

    #[error(transparent)]
    Core(#[from] xisf_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
