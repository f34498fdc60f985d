//! Error types for the data-block processor and storage engines (C5, C8-C10).
//!
//! This is the union surface returned by the façade: lower-level crate
//! errors fold in via `#[from]`.

use thiserror::Error;

/// Errors raised while reading/writing a unit or navigating a `.xisb` index.
#[derive(Debug, Error)]
#[must_use]
pub enum Error {
    #[error("invalid file signature: expected {expected:?}, found {found:?}")]
    InvalidSignature { expected: &'static str, found: [u8; 8] },

    #[error("xml header length {0} is below the minimum of 65 bytes")]
    XmlHeaderTooShort(u32),

    #[error("refusing to read a .xisb data-blocks file directly; open it through its .xish header")]
    DirectXisbRead,

    #[error("validation failed with {} error(s): {}", .0.len(), summarize(.0))]
    ValidationFailed(Vec<xisf_model::ValidationIssue>),

    #[error("data block not found for unique id {0}")]
    BlockNotFound(u64),

    #[error("short read: expected {expected} bytes, got {actual}")]
    EndOfStream { expected: u64, actual: u64 },

    #[error("attached block at [{position}, {position_plus_size}) overlaps the xml header or another block")]
    OverlappingBlock { position: u64, position_plus_size: u64 },

    #[error("no stream provider registered for uri {0:?}")]
    NoStreamProvider(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Model(#[from] xisf_model::Error),

    #[error(transparent)]
    Xml(#[from] xisf_xml::Error),

    #[error(transparent)]
    Core(#[from] xisf_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn summarize(issues: &[xisf_model::ValidationIssue]) -> String {
    issues.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
