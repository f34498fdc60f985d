//! Error types for `xisf-core`: checksum, compression, byte-order and
//! substream-view faults (components C1-C4).

use thiserror::Error;

/// Errors raised by the low-level codec primitives.
#[derive(Debug, Error)]
#[must_use]
pub enum Error {
    #[error("unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("malformed checksum wire form: {0:?}")]
    MalformedChecksum(String),

    #[error("unsupported compression codec: {0}")]
    UnsupportedCodec(String),

    #[error("malformed compression wire form: {0:?}")]
    MalformedCompression(String),

    #[error("corrupt block: decompressed {actual} bytes, expected {expected}")]
    CorruptBlock { expected: u64, actual: u64 },

    #[error("checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("invalid item size {0}: must be one of 2, 4, 8, 16")]
    InvalidItemSize(usize),

    #[error("byte length {len} is not a multiple of item size {item_size}")]
    UnalignedLength { len: usize, item_size: usize },

    #[error("invalid range: offset {offset} + length {length} exceeds bound {bound}")]
    InvalidRange { offset: u64, length: u64, bound: u64 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for `xisf-core` operations.
pub type Result<T> = std::result::Result<T, Error>;
