//! Low-level codec primitives for the XISF format engine: checksums (C1),
//! compression (C2), byte-order normalization (C3) and substream views (C4).
//!
//! Higher-level crates (`xisf-model`, `xisf-xml`, `xisf-io`) build the data
//! model, XML header codec and storage engines on top of these primitives.
//!
//! # Example
//!
//! ```
//! use xisf_core::compression::{compress, decompress, Codec};
//!
//! let data = b"some pixel payload bytes, repeated, repeated, repeated";
//! let (compressed, meta) = compress(data, Codec::Zlib, None).unwrap();
//! let restored = decompress(&compressed, &meta).unwrap();
//! assert_eq!(restored, data);
//! ```

pub mod byte_order;
pub mod cancel;
pub mod checksum;
pub mod compression;
mod error;
pub mod shuffle;
pub mod substream;

pub use byte_order::ByteOrder;
pub use cancel::CancellationToken;
pub use checksum::{Checksum, ChecksumAlgorithm};
pub use compression::{Codec, CompressionMeta};
pub use error::{Error, Result};
pub use substream::SubstreamView;
