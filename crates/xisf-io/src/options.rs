//! `ReaderOptions`/`WriterOptions`, per the XISF 1.0 specification's
//! external interfaces section.

use crate::carrier::{FileStreamProvider, StreamProvider};
use std::sync::Arc;
use xisf_core::ChecksumAlgorithm;
use xisf_core::Codec;

/// Options controlling a unit read.
#[derive(Clone)]
pub struct ReaderOptions {
    /// Recompute and compare each data block's checksum, failing
    /// `ChecksumMismatch` on mismatch.
    pub validate_checksums: bool,
    /// Materialize `Thumbnail` core-element pixel data eagerly.
    pub load_thumbnails: bool,
    /// For distributed units, resolve `External` blocks via the stream
    /// provider during the read rather than leaving them unmaterialized.
    pub load_external_references: bool,
    /// Resolves local-file paths named by `Attached`/`External` blocks and
    /// the unit's own carrier when given as a path.
    pub file_stream_provider: Arc<dyn StreamProvider>,
    /// Resolves `url(...)` / `path(...)` URIs in `External` blocks.
    /// Defaults to the same provider as `file_stream_provider`.
    pub uri_stream_provider: Arc<dyn StreamProvider>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        let provider: Arc<dyn StreamProvider> = Arc::new(FileStreamProvider);
        ReaderOptions {
            validate_checksums: false,
            load_thumbnails: false,
            load_external_references: false,
            file_stream_provider: provider.clone(),
            uri_stream_provider: provider,
        }
    }
}

impl std::fmt::Debug for ReaderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderOptions")
            .field("validate_checksums", &self.validate_checksums)
            .field("load_thumbnails", &self.load_thumbnails)
            .field("load_external_references", &self.load_external_references)
            .finish_non_exhaustive()
    }
}

/// A requested (codec, shuffle item_size) pair applied to every image the
/// writer places, unless the image's own `pixel_data.compression` already
/// names one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionRequest {
    pub codec: Codec,
    /// Required (and `>= 2`) when `codec.shuffles()`.
    pub item_size: Option<usize>,
}

/// Options controlling a unit write.
#[derive(Clone)]
pub struct WriterOptions {
    /// Compression applied to images whose pixel data isn't already
    /// compressed. `None` writes every such image uncompressed.
    pub default_compression: Option<CompressionRequest>,
    /// Compute a checksum over each written block's post-compression bytes
    /// and attach it to the block's metadata.
    pub calculate_checksums: bool,
    pub checksum_algorithm: ChecksumAlgorithm,
    /// Two-space indentation for `.xish`/monolithic XML headers. Monolithic
    /// headers default to compact, matching the XISF 1.0 specification's
    /// testable-property examples, but both forms remain well-formed either way.
    pub pretty_print_xml: bool,
    pub file_stream_provider: Arc<dyn StreamProvider>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            default_compression: None,
            calculate_checksums: false,
            checksum_algorithm: ChecksumAlgorithm::Sha256,
            pretty_print_xml: false,
            file_stream_provider: Arc::new(FileStreamProvider),
        }
    }
}

impl std::fmt::Debug for WriterOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterOptions")
            .field("default_compression", &self.default_compression)
            .field("calculate_checksums", &self.calculate_checksums)
            .field("checksum_algorithm", &self.checksum_algorithm)
            .field("pretty_print_xml", &self.pretty_print_xml)
            .finish_non_exhaustive()
    }
}
