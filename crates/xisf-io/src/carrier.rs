//! The carrier abstraction: a seekable byte stream a storage engine reads
//! from or writes to, per the XISF 1.0 specification's "carrier" term.
//!
//! Rust doesn't allow `dyn Read + Seek` directly, so a marker trait with a
//! blanket impl stands in for the trait-object bound.

use std::io::{Read, Seek, Write};

/// A readable, seekable carrier. Any `Read + Seek` type qualifies.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// A writable, seekable carrier (the monolithic writer needs to seek back
/// only to measure lengths it has already written; the actual emission is
/// append-only, but `Write` alone is the minimum bound its byte stream needs).
pub trait WriteSeek: Write + Seek {}
impl<T: Write + Seek> WriteSeek for T {}

/// Resolves a path or URI to an open, seekable carrier.
///
/// The XISF 1.0 specification's external-interfaces section describes a
/// stream provider as `open(path) -> stream`, `open(uri) -> stream`. The
/// bundled default resolves local filesystem paths only; HTTP(S) fetch is a
/// collaborator interface callers supply their own implementation for (no
/// `reqwest`/`ureq` dependency is introduced by this crate).
pub trait StreamProvider: Send + Sync {
    /// Open `path_or_uri` for reading. Local paths and `file://` URIs are
    /// handled by [`FileStreamProvider`]; other schemes require a
    /// caller-supplied provider.
    fn open(&self, path_or_uri: &str) -> crate::Result<Box<dyn ReadSeek + '_>>;
}

/// Default [`StreamProvider`]: resolves local filesystem paths (and
/// `file://` URIs) via [`std::fs::File`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStreamProvider;

impl StreamProvider for FileStreamProvider {
    fn open(&self, path_or_uri: &str) -> crate::Result<Box<dyn ReadSeek + '_>> {
        let path = path_or_uri.strip_prefix("file://").unwrap_or(path_or_uri);
        let file = std::fs::File::open(path)?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn file_stream_provider_opens_local_paths() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("xisf-io-test-{}.bin", std::process::id()));
        std::fs::File::create(&path).unwrap().write_all(b"hello").unwrap();

        let provider = FileStreamProvider;
        let mut stream = provider.open(path.to_str().unwrap()).unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"hello");

        std::fs::remove_file(&path).ok();
    }
}
