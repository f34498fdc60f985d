//! Data-block processor (C5): materialize/persist a [`DataBlock`]'s payload
//! and orchestrate the checksum (C1), compression (C2) and substream-view
//! (C4) primitives around it. Byte-order conversion (C3) is deferred to the
//! consumer, per the XISF 1.0 specification's data-block processor section.
//! This module never calls it.

use crate::carrier::{ReadSeek, StreamProvider};
use crate::options::CompressionRequest;
use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom};
use xisf_core::{checksum, compression, ChecksumAlgorithm};
use xisf_model::{BlockLocation, DataBlock, Encoding};

/// Decode the text payload of an `Inline`/`Embedded` block into raw bytes.
fn decode_text(encoded: &str, encoding: Encoding) -> Result<Vec<u8>> {
    Ok(xisf_xml::encoding_decode(encoded, encoding)?)
}

/// Read `size` bytes at `position` from `carrier`. A short read is an error,
/// per the XISF 1.0 specification's rule that short reads are always errors.
fn read_attached(carrier: &mut dyn ReadSeek, position: u64, size: u64) -> Result<Vec<u8>> {
    carrier.seek(SeekFrom::Start(position))?;
    let mut buf = vec![0u8; size as usize];
    carrier.read_exact(&mut buf).map_err(|_| Error::EndOfStream {
        expected: size,
        actual: 0,
    })?;
    Ok(buf)
}

fn read_external(
    provider: &dyn StreamProvider,
    uri: &str,
    position: Option<u64>,
    size: Option<u64>,
    index_id: Option<u64>,
) -> Result<Vec<u8>> {
    let mut stream = provider.open(uri)?;

    // A `.xisb`-by-id reference: load the index and look the block up by its
    // unique ID instead of trusting an offset carried alongside the URI.
    if let Some(unique_id) = index_id {
        let index = crate::distributed::read_index(&mut *stream)?;
        return crate::distributed::read_block(&mut *stream, &index, unique_id);
    }

    match (position, size) {
        (Some(pos), Some(len)) => read_attached(&mut *stream, pos, len),
        _ => {
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Acquire a block's raw (still-compressed) bytes, dispatching on location
/// kind. `carrier` is required for `Attached` blocks and ignored otherwise.
/// `External` blocks with an `index_id` are resolved through the `.xisb`
/// index at `uri` rather than the `position`/`size` pair.
pub fn read_raw(
    block: &DataBlock,
    carrier: Option<&mut dyn ReadSeek>,
    provider: &dyn StreamProvider,
) -> Result<Vec<u8>> {
    match &block.location {
        BlockLocation::Inline { encoded, encoding } => decode_text(encoded, *encoding),
        BlockLocation::Embedded { encoded, encoding } => decode_text(encoded, *encoding),
        BlockLocation::Attached { position, size } => {
            let carrier = carrier.expect("attached block read requires a carrier");
            read_attached(carrier, *position, *size)
        }
        BlockLocation::External { uri, position, size, index_id } => {
            read_external(provider, uri, *position, *size, *index_id)
        }
    }
}

/// Full read pipeline: acquire raw bytes, verify checksum if requested,
/// then decompress if the block declares a compression codec. Byte-order
/// conversion is left to the caller.
pub fn materialize(
    block: &DataBlock,
    carrier: Option<&mut dyn ReadSeek>,
    provider: &dyn StreamProvider,
    validate_checksums: bool,
) -> Result<Vec<u8>> {
    let raw = read_raw(block, carrier, provider)?;

    if validate_checksums {
        if let Some(expected) = &block.checksum {
            if !checksum::verify(&raw, expected)? {
                return Err(xisf_core::Error::ChecksumMismatch {
                    expected: expected.to_wire(),
                    actual: checksum::Checksum::compute(&raw, expected.algorithm)?.to_wire(),
                }
                .into());
            }
        }
    }

    match &block.compression {
        Some(meta) => Ok(compression::decompress(&raw, meta)?),
        None => Ok(raw),
    }
}

/// The bytes to place for a block, plus the `compression`/`checksum`
/// metadata the emitted XML attribute should carry, after running the
/// write-side pipeline: optional compression (shuffle happens inside the
/// compression engine), then optional checksum over the post-compression
/// bytes.
pub struct ProcessedPayload {
    pub bytes: Vec<u8>,
    pub compression: Option<xisf_core::CompressionMeta>,
    pub checksum: Option<xisf_core::Checksum>,
}

/// Run the write-side pipeline over `raw`: optionally compress, then, if
/// options say so, compute a checksum over the post-compression bytes.
pub fn process_for_write(
    raw: &[u8],
    compression_request: Option<CompressionRequest>,
    checksum_algorithm: Option<ChecksumAlgorithm>,
) -> Result<ProcessedPayload> {
    let (bytes, meta) = match compression_request {
        Some(CompressionRequest { codec, item_size }) => {
            let (compressed, meta) = compression::compress(raw, codec, item_size)?;
            (compressed, Some(meta))
        }
        None => (raw.to_vec(), None),
    };

    let checksum = match checksum_algorithm {
        Some(algorithm) => Some(xisf_core::Checksum::compute(&bytes, algorithm)?),
        None => None,
    };

    Ok(ProcessedPayload { bytes, compression: meta, checksum })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::FileStreamProvider;
    use std::io::Cursor;
    use xisf_core::Codec;

    #[test]
    fn reads_attached_block_from_carrier() {
        let data: Vec<u8> = (0u8..32).collect();
        let mut carrier = Cursor::new({
            let mut v = vec![0u8; 16];
            v.extend_from_slice(&data);
            v
        });
        let block = DataBlock::attached(16, 32);
        let bytes = read_raw(&block, Some(&mut carrier), &FileStreamProvider).unwrap();
        assert_eq!(bytes, data);
    }

    #[test]
    fn short_attached_read_is_an_error() {
        let mut carrier = Cursor::new(vec![0u8; 8]);
        let block = DataBlock::attached(0, 32);
        assert!(matches!(read_raw(&block, Some(&mut carrier), &FileStreamProvider), Err(Error::EndOfStream { .. })));
    }

    #[test]
    fn inline_block_decodes_without_a_carrier() {
        let encoded = xisf_xml::encoding_encode(b"payload bytes", Encoding::Base64);
        let block = DataBlock::inline(encoded, Encoding::Base64);
        let bytes = read_raw(&block, None, &FileStreamProvider).unwrap();
        assert_eq!(bytes, b"payload bytes");
    }

    #[test]
    fn write_then_read_round_trips_with_compression_and_checksum() {
        let raw = b"astronomical pixel payload, repeated, repeated, repeated".to_vec();
        let processed = process_for_write(
            &raw,
            Some(CompressionRequest { codec: Codec::Zlib, item_size: None }),
            Some(ChecksumAlgorithm::Sha256),
        )
        .unwrap();
        assert!(processed.compression.is_some());
        assert!(processed.checksum.is_some());

        let block = DataBlock {
            location: BlockLocation::Attached { position: 16, size: processed.bytes.len() as u64 },
            byte_order: xisf_core::ByteOrder::Little,
            compression: processed.compression.clone(),
            checksum: processed.checksum.clone(),
        };
        let mut carrier = Cursor::new({
            let mut v = vec![0u8; 16];
            v.extend_from_slice(&processed.bytes);
            v
        });
        let restored = materialize(&block, Some(&mut carrier), &FileStreamProvider, true).unwrap();
        assert_eq!(restored, raw);
    }

    #[test]
    fn external_block_with_index_id_resolves_through_xisb_index() {
        // Build a minimal one-node .xisb file with a single occupied slot.
        let mut file = Vec::new();
        file.extend_from_slice(&crate::distributed::XISB_SIGNATURE);
        file.extend_from_slice(&0u64.to_le_bytes()); // reserved
        let data_start = file.len() as u64 + 16 + 40; // header + node prefix + one element
        file.extend_from_slice(&1u32.to_le_bytes()); // one element in this node
        file.extend_from_slice(&0u32.to_le_bytes()); // reserved
        file.extend_from_slice(&0u64.to_le_bytes()); // no next node
        file.extend_from_slice(&7u64.to_le_bytes()); // unique_id
        file.extend_from_slice(&data_start.to_le_bytes()); // block_position
        file.extend_from_slice(&4u64.to_le_bytes()); // block_length
        file.extend_from_slice(&4u64.to_le_bytes()); // uncompressed_length
        file.extend_from_slice(&0u64.to_le_bytes()); // reserved
        file.extend_from_slice(b"abcd");

        let path = std::env::temp_dir().join(format!("xisf-io-test-block-{}.xisb", std::process::id()));
        std::fs::write(&path, &file).unwrap();

        let block = DataBlock::external(path.to_str().unwrap().to_string(), None, None, Some(7));
        let bytes = read_raw(&block, None, &FileStreamProvider).unwrap();
        assert_eq!(bytes, b"abcd");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn checksum_mismatch_is_detected() {
        let block = DataBlock {
            location: BlockLocation::Attached { position: 0, size: 5 },
            byte_order: xisf_core::ByteOrder::Little,
            compression: None,
            checksum: Some(xisf_core::Checksum::compute(b"wrong", ChecksumAlgorithm::Sha1).unwrap()),
        };
        let mut carrier = Cursor::new(b"right".to_vec());
        assert!(materialize(&block, Some(&mut carrier), &FileStreamProvider, true).is_err());
    }
}
