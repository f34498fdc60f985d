//! Compression engine (C2): zlib / LZ4 / LZ4-HC, each with an optional
//! byte-shuffle preconditioner.

use crate::shuffle;
use crate::{Error, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// A compression codec identifier, as it appears in the `compression`
/// attribute's wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Codec {
    Zlib,
    ZlibSh,
    Lz4,
    Lz4Sh,
    Lz4Hc,
    Lz4HcSh,
}

impl Codec {
    pub const fn as_str(self) -> &'static str {
        match self {
            Codec::Zlib => "zlib",
            Codec::ZlibSh => "zlib+sh",
            Codec::Lz4 => "lz4",
            Codec::Lz4Sh => "lz4+sh",
            Codec::Lz4Hc => "lz4hc",
            Codec::Lz4HcSh => "lz4hc+sh",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "zlib" => Some(Codec::Zlib),
            "zlib+sh" => Some(Codec::ZlibSh),
            "lz4" => Some(Codec::Lz4),
            "lz4+sh" => Some(Codec::Lz4Sh),
            "lz4hc" => Some(Codec::Lz4Hc),
            "lz4hc+sh" => Some(Codec::Lz4HcSh),
            _ => None,
        }
    }

    /// Whether this codec applies the byte-shuffle pre/postconditioner.
    pub const fn shuffles(self) -> bool {
        matches!(self, Codec::ZlibSh | Codec::Lz4Sh | Codec::Lz4HcSh)
    }

    fn base_encode(self, data: &[u8]) -> Vec<u8> {
        match self {
            Codec::Zlib | Codec::ZlibSh => {
                let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
                enc.write_all(data).expect("writing to an in-memory encoder cannot fail");
                enc.finish().expect("finishing an in-memory encoder cannot fail")
            }
            // LZ4 and LZ4-HC share one block bitstream; "HC" only changes
            // the encoder's match-search effort, not the decode format.
            Codec::Lz4 | Codec::Lz4Sh | Codec::Lz4Hc | Codec::Lz4HcSh => {
                lz4_flex::block::compress(data)
            }
        }
    }

    fn base_decode(self, data: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        match self {
            Codec::Zlib | Codec::ZlibSh => {
                let mut out = Vec::with_capacity(uncompressed_size);
                ZlibDecoder::new(data).read_to_end(&mut out)?;
                Ok(out)
            }
            Codec::Lz4 | Codec::Lz4Sh | Codec::Lz4Hc | Codec::Lz4HcSh => {
                lz4_flex::block::decompress(data, uncompressed_size).map_err(|_| {
                    Error::CorruptBlock {
                        expected: uncompressed_size as u64,
                        actual: 0,
                    }
                })
            }
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed `compression` attribute metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionMeta {
    pub codec: Codec,
    pub uncompressed_size: u64,
    /// Shuffle item size. Present (and `>= 2`) iff `codec.shuffles()`.
    pub item_size: Option<usize>,
    /// Compressed length of each subblock, in order, for multi-block payloads.
    /// Empty means single-block.
    pub subblock_sizes: Vec<u64>,
}

impl CompressionMeta {
    /// Render the `"<codec>:<uncompressed_size>[:<item_size>][:<subblocks...>]"` wire form.
    pub fn to_wire(&self) -> String {
        let mut s = format!("{}:{}", self.codec.as_str(), self.uncompressed_size);
        if let Some(item_size) = self.item_size {
            s.push(':');
            s.push_str(&item_size.to_string());
        }
        for size in &self.subblock_sizes {
            s.push(':');
            s.push_str(&size.to_string());
        }
        s
    }

    /// Parse the `compression` attribute wire form.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let codec_str = parts.next().ok_or_else(|| Error::MalformedCompression(s.to_string()))?;
        let codec =
            Codec::parse(codec_str).ok_or_else(|| Error::UnsupportedCodec(codec_str.to_string()))?;
        let uncompressed_size: u64 = parts
            .next()
            .ok_or_else(|| Error::MalformedCompression(s.to_string()))?
            .parse()
            .map_err(|_| Error::MalformedCompression(s.to_string()))?;

        let rest: Vec<&str> = parts.collect();
        let (item_size, subblock_strs): (Option<usize>, &[&str]) = if codec.shuffles() {
            let item_size = rest
                .first()
                .ok_or_else(|| Error::MalformedCompression(s.to_string()))?
                .parse::<usize>()
                .map_err(|_| Error::MalformedCompression(s.to_string()))?;
            if item_size < 2 {
                return Err(Error::InvalidItemSize(item_size));
            }
            (Some(item_size), &rest[1..])
        } else {
            (None, &rest[..])
        };

        let subblock_sizes = subblock_strs
            .iter()
            .map(|p| p.parse::<u64>().map_err(|_| Error::MalformedCompression(s.to_string())))
            .collect::<Result<Vec<_>>>()?;

        Ok(CompressionMeta {
            codec,
            uncompressed_size,
            item_size,
            subblock_sizes,
        })
    }
}

/// Compress `data` with `codec`. For `+sh` variants, `item_size` selects the
/// shuffle granularity and must be `>= 2`.
pub fn compress(data: &[u8], codec: Codec, item_size: Option<usize>) -> Result<(Vec<u8>, CompressionMeta)> {
    let uncompressed_size = data.len() as u64;
    let payload = if codec.shuffles() {
        let item_size = item_size.ok_or(Error::InvalidItemSize(0))?;
        shuffle::shuffle(data, item_size)?
    } else {
        data.to_vec()
    };

    let compressed = codec.base_encode(&payload);
    Ok((
        compressed,
        CompressionMeta {
            codec,
            uncompressed_size,
            item_size: if codec.shuffles() { item_size } else { None },
            subblock_sizes: Vec::new(),
        },
    ))
}

/// Decompress `data` per `meta`. Fails with [`Error::CorruptBlock`] if the
/// decompressed length doesn't match `meta.uncompressed_size`.
pub fn decompress(data: &[u8], meta: &CompressionMeta) -> Result<Vec<u8>> {
    let raw = if meta.subblock_sizes.is_empty() {
        meta.codec.base_decode(data, meta.uncompressed_size as usize)?
    } else {
        decompress_subblocks(data, meta)?
    };

    if raw.len() as u64 != meta.uncompressed_size {
        return Err(Error::CorruptBlock {
            expected: meta.uncompressed_size,
            actual: raw.len() as u64,
        });
    }

    if meta.codec.shuffles() {
        let item_size = meta.item_size.ok_or(Error::InvalidItemSize(0))?;
        shuffle::unshuffle(&raw, item_size)
    } else {
        Ok(raw)
    }
}

/// Split `data` into `num_subblocks` equal-sized (except the last) chunks and
/// compress each independently, recording their compressed lengths.
///
/// This crate is the only producer of its own multi-block payloads (the
/// subblock-splitting policy is left to the implementer); `subblock_sizes`
/// in the resulting metadata are **compressed** chunk lengths, and the
/// uncompressed length of chunk `k` is derived deterministically from
/// `uncompressed_size` and `num_subblocks` on decode (see `decompress_subblocks`).
pub fn compress_subblocks(
    data: &[u8],
    codec: Codec,
    item_size: Option<usize>,
    num_subblocks: usize,
) -> Result<(Vec<u8>, CompressionMeta)> {
    assert!(num_subblocks >= 1);
    let payload = if codec.shuffles() {
        let item_size = item_size.ok_or(Error::InvalidItemSize(0))?;
        shuffle::shuffle(data, item_size)?
    } else {
        data.to_vec()
    };

    let chunk_len = payload.len().div_ceil(num_subblocks).max(1);
    let mut compressed = Vec::new();
    let mut subblock_sizes = Vec::new();
    for chunk in payload.chunks(chunk_len) {
        let enc = codec.base_encode(chunk);
        subblock_sizes.push(enc.len() as u64);
        compressed.extend_from_slice(&enc);
    }

    Ok((
        compressed,
        CompressionMeta {
            codec,
            uncompressed_size: data.len() as u64,
            item_size: if codec.shuffles() { item_size } else { None },
            subblock_sizes,
        },
    ))
}

fn decompress_subblocks(data: &[u8], meta: &CompressionMeta) -> Result<Vec<u8>> {
    let num_subblocks = meta.subblock_sizes.len();
    let chunk_uncompressed_len = (meta.uncompressed_size as usize).div_ceil(num_subblocks).max(1);

    let mut out = Vec::with_capacity(meta.uncompressed_size as usize);
    let mut offset = 0usize;
    let mut remaining = meta.uncompressed_size as usize;
    for &compressed_len in &meta.subblock_sizes {
        let compressed_len = compressed_len as usize;
        let slice = data
            .get(offset..offset + compressed_len)
            .ok_or(Error::CorruptBlock {
                expected: meta.uncompressed_size,
                actual: out.len() as u64,
            })?;
        let this_chunk_len = remaining.min(chunk_uncompressed_len);
        out.extend_from_slice(&meta.codec.base_decode(slice, this_chunk_len)?);
        offset += compressed_len;
        remaining -= this_chunk_len;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_round_trip_plain() {
        let meta = CompressionMeta {
            codec: Codec::Zlib,
            uncompressed_size: 32,
            item_size: None,
            subblock_sizes: Vec::new(),
        };
        assert_eq!(meta.to_wire(), "zlib:32");
        assert_eq!(CompressionMeta::parse("zlib:32").unwrap(), meta);
    }

    #[test]
    fn wire_form_round_trip_shuffled_with_subblocks() {
        let meta = CompressionMeta {
            codec: Codec::Lz4Sh,
            uncompressed_size: 100,
            item_size: Some(4),
            subblock_sizes: vec![40, 38],
        };
        assert_eq!(meta.to_wire(), "lz4+sh:100:4:40:38");
        assert_eq!(CompressionMeta::parse("lz4+sh:100:4:40:38").unwrap(), meta);
    }

    #[test]
    fn round_trip_every_codec() {
        let data: Vec<u8> = (0u8..=255).cycle().take(1024).collect();
        for codec in [
            Codec::Zlib,
            Codec::ZlibSh,
            Codec::Lz4,
            Codec::Lz4Sh,
            Codec::Lz4Hc,
            Codec::Lz4HcSh,
        ] {
            let item_size = if codec.shuffles() { Some(4) } else { None };
            let (compressed, meta) = compress(&data, codec, item_size).unwrap();
            let restored = decompress(&compressed, &meta).unwrap();
            assert_eq!(restored, data, "codec={codec}");
        }
    }

    #[test]
    fn corrupt_block_on_length_mismatch() {
        let data = b"some payload bytes";
        let (compressed, mut meta) = compress(data, Codec::Zlib, None).unwrap();
        meta.uncompressed_size += 1;
        assert!(matches!(decompress(&compressed, &meta), Err(Error::CorruptBlock { .. })));
    }

    #[test]
    fn multi_block_round_trip() {
        let data: Vec<u8> = (0u16..2000).map(|v| (v % 251) as u8).collect();
        let (compressed, meta) = compress_subblocks(&data, Codec::Lz4, None, 4).unwrap();
        assert_eq!(meta.subblock_sizes.len(), 4);
        let restored = decompress(&compressed, &meta).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn rejects_unknown_codec() {
        assert!(matches!(CompressionMeta::parse("rle:10"), Err(Error::UnsupportedCodec(_))));
    }
}
