//! Data-block data model: the four location shapes a pixel or core-element
//! payload can take, per the XISF 1.0 specification's data model section.

use xisf_core::{ByteOrder, Checksum, CompressionMeta};

/// Inline/embedded text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Base64,
    Hex,
}

impl Encoding {
    pub const fn as_str(self) -> &'static str {
        match self {
            Encoding::Base64 => "base64",
            Encoding::Hex => "hex",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "base64" => Encoding::Base64,
            "hex" => Encoding::Hex,
            _ => return None,
        })
    }
}

/// Where a data block's bytes live and how to reach them.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockLocation {
    /// Bytes encoded directly in the `location` attribute value / element text.
    Inline { encoded: String, encoding: Encoding },
    /// Bytes in a `<Data>` child element.
    Embedded { encoded: String, encoding: Encoding },
    /// Bytes at a fixed offset inside the monolithic file.
    Attached { position: u64, size: u64 },
    /// Bytes in an external resource: a URI, or a `.xisb` block by unique ID.
    External {
        uri: String,
        position: Option<u64>,
        size: Option<u64>,
        index_id: Option<u64>,
    },
}

/// A data block: location plus the shared byte-order/compression/checksum metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBlock {
    pub location: BlockLocation,
    pub byte_order: ByteOrder,
    pub compression: Option<CompressionMeta>,
    pub checksum: Option<Checksum>,
}

impl DataBlock {
    pub fn attached(position: u64, size: u64) -> Self {
        DataBlock {
            location: BlockLocation::Attached { position, size },
            byte_order: ByteOrder::Little,
            compression: None,
            checksum: None,
        }
    }

    pub fn inline(encoded: String, encoding: Encoding) -> Self {
        DataBlock {
            location: BlockLocation::Inline { encoded, encoding },
            byte_order: ByteOrder::Little,
            compression: None,
            checksum: None,
        }
    }

    pub fn embedded(encoded: String, encoding: Encoding) -> Self {
        DataBlock {
            location: BlockLocation::Embedded { encoded, encoding },
            byte_order: ByteOrder::Little,
            compression: None,
            checksum: None,
        }
    }

    pub fn external(uri: String, position: Option<u64>, size: Option<u64>, index_id: Option<u64>) -> Self {
        DataBlock {
            location: BlockLocation::External {
                uri,
                position,
                size,
                index_id,
            },
            byte_order: ByteOrder::Little,
            compression: None,
            checksum: None,
        }
    }

    /// Whether `compression.item_size` is required (shuffle codecs) and present.
    pub fn compression_is_well_formed(&self) -> bool {
        match &self.compression {
            None => true,
            Some(meta) => {
                if meta.codec.shuffles() {
                    meta.item_size.is_some_and(|s| s >= 2)
                } else {
                    true
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attached_block_defaults() {
        let block = DataBlock::attached(100, 32);
        assert_eq!(block.byte_order, ByteOrder::Little);
        assert!(block.compression.is_none());
        assert!(block.compression_is_well_formed());
    }
}
