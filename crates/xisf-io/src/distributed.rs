//! Distributed storage engine (C9): `.xish` header parsing/emission and
//! `.xisb` data-blocks-file index navigation, per the XISF 1.0
//! specification's distributed storage section.

use crate::block_processor;
use crate::carrier::ReadSeek;
use crate::options::{ReaderOptions, WriterOptions};
use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom};
use xisf_model::{BlockLocation, StorageModel, Unit};
use xisf_xml::XisfDocument;

/// A unit read back from a `.xish` header, paired with each image's
/// materialized raw pixel bytes. `External` blocks are left `None` unless
/// `options.load_external_references` is set.
pub struct DistributedRead {
    pub unit: Unit,
    pub image_payloads: Vec<Option<Vec<u8>>>,
}

/// Read a `.xish` header: the whole stream is UTF-8 XML with no binary
/// preamble.
pub fn read<R: Read>(carrier: &mut R, header_filename: impl Into<String>, options: &ReaderOptions) -> Result<DistributedRead> {
    let mut xml = String::new();
    carrier.read_to_string(&mut xml)?;
    let doc = xisf_xml::parse_document(&xml)?;

    let mut data_block_filenames = Vec::new();
    let mut image_payloads = Vec::with_capacity(doc.images.len());
    for image in &doc.images {
        match &image.pixel_data.location {
            BlockLocation::External { uri, .. } => {
                if !data_block_filenames.contains(uri) {
                    data_block_filenames.push(uri.clone());
                }
                if options.load_external_references {
                    let payload = block_processor::materialize(
                        &image.pixel_data,
                        None,
                        options.uri_stream_provider.as_ref(),
                        options.validate_checksums,
                    )?;
                    image_payloads.push(Some(payload));
                } else {
                    image_payloads.push(None);
                }
            }
            _ => {
                let payload = block_processor::materialize(
                    &image.pixel_data,
                    None,
                    options.uri_stream_provider.as_ref(),
                    options.validate_checksums,
                )?;
                image_payloads.push(Some(payload));
            }
        }
    }

    let unit = Unit {
        storage_model: StorageModel::Distributed {
            header_filename: header_filename.into(),
            data_block_filenames,
        },
        header: doc.header,
        images: doc.images,
        global_properties: doc.global_properties,
        signature: doc.signature,
    };
    Ok(DistributedRead { unit, image_payloads })
}

/// Emit a `.xish` header as XML. External payloads are written by separate
/// calls; `.xisb` write-indexing is out of scope per the XISF 1.0
/// specification's design notes.
pub fn write(unit: &Unit, options: &WriterOptions) -> Result<String> {
    let validation = xisf_model::validate(unit);
    if !validation.ok {
        return Err(Error::ValidationFailed(validation.errors));
    }
    let doc = XisfDocument {
        header: unit.header.clone(),
        images: unit.images.clone(),
        global_properties: unit.global_properties.clone(),
        signature: unit.signature.clone(),
    };
    Ok(xisf_xml::write_document(&doc, options.pretty_print_xml)?)
}

/// `"XISB0100"`.
pub const XISB_SIGNATURE: [u8; 8] = *b"XISB0100";
const XISB_HEADER_LEN: u64 = 16;
const INDEX_ELEMENT_LEN: u64 = 40;
const INDEX_NODE_PREFIX_LEN: u64 = 16;

/// One fixed-size `.xisb` index entry. `block_position == 0` marks a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexElement {
    pub unique_id: u64,
    pub block_position: u64,
    pub block_length: u64,
    pub uncompressed_length: u64,
}

impl IndexElement {
    fn is_free(&self) -> bool {
        self.block_position == 0
    }
}

/// The full in-memory index built by concatenating every node in a `.xisb`
/// file's linked list.
#[derive(Debug, Clone, Default)]
pub struct XisbIndex {
    elements: Vec<IndexElement>,
}

impl XisbIndex {
    /// Find the occupied element named by `unique_id`. Free slots and
    /// absent IDs both yield `BlockNotFound`.
    pub fn lookup(&self, unique_id: u64) -> Result<&IndexElement> {
        self.elements
            .iter()
            .find(|e| e.unique_id == unique_id && !e.is_free())
            .ok_or(Error::BlockNotFound(unique_id))
    }

    pub fn elements(&self) -> &[IndexElement] {
        &self.elements
    }
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(|_| Error::EndOfStream { expected: 4, actual: 0 })?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(|_| Error::EndOfStream { expected: 8, actual: 0 })?;
    Ok(u64::from_le_bytes(buf))
}

/// Verify the 16-byte `.xisb` file header and leave `carrier` positioned at
/// offset 16, the first index node.
fn read_file_header<R: Read>(carrier: &mut R) -> Result<()> {
    let mut signature = [0u8; 8];
    carrier.read_exact(&mut signature).map_err(|_| Error::EndOfStream {
        expected: XISB_HEADER_LEN,
        actual: 0,
    })?;
    if signature != XISB_SIGNATURE {
        return Err(Error::InvalidSignature { expected: "XISB0100", found: signature });
    }
    let _reserved = read_u64(carrier)?;
    Ok(())
}

/// Traverse the `.xisb` index-node linked list starting at offset 16 and
/// build the in-memory lookup table.
pub fn read_index<R: ReadSeek>(carrier: &mut R) -> Result<XisbIndex> {
    carrier.seek(SeekFrom::Start(0))?;
    read_file_header(carrier)?;

    let mut elements = Vec::new();
    let mut node_offset = XISB_HEADER_LEN;
    loop {
        carrier.seek(SeekFrom::Start(node_offset))?;
        let length = read_u32(carrier)?;
        let _reserved = read_u32(carrier)?;
        let next_node = read_u64(carrier)?;

        for _ in 0..length {
            let unique_id = read_u64(carrier)?;
            let block_position = read_u64(carrier)?;
            let block_length = read_u64(carrier)?;
            let uncompressed_length = read_u64(carrier)?;
            let _reserved = read_u64(carrier)?;
            elements.push(IndexElement {
                unique_id,
                block_position,
                block_length,
                uncompressed_length,
            });
        }

        if next_node == 0 {
            break;
        }
        node_offset = next_node;
    }

    Ok(XisbIndex { elements })
}

/// Read the raw bytes of the block named `unique_id` from a `.xisb` carrier
/// whose index has already been loaded via [`read_index`].
pub fn read_block<R: ReadSeek>(carrier: &mut R, index: &XisbIndex, unique_id: u64) -> Result<Vec<u8>> {
    let element = index.lookup(unique_id)?;
    carrier.seek(SeekFrom::Start(element.block_position))?;
    let mut buf = vec![0u8; element.block_length as usize];
    carrier.read_exact(&mut buf).map_err(|_| Error::EndOfStream {
        expected: element.block_length,
        actual: 0,
    })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn encode_node(elements: &[(u64, u64, u64, u64)], next_node: u64) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(elements.len() as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&next_node.to_le_bytes());
        for &(unique_id, block_position, block_length, uncompressed_length) in elements {
            out.extend_from_slice(&unique_id.to_le_bytes());
            out.extend_from_slice(&block_position.to_le_bytes());
            out.extend_from_slice(&block_length.to_le_bytes());
            out.extend_from_slice(&uncompressed_length.to_le_bytes());
            out.extend_from_slice(&0u64.to_le_bytes());
        }
        out
    }

    fn sample_xisb() -> Vec<u8> {
        let mut file = Vec::new();
        file.extend_from_slice(&XISB_SIGNATURE);
        file.extend_from_slice(&0u64.to_le_bytes());
        let data_start = file.len() as u64 + INDEX_NODE_PREFIX_LEN + 2 * INDEX_ELEMENT_LEN;
        let node = encode_node(&[(1, data_start, 4, 4), (2, 0, 0, 0)], 0);
        file.extend_from_slice(&node);
        file.write_all(b"abcd").unwrap();
        file
    }

    #[test]
    fn s5_lookup_found_and_free_slot() {
        let bytes = sample_xisb();
        let mut carrier = Cursor::new(bytes);
        let index = read_index(&mut carrier).unwrap();

        let block = read_block(&mut carrier, &index, 1).unwrap();
        assert_eq!(block, b"abcd");

        assert!(matches!(read_block(&mut carrier, &index, 2), Err(Error::BlockNotFound(2))));
        assert!(matches!(read_block(&mut carrier, &index, 999), Err(Error::BlockNotFound(999))));
    }

    #[test]
    fn rejects_wrong_signature() {
        let mut carrier = Cursor::new(b"NOTINDEX\x00\x00\x00\x00\x00\x00\x00\x00".to_vec());
        assert!(matches!(read_index(&mut carrier), Err(Error::InvalidSignature { .. })));
    }

    #[test]
    fn follows_multiple_nodes() {
        let mut file = Vec::new();
        file.extend_from_slice(&XISB_SIGNATURE);
        file.extend_from_slice(&0u64.to_le_bytes());
        let second_node_offset = file.len() as u64 + INDEX_NODE_PREFIX_LEN + INDEX_ELEMENT_LEN;
        file.extend_from_slice(&encode_node(&[(1, 1000, 4, 4)], second_node_offset));
        file.extend_from_slice(&encode_node(&[(2, 2000, 8, 8)], 0));

        let mut carrier = Cursor::new(file);
        let index = read_index(&mut carrier).unwrap();
        assert_eq!(index.elements().len(), 2);
        assert_eq!(index.lookup(2).unwrap().block_position, 2000);
    }
}
