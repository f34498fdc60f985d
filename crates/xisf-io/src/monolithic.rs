//! Monolithic storage engine (C8): `.xisf` file framing, the 16-byte file
//! header, and the two-pass fixed-point layout algorithm for attached
//! blocks, per the XISF 1.0 specification's monolithic storage section.

use crate::block_processor::{self, ProcessedPayload};
use crate::carrier::{ReadSeek, StreamProvider, WriteSeek};
use crate::options::{CompressionRequest, ReaderOptions, WriterOptions};
use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom, Write};
use xisf_model::{BlockLocation, DataBlock, Header, Image, StorageModel, Unit};
use xisf_xml::XisfDocument;

/// `"XISF0100"`.
pub const SIGNATURE: [u8; 8] = *b"XISF0100";
/// Size of the fixed file-header prefix: 8-byte signature + u32 length + u32 reserved.
pub const FILE_HEADER_LEN: u64 = 16;
/// The XISF 1.0 specification requires the XML header length to be at least 65 bytes.
pub const MIN_XML_LENGTH: u32 = 65;
/// The layout iteration is guaranteed to reach a fixed point within this
/// many rounds.
const MAX_LAYOUT_ITERATIONS: usize = 5;

/// A unit read back from a monolithic `.xisf` carrier, paired with each
/// image's materialized raw pixel bytes (decompressed, byte-order
/// untouched). `image_payloads[i]` corresponds to `unit.images[i]`; it is
/// `None` when the block is `External` and `options.load_external_references`
/// was false.
pub struct MonolithicRead {
    pub unit: Unit,
    pub image_payloads: Vec<Option<Vec<u8>>>,
}

fn read_file_header<R: Read>(carrier: &mut R) -> Result<u32> {
    let mut header = [0u8; FILE_HEADER_LEN as usize];
    carrier.read_exact(&mut header).map_err(|_| Error::EndOfStream {
        expected: FILE_HEADER_LEN,
        actual: 0,
    })?;
    if header[0..8] != SIGNATURE {
        let mut found = [0u8; 8];
        found.copy_from_slice(&header[0..8]);
        return Err(Error::InvalidSignature { expected: "XISF0100", found });
    }
    let xml_length = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
    if xml_length < MIN_XML_LENGTH {
        return Err(Error::XmlHeaderTooShort(xml_length));
    }
    Ok(xml_length)
}

/// Read the 16-byte file header and the XML header, skipping pixel data:
/// the fast path the façade's `read_header` uses.
pub fn read_header<R: Read>(carrier: &mut R) -> Result<Header> {
    let xml_length = read_file_header(carrier)?;
    let mut xml_bytes = vec![0u8; xml_length as usize];
    carrier.read_exact(&mut xml_bytes).map_err(|_| Error::EndOfStream {
        expected: xml_length as u64,
        actual: 0,
    })?;
    let xml = String::from_utf8_lossy(&xml_bytes);
    let doc = xisf_xml::parse_document(&xml)?;
    Ok(doc.header)
}

/// Full monolithic read: file header, XML header, and materialization of
/// every `Attached` image pixel block.
pub fn read<R: ReadSeek>(carrier: &mut R, options: &ReaderOptions) -> Result<MonolithicRead> {
    let xml_length = read_file_header(carrier)?;
    let mut xml_bytes = vec![0u8; xml_length as usize];
    carrier.read_exact(&mut xml_bytes).map_err(|_| Error::EndOfStream {
        expected: xml_length as u64,
        actual: 0,
    })?;
    let xml = String::from_utf8_lossy(&xml_bytes);
    let doc = xisf_xml::parse_document(&xml)?;

    let mut image_payloads = Vec::with_capacity(doc.images.len());
    for image in &doc.images {
        let payload = match &image.pixel_data.location {
            BlockLocation::External { .. } if !options.load_external_references => None,
            _ => Some(block_processor::materialize(
                &image.pixel_data,
                Some(carrier as &mut dyn ReadSeek),
                options.uri_stream_provider.as_ref(),
                options.validate_checksums,
            )?),
        };
        image_payloads.push(payload);
    }

    let unit = Unit {
        storage_model: StorageModel::Monolithic,
        header: doc.header,
        images: doc.images,
        global_properties: doc.global_properties,
        signature: doc.signature,
    };
    Ok(MonolithicRead { unit, image_payloads })
}

/// One image whose pixel data is placed as an attached block during a
/// monolithic write: its index in `unit.images`, the processed
/// (post-compression) bytes, and the metadata to attach to its `DataBlock`.
struct AttachPlan {
    image_index: usize,
    payload: ProcessedPayload,
}

fn build_document(
    unit: &Unit,
    plans: &[AttachPlan],
    positions: &[u64],
) -> XisfDocument {
    let mut images: Vec<Image> = unit.images.clone();
    for (plan, &position) in plans.iter().zip(positions) {
        let image = &mut images[plan.image_index];
        image.pixel_data = DataBlock {
            location: BlockLocation::Attached { position, size: plan.payload.bytes.len() as u64 },
            byte_order: image.pixel_data.byte_order,
            compression: plan.payload.compression.clone(),
            checksum: plan.payload.checksum.clone(),
        };
    }
    XisfDocument {
        header: unit.header.clone(),
        images,
        global_properties: unit.global_properties.clone(),
        signature: unit.signature.clone(),
    }
}

/// Write `unit` as a monolithic `.xisf` file to `carrier`.
///
/// `image_payloads[i]` must supply the raw (uncompressed) pixel bytes for
/// `unit.images[i]` whenever that image's `pixel_data` is not `External`.
/// Monolithic storage always places such payloads as attached blocks,
/// re-deriving `position`/`size`/`compression`/`checksum` from scratch via
/// the two-pass layout below rather than trusting whatever location the
/// input `DataBlock` already carried. A `Unit` alone cannot round-trip
/// through monolithic storage without this side-channel, since its data
/// model has nowhere to hold pixel bytes that aren't already framed.
pub fn write(unit: &Unit, image_payloads: &[Option<&[u8]>], options: &WriterOptions) -> Result<Vec<u8>> {
    let validation = xisf_model::validate(unit);
    if !validation.ok {
        return Err(Error::ValidationFailed(validation.errors));
    }
    if image_payloads.len() != unit.images.len() {
        return Err(Error::EndOfStream {
            expected: unit.images.len() as u64,
            actual: image_payloads.len() as u64,
        });
    }

    let compression_request = options.default_compression;
    let mut plans = Vec::new();
    for (i, image) in unit.images.iter().enumerate() {
        if matches!(image.pixel_data.location, BlockLocation::External { .. }) {
            continue;
        }
        let raw = image_payloads[i].ok_or_else(|| Error::EndOfStream { expected: 1, actual: 0 })?;
        let payload = process_payload(raw, compression_request, options)?;
        plans.push(AttachPlan { image_index: i, payload });
    }

    let lengths: Vec<u64> = plans.iter().map(|p| p.payload.bytes.len() as u64).collect();

    let positions = vec![0u64; plans.len()];
    let mut xml = xisf_xml::write_document(&build_document(unit, &plans, &positions), options.pretty_print_xml)?;
    let mut x = xml.as_bytes().len() as u64;

    for _ in 0..MAX_LAYOUT_ITERATIONS {
        let mut next_positions = Vec::with_capacity(plans.len());
        let mut cumulative = 0u64;
        for &len in &lengths {
            next_positions.push(FILE_HEADER_LEN + x + cumulative);
            cumulative += len;
        }
        let next_xml = xisf_xml::write_document(&build_document(unit, &plans, &next_positions), options.pretty_print_xml)?;
        let next_x = next_xml.as_bytes().len() as u64;
        let converged = next_x == x;
        xml = next_xml;
        x = next_x;
        if converged {
            break;
        }
    }

    let xml_bytes = xml.into_bytes();
    let xml_length = xml_bytes.len() as u32;
    if xml_length < MIN_XML_LENGTH {
        return Err(Error::XmlHeaderTooShort(xml_length));
    }

    let mut out = Vec::with_capacity(FILE_HEADER_LEN as usize + xml_bytes.len() + lengths.iter().sum::<u64>() as usize);
    out.extend_from_slice(&SIGNATURE);
    out.extend_from_slice(&xml_length.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&xml_bytes);
    for plan in &plans {
        out.extend_from_slice(&plan.payload.bytes);
    }
    Ok(out)
}

/// Write `bytes` (already framed by [`write`]) to `carrier`.
pub fn write_to_carrier<W: WriteSeek>(bytes: &[u8], carrier: &mut W) -> Result<()> {
    carrier.seek(SeekFrom::Start(0))?;
    carrier.write_all(bytes)?;
    Ok(())
}

fn process_payload(raw: &[u8], request: Option<CompressionRequest>, options: &WriterOptions) -> Result<ProcessedPayload> {
    let checksum_algo = options.calculate_checksums.then_some(options.checksum_algorithm);
    block_processor::process_for_write(raw, request, checksum_algo)
}

/// Exposed for the façade's format-agnostic `StreamProvider`-less default path.
pub fn default_stream_provider() -> impl StreamProvider {
    crate::carrier::FileStreamProvider
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CompressionRequest, ReaderOptions, WriterOptions};
    use chrono::{FixedOffset, TimeZone};
    use std::io::Cursor;
    use xisf_core::Codec;
    use xisf_model::{ColorSpace, Geometry, Header, Metadata, PixelStorage, SampleFormat};

    fn minimal_unit() -> Unit {
        let ts = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let header = Header::new(Metadata::new(ts, "xisf-rs test suite"));
        let mut unit = Unit::new(StorageModel::Monolithic, header);
        unit.images.push(Image {
            geometry: Geometry::new(vec![4, 4], 1).unwrap(),
            sample_format: SampleFormat::UInt16,
            color_space: ColorSpace::Gray,
            pixel_data: DataBlock::attached(0, 0),
            bounds: None,
            pixel_storage: PixelStorage::Planar,
            image_type: None,
            offset: None,
            orientation: None,
            image_id: Some("img0".into()),
            uuid: None,
            properties: Vec::new(),
            associated_elements: Vec::new(),
        });
        unit
    }

    #[test]
    fn s1_uncompressed_attached_write_then_read() {
        let unit = minimal_unit();
        let payload: Vec<u8> = (0u8..32).collect();
        let bytes = write(&unit, &[Some(payload.as_slice())], &WriterOptions::default()).unwrap();

        assert_eq!(&bytes[0..8], &SIGNATURE);
        let xml_length = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let expected_position = FILE_HEADER_LEN as u32 + xml_length;
        let xml_str = std::str::from_utf8(&bytes[16..16 + xml_length as usize]).unwrap();
        assert!(xml_str.contains(&format!("attachment:{expected_position}:32")), "{xml_str}");

        let attached = &bytes[expected_position as usize..expected_position as usize + 32];
        assert_eq!(attached, payload.as_slice());

        let mut carrier = Cursor::new(bytes);
        let read_result = read(&mut carrier, &ReaderOptions::default()).unwrap();
        assert_eq!(read_result.image_payloads[0].as_deref(), Some(payload.as_slice()));
    }

    #[test]
    fn s2_compressed_round_trip() {
        let unit = minimal_unit();
        let payload: Vec<u8> = (0u8..32).collect();
        let mut options = WriterOptions::default();
        options.default_compression = Some(CompressionRequest { codec: Codec::Zlib, item_size: None });

        let bytes = write(&unit, &[Some(payload.as_slice())], &options).unwrap();
        let mut carrier = Cursor::new(bytes);
        let read_result = read(&mut carrier, &ReaderOptions::default()).unwrap();
        assert_eq!(read_result.image_payloads[0].as_deref(), Some(payload.as_slice()));
        assert!(read_result.unit.images[0].pixel_data.compression.is_some());
        assert_eq!(read_result.unit.images[0].pixel_data.compression.as_ref().unwrap().uncompressed_size, 32);
    }

    #[test]
    fn rejects_wrong_signature() {
        let mut carrier = Cursor::new(b"NOTXISF0\x00\x00\x00\x00\x00\x00\x00\x00".to_vec());
        assert!(matches!(read(&mut carrier, &ReaderOptions::default()), Err(Error::InvalidSignature { .. })));
    }

    #[test]
    fn layout_fixed_point_holds_for_many_images() {
        let mut unit = minimal_unit();
        for i in 1..12 {
            let mut image = unit.images[0].clone();
            image.image_id = Some(format!("img{i}"));
            unit.images.push(image);
        }
        let payload: Vec<u8> = (0u8..32).collect();
        let payloads: Vec<Option<&[u8]>> = unit.images.iter().map(|_| Some(payload.as_slice())).collect();

        let bytes = write(&unit, &payloads, &WriterOptions::default()).unwrap();
        let mut carrier = Cursor::new(bytes.clone());
        let read_result = read(&mut carrier, &ReaderOptions::default()).unwrap();
        for p in &read_result.image_payloads {
            assert_eq!(p.as_deref(), Some(payload.as_slice()));
        }

        // Every attached position must fall within the file and ranges must
        // not overlap.
        let mut ranges: Vec<(u64, u64)> = Vec::new();
        for image in &read_result.unit.images {
            if let BlockLocation::Attached { position, size } = image.pixel_data.location {
                assert!(position + size <= bytes.len() as u64);
                ranges.push((position, position + size));
            }
        }
        ranges.sort();
        for w in ranges.windows(2) {
            assert!(w[0].1 <= w[1].0, "{:?}", ranges);
        }
    }

    #[test]
    fn invalid_unit_is_rejected_before_any_bytes_are_produced() {
        let mut unit = minimal_unit();
        unit.header.metadata.creator_application.clear();
        let payload: Vec<u8> = (0u8..32).collect();
        assert!(matches!(
            write(&unit, &[Some(payload.as_slice())], &WriterOptions::default()),
            Err(Error::ValidationFailed(_))
        ));
    }
}
