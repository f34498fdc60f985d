//! Integration tests for the monolithic façade round trip.

use chrono::{FixedOffset, TimeZone};
use std::io::Cursor;
use xisf_io::{facade, CompressionRequest, ReaderOptions, WriterOptions};
use xisf_model::{
    ColorSpace, DataBlock, Geometry, Header, Image, Metadata, PixelStorage, SampleFormat, StorageModel, Unit,
};

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
fn s1_uncompressed_monolithic_round_trip_through_the_facade() {
    let unit = minimal_unit();
    let payload: Vec<u8> = (0u8..32).collect();

    let xisf_io::WrittenUnit::Monolithic(bytes) =
        facade::write(&unit, &[Some(payload.as_slice())], &WriterOptions::default()).unwrap()
    else {
        panic!("expected monolithic output for a Monolithic storage model");
    };

    let mut carrier = Cursor::new(bytes);
    let read_result = facade::read(&mut carrier, None, "roundtrip.xisf", &ReaderOptions::default()).unwrap();

    assert_eq!(read_result.unit.header.metadata.creator_application, unit.header.metadata.creator_application);
    assert_eq!(read_result.unit.images.len(), 1);
    assert_eq!(read_result.unit.images[0].geometry, unit.images[0].geometry);
    assert_eq!(read_result.unit.images[0].sample_format, unit.images[0].sample_format);
    assert_eq!(read_result.image_payloads[0].as_deref(), Some(payload.as_slice()));
}

#[test]
fn s2_zlib_compressed_monolithic_round_trip() {
    let unit = minimal_unit();
    let payload: Vec<u8> = (0u8..32).collect();
    let mut options = WriterOptions::default();
    options.default_compression = Some(CompressionRequest { codec: xisf_core::Codec::Zlib, item_size: None });
    options.calculate_checksums = true;

    let xisf_io::WrittenUnit::Monolithic(bytes) =
        facade::write(&unit, &[Some(payload.as_slice())], &options).unwrap()
    else {
        panic!("expected monolithic output");
    };

    let mut carrier = Cursor::new(bytes);
    let mut reader_options = ReaderOptions::default();
    reader_options.validate_checksums = true;
    let read_result = facade::read(&mut carrier, None, "roundtrip.xisf", &reader_options).unwrap();

    assert_eq!(read_result.image_payloads[0].as_deref(), Some(payload.as_slice()));
    let compression = read_result.unit.images[0].pixel_data.compression.as_ref().unwrap();
    assert_eq!(compression.codec, xisf_core::Codec::Zlib);
    assert_eq!(compression.uncompressed_size, 32);
    assert!(read_result.unit.images[0].pixel_data.checksum.is_some());
}

#[test]
fn multi_image_unit_round_trips_with_distinct_payloads() {
    let mut unit = minimal_unit();
    let mut second = unit.images[0].clone();
    second.image_id = Some("img1".into());
    second.sample_format = SampleFormat::UInt8;
    unit.images.push(second);

    let payload_a: Vec<u8> = (0u8..32).collect();
    let payload_b: Vec<u8> = (0u8..16).rev().collect();

    let xisf_io::WrittenUnit::Monolithic(bytes) = facade::write(
        &unit,
        &[Some(payload_a.as_slice()), Some(payload_b.as_slice())],
        &WriterOptions::default(),
    )
    .unwrap() else {
        panic!("expected monolithic output");
    };

    let mut carrier = Cursor::new(bytes);
    let read_result = facade::read(&mut carrier, None, "multi.xisf", &ReaderOptions::default()).unwrap();
    assert_eq!(read_result.image_payloads[0].as_deref(), Some(payload_a.as_slice()));
    assert_eq!(read_result.image_payloads[1].as_deref(), Some(payload_b.as_slice()));
}
