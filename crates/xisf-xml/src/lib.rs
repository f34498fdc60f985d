//! XISF 1.0 XML header grammar: parse and emit the `<xisf>` document that
//! carries a unit's metadata, images and properties.
//!
//! This crate is pure XML-to-model translation. It knows nothing of file
//! framing, attached-block offsets or compressed/encoded payload bytes
//! beyond the text that names where they live. That's `xisf-io`'s job.

mod core_element_codec;
mod data_block_codec;
pub mod dom;
mod encoding;
mod error;
mod floats;
mod image_codec;
mod location;
mod header_codec;
mod property_codec;

pub use data_block_codec::{decode_payload as encoding_decode, encode_payload as encoding_encode};
pub use error::{Error, Result};
pub use location::Location;

use dom::Element;
use image_codec::{emit_image, parse_image};
use property_codec::{emit_property, parse_property};
use xisf_model::property::Property;
use xisf_model::{Header, Image, Signature};

/// XISF 1.0 root namespace URI. The root `<xisf>` element must declare this
/// as its default namespace.
pub const NAMESPACE: &str = "http://www.pixinsight.com/xisf";
/// The only XISF version this crate understands.
pub const VERSION: &str = "1.0";

const ROOT: &str = "xisf";

/// Everything the XML header grammar carries, independent of how (or
/// whether) the unit's pixel data is stored alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct XisfDocument {
    pub header: Header,
    pub images: Vec<Image>,
    pub global_properties: Vec<Property>,
    pub signature: Option<Signature>,
}

/// Parse a complete `<xisf>` XML document (header plus any `<Image>`
/// elements) into a [`XisfDocument`].
pub fn parse_document(xml: &str) -> Result<XisfDocument> {
    let (root, _initial_comment) = dom::parse_document(xml)?;
    if root.name != ROOT {
        return Err(Error::MissingRoot);
    }
    validate_root_attrs(&root)?;

    let header = header_codec::parse_header(&root)?;

    let mut images = Vec::new();
    let mut global_properties = Vec::new();
    let mut signature = None;
    for child in &root.children {
        match child.name.as_str() {
            "Image" => images.push(parse_image(child)?),
            "Property" => global_properties.push(parse_property(child)?),
            "Signature" => signature = Some(parse_signature(child)?),
            _ => {}
        }
    }

    Ok(XisfDocument { header, images, global_properties, signature })
}

fn validate_root_attrs(root: &Element) -> Result<()> {
    match root.attr("version") {
        Some(VERSION) => {}
        other => return Err(Error::UnsupportedVersion(other.unwrap_or("").to_string())),
    }
    let xmlns = root
        .attrs
        .iter()
        .find(|(k, _)| k == "xmlns")
        .map(|(_, v)| v.as_str());
    if xmlns != Some(NAMESPACE) {
        return Err(Error::MissingRoot);
    }
    Ok(())
}

fn parse_signature(el: &Element) -> Result<Signature> {
    let block_base64 = el.attr("block").ok_or(Error::MissingRequiredAttribute {
        element: "Signature",
        attribute: "block",
    })?;
    Ok(Signature { block_base64: block_base64.to_string() })
}

fn emit_signature(signature: &Signature) -> Element {
    Element::new("Signature").with_attr("block", signature.block_base64.clone())
}

/// Serialize a [`XisfDocument`] to a complete `<xisf>` XML document.
/// `pretty` selects two-space indentation (used for `.xish` sidecar files;
/// monolithic `.xisf` headers are written compact).
pub fn write_document(doc: &XisfDocument, pretty: bool) -> Result<String> {
    let mut root = Element::new(ROOT).with_attr("version", VERSION).with_attr("xmlns", NAMESPACE);

    for child in header_codec::emit_header_children(&doc.header) {
        root = root.with_child(child);
    }
    for image in &doc.images {
        root = root.with_child(emit_image(image));
    }
    for prop in &doc.global_properties {
        root = root.with_child(emit_property(prop));
    }
    if let Some(signature) = &doc.signature {
        root = root.with_child(emit_signature(signature));
    }

    dom::write_document(&root, None, pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use xisf_model::{ColorSpace, DataBlock, Geometry, Metadata, PixelStorage, SampleFormat};

    fn sample_document() -> XisfDocument {
        let ts = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let header = Header::new(Metadata::new(ts, "xisf-rs test suite"));
        let image = Image {
            geometry: Geometry::new(vec![2, 2], 1).unwrap(),
            sample_format: SampleFormat::UInt16,
            color_space: ColorSpace::Gray,
            pixel_data: DataBlock::attached(64, 8),
            bounds: None,
            pixel_storage: PixelStorage::Planar,
            image_type: None,
            offset: None,
            orientation: None,
            image_id: None,
            uuid: None,
            properties: Vec::new(),
            associated_elements: Vec::new(),
        };
        XisfDocument { header, images: vec![image], global_properties: Vec::new(), signature: None }
    }

    #[test]
    fn round_trips_a_minimal_document() {
        let doc = sample_document();
        let xml = write_document(&doc, true).unwrap();
        assert!(xml.contains(NAMESPACE));
        let parsed = parse_document(&xml).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn rejects_wrong_version() {
        let xml = format!(
            r#"<?xml version="1.0"?><xisf version="2.0" xmlns="{NAMESPACE}"><Metadata/></xisf>"#
        );
        assert!(matches!(parse_document(&xml), Err(Error::UnsupportedVersion(_))));
    }

    #[test]
    fn rejects_wrong_namespace() {
        let xml = r#"<?xml version="1.0"?><xisf version="1.0" xmlns="http://example.org/not-xisf"><Metadata/></xisf>"#;
        assert!(matches!(parse_document(xml), Err(Error::MissingRoot)));
    }
}
