//! Shared parse/emit for the location+byteOrder+compression+checksum
//! attributes carried by `<Image>` and any core element with a binary
//! payload (`ICCProfile`, `Thumbnail`).

use crate::dom::Element;
use crate::encoding;
use crate::location::Location;
use crate::{Error, Result};
use xisf_core::{ByteOrder, Checksum, CompressionMeta};
use xisf_model::{BlockLocation, DataBlock};

/// Parse the location/byteOrder/compression/checksum attributes of `el` into
/// a [`DataBlock`]. `element` names the owning tag for error messages.
pub fn parse_data_block(el: &Element, element: &'static str) -> Result<DataBlock> {
    let location_str = el
        .attr("location")
        .map(str::to_string)
        .or_else(|| if el.child_named("Data").is_some() { Some("embedded".to_string()) } else { None })
        .ok_or(Error::MissingPixelData)?;

    let location = Location::parse(&location_str)?;
    let block_location = match location {
        Location::Inline(encoding) => BlockLocation::Inline {
            encoded: el.text.clone(),
            encoding,
        },
        Location::Embedded => {
            let data_el = el.child_named("Data").ok_or(Error::MissingPixelData)?;
            let encoding = xisf_model::Encoding::parse(data_el.attr("encoding").unwrap_or("base64"))
                .ok_or_else(|| Error::UnknownEnumValue {
                    element,
                    field: "Data/@encoding",
                    value: data_el.attr("encoding").unwrap_or_default().to_string(),
                })?;
            BlockLocation::Embedded {
                encoded: data_el.text.clone(),
                encoding,
            }
        }
        Location::Attachment { position, size } => BlockLocation::Attached { position, size },
        Location::Url(uri) => BlockLocation::External {
            uri,
            position: el.attr("position").map(|v| v.parse()).transpose().map_err(bad_u64(element, "position"))?,
            size: el.attr("size").map(|v| v.parse()).transpose().map_err(bad_u64(element, "size"))?,
            index_id: None,
        },
        Location::Path(path) => BlockLocation::External {
            uri: path,
            position: el.attr("position").map(|v| v.parse()).transpose().map_err(bad_u64(element, "position"))?,
            size: el.attr("size").map(|v| v.parse()).transpose().map_err(bad_u64(element, "size"))?,
            index_id: el.attr("indexId").map(|v| v.parse()).transpose().map_err(bad_u64(element, "indexId"))?,
        },
    };

    let byte_order = el
        .attr("byteOrder")
        .map(|v| ByteOrder::parse(v).ok_or_else(|| Error::UnknownEnumValue {
            element,
            field: "byteOrder",
            value: v.to_string(),
        }))
        .transpose()?
        .unwrap_or_default();

    let compression = el
        .attr("compression")
        .map(CompressionMeta::parse)
        .transpose()
        .map_err(Error::Core)?;

    let checksum = el.attr("checksum").map(Checksum::parse).transpose().map_err(Error::Core)?;

    Ok(DataBlock {
        location: block_location,
        byte_order,
        compression,
        checksum,
    })
}

fn bad_u64(element: &'static str, field: &'static str) -> impl Fn(std::num::ParseIntError) -> Error {
    move |_| Error::UnknownEnumValue {
        element,
        field,
        value: String::new(),
    }
}

/// Apply a [`DataBlock`]'s location/byteOrder/compression/checksum attributes
/// (and an embedded `<Data>` child, if any) onto `el`.
pub fn emit_data_block(mut el: Element, block: &DataBlock) -> Element {
    let location = match &block.location {
        BlockLocation::Inline { encoded, encoding } => {
            el.text = encoded.clone();
            Location::Inline(*encoding)
        }
        BlockLocation::Embedded { encoded, encoding } => {
            el = el.with_child(
                Element::new("Data").with_attr("encoding", encoding.as_str()).with_text(encoded.clone()),
            );
            Location::Embedded
        }
        BlockLocation::Attached { position, size } => Location::Attachment {
            position: *position,
            size: *size,
        },
        BlockLocation::External { uri, position, size, index_id } => {
            if let Some(position) = position {
                el = el.with_attr("position", position.to_string());
            }
            if let Some(size) = size {
                el = el.with_attr("size", size.to_string());
            }
            if let Some(index_id) = index_id {
                el = el.with_attr("indexId", index_id.to_string());
                Location::Path(uri.clone())
            } else {
                Location::Url(uri.clone())
            }
        }
    };
    el = el.with_attr("location", location.to_wire());

    if block.byte_order != ByteOrder::default() {
        el = el.with_attr("byteOrder", block.byte_order.as_str());
    }
    if let Some(compression) = &block.compression {
        el = el.with_attr("compression", compression.to_wire());
    }
    if let Some(checksum) = &block.checksum {
        el = el.with_attr("checksum", checksum.to_wire());
    }
    el
}

/// `encoding::decode`/`encoding::encode` re-exported for convenience of
/// callers that need to materialize an inline/embedded payload directly.
pub use encoding::{decode as decode_payload, encode as encode_payload};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_round_trip() {
        let block = DataBlock::attached(4096, 64);
        let el = emit_data_block(Element::new("Image"), &block);
        assert_eq!(el.attr("location"), Some("attachment:4096:64"));
        let parsed = parse_data_block(&el, "Image").unwrap();
        assert_eq!(parsed, block);
    }

    #[test]
    fn inline_round_trip() {
        let block = DataBlock::inline(encoding::encode(b"hello", xisf_model::Encoding::Base64), xisf_model::Encoding::Base64);
        let el = emit_data_block(Element::new("Image"), &block);
        let parsed = parse_data_block(&el, "Image").unwrap();
        assert_eq!(parsed, block);
    }

    #[test]
    fn embedded_round_trip() {
        let block = DataBlock::embedded(encoding::encode(b"hello", xisf_model::Encoding::Hex), xisf_model::Encoding::Hex);
        let el = emit_data_block(Element::new("Image"), &block);
        assert!(el.child_named("Data").is_some());
        let parsed = parse_data_block(&el, "Image").unwrap();
        assert_eq!(parsed, block);
    }
}
