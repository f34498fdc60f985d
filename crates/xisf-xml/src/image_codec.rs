//! `<Image>` element parse/emit, per the XISF 1.0 specification's XML
//! header codec section.

use crate::core_element_codec::{emit_core_element, is_core_element_tag, parse_core_element};
use crate::data_block_codec::{emit_data_block, parse_data_block};
use crate::dom::Element;
use crate::property_codec::{emit_property, parse_property};
use crate::{Error, Result};
use xisf_model::image::Orientation;
use xisf_model::{Bounds, ColorSpace, Geometry, Image, PixelStorage, SampleFormat};

const ELEM: &str = "Image";

fn missing(attribute: &'static str) -> Error {
    Error::MissingRequiredAttribute { element: ELEM, attribute }
}

pub fn parse_image(el: &Element) -> Result<Image> {
    let geometry = Geometry::parse(el.attr("geometry").ok_or(missing("geometry"))?)?;
    let sample_format = SampleFormat::parse(el.attr("sampleFormat").ok_or(missing("sampleFormat"))?)
        .ok_or_else(|| Error::UnknownEnumValue {
            element: ELEM,
            field: "sampleFormat",
            value: el.attr("sampleFormat").unwrap_or_default().to_string(),
        })?;
    let color_space = ColorSpace::parse(el.attr("colorSpace").ok_or(missing("colorSpace"))?)
        .ok_or_else(|| Error::UnknownEnumValue {
            element: ELEM,
            field: "colorSpace",
            value: el.attr("colorSpace").unwrap_or_default().to_string(),
        })?;

    let bounds = el.attr("bounds").map(Bounds::parse).transpose()?;
    let pixel_storage = match el.attr("pixelStorage") {
        Some(v) => PixelStorage::parse(v).ok_or_else(|| Error::UnknownEnumValue {
            element: ELEM,
            field: "pixelStorage",
            value: v.to_string(),
        })?,
        None => PixelStorage::default(),
    };

    let offset = el.attr("offset").map(|v| v.parse::<f64>()).transpose().map_err(|_| Error::UnknownEnumValue {
        element: ELEM,
        field: "offset",
        value: el.attr("offset").unwrap_or_default().to_string(),
    })?;

    let orientation = el.attr("orientation").map(|v| parse_orientation(v)).transpose()?;

    let pixel_data = parse_data_block(el, ELEM)?;

    let mut properties = Vec::new();
    let mut associated_elements = Vec::new();
    for child in &el.children {
        if child.name == "Property" {
            properties.push(parse_property(child)?);
        } else if is_core_element_tag(&child.name) {
            associated_elements.push(parse_core_element(child)?);
        }
    }

    Ok(Image {
        geometry,
        sample_format,
        color_space,
        pixel_data,
        bounds,
        pixel_storage,
        image_type: el.attr("imageType").map(str::to_string),
        offset,
        orientation,
        image_id: el.attr("id").map(str::to_string),
        uuid: el.attr("uuid").map(str::to_string),
        properties,
        associated_elements,
    })
}

fn parse_orientation(s: &str) -> Result<Orientation> {
    let (rot_str, mirror_str) = s.split_once(':').ok_or_else(|| Error::UnknownEnumValue {
        element: ELEM,
        field: "orientation",
        value: s.to_string(),
    })?;
    let rotation: i32 = rot_str.parse().map_err(|_| Error::UnknownEnumValue {
        element: ELEM,
        field: "orientation",
        value: s.to_string(),
    })?;
    Ok(Orientation {
        rotation,
        horizontal_mirror: mirror_str == "1",
    })
}

fn orientation_to_wire(o: &Orientation) -> String {
    format!("{}:{}", o.rotation, if o.horizontal_mirror { 1 } else { 0 })
}

pub fn emit_image(image: &Image) -> Element {
    let mut el = Element::new(ELEM)
        .with_attr("geometry", image.geometry.to_wire())
        .with_attr("sampleFormat", image.sample_format.as_str())
        .with_attr("colorSpace", image.color_space.as_str());

    if let Some(bounds) = &image.bounds {
        el = el.with_attr("bounds", bounds.to_wire());
    }
    if image.pixel_storage != PixelStorage::default() {
        el = el.with_attr("pixelStorage", image.pixel_storage.as_str());
    }
    if let Some(image_type) = &image.image_type {
        el = el.with_attr("imageType", image_type.clone());
    }
    if let Some(offset) = image.offset {
        el = el.with_attr("offset", offset.to_string());
    }
    if let Some(orientation) = &image.orientation {
        el = el.with_attr("orientation", orientation_to_wire(orientation));
    }
    if let Some(id) = &image.image_id {
        el = el.with_attr("id", id.clone());
    }
    if let Some(uuid) = &image.uuid {
        el = el.with_attr("uuid", uuid.clone());
    }

    el = emit_data_block(el, &image.pixel_data);

    for prop in &image.properties {
        el = el.with_child(emit_property(prop));
    }
    for core in &image.associated_elements {
        el = el.with_child(emit_core_element(core, None));
    }

    el
}

#[cfg(test)]
mod tests {
    use super::*;
    use xisf_model::DataBlock;

    fn minimal_image() -> Image {
        Image {
            geometry: Geometry::new(vec![4, 4], 1).unwrap(),
            sample_format: SampleFormat::UInt16,
            color_space: ColorSpace::Gray,
            pixel_data: DataBlock::attached(65, 32),
            bounds: None,
            pixel_storage: PixelStorage::Planar,
            image_type: None,
            offset: None,
            orientation: None,
            image_id: None,
            uuid: None,
            properties: Vec::new(),
            associated_elements: Vec::new(),
        }
    }

    #[test]
    fn round_trips_minimal_image() {
        let image = minimal_image();
        let el = emit_image(&image);
        assert_eq!(el.attr("geometry"), Some("4:4:1"));
        let parsed = parse_image(&el).unwrap();
        assert_eq!(parsed.geometry, image.geometry);
        assert_eq!(parsed.sample_format, image.sample_format);
        assert_eq!(parsed.pixel_data, image.pixel_data);
    }

    #[test]
    fn missing_location_is_an_error() {
        let el = Element::new(ELEM)
            .with_attr("geometry", "4:4:1")
            .with_attr("sampleFormat", "UInt16")
            .with_attr("colorSpace", "Gray");
        assert!(parse_image(&el).is_err());
    }
}
