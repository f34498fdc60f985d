//! Core element parse/emit: `Reference`, `ColorFilterArray`, `Resolution`,
//! `FITSKeyword`, `ICCProfile`, `RGBWorkingSpace`, `DisplayFunction`,
//! `Thumbnail`, per the XISF 1.0 specification's XML header codec section.

use crate::data_block_codec::{emit_data_block, parse_data_block};
use crate::dom::Element;
use crate::{Error, Result};
use xisf_model::core_element::{ColorFilterArrayData, ResolutionUnit};
use xisf_model::{ColorSpace, CoreElement, Geometry, PixelStorage, SampleFormat};

pub const TAGS: &[&str] = &[
    "Reference",
    "ColorFilterArray",
    "Resolution",
    "FITSKeyword",
    "ICCProfile",
    "RGBWorkingSpace",
    "DisplayFunction",
    "Thumbnail",
];

pub fn is_core_element_tag(name: &str) -> bool {
    TAGS.contains(&name)
}

fn missing(element: &'static str, attribute: &'static str) -> Error {
    Error::MissingRequiredAttribute { element, attribute }
}

fn parse_f64(element: &'static str, field: &'static str, s: &str) -> Result<f64> {
    s.parse().map_err(|_| Error::UnknownEnumValue {
        element,
        field,
        value: s.to_string(),
    })
}

pub fn parse_core_element(el: &Element) -> Result<CoreElement> {
    Ok(match el.name.as_str() {
        "Reference" => CoreElement::Reference {
            ref_id: el.attr("ref").ok_or(missing("Reference", "ref"))?.to_string(),
        },
        "ColorFilterArray" => CoreElement::ColorFilterArray(ColorFilterArrayData {
            pattern: el.attr("pattern").ok_or(missing("ColorFilterArray", "pattern"))?.to_string(),
            width: el
                .attr("width")
                .ok_or(missing("ColorFilterArray", "width"))?
                .parse()
                .map_err(|_| Error::UnknownEnumValue {
                    element: "ColorFilterArray",
                    field: "width",
                    value: el.attr("width").unwrap_or_default().to_string(),
                })?,
            height: el
                .attr("height")
                .ok_or(missing("ColorFilterArray", "height"))?
                .parse()
                .map_err(|_| Error::UnknownEnumValue {
                    element: "ColorFilterArray",
                    field: "height",
                    value: el.attr("height").unwrap_or_default().to_string(),
                })?,
            name: el.attr("name").map(str::to_string),
        }),
        "Resolution" => CoreElement::Resolution {
            horizontal: parse_f64("Resolution", "horizontal", el.attr("horizontal").ok_or(missing("Resolution", "horizontal"))?)?,
            vertical: parse_f64("Resolution", "vertical", el.attr("vertical").ok_or(missing("Resolution", "vertical"))?)?,
            unit: ResolutionUnit::parse(el.attr("unit").ok_or(missing("Resolution", "unit"))?).ok_or_else(|| {
                Error::UnknownEnumValue {
                    element: "Resolution",
                    field: "unit",
                    value: el.attr("unit").unwrap_or_default().to_string(),
                }
            })?,
        },
        "FITSKeyword" => CoreElement::FitsKeyword {
            name: el.attr("name").ok_or(missing("FITSKeyword", "name"))?.to_string(),
            value: el.attr("value").unwrap_or_default().to_string(),
            comment: el.attr("comment").unwrap_or_default().to_string(),
        },
        "ICCProfile" => CoreElement::IccProfile(parse_data_block(el, "ICCProfile")?),
        "RGBWorkingSpace" => {
            let f = |field: &'static str| -> Result<f64> {
                parse_f64("RGBWorkingSpace", field, el.attr(field).ok_or(missing("RGBWorkingSpace", field))?)
            };
            CoreElement::RgbWorkingSpace {
                gamma: f("gamma")?,
                chromaticity: [(f("x0")?, f("y0")?), (f("x1")?, f("y1")?), (f("x2")?, f("y2")?)],
                luminance: [f("Y0")?, f("Y1")?, f("Y2")?],
                name: el.attr("name").map(str::to_string),
            }
        }
        "DisplayFunction" => {
            let f = |field: &'static str| -> Result<f64> {
                parse_f64("DisplayFunction", field, el.attr(field).ok_or(missing("DisplayFunction", field))?)
            };
            CoreElement::DisplayFunction {
                parameters: [f("m0")?, f("m1")?, f("m2")?, f("m3")?],
                name: el.attr("name").map(str::to_string),
            }
        }
        "Thumbnail" => CoreElement::Thumbnail {
            geometry: Geometry::parse(el.attr("geometry").ok_or(missing("Thumbnail", "geometry"))?)?,
            sample_format: SampleFormat::parse(el.attr("sampleFormat").ok_or(missing("Thumbnail", "sampleFormat"))?)
                .ok_or_else(|| Error::UnknownEnumValue {
                    element: "Thumbnail",
                    field: "sampleFormat",
                    value: el.attr("sampleFormat").unwrap_or_default().to_string(),
                })?,
            color_space: ColorSpace::parse(el.attr("colorSpace").ok_or(missing("Thumbnail", "colorSpace"))?)
                .ok_or_else(|| Error::UnknownEnumValue {
                    element: "Thumbnail",
                    field: "colorSpace",
                    value: el.attr("colorSpace").unwrap_or_default().to_string(),
                })?,
            pixel_data: parse_data_block(el, "Thumbnail")?,
            pixel_storage: match el.attr("pixelStorage") {
                Some(v) => PixelStorage::parse(v).ok_or_else(|| Error::UnknownEnumValue {
                    element: "Thumbnail",
                    field: "pixelStorage",
                    value: v.to_string(),
                })?,
                None => PixelStorage::default(),
            },
        },
        other => {
            return Err(Error::UnknownEnumValue {
                element: "Header",
                field: "core element",
                value: other.to_string(),
            })
        }
    })
}

/// Emit a core element. `uid` is the key it's stored under in
/// `Header::core_elements`, if any (set as the `id` attribute).
pub fn emit_core_element(element: &CoreElement, uid: Option<&str>) -> Element {
    let mut el = Element::new(element.tag_name());
    if let Some(uid) = uid {
        el = el.with_attr("id", uid);
    }

    match element {
        CoreElement::Reference { ref_id } => el = el.with_attr("ref", ref_id.clone()),
        CoreElement::ColorFilterArray(cfa) => {
            el = el
                .with_attr("pattern", cfa.pattern.clone())
                .with_attr("width", cfa.width.to_string())
                .with_attr("height", cfa.height.to_string());
            if let Some(name) = &cfa.name {
                el = el.with_attr("name", name.clone());
            }
        }
        CoreElement::Resolution { horizontal, vertical, unit } => {
            el = el
                .with_attr("horizontal", horizontal.to_string())
                .with_attr("vertical", vertical.to_string())
                .with_attr("unit", unit.as_str());
        }
        CoreElement::FitsKeyword { name, value, comment } => {
            el = el
                .with_attr("name", name.clone())
                .with_attr("value", value.clone())
                .with_attr("comment", comment.clone());
        }
        CoreElement::IccProfile(block) => el = emit_data_block(el, block),
        CoreElement::RgbWorkingSpace { gamma, chromaticity, luminance, name } => {
            el = el.with_attr("gamma", gamma.to_string());
            for (i, (x, y)) in chromaticity.iter().enumerate() {
                el = el.with_attr(format!("x{i}"), x.to_string()).with_attr(format!("y{i}"), y.to_string());
            }
            for (i, y) in luminance.iter().enumerate() {
                el = el.with_attr(format!("Y{i}"), y.to_string());
            }
            if let Some(name) = name {
                el = el.with_attr("name", name.clone());
            }
        }
        CoreElement::DisplayFunction { parameters, name } => {
            for (i, p) in parameters.iter().enumerate() {
                el = el.with_attr(format!("m{i}"), p.to_string());
            }
            if let Some(name) = name {
                el = el.with_attr("name", name.clone());
            }
        }
        CoreElement::Thumbnail { geometry, sample_format, color_space, pixel_data, pixel_storage } => {
            el = el
                .with_attr("geometry", geometry.to_wire())
                .with_attr("sampleFormat", sample_format.as_str())
                .with_attr("colorSpace", color_space.as_str());
            if *pixel_storage != PixelStorage::default() {
                el = el.with_attr("pixelStorage", pixel_storage.as_str());
            }
            el = emit_data_block(el, pixel_data);
        }
    }
    el
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_round_trip() {
        let element = CoreElement::Reference { ref_id: "thumb1".to_string() };
        let el = emit_core_element(&element, Some("r1"));
        assert_eq!(el.attr("id"), Some("r1"));
        assert_eq!(parse_core_element(&el).unwrap(), element);
    }

    #[test]
    fn fits_keyword_round_trip() {
        let element = CoreElement::FitsKeyword {
            name: "OBJECT".into(),
            value: "M31".into(),
            comment: "target".into(),
        };
        let el = emit_core_element(&element, None);
        assert_eq!(parse_core_element(&el).unwrap(), element);
    }

    #[test]
    fn resolution_round_trip() {
        let element = CoreElement::Resolution {
            horizontal: 300.0,
            vertical: 300.0,
            unit: ResolutionUnit::Inch,
        };
        let el = emit_core_element(&element, None);
        assert_eq!(parse_core_element(&el).unwrap(), element);
    }
}
