//! Core element data model: the XISF top-level XML elements other than
//! `<Image>`, `<Property>` and `<Metadata>`.

use crate::data_block::DataBlock;
use crate::image::{ColorSpace, Geometry, PixelStorage, SampleFormat};
use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

fn uid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[_A-Za-z][_A-Za-z0-9]*$").expect("static regex"))
}

/// Validate a core-element `uid`.
pub fn validate_uid(uid: &str) -> Result<()> {
    if uid_regex().is_match(uid) {
        Ok(())
    } else {
        Err(Error::InvalidUid(uid.to_string()))
    }
}

/// Resolution unit for the `Resolution` core element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionUnit {
    Cm,
    Inch,
}

impl ResolutionUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            ResolutionUnit::Cm => "cm",
            ResolutionUnit::Inch => "inch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "cm" => ResolutionUnit::Cm,
            "inch" => ResolutionUnit::Inch,
            _ => return None,
        })
    }
}

/// A CFA (color filter array) cell pattern payload plus its declared geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorFilterArrayData {
    pub pattern: String,
    pub width: u32,
    pub height: u32,
    pub name: Option<String>,
}

/// Chromaticity coordinates (x, y).
pub type Chromaticity = (f64, f64);

/// XISF top-level elements other than `Image`/`Property`/`Metadata`.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreElement {
    /// A reference to another core element by `uid`, validated to exist in
    /// the same header (see the XISF 1.0 specification's data model invariants).
    Reference { ref_id: String },
    ColorFilterArray(ColorFilterArrayData),
    Resolution {
        horizontal: f64,
        vertical: f64,
        unit: ResolutionUnit,
    },
    FitsKeyword {
        name: String,
        value: String,
        comment: String,
    },
    IccProfile(DataBlock),
    RgbWorkingSpace {
        gamma: f64,
        chromaticity: [Chromaticity; 3],
        luminance: [f64; 3],
        name: Option<String>,
    },
    DisplayFunction {
        parameters: [f64; 4],
        name: Option<String>,
    },
    Thumbnail {
        geometry: Geometry,
        sample_format: SampleFormat,
        color_space: ColorSpace,
        pixel_data: DataBlock,
        pixel_storage: PixelStorage,
    },
}

impl CoreElement {
    /// XML tag name for this element variant.
    pub const fn tag_name(&self) -> &'static str {
        match self {
            CoreElement::Reference { .. } => "Reference",
            CoreElement::ColorFilterArray(_) => "ColorFilterArray",
            CoreElement::Resolution { .. } => "Resolution",
            CoreElement::FitsKeyword { .. } => "FITSKeyword",
            CoreElement::IccProfile(_) => "ICCProfile",
            CoreElement::RgbWorkingSpace { .. } => "RGBWorkingSpace",
            CoreElement::DisplayFunction { .. } => "DisplayFunction",
            CoreElement::Thumbnail { .. } => "Thumbnail",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_grammar() {
        assert!(validate_uid("_Thumb1").is_ok());
        assert!(validate_uid("1Bad").is_err());
        assert!(validate_uid("has:colon").is_err());
    }
}
