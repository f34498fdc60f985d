//! Image element data model: geometry, sample format, color space, bounds.

use crate::data_block::DataBlock;
use crate::property::Property;
use crate::{CoreElement, Error, Result};

/// Ordered pixel-space dimensions plus a channel count, e.g. `1024:1024:3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    /// Spatial dimensions in declaration order (width, height, ...). Each is positive.
    pub dims: Vec<u64>,
    /// Channel count. Positive.
    pub channels: u64,
}

impl Geometry {
    pub fn new(dims: Vec<u64>, channels: u64) -> Result<Self> {
        if dims.is_empty() || dims.iter().any(|&d| d == 0) {
            return Err(Error::InvalidRange {
                lower: "0".into(),
                upper: "dims must all be positive".into(),
            });
        }
        if channels == 0 {
            return Err(Error::InvalidRange {
                lower: "0".into(),
                upper: "channels must be positive".into(),
            });
        }
        Ok(Geometry { dims, channels })
    }

    /// Total element count across all spatial dimensions and channels.
    pub fn element_count(&self) -> u64 {
        self.dims.iter().product::<u64>() * self.channels
    }

    /// Render the `dim1:dim2:...:channels` wire form.
    pub fn to_wire(&self) -> String {
        let mut parts: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        parts.push(self.channels.to_string());
        parts.join(":")
    }

    /// Parse a `dim1:dim2:...:channels` wire form. Requires at least 2 fields
    /// (at least one dimension plus the channel count).
    pub fn parse(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() < 2 {
            return Err(Error::MissingRequiredAttribute("geometry"));
        }
        let nums: std::result::Result<Vec<u64>, _> = fields.iter().map(|f| f.parse::<u64>()).collect();
        let nums = nums.map_err(|_| Error::UnknownEnumValue {
            field: "geometry",
            value: s.to_string(),
        })?;
        let (channels, dims) = nums.split_last().expect("checked len >= 2");
        Geometry::new(dims.to_vec(), *channels)
    }
}

/// Pixel sample storage format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex32,
    Complex64,
}

impl SampleFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            SampleFormat::UInt8 => "UInt8",
            SampleFormat::UInt16 => "UInt16",
            SampleFormat::UInt32 => "UInt32",
            SampleFormat::UInt64 => "UInt64",
            SampleFormat::Float32 => "Float32",
            SampleFormat::Float64 => "Float64",
            SampleFormat::Complex32 => "Complex32",
            SampleFormat::Complex64 => "Complex64",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "UInt8" => SampleFormat::UInt8,
            "UInt16" => SampleFormat::UInt16,
            "UInt32" => SampleFormat::UInt32,
            "UInt64" => SampleFormat::UInt64,
            "Float32" => SampleFormat::Float32,
            "Float64" => SampleFormat::Float64,
            "Complex32" => SampleFormat::Complex32,
            "Complex64" => SampleFormat::Complex64,
            _ => return None,
        })
    }

    /// Item size in bytes.
    pub const fn item_size(self) -> usize {
        match self {
            SampleFormat::UInt8 => 1,
            SampleFormat::UInt16 => 2,
            SampleFormat::UInt32 => 4,
            SampleFormat::UInt64 => 8,
            SampleFormat::Float32 => 4,
            SampleFormat::Float64 => 8,
            SampleFormat::Complex32 => 8,
            SampleFormat::Complex64 => 16,
        }
    }

    /// Whether this format requires a `bounds` element (floating or complex).
    pub const fn requires_bounds(self) -> bool {
        matches!(
            self,
            SampleFormat::Float32 | SampleFormat::Float64 | SampleFormat::Complex32 | SampleFormat::Complex64
        )
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Image color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
    CieLab,
}

impl ColorSpace {
    pub const fn as_str(self) -> &'static str {
        match self {
            ColorSpace::Gray => "Gray",
            ColorSpace::Rgb => "RGB",
            ColorSpace::CieLab => "CIELab",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Gray" => ColorSpace::Gray,
            "RGB" => ColorSpace::Rgb,
            "CIELab" => ColorSpace::CieLab,
            _ => return None,
        })
    }
}

impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// In-memory layout of channel planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelStorage {
    /// Each channel is a contiguous plane (the XISF default).
    Planar,
    /// Channels are interleaved per pixel.
    Normal,
}

impl Default for PixelStorage {
    fn default() -> Self {
        PixelStorage::Planar
    }
}

impl PixelStorage {
    pub const fn as_str(self) -> &'static str {
        match self {
            PixelStorage::Planar => "Planar",
            PixelStorage::Normal => "Normal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Planar" => PixelStorage::Planar,
            "Normal" => PixelStorage::Normal,
            _ => return None,
        })
    }
}

/// Pixel-sample range, required for floating-point and complex sample formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !(lower < upper) {
            return Err(Error::InvalidRange {
                lower: lower.to_string(),
                upper: upper.to_string(),
            });
        }
        Ok(Bounds { lower, upper })
    }

    pub fn to_wire(&self) -> String {
        format!("{}:{}", fmt_f64(self.lower), fmt_f64(self.upper))
    }

    pub fn parse(s: &str) -> Result<Self> {
        let (lo, hi) = s.split_once(':').ok_or(Error::MissingRequiredAttribute("bounds"))?;
        let lower: f64 = lo.parse().map_err(|_| Error::UnknownEnumValue {
            field: "bounds",
            value: s.to_string(),
        })?;
        let upper: f64 = hi.parse().map_err(|_| Error::UnknownEnumValue {
            field: "bounds",
            value: s.to_string(),
        })?;
        Bounds::new(lower, upper)
    }
}

fn fmt_f64(v: f64) -> String {
    // Locale-invariant, dot-separated; exact rendering of `bounds` is owned
    // by the XML codec (17 significant digits, per the XISF 1.0 specification's
    // external interfaces section). This is a convenience formatter for
    // model-level debugging/round-tripping.
    format!("{v}")
}

/// Orientation metadata, informational only (the core never rotates pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub rotation: i32,
    pub horizontal_mirror: bool,
}

/// One `<Image>` element: geometry, format and its pixel data block.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub geometry: Geometry,
    pub sample_format: SampleFormat,
    pub color_space: ColorSpace,
    pub pixel_data: DataBlock,
    pub bounds: Option<Bounds>,
    pub pixel_storage: PixelStorage,
    pub image_type: Option<String>,
    pub offset: Option<f64>,
    pub orientation: Option<Orientation>,
    pub image_id: Option<String>,
    pub uuid: Option<String>,
    pub properties: Vec<Property>,
    pub associated_elements: Vec<CoreElement>,
}

impl Image {
    /// `item_size` for byte-order conversion of this image's pixel payload.
    pub fn item_size(&self) -> usize {
        self.sample_format.item_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_round_trip() {
        let g = Geometry::parse("1024:768:3").unwrap();
        assert_eq!(g.dims, vec![1024, 768]);
        assert_eq!(g.channels, 3);
        assert_eq!(g.to_wire(), "1024:768:3");
    }

    #[test]
    fn geometry_rejects_single_field() {
        assert!(Geometry::parse("1024").is_err());
    }

    #[test]
    fn geometry_rejects_zero_dimension() {
        assert!(Geometry::new(vec![0], 1).is_err());
    }

    #[test]
    fn bounds_requires_strict_order() {
        assert!(Bounds::new(1.0, 0.0).is_err());
        assert!(Bounds::new(0.0, 0.0).is_err());
        assert!(Bounds::new(0.0, 1.0).is_ok());
    }

    #[test]
    fn sample_format_item_sizes() {
        assert_eq!(SampleFormat::UInt8.item_size(), 1);
        assert_eq!(SampleFormat::UInt16.item_size(), 2);
        assert_eq!(SampleFormat::Complex64.item_size(), 16);
        assert!(SampleFormat::Float32.requires_bounds());
        assert!(!SampleFormat::UInt16.requires_bounds());
    }
}
