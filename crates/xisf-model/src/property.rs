//! Property data model: typed, identified metadata values attached to a
//! header or an image.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::sync::OnceLock;

/// Canonical identifier grammar from the XISF 1.0 specification
/// (single-colon namespace separator), extended here to also accept the
/// double-colon form some writers emit in practice.
fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[_A-Za-z][_A-Za-z0-9]*(:{1,2}[_A-Za-z][_A-Za-z0-9]*)*$").expect("static regex")
    })
}

/// Validate a property `id` or core-element `uid` namespace-qualified form.
pub fn validate_property_id(id: &str) -> Result<()> {
    if id_regex().is_match(id) {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier(id.to_string()))
    }
}

/// A scalar numeric value, preserving its declared width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

/// A complex numeric value (real, imaginary), at `f32` or `f64` precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Complex {
    C32(f32, f32),
    C64(f64, f64),
}

/// A 1-D vector of same-typed scalar components.
#[derive(Debug, Clone, PartialEq)]
pub enum Vector {
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// A 2-D row-major matrix of same-typed scalar components.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: MatrixData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatrixData {
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// A `<Table>` property: rows of named scalar columns. Kept as raw text per
/// column since the XISF 1.0 Table shape is underspecified beyond "tabular
/// data"; consumers interpret column semantics out of band.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The value carried by a [`Property`], tagged by shape per the XISF 1.0
/// specification's data model section.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Scalar(Scalar),
    Complex(Complex),
    String(String),
    TimePoint(DateTime<FixedOffset>),
    Vector(Vector),
    Matrix(Matrix),
    Table(Table),
}

impl PropertyValue {
    /// The `type` attribute value this property would be written with.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Scalar(Scalar::Bool(_)) => "Boolean",
            PropertyValue::Scalar(Scalar::I8(_)) => "Int8",
            PropertyValue::Scalar(Scalar::I16(_)) => "Int16",
            PropertyValue::Scalar(Scalar::I32(_)) => "Int32",
            PropertyValue::Scalar(Scalar::I64(_)) => "Int64",
            PropertyValue::Scalar(Scalar::U8(_)) => "UInt8",
            PropertyValue::Scalar(Scalar::U16(_)) => "UInt16",
            PropertyValue::Scalar(Scalar::U32(_)) => "UInt32",
            PropertyValue::Scalar(Scalar::U64(_)) => "UInt64",
            PropertyValue::Scalar(Scalar::F32(_)) => "Float32",
            PropertyValue::Scalar(Scalar::F64(_)) => "Float64",
            PropertyValue::Complex(Complex::C32(..)) => "Complex32",
            PropertyValue::Complex(Complex::C64(..)) => "Complex64",
            PropertyValue::String(_) => "String",
            PropertyValue::TimePoint(_) => "TimePoint",
            PropertyValue::Vector(Vector::I32(_)) => "I32Vector",
            PropertyValue::Vector(Vector::I64(_)) => "I64Vector",
            PropertyValue::Vector(Vector::F32(_)) => "F32Vector",
            PropertyValue::Vector(Vector::F64(_)) => "F64Vector",
            PropertyValue::Matrix(Matrix { data: MatrixData::F32(_), .. }) => "F32Matrix",
            PropertyValue::Matrix(Matrix { data: MatrixData::F64(_), .. }) => "F64Matrix",
            PropertyValue::Table(_) => "Table",
        }
    }
}

/// A single named, typed metadata value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: String,
    pub value: PropertyValue,
    pub comment: Option<String>,
    pub format: Option<String>,
}

impl Property {
    pub fn new(id: impl Into<String>, value: PropertyValue) -> Result<Self> {
        let id = id.into();
        validate_property_id(&id)?;
        Ok(Property {
            id,
            value,
            comment: None,
            format: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_colon_namespaces() {
        assert!(validate_property_id("Instrument:Telescope:Aperture").is_ok());
        assert!(validate_property_id("Observation:Time:Start").is_ok());
    }

    #[test]
    fn accepts_double_colon_for_robustness() {
        assert!(validate_property_id("Instrument::Telescope").is_ok());
    }

    #[test]
    fn rejects_leading_digit_or_empty_segment() {
        assert!(validate_property_id("1Bad").is_err());
        assert!(validate_property_id("Good:").is_err());
        assert!(validate_property_id("").is_err());
    }

    #[test]
    fn property_constructor_validates_id() {
        assert!(Property::new("1bad", PropertyValue::String("x".into())).is_err());
        assert!(Property::new("Good:Id", PropertyValue::String("x".into())).is_ok());
    }
}
