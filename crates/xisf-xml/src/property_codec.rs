//! `<Property>` element parse/emit, per the XISF 1.0 specification's XML
//! header codec section.

use crate::dom::Element;
use crate::floats::format_significant;
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use xisf_model::property::{Complex, Matrix, MatrixData, Property, PropertyValue, Scalar, Table, Vector};

const ELEM: &str = "Property";

pub fn parse_property(el: &Element) -> Result<Property> {
    let id = el.attr("id").ok_or(Error::MissingRequiredAttribute {
        element: ELEM,
        attribute: "id",
    })?;
    let type_name = el.attr("type").ok_or(Error::MissingRequiredAttribute {
        element: ELEM,
        attribute: "type",
    })?;

    let value = parse_value(el, type_name)?;
    let mut prop = Property::new(id, value)?;
    prop.comment = el.attr("comment").map(str::to_string);
    prop.format = el.attr("format").map(str::to_string);
    Ok(prop)
}

fn value_attr<'a>(el: &'a Element, _type_name: &str) -> Result<&'a str> {
    el.attr("value").ok_or(Error::MissingRequiredAttribute {
        element: ELEM,
        attribute: "value",
    })
}

fn parse_value(el: &Element, type_name: &str) -> Result<PropertyValue> {
    let bad = |value: &str| Error::UnknownEnumValue {
        element: ELEM,
        field: "type",
        value: value.to_string(),
    };

    Ok(match type_name {
        "Boolean" => {
            let v = value_attr(el, type_name)?;
            PropertyValue::Scalar(Scalar::Bool(match v {
                "true" => true,
                "false" => false,
                _ => return Err(bad(v)),
            }))
        }
        "Int8" => PropertyValue::Scalar(Scalar::I8(parse_num(value_attr(el, type_name)?)?)),
        "Int16" => PropertyValue::Scalar(Scalar::I16(parse_num(value_attr(el, type_name)?)?)),
        "Int32" => PropertyValue::Scalar(Scalar::I32(parse_num(value_attr(el, type_name)?)?)),
        "Int64" => PropertyValue::Scalar(Scalar::I64(parse_num(value_attr(el, type_name)?)?)),
        "UInt8" => PropertyValue::Scalar(Scalar::U8(parse_num(value_attr(el, type_name)?)?)),
        "UInt16" => PropertyValue::Scalar(Scalar::U16(parse_num(value_attr(el, type_name)?)?)),
        "UInt32" => PropertyValue::Scalar(Scalar::U32(parse_num(value_attr(el, type_name)?)?)),
        "UInt64" => PropertyValue::Scalar(Scalar::U64(parse_num(value_attr(el, type_name)?)?)),
        "Float32" => PropertyValue::Scalar(Scalar::F32(parse_num(value_attr(el, type_name)?)?)),
        "Float64" => PropertyValue::Scalar(Scalar::F64(parse_num(value_attr(el, type_name)?)?)),
        "Complex32" => {
            let (re, im) = parse_pair(value_attr(el, type_name)?)?;
            PropertyValue::Complex(Complex::C32(re as f32, im as f32))
        }
        "Complex64" => {
            let (re, im) = parse_pair(value_attr(el, type_name)?)?;
            PropertyValue::Complex(Complex::C64(re, im))
        }
        "String" => PropertyValue::String(if el.text.is_empty() {
            el.attr("value").unwrap_or_default().to_string()
        } else {
            el.text.clone()
        }),
        "TimePoint" => {
            let v = value_attr(el, type_name)?;
            let dt = DateTime::<FixedOffset>::parse_from_rfc3339(v)
                .or_else(|_| DateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f%:z"))
                .map_err(|_| bad(v))?;
            PropertyValue::TimePoint(dt)
        }
        "I32Vector" => PropertyValue::Vector(Vector::I32(parse_list(value_attr(el, type_name)?)?)),
        "I64Vector" => PropertyValue::Vector(Vector::I64(parse_list(value_attr(el, type_name)?)?)),
        "F32Vector" => PropertyValue::Vector(Vector::F32(parse_list(value_attr(el, type_name)?)?)),
        "F64Vector" => PropertyValue::Vector(Vector::F64(parse_list(value_attr(el, type_name)?)?)),
        "F32Matrix" | "F64Matrix" => parse_matrix(el, type_name)?,
        "Table" => parse_table(el),
        _ => return Err(bad(type_name)),
    })
}

fn parse_num<T: std::str::FromStr>(s: &str) -> Result<T> {
    s.parse().map_err(|_| Error::UnknownEnumValue {
        element: ELEM,
        field: "value",
        value: s.to_string(),
    })
}

fn parse_pair(s: &str) -> Result<(f64, f64)> {
    let (a, b) = s.split_once(':').ok_or_else(|| Error::UnknownEnumValue {
        element: ELEM,
        field: "value",
        value: s.to_string(),
    })?;
    Ok((parse_num(a)?, parse_num(b)?))
}

fn parse_list<T: std::str::FromStr>(s: &str) -> Result<Vec<T>> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(',').map(|v| parse_num(v.trim())).collect()
}

fn parse_matrix(el: &Element, type_name: &str) -> Result<PropertyValue> {
    let rows: usize = parse_num(el.attr("rows").ok_or(Error::MissingRequiredAttribute {
        element: ELEM,
        attribute: "rows",
    })?)?;
    let cols: usize = parse_num(el.attr("cols").ok_or(Error::MissingRequiredAttribute {
        element: ELEM,
        attribute: "cols",
    })?)?;
    let value = value_attr(el, type_name)?;
    let data = if type_name == "F32Matrix" {
        MatrixData::F32(parse_list(value)?)
    } else {
        MatrixData::F64(parse_list(value)?)
    };
    Ok(PropertyValue::Matrix(Matrix { rows, cols, data }))
}

fn parse_table(el: &Element) -> PropertyValue {
    let columns: Vec<String> = el
        .attr("columns")
        .map(|c| c.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    let rows = el
        .children_named("TableRow")
        .map(|row| row.text.split(',').map(str::to_string).collect())
        .collect();
    PropertyValue::Table(Table { columns, rows })
}

pub fn emit_property(prop: &Property) -> Element {
    let mut el = Element::new(ELEM).with_attr("id", &prop.id).with_attr("type", prop.value.type_name());
    if let Some(comment) = &prop.comment {
        el = el.with_attr("comment", comment);
    }
    if let Some(format) = &prop.format {
        el = el.with_attr("format", format);
    }

    match &prop.value {
        PropertyValue::Scalar(Scalar::Bool(v)) => el = el.with_attr("value", v.to_string()),
        PropertyValue::Scalar(Scalar::I8(v)) => el = el.with_attr("value", v.to_string()),
        PropertyValue::Scalar(Scalar::I16(v)) => el = el.with_attr("value", v.to_string()),
        PropertyValue::Scalar(Scalar::I32(v)) => el = el.with_attr("value", v.to_string()),
        PropertyValue::Scalar(Scalar::I64(v)) => el = el.with_attr("value", v.to_string()),
        PropertyValue::Scalar(Scalar::U8(v)) => el = el.with_attr("value", v.to_string()),
        PropertyValue::Scalar(Scalar::U16(v)) => el = el.with_attr("value", v.to_string()),
        PropertyValue::Scalar(Scalar::U32(v)) => el = el.with_attr("value", v.to_string()),
        PropertyValue::Scalar(Scalar::U64(v)) => el = el.with_attr("value", v.to_string()),
        PropertyValue::Scalar(Scalar::F32(v)) => el = el.with_attr("value", format_significant(*v as f64, 9)),
        PropertyValue::Scalar(Scalar::F64(v)) => el = el.with_attr("value", format_significant(*v, 17)),
        PropertyValue::Complex(Complex::C32(re, im)) => {
            el = el.with_attr(
                "value",
                format!("{}:{}", format_significant(*re as f64, 9), format_significant(*im as f64, 9)),
            )
        }
        PropertyValue::Complex(Complex::C64(re, im)) => {
            el = el.with_attr(
                "value",
                format!("{}:{}", format_significant(*re, 17), format_significant(*im, 17)),
            )
        }
        PropertyValue::String(s) => el = el.with_text(s.clone()),
        PropertyValue::TimePoint(dt) => {
            el = el.with_attr("value", dt.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string())
        }
        PropertyValue::Vector(Vector::I32(v)) => el = el.with_attr("value", join_list(v)),
        PropertyValue::Vector(Vector::I64(v)) => el = el.with_attr("value", join_list(v)),
        PropertyValue::Vector(Vector::F32(v)) => {
            el = el.with_attr("value", join_floats(v.iter().map(|f| *f as f64), 9))
        }
        PropertyValue::Vector(Vector::F64(v)) => el = el.with_attr("value", join_floats(v.iter().copied(), 17)),
        PropertyValue::Matrix(m) => {
            el = el.with_attr("rows", m.rows.to_string()).with_attr("cols", m.cols.to_string());
            el = match &m.data {
                MatrixData::F32(v) => el.with_attr("value", join_floats(v.iter().map(|f| *f as f64), 9)),
                MatrixData::F64(v) => el.with_attr("value", join_floats(v.iter().copied(), 17)),
            };
        }
        PropertyValue::Table(t) => {
            el = el.with_attr("columns", t.columns.join(","));
            for row in &t.rows {
                el = el.with_child(Element::new("TableRow").with_text(row.join(",")));
            }
        }
    }
    el
}

fn join_list<T: std::fmt::Display>(v: &[T]) -> String {
    v.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")
}

fn join_floats(v: impl Iterator<Item = f64>, sig_digits: usize) -> String {
    v.map(|x| format_significant(x, sig_digits)).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trip() {
        let prop = Property::new("Instrument:Exposure", PropertyValue::Scalar(Scalar::F64(12.5))).unwrap();
        let el = emit_property(&prop);
        let parsed = parse_property(&el).unwrap();
        assert_eq!(parsed, prop);
    }

    #[test]
    fn string_uses_element_text() {
        let prop = Property::new("Title", PropertyValue::String("M31".into())).unwrap();
        let el = emit_property(&prop);
        assert_eq!(el.text, "M31");
        assert_eq!(parse_property(&el).unwrap(), prop);
    }

    #[test]
    fn boolean_round_trip() {
        let prop = Property::new("Flag", PropertyValue::Scalar(Scalar::Bool(true))).unwrap();
        let el = emit_property(&prop);
        assert_eq!(el.attr("value"), Some("true"));
        assert_eq!(parse_property(&el).unwrap(), prop);
    }

    #[test]
    fn vector_round_trip() {
        let prop = Property::new("Coeffs", PropertyValue::Vector(Vector::F64(vec![1.0, 2.5, -3.0]))).unwrap();
        let el = emit_property(&prop);
        let parsed = parse_property(&el).unwrap();
        assert_eq!(parsed, prop);
    }
}
