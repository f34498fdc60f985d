//! Error types for the XML header codec (C6).

use thiserror::Error;

/// Errors raised while parsing or emitting the XISF XML header grammar.
#[derive(Debug, Error)]
#[must_use]
pub enum Error {
    #[error("unsupported xisf version: {0:?} (expected \"1.0\")")]
    UnsupportedVersion(String),

    #[error("malformed xml: {0}")]
    MalformedXml(String),

    #[error("missing required attribute {attribute:?} on <{element}>")]
    MissingRequiredAttribute { element: &'static str, attribute: &'static str },

    #[error("unknown value {value:?} for {field} on <{element}>")]
    UnknownEnumValue {
        element: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("<xisf> root element not found, or not in the XISF namespace")]
    MissingRoot,

    #[error("<Metadata> element not found (exactly one is required)")]
    MissingMetadata,

    #[error("<Image> element has neither a `location` attribute nor a <Data> child")]
    MissingPixelData,

    #[error(transparent)]
    Model(#[from] xisf_model::Error),

    #[error(transparent)]
    Core(#[from] xisf_core::Error),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("xml reader error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("xml attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),
}

pub type Result<T> = std::result::Result<T, Error>;
