//! In-memory data model for XISF units, plus the structural validator (C7).
//!
//! This crate owns the types the XML codec (`xisf-xml`) parses into and
//! emits from, and the types the storage engines (`xisf-io`) pass around.
//! It performs no I/O and knows nothing of XML or file framing.
//!
//! # Example
//!
//! ```
//! use xisf_model::{validate, Header, Metadata, StorageModel, Unit};
//! use chrono::{FixedOffset, TimeZone};
//!
//! let ts = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
//! let metadata = Metadata::new(ts, "xisf-rs");
//! let unit = Unit::new(StorageModel::Monolithic, Header::new(metadata));
//! assert!(validate(&unit).ok);
//! ```

pub mod core_element;
pub mod data_block;
mod error;
pub mod header;
pub mod image;
pub mod property;
pub mod unit;
pub mod validator;

pub use core_element::CoreElement;
pub use data_block::{BlockLocation, DataBlock, Encoding};
pub use error::{Error, Result, ValidationIssue};
pub use header::{Header, Metadata};
pub use image::{Bounds, ColorSpace, Geometry, Image, Orientation, PixelStorage, SampleFormat};
pub use property::{Property, PropertyValue};
pub use unit::{Signature, StorageModel, Unit};
pub use validator::{validate, ValidationResult};
