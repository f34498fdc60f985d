//! Unit data model: the top-level record produced by a read and consumed by a write.

use crate::header::Header;
use crate::image::Image;
use crate::property::Property;

/// How a unit's pixel payloads are stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageModel {
    /// A single `.xisf` file: XML header plus attached blocks in one carrier.
    Monolithic,
    /// A `.xish` header file referencing one or more `.xisb` data-block files.
    Distributed {
        header_filename: String,
        data_block_filenames: Vec<String>,
    },
}

/// Reserved slot for the (unimplemented) cryptographic signature block.
/// The data model carries it; the core never verifies or produces one,
/// per the XISF 1.0 specification's purpose-and-scope section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub block_base64: String,
}

/// A complete XISF unit: one or more images plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub storage_model: StorageModel,
    pub header: Header,
    pub images: Vec<Image>,
    pub global_properties: Vec<Property>,
    pub signature: Option<Signature>,
}

impl Unit {
    pub fn new(storage_model: StorageModel, header: Header) -> Self {
        Unit {
            storage_model,
            header,
            images: Vec::new(),
            global_properties: Vec::new(),
            signature: None,
        }
    }
}
