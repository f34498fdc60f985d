//! Header data model: creation metadata plus the core-element table.

use crate::core_element::CoreElement;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

/// Mandatory and optional free-text creation metadata for a `<Metadata>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub creation_time: DateTime<FixedOffset>,
    pub creator_application: String,
    pub creator_module: Option<String>,
    pub creator_os: Option<String>,
    pub authors: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Any further free-text `<Property>` children of `<Metadata>` not named above.
    pub extra: Vec<crate::property::Property>,
}

impl Metadata {
    pub fn new(creation_time: DateTime<FixedOffset>, creator_application: impl Into<String>) -> Self {
        Metadata {
            creation_time,
            creator_application: creator_application.into(),
            creator_module: None,
            creator_os: None,
            authors: None,
            title: None,
            description: None,
            extra: Vec::new(),
        }
    }
}

/// `(metadata, core elements keyed by uid, leading XML comment)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub metadata: Metadata,
    pub core_elements: HashMap<String, CoreElement>,
    pub initial_comment: Option<String>,
}

impl Header {
    pub fn new(metadata: Metadata) -> Self {
        Header {
            metadata,
            core_elements: HashMap::new(),
            initial_comment: None,
        }
    }

    /// Every `uid` that a `Reference` core element names but that is absent
    /// from `core_elements` (a header invariant violation per the XISF 1.0
    /// specification's data model section).
    pub fn dangling_references(&self) -> Vec<String> {
        self.core_elements
            .values()
            .filter_map(|el| match el {
                CoreElement::Reference { ref_id } if !self.core_elements.contains_key(ref_id) => {
                    Some(ref_id.clone())
                }
                _ => None,
            })
            .collect()
    }
}
