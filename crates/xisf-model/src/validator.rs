//! Structural validator (C7): identifier regexes, mandatory-field checks,
//! cross-field consistency. No I/O.

use crate::core_element::validate_uid;
use crate::error::ValidationIssue;
use crate::property::validate_property_id;
use crate::unit::Unit;
use std::collections::HashSet;

/// Outcome of validating a [`Unit`]. `ok` is `errors.is_empty()`; `warnings`
/// never block a write.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub ok: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Run every structural check from the XISF 1.0 specification's validator
/// section over `unit`.
pub fn validate(unit: &Unit) -> ValidationResult {
    let mut result = ValidationResult::default();

    if unit.header.metadata.creator_application.trim().is_empty() {
        result.error("header.metadata.creator_application", "must be non-empty");
    }

    let mut seen_uids: HashSet<&str> = HashSet::new();
    for (uid, element) in &unit.header.core_elements {
        if let Err(e) = validate_uid(uid) {
            result.error(format!("header.core_elements[{uid}]"), e.to_string());
        }
        if !seen_uids.insert(uid.as_str()) {
            result.error(format!("header.core_elements[{uid}]"), "duplicate uid");
        }
        let _ = element;
    }

    for ref_id in unit.header.dangling_references() {
        result.error(
            "header.core_elements[*]",
            format!("Reference targets unknown uid {ref_id:?}"),
        );
    }

    for (i, image) in unit.images.iter().enumerate() {
        let path = format!("images[{i}]");

        if image.geometry.dims.is_empty() {
            result.error(format!("{path}.geometry"), "must have at least one dimension");
        }
        if image.geometry.channels == 0 {
            result.error(format!("{path}.geometry"), "must have at least one channel");
        }

        if image.sample_format.requires_bounds() && image.bounds.is_none() {
            result.error(
                format!("{path}.bounds"),
                format!("bounds is required for sample format {}", image.sample_format),
            );
        }

        if let Some(offset) = image.offset {
            if offset < 0.0 {
                result.error(format!("{path}.offset"), "must be non-negative");
            }
        }

        if !image.pixel_data.compression_is_well_formed() {
            result.error(
                format!("{path}.pixel_data.compression"),
                "shuffle codec requires item_size >= 2",
            );
        }

        for prop in &image.properties {
            if let Err(e) = validate_property_id(&prop.id) {
                result.error(format!("{path}.properties[{}]", prop.id), e.to_string());
            }
        }

        if image.image_id.is_none() && image.uuid.is_none() {
            result.warn(format!("{path}"), "has neither imageId nor uuid");
        }
    }

    for prop in &unit.global_properties {
        if let Err(e) = validate_property_id(&prop.id) {
            result.error(format!("global_properties[{}]", prop.id), e.to_string());
        }
    }

    result.ok = result.errors.is_empty();
    result
}
