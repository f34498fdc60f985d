//! `<Metadata>` parse/emit, and assembly of the core-element table that sits
//! alongside it at the top level of `<xisf>`, per the XISF 1.0 specification's
//! XML header codec section.

use crate::core_element_codec::{emit_core_element, is_core_element_tag, parse_core_element};
use crate::dom::Element;
use crate::property_codec::{emit_property, parse_property};
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use xisf_model::core_element::validate_uid;
use xisf_model::property::Property;
use xisf_model::{Header, Metadata, PropertyValue};

const METADATA: &str = "Metadata";

/// Well-known `<Metadata>` property identifiers that map onto named
/// `Metadata` fields rather than `extra`.
const CREATION_TIME: &str = "XISF:CreationTime";
const CREATOR_APP: &str = "XISF:CreatorApplication";
const CREATOR_MODULE: &str = "XISF:CreatorModule";
const CREATOR_OS: &str = "XISF:CreatorOS";
const AUTHORS: &str = "XISF:Authors";
const TITLE: &str = "XISF:Title";
const DESCRIPTION: &str = "XISF:Description";

fn string_value(el: &Element, id: &str) -> Option<String> {
    el.children_named("Property")
        .find(|p| p.attr("id") == Some(id))
        .map(|p| if p.text.is_empty() { p.attr("value").unwrap_or_default().to_string() } else { p.text.clone() })
}

pub fn parse_metadata(el: &Element) -> Result<Metadata> {
    let creation_time_str = string_value(el, CREATION_TIME).ok_or(Error::MissingRequiredAttribute {
        element: METADATA,
        attribute: "XISF:CreationTime",
    })?;
    let creation_time = DateTime::<FixedOffset>::parse_from_rfc3339(&creation_time_str).map_err(|_| {
        Error::UnknownEnumValue {
            element: METADATA,
            field: "XISF:CreationTime",
            value: creation_time_str.clone(),
        }
    })?;
    let creator_application = string_value(el, CREATOR_APP).ok_or(Error::MissingRequiredAttribute {
        element: METADATA,
        attribute: "XISF:CreatorApplication",
    })?;

    let mut metadata = Metadata::new(creation_time, creator_application);
    metadata.creator_module = string_value(el, CREATOR_MODULE);
    metadata.creator_os = string_value(el, CREATOR_OS);
    metadata.authors = string_value(el, AUTHORS);
    metadata.title = string_value(el, TITLE);
    metadata.description = string_value(el, DESCRIPTION);

    let well_known = [CREATION_TIME, CREATOR_APP, CREATOR_MODULE, CREATOR_OS, AUTHORS, TITLE, DESCRIPTION];
    for prop_el in el.children_named("Property") {
        if well_known.contains(&prop_el.attr("id").unwrap_or_default()) {
            continue;
        }
        metadata.extra.push(parse_property(prop_el)?);
    }

    Ok(metadata)
}

pub fn emit_metadata(metadata: &Metadata) -> Element {
    let mut el = Element::new(METADATA);
    el = el.with_child(text_property(CREATION_TIME, metadata.creation_time.to_rfc3339()));
    el = el.with_child(text_property(CREATOR_APP, metadata.creator_application.clone()));
    if let Some(v) = &metadata.creator_module {
        el = el.with_child(text_property(CREATOR_MODULE, v.clone()));
    }
    if let Some(v) = &metadata.creator_os {
        el = el.with_child(text_property(CREATOR_OS, v.clone()));
    }
    if let Some(v) = &metadata.authors {
        el = el.with_child(text_property(AUTHORS, v.clone()));
    }
    if let Some(v) = &metadata.title {
        el = el.with_child(text_property(TITLE, v.clone()));
    }
    if let Some(v) = &metadata.description {
        el = el.with_child(text_property(DESCRIPTION, v.clone()));
    }
    for prop in &metadata.extra {
        el = el.with_child(emit_property(prop));
    }
    el
}

fn text_property(id: &str, value: String) -> Element {
    emit_property(&Property {
        id: id.to_string(),
        value: PropertyValue::String(value),
        comment: None,
        format: None,
    })
}

const CORE_ELEMENT_GENERIC: &str = "core element";

/// Parse the `<Metadata>` element and every top-level core element found
/// among `root`'s children into a [`Header`].
pub fn parse_header(root: &Element) -> Result<Header> {
    let metadata_el = root.child_named(METADATA).ok_or(Error::MissingMetadata)?;
    let metadata = parse_metadata(metadata_el)?;
    let mut header = Header::new(metadata);

    for child in &root.children {
        if !is_core_element_tag(&child.name) {
            continue;
        }
        let uid = child.attr("id").ok_or(Error::MissingRequiredAttribute {
            element: CORE_ELEMENT_GENERIC,
            attribute: "id",
        })?;
        validate_uid(uid).map_err(Error::Model)?;
        let core = parse_core_element(child)?;
        header.core_elements.insert(uid.to_string(), core);
    }

    Ok(header)
}

/// Emit `<Metadata>` followed by every core element in `core_elements`,
/// sorted by uid for stable output.
pub fn emit_header_children(header: &Header) -> Vec<Element> {
    let mut out = vec![emit_metadata(&header.metadata)];
    let mut entries: Vec<_> = header.core_elements.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    out.extend(entries.into_iter().map(|(uid, core)| emit_core_element(core, Some(uid))));
    out
}
