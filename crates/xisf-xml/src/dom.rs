//! A minimal, namespace-light XML tree used as an intermediate form between
//! `quick_xml`'s event stream and the XISF data model.
//!
//! The XML header grammar looks elements up by local name after validating
//! the root namespace once, so the tree drops namespace prefixes rather
//! than tracking them per element.

use crate::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// One XML element: its local name, attributes in document order, text
/// content (concatenated, for leaf-ish elements like `<Property>` string
/// values), and child elements in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attrs: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child_named(&self, name: &str) -> Option<&Element> {
        self.children_named(name).next()
    }
}

/// Local name of a possibly namespace-prefixed element/attribute name.
fn local_name(full: &str) -> &str {
    full.rsplit(':').next().unwrap_or(full)
}

/// Parse a full XML document, returning the root element and any XML comment
/// that appears before it (preserved verbatim as `initial_comment`).
pub fn parse_document(xml: &str) -> Result<(Element, Option<String>)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut initial_comment = None;
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(Error::Xml)? {
            Event::Start(ref e) => {
                let elem = start_element(e)?;
                stack.push(elem);
            }
            Event::Empty(ref e) => {
                let elem = start_element(e)?;
                close_current(&mut stack, &mut root, elem);
            }
            Event::End(ref e) => {
                let _ = e;
                let finished = stack.pop().ok_or_else(|| {
                    Error::MalformedXml("unbalanced closing tag".to_string())
                })?;
                close_current(&mut stack, &mut root, finished);
            }
            Event::Text(ref t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&decode_text(t)?);
                }
            }
            Event::CData(ref t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::Comment(ref c) if root.is_none() && stack.is_empty() => {
                let text = reader.decoder().decode(c.as_ref()).map_err(Error::Xml)?.trim().to_string();
                initial_comment = Some(text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let root = root.ok_or(Error::MissingRoot)?;
    Ok((root, initial_comment))
}

fn start_element(e: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut elem = Element::new(local_name(&name).to_string());
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(Error::Xml)?.into_owned();
        elem.attrs.push((local_name(&key).to_string(), value));
    }
    Ok(elem)
}

fn close_current(stack: &mut Vec<Element>, root: &mut Option<Element>, finished: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(finished),
        None => *root = Some(finished),
    }
}

fn decode_text(t: &BytesText) -> Result<String> {
    Ok(t.unescape().map_err(Error::Xml)?.into_owned())
}

/// Serialize `root` to a full XML document: declaration, optional leading
/// comment, then the element tree. `pretty` selects two-space indentation.
pub fn write_document(root: &Element, initial_comment: Option<&str>, pretty: bool) -> Result<String> {
    let mut buf = Vec::new();
    {
        let mut writer = if pretty {
            Writer::new_with_indent(Cursor::new(&mut buf), b' ', 2)
        } else {
            Writer::new(Cursor::new(&mut buf))
        };
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(Error::Xml)?;
        if let Some(comment) = initial_comment {
            writer
                .write_event(Event::Comment(quick_xml::events::BytesText::new(comment)))
                .map_err(Error::Xml)?;
        }
        write_element(&mut writer, root)?;
    }
    let mut out = String::from_utf8(buf).map_err(|e| Error::MalformedXml(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, elem: &Element) -> Result<()> {
    let mut start = BytesStart::new(elem.name.as_str());
    for (k, v) in &elem.attrs {
        start.push_attribute((k.as_str(), v.as_str()));
    }

    if elem.children.is_empty() && elem.text.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(Error::Xml)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(Error::Xml)?;
    if !elem.text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&elem.text)))
            .map_err(Error::Xml)?;
    }
    for child in &elem.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(elem.name.as_str())))
        .map_err(Error::Xml)?;
    Ok(())
}
