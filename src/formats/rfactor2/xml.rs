//! Minimal element tree over quick-xml events
//!
//! rFactor results are small documents that are navigated by element name in
//! every direction, so they are read into a tree once instead of being
//! handled as a stream.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::{Result, ResultsError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content, trimmed
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Trimmed text of a child, `None` when missing or empty
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|child| child.text.as_str()).filter(|text| !text.is_empty())
    }

    pub fn child_parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.child_text(name).and_then(|text| text.parse().ok())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    pub fn attr_parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.attr(name).and_then(|value| value.trim().parse().ok())
    }

    /// Whether this element or any descendant has the given name
    pub fn contains(&self, name: &str) -> bool {
        self.children.iter().any(|child| child.name == name || child.contains(name))
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Element {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes().with_checks(false).flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(attr.value.as_ref()).into_owned();
        let value = unescape(&raw).map(|value| value.into_owned()).unwrap_or(raw);
        attributes.push((key, value.trim().to_string()));
    }
    Element { name, attributes, ..Default::default() }
}

fn close(stack: &mut Vec<Element>, root: &mut Option<Element>) {
    if let Some(mut element) = stack.pop() {
        element.text = element.text.trim().to_string();
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => {
                if root.is_none() {
                    *root = Some(element);
                }
            }
        }
    }
}

/// Parse a document into its root element.
pub fn parse_document(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ResultsError::parse("rFactor XML", e.to_string()))?
        {
            Event::Start(start) => stack.push(element_from_start(&start)),
            Event::Empty(start) => {
                stack.push(element_from_start(&start));
                close(&mut stack, &mut root);
            }
            Event::End(_) => close(&mut stack, &mut root),
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(text.as_ref()).into_owned();
                    match unescape(&raw) {
                        Ok(value) => current.text.push_str(&value),
                        Err(_) => current.text.push_str(&raw),
                    }
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(data.as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // tolerate unclosed elements at the end of a truncated file
    while !stack.is_empty() {
        close(&mut stack, &mut root);
    }

    root.ok_or_else(|| ResultsError::parse("rFactor XML", "document has no root element"))
}
