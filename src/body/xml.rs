//! A minimal XML element tree for merging bodies over bound values.
//!
//! The destination's current value is rendered as a tree from its JSON form
//! (following quick-xml's serde conventions: `@name` keys are attributes,
//! `$text` and `$value` keys are text content, arrays are repeated
//! elements). The request document is parsed into the same tree, merged
//! over it, and the result is handed to quick-xml's deserializer.

use std::io::BufRead;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{DeError, Reader, Writer};
use serde_json::Value;

const ROOT: &str = "root";

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn open(start: &BytesStart<'_>) -> Result<Self, DeError> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        for attribute in start.attributes() {
            let attribute = attribute?;
            element.attributes.push((
                String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
                attribute.unescape_value()?.into_owned(),
            ));
        }
        Ok(element)
    }

    /// Parses a document into its root element.
    pub(super) fn parse(input: impl BufRead) -> Result<Self, DeError> {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => open.push(Self::open(&start)?),
                Event::Empty(start) => {
                    let element = Self::open(&start)?;
                    attach(&mut open, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = open.pop() {
                        attach(&mut open, &mut root, element);
                    }
                }
                Event::Text(text) => {
                    if let Some(parent) = open.last_mut() {
                        parent.children.push(Node::Text(text.unescape()?.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = open.last_mut() {
                        let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                        parent.children.push(Node::Text(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        root.ok_or_else(|| DeError::Custom("document has no root element".to_string()))
    }

    /// Renders a JSON object as a tree; `None` for anything else.
    pub(super) fn from_json(value: &Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        let mut root = Self::new(ROOT);
        for (key, value) in fields {
            root.push_field(key, value);
        }
        Some(root)
    }

    fn push_field(&mut self, key: &str, value: &Value) {
        if let Some(name) = key.strip_prefix('@') {
            if let Some(text) = scalar_text(value) {
                self.attributes.push((name.to_string(), text));
            }
            return;
        }
        if key == "$text" || key == "$value" {
            if let Some(text) = scalar_text(value) {
                self.children.push(Node::Text(text));
            }
            return;
        }

        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    self.push_field(key, item);
                }
            }
            Value::Object(fields) => {
                let mut child = Self::new(key);
                for (key, value) in fields {
                    child.push_field(key, value);
                }
                self.children.push(Node::Element(child));
            }
            scalar => {
                let mut child = Self::new(key);
                if let Some(text) = scalar_text(scalar).filter(|text| !text.is_empty()) {
                    child.children.push(Node::Text(text));
                }
                self.children.push(Node::Element(child));
            }
        }
    }

    fn has_element_children(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, Node::Element(_)))
    }

    /// Merges `incoming` over this element.
    ///
    /// Attributes are overridden one by one. When both sides have child
    /// elements, children are matched by name: a single element on each
    /// side merges recursively, any other group is replaced as a whole and
    /// groups the document omits are kept. An empty incoming element keeps
    /// existing child elements; otherwise the incoming content replaces.
    pub(super) fn merge(&mut self, mut incoming: Element) {
        for (name, value) in std::mem::take(&mut incoming.attributes) {
            match self.attributes.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, existing)) => *existing = value,
                None => self.attributes.push((name, value)),
            }
        }

        if incoming.children.is_empty() && self.has_element_children() {
            return;
        }
        if !(self.has_element_children() && incoming.has_element_children()) {
            self.children = incoming.children;
            return;
        }

        let mut groups: Vec<(String, Vec<Element>)> = Vec::new();
        for child in incoming.children {
            let Node::Element(element) = child else {
                continue;
            };
            match groups.iter_mut().find(|(name, _)| *name == element.name) {
                Some((_, group)) => group.push(element),
                None => groups.push((element.name.clone(), vec![element])),
            }
        }

        for (name, mut group) in groups {
            let positions: Vec<usize> = self
                .children
                .iter()
                .enumerate()
                .filter(|(_, child)| matches!(child, Node::Element(e) if e.name == name))
                .map(|(position, _)| position)
                .collect();

            if let ([position], 1) = (positions.as_slice(), group.len()) {
                if let (Node::Element(existing), Some(element)) =
                    (&mut self.children[*position], group.pop())
                {
                    existing.merge(element);
                }
                continue;
            }

            let at = positions.first().copied().unwrap_or(self.children.len());
            for position in positions.iter().rev() {
                self.children.remove(*position);
            }
            for (offset, element) in group.into_iter().enumerate() {
                self.children.insert(at + offset, Node::Element(element));
            }
        }
    }

    /// Serializes the tree back into a document.
    pub(super) fn to_document(&self) -> Result<String, DeError> {
        let mut writer = Writer::new(Vec::new());
        self.write(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), DeError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(writer)?,
                Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

fn attach(open: &mut [Element], root: &mut Option<Element>, element: Element) {
    match open.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
