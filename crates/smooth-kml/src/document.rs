//! Minimal owned XML tree
//!
//! The document is read with `quick-xml` into a tree of elements and pass-through events,
//! edited in place, and written back. Anything that is not an element (declaration, text,
//! comments, CDATA, processing instructions) is kept as the original event, so untouched
//! parts of the file round-trip unchanged.

use crate::{DocumentError, Result};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

/// A node of the document tree
#[derive(Clone, Debug)]
pub enum Node {
    Element(Element),
    /// Any non-element event, stored as read
    Other(Event<'static>),
}

/// An element with its start tag and children
#[derive(Clone, Debug)]
pub struct Element {
    start: BytesStart<'static>,
    children: Vec<Node>,
    /// Written as `<tag/>` when it has no children
    self_closing: bool,
}

/// A parsed XML document
#[derive(Clone, Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Element {
    /// Create an empty element with a (possibly prefixed) tag name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            start: BytesStart::new(name.into()),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Whether the local name (without namespace prefix) equals `local_name`
    #[inline]
    pub fn is(&self, local_name: &str) -> bool {
        self.start.local_name().as_ref() == local_name.as_bytes()
    }

    /// Namespace prefix of the tag, if any
    pub fn prefix(&self) -> Option<String> {
        self.start
            .name()
            .prefix()
            .map(|prefix| String::from_utf8_lossy(prefix.as_ref()).into_owned())
    }

    /// Unescaped value of an attribute
    pub fn attribute(&self, key: &str) -> Result<Option<String>> {
        match self.start.try_get_attribute(key)? {
            Some(attribute) => Ok(Some(attribute.unescape_value()?.into_owned())),
            None => Ok(None),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Direct child elements
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Other(_) => None,
        })
    }

    /// Concatenated, unescaped text of the direct children
    pub fn text(&self) -> Result<String> {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Other(Event::Text(t)) => text.push_str(&t.unescape()?),
                Node::Other(Event::CData(c)) => text.push_str(&String::from_utf8_lossy(c)),
                _ => {}
            }
        }
        Ok(text)
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Other(Event::Text(BytesText::new(text).into_owned()))];
        self.self_closing = false;
    }

    /// Insert a child element before all existing children
    pub fn prepend_child(&mut self, child: Element) {
        self.children.insert(0, Node::Element(child));
        self.self_closing = false;
    }

    /// All descendant elements (depth first) with the given local name
    pub fn descendants<'a>(&'a self, local_name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect(&self.children, local_name, &mut found);
        found
    }

    /// Remove descendants for which `should_remove` returns true, returns the count
    ///
    /// Removed elements are not searched further.
    pub fn remove_descendants<F>(&mut self, should_remove: &mut F) -> Result<usize>
    where
        F: FnMut(&Element) -> Result<bool>,
    {
        remove_where(&mut self.children, should_remove)
    }
}

impl Document {
    /// Read a document from any buffered reader
    pub fn parse<R: BufRead>(source: R) -> Result<Self> {
        let mut reader = Reader::from_reader(source);
        let mut buf = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let node = match reader.read_event_into(&mut buf)? {
                Event::Start(start) => {
                    open.push(Element {
                        start: start.into_owned(),
                        children: Vec::new(),
                        self_closing: false,
                    });
                    None
                }
                Event::End(_) => {
                    let element = open.pop().ok_or(DocumentError::UnbalancedDocument)?;
                    Some(Node::Element(element))
                }
                Event::Empty(start) => Some(Node::Element(Element {
                    start: start.into_owned(),
                    children: Vec::new(),
                    self_closing: true,
                })),
                Event::Eof => break,
                other => Some(Node::Other(other.into_owned())),
            };

            if let Some(node) = node {
                match open.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => nodes.push(node),
                }
            }
            buf.clear();
        }

        if !open.is_empty() {
            return Err(DocumentError::UnbalancedDocument);
        }

        Ok(Self { nodes })
    }

    /// Parse from an in-memory string
    pub fn from_xml(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Write the document to `sink`
    pub fn write<W: Write>(&self, sink: W) -> Result<()> {
        let mut writer = Writer::new(sink);
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        Ok(())
    }

    /// Serialize into a string
    pub fn to_xml(&self) -> Result<String> {
        let mut bytes = Vec::new();
        self.write(&mut bytes)?;
        String::from_utf8(bytes).map_err(|e| DocumentError::Encoding(e.utf8_error()))
    }

    /// All elements with the given local name, outermost matches only
    pub fn elements<'a>(&'a self, local_name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect(&self.nodes, local_name, &mut found);
        found
    }

    /// Mutable access to all elements with the given local name, outermost matches only
    pub fn elements_mut<'a>(&'a mut self, local_name: &str) -> Vec<&'a mut Element> {
        let mut found = Vec::new();
        collect_mut(&mut self.nodes, local_name, &mut found);
        found
    }

    /// Remove every element for which `should_remove` returns true, returns the count
    pub fn remove_elements<F>(&mut self, mut should_remove: F) -> Result<usize>
    where
        F: FnMut(&Element) -> Result<bool>,
    {
        remove_where(&mut self.nodes, &mut should_remove)
    }
}

fn collect<'a>(nodes: &'a [Node], local_name: &str, found: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.is(local_name) {
                found.push(element);
            } else {
                collect(&element.children, local_name, found);
            }
        }
    }
}

fn collect_mut<'a>(nodes: &'a mut [Node], local_name: &str, found: &mut Vec<&'a mut Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.is(local_name) {
                found.push(element);
            } else {
                collect_mut(&mut element.children, local_name, found);
            }
        }
    }
}

fn remove_where<F>(nodes: &mut Vec<Node>, should_remove: &mut F) -> Result<usize>
where
    F: FnMut(&Element) -> Result<bool>,
{
    let mut removed = 0;
    let mut i = 0;
    while i < nodes.len() {
        if let Node::Element(element) = &mut nodes[i] {
            if should_remove(&*element)? {
                nodes.remove(i);
                removed += 1;
                continue;
            }
            removed += remove_where(&mut element.children, should_remove)?;
        }
        i += 1;
    }
    Ok(removed)
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<()> {
    match node {
        Node::Element(element) if element.self_closing && element.children.is_empty() => {
            writer.write_event(Event::Empty(element.start.borrow()))?;
        }
        Node::Element(element) => {
            writer.write_event(Event::Start(element.start.borrow()))?;
            for child in &element.children {
                write_node(writer, child)?;
            }
            writer.write_event(Event::End(element.start.to_end()))?;
        }
        Node::Other(event) => writer.write_event(event.borrow())?,
    }
    Ok(())
}
