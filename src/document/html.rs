//! Lenient HTML tokenizing for editor content
//!
//! Editor HTML is close to XHTML but not quite: void elements are written
//! without a closing slash, attributes may be unquoted, and pasted content
//! can carry stray end tags. The reader below tolerates all of that and keeps
//! the exact source span of every top-level node so callers can slice the
//! original markup back out without re-serializing it.

use crate::error::HtmlError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::ops::Range;

/// Elements that never have content or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// A node in a parsed HTML fragment
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Element(HtmlElement),
    Text(String),
}

impl HtmlNode {
    /// Get the element, if this is one
    pub fn as_element(&self) -> Option<&HtmlElement> {
        match self {
            HtmlNode::Element(el) => Some(el),
            HtmlNode::Text(_) => None,
        }
    }
}

/// An element with its attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HtmlElement {
    /// Lowercased tag name
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<HtmlNode>,
}

impl HtmlElement {
    /// Create an element without attributes or children
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Look up an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Check the `class` attribute for a class name
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &HtmlElement> {
        self.children.iter().filter_map(HtmlNode::as_element)
    }

    /// Flattened text content, with `<br>` rendered as a newline
    pub fn inline_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Text(text) => out.push_str(text),
            HtmlNode::Element(el) if el.tag == "br" => out.push('\n'),
            HtmlNode::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// A top-level node and where it came from in the source
#[derive(Debug, Clone, PartialEq)]
pub struct TopLevelNode {
    pub node: HtmlNode,
    /// Byte range of the node in the source, tags included
    pub span: Range<usize>,
}

impl TopLevelNode {
    /// The node's exact source markup
    pub fn source<'a>(&self, html: &'a str) -> &'a str {
        &html[self.span.clone()]
    }
}

/// Parse an HTML fragment into its top-level nodes.
///
/// Whitespace-only text between top-level elements is dropped; any other
/// top-level text is kept as its own node. Unclosed elements run to the end
/// of the input and end tags with no open match are ignored.
pub fn parse_fragment(html: &str) -> Result<Vec<TopLevelNode>, HtmlError> {
    let mut reader = Reader::from_str(html);
    {
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.trim_text(false);
    }

    let mut roots: Vec<TopLevelNode> = Vec::new();
    let mut stack: Vec<(HtmlElement, usize)> = Vec::new();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|source| HtmlError::Malformed {
                position: start,
                source,
            })?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let element = start_element(&e);
                if is_void(&element.tag) {
                    attach(&mut stack, &mut roots, HtmlNode::Element(element), start..end);
                } else {
                    stack.push((element, start));
                }
            }
            Event::Empty(e) => {
                let element = start_element(&e);
                attach(&mut stack, &mut roots, HtmlNode::Element(element), start..end);
            }
            Event::End(e) => {
                let tag = lowercase_name(e.name().as_ref());
                if let Some(idx) = stack.iter().rposition(|(el, _)| el.tag == tag) {
                    while stack.len() > idx {
                        if let Some((element, element_start)) = stack.pop() {
                            attach(
                                &mut stack,
                                &mut roots,
                                HtmlNode::Element(element),
                                element_start..end,
                            );
                        }
                    }
                }
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                attach(&mut stack, &mut roots, HtmlNode::Text(text), start..end);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                attach(&mut stack, &mut roots, HtmlNode::Text(text), start..end);
            }
            Event::Eof => break,
            // Comments, doctypes and processing instructions carry no content
            _ => {}
        }
    }

    while let Some((element, element_start)) = stack.pop() {
        attach(
            &mut stack,
            &mut roots,
            HtmlNode::Element(element),
            element_start..html.len(),
        );
    }

    Ok(roots)
}

/// Parse a single element from markup, if the markup holds one
pub fn parse_element(html: &str) -> Result<Option<HtmlElement>, HtmlError> {
    Ok(parse_fragment(html)?
        .into_iter()
        .find_map(|top| match top.node {
            HtmlNode::Element(el) => Some(el),
            HtmlNode::Text(_) => None,
        }))
}

fn attach(
    stack: &mut [(HtmlElement, usize)],
    roots: &mut Vec<TopLevelNode>,
    node: HtmlNode,
    span: Range<usize>,
) {
    if let Some((parent, _)) = stack.last_mut() {
        parent.children.push(node);
        return;
    }

    if let HtmlNode::Text(text) = &node {
        if text.trim().is_empty() {
            return;
        }
    }

    roots.push(TopLevelNode { node, span });
}

fn start_element(e: &BytesStart<'_>) -> HtmlElement {
    let attrs = e
        .html_attributes()
        .flatten()
        .map(|attr| {
            let key = lowercase_name(attr.key.as_ref());
            let value = attr
                .unescape_value()
                .map(Cow::into_owned)
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (key, value)
        })
        .collect();

    HtmlElement {
        tag: lowercase_name(e.name().as_ref()),
        attrs,
        children: Vec::new(),
    }
}

fn lowercase_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_lowercase()
}

/// Escape text for use inside element content or attribute values
pub fn escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}
