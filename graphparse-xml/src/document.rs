//! Element tree built from quick-xml events.
//!
//! `XmlMode::Strict` requires well-formed XML. `XmlMode::Lenient` reads
//! HTML as found on the web: void elements, unmatched or missing end tags,
//! valueless or unquoted attributes, named entities beyond the XML five.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Result, XmlError};

/// How strictly to read markup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XmlMode {
    Strict,
    Lenient,
}

/// HTML elements that never have content or an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written (lowercased in lenient mode)
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Namespace prefix of the name, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(p, _)| p)
    }

    pub fn local_name(&self) -> &str {
        self.name.split_once(':').map_or(self.name.as_str(), |(_, l)| l)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of all descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Children serialized back to markup
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(child, &mut out);
        }
        out
    }

    /// First element in document order (self included) matching `predicate`
    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if predicate(self) {
            return Some(self);
        }
        self.elements().find_map(|e| e.find(predicate))
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&escape(t.as_str())),
        Node::Element(e) => {
            out.push('<');
            out.push_str(&e.name);
            for (k, v) in &e.attributes {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&escape(v.as_str()));
                out.push('"');
            }
            if e.children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in &e.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&e.name);
            out.push('>');
        }
    }
}

/// Parsed document: the root element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDocument {
    root: Element,
}

impl XmlDocument {
    pub fn parse(text: &str, mode: XmlMode) -> Result<Self> {
        TreeBuilder::new(mode).build(text)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

/// Entities resolved in lenient mode, the five XML ones included
fn html_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        _ => return None,
    })
}

struct TreeBuilder {
    mode: XmlMode,
    stack: Vec<Element>,
    roots: Vec<Element>,
}

impl TreeBuilder {
    fn new(mode: XmlMode) -> Self {
        Self {
            mode,
            stack: Vec::new(),
            roots: Vec::new(),
        }
    }

    fn lenient(&self) -> bool {
        self.mode == XmlMode::Lenient
    }

    fn build(mut self, text: &str) -> Result<XmlDocument> {
        let mut reader = Reader::from_str(text);
        let config = reader.config_mut();
        config.check_end_names = !self.lenient();
        config.allow_unmatched_ends = self.lenient();

        loop {
            let position = reader.buffer_position() as u64;
            let syntax = |message: String| XmlError::Syntax { position, message };

            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let element = self.start_element(&e).map_err(syntax)?;
                    if self.lenient() && VOID_ELEMENTS.contains(&element.name.as_str()) {
                        self.attach(element);
                    } else {
                        self.stack.push(element);
                    }
                }
                Ok(Event::Empty(e)) => {
                    let element = self.start_element(&e).map_err(syntax)?;
                    self.attach(element);
                }
                Ok(Event::End(e)) => {
                    let name = self.normalize(&String::from_utf8_lossy(e.name().as_ref()));
                    self.end_element(&name);
                }
                Ok(Event::Text(t)) => {
                    let content = match self.mode {
                        XmlMode::Strict => t.unescape().map_err(|e| syntax(e.to_string()))?,
                        XmlMode::Lenient => t
                            .unescape_with(html_entity)
                            .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&t).into_owned())),
                    };
                    self.text(&content).map_err(syntax)?;
                }
                Ok(Event::CData(c)) => {
                    let content = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    self.text(&content).map_err(syntax)?;
                }
                Ok(Event::Eof) => break,
                // declarations, comments, processing instructions, doctype
                Ok(_) => {}
                Err(e) if self.lenient() => {
                    debug!(error = %e, position, "stopping lenient read at malformed markup");
                    break;
                }
                Err(e) => return Err(syntax(e.to_string())),
            }
        }

        if !self.stack.is_empty() {
            if !self.lenient() {
                let open = self.stack.last().map(|e| e.name.clone()).unwrap_or_default();
                return Err(XmlError::Syntax {
                    position: text.len() as u64,
                    message: format!("unclosed element <{open}>"),
                });
            }
            while let Some(element) = self.stack.pop() {
                self.attach(element);
            }
        }

        if self.roots.len() > 1 && !self.lenient() {
            return Err(XmlError::Syntax {
                position: text.len() as u64,
                message: "more than one root element".to_string(),
            });
        }
        let root = self.roots.into_iter().next().ok_or(XmlError::NoRoot)?;
        Ok(XmlDocument { root })
    }

    /// HTML names are case-insensitive
    fn normalize(&self, name: &str) -> String {
        if self.lenient() {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    fn start_element(&self, e: &BytesStart<'_>) -> std::result::Result<Element, String> {
        let mut element = Element::new(self.normalize(&String::from_utf8_lossy(e.name().as_ref())));

        let attributes = match self.mode {
            XmlMode::Strict => e.attributes(),
            XmlMode::Lenient => e.html_attributes(),
        };
        for attr in attributes {
            let attr = match attr {
                Ok(a) => a,
                Err(err) if self.lenient() => {
                    debug!(error = %err, "skipping malformed attribute");
                    continue;
                }
                Err(err) => return Err(err.to_string()),
            };
            let key = self.normalize(&String::from_utf8_lossy(attr.key.as_ref()));
            let value = match self.mode {
                XmlMode::Strict => attr.unescape_value().map_err(|e| e.to_string())?.into_owned(),
                XmlMode::Lenient => attr
                    .unescape_value_with(html_entity)
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned()),
            };
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn end_element(&mut self, name: &str) {
        if !self.lenient() {
            // end names were checked by the reader
            if let Some(element) = self.stack.pop() {
                self.attach(element);
            }
            return;
        }
        // close everything opened after the matching start tag; ignore strays
        if let Some(index) = self.stack.iter().rposition(|e| e.name == name) {
            while self.stack.len() > index {
                if let Some(element) = self.stack.pop() {
                    self.attach(element);
                }
            }
        }
    }

    fn text(&mut self, content: &str) -> std::result::Result<(), String> {
        let lenient = self.lenient();
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(Node::Text(content.to_string()));
                Ok(())
            }
            None if content.trim().is_empty() || lenient => Ok(()),
            None => Err("text outside the root element".to_string()),
        }
    }

    fn attach(&mut self, element: Element) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(Node::Element(element)),
            None => self.roots.push(element),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strict_tree() {
        let doc = XmlDocument::parse(
            r#"<?xml version="1.0"?><a:root xmlns:a="urn:a"><child k="v &amp; w">text</child><empty/></a:root>"#,
            XmlMode::Strict,
        )
        .unwrap();

        let root = doc.root();
        assert_eq!(root.prefix(), Some("a"));
        assert_eq!(root.local_name(), "root");
        let child = root.elements().next().unwrap();
        assert_eq!(child.attr("k"), Some("v & w"));
        assert_eq!(child.text(), "text");
        assert_eq!(root.elements().count(), 2);
    }

    #[test]
    fn test_strict_rejects_mismatched_end() {
        let err = XmlDocument::parse("<a><b></a></b>", XmlMode::Strict).unwrap_err();
        assert!(matches!(err, XmlError::Syntax { .. }));
    }

    #[test]
    fn test_strict_rejects_unclosed() {
        assert!(XmlDocument::parse("<a><b></b>", XmlMode::Strict).is_err());
    }

    #[test]
    fn test_strict_rejects_unknown_entity() {
        assert!(XmlDocument::parse("<a>&nbsp;</a>", XmlMode::Strict).is_err());
    }

    #[test]
    fn test_lenient_html() {
        let html = r#"<!DOCTYPE html>
<HTML><head><meta charset=utf-8><title>T</title></head>
<body><p>one<br>two&nbsp;three<p hidden>four</div></body></html>"#;

        let doc = XmlDocument::parse(html, XmlMode::Lenient).unwrap();
        let root = doc.root();
        assert_eq!(root.name, "html");

        let body = root.find(&|e| e.name == "body").unwrap();
        assert_eq!(body.text(), "onetwo\u{a0}threefour");
        let hidden = body.find(&|e| e.attr("hidden").is_some()).unwrap();
        assert_eq!(hidden.attr("hidden"), Some(""));
    }

    #[test]
    fn test_text_outside_root() {
        let err = XmlDocument::parse("<a/>tail", XmlMode::Strict).unwrap_err();
        assert!(matches!(err, XmlError::Syntax { ref message, .. } if message.contains("outside the root")));
        assert!(XmlDocument::parse("<a/>\n  ", XmlMode::Strict).is_ok());

        let doc = XmlDocument::parse("stray <p>kept</p> tail", XmlMode::Lenient).unwrap();
        assert_eq!(doc.root().text(), "kept");
    }

    #[test]
    fn test_no_root() {
        assert!(matches!(
            XmlDocument::parse("   ", XmlMode::Lenient),
            Err(XmlError::NoRoot)
        ));
    }

    #[test]
    fn test_inner_xml() {
        let doc = XmlDocument::parse(r#"<p>a <b class="x">b&lt;</b><br/></p>"#, XmlMode::Strict).unwrap();
        assert_eq!(doc.root().inner_xml(), r#"a <b class="x">b&lt;</b><br/>"#);
    }
}
