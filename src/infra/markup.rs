//! Minimal document model for note markup.
//!
//! Only image elements are understood. Everything else (text, other tags,
//! comments) is kept as opaque text and written back byte-for-byte, so
//! rewriting an image reference never disturbs the rest of the note.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<!--.*?-->|<img\b(?:[^>"']|"[^"]*"|'[^']*')*>"#)
            .expect("valid markup regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("valid attribute regex")
    })
}

/// A parsed note document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Raw(String),
    Image(ImageElement),
}

/// An `<img>` element with its attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageElement {
    source: String,
    attributes: Vec<Attribute>,
    self_closing: bool,
    dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Attribute {
    name: String,
    value: Option<String>,
}

impl Document {
    /// Splits markup into image elements and opaque text.
    pub fn parse(markup: &str) -> Self {
        let mut nodes = Vec::new();
        let mut last = 0;

        for m in token_regex().find_iter(markup) {
            if m.start() > last {
                nodes.push(Node::Raw(markup[last..m.start()].to_string()));
            }
            let token = m.as_str();
            if token.starts_with("<!--") {
                nodes.push(Node::Raw(token.to_string()));
            } else {
                nodes.push(Node::Image(ImageElement::parse(token)));
            }
            last = m.end();
        }
        if last < markup.len() {
            nodes.push(Node::Raw(markup[last..].to_string()));
        }

        Self { nodes }
    }

    /// Iterates over the image elements for rewriting.
    pub fn images_mut(&mut self) -> impl Iterator<Item = &mut ImageElement> {
        self.nodes.iter_mut().filter_map(|node| match node {
            Node::Image(img) => Some(img),
            Node::Raw(_) => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageElement> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Image(img) => Some(img),
            Node::Raw(_) => None,
        })
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match node {
                Node::Raw(text) => f.write_str(text)?,
                Node::Image(img) => write!(f, "{}", img)?,
            }
        }
        Ok(())
    }
}

impl ImageElement {
    fn parse(source: &str) -> Self {
        // Strip "<img" and ">"
        let inner = &source[4..source.len() - 1];
        let trimmed = inner.trim_end();
        let self_closing = trimmed.ends_with('/');
        let inner = trimmed.strip_suffix('/').unwrap_or(trimmed);

        let attributes = attribute_regex()
            .captures_iter(inner)
            .map(|caps| Attribute {
                name: caps[1].to_string(),
                value: caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map(|v| decode_attribute(v.as_str())),
            })
            .collect();

        Self {
            source: source.to_string(),
            attributes,
            self_closing,
            dirty: false,
        }
    }

    /// Returns the decoded value of an attribute (names are case-insensitive).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .and_then(|a| a.value.as_deref())
    }

    pub fn src(&self) -> Option<&str> {
        self.attr("src")
    }

    /// Sets an attribute, appending it if absent.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.dirty = true;
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(attr) => attr.value = Some(value.to_string()),
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value: Some(value.to_string()),
            }),
        }
    }

    pub fn set_src(&mut self, value: &str) {
        self.set_attr("src", value);
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self
            .attributes
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))?;
        self.dirty = true;
        self.attributes.remove(index).value
    }
}

impl fmt::Display for ImageElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.dirty {
            return f.write_str(&self.source);
        }
        f.write_str("<img")?;
        for attr in &self.attributes {
            match &attr.value {
                Some(value) => write!(f, " {}=\"{}\"", attr.name, encode_attribute(value))?,
                None => write!(f, " {}", attr.name)?,
            }
        }
        if self.self_closing {
            f.write_str(" /")?;
        }
        f.write_str(">")
    }
}

fn decode_attribute(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn encode_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
