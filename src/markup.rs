//! Markup codec for the document's serialized display form
//!
//! Rendering produces the HTML an editing surface would hold:
//!
//! ```text
//! Welcome to&nbsp;<span class="ansi-33">Rebane</span><br>
//! ```
//!
//! Parsing is lenient. It accepts whatever a user may type or paste and
//! never fails: unknown tags become [`Node::Element`], attributes other
//! than a span's `ansi-N` class are dropped, comments are skipped,
//! stray end tags are ignored and unclosed elements close at the end.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::node::Node;

/// Elements that never have children
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Compiled patterns for the tokenizer
struct MarkupRules {
    /// A comment, or a start/end tag with its raw attribute text
    tag: Regex,
    /// A class attribute value
    class: Regex,
    /// The style code inside a class list
    ansi_class: Regex,
    /// A character reference
    entity: Regex,
}

impl MarkupRules {
    fn new() -> Option<Self> {
        Some(Self {
            tag: Regex::new(
                r#"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
            )
            .ok()?,
            class: Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#).ok()?,
            ansi_class: Regex::new(r"\bansi-(\d+)\b").ok()?,
            entity: Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]+);").ok()?,
        })
    }

    /// Style tag named by a span's attributes, empty if none
    fn span_tag(&self, attrs: &str) -> String {
        self.class
            .captures(attrs)
            .and_then(|caps| caps.get(1).or(caps.get(2)).or(caps.get(3)))
            .and_then(|value| self.ansi_class.captures(value.as_str()))
            .and_then(|caps| caps.get(1))
            .map_or_else(String::new, |code| code.as_str().to_string())
    }

    fn decode(&self, text: &str) -> String {
        self.entity
            .replace_all(text, |caps: &Captures| {
                decode_entity(&caps[1]).map_or_else(|| caps[0].to_string(), String::from)
            })
            .into_owned()
    }
}

fn rules() -> Option<&'static MarkupRules> {
    static RULES: OnceLock<Option<MarkupRules>> = OnceLock::new();
    RULES.get_or_init(MarkupRules::new).as_ref()
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

/// An element still waiting for its end tag
struct Frame {
    name: String,
    /// Style tag when the element is a span
    tag: Option<String>,
    children: Vec<Node>,
}

impl Frame {
    fn into_node(self) -> Node {
        match self.tag {
            Some(tag) => Node::span(tag, self.children),
            None => Node::element(self.name, self.children),
        }
    }
}

/// Assembles nodes from the token stream
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Frame>,
}

impl TreeBuilder {
    fn children(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }

    fn text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let children = self.children();
        match children.last_mut() {
            Some(Node::Text(prev)) => prev.push_str(&text),
            _ => children.push(Node::Text(text)),
        }
    }

    fn open(&mut self, name: String, attrs: &str, rules: &MarkupRules) {
        if name == "br" {
            self.children().push(Node::Break);
            return;
        }

        let tag = (name == "span").then(|| rules.span_tag(attrs));
        let frame = Frame {
            name,
            tag,
            children: Vec::new(),
        };

        let self_closing = attrs.trim_end().ends_with('/');
        if self_closing || VOID_ELEMENTS.contains(&frame.name.as_str()) {
            let node = frame.into_node();
            self.children().push(node);
        } else {
            self.open.push(frame);
        }
    }

    fn close(&mut self, name: &str) {
        let Some(idx) = self.open.iter().rposition(|frame| frame.name == name) else {
            return;
        };
        while self.open.len() > idx {
            self.close_last();
        }
    }

    fn close_last(&mut self) {
        if let Some(frame) = self.open.pop() {
            let node = frame.into_node();
            self.children().push(node);
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_last();
        }
        self.root
    }
}

/// Parse markup into nodes
pub fn parse(source: &str) -> Vec<Node> {
    let Some(rules) = rules() else {
        return if source.is_empty() {
            Vec::new()
        } else {
            vec![Node::text(source)]
        };
    };

    let mut builder = TreeBuilder::default();
    let mut last = 0;

    for caps in rules.tag.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        builder.text(rules.decode(&source[last..whole.start()]));
        last = whole.end();

        // Comments match without a name
        let Some(name) = caps.get(2) else {
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|slash| !slash.as_str().is_empty());
        if closing {
            builder.close(&name);
        } else {
            let attrs = caps.get(3).map_or("", |attrs| attrs.as_str());
            builder.open(name, attrs, rules);
        }
    }
    builder.text(rules.decode(&source[last..]));

    builder.finish()
}

/// Render nodes to markup
pub fn render(nodes: &[Node]) -> String {
    let mut out = String::new();
    render_into(nodes, &mut out);
    out
}

fn render_into(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => escape_text(text, out),
            Node::Break => out.push_str("<br>"),
            Node::Span { tag, children } => {
                if tag.is_empty() {
                    out.push_str("<span>");
                } else {
                    out.push_str("<span class=\"ansi-");
                    escape_attr(tag, out);
                    out.push_str("\">");
                }
                render_into(children, out);
                out.push_str("</span>");
            }
            Node::Element { name, children } => {
                out.push('<');
                out.push_str(name);
                out.push('>');
                if children.is_empty() && VOID_ELEMENTS.contains(&name.as_str()) {
                    continue;
                }
                render_into(children, out);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
