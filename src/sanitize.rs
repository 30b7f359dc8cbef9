//! Tree sanitizer
//!
//! After any direct edit the tree may hold arbitrary markup. Sanitizing
//! keeps text runs, line breaks and spans with a recognized style tag;
//! everything else is replaced by a text run of its flattened content.
//! Children of surviving spans are cleaned recursively.

use tracing::{debug, trace};

use crate::cursor::Position;
use crate::document::Document;
use crate::node::Node;
use crate::style::StyleCode;

/// Result of normalizing a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Whether the serialized form changed
    pub changed: bool,
    /// Where the caret belongs now; None when nothing changed
    pub caret: Option<Position>,
}

/// Sanitize a node list
pub fn sanitize(nodes: &[Node]) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => out.push(Node::Text(text.clone())),
            Node::Break => out.push(Node::Break),
            Node::Span { tag, children } if StyleCode::parse(tag).is_some() => {
                out.push(Node::span(tag.clone(), sanitize(children)));
            }
            Node::Span { tag, .. } => {
                trace!(tag = %tag, "stripping span with unrecognized style");
                flatten_into(node, &mut out);
            }
            Node::Element { name, .. } => {
                trace!(element = %name, "stripping foreign element");
                flatten_into(node, &mut out);
            }
        }
    }
    out
}

fn flatten_into(node: &Node, out: &mut Vec<Node>) {
    let text = node.text_content();
    if !text.is_empty() {
        out.push(Node::Text(text));
    }
}

/// Sanitize a document in place, carrying the caret across.
///
/// The caret is measured as a flattened offset before sanitizing and
/// restored to the same offset afterwards (end of content if it no
/// longer fits). When the serialized form is unchanged the document is
/// left untouched and no caret is reported.
pub fn normalize(doc: &mut Document, caret: Option<&Position>) -> Normalized {
    let offset = caret.and_then(|caret| caret.offset_in(doc));
    let before = doc.markup();
    let clean = sanitize(doc.nodes());

    if crate::markup::render(&clean) == before {
        return Normalized {
            changed: false,
            caret: None,
        };
    }

    doc.set_nodes(clean);
    debug!(markup_len = before.len(), "document sanitized");

    let caret = offset.and_then(|offset| Position::restore(doc, offset));
    Normalized {
        changed: true,
        caret,
    }
}
