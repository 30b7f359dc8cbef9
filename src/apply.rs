//! Style application and reset

use std::ops::Range;

use tracing::debug;

use crate::cursor::Position;
use crate::document::Document;
use crate::node::{char_len, split_at_char, Node};

/// Side of a split point that gets nodes with no text sitting right on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tie {
    Left,
    Right,
}

/// Wrap the text in a flattened range in a new style span.
///
/// The span goes into the deepest container holding both ends of the
/// range, so styling part of a single styled run nests inside it. Spans
/// only partly covered by the range are split in two, each half keeping
/// its tag, so every char keeps the styles it had. Line breaks strictly
/// inside the range move into the new span. The tag is not validated
/// here.
///
/// Returns the path of the new span, or None when the range selects no
/// text (the document is left untouched).
pub fn apply_style(doc: &mut Document, range: Range<usize>, tag: &str) -> Option<Vec<usize>> {
    let start = range.start;
    let end = range.end.min(doc.text_len());
    if start >= end {
        return None;
    }

    let first = Position::before_char(doc, start)?.path;
    let last = Position::before_char(doc, end - 1)?.path;
    let depth = first
        .iter()
        .zip(&last)
        .take_while(|(a, b)| a == b)
        .count()
        .min(first.len().saturating_sub(1));
    let container = first[..depth].to_vec();
    let base = Position::new(container.clone(), 0).offset_in(doc)?;

    let siblings = doc.children_mut(&container)?;
    let (before, rest) = split_nodes(std::mem::take(siblings), start - base, Tie::Left);
    let (selected, after) = split_nodes(rest, end - start, Tie::Right);
    let idx = before.len();
    siblings.extend(before);
    siblings.push(Node::span(tag, selected));
    siblings.extend(after);

    let mut path = container;
    path.push(idx);
    debug!(tag, start, end, path = ?path, "applied style");
    Some(path)
}

/// Split nodes at a char offset from their start
fn split_nodes(nodes: Vec<Node>, at: usize, tie: Tie) -> (Vec<Node>, Vec<Node>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;
    for node in nodes {
        let len = node.text_len();
        if pos > at {
            right.push(node);
        } else {
            let (l, r) = split_node(node, at - pos, tie);
            left.extend(l);
            right.extend(r);
        }
        pos += len;
    }
    (left, right)
}

fn split_node(node: Node, at: usize, tie: Tie) -> (Option<Node>, Option<Node>) {
    match node {
        Node::Text(text) => {
            let len = char_len(&text);
            if len == 0 {
                on_edge(Node::Text(text), at, tie)
            } else if at == 0 {
                (None, Some(Node::Text(text)))
            } else if at >= len {
                (Some(Node::Text(text)), None)
            } else {
                let (l, r) = split_at_char(&text, at);
                (Some(Node::text(l)), Some(Node::text(r)))
            }
        }
        Node::Break => on_edge(Node::Break, at, tie),
        Node::Span { tag, children } => {
            let (l, r) = split_nodes(children, at, tie);
            halves(l, r, at, tie, |children| Node::Span {
                tag: tag.clone(),
                children,
            })
        }
        Node::Element { name, children } => {
            let (l, r) = split_nodes(children, at, tie);
            halves(l, r, at, tie, |children| Node::Element {
                name: name.clone(),
                children,
            })
        }
    }
}

/// Place a node with no text that sits `at` chars before the split point
fn on_edge(node: Node, at: usize, tie: Tie) -> (Option<Node>, Option<Node>) {
    if at == 0 && tie == Tie::Right {
        (None, Some(node))
    } else {
        (Some(node), None)
    }
}

fn halves(
    left: Vec<Node>,
    right: Vec<Node>,
    at: usize,
    tie: Tie,
    rebuild: impl Fn(Vec<Node>) -> Node,
) -> (Option<Node>, Option<Node>) {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => on_edge(rebuild(Vec::new()), at, tie),
        (false, true) => (Some(rebuild(left)), None),
        (true, false) => (None, Some(rebuild(right))),
        (false, false) => (Some(rebuild(left)), Some(rebuild(right))),
    }
}

/// Drop all styling and line breaks, keeping the flattened text
pub fn reset(doc: &mut Document) {
    let text = doc.text();
    let nodes = if text.is_empty() {
        Vec::new()
    } else {
        vec![Node::Text(text)]
    };
    doc.set_nodes(nodes);
}
