//! Backspace at structural boundaries
//!
//! Deleting backward from the very start of a text run would either
//! remove the wrong node or leave an empty span behind, so those cases
//! are restructured here instead of deleting a character:
//!
//! | caret                                  | previous sibling | result                       |
//! |----------------------------------------|------------------|------------------------------|
//! | start of document                      | -                | nothing                      |
//! | start of a run inside a span           | a span           | spans merge, first tag wins  |
//! | start of a run inside a span           | anything else    | span becomes plain text      |
//! | start of a run outside spans           | a text run       | runs merge                   |
//! | start of a run outside spans           | a line break     | break removed                |
//! | start of a run outside spans           | a span           | that span becomes plain text |
//!
//! Everything else is ordinary character deletion, which this module
//! leaves to the caller.

use tracing::debug;

use crate::cursor::Position;
use crate::document::Document;
use crate::node::{char_len, Node};

/// What a backspace at the caret amounts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backspace {
    /// Nothing may be deleted; the key does nothing
    Suppressed,
    /// Not a structural boundary; delete a character as usual
    Default,
    /// The tree was restructured and the caret moves here
    Restructured(Position),
}

/// Handle a backspace with a collapsed selection at `caret`
pub fn backspace(doc: &mut Document, caret: &Position) -> Backspace {
    if caret.is_root() {
        return if caret.offset == 0 {
            Backspace::Suppressed
        } else {
            Backspace::Default
        };
    }

    let current = match doc.node(&caret.path) {
        Some(Node::Text(text)) if caret.offset == 0 => text.clone(),
        _ => return Backspace::Default,
    };

    if !content_precedes(doc.nodes(), &caret.path) {
        return Backspace::Suppressed;
    }

    let (&idx, parent) = match caret.path.split_last() {
        Some(split) => split,
        None => return Backspace::Default,
    };

    let outcome = match doc.node(parent) {
        Some(Node::Span { .. }) => leave_span(doc, parent),
        _ => join_previous(doc, parent, idx, current),
    };
    if let Backspace::Restructured(at) = &outcome {
        debug!(caret = ?caret, moved_to = ?at, "backspace restructured tree");
    }
    outcome
}

/// Caret at the start of a run inside the span at `span_path`
fn leave_span(doc: &mut Document, span_path: &[usize]) -> Backspace {
    let Some((&idx, grand)) = span_path.split_last() else {
        return Backspace::Default;
    };
    let Some(siblings) = doc.children_mut(grand) else {
        return Backspace::Default;
    };

    let follows_span = idx > 0 && siblings[idx - 1].is_span();
    if follows_span {
        let moved = siblings.remove(idx).text_content();
        let prev = &mut siblings[idx - 1];
        let kept = prev.text_content();
        let Some(children) = prev.children_mut() else {
            return Backspace::Default;
        };
        if !moved.is_empty() {
            *children = vec![Node::Text(kept + &moved)];
        }

        let mut path = grand.to_vec();
        path.push(idx - 1);
        let caret = match children.last() {
            Some(Node::Text(text)) => {
                let len = char_len(text);
                path.push(children.len() - 1);
                Position::new(path, len)
            }
            _ => Position::new(path, children.len()),
        };
        return Backspace::Restructured(caret);
    }

    let text = siblings[idx].text_content();
    let len = char_len(&text);
    siblings[idx] = Node::Text(text);
    Backspace::Restructured(Position::new(span_path.to_vec(), len))
}

/// Caret at the start of the run at `parent + [idx]`, outside any span
fn join_previous(doc: &mut Document, parent: &[usize], idx: usize, current: String) -> Backspace {
    let Some(siblings) = doc.children_mut(parent) else {
        return Backspace::Default;
    };
    let Some(prev_idx) = idx.checked_sub(1) else {
        return Backspace::Suppressed;
    };

    let mut prev_path = parent.to_vec();
    prev_path.push(prev_idx);

    match &mut siblings[prev_idx] {
        Node::Text(prev) => {
            let join = char_len(prev);
            prev.push_str(&current);
            siblings.remove(idx);
            Backspace::Restructured(Position::new(prev_path, join))
        }
        Node::Break => {
            siblings.remove(prev_idx);
            Backspace::Restructured(Position::new(prev_path, 0))
        }
        span @ Node::Span { .. } => {
            let text = span.text_content();
            let len = char_len(&text);
            *span = Node::Text(text);
            Backspace::Restructured(Position::new(prev_path, len))
        }
        Node::Element { .. } => Backspace::Suppressed,
    }
}

/// Check if any text or line break comes before the node at `path`
fn content_precedes(nodes: &[Node], path: &[usize]) -> bool {
    fn has_content(node: &Node) -> bool {
        match node {
            Node::Text(text) => !text.is_empty(),
            Node::Break => true,
            Node::Span { children, .. } | Node::Element { children, .. } => {
                children.iter().any(has_content)
            }
        }
    }

    let mut nodes = nodes;
    for &idx in path {
        let before = &nodes[..idx.min(nodes.len())];
        if before.iter().any(has_content) {
            return true;
        }
        match nodes.get(idx).and_then(Node::children) {
            Some(children) => nodes = children,
            None => break,
        }
    }
    false
}
