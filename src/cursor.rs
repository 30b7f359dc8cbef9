//! Cursor positions and selections
//!
//! A [`Position`] addresses a boundary point the way an editing surface
//! does: a container path plus an offset. Inside a text run the offset
//! counts chars; inside the root or an element it counts children.
//!
//! Positions convert to and from flattened offsets (chars of text before
//! the point). Line breaks contribute nothing to flattened offsets.

use std::ops::Range;

use crate::document::Document;
use crate::node::{char_len, text_len, Node};

/// A boundary point in the document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    /// Container path (empty = root)
    pub path: Vec<usize>,
    /// Offset within the container
    pub offset: usize,
}

impl Position {
    /// Create a position
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }

    /// A position among the root's children
    pub fn root(offset: usize) -> Self {
        Self::new(Vec::new(), offset)
    }

    /// Check if the container is the root
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Flattened offset of this position, or None if the path is invalid
    pub fn offset_in(&self, doc: &Document) -> Option<usize> {
        let mut nodes = doc.nodes();
        let mut offset = 0;

        for (depth, &idx) in self.path.iter().enumerate() {
            let node = nodes.get(idx)?;
            offset += text_len(&nodes[..idx]);
            let is_last = depth + 1 == self.path.len();
            match node {
                Node::Text(text) => {
                    return is_last.then(|| offset + self.offset.min(char_len(text)));
                }
                Node::Break => return is_last.then_some(offset),
                Node::Span { children, .. } | Node::Element { children, .. } => {
                    nodes = children;
                }
            }
        }

        Some(offset + text_len(&nodes[..self.offset.min(nodes.len())]))
    }

    /// Find the position for a flattened offset, preferring the end of a
    /// text run over the start of the next one.
    ///
    /// Offsets past the end land at the end of the content. Returns None
    /// only for a document with no nodes.
    pub fn restore(doc: &Document, offset: usize) -> Option<Self> {
        let mut current = 0;
        for (path, len) in doc.text_runs() {
            if current + len >= offset {
                return Some(Self::new(path, offset - current));
            }
            current += len;
        }

        let nodes = doc.nodes();
        match nodes.last()? {
            Node::Text(text) => Some(Self::new(vec![nodes.len() - 1], char_len(text))),
            _ => Some(Self::root(nodes.len())),
        }
    }

    /// Find the position just before the char at a flattened offset,
    /// inside the text run that holds that char
    pub fn before_char(doc: &Document, offset: usize) -> Option<Self> {
        let mut current = 0;
        for (path, len) in doc.text_runs() {
            if current + len > offset {
                return Some(Self::new(path, offset - current));
            }
            current += len;
        }
        None
    }

    /// Position at the end of the document
    pub fn end_of(doc: &Document) -> Self {
        Self::restore(doc, doc.text_len()).unwrap_or_default()
    }
}

/// A selection between two positions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    /// Where the selection started
    pub anchor: Position,
    /// Where the selection ends (the caret)
    pub focus: Position,
}

impl Selection {
    /// Create a selection
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// A zero-width selection
    pub fn collapsed(at: Position) -> Self {
        Self::new(at.clone(), at)
    }

    /// Select everything inside the node at a path
    pub fn contents_of(doc: &Document, path: &[usize]) -> Option<Self> {
        let end = match doc.node(path)? {
            Node::Text(text) => char_len(text),
            Node::Break => 0,
            Node::Span { children, .. } | Node::Element { children, .. } => children.len(),
        };
        Some(Self::new(
            Position::new(path.to_vec(), 0),
            Position::new(path.to_vec(), end),
        ))
    }

    /// Check if both ends are the same boundary point
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Flattened range covered, ordered start to end
    pub fn range_in(&self, doc: &Document) -> Option<Range<usize>> {
        let a = self.anchor.offset_in(doc)?;
        let b = self.focus.offset_in(doc)?;
        Some(a.min(b)..a.max(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        // "ab" [31: "cd" <br> "ef"] <br>
        Document::from_nodes(vec![
            Node::text("ab"),
            Node::span("31", vec![Node::text("cd"), Node::Break, Node::text("ef")]),
            Node::Break,
        ])
    }

    #[test]
    fn test_offset_in_text() {
        let doc = sample();
        assert_eq!(Position::new(vec![0], 1).offset_in(&doc), Some(1));
        assert_eq!(Position::new(vec![1, 2], 1).offset_in(&doc), Some(5));
        // Clamped to the run
        assert_eq!(Position::new(vec![1, 0], 9).offset_in(&doc), Some(4));
    }

    #[test]
    fn test_offset_in_containers() {
        let doc = sample();
        assert_eq!(Position::root(0).offset_in(&doc), Some(0));
        assert_eq!(Position::root(1).offset_in(&doc), Some(2));
        assert_eq!(Position::root(3).offset_in(&doc), Some(6));
        assert_eq!(Position::new(vec![1], 2).offset_in(&doc), Some(4));
        assert_eq!(Position::new(vec![1, 1], 0).offset_in(&doc), Some(4));
    }

    #[test]
    fn test_offset_in_invalid_path() {
        let doc = sample();
        assert_eq!(Position::new(vec![7], 0).offset_in(&doc), None);
        assert_eq!(Position::new(vec![0, 0], 0).offset_in(&doc), None);
    }

    #[test]
    fn test_restore_prefers_earlier_run() {
        let doc = sample();
        assert_eq!(Position::restore(&doc, 0), Some(Position::new(vec![0], 0)));
        assert_eq!(Position::restore(&doc, 2), Some(Position::new(vec![0], 2)));
        assert_eq!(Position::restore(&doc, 3), Some(Position::new(vec![1, 0], 1)));
        assert_eq!(Position::restore(&doc, 6), Some(Position::new(vec![1, 2], 2)));
    }

    #[test]
    fn test_restore_falls_back_to_end() {
        let doc = sample();
        assert_eq!(Position::restore(&doc, 60), Some(Position::root(3)));

        let doc = Document::from_nodes(vec![Node::styled("1", "x"), Node::text("yz")]);
        assert_eq!(Position::restore(&doc, 60), Some(Position::new(vec![1], 2)));

        assert_eq!(Position::restore(&Document::new(), 4), None);
        assert_eq!(Position::end_of(&Document::new()), Position::root(0));
    }

    #[test]
    fn test_before_char() {
        let doc = sample();
        assert_eq!(Position::before_char(&doc, 2), Some(Position::new(vec![1, 0], 0)));
        assert_eq!(Position::before_char(&doc, 4), Some(Position::new(vec![1, 2], 0)));
        assert_eq!(Position::before_char(&doc, 6), None);
    }

    #[test]
    fn test_selection_ranges() {
        let doc = sample();
        let sel = Selection::new(Position::new(vec![1, 2], 2), Position::new(vec![0], 1));
        assert_eq!(sel.range_in(&doc), Some(1..6));
        assert!(!sel.is_collapsed());

        let caret = Selection::collapsed(Position::new(vec![0], 1));
        assert!(caret.is_collapsed());
        assert_eq!(caret.range_in(&doc), Some(1..1));
    }

    #[test]
    fn test_contents_of() {
        let doc = sample();
        let sel = Selection::contents_of(&doc, &[1]).unwrap();
        assert_eq!(sel.anchor, Position::new(vec![1], 0));
        assert_eq!(sel.focus, Position::new(vec![1], 3));
        assert_eq!(sel.range_in(&doc), Some(2..6));
    }
}
