//! Document representation - the ordered forest of nodes being edited

use std::ops::Range;

use crate::cursor::Position;
use crate::error::{ComposerError, Result};
use crate::markup;
use crate::node::{char_len, char_to_byte, split_at_char, text_len, Node};

/// Markup of the document every session starts with
pub const SEED_MARKUP: &str = "Welcome to&nbsp;<span class=\"ansi-33\">Rebane</span>'s \
<span class=\"ansi-45\"><span class=\"ansi-37\">Discord</span></span>&nbsp;\
<span class=\"ansi-31\">C</span><span class=\"ansi-32\">o</span>\
<span class=\"ansi-33\">l</span><span class=\"ansi-34\">o</span>\
<span class=\"ansi-35\">r</span><span class=\"ansi-36\">e</span>\
<span class=\"ansi-37\">d</span>&nbsp;Text Generator!";

/// The document: an ordered forest of text runs, style spans and line
/// breaks. Node addresses are paths of child indices from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create a document from nodes
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Create a document from serialized markup
    pub fn from_markup(source: &str) -> Self {
        Self::from_nodes(markup::parse(source))
    }

    /// The welcome document
    pub fn seeded() -> Self {
        Self::from_markup(SEED_MARKUP)
    }

    /// Top-level nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable top-level nodes, for direct edits by the editing surface
    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    /// Replace the whole content
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
    }

    /// Check if the document has no nodes at all
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flattened text content
    pub fn text(&self) -> String {
        crate::node::text_content(&self.nodes)
    }

    /// Length of the flattened text in chars
    pub fn text_len(&self) -> usize {
        text_len(&self.nodes)
    }

    /// Serialized display form
    pub fn markup(&self) -> String {
        markup::render(&self.nodes)
    }

    /// Get the node at a path
    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (&last, parents) = path.split_last()?;
        self.children(parents)?.get(last)
    }

    /// Get the mutable node at a path
    pub fn node_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (&last, parents) = path.split_last()?;
        self.children_mut(parents)?.get_mut(last)
    }

    /// Children of the node at a path; the empty path is the root
    pub fn children(&self, path: &[usize]) -> Option<&Vec<Node>> {
        let mut nodes = &self.nodes;
        for &idx in path {
            nodes = nodes.get(idx)?.children()?;
        }
        Some(nodes)
    }

    /// Mutable children of the node at a path; the empty path is the root
    pub fn children_mut(&mut self, path: &[usize]) -> Option<&mut Vec<Node>> {
        let mut nodes = &mut self.nodes;
        for &idx in path {
            nodes = nodes.get_mut(idx)?.children_mut()?;
        }
        Some(nodes)
    }

    /// Paths and char lengths of every text run, in document order
    pub fn text_runs(&self) -> Vec<(Vec<usize>, usize)> {
        fn walk(nodes: &[Node], prefix: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, usize)>) {
            for (idx, node) in nodes.iter().enumerate() {
                prefix.push(idx);
                match node {
                    Node::Text(text) => out.push((prefix.clone(), char_len(text))),
                    Node::Break => {}
                    Node::Span { children, .. } | Node::Element { children, .. } => {
                        walk(children, prefix, out)
                    }
                }
                prefix.pop();
            }
        }

        let mut out = Vec::new();
        walk(&self.nodes, &mut Vec::new(), &mut out);
        out
    }

    /// Delete the text and line breaks inside a flattened range.
    ///
    /// Text runs and containers emptied by the deletion are removed;
    /// nodes that were already empty are left alone.
    pub fn delete_range(&mut self, range: Range<usize>) {
        fn walk(nodes: &mut Vec<Node>, pos: &mut usize, range: &Range<usize>) {
            let mut idx = 0;
            while idx < nodes.len() {
                let emptied = match &mut nodes[idx] {
                    Node::Text(text) => {
                        let len = char_len(text);
                        let from = range.start.saturating_sub(*pos).min(len);
                        let to = range.end.saturating_sub(*pos).min(len);
                        *pos += len;
                        if from < to {
                            let start = char_to_byte(text, from);
                            let end = char_to_byte(text, to);
                            text.replace_range(start..end, "");
                            text.is_empty()
                        } else {
                            false
                        }
                    }
                    Node::Break => range.start < *pos && *pos < range.end,
                    Node::Span { children, .. } | Node::Element { children, .. } => {
                        let had_children = !children.is_empty();
                        walk(children, pos, range);
                        had_children && children.is_empty()
                    }
                };
                if emptied {
                    nodes.remove(idx);
                } else {
                    idx += 1;
                }
            }
        }

        if range.start < range.end {
            walk(&mut self.nodes, &mut 0, &range);
        }
    }

    /// Insert nodes at a position, splitting the text run it points into.
    ///
    /// Returns the path of the first inserted node.
    pub fn insert_nodes(&mut self, at: &Position, nodes: Vec<Node>) -> Result<Vec<usize>> {
        let invalid = || ComposerError::InvalidPath(at.path.clone());

        if let Some(Node::Text(text)) = self.node(&at.path) {
            let (left, right) = split_at_char(text, at.offset);
            let (left, right) = (left.to_string(), right.to_string());
            let (&idx, parent) = at.path.split_last().ok_or_else(invalid)?;
            let siblings = self.children_mut(parent).ok_or_else(invalid)?;

            let mut replacement = Vec::with_capacity(nodes.len() + 2);
            let first = if left.is_empty() {
                idx
            } else {
                replacement.push(Node::Text(left));
                idx + 1
            };
            replacement.extend(nodes);
            if !right.is_empty() {
                replacement.push(Node::Text(right));
            }
            siblings.splice(idx..=idx, replacement);

            let mut path = parent.to_vec();
            path.push(first);
            return Ok(path);
        }

        let siblings = self.children_mut(&at.path).ok_or_else(invalid)?;
        let idx = at.offset.min(siblings.len());
        siblings.splice(idx..idx, nodes);

        let mut path = at.path.clone();
        path.push(idx);
        Ok(path)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        // "ab" [31: "cd" <br> "ef"] "gh"
        Document::from_nodes(vec![
            Node::text("ab"),
            Node::span("31", vec![Node::text("cd"), Node::Break, Node::text("ef")]),
            Node::text("gh"),
        ])
    }

    #[test]
    fn test_seeded_document() {
        let doc = Document::seeded();
        assert_eq!(
            doc.text(),
            "Welcome to\u{a0}Rebane's Discord\u{a0}Colored\u{a0}Text Generator!"
        );
        assert_eq!(doc.markup(), SEED_MARKUP);
        assert_eq!(Document::default(), doc);
    }

    #[test]
    fn test_path_access() {
        let mut doc = sample();
        assert_eq!(doc.node(&[1, 2]), Some(&Node::text("ef")));
        assert_eq!(doc.node(&[1, 1]), Some(&Node::Break));
        assert!(doc.node(&[]).is_none());
        assert!(doc.node(&[0, 0]).is_none());
        assert_eq!(doc.children(&[]).map(Vec::len), Some(3));
        assert_eq!(doc.children(&[1]).map(Vec::len), Some(3));

        if let Some(Node::Text(text)) = doc.node_mut(&[2]) {
            text.push('!');
        }
        assert_eq!(doc.text(), "abcdefgh!");
    }

    #[test]
    fn test_text_runs() {
        let runs = sample().text_runs();
        assert_eq!(
            runs,
            vec![
                (vec![0], 2),
                (vec![1, 0], 2),
                (vec![1, 2], 2),
                (vec![2], 2),
            ]
        );
    }

    #[test]
    fn test_delete_range_prunes_emptied_nodes() {
        let mut doc = sample();
        doc.delete_range(1..7);
        assert_eq!(doc.nodes(), &[Node::text("a"), Node::text("h")]);
    }

    #[test]
    fn test_delete_range_partial_span() {
        let mut doc = sample();
        doc.delete_range(3..5);
        assert_eq!(
            doc.nodes(),
            &[
                Node::text("ab"),
                Node::span("31", vec![Node::text("c"), Node::text("f")]),
                Node::text("gh"),
            ]
        );
    }

    #[test]
    fn test_delete_range_leaves_empty_nodes_alone() {
        let mut doc = Document::from_nodes(vec![
            Node::span("1", vec![]),
            Node::text(""),
            Node::text("xy"),
        ]);
        doc.delete_range(0..1);
        assert_eq!(
            doc.nodes(),
            &[Node::span("1", vec![]), Node::text(""), Node::text("y")]
        );
    }

    #[test]
    fn test_insert_nodes_splits_text() {
        let mut doc = sample();
        let path = doc
            .insert_nodes(&Position::new(vec![1, 0], 1), vec![Node::Break])
            .unwrap();
        assert_eq!(path, vec![1, 1]);
        assert_eq!(
            doc.children(&[1]).unwrap(),
            &vec![
                Node::text("c"),
                Node::Break,
                Node::text("d"),
                Node::Break,
                Node::text("ef"),
            ]
        );
    }

    #[test]
    fn test_insert_nodes_at_text_start() {
        let mut doc = sample();
        let path = doc
            .insert_nodes(&Position::new(vec![0], 0), vec![Node::text("<")])
            .unwrap();
        assert_eq!(path, vec![0]);
        assert_eq!(doc.text(), "<abcdefgh");
    }

    #[test]
    fn test_insert_nodes_into_container() {
        let mut doc = sample();
        let path = doc
            .insert_nodes(&Position::root(3), vec![Node::styled("1", "!")])
            .unwrap();
        assert_eq!(path, vec![3]);
        assert_eq!(doc.text(), "abcdefgh!");

        assert!(doc
            .insert_nodes(&Position::new(vec![9], 0), vec![Node::Break])
            .is_err());
    }
}
