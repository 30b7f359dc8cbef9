//! Document nodes and character-indexed text helpers
//!
//! All offsets in this crate count Unicode scalar values (chars), never
//! bytes. The helpers at the bottom convert between the two.

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A run of characters
    Text(String),
    /// A style span carrying one style tag (the numeric code as text)
    Span { tag: String, children: Vec<Node> },
    /// A zero-width line break
    Break,
    /// Any other markup that arrived through typing or paste.
    /// Never survives sanitization.
    Element { name: String, children: Vec<Node> },
}

impl Node {
    /// Create a text run
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Create a style span
    pub fn span(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Span {
            tag: tag.into(),
            children,
        }
    }

    /// Create a style span holding a single text run
    pub fn styled(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::span(tag, vec![Node::text(text)])
    }

    /// Create a foreign element
    pub fn element(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element {
            name: name.into(),
            children,
        }
    }

    /// Child nodes, for the variants that have them
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Span { children, .. } | Node::Element { children, .. } => Some(children),
            Node::Text(_) | Node::Break => None,
        }
    }

    /// Mutable child nodes, for the variants that have them
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Span { children, .. } | Node::Element { children, .. } => Some(children),
            Node::Text(_) | Node::Break => None,
        }
    }

    /// Check if this is a text run
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Check if this is a style span
    pub fn is_span(&self) -> bool {
        matches!(self, Node::Span { .. })
    }

    /// Flattened text: descendant text runs concatenated, markup and
    /// line breaks discarded
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Break => {}
            Node::Span { children, .. } | Node::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Length of the flattened text in chars
    pub fn text_len(&self) -> usize {
        match self {
            Node::Text(text) => char_len(text),
            Node::Break => 0,
            Node::Span { children, .. } | Node::Element { children, .. } => text_len(children),
        }
    }
}

/// Flattened text of a node list
pub fn text_content(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.collect_text(&mut out);
    }
    out
}

/// Flattened length of a node list in chars
pub fn text_len(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::text_len).sum()
}

/// Number of chars in a string
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte position of the char at `char_idx`, clamped to the end of the text
pub fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(pos, _)| pos)
}

/// Split a string at a char index
pub fn split_at_char(text: &str, char_idx: usize) -> (&str, &str) {
    text.split_at(char_to_byte(text, char_idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_skips_markup_and_breaks() {
        let node = Node::span(
            "31",
            vec![
                Node::text("Hello"),
                Node::Break,
                Node::element("b", vec![Node::text(" World")]),
            ],
        );
        assert_eq!(node.text_content(), "Hello World");
        assert_eq!(node.text_len(), 11);
    }

    #[test]
    fn test_children_access() {
        let mut node = Node::styled("1", "bold");
        assert_eq!(node.children().map(Vec::len), Some(1));
        if let Some(children) = node.children_mut() {
            children.push(Node::Break);
        }
        assert_eq!(node.children().map(Vec::len), Some(2));
        assert!(Node::Break.children().is_none());
        assert!(Node::text("x").children().is_none());
    }

    #[test]
    fn test_utf8_char_helpers() {
        let text = "caf\u{e9} \u{1f600}!";
        assert_eq!(char_len(text), 7);
        assert_eq!(char_to_byte(text, 3), 3);
        assert_eq!(char_to_byte(text, 4), 5);
        assert_eq!(char_to_byte(text, 100), text.len());
        assert_eq!(split_at_char(text, 4), ("caf\u{e9}", " \u{1f600}!"));
    }

    #[test]
    fn test_list_helpers() {
        let nodes = vec![Node::text("ab"), Node::Break, Node::styled("32", "cd")];
        assert_eq!(text_content(&nodes), "abcd");
        assert_eq!(text_len(&nodes), 4);
    }
}
