//! Encoder: document tree to an ANSI code block
//!
//! Discord renders ANSI SGR sequences inside a fenced block tagged
//! `ansi`. Every span opens with `ESC[<style>;<color>m`, closes with
//! `ESC[0m`, and then re-opens whatever foreground and background the
//! enclosing span had, since the reset cleared them.

use crate::document::Document;
use crate::node::Node;
use crate::style::{StyleState, UNSET};

/// Sequence that clears all styling
pub const RESET: &str = "\x1b[0m";

/// Encode a document as a fenced code block
pub fn encode(doc: &Document, fence_language: &str) -> String {
    format!("```{}\n{}\n```", fence_language, encode_nodes(doc.nodes()))
}

/// Encode nodes without the fence
pub fn encode_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    let mut stack = vec![StyleState::default()];
    encode_into(nodes, &mut stack, &mut out);
    out
}

fn encode_into(nodes: &[Node], stack: &mut Vec<StyleState>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Break => out.push('\n'),
            Node::Span { tag, children } => {
                let Some(code) = numeric_code(tag) else {
                    continue;
                };

                let state = top(stack).with_code(code);
                stack.push(state);
                push_sgr(out, state.st, state.color_for(code));
                encode_into(children, stack, out);
                stack.pop();
                out.push_str(RESET);

                // Both restores carry the parent's style field
                let parent = top(stack);
                if parent.fg != UNSET {
                    push_sgr(out, parent.st, parent.fg);
                }
                if parent.bg != UNSET {
                    push_sgr(out, parent.st, parent.bg);
                }
            }
            // Only reachable for unsanitized trees
            Node::Element { .. } => {}
        }
    }
}

fn top(stack: &[StyleState]) -> StyleState {
    stack.last().copied().unwrap_or_default()
}

fn numeric_code(tag: &str) -> Option<u32> {
    if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tag.parse().ok()
}

fn push_sgr(out: &mut String, style: u32, color: u32) {
    out.push_str(&format!("\x1b[{};{}m", style, color));
}
