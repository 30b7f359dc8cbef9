//! Editing session - the one document plus the interaction state around it
//!
//! Every operation runs to completion on the caller's thread. Content
//! changes re-render the serialized markup, bump the version and notify
//! observers.

use std::ops::Range;
use std::time::Instant;

use tracing::{debug, warn};

use crate::apply;
use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::cursor::{Position, Selection};
use crate::delete::{self, Backspace};
use crate::document::Document;
use crate::encode;
use crate::error::ComposerError;
use crate::markup;
use crate::node::{char_len, text_len, Node};
use crate::sanitize;
use crate::style::StyleCode;

/// Callback receiving the serialized markup after each change
pub type Observer = Box<dyn FnMut(&str)>;

/// Transient feedback after copying
///
/// The n-th copy in a streak shows the n-th configured message, so the
/// first copy reads "Copied!" and the last message repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFeedback {
    /// Consecutive successful copies since the last reset
    streak: usize,
    /// Current copy button label
    label: String,
    /// Whether the "copied" state is showing
    copied: bool,
    /// When the feedback goes back to rest
    reset_at: Option<Instant>,
}

impl CopyFeedback {
    fn new(config: &Config) -> Self {
        Self {
            streak: 0,
            label: config.copy_label.clone(),
            copied: false,
            reset_at: None,
        }
    }

    /// Consecutive copies
    pub fn streak(&self) -> usize {
        self.streak
    }

    /// Label to show on the copy button
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check if the "copied" state is showing
    pub fn is_copied(&self) -> bool {
        self.copied
    }

    fn record_success(&mut self, config: &Config, now: Instant) {
        let cap = config.copy_messages.len().max(1);
        self.streak = (self.streak + 1).min(cap);
        self.label = config
            .copy_messages
            .get(self.streak - 1)
            .cloned()
            .unwrap_or_else(|| config.copy_label.clone());
        self.copied = true;
        self.reset_at = Some(now + config.copy_cooldown);
    }

    fn tick(&mut self, config: &Config, now: Instant) -> bool {
        match self.reset_at {
            Some(deadline) if now >= deadline => {
                *self = Self::new(config);
                true
            }
            _ => false,
        }
    }
}

/// An editing session
pub struct Session {
    document: Document,
    selection: Selection,
    markup: String,
    version: u64,
    observers: Vec<Observer>,
    config: Config,
    feedback: CopyFeedback,
    clipboard_error: Option<ComposerError>,
}

impl Session {
    /// Start a session on the welcome document
    pub fn new(config: Config) -> Self {
        Self::with_document(Document::seeded(), config)
    }

    /// Start a session on a given document
    pub fn with_document(document: Document, config: Config) -> Self {
        let selection = Selection::collapsed(Position::end_of(&document));
        let markup = document.markup();
        let feedback = CopyFeedback::new(&config);
        Self {
            document,
            selection,
            markup,
            version: 0,
            observers: Vec::new(),
            config,
            feedback,
            clipboard_error: None,
        }
    }

    /// The document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable document, for direct edits by the editing surface.
    /// Call [`Session::input`] afterwards.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Serialized markup as of the last change
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Number of content changes so far
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Session configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Copy feedback state
    pub fn feedback(&self) -> &CopyFeedback {
        &self.feedback
    }

    /// Error from the last failed copy
    pub fn clipboard_error(&self) -> Option<&ComposerError> {
        self.clipboard_error.as_ref()
    }

    /// Register a callback for content changes
    pub fn subscribe(&mut self, observer: impl FnMut(&str) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Replace the selection
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Select a flattened range
    pub fn select(&mut self, range: Range<usize>) {
        let anchor = Position::restore(&self.document, range.start).unwrap_or_default();
        let focus = Position::restore(&self.document, range.end).unwrap_or_default();
        self.selection = Selection::new(anchor, focus);
    }

    /// Move the caret to a position
    pub fn place_caret(&mut self, at: Position) {
        self.selection = Selection::collapsed(at);
    }

    /// Flattened offset of the caret (the selection's focus)
    pub fn caret_offset(&self) -> usize {
        self.selection.focus.offset_in(&self.document).unwrap_or(0)
    }

    /// Wrap the selected text in a style span and select its contents.
    /// Does nothing without selected text.
    pub fn apply_style(&mut self, tag: &str) -> bool {
        let Some(range) = self.selection.range_in(&self.document) else {
            return false;
        };
        let Some(path) = apply::apply_style(&mut self.document, range, tag) else {
            return false;
        };

        if let Some(selection) = Selection::contents_of(&self.document, &path) {
            self.selection = selection;
        }
        self.sync();
        true
    }

    /// Apply a recognized style code
    pub fn apply_code(&mut self, code: StyleCode) -> bool {
        self.apply_style(&code.tag())
    }

    /// Discard all styling
    pub fn reset(&mut self) {
        apply::reset(&mut self.document);
        self.selection = Selection::collapsed(Position::end_of(&self.document));
        self.sync();
    }

    /// Sanitize after a direct edit. Returns whether the tree changed.
    pub fn input(&mut self) -> bool {
        let result = sanitize::normalize(&mut self.document, Some(&self.selection.focus));
        if !result.changed {
            return false;
        }
        let caret = result
            .caret
            .unwrap_or_else(|| Position::end_of(&self.document));
        self.selection = Selection::collapsed(caret);
        self.sync();
        true
    }

    /// Type text at the caret, replacing any selected text
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.delete_selection();

        let at = self.selection.focus.clone();
        let caret = match self.document.node_mut(&at.path) {
            Some(Node::Text(run)) => {
                let offset = at.offset.min(char_len(run));
                let byte = crate::node::char_to_byte(run, offset);
                run.insert_str(byte, text);
                Position::new(at.path, offset + char_len(text))
            }
            _ => match self.document.insert_nodes(&at, vec![Node::text(text)]) {
                Ok(path) => Position::new(path, char_len(text)),
                Err(e) => {
                    warn!(error = %e, "cannot insert text at caret");
                    return;
                }
            },
        };
        self.selection = Selection::collapsed(caret);
        self.sync();
    }

    /// Insert a line break at the caret, replacing any selected text
    pub fn insert_line_break(&mut self) {
        self.delete_selection();

        let at = self.selection.focus.clone();
        match self.document.insert_nodes(&at, vec![Node::Break]) {
            Ok(mut path) => {
                if let Some(last) = path.last_mut() {
                    *last += 1;
                }
                let offset = path.pop().unwrap_or(0);
                self.selection = Selection::collapsed(Position::new(path, offset));
                self.sync();
            }
            Err(e) => warn!(error = %e, "cannot insert line break at caret"),
        }
    }

    /// Paste markup at the caret, replacing any selected text, then
    /// sanitize
    pub fn paste(&mut self, source: &str) {
        let nodes = markup::parse(source);
        if nodes.is_empty() {
            return;
        }
        self.delete_selection();

        let start = self.caret_offset();
        let pasted = text_len(&nodes);
        let at = self.selection.focus.clone();
        if let Err(e) = self.document.insert_nodes(&at, nodes) {
            warn!(error = %e, "cannot paste at caret");
            return;
        }

        let caret = Position::restore(&self.document, start + pasted).unwrap_or_default();
        self.selection = Selection::collapsed(caret);
        if !self.input() {
            self.sync();
        }
    }

    /// Backspace. Returns whether anything changed.
    pub fn backspace(&mut self) -> bool {
        if !self.selection.is_collapsed() {
            return self.delete_selection();
        }

        let caret = self.selection.focus.clone();
        match delete::backspace(&mut self.document, &caret) {
            Backspace::Suppressed => false,
            Backspace::Restructured(at) => {
                self.selection = Selection::collapsed(at);
                self.sync();
                true
            }
            Backspace::Default => self.delete_before(&caret),
        }
    }

    /// Ordinary backspace: the line break or character before the caret
    fn delete_before(&mut self, caret: &Position) -> bool {
        if caret.offset > 0 {
            if let Some(siblings) = self.document.children_mut(&caret.path) {
                if matches!(siblings.get(caret.offset - 1), Some(Node::Break)) {
                    siblings.remove(caret.offset - 1);
                    self.selection =
                        Selection::collapsed(Position::new(caret.path.clone(), caret.offset - 1));
                    self.sync();
                    return true;
                }
            }
        }

        let Some(offset) = caret.offset_in(&self.document) else {
            return false;
        };
        if offset == 0 {
            return false;
        }
        self.document.delete_range(offset - 1..offset);
        let caret = Position::restore(&self.document, offset - 1).unwrap_or_default();
        self.selection = Selection::collapsed(caret);
        self.sync();
        true
    }

    /// Delete the selected text; true if there was any
    fn delete_selection(&mut self) -> bool {
        if self.selection.is_collapsed() {
            return false;
        }
        let Some(range) = self.selection.range_in(&self.document) else {
            return false;
        };
        let start = range.start;
        self.document.delete_range(range);
        let caret = Position::restore(&self.document, start).unwrap_or_default();
        self.selection = Selection::collapsed(caret);
        self.sync();
        true
    }

    /// The document as an ANSI code block
    pub fn encoded(&self) -> String {
        encode::encode(&self.document, &self.config.fence_language)
    }

    /// Encode the document and hand it to the clipboard.
    ///
    /// Failure is recorded in [`Session::clipboard_error`] and leaves the
    /// document and feedback untouched. Returns whether the copy worked.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> bool {
        let text = self.encoded();
        match clipboard.write_text(&text) {
            Ok(()) => {
                self.clipboard_error = None;
                self.feedback.record_success(&self.config, now);
                debug!(streak = self.feedback.streak(), bytes = text.len(), "copied document");
                true
            }
            Err(e) => {
                warn!(error = %e, "copy failed");
                self.clipboard_error = Some(e);
                false
            }
        }
    }

    /// Advance the cooldown clock. Returns whether feedback went back to
    /// rest.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.feedback.tick(&self.config, now)
    }

    fn sync(&mut self) {
        self.markup = self.document.markup();
        self.version += 1;
        for observer in &mut self.observers {
            observer(&self.markup);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn session(nodes: Vec<Node>) -> Session {
        Session::with_document(Document::from_nodes(nodes), Config::default())
    }

    #[test]
    fn test_apply_without_selection_is_noop() {
        let mut s = Session::default();
        let markup = s.markup().to_string();
        assert!(!s.apply_style("31"));
        s.select(3..3);
        assert!(!s.apply_style("31"));
        assert_eq!(s.markup(), markup);
        assert_eq!(s.version(), 0);
        assert_eq!(s.document(), &Document::seeded());
    }

    #[test]
    fn test_apply_reselects_new_span() {
        let mut s = session(vec![Node::text("hello world")]);
        s.select(0..5);
        assert!(s.apply_code(StyleCode::BOLD));
        assert!(s.apply_code(StyleCode::new(34).unwrap()));
        assert_eq!(s.selection().range_in(s.document()), Some(0..5));
        assert_eq!(
            s.markup(),
            "<span class=\"ansi-1\"><span class=\"ansi-34\">hello</span></span> world"
        );
        assert_eq!(s.version(), 2);
    }

    #[test]
    fn test_round_trip_nesting() {
        let mut s = session(vec![Node::text("abc")]);
        s.select(0..3);
        s.apply_style("31");
        s.select(1..2);
        s.apply_style("1");
        assert_eq!(
            s.encoded(),
            "```ansi\n\x1b[2;31ma\x1b[1;31mb\x1b[0m\x1b[2;31mc\x1b[0m\n```"
        );
    }

    #[test]
    fn test_reset() {
        let mut s = Session::default();
        let text = s.document().text();
        s.reset();
        assert_eq!(s.document().nodes(), &[Node::Text(text.clone())]);
        assert_eq!(s.caret_offset(), char_len(&text));
        let markup = s.markup().to_string();
        s.reset();
        assert_eq!(s.markup(), markup);
    }

    #[test]
    fn test_input_sanitizes_and_restores_caret() {
        let mut s = session(vec![Node::text("ab")]);
        s.document_mut().nodes_mut().push(Node::element(
            "div",
            vec![Node::styled("31", "cd"), Node::text("e")],
        ));
        s.place_caret(Position::new(vec![1, 0, 0], 1));

        assert!(s.input());
        assert_eq!(s.markup(), "abcde");
        assert_eq!(s.selection().focus, Position::new(vec![1], 1));
        assert_eq!(s.caret_offset(), 3);
    }

    #[test]
    fn test_input_on_clean_tree_changes_nothing() {
        let mut s = Session::default();
        let caret = Position::new(vec![1, 0], 2);
        s.place_caret(caret.clone());
        assert!(!s.input());
        assert_eq!(s.version(), 0);
        assert_eq!(s.selection().focus, caret);
    }

    #[test]
    fn test_paste_is_sanitized() {
        let mut s = session(vec![Node::text("ac")]);
        s.select(1..1);
        s.paste("<b>b</b><span class=\"ansi-99\">!</span><span class=\"ansi-32\">g</span>");
        assert_eq!(s.document().text(), "ab!gc");
        assert_eq!(s.markup(), "ab!<span class=\"ansi-32\">g</span>c");
        assert_eq!(s.caret_offset(), 4);
    }

    #[test]
    fn test_typing_and_line_breaks() {
        let mut s = session(vec![Node::text("ad")]);
        s.select(1..1);
        s.insert_text("bc");
        assert_eq!(s.markup(), "abcd");
        assert_eq!(s.caret_offset(), 3);

        s.insert_line_break();
        assert_eq!(s.markup(), "abc<br>d");
        assert_eq!(s.caret_offset(), 3);

        s.insert_text("!");
        assert_eq!(s.markup(), "abc<br>!d");
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut s = session(vec![Node::text("abcd")]);
        s.select(1..3);
        s.insert_text("X");
        assert_eq!(s.markup(), "aXd");
    }

    #[test]
    fn test_backspace_at_document_start() {
        let mut s = Session::default();
        s.place_caret(Position::root(0));
        assert!(!s.backspace());
        s.place_caret(Position::new(vec![0], 0));
        assert!(!s.backspace());
        assert_eq!(s.document(), &Document::seeded());
        assert_eq!(s.version(), 0);
    }

    #[test]
    fn test_backspace_merges_spans() {
        let mut s = session(vec![Node::styled("31", "ab"), Node::styled("32", "cd")]);
        s.place_caret(Position::new(vec![1, 0], 0));
        assert!(s.backspace());
        assert_eq!(s.markup(), "<span class=\"ansi-31\">abcd</span>");
        assert_eq!(s.caret_offset(), 4);
    }

    #[test]
    fn test_backspace_into_pasted_empty_span() {
        let doc = Document::from_markup(
            "x<span class=\"ansi-31\"></span><span class=\"ansi-32\">cd</span>",
        );
        let mut s = Session::with_document(doc, Config::default());
        assert!(!s.input());
        s.place_caret(Position::new(vec![2, 0], 0));
        assert!(s.backspace());
        assert_eq!(s.document().text(), "xcd");
        assert_eq!(s.markup(), "x<span class=\"ansi-31\">cd</span>");
        assert_eq!(s.caret_offset(), 3);
    }

    #[test]
    fn test_backspace_default_deletion() {
        let mut s = session(vec![Node::text("abc")]);
        s.select(2..2);
        assert!(s.backspace());
        assert_eq!(s.markup(), "ac");
        assert_eq!(s.caret_offset(), 1);

        let mut s = session(vec![Node::text("ab"), Node::Break]);
        s.place_caret(Position::root(2));
        assert!(s.backspace());
        assert_eq!(s.markup(), "ab");
        assert_eq!(s.selection().focus, Position::root(1));

        let mut s = session(vec![Node::text("abcd")]);
        s.select(3..1);
        assert!(s.backspace());
        assert_eq!(s.markup(), "ad");
    }

    #[test]
    fn test_observers_receive_markup() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut s = session(vec![Node::text("xy")]);
        s.subscribe(move |markup| sink.borrow_mut().push(markup.to_string()));
        s.select(0..1);
        s.apply_style("36");
        s.reset();

        assert_eq!(
            *seen.borrow(),
            vec!["<span class=\"ansi-36\">x</span>y".to_string(), "xy".to_string()]
        );
    }

    #[test]
    fn test_copy_streak_and_cooldown() {
        let mut s = Session::default();
        let mut clipboard = MemoryClipboard::new();
        let t0 = Instant::now();

        assert!(s.copy(&mut clipboard, t0));
        assert_eq!(clipboard.contents(), Some(s.encoded().as_str()));
        assert!(s.feedback().is_copied());
        assert_eq!(s.feedback().label(), "Copied!");

        assert!(s.copy(&mut clipboard, t0 + Duration::from_millis(500)));
        assert_eq!(s.feedback().streak(), 2);
        assert_eq!(s.feedback().label(), "Double Copy!");

        // The cooldown restarts with each copy
        assert!(!s.tick(t0 + Duration::from_millis(2100)));
        assert!(s.tick(t0 + Duration::from_millis(2500)));
        assert_eq!(s.feedback().streak(), 0);
        assert_eq!(s.feedback().label(), "Copy to Discord");
        assert!(!s.feedback().is_copied());
    }

    #[test]
    fn test_copy_streak_caps_at_last_message() {
        let mut s = Session::default();
        let mut clipboard = MemoryClipboard::new();
        let now = Instant::now();
        for _ in 0..20 {
            s.copy(&mut clipboard, now);
        }
        assert_eq!(s.feedback().streak(), 12);
        assert_eq!(s.feedback().label(), "RANDOM!!!!");
    }

    #[test]
    fn test_copy_failure_is_captured() {
        let mut s = Session::default();
        let mut clipboard = MemoryClipboard::failing();
        let before = s.document().clone();

        assert!(!s.copy(&mut clipboard, Instant::now()));
        assert!(matches!(s.clipboard_error(), Some(ComposerError::Clipboard(_))));
        assert!(!s.feedback().is_copied());
        assert_eq!(s.document(), &before);

        clipboard.set_failing(false);
        assert!(s.copy(&mut clipboard, Instant::now()));
        assert!(s.clipboard_error().is_none());
    }

    #[test]
    fn test_custom_fence_language() {
        let config = Config {
            fence_language: "ansi-custom".to_string(),
            ..Config::default()
        };
        let s = Session::with_document(Document::from_nodes(vec![Node::text("x")]), config);
        assert_eq!(s.encoded(), "```ansi-custom\nx\n```");
    }
}
