//! ansi-composer - compose colored text for Discord
//!
//! A small rich-text model of styled spans that exports as an ANSI
//! escape-coded code block Discord can render.
//!
//! ```
//! use ansi_composer::{Config, Document, MemoryClipboard, Node, Session};
//!
//! let doc = Document::from_nodes(vec![Node::text("hello world")]);
//! let mut session = Session::with_document(doc, Config::default());
//! session.select(0..5);
//! session.apply_style("31");
//! assert_eq!(session.encoded(), "```ansi\n\x1b[2;31mhello\x1b[0m world\n```");
//!
//! let mut clipboard = MemoryClipboard::new();
//! assert!(session.copy(&mut clipboard, std::time::Instant::now()));
//! ```

pub mod apply;
pub mod clipboard;
pub mod config;
pub mod cursor;
pub mod delete;
pub mod document;
pub mod encode;
pub mod error;
pub mod markup;
pub mod node;
pub mod sanitize;
pub mod session;
pub mod style;

pub use clipboard::{Clipboard, MemoryClipboard, TerminalClipboard};
pub use config::Config;
pub use cursor::{Position, Selection};
pub use delete::Backspace;
pub use document::Document;
pub use encode::encode;
pub use error::{ComposerError, Result};
pub use node::Node;
pub use sanitize::sanitize;
pub use session::{CopyFeedback, Session};
pub use style::{StyleCode, StyleKind};
