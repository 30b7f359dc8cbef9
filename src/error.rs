//! Error types for the composer

use thiserror::Error;

/// Result type alias for composer operations
pub type Result<T> = std::result::Result<T, ComposerError>;

/// Composer error types
///
/// Tree transformations never produce these; malformed content is
/// normalized instead. Errors only come from the edges: config files,
/// the clipboard, and positions handed in by a caller.
#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Cannot write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    #[error("No node at path {0:?}")]
    InvalidPath(Vec<usize>),
}
