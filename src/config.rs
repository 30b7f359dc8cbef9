//! Configuration file support
//!
//! Loads settings from ~/.ansi-composer.toml (or
//! %USERPROFILE%\.ansi-composer.toml on Windows)
//!
//! Example:
//! ```toml
//! # ansi-composer configuration
//! fence-language = "ansi"
//! copy-cooldown-ms = 2000
//! copy-label = "Copy to Discord"
//! copy-messages = ["Copied!", "Double Copy!", "Triple Copy!"]
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use toml::{Table, Value};
use tracing::warn;

use crate::error::Result;

const FILE_NAME: &str = ".ansi-composer.toml";

/// Messages shown for consecutive copies, one per streak step
const COPY_MESSAGES: &[&str] = &[
    "Copied!",
    "Double Copy!",
    "Triple Copy!",
    "Dominating!!",
    "Rampage!!",
    "Mega Copy!!",
    "Unstoppable!!",
    "Wicked Sick!!",
    "Monster Copy!!!",
    "GODLIKE!!!",
    "BEYOND GODLIKE!!!!",
    "RANDOM!!!!",
];

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Language tag on the exported code fence
    pub fence_language: String,
    /// How long copy feedback stays up
    pub copy_cooldown: Duration,
    /// Copy button label at rest
    pub copy_label: String,
    /// Labels for a streak of copies; the last one repeats
    pub copy_messages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fence_language: "ansi".to_string(),
            copy_cooldown: Duration::from_millis(2000),
            copy_label: "Copy to Discord".to_string(),
            copy_messages: COPY_MESSAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(FILE_NAME))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(FILE_NAME))
        }
    }

    /// Load configuration from file, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };

        match Self::from_toml(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                Self::default()
            }
        }
    }

    /// Build a configuration from file contents
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings = Self::parse(contents)?;
        let mut config = Self::default();
        config.apply(&settings);
        Ok(config)
    }

    /// Parse config file contents into a table
    fn parse(contents: &str) -> Result<Table> {
        Ok(contents.parse::<Table>()?)
    }

    /// Apply settings from a parsed table
    fn apply(&mut self, settings: &Table) {
        if let Some(value) = settings.get("fence-language").and_then(Value::as_str) {
            let value = value.trim();
            if !value.is_empty() && !value.contains(|c: char| c.is_whitespace() || c == '`') {
                self.fence_language = value.to_string();
            }
        }

        if let Some(ms) = settings.get("copy-cooldown-ms").and_then(Value::as_integer) {
            // Between 100ms and a minute
            let ms = ms.clamp(100, 60_000) as u64;
            self.copy_cooldown = Duration::from_millis(ms);
        }

        if let Some(value) = settings.get("copy-label").and_then(Value::as_str) {
            self.copy_label = value.to_string();
        }

        if let Some(values) = settings.get("copy-messages").and_then(Value::as_array) {
            let messages: Vec<String> = values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            if !messages.is_empty() {
                self.copy_messages = messages;
            }
        }
    }

    /// Serialize the current configuration
    pub fn to_toml(&self) -> Result<String> {
        let mut table = Table::new();
        table.insert(
            "fence-language".to_string(),
            Value::String(self.fence_language.clone()),
        );
        let ms = i64::try_from(self.copy_cooldown.as_millis()).unwrap_or(i64::MAX);
        table.insert("copy-cooldown-ms".to_string(), Value::Integer(ms));
        table.insert("copy-label".to_string(), Value::String(self.copy_label.clone()));
        table.insert(
            "copy-messages".to_string(),
            Value::Array(
                self.copy_messages
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect(),
            ),
        );
        Ok(format!(
            "# ansi-composer configuration\n# Generated automatically\n\n{}",
            toml::to_string(&table)?
        ))
    }

    /// Save current configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            fs::write(path, self.to_toml()?)?;
        }
        Ok(())
    }
}
