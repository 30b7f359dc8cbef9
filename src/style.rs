//! Style codes and encoder style state
//!
//! A style span's tag is the decimal text of an ANSI SGR code. Only a
//! closed set of codes is recognized: 1 (bold), 4 (underline), 30-37
//! (foreground) and 40-47 (background).

use std::fmt;

/// Value the encoder uses for a style field nothing has set yet
pub const UNSET: u32 = 2;

/// Which field of the style state a code drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    /// Weight or decoration (codes below 30)
    Weight,
    /// Foreground color (30-39)
    Foreground,
    /// Background color (40 and up)
    Background,
}

impl StyleKind {
    /// Classify a numeric code by range
    pub fn of(code: u32) -> Self {
        match code {
            0..=29 => StyleKind::Weight,
            30..=39 => StyleKind::Foreground,
            _ => StyleKind::Background,
        }
    }
}

/// A recognized style code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleCode(u8);

impl StyleCode {
    pub const BOLD: StyleCode = StyleCode(1);
    pub const UNDERLINE: StyleCode = StyleCode(4);

    /// Create a style code, if it is in the recognized set
    pub fn new(code: u8) -> Option<Self> {
        matches!(code, 1 | 4 | 30..=37 | 40..=47).then_some(Self(code))
    }

    /// Parse a span tag. Only plain decimal digits are accepted.
    pub fn parse(tag: &str) -> Option<Self> {
        if tag.is_empty() || tag.len() > 3 || !tag.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        tag.parse::<u8>().ok().and_then(Self::new)
    }

    /// Numeric value
    pub fn value(self) -> u8 {
        self.0
    }

    /// Span tag text for this code
    pub fn tag(self) -> String {
        self.0.to_string()
    }

    /// Field this code drives
    pub fn kind(self) -> StyleKind {
        StyleKind::of(u32::from(self.0))
    }

    /// All recognized codes in ascending order
    pub fn all() -> impl Iterator<Item = StyleCode> {
        (0..=47u8).filter_map(Self::new)
    }

    /// Foreground color codes
    pub fn foregrounds() -> impl Iterator<Item = StyleCode> {
        Self::all().filter(|code| code.kind() == StyleKind::Foreground)
    }

    /// Background color codes
    pub fn backgrounds() -> impl Iterator<Item = StyleCode> {
        Self::all().filter(|code| code.kind() == StyleKind::Background)
    }

    /// Human-readable name, as Discord renders the code
    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "Bold",
            4 => "Underline",
            30 => "Dark Gray (33%)",
            31 => "Red",
            32 => "Yellowish Green",
            33 => "Gold",
            34 => "Light Blue",
            35 => "Pink",
            36 => "Teal",
            37 => "White",
            40 => "Blueish Black",
            41 => "Rust Brown",
            42 => "Gray (40%)",
            43 => "Gray (45%)",
            44 => "Light Gray (55%)",
            45 => "Blurple",
            46 => "Light Gray (60%)",
            47 => "Cream White",
            _ => "",
        }
    }

    /// Swatch color for color codes
    pub fn swatch(self) -> Option<&'static str> {
        let hex = match self.0 {
            30 => "#4f545c",
            31 => "#dc322f",
            32 => "#859900",
            33 => "#b58900",
            34 => "#268bd2",
            35 => "#d33682",
            36 => "#2aa198",
            37 => "#ffffff",
            40 => "#002b36",
            41 => "#cb4b16",
            42 => "#586e75",
            43 => "#657b83",
            44 => "#839496",
            45 => "#6c71c4",
            46 => "#93a1a1",
            47 => "#fdf6e3",
            _ => return None,
        };
        Some(hex)
    }
}

impl fmt::Display for StyleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One level of the encoder's style stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleState {
    /// Foreground color code
    pub fg: u32,
    /// Background color code
    pub bg: u32,
    /// Weight/decoration code
    pub st: u32,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            fg: UNSET,
            bg: UNSET,
            st: UNSET,
        }
    }
}

impl StyleState {
    /// Copy of this state with the field for `code` overridden
    pub fn with_code(mut self, code: u32) -> Self {
        match StyleKind::of(code) {
            StyleKind::Weight => self.st = code,
            StyleKind::Foreground => self.fg = code,
            StyleKind::Background => self.bg = code,
        }
        self
    }

    /// Color field reported alongside `code` when a span opens
    pub fn color_for(&self, code: u32) -> u32 {
        if StyleKind::of(code) == StyleKind::Background {
            self.bg
        } else {
            self.fg
        }
    }

    /// Check if nothing has been set
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
