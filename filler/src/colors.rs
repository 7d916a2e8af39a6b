use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the seven colors a cell or a player can have.
///
/// On the wire a color is a lowercase hex string such as `"#ff0000"`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum Color {
    Red,
    Yellow,
    White,
    Green,
    Cyan,
    Blue,
    Magenta,
}

/// All colors, in the fixed order used for deterministic tie-breaking.
pub const PALETTE: [Color; 7] = [
    Color::Red,
    Color::Yellow,
    Color::White,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

impl Color {
    pub fn hex(self) -> &'static str {
        match self {
            Color::Red => "#ff0000",
            Color::Yellow => "#ffff00",
            Color::White => "#ffffff",
            Color::Green => "#00ff00",
            Color::Cyan => "#00ffff",
            Color::Blue => "#0000ff",
            Color::Magenta => "#ff00ff",
        }
    }

    /// Position in [`PALETTE`].
    pub fn palette_index(self) -> usize {
        self as usize
    }

    /// Single lowercase letter used when rendering a board.
    pub fn initial(self) -> char {
        match self {
            Color::Red => 'r',
            Color::Yellow => 'y',
            Color::White => 'w',
            Color::Green => 'g',
            Color::Cyan => 'c',
            Color::Blue => 'b',
            Color::Magenta => 'm',
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hex())
    }
}

/// The error type for the [`FromStr`] instance of [`Color`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorFromStrErr {
    MissingHash,
    NotInPalette(String),
}

impl std::error::Error for ColorFromStrErr {}

impl std::fmt::Display for ColorFromStrErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorFromStrErr::MissingHash => write!(f, "Color must start with '#'"),
            ColorFromStrErr::NotInPalette(s) => write!(f, "Color {} is not in the palette", s),
        }
    }
}

impl FromStr for Color {
    type Err = ColorFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with('#') {
            return Err(ColorFromStrErr::MissingHash);
        }
        PALETTE
            .into_iter()
            .find(|color| color.hex().eq_ignore_ascii_case(s))
            .ok_or_else(|| ColorFromStrErr::NotInPalette(String::from(s)))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorFromStrErr;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        String::from(color.hex())
    }
}

/// The colors that may be chosen on the next move, i.e. those held by
/// neither player, in palette order.
pub fn safe_colors(player_1: Color, player_2: Color) -> Vec<Color> {
    safe_colors_excluding(player_1, player_2, &[])
}

/// Like [`safe_colors()`], but also leaves out colors the server has already
/// refused during this turn.
pub fn safe_colors_excluding(player_1: Color, player_2: Color, rejected: &[Color]) -> Vec<Color> {
    PALETTE
        .into_iter()
        .filter(|&color| color != player_1 && color != player_2 && !rejected.contains(&color))
        .collect()
}
