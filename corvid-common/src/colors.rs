// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt;

/// A color as carried on a cell attribute.
///
/// `Default*` variants are unresolved slots the embedder themes (or the
/// palette resolves when the host changed them via OSC 10/11/12).
/// `Palette` is a 256-color index resolved through the live palette so that
/// OSC 4 edits take effect. `Custom` is direct truecolor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TerminalColor {
    Default,
    DefaultBackground,
    DefaultUnderlineColor,
    DefaultCursorColor,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Palette(u8),
    Custom(u8, u8, u8),
}

impl TerminalColor {
    /// Map a 0..=15 ANSI index to its named variant.
    #[must_use]
    pub const fn from_ansi_index(index: u8) -> Self {
        match index {
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Yellow,
            4 => Self::Blue,
            5 => Self::Magenta,
            6 => Self::Cyan,
            7 => Self::White,
            8 => Self::BrightBlack,
            9 => Self::BrightRed,
            10 => Self::BrightGreen,
            11 => Self::BrightYellow,
            12 => Self::BrightBlue,
            13 => Self::BrightMagenta,
            14 => Self::BrightCyan,
            15 => Self::BrightWhite,
            _ => Self::Black,
        }
    }

    /// The palette slot a named variant occupies, if it has one.
    #[must_use]
    pub const fn ansi_index(self) -> Option<u8> {
        match self {
            Self::Black => Some(0),
            Self::Red => Some(1),
            Self::Green => Some(2),
            Self::Yellow => Some(3),
            Self::Blue => Some(4),
            Self::Magenta => Some(5),
            Self::Cyan => Some(6),
            Self::White => Some(7),
            Self::BrightBlack => Some(8),
            Self::BrightRed => Some(9),
            Self::BrightGreen => Some(10),
            Self::BrightYellow => Some(11),
            Self::BrightBlue => Some(12),
            Self::BrightMagenta => Some(13),
            Self::BrightCyan => Some(14),
            Self::BrightWhite => Some(15),
            Self::Palette(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for TerminalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Default => "default",
            Self::DefaultBackground => "default background",
            Self::DefaultUnderlineColor => "default underline color",
            Self::DefaultCursorColor => "default cursor color",
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
            Self::BrightBlack => "bright black",
            Self::BrightRed => "bright red",
            Self::BrightGreen => "bright green",
            Self::BrightYellow => "bright yellow",
            Self::BrightBlue => "bright blue",
            Self::BrightMagenta => "bright magenta",
            Self::BrightCyan => "bright cyan",
            Self::BrightWhite => "bright white",
            Self::Palette(n) => {
                return write!(f, "palette({n})");
            }
            Self::Custom(r, g, b) => {
                return write!(f, "rgb({r}, {g}, {b})");
            }
        };

        f.write_str(s)
    }
}

impl std::str::FromStr for TerminalColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let ret = match s {
            "default" => Self::Default,
            "default background" => Self::DefaultBackground,
            "default underline color" => Self::DefaultUnderlineColor,
            "default cursor color" => Self::DefaultCursorColor,
            "black" => Self::Black,
            "red" => Self::Red,
            "green" => Self::Green,
            "yellow" => Self::Yellow,
            "blue" => Self::Blue,
            "magenta" => Self::Magenta,
            "cyan" => Self::Cyan,
            "white" => Self::White,
            "bright black" => Self::BrightBlack,
            "bright red" => Self::BrightRed,
            "bright green" => Self::BrightGreen,
            "bright yellow" => Self::BrightYellow,
            "bright blue" => Self::BrightBlue,
            "bright magenta" => Self::BrightMagenta,
            "bright cyan" => Self::BrightCyan,
            "bright white" => Self::BrightWhite,
            _ => return Err(anyhow::anyhow!("Invalid color string")),
        };
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ansi_index_round_trips() {
        for idx in 0u8..16 {
            let color = TerminalColor::from_ansi_index(idx);
            assert_eq!(color.ansi_index(), Some(idx));
        }
    }

    #[test]
    fn display_and_from_str_agree_for_named_colors() {
        for idx in 0u8..16 {
            let color = TerminalColor::from_ansi_index(idx);
            let parsed = TerminalColor::from_str(&color.to_string());
            assert_eq!(parsed.ok(), Some(color));
        }
    }

    #[test]
    fn unresolved_slots_have_no_index() {
        assert_eq!(TerminalColor::Default.ansi_index(), None);
        assert_eq!(TerminalColor::Custom(1, 2, 3).ansi_index(), None);
        assert_eq!(TerminalColor::Palette(240).ansi_index(), Some(240));
    }
}
