// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{colors::TerminalColor, style::UnderlineStyle};

/// One decoded SGR rendition.
///
/// The extended color selectors (38/48/58) and the `4:x` sub-parameter form
/// are resolved by the CSI parser before this enum is produced; `from_usize`
/// only handles the single-parameter codes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SelectGraphicRendition {
    #[default]
    NoOp,
    Reset,
    Bold,
    Faint,
    Italic,
    Underline(UnderlineStyle),
    SlowBlink,
    FastBlink,
    ReverseVideo,
    Conceal,
    Strikethrough,
    NormalIntensity,
    NotItalic,
    NotUnderlined,
    NotBlinking,
    ResetReverseVideo,
    Revealed,
    NotStrikethrough,
    Foreground(TerminalColor),
    Background(TerminalColor),
    UnderlineColor(TerminalColor),
    ResetUnderlineColor,
    Overlined,
    NotOverlined,
    Unknown(usize),
}

impl SelectGraphicRendition {
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn from_usize(val: usize) -> Self {
        match val {
            0 => Self::Reset,
            1 => Self::Bold,
            2 => Self::Faint,
            3 => Self::Italic,
            4 => Self::Underline(UnderlineStyle::Single),
            5 => Self::SlowBlink,
            6 => Self::FastBlink,
            7 => Self::ReverseVideo,
            8 => Self::Conceal,
            9 => Self::Strikethrough,
            21 => Self::Underline(UnderlineStyle::Double),
            22 => Self::NormalIntensity,
            23 => Self::NotItalic,
            24 => Self::NotUnderlined,
            25 => Self::NotBlinking,
            27 => Self::ResetReverseVideo,
            28 => Self::Revealed,
            29 => Self::NotStrikethrough,
            30..=37 => Self::Foreground(ansi_color(val - 30)),
            38 | 48 | 58 => {
                // Extended selectors never reach this path; the CSI layer
                // consumes their color arguments first.
                debug!("bare extended color selector {val} in SGR; ignoring");
                Self::NoOp
            }
            39 => Self::Foreground(TerminalColor::Default),
            40..=47 => Self::Background(ansi_color(val - 40)),
            49 => Self::Background(TerminalColor::DefaultBackground),
            53 => Self::Overlined,
            55 => Self::NotOverlined,
            59 => Self::ResetUnderlineColor,
            90..=97 => Self::Foreground(ansi_color(val - 90 + 8)),
            100..=107 => Self::Background(ansi_color(val - 100 + 8)),
            _ => Self::Unknown(val),
        }
    }
}

fn ansi_color(index: usize) -> TerminalColor {
    u8::try_from(index).map_or(TerminalColor::Default, TerminalColor::from_ansi_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_codes_map() {
        assert_eq!(
            SelectGraphicRendition::from_usize(0),
            SelectGraphicRendition::Reset
        );
        assert_eq!(
            SelectGraphicRendition::from_usize(1),
            SelectGraphicRendition::Bold
        );
        assert_eq!(
            SelectGraphicRendition::from_usize(4),
            SelectGraphicRendition::Underline(UnderlineStyle::Single)
        );
        assert_eq!(
            SelectGraphicRendition::from_usize(21),
            SelectGraphicRendition::Underline(UnderlineStyle::Double)
        );
    }

    #[test]
    fn color_ranges_map() {
        assert_eq!(
            SelectGraphicRendition::from_usize(31),
            SelectGraphicRendition::Foreground(TerminalColor::Red)
        );
        assert_eq!(
            SelectGraphicRendition::from_usize(44),
            SelectGraphicRendition::Background(TerminalColor::Blue)
        );
        assert_eq!(
            SelectGraphicRendition::from_usize(91),
            SelectGraphicRendition::Foreground(TerminalColor::BrightRed)
        );
        assert_eq!(
            SelectGraphicRendition::from_usize(104),
            SelectGraphicRendition::Background(TerminalColor::BrightBlue)
        );
        assert_eq!(
            SelectGraphicRendition::from_usize(39),
            SelectGraphicRendition::Foreground(TerminalColor::Default)
        );
    }

    #[test]
    fn unknown_codes_are_preserved() {
        assert_eq!(
            SelectGraphicRendition::from_usize(77),
            SelectGraphicRendition::Unknown(77)
        );
    }
}
