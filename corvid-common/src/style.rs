// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Style bits of a cell attribute, packed so the attribute stays small
    /// enough to copy freely.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct StyleFlags: u16 {
        const BOLD          = 1;
        const FAINT         = 1 << 1;
        const ITALIC        = 1 << 2;
        const BLINK         = 1 << 3;
        const INVERSE       = 1 << 4;
        const HIDDEN        = 1 << 5;
        const STRIKETHROUGH = 1 << 6;
        const OVERLINE      = 1 << 7;
    }
}

/// Underline rendition selected by SGR 4 and its `4:x` sub-parameter form.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

impl UnderlineStyle {
    /// `4:0` through `4:5`; out-of-range sub-parameters fall back to single.
    #[must_use]
    pub const fn from_subparam(value: usize) -> Self {
        match value {
            0 => Self::None,
            2 => Self::Double,
            3 => Self::Curly,
            4 => Self::Dotted,
            5 => Self::Dashed,
            _ => Self::Single,
        }
    }
}

impl fmt::Display for UnderlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Single => write!(f, "single"),
            Self::Double => write!(f, "double"),
            Self::Curly => write!(f, "curly"),
            Self::Dotted => write!(f, "dotted"),
            Self::Dashed => write!(f, "dashed"),
        }
    }
}
