// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// Reverse video for the whole screen (DECSCNM) ?5
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub enum Decscnm {
    #[default]
    NormalDisplay,
    ReverseDisplay,
}

impl Decscnm {
    #[must_use]
    pub const fn new(mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::ReverseDisplay,
            SetMode::DecRst => Self::NormalDisplay,
        }
    }

    #[must_use]
    pub const fn reversed(&self) -> bool {
        matches!(self, Self::ReverseDisplay)
    }
}

impl ReportMode for Decscnm {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::NormalDisplay => String::from("\x1b[?5;2$y"),
                Self::ReverseDisplay => String::from("\x1b[?5;1$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[?5;1$y"),
                SetMode::DecRst => String::from("\x1b[?5;2$y"),
            },
        )
    }
}

impl fmt::Display for Decscnm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NormalDisplay => write!(f, "Normal Display (DECSCNM)"),
            Self::ReverseDisplay => write!(f, "Reverse Display (DECSCNM)"),
        }
    }
}
