// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// Reverse wrap-around ?45: backspace at column 0 moves to the end of the
/// previous line.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub enum ReverseWrapAround {
    #[default]
    Disabled,
    Enabled,
}

impl ReverseWrapAround {
    #[must_use]
    pub const fn new(mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::Enabled,
            SetMode::DecRst => Self::Disabled,
        }
    }

    #[must_use]
    pub const fn enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl ReportMode for ReverseWrapAround {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::Disabled => String::from("\x1b[?45;2$y"),
                Self::Enabled => String::from("\x1b[?45;1$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[?45;1$y"),
                SetMode::DecRst => String::from("\x1b[?45;2$y"),
            },
        )
    }
}

impl fmt::Display for ReverseWrapAround {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Reverse Wrap-Around (?45) Disabled"),
            Self::Enabled => write!(f, "Reverse Wrap-Around (?45) Enabled"),
        }
    }
}
