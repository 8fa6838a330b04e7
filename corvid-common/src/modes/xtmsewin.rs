// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// Focus reporting (`XT_MSE_WIN`) ?1004: the terminal sends `CSI I` / `CSI O`
/// when it gains or loses focus.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub enum XtMseWin {
    #[default]
    Disabled,
    Enabled,
}

impl XtMseWin {
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

impl ReportMode for XtMseWin {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::Disabled => String::from("\x1b[?1004;2$y"),
                Self::Enabled => String::from("\x1b[?1004;1$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[?1004;1$y"),
                SetMode::DecRst => String::from("\x1b[?1004;2$y"),
            },
        )
    }
}

impl fmt::Display for XtMseWin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Focus Reporting (?1004) Disabled"),
            Self::Enabled => write!(f, "Focus Reporting (?1004) Enabled"),
        }
    }
}
