// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// Line feed / new line mode (LNM), ANSI mode 20. When set, LF implies CR.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub enum Lnm {
    #[default]
    LineFeed,
    NewLine,
}

impl Lnm {
    #[must_use]
    pub const fn new(mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::NewLine,
            SetMode::DecRst => Self::LineFeed,
        }
    }

    #[must_use]
    pub const fn implies_carriage_return(&self) -> bool {
        matches!(self, Self::NewLine)
    }
}

impl ReportMode for Lnm {
    // ANSI mode: no '?' prefix in the report.
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::LineFeed => String::from("\x1b[20;2$y"),
                Self::NewLine => String::from("\x1b[20;1$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[20;1$y"),
                SetMode::DecRst => String::from("\x1b[20;2$y"),
            },
        )
    }
}

impl fmt::Display for Lnm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineFeed => write!(f, "Line Feed Mode (LNM)"),
            Self::NewLine => write!(f, "New Line Mode (LNM)"),
        }
    }
}
