// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// Cursor keys mode (DECCKM) ?1: arrow keys send SS3 sequences when set.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub enum Decckm {
    #[default]
    Ansi,
    Application,
}

impl Decckm {
    #[must_use]
    pub const fn new(mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::Application,
            SetMode::DecRst => Self::Ansi,
        }
    }

    #[must_use]
    pub const fn is_application(&self) -> bool {
        matches!(self, Self::Application)
    }
}

impl ReportMode for Decckm {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::Ansi => String::from("\x1b[?1;2$y"),
                Self::Application => String::from("\x1b[?1;1$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[?1;1$y"),
                SetMode::DecRst => String::from("\x1b[?1;2$y"),
            },
        )
    }
}

impl fmt::Display for Decckm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ansi => write!(f, "Cursor Keys Mode (DECCKM) ANSI"),
            Self::Application => write!(f, "Cursor Keys Mode (DECCKM) Application"),
        }
    }
}
