// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// Text cursor enable (DECTCEM) ?25
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub enum Dectcem {
    #[default]
    Show,
    Hide,
}

impl Dectcem {
    #[must_use]
    pub const fn new(mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::Show,
            SetMode::DecRst => Self::Hide,
        }
    }

    #[must_use]
    pub const fn visible(&self) -> bool {
        matches!(self, Self::Show)
    }
}

impl ReportMode for Dectcem {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::Show => String::from("\x1b[?25;1$y"),
                Self::Hide => String::from("\x1b[?25;2$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[?25;1$y"),
                SetMode::DecRst => String::from("\x1b[?25;2$y"),
            },
        )
    }
}

impl fmt::Display for Dectcem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show => write!(f, "Show Cursor (DECTCEM)"),
            Self::Hide => write!(f, "Hide Cursor (DECTCEM)"),
        }
    }
}
