// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// Auto-wrap (DECAWM) ?7
///
/// On by default: writing past the right margin defers to the next printable
/// character, which wraps to the next line first.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub enum Decawm {
    #[default]
    AutoWrap,
    NoAutoWrap,
}

impl Decawm {
    #[must_use]
    pub const fn new(mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::AutoWrap,
            SetMode::DecRst => Self::NoAutoWrap,
        }
    }

    #[must_use]
    pub const fn enabled(&self) -> bool {
        matches!(self, Self::AutoWrap)
    }
}

impl ReportMode for Decawm {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::AutoWrap => String::from("\x1b[?7;1$y"),
                Self::NoAutoWrap => String::from("\x1b[?7;2$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[?7;1$y"),
                SetMode::DecRst => String::from("\x1b[?7;2$y"),
            },
        )
    }
}

impl fmt::Display for Decawm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoWrap => write!(f, "Autowrap Mode (DECAWM) Enabled"),
            Self::NoAutoWrap => write!(f, "Autowrap Mode (DECAWM) Disabled"),
        }
    }
}
