// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// Cursor blink (`XT_CBLINK`) ?12
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub enum XtCBlink {
    #[default]
    Steady,
    Blinking,
}

impl XtCBlink {
    #[must_use]
    pub const fn new(mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::Blinking,
            SetMode::DecRst => Self::Steady,
        }
    }
}

impl ReportMode for XtCBlink {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::Steady => String::from("\x1b[?12;2$y"),
                Self::Blinking => String::from("\x1b[?12;1$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[?12;1$y"),
                SetMode::DecRst => String::from("\x1b[?12;2$y"),
            },
        )
    }
}

impl fmt::Display for XtCBlink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Steady => write!(f, "Cursor Blink (?12) Steady"),
            Self::Blinking => write!(f, "Cursor Blink (?12) Blinking"),
        }
    }
}
