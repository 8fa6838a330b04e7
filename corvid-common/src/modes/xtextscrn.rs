// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// Alternate screen (`XT_EXTSCRN`) ?1049
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub enum XtExtscrn {
    /// Switch to the normal screen buffer and restore the saved cursor.
    #[default]
    Primary,
    /// Save the cursor, switch to the alternate screen buffer, clear it.
    Alternate,
}

impl XtExtscrn {
    #[must_use]
    pub const fn new(mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::Alternate,
            SetMode::DecRst => Self::Primary,
        }
    }
}

impl ReportMode for XtExtscrn {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::Primary => String::from("\x1b[?1049;2$y"),
                Self::Alternate => String::from("\x1b[?1049;1$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[?1049;1$y"),
                SetMode::DecRst => String::from("\x1b[?1049;2$y"),
            },
        )
    }
}

impl fmt::Display for XtExtscrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "Primary Screen (?1049)"),
            Self::Alternate => write!(f, "Alternate Screen (?1049)"),
        }
    }
}
