// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// Origin mode (DECOM) ?6: cursor addressing is relative to the scroll
/// region and the cursor cannot leave it.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub enum Decom {
    #[default]
    NormalCursor,
    OriginMode,
}

impl Decom {
    #[must_use]
    pub const fn new(mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::OriginMode,
            SetMode::DecRst => Self::NormalCursor,
        }
    }

    #[must_use]
    pub const fn enabled(&self) -> bool {
        matches!(self, Self::OriginMode)
    }
}

impl ReportMode for Decom {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::NormalCursor => String::from("\x1b[?6;2$y"),
                Self::OriginMode => String::from("\x1b[?6;1$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[?6;1$y"),
                SetMode::DecRst => String::from("\x1b[?6;2$y"),
            },
        )
    }
}

impl fmt::Display for Decom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NormalCursor => write!(f, "Normal Cursor"),
            Self::OriginMode => write!(f, "Origin Mode"),
        }
    }
}
