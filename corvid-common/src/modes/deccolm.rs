// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// 132-column mode (DECCOLM) ?3.
///
/// A headless core has no physical width to change; the dispatcher forwards
/// the request to the embedder and applies the documented side effects
/// (clear screen, home cursor, reset margins).
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub enum Deccolm {
    #[default]
    Column80,
    Column132,
}

impl Deccolm {
    #[must_use]
    pub const fn new(mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::Column132,
            SetMode::DecRst => Self::Column80,
        }
    }

    #[must_use]
    pub const fn columns(&self) -> usize {
        match self {
            Self::Column80 => 80,
            Self::Column132 => 132,
        }
    }
}

impl ReportMode for Deccolm {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        override_mode.map_or_else(
            || match self {
                Self::Column80 => String::from("\x1b[?3;2$y"),
                Self::Column132 => String::from("\x1b[?3;1$y"),
            },
            |override_mode| match override_mode {
                SetMode::DecSet => String::from("\x1b[?3;1$y"),
                SetMode::DecRst => String::from("\x1b[?3;2$y"),
            },
        )
    }
}

impl fmt::Display for Deccolm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column80 => write!(f, "80 Column Mode (DECCOLM)"),
            Self::Column132 => write!(f, "132 Column Mode (DECCOLM)"),
        }
    }
}
