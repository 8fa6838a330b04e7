// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

use crate::{errors::TerminalError, palette::Rgb};

pub const DEFAULT_WIDTH: usize = 80;
pub const DEFAULT_HEIGHT: usize = 24;
pub const DEFAULT_SCROLLBACK: usize = 4000;

/// East-Asian Ambiguous rendering choice.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum AmbiguousWidth {
    #[default]
    Narrow,
    Wide,
}

/// Constructor options for a terminal core instance.
///
/// Serializable so embedders can persist profiles; all fields have sensible
/// defaults and `validate` enforces the hard requirements.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub cols: usize,
    pub rows: usize,
    /// History line cap for the normal buffer; 0 disables scrollback.
    pub scrollback_max: usize,
    pub ambiguous_width: AmbiguousWidth,
    /// Reflow soft-wrapped paragraphs when the width changes. Off by
    /// default; the default resize policy is hard truncation with storage
    /// preserved.
    pub rewrap_on_resize: bool,
    /// Honor single-byte C1 controls (0x80..=0x9f) outside UTF-8 sequences.
    pub allow_8bit_controls: bool,
    /// Byte cap for accumulated OSC payloads.
    pub osc_cap: usize,
    /// Byte cap for accumulated DCS payloads (SIXEL needs headroom).
    pub dcs_cap: usize,
    pub default_fg: Option<Rgb>,
    pub default_bg: Option<Rgb>,
    pub default_cursor: Option<Rgb>,
    /// Characters that end a word for word-mode selection.
    pub word_delimiters: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_WIDTH,
            rows: DEFAULT_HEIGHT,
            scrollback_max: DEFAULT_SCROLLBACK,
            ambiguous_width: AmbiguousWidth::default(),
            rewrap_on_resize: false,
            allow_8bit_controls: false,
            osc_cap: 64 * 1024,
            dcs_cap: 1024 * 1024,
            default_fg: None,
            default_bg: None,
            default_cursor: None,
            word_delimiters: String::from(" \t'\"`()[]{}<>|;:,"),
        }
    }
}

impl TerminalConfig {
    /// # Errors
    /// Returns `TerminalError::InvalidArgument` for a zero-sized grid or
    /// zero-capacity string buffers.
    pub fn validate(&self) -> Result<(), TerminalError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(TerminalError::InvalidArgument(format!(
                "grid size must be non-zero (got {}x{})",
                self.cols, self.rows
            )));
        }

        if self.osc_cap == 0 || self.dcs_cap == 0 {
            return Err(TerminalError::InvalidArgument(
                "string buffer caps must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub const fn ambiguous_is_wide(&self) -> bool {
        matches!(self.ambiguous_width, AmbiguousWidth::Wide)
    }
}
