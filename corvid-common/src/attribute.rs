// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    colors::TerminalColor,
    style::{StyleFlags, UnderlineStyle},
};

/// The full graphic rendition of one cell.
///
/// Value type by design: rows store these inline, so everything is `Copy`
/// and the style bits are packed. `url_id` indexes the terminal's hyperlink
/// registry (OSC 8); zero is never allocated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Attribute {
    pub fg: TerminalColor,
    pub bg: TerminalColor,
    pub underline_color: TerminalColor,
    pub underline: UnderlineStyle,
    pub flags: StyleFlags,
    pub url_id: Option<u32>,
}

impl Default for Attribute {
    fn default() -> Self {
        Self {
            fg: TerminalColor::Default,
            bg: TerminalColor::DefaultBackground,
            underline_color: TerminalColor::DefaultUnderlineColor,
            underline: UnderlineStyle::None,
            flags: StyleFlags::empty(),
            url_id: None,
        }
    }
}

impl Attribute {
    /// SGR 0.
    pub fn reset(&mut self) {
        *self = Self {
            url_id: self.url_id,
            ..Self::default()
        };
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default() || Self { url_id: None, ..*self } == Self::default()
    }
}
