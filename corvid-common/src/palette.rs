// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use conv2::ValueInto;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::colors::TerminalColor;

/// Concrete 8-bit-per-channel color value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse an X11 color specification as used by OSC 4/10/11/12.
    ///
    /// Accepted forms: `#RGB`, `#RRGGBB`, `#RRRGGGBBB`, `#RRRRGGGGBBBB` and
    /// `rgb:R/G/B` with 1 to 4 hex digits per component. Anything else is
    /// rejected; named X11 colors are not supported.
    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();

        if let Some(hex) = spec.strip_prefix('#') {
            let len = hex.len();
            if len == 0 || len % 3 != 0 || len > 12 {
                return None;
            }
            let per = len / 3;
            let r = scale_component(&hex[0..per])?;
            let g = scale_component(&hex[per..2 * per])?;
            let b = scale_component(&hex[2 * per..])?;
            return Some(Self::new(r, g, b));
        }

        if let Some(body) = spec.strip_prefix("rgb:") {
            let mut parts = body.split('/');
            let r = scale_component(parts.next()?)?;
            let g = scale_component(parts.next()?)?;
            let b = scale_component(parts.next()?)?;
            if parts.next().is_some() {
                return None;
            }
            return Some(Self::new(r, g, b));
        }

        None
    }

    /// Render in the 16-bit `rgb:rrrr/gggg/bbbb` form xterm uses in query
    /// replies.
    #[must_use]
    pub fn to_x11_string(self) -> String {
        format!(
            "rgb:{:04x}/{:04x}/{:04x}",
            u16::from(self.r) * 0x0101,
            u16::from(self.g) * 0x0101,
            u16::from(self.b) * 0x0101,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Scale a 1..=4 hex digit component to 8 bits.
fn scale_component(digits: &str) -> Option<u8> {
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let max = (1u32 << (4 * digits.len() as u32)) - 1;
    let scaled = (value * 255 + max / 2) / max;
    scaled.value_into().ok()
}

// xterm default values for the 16 base entries.
const BASE_COLORS: [Rgb; 16] = [
    Rgb::new(0x00, 0x00, 0x00),
    Rgb::new(0xcd, 0x00, 0x00),
    Rgb::new(0x00, 0xcd, 0x00),
    Rgb::new(0xcd, 0xcd, 0x00),
    Rgb::new(0x00, 0x00, 0xee),
    Rgb::new(0xcd, 0x00, 0xcd),
    Rgb::new(0x00, 0xcd, 0xcd),
    Rgb::new(0xe5, 0xe5, 0xe5),
    Rgb::new(0x7f, 0x7f, 0x7f),
    Rgb::new(0xff, 0x00, 0x00),
    Rgb::new(0x00, 0xff, 0x00),
    Rgb::new(0xff, 0xff, 0x00),
    Rgb::new(0x5c, 0x5c, 0xff),
    Rgb::new(0xff, 0x00, 0xff),
    Rgb::new(0x00, 0xff, 0xff),
    Rgb::new(0xff, 0xff, 0xff),
];

#[must_use]
pub const fn cube_component(value: usize, modifier: usize) -> usize {
    let i = ((value - 16) / modifier) % 6;

    if i == 0 { 0 } else { (14135 + 10280 * i) / 256 }
}

/// Default RGB value of a 256-palette slot: the 16 base colors, the 6x6x6
/// cube, then the grayscale ramp.
#[must_use]
pub fn default_palette_entry(index: usize) -> Rgb {
    match index {
        0..=15 => BASE_COLORS[index],
        232..=255 => {
            let value = (2056 + 2570 * (index - 232)) / 256;
            let value: u8 = value.value_into().unwrap_or(0);
            Rgb::new(value, value, value)
        }
        _ => {
            let r = cube_component(index, 36).value_into().unwrap_or(0);
            let g = cube_component(index, 6).value_into().unwrap_or(0);
            let b = cube_component(index, 1).value_into().unwrap_or(0);
            Rgb::new(r, g, b)
        }
    }
}

/// Live color table: 256 indexed entries plus the special slots the host can
/// retune with OSC 10/11/12 and reset with OSC 104/110/111/112.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
    default_foreground: Option<Rgb>,
    default_background: Option<Rgb>,
    default_cursor: Option<Rgb>,
    foreground: Option<Rgb>,
    background: Option<Rgb>,
    cursor: Option<Rgb>,
    selection: Option<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

impl Palette {
    #[must_use]
    pub fn new(
        default_foreground: Option<Rgb>,
        default_background: Option<Rgb>,
        default_cursor: Option<Rgb>,
    ) -> Self {
        Self {
            colors: (0..256).map(default_palette_entry).collect(),
            default_foreground,
            default_background,
            default_cursor,
            foreground: default_foreground,
            background: default_background,
            cursor: default_cursor,
            selection: None,
        }
    }

    #[must_use]
    pub fn get(&self, index: u8) -> Rgb {
        self.colors
            .get(usize::from(index))
            .copied()
            .unwrap_or_default()
    }

    pub fn set(&mut self, index: u8, color: Rgb) {
        if let Some(slot) = self.colors.get_mut(usize::from(index)) {
            *slot = color;
        }
    }

    pub fn reset(&mut self, index: u8) {
        self.set(index, default_palette_entry(usize::from(index)));
    }

    pub fn reset_all(&mut self) {
        self.colors = (0..256).map(default_palette_entry).collect();
        self.foreground = self.default_foreground;
        self.background = self.default_background;
        self.cursor = self.default_cursor;
        self.selection = None;
    }

    #[must_use]
    pub const fn foreground(&self) -> Option<Rgb> {
        self.foreground
    }

    #[must_use]
    pub const fn background(&self) -> Option<Rgb> {
        self.background
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<Rgb> {
        self.cursor
    }

    #[must_use]
    pub const fn selection(&self) -> Option<Rgb> {
        self.selection
    }

    pub const fn set_foreground(&mut self, color: Rgb) {
        self.foreground = Some(color);
    }

    pub const fn set_background(&mut self, color: Rgb) {
        self.background = Some(color);
    }

    pub const fn set_cursor(&mut self, color: Rgb) {
        self.cursor = Some(color);
    }

    pub const fn set_selection(&mut self, color: Rgb) {
        self.selection = Some(color);
    }

    pub const fn reset_foreground(&mut self) {
        self.foreground = self.default_foreground;
    }

    pub const fn reset_background(&mut self) {
        self.background = self.default_background;
    }

    pub const fn reset_cursor(&mut self) {
        self.cursor = self.default_cursor;
    }

    /// Resolve a cell color to a concrete value where one exists.
    ///
    /// `Default*` slots resolve only when the host (or config) pinned them;
    /// otherwise the embedder's theme decides and `None` is returned.
    #[must_use]
    pub fn color_for(&self, color: &TerminalColor) -> Option<Rgb> {
        match color {
            TerminalColor::Default | TerminalColor::DefaultUnderlineColor => self.foreground,
            TerminalColor::DefaultBackground => self.background,
            TerminalColor::DefaultCursorColor => self.cursor,
            TerminalColor::Custom(r, g, b) => Some(Rgb::new(*r, *g, *b)),
            other => other.ansi_index().map(|idx| self.get(idx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sharp_forms() {
        assert_eq!(Rgb::parse("#fff"), Some(Rgb::new(0xff, 0xff, 0xff)));
        assert_eq!(Rgb::parse("#ff0000"), Some(Rgb::new(0xff, 0, 0)));
        assert_eq!(Rgb::parse("#ffff00000000"), Some(Rgb::new(0xff, 0, 0)));
        assert_eq!(Rgb::parse("#ff00"), None);
        assert_eq!(Rgb::parse("#gg0000"), None);
    }

    #[test]
    fn parse_rgb_forms() {
        assert_eq!(Rgb::parse("rgb:ff/00/00"), Some(Rgb::new(0xff, 0, 0)));
        assert_eq!(Rgb::parse("rgb:ffff/0000/0000"), Some(Rgb::new(0xff, 0, 0)));
        assert_eq!(Rgb::parse("rgb:f/f/f"), Some(Rgb::new(0xff, 0xff, 0xff)));
        assert_eq!(Rgb::parse("rgb:ff/00"), None);
        assert_eq!(Rgb::parse("rgb:ff/00/00/00"), None);
    }

    #[test]
    fn x11_reply_form_is_sixteen_bit() {
        assert_eq!(
            Rgb::new(0xff, 0x00, 0x80).to_x11_string(),
            "rgb:ffff/0000/8080"
        );
    }

    #[test]
    fn default_entries_match_known_values() {
        assert_eq!(default_palette_entry(1), Rgb::new(0xcd, 0, 0));
        assert_eq!(default_palette_entry(16), Rgb::new(0, 0, 0));
        assert_eq!(default_palette_entry(231), Rgb::new(0xff, 0xff, 0xff));
        assert_eq!(default_palette_entry(255), Rgb::new(0xee, 0xee, 0xee));
    }

    #[test]
    fn set_and_reset_round_trip() {
        let mut palette = Palette::default();
        let before = palette.get(100);
        palette.set(100, Rgb::new(1, 2, 3));
        assert_eq!(palette.get(100), Rgb::new(1, 2, 3));
        palette.reset(100);
        assert_eq!(palette.get(100), before);
    }

    #[test]
    fn color_for_resolves_named_and_custom() {
        let palette = Palette::default();
        assert_eq!(
            palette.color_for(&TerminalColor::Red),
            Some(Rgb::new(0xcd, 0, 0))
        );
        assert_eq!(
            palette.color_for(&TerminalColor::Custom(9, 8, 7)),
            Some(Rgb::new(9, 8, 7))
        );
        assert_eq!(palette.color_for(&TerminalColor::Default), None);
    }
}
