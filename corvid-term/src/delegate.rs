// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use corvid_common::cursor::CursorVisualStyle;
use corvid_common::modes::mouse::{MouseEncoding, MouseTrack};

use crate::ansi_components::osc::{SemanticPrompt, TitleKind};

/// Inline image payload formats the core can frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageFormat {
    Sixel,
    /// iTerm2 OSC 1337 inline file; the payload is still base64.
    Iterm2,
}

/// The embedder-facing callback surface.
///
/// Every method has a no-op default so embedders implement only what they
/// render. Callbacks run synchronously, in byte order, on the thread that
/// called into the terminal; do not re-enter the terminal from inside one.
/// Return values are deliberately absent: the core never depends on the
/// embedder's answer.
#[allow(unused_variables)]
pub trait TerminalDelegate {
    /// Host-bound reply bytes (DSR, DA, mouse reports, paste, ...).
    fn send(&mut self, bytes: &[u8]) {}

    fn bell(&mut self) {}

    fn set_title(&mut self, kind: TitleKind, title: &str) {}

    fn set_cursor_style(&mut self, style: &CursorVisualStyle) {}

    fn cursor_visibility(&mut self, visible: bool) {}

    /// DECCOLM or other host-driven geometry requests. The embedder decides
    /// whether to honor it and then calls `set_size`.
    fn resize_request(&mut self, cols: usize, rows: usize) {}

    fn mouse_mode_changed(&mut self, track: &MouseTrack, encoding: &MouseEncoding) {}

    /// OSC 52 set. The payload is base64 exactly as the host sent it; trust
    /// policy (and decoding) belongs to the embedder.
    fn clipboard_set(&mut self, selection: &str, payload: &[u8]) {}

    /// OSC 52 query. An embedder that chooses to answer writes an OSC 52
    /// reply back through `feed`'s reply channel itself.
    fn clipboard_request(&mut self, selection: &str) {}

    /// Rows that left the top of the screen into scrollback since the last
    /// callback, for renderers that track their own history.
    fn lines_scrolled_out(&mut self, count: usize) {}

    /// Hit-testing aid: fired by `activate_hyperlink_at`.
    fn hyperlink_activated(&mut self, id: u32, uri: &str) {}

    fn show_image(&mut self, format: ImageFormat, width: usize, height: usize, data: &[u8]) {}

    /// OSC 7.
    fn working_directory_changed(&mut self, path: &str) {}

    /// OSC 133 shell-integration marks.
    fn semantic_prompt(&mut self, mark: SemanticPrompt) {}
}

/// A delegate that swallows everything; useful for tests and headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDelegate;

impl TerminalDelegate for NullDelegate {}
