// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt::Write as _;
use std::ops::Range;

use corvid_buffer::{
    buffer::{Buffer, BufferKind},
    row::{Row, RowRender},
    selection::{Selection, SelectionMode, SelectionPoint, SelectionTextOptions},
};
use corvid_common::{
    attribute::Attribute,
    charset::{CharacterSet, CharsetIndex},
    colors::TerminalColor,
    config::TerminalConfig,
    cursor::{CursorState, CursorVisualStyle, SavedCursor},
    errors::TerminalError,
    mode::{Mode, SetMode, TerminalModes},
    modes::{MouseModeNumber, ReportMode, mouse::MouseEncoding, xtextscrn::XtExtscrn},
    palette::{Palette, Rgb},
    sgr::SelectGraphicRendition,
    style::{StyleFlags, UnderlineStyle},
};

use crate::{
    ansi::{AnsiParser, TerminalCommand},
    ansi_components::osc::{
        ClipboardPayload, DynamicColorSlot, OscCommand, PaletteOp, TitleKind,
    },
    delegate::{ImageFormat, TerminalDelegate},
    input::{TerminalKey, encode_key},
    mouse::{MouseEvent, encode_mouse_event},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveBuffer {
    Normal,
    Alternate,
}

/// The sequence dispatcher: owns the two screen buffers, the full mode
/// state, and the reply channel back to the host.
///
/// Single-threaded by contract. Every entry point runs to completion on the
/// caller's thread; delegate callbacks fire synchronously in byte order.
pub struct Terminal<D: TerminalDelegate> {
    config: TerminalConfig,
    parser: AnsiParser,

    normal: Buffer,
    alternate: Buffer,
    active: ActiveBuffer,

    modes: TerminalModes,
    keypad_application: bool,

    charsets: [CharacterSet; 4],
    gl: CharsetIndex,
    gr: CharsetIndex,
    single_shift: Option<CharsetIndex>,

    attr: Attribute,
    palette: Palette,
    cursor_style: CursorVisualStyle,

    title: String,
    icon_title: String,

    /// OSC 8 registry; a cell's `url_id` is an index + 1 into this.
    url_table: Vec<String>,
    active_url: Option<u32>,

    selection: Option<Selection>,

    reply: Vec<u8>,
    delegate: D,
}

impl<D: TerminalDelegate> Terminal<D> {
    /// # Errors
    /// `TerminalError::InvalidArgument` when the configuration fails
    /// validation (zero-sized grid, zero string caps).
    pub fn new(config: TerminalConfig, delegate: D) -> Result<Self, TerminalError> {
        config.validate()?;

        let mut normal = Buffer::new(
            config.cols,
            config.rows,
            BufferKind::Primary,
            config.scrollback_max,
        );
        let mut alternate = Buffer::new(config.cols, config.rows, BufferKind::Alternate, 0);
        for buffer in [&mut normal, &mut alternate] {
            buffer.set_ambiguous_wide(config.ambiguous_is_wide());
            buffer.set_rewrap_on_resize(config.rewrap_on_resize);
        }

        Ok(Self {
            parser: AnsiParser::new(config.osc_cap, config.dcs_cap, config.allow_8bit_controls),
            palette: Palette::new(config.default_fg, config.default_bg, config.default_cursor),
            config,
            normal,
            alternate,
            active: ActiveBuffer::Normal,
            modes: TerminalModes::default(),
            keypad_application: false,
            charsets: [CharacterSet::UsAscii; 4],
            gl: CharsetIndex::G0,
            gr: CharsetIndex::G2,
            single_shift: None,
            attr: Attribute::default(),
            cursor_style: CursorVisualStyle::default(),
            title: String::new(),
            icon_title: String::new(),
            url_table: Vec::new(),
            active_url: None,
            selection: None,
            reply: Vec::new(),
            delegate,
        })
    }

    // ------------------------------------------------------------------
    // Embedder entry points
    // ------------------------------------------------------------------

    /// Consume host output. All parsing, state mutation and delegate
    /// callbacks happen before this returns.
    pub fn feed(&mut self, bytes: &[u8]) {
        let commands = self.parser.push(bytes);
        for command in commands {
            self.apply(command);
        }

        let scrolled_out = self.normal.take_scrolled_out();
        if scrolled_out > 0 {
            self.delegate.lines_scrolled_out(scrolled_out);
        }

        if self
            .selection
            .as_ref()
            .is_some_and(|s| s.is_orphaned(&self.normal))
        {
            self.selection = None;
        }

        self.flush_replies();
    }

    /// Change the grid size on both buffers.
    ///
    /// # Errors
    /// `TerminalError::InvalidArgument` for a zero dimension.
    pub fn set_size(&mut self, cols: usize, rows: usize) -> Result<(), TerminalError> {
        if cols == 0 || rows == 0 {
            return Err(TerminalError::InvalidArgument(format!(
                "grid size must be non-zero (got {cols}x{rows})"
            )));
        }

        self.normal.resize(cols, rows);
        self.alternate.resize(cols, rows);
        self.config.cols = cols;
        self.config.rows = rows;
        Ok(())
    }

    /// Encode a key press (honoring DECCKM / DECKPAM) and send it to the
    /// host.
    pub fn send_key(&mut self, key: &TerminalKey) {
        let bytes = encode_key(
            key,
            self.modes.cursor_key.is_application(),
            self.keypad_application,
        );
        self.respond(&bytes);
        self.flush_replies();
    }

    /// Report a mouse event under the active tracking mode and encoding.
    pub fn send_mouse(&mut self, event: &MouseEvent) {
        if let Some(bytes) =
            encode_mouse_event(&self.modes.mouse_tracking, &self.modes.mouse_encoding, event)
        {
            self.respond(&bytes);
            self.flush_replies();
        }
    }

    /// Deliver pasted text, framed with bracketed-paste markers when mode
    /// 2004 is set.
    pub fn send_paste(&mut self, text: &str) {
        if self.modes.bracketed_paste.enabled() {
            self.respond(b"\x1b[200~");
            self.respond(text.as_bytes());
            self.respond(b"\x1b[201~");
        } else {
            self.respond(text.as_bytes());
        }
        self.flush_replies();
    }

    /// Focus in/out reports (mode 1004).
    pub fn focus_changed(&mut self, focused: bool) {
        if self.modes.focus_reporting.enabled() {
            self.respond(if focused { b"\x1b[I" } else { b"\x1b[O" });
            self.flush_replies();
        }
    }

    // ------------------------------------------------------------------
    // Grid access
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn active_buffer(&self) -> &Buffer {
        match self.active {
            ActiveBuffer::Normal => &self.normal,
            ActiveBuffer::Alternate => &self.alternate,
        }
    }

    const fn active_buffer_mut(&mut self) -> &mut Buffer {
        match self.active {
            ActiveBuffer::Normal => &mut self.normal,
            ActiveBuffer::Alternate => &mut self.alternate,
        }
    }

    #[must_use]
    pub fn line(&self, y: usize) -> Option<&Row> {
        self.active_buffer().line(y)
    }

    #[must_use]
    pub fn dirty_rows(&self) -> Vec<Range<usize>> {
        self.active_buffer().dirty_rows()
    }

    pub fn clear_dirty(&mut self) {
        self.active_buffer_mut().clear_dirty();
    }

    #[must_use]
    pub const fn cursor(&self) -> &CursorState {
        self.active_buffer().cursor()
    }

    #[must_use]
    pub const fn cursor_visible(&self) -> bool {
        self.modes.show_cursor.visible()
    }

    #[must_use]
    pub const fn is_alternate(&self) -> bool {
        matches!(self.active, ActiveBuffer::Alternate)
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn icon_title(&self) -> &str {
        &self.icon_title
    }

    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub const fn modes(&self) -> &TerminalModes {
        &self.modes
    }

    #[must_use]
    pub const fn current_attribute(&self) -> &Attribute {
        &self.attr
    }

    #[must_use]
    pub const fn config(&self) -> &TerminalConfig {
        &self.config
    }

    #[must_use]
    pub const fn delegate(&self) -> &D {
        &self.delegate
    }

    pub const fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    pub fn scroll_display_back(&mut self, lines: usize) {
        self.active_buffer_mut().scroll_viewport_back(lines);
    }

    pub fn scroll_display_forward(&mut self, lines: usize) {
        self.active_buffer_mut().scroll_viewport_forward(lines);
    }

    pub fn reset_display_offset(&mut self) {
        self.active_buffer_mut().reset_viewport();
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Start a selection at a viewport position.
    pub fn selection_begin(&mut self, mode: SelectionMode, col: usize, row: usize) {
        let point = SelectionPoint {
            row: self.active_buffer().stable_row_for_visible(row),
            col,
        };
        self.selection = Some(Selection::new(mode, point));
    }

    pub fn selection_extend(&mut self, col: usize, row: usize) {
        let point = SelectionPoint {
            row: self.active_buffer().stable_row_for_visible(row),
            col,
        };
        if let Some(selection) = self.selection.as_mut() {
            selection.extend(point);
        }
    }

    pub fn selection_clear(&mut self) {
        self.selection = None;
    }

    #[must_use]
    pub const fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Extract the selected text, or `None` without a live selection.
    #[must_use]
    pub fn selected_text(&self, options: SelectionTextOptions) -> Option<String> {
        let selection = self.selection.as_ref()?;
        let buffer = self.active_buffer();
        if selection.is_orphaned(buffer) {
            return None;
        }
        Some(selection.selected_text(buffer, &self.config.word_delimiters, options))
    }

    /// Fire the hyperlink callback for the cell at a viewport position, if
    /// it carries one.
    pub fn activate_hyperlink_at(&mut self, col: usize, row: usize) {
        let buffer = self.active_buffer();
        let id = buffer
            .row_by_stable_id(buffer.stable_row_for_visible(row))
            .and_then(|r| r.get(col))
            .and_then(|cell| cell.attr().url_id);

        if let Some(id) = id {
            let uri = self
                .url_table
                .get(id as usize - 1)
                .cloned()
                .unwrap_or_default();
            self.delegate.hyperlink_activated(id, &uri);
        }
    }

    // ------------------------------------------------------------------
    // Command dispatch
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn apply(&mut self, command: TerminalCommand) {
        match command {
            TerminalCommand::Text(text) => self.print_text(&text),
            TerminalCommand::Bell => self.delegate.bell(),
            TerminalCommand::Backspace => {
                let reverse = self.modes.reverse_wrap_around.enabled();
                self.active_buffer_mut().backspace(reverse);
            }
            TerminalCommand::Tab => self.active_buffer_mut().tab_forward(1),
            TerminalCommand::LineFeed => {
                self.active_buffer_mut().index();
                if self.modes.line_feed.implies_carriage_return() {
                    self.active_buffer_mut().carriage_return();
                }
            }
            TerminalCommand::CarriageReturn => self.active_buffer_mut().carriage_return(),
            TerminalCommand::ShiftIn => self.gl = CharsetIndex::G0,
            TerminalCommand::ShiftOut => self.gl = CharsetIndex::G1,
            TerminalCommand::SingleShiftG2 => self.single_shift = Some(CharsetIndex::G2),
            TerminalCommand::SingleShiftG3 => self.single_shift = Some(CharsetIndex::G3),
            TerminalCommand::Index => self.active_buffer_mut().index(),
            TerminalCommand::ReverseIndex => self.active_buffer_mut().reverse_index(),
            TerminalCommand::NextLine => self.active_buffer_mut().next_line(),
            TerminalCommand::SetTabStop => self.active_buffer_mut().set_tab_stop(),
            TerminalCommand::SaveCursor => self.save_cursor(),
            TerminalCommand::RestoreCursor => self.restore_cursor(),
            TerminalCommand::BackIndex => self.active_buffer_mut().back_index(),
            TerminalCommand::ForwardIndex => self.active_buffer_mut().forward_index(),
            TerminalCommand::KeypadApplicationMode => self.keypad_application = true,
            TerminalCommand::KeypadNumericMode => self.keypad_application = false,
            TerminalCommand::ResetDevice => self.reset(),
            TerminalCommand::ScreenAlignmentTest => {
                self.active_buffer_mut().screen_alignment_fill();
            }
            TerminalCommand::DoubleHeightTop => {
                self.active_buffer_mut().set_row_render(RowRender::DoubleHeightTop);
            }
            TerminalCommand::DoubleHeightBottom => {
                self.active_buffer_mut()
                    .set_row_render(RowRender::DoubleHeightBottom);
            }
            TerminalCommand::SingleWidthLine => {
                self.active_buffer_mut().set_row_render(RowRender::Single);
            }
            TerminalCommand::DoubleWidthLine => {
                self.active_buffer_mut().set_row_render(RowRender::DoubleWidth);
            }
            TerminalCommand::SevenBitControls | TerminalCommand::EightBitControls => {
                // replies stay 7-bit clean; input C1 recognition is a
                // constructor option
                debug!("S7C1T/S8C1T noted; replies remain 7-bit");
            }
            TerminalCommand::CursorToLowerLeft => {
                let rows = self.active_buffer().height();
                self.active_buffer_mut()
                    .set_cursor_pos(Some(0), Some(rows - 1));
            }
            TerminalCommand::DesignateCharset { slot, charset } => {
                self.charsets[slot.as_usize()] = charset;
            }
            TerminalCommand::SetCursorPos { x, y } => {
                self.active_buffer_mut().set_cursor_pos(
                    x.map(|v| v.saturating_sub(1)),
                    y.map(|v| v.saturating_sub(1)),
                );
            }
            TerminalCommand::SetCursorPosRel { x, y } => {
                self.active_buffer_mut().move_cursor_relative(
                    i64::from(x.unwrap_or(0)),
                    i64::from(y.unwrap_or(0)),
                );
            }
            TerminalCommand::CursorNextLine(n) => self.active_buffer_mut().cursor_next_line(n),
            TerminalCommand::CursorPreviousLine(n) => {
                self.active_buffer_mut().cursor_previous_line(n);
            }
            TerminalCommand::SetCursorCol(col) => {
                self.active_buffer_mut().set_cursor_col(col.saturating_sub(1));
            }
            TerminalCommand::SetCursorRow(row) => {
                self.active_buffer_mut().set_cursor_row(row.saturating_sub(1));
            }
            TerminalCommand::ClearDisplayFromCursorToEnd => {
                self.sync_pen();
                self.active_buffer_mut().erase_to_end_of_display();
            }
            TerminalCommand::ClearDisplayFromStartToCursor => {
                self.sync_pen();
                self.active_buffer_mut().erase_to_start_of_display();
            }
            TerminalCommand::ClearDisplay => {
                self.sync_pen();
                self.active_buffer_mut().erase_display();
            }
            TerminalCommand::ClearScrollbackAndDisplay => {
                self.sync_pen();
                let buffer = self.active_buffer_mut();
                buffer.erase_scrollback();
                buffer.erase_display();
            }
            TerminalCommand::ClearLineForwards => {
                self.sync_pen();
                self.active_buffer_mut().erase_line_to_end();
            }
            TerminalCommand::ClearLineBackwards => {
                self.sync_pen();
                self.active_buffer_mut().erase_line_to_start();
            }
            TerminalCommand::ClearLine => {
                self.sync_pen();
                self.active_buffer_mut().erase_line();
            }
            TerminalCommand::InsertLines(n) => self.active_buffer_mut().insert_lines(n),
            TerminalCommand::DeleteLines(n) => self.active_buffer_mut().delete_lines(n),
            TerminalCommand::InsertSpaces(n) => {
                self.sync_pen();
                self.active_buffer_mut().insert_spaces(n);
            }
            TerminalCommand::DeleteChars(n) => {
                self.sync_pen();
                self.active_buffer_mut().delete_chars(n);
            }
            TerminalCommand::EraseChars(n) => {
                self.sync_pen();
                self.active_buffer_mut().erase_chars(n);
            }
            TerminalCommand::ScrollUp(n) => self.active_buffer_mut().scroll_up(n),
            TerminalCommand::ScrollDown(n) => self.active_buffer_mut().scroll_down(n),
            TerminalCommand::TabForward(n) => self.active_buffer_mut().tab_forward(n),
            TerminalCommand::TabBackward(n) => self.active_buffer_mut().tab_backward(n),
            TerminalCommand::ClearTabStop(mode) => {
                let buffer = self.active_buffer_mut();
                if mode == 3 {
                    buffer.clear_all_tab_stops();
                } else {
                    buffer.clear_tab_stop();
                }
            }
            TerminalCommand::Sgr(renditions) => self.apply_sgr(&renditions),
            TerminalCommand::Mode(mode) => self.set_mode(mode),
            TerminalCommand::SetTopAndBottomMargins { top, bottom } => {
                let rows = self.active_buffer().height();
                let top = top.max(1) - 1;
                let bottom = if bottom == 0 { rows - 1 } else { bottom - 1 };
                self.active_buffer_mut().set_scroll_region(top, bottom);
            }
            TerminalCommand::CursorStyle(style) => {
                self.cursor_style = style.clone();
                self.delegate.set_cursor_style(&style);
            }
            TerminalCommand::RequestDeviceAttributes => self.report_da1(),
            TerminalCommand::RequestSecondaryDeviceAttributes => self.report_da2(),
            TerminalCommand::RequestTertiaryDeviceAttributes => self.report_da3(),
            TerminalCommand::RequestXtVersion => self.report_xt_version(),
            TerminalCommand::RequestStatus => self.respond(b"\x1b[0n"),
            TerminalCommand::RequestCursorPosition => self.report_cursor_position(),
            TerminalCommand::RequestPrinterStatus => self.respond(b"\x1b[?13n"),
            TerminalCommand::RequestUdkStatus => self.respond(b"\x1b[?20n"),
            TerminalCommand::RequestKeyboardStatus => self.respond(b"\x1b[?27;1;0;0n"),
            TerminalCommand::RequestMode { raw } => self.report_mode(&raw),
            TerminalCommand::RequestSetting(payload) => self.report_setting(&payload),
            TerminalCommand::ShowSixel {
                width,
                height,
                data,
            } => {
                self.delegate
                    .show_image(ImageFormat::Sixel, width, height, &data);
            }
            TerminalCommand::ApplicationProgramCommand(data) => {
                debug!("ignoring APC payload ({} bytes)", data.len());
            }
            TerminalCommand::Osc(osc) => self.handle_osc(osc),
            TerminalCommand::Invalid | TerminalCommand::Skipped => {}
            _ => {}
        }
    }

    /// Push the live attribute (plus the open hyperlink) into the buffer's
    /// pen before writing or erasing.
    fn sync_pen(&mut self) {
        let mut attr = self.attr;
        attr.url_id = self.active_url;
        self.active_buffer_mut().set_current_attr(attr);
    }

    fn print_text(&mut self, text: &str) {
        self.sync_pen();
        for ch in text.chars() {
            let translated = self.translate(ch);
            self.active_buffer_mut().write_char(translated);
        }
    }

    /// GL translation (plus a pending single shift) for printable ASCII.
    fn translate(&mut self, ch: char) -> char {
        if !('\u{20}'..='\u{7e}').contains(&ch) {
            return ch;
        }
        let slot = self.single_shift.take().unwrap_or(self.gl);
        self.charsets[slot.as_usize()].remap(ch)
    }

    // ------------------------------------------------------------------
    // SGR
    // ------------------------------------------------------------------

    fn apply_sgr(&mut self, renditions: &[SelectGraphicRendition]) {
        for rendition in renditions {
            match rendition {
                SelectGraphicRendition::Reset => self.attr.reset(),
                SelectGraphicRendition::Bold => self.attr.flags.insert(StyleFlags::BOLD),
                SelectGraphicRendition::Faint => self.attr.flags.insert(StyleFlags::FAINT),
                SelectGraphicRendition::NormalIntensity => {
                    self.attr.flags.remove(StyleFlags::BOLD | StyleFlags::FAINT);
                }
                SelectGraphicRendition::Italic => self.attr.flags.insert(StyleFlags::ITALIC),
                SelectGraphicRendition::NotItalic => self.attr.flags.remove(StyleFlags::ITALIC),
                SelectGraphicRendition::Underline(style) => self.attr.underline = *style,
                SelectGraphicRendition::NotUnderlined => {
                    self.attr.underline = UnderlineStyle::None;
                }
                SelectGraphicRendition::SlowBlink | SelectGraphicRendition::FastBlink => {
                    self.attr.flags.insert(StyleFlags::BLINK);
                }
                SelectGraphicRendition::NotBlinking => self.attr.flags.remove(StyleFlags::BLINK),
                SelectGraphicRendition::ReverseVideo => {
                    self.attr.flags.insert(StyleFlags::INVERSE);
                }
                SelectGraphicRendition::ResetReverseVideo => {
                    self.attr.flags.remove(StyleFlags::INVERSE);
                }
                SelectGraphicRendition::Conceal => self.attr.flags.insert(StyleFlags::HIDDEN),
                SelectGraphicRendition::Revealed => self.attr.flags.remove(StyleFlags::HIDDEN),
                SelectGraphicRendition::Strikethrough => {
                    self.attr.flags.insert(StyleFlags::STRIKETHROUGH);
                }
                SelectGraphicRendition::NotStrikethrough => {
                    self.attr.flags.remove(StyleFlags::STRIKETHROUGH);
                }
                SelectGraphicRendition::Overlined => self.attr.flags.insert(StyleFlags::OVERLINE),
                SelectGraphicRendition::NotOverlined => {
                    self.attr.flags.remove(StyleFlags::OVERLINE);
                }
                SelectGraphicRendition::Foreground(color) => self.attr.fg = *color,
                SelectGraphicRendition::Background(color) => self.attr.bg = *color,
                SelectGraphicRendition::UnderlineColor(color) => {
                    self.attr.underline_color = *color;
                }
                SelectGraphicRendition::ResetUnderlineColor => {
                    self.attr.underline_color = TerminalColor::DefaultUnderlineColor;
                }
                SelectGraphicRendition::Unknown(code) => {
                    debug!("ignoring unknown SGR {code}");
                }
                SelectGraphicRendition::NoOp => {}
            }
        }
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    fn set_mode(&mut self, mode: Mode) {
        match mode {
            Mode::Decckm(v) => self.modes.cursor_key = v,
            Mode::Decawm(v) => {
                let enabled = v.enabled();
                self.modes.autowrap = v;
                self.normal.set_autowrap(enabled);
                self.alternate.set_autowrap(enabled);
            }
            Mode::Deccolm(v) => {
                // classic DECCOLM side effects; the embedder decides
                // whether the width actually changes
                let rows = self.active_buffer().height();
                self.delegate.resize_request(v.columns(), rows);
                self.modes.column = v;
                let buffer = self.active_buffer_mut();
                buffer.set_scroll_region(0, rows.saturating_sub(1).max(1));
                buffer.erase_display();
                buffer.set_cursor_pos(Some(0), Some(0));
            }
            Mode::Decom(v) => {
                let enabled = v.enabled();
                self.modes.origin = v;
                self.normal.set_origin_mode(enabled);
                self.alternate.set_origin_mode(enabled);
                self.active_buffer_mut().set_cursor_pos(Some(0), Some(0));
            }
            Mode::Decscnm(v) => {
                self.modes.invert_screen = v;
                self.active_buffer_mut().mark_all_dirty();
            }
            Mode::Dectcem(v) => {
                self.delegate.cursor_visibility(v.visible());
                self.modes.show_cursor = v;
            }
            Mode::LineFeedMode(v) => self.modes.line_feed = v,
            Mode::XtCBlink(v) => self.modes.cursor_blink = v,
            Mode::XtExtscrn(XtExtscrn::Alternate) => self.enter_alternate(true),
            Mode::XtExtscrn(XtExtscrn::Primary) => self.leave_alternate(true),
            Mode::XtAltScreen(SetMode::DecSet) => self.enter_alternate(false),
            Mode::XtAltScreen(SetMode::DecRst) => self.leave_alternate(false),
            Mode::XtSaveCursor(SetMode::DecSet) => self.save_cursor(),
            Mode::XtSaveCursor(SetMode::DecRst) => self.restore_cursor(),
            Mode::FocusReporting(v) => self.modes.focus_reporting = v,
            Mode::BracketedPaste(v) => self.modes.bracketed_paste = v,
            Mode::ReverseWrapAround(v) => self.modes.reverse_wrap_around = v,
            Mode::MouseMode(track) => {
                self.modes.mouse_tracking = track;
                self.delegate
                    .mouse_mode_changed(&self.modes.mouse_tracking, &self.modes.mouse_encoding);
            }
            Mode::MouseEncoding { encoding, set } => {
                match set {
                    SetMode::DecSet => self.modes.mouse_encoding = encoding,
                    SetMode::DecRst => {
                        // resetting an encoding only matters if it is active
                        if self.modes.mouse_encoding == encoding {
                            self.modes.mouse_encoding = MouseEncoding::X11;
                        }
                    }
                }
                self.delegate
                    .mouse_mode_changed(&self.modes.mouse_tracking, &self.modes.mouse_encoding);
            }
            Mode::Unknown(unknown) => {
                debug!("unimplemented mode request: {unknown}");
            }
        }
    }

    // ------------------------------------------------------------------
    // Cursor save / alternate screen
    // ------------------------------------------------------------------

    fn save_cursor(&mut self) {
        let buffer = self.active_buffer();
        let saved = SavedCursor {
            pos: buffer.cursor().pos,
            pending_wrap: buffer.cursor().pending_wrap,
            attr: self.attr,
            origin_mode: buffer.origin_mode(),
            charsets: self.charsets,
            gl: self.gl,
            gr: self.gr,
        };
        self.active_buffer_mut().store_saved_cursor(saved);
    }

    fn restore_cursor(&mut self) {
        // DECRC without a prior DECSC restores power-up defaults
        let saved = self
            .active_buffer()
            .saved_cursor()
            .copied()
            .unwrap_or_default();
        self.attr = saved.attr;
        self.charsets = saved.charsets;
        self.gl = saved.gl;
        self.gr = saved.gr;
        self.active_buffer_mut().apply_saved_cursor(&saved);
    }

    fn enter_alternate(&mut self, save_cursor: bool) {
        if self.is_alternate() {
            return;
        }
        if save_cursor {
            self.save_cursor();
        }

        self.alternate.reset();
        self.alternate
            .set_autowrap(self.modes.autowrap.enabled());
        self.alternate
            .set_origin_mode(self.modes.origin.enabled());
        self.active = ActiveBuffer::Alternate;
        self.modes.alt_screen = XtExtscrn::Alternate;
        self.alternate.mark_all_dirty();
    }

    fn leave_alternate(&mut self, restore_cursor: bool) {
        if !self.is_alternate() {
            return;
        }
        self.active = ActiveBuffer::Normal;
        self.modes.alt_screen = XtExtscrn::Primary;
        if restore_cursor {
            self.restore_cursor();
        }
        self.normal.mark_all_dirty();
    }

    /// RIS: back to power-up state, geometry preserved.
    fn reset(&mut self) {
        self.normal.reset();
        self.alternate.reset();
        self.active = ActiveBuffer::Normal;
        self.modes = TerminalModes::default();
        self.keypad_application = false;
        self.charsets = [CharacterSet::UsAscii; 4];
        self.gl = CharsetIndex::G0;
        self.gr = CharsetIndex::G2;
        self.single_shift = None;
        self.attr = Attribute::default();
        self.cursor_style = CursorVisualStyle::default();
        self.palette.reset_all();
        self.url_table.clear();
        self.active_url = None;
        self.selection = None;
    }

    // ------------------------------------------------------------------
    // OSC
    // ------------------------------------------------------------------

    fn handle_osc(&mut self, command: OscCommand) {
        match command {
            OscCommand::SetTitle { kind, text } => {
                match kind {
                    TitleKind::Both => {
                        self.title.clone_from(&text);
                        self.icon_title.clone_from(&text);
                    }
                    TitleKind::Window => self.title.clone_from(&text),
                    TitleKind::Icon => self.icon_title.clone_from(&text),
                }
                self.delegate.set_title(kind, &text);
            }
            OscCommand::Palette(ops) => {
                for op in ops {
                    match op {
                        PaletteOp::Set(index, spec) => {
                            if let Some(rgb) = Rgb::parse(&spec) {
                                self.palette.set(index, rgb);
                            } else {
                                debug!("unparseable color spec {spec:?} for palette {index}");
                            }
                        }
                        PaletteOp::Query(index) => {
                            let color = self.palette.get(index).to_x11_string();
                            let reply = format!("\x1b]4;{index};{color}\x1b\\");
                            self.respond(reply.as_bytes());
                        }
                    }
                }
            }
            OscCommand::ResetPalette(indices) => {
                if indices.is_empty() {
                    for index in 0..=u8::MAX {
                        self.palette.reset(index);
                    }
                } else {
                    for index in indices {
                        self.palette.reset(index);
                    }
                }
            }
            OscCommand::SetDynamicColor { slot, spec } => {
                if let Some(rgb) = Rgb::parse(&spec) {
                    match slot {
                        DynamicColorSlot::Foreground => self.palette.set_foreground(rgb),
                        DynamicColorSlot::Background => self.palette.set_background(rgb),
                        DynamicColorSlot::Cursor => self.palette.set_cursor(rgb),
                    }
                } else {
                    debug!("unparseable dynamic color spec {spec:?}");
                }
            }
            OscCommand::QueryDynamicColor(slot) => {
                let color = match slot {
                    DynamicColorSlot::Foreground => {
                        self.palette.foreground().unwrap_or(Rgb::new(0xff, 0xff, 0xff))
                    }
                    DynamicColorSlot::Background => {
                        self.palette.background().unwrap_or(Rgb::new(0, 0, 0))
                    }
                    DynamicColorSlot::Cursor => {
                        self.palette.cursor().unwrap_or(Rgb::new(0xff, 0xff, 0xff))
                    }
                };
                let reply = format!(
                    "\x1b]{};{}\x1b\\",
                    slot.selector(),
                    color.to_x11_string()
                );
                self.respond(reply.as_bytes());
            }
            OscCommand::ResetDynamicColor(slot) => match slot {
                DynamicColorSlot::Foreground => self.palette.reset_foreground(),
                DynamicColorSlot::Background => self.palette.reset_background(),
                DynamicColorSlot::Cursor => self.palette.reset_cursor(),
            },
            OscCommand::SetWorkingDirectory(path) => {
                self.delegate.working_directory_changed(&path);
            }
            OscCommand::Hyperlink { id: _, uri } => {
                let index = match self.url_table.iter().position(|existing| existing == &uri) {
                    Some(index) => index,
                    None => {
                        self.url_table.push(uri);
                        self.url_table.len() - 1
                    }
                };
                self.active_url = u32::try_from(index + 1).ok();
            }
            OscCommand::HyperlinkEnd => self.active_url = None,
            OscCommand::Clipboard { selection, payload } => match payload {
                ClipboardPayload::Set(data) => self.delegate.clipboard_set(&selection, &data),
                ClipboardPayload::Query => self.delegate.clipboard_request(&selection),
            },
            OscCommand::SemanticPrompt(mark) => self.delegate.semantic_prompt(mark),
            OscCommand::ITerm2Image { args, data } => {
                debug!("iTerm2 inline file: {args}");
                self.delegate.show_image(ImageFormat::Iterm2, 0, 0, &data);
            }
            OscCommand::Unknown(raw) => debug!("ignoring unknown OSC: {raw}"),
        }
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    fn report_da1(&mut self) {
        // VT520-class with sixel, selective erase, ANSI color and text
        // locator support
        self.respond(b"\x1b[?65;1;6;9;15;22c");
    }

    fn report_da2(&mut self) {
        self.respond(b"\x1b[>41;377;0c");
    }

    fn report_da3(&mut self) {
        self.respond(b"\x1bP!|00000000\x1b\\");
    }

    fn report_xt_version(&mut self) {
        let reply = format!("\x1bP>|corvid {}\x1b\\", env!("CARGO_PKG_VERSION"));
        self.respond(reply.as_bytes());
    }

    fn report_cursor_position(&mut self) {
        let buffer = self.active_buffer();
        let cursor = buffer.cursor();
        let (top, _) = buffer.scroll_region();
        let origin = if buffer.origin_mode() { top } else { 0 };

        let row = cursor.pos.y - origin + 1;
        let col = cursor.pos.x.min(buffer.width() - 1) + 1;
        let reply = format!("\x1b[{row};{col}R");
        self.respond(reply.as_bytes());
    }

    fn report_mode(&mut self, raw: &[u8]) {
        let private = raw.first() == Some(&b'?');
        let digits = if private { &raw[1..] } else { raw };
        let Ok(number) = std::str::from_utf8(digits)
            .unwrap_or("")
            .parse::<usize>()
        else {
            return;
        };

        let reply = if private {
            match number {
                1 => self.modes.cursor_key.report(None),
                3 => self.modes.column.report(None),
                5 => self.modes.invert_screen.report(None),
                6 => self.modes.origin.report(None),
                7 => self.modes.autowrap.report(None),
                12 => self.modes.cursor_blink.report(None),
                25 => self.modes.show_cursor.report(None),
                45 => self.modes.reverse_wrap_around.report(None),
                1004 => self.modes.focus_reporting.report(None),
                1049 => self.modes.alt_screen.report(None),
                2004 => self.modes.bracketed_paste.report(None),
                9 | 1000 | 1002 | 1003 => {
                    let active = self.modes.mouse_tracking.mouse_mode_number() == number;
                    format!("\x1b[?{number};{}$y", if active { 1 } else { 2 })
                }
                1006 | 1015 | 1016 => {
                    let active = match number {
                        1006 => self.modes.mouse_encoding == MouseEncoding::Sgr,
                        1015 => self.modes.mouse_encoding == MouseEncoding::Urxvt,
                        _ => self.modes.mouse_encoding == MouseEncoding::SgrPixels,
                    };
                    format!("\x1b[?{number};{}$y", if active { 1 } else { 2 })
                }
                47 | 1047 => {
                    format!(
                        "\x1b[?{number};{}$y",
                        if self.is_alternate() { 1 } else { 2 }
                    )
                }
                1048 => {
                    let saved = self.active_buffer().saved_cursor().is_some();
                    format!("\x1b[?1048;{}$y", if saved { 1 } else { 2 })
                }
                _ => format!("\x1b[?{number};0$y"),
            }
        } else {
            match number {
                20 => self.modes.line_feed.report(None),
                _ => format!("\x1b[{number};0$y"),
            }
        };

        self.respond(reply.as_bytes());
    }

    /// DECRQSS replies: `DCS 1 $ r <setting> ST` for settings we can
    /// render, `DCS 0 $ r ST` otherwise.
    fn report_setting(&mut self, payload: &[u8]) {
        let reply = match payload {
            b"m" => format!("\x1bP1$r{}m\x1b\\", self.sgr_params_string()),
            b"r" => {
                let (top, bottom) = self.active_buffer().scroll_region();
                format!("\x1bP1$r{};{}r\x1b\\", top + 1, bottom + 1)
            }
            b" q" => format!("\x1bP1$r{} q\x1b\\", self.cursor_style.decscusr_param()),
            _ => {
                debug!(
                    "DECRQSS for unsupported setting {:?}",
                    String::from_utf8_lossy(payload)
                );
                String::from("\x1bP0$r\x1b\\")
            }
        };
        self.respond(reply.as_bytes());
    }

    /// Render the live attribute as SGR parameters, DECRQSS style.
    fn sgr_params_string(&self) -> String {
        let mut out = String::from("0");
        let flags = self.attr.flags;

        if flags.contains(StyleFlags::BOLD) {
            out.push_str(";1");
        }
        if flags.contains(StyleFlags::FAINT) {
            out.push_str(";2");
        }
        if flags.contains(StyleFlags::ITALIC) {
            out.push_str(";3");
        }
        match self.attr.underline {
            UnderlineStyle::None => {}
            UnderlineStyle::Single => out.push_str(";4"),
            UnderlineStyle::Double => out.push_str(";21"),
            UnderlineStyle::Curly => out.push_str(";4:3"),
            UnderlineStyle::Dotted => out.push_str(";4:4"),
            UnderlineStyle::Dashed => out.push_str(";4:5"),
        }
        if flags.contains(StyleFlags::BLINK) {
            out.push_str(";5");
        }
        if flags.contains(StyleFlags::INVERSE) {
            out.push_str(";7");
        }
        if flags.contains(StyleFlags::HIDDEN) {
            out.push_str(";8");
        }
        if flags.contains(StyleFlags::STRIKETHROUGH) {
            out.push_str(";9");
        }
        if flags.contains(StyleFlags::OVERLINE) {
            out.push_str(";53");
        }

        append_sgr_color(&mut out, &self.attr.fg, 30);
        append_sgr_color(&mut out, &self.attr.bg, 40);

        out
    }

    // ------------------------------------------------------------------
    // Reply plumbing
    // ------------------------------------------------------------------

    fn respond(&mut self, bytes: &[u8]) {
        self.reply.extend_from_slice(bytes);
    }

    fn flush_replies(&mut self) {
        if !self.reply.is_empty() {
            let pending = std::mem::take(&mut self.reply);
            self.delegate.send(&pending);
        }
    }
}

fn append_sgr_color(out: &mut String, color: &TerminalColor, base: usize) {
    match color {
        TerminalColor::Custom(r, g, b) => {
            let _ = write!(out, ";{};2;{r};{g};{b}", base + 8);
        }
        TerminalColor::Palette(index) => {
            let _ = write!(out, ";{};5;{index}", base + 8);
        }
        other => {
            if let Some(index) = other.ansi_index() {
                let index = usize::from(index);
                if index < 8 {
                    let _ = write!(out, ";{}", base + index);
                } else if index < 16 {
                    let _ = write!(out, ";{}", base + 60 + index - 8);
                }
            }
        }
    }
}
