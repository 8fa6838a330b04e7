// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::ops::Range;

use corvid_common::{
    attribute::Attribute,
    cursor::{CursorState, SavedCursor},
    width::{cluster_width, glyph_width},
};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    cell::Cell,
    row::{Row, RowRender},
};

/// Primary buffers keep scrollback; the alternate buffer never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Primary,
    Alternate,
}

/// A character grid with scrollback.
///
/// All rows live in one vector: history first, then exactly `height` screen
/// rows at the tail. The cursor is screen-relative with `0 <= y < height`
/// and `0 <= x <= width`; `x == width` only while a wrap is pending.
pub struct Buffer {
    rows: Vec<Row>,

    width: usize,
    height: usize,

    kind: BufferKind,

    cursor: CursorState,
    saved_cursor: Option<SavedCursor>,

    /// Attribute applied to everything written until the next SGR.
    current_attr: Attribute,

    ambiguous_wide: bool,
    autowrap: bool,
    origin_mode: bool,
    rewrap_on_resize: bool,

    /// DECSTBM margins, 0-indexed, inclusive, screen-relative.
    scroll_region_top: usize,
    scroll_region_bottom: usize,

    tab_stops: Vec<bool>,

    scrollback_limit: usize,

    /// How far the user has scrolled back. 0 = live bottom.
    scroll_offset: usize,

    /// Total rows ever evicted from the front; gives every row a stable
    /// absolute id (`rows_evicted + index`) that selections can hold onto.
    rows_evicted: u64,

    /// Rows pushed into scrollback since the embedder last asked.
    scrolled_out_pending: usize,

    /// Per-screen-row damage bits.
    dirty: Vec<bool>,
}

impl Buffer {
    #[must_use]
    pub fn new(width: usize, height: usize, kind: BufferKind, scrollback_limit: usize) -> Self {
        let scrollback_limit = match kind {
            BufferKind::Primary => scrollback_limit,
            BufferKind::Alternate => 0,
        };

        Self {
            rows: (0..height).map(|_| Row::new(width)).collect(),
            width,
            height,
            kind,
            cursor: CursorState::default(),
            saved_cursor: None,
            current_attr: Attribute::default(),
            ambiguous_wide: false,
            autowrap: true,
            origin_mode: false,
            rewrap_on_resize: false,
            scroll_region_top: 0,
            scroll_region_bottom: height.saturating_sub(1),
            tab_stops: default_tab_stops(width),
            scrollback_limit,
            scroll_offset: 0,
            rows_evicted: 0,
            scrolled_out_pending: 0,
            dirty: vec![true; height],
        }
    }

    /// Internal consistency checks for debug builds; a no-op in release.
    #[cfg(debug_assertions)]
    fn debug_assert_invariants(&self) {
        debug_assert!(
            self.rows.len() >= self.height,
            "buffer must always hold at least the screen rows (rows={}, height={})",
            self.rows.len(),
            self.height
        );
        debug_assert!(
            self.cursor.pos.y < self.height,
            "cursor.y {} out of bounds for height {}",
            self.cursor.pos.y,
            self.height
        );
        debug_assert!(
            self.cursor.pos.x <= self.width,
            "cursor.x {} out of bounds for width {}",
            self.cursor.pos.x,
            self.width
        );
        debug_assert!(
            self.scroll_region_top < self.scroll_region_bottom || self.height == 1,
            "degenerate scroll region [{}, {}]",
            self.scroll_region_top,
            self.scroll_region_bottom
        );
        debug_assert!(
            self.scroll_region_bottom < self.height,
            "scroll region bottom {} must be < height {}",
            self.scroll_region_bottom,
            self.height
        );
        if self.kind == BufferKind::Alternate {
            debug_assert_eq!(
                self.rows.len(),
                self.height,
                "alternate buffer must not accumulate scrollback"
            );
        } else {
            debug_assert!(
                self.rows.len() <= self.height + self.scrollback_limit,
                "scrollback overflow: {} rows, cap {}",
                self.rows.len(),
                self.height + self.scrollback_limit
            );
        }
    }

    #[cfg(not(debug_assertions))]
    #[inline]
    const fn debug_assert_invariants(&self) {}

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn kind(&self) -> BufferKind {
        self.kind
    }

    fn first_screen_row(&self) -> usize {
        self.rows.len() - self.height
    }

    fn abs_index(&self, y: usize) -> usize {
        self.first_screen_row() + y
    }

    /// A screen row, or `None` past the bottom.
    #[must_use]
    pub fn line(&self, y: usize) -> Option<&Row> {
        if y < self.height {
            self.rows.get(self.abs_index(y))
        } else {
            None
        }
    }

    fn row_mut(&mut self, y: usize) -> &mut Row {
        let idx = self.abs_index(y);
        self.mark_dirty(y);
        &mut self.rows[idx]
    }

    // ------------------------------------------------------------------
    // Damage tracking
    // ------------------------------------------------------------------

    fn mark_dirty(&mut self, y: usize) {
        if let Some(flag) = self.dirty.get_mut(y) {
            *flag = true;
        }
    }

    fn mark_region_dirty(&mut self, top: usize, bottom: usize) {
        for y in top..=bottom.min(self.height.saturating_sub(1)) {
            self.mark_dirty(y);
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|flag| *flag = true);
    }

    /// Damaged screen rows as merged ranges.
    #[must_use]
    pub fn dirty_rows(&self) -> Vec<Range<usize>> {
        let mut ranges: Vec<Range<usize>> = Vec::new();
        for (y, flag) in self.dirty.iter().enumerate() {
            if !flag {
                continue;
            }
            match ranges.last_mut() {
                Some(last) if last.end == y => last.end = y + 1,
                _ => ranges.push(y..y + 1),
            }
        }
        ranges
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|flag| *flag = false);
    }

    // ------------------------------------------------------------------
    // Knobs the dispatcher sets
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    #[must_use]
    pub const fn current_attr(&self) -> &Attribute {
        &self.current_attr
    }

    pub const fn set_current_attr(&mut self, attr: Attribute) {
        self.current_attr = attr;
    }

    #[must_use]
    pub const fn autowrap(&self) -> bool {
        self.autowrap
    }

    pub const fn set_autowrap(&mut self, enabled: bool) {
        self.autowrap = enabled;
    }

    #[must_use]
    pub const fn origin_mode(&self) -> bool {
        self.origin_mode
    }

    pub const fn set_origin_mode(&mut self, enabled: bool) {
        self.origin_mode = enabled;
    }

    pub const fn set_ambiguous_wide(&mut self, wide: bool) {
        self.ambiguous_wide = wide;
    }

    pub const fn set_rewrap_on_resize(&mut self, enabled: bool) {
        self.rewrap_on_resize = enabled;
    }

    #[must_use]
    pub const fn scroll_region(&self) -> (usize, usize) {
        (self.scroll_region_top, self.scroll_region_bottom)
    }

    // ------------------------------------------------------------------
    // Printing
    // ------------------------------------------------------------------

    /// Write one code point at the cursor, honoring wrap-pending semantics,
    /// wide-glyph wrapping and combining-mark attachment.
    pub fn write_char(&mut self, ch: char) {
        let w = glyph_width(ch, self.ambiguous_wide);
        self.write_with_width(ch, w);
    }

    fn write_with_width(&mut self, ch: char, w: usize) {
        if self.kind == BufferKind::Primary && self.scroll_offset != 0 {
            // output while scrolled back snaps the view to the live bottom
            self.scroll_offset = 0;
            self.mark_all_dirty();
        }

        if w == 0 {
            self.attach_zero_width(ch);
            return;
        }

        if w > self.width {
            debug!("dropping glyph {ch:?} wider than the grid");
            return;
        }

        if self.cursor.pending_wrap && self.autowrap {
            let y = self.cursor.pos.y;
            self.row_mut(y).wrapped = true;
            self.cursor.pos.x = 0;
            self.cursor.pending_wrap = false;
            self.index();
        }

        let mut x = self.cursor.pos.x.min(self.width.saturating_sub(1));

        // A wide glyph that cannot fit in the remaining columns wraps first
        // (leaving the edge blank) or, without autowrap, shifts left.
        if x + w > self.width {
            if self.autowrap {
                let y = self.cursor.pos.y;
                self.row_mut(y).wrapped = true;
                self.index();
                x = 0;
            } else {
                x = self.width - w;
            }
        }

        let y = self.cursor.pos.y;
        let attr = self.current_attr;
        self.row_mut(y).put_cell(x, Cell::new(ch, attr, w));

        let next = x + w;
        if self.autowrap {
            if next >= self.width {
                self.cursor.pos.x = self.width;
                self.cursor.pending_wrap = true;
            } else {
                self.cursor.pos.x = next;
            }
        } else {
            self.cursor.pos.x = next.min(self.width - 1);
        }

        self.debug_assert_invariants();
    }

    fn attach_zero_width(&mut self, ch: char) {
        let x = self.cursor.pos.x.min(self.width);
        if x == 0 {
            // nothing to attach to
            return;
        }
        let y = self.cursor.pos.y;
        self.row_mut(y).attach_combining(x - 1, ch);
    }

    /// Write a string, clustering graphemes so combining marks and ZWJ
    /// sequences land in the cell of their base character.
    pub fn insert_text(&mut self, text: &str) {
        for cluster in text.graphemes(true) {
            let mut chars = cluster.chars();
            let Some(base) = chars.next() else {
                continue;
            };

            let rest = chars.as_str();
            if rest.is_empty() {
                self.write_char(base);
                continue;
            }

            let w = cluster_width(cluster, self.ambiguous_wide);
            self.write_with_width(base, w);
            for mark in rest.chars() {
                self.write_with_width(mark, 0);
            }
        }
    }

    // ------------------------------------------------------------------
    // C0 handling
    // ------------------------------------------------------------------

    pub const fn carriage_return(&mut self) {
        self.cursor.pos.x = 0;
        self.cursor.pending_wrap = false;
    }

    pub fn backspace(&mut self, reverse_wrap: bool) {
        if self.cursor.pending_wrap {
            self.cursor.pending_wrap = false;
            self.cursor.pos.x = self.width.saturating_sub(1);
            return;
        }

        if self.cursor.pos.x > 0 {
            self.cursor.pos.x -= 1;
        } else if reverse_wrap && self.cursor.pos.y > 0 {
            self.cursor.pos.y -= 1;
            self.cursor.pos.x = self.width.saturating_sub(1);
        }
    }

    /// Line feed without the LNM carriage return.
    pub fn index(&mut self) {
        self.cursor.pending_wrap = false;
        if self.cursor.pos.y == self.scroll_region_bottom {
            self.scroll_up(1);
        } else if self.cursor.pos.y + 1 < self.height {
            self.cursor.pos.y += 1;
        }
        self.debug_assert_invariants();
    }

    pub fn reverse_index(&mut self) {
        self.cursor.pending_wrap = false;
        if self.cursor.pos.y == self.scroll_region_top {
            self.scroll_down(1);
        } else if self.cursor.pos.y > 0 {
            self.cursor.pos.y -= 1;
        }
    }

    pub fn next_line(&mut self) {
        self.index();
        self.carriage_return();
    }

    // ------------------------------------------------------------------
    // Tab stops
    // ------------------------------------------------------------------

    pub fn set_tab_stop(&mut self) {
        let x = self.cursor.pos.x.min(self.width.saturating_sub(1));
        if let Some(stop) = self.tab_stops.get_mut(x) {
            *stop = true;
        }
    }

    pub fn clear_tab_stop(&mut self) {
        let x = self.cursor.pos.x.min(self.width.saturating_sub(1));
        if let Some(stop) = self.tab_stops.get_mut(x) {
            *stop = false;
        }
    }

    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.iter_mut().for_each(|stop| *stop = false);
    }

    pub fn tab_forward(&mut self, count: usize) {
        self.cursor.pending_wrap = false;
        let mut x = self.cursor.pos.x.min(self.width.saturating_sub(1));
        for _ in 0..count.max(1) {
            let next = (x + 1..self.width).find(|&col| self.tab_stops[col]);
            x = next.unwrap_or(self.width.saturating_sub(1));
        }
        self.cursor.pos.x = x;
    }

    pub fn tab_backward(&mut self, count: usize) {
        self.cursor.pending_wrap = false;
        let mut x = self.cursor.pos.x.min(self.width.saturating_sub(1));
        for _ in 0..count.max(1) {
            let prev = (0..x).rev().find(|&col| self.tab_stops[col]);
            x = prev.unwrap_or(0);
        }
        self.cursor.pos.x = x;
    }

    // ------------------------------------------------------------------
    // Cursor motion
    // ------------------------------------------------------------------

    /// Absolute positioning (CUP/HVP/VPA/CHA), 0-based inputs. In origin
    /// mode the row is relative to the scroll region and clamped inside it.
    pub fn set_cursor_pos(&mut self, x: Option<usize>, y: Option<usize>) {
        self.cursor.pending_wrap = false;

        if let Some(y0) = y {
            let (base, max_y) = if self.origin_mode {
                (self.scroll_region_top, self.scroll_region_bottom)
            } else {
                (0, self.height - 1)
            };
            self.cursor.pos.y = (base + y0).min(max_y);
        }

        if let Some(x0) = x {
            self.cursor.pos.x = x0.min(self.width - 1);
        }

        self.debug_assert_invariants();
    }

    /// Relative motion (CUU/CUD/CUF/CUB). Vertical movement stops at the
    /// scroll-region margins when the cursor starts inside the region.
    pub fn move_cursor_relative(&mut self, dx: i64, dy: i64) {
        self.cursor.pending_wrap = false;

        let x = i64::try_from(self.cursor.pos.x.min(self.width - 1)).unwrap_or(0);
        let max_x = i64::try_from(self.width - 1).unwrap_or(0);
        self.cursor.pos.x = usize::try_from((x + dx).clamp(0, max_x)).unwrap_or(0);

        let top_limit = if self.cursor.pos.y >= self.scroll_region_top {
            self.scroll_region_top
        } else {
            0
        };
        let bottom_limit = if self.cursor.pos.y <= self.scroll_region_bottom {
            self.scroll_region_bottom
        } else {
            self.height - 1
        };

        let y = i64::try_from(self.cursor.pos.y).unwrap_or(0);
        let lo = i64::try_from(top_limit).unwrap_or(0);
        let hi = i64::try_from(bottom_limit).unwrap_or(0);
        self.cursor.pos.y = usize::try_from((y + dy).clamp(lo, hi)).unwrap_or(0);

        self.debug_assert_invariants();
    }

    pub fn cursor_next_line(&mut self, count: usize) {
        self.move_cursor_relative(0, i64::try_from(count.max(1)).unwrap_or(1));
        self.cursor.pos.x = 0;
    }

    pub fn cursor_previous_line(&mut self, count: usize) {
        self.move_cursor_relative(0, -i64::try_from(count.max(1)).unwrap_or(1));
        self.cursor.pos.x = 0;
    }

    pub fn set_cursor_col(&mut self, x: usize) {
        self.cursor.pending_wrap = false;
        self.cursor.pos.x = x.min(self.width - 1);
    }

    pub fn set_cursor_row(&mut self, y: usize) {
        self.set_cursor_pos(None, Some(y));
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    const fn region_is_full_screen(&self) -> bool {
        self.scroll_region_top == 0 && self.scroll_region_bottom == self.height - 1
    }

    /// Shift the scroll region up by `count`, discarding or archiving the
    /// rows that leave at the top. History is only kept for a full-screen
    /// scroll of the primary buffer.
    pub fn scroll_up(&mut self, count: usize) {
        let span = self.scroll_region_bottom - self.scroll_region_top + 1;
        let count = count.clamp(1, span);

        let archive = self.kind == BufferKind::Primary
            && self.region_is_full_screen()
            && self.scrollback_limit > 0;

        if archive {
            for _ in 0..count {
                self.rows.push(Row::new(self.width));
            }
            self.scrolled_out_pending += count;

            let max_rows = self.height + self.scrollback_limit;
            while self.rows.len() > max_rows {
                self.rows.remove(0);
                self.rows_evicted += 1;
            }
            self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
            self.mark_all_dirty();
        } else {
            let top = self.abs_index(self.scroll_region_top);
            let bottom = self.abs_index(self.scroll_region_bottom);
            for _ in 0..count {
                self.rows.remove(top);
                self.rows.insert(bottom, Row::new(self.width));
            }
            self.mark_region_dirty(self.scroll_region_top, self.scroll_region_bottom);
        }

        self.debug_assert_invariants();
    }

    /// Shift the scroll region down by `count`; rows leaving at the bottom
    /// are discarded.
    pub fn scroll_down(&mut self, count: usize) {
        let span = self.scroll_region_bottom - self.scroll_region_top + 1;
        let count = count.clamp(1, span);

        let top = self.abs_index(self.scroll_region_top);
        let bottom = self.abs_index(self.scroll_region_bottom);
        for _ in 0..count {
            self.rows.remove(bottom);
            self.rows.insert(top, Row::new(self.width));
        }
        self.mark_region_dirty(self.scroll_region_top, self.scroll_region_bottom);
        self.debug_assert_invariants();
    }

    /// IL: blank rows open at the cursor, pushing the rest of the region
    /// down. Ignored outside the scroll region.
    pub fn insert_lines(&mut self, count: usize) {
        let y = self.cursor.pos.y;
        if y < self.scroll_region_top || y > self.scroll_region_bottom {
            return;
        }

        let count = count.clamp(1, self.scroll_region_bottom - y + 1);
        let at = self.abs_index(y);
        let bottom = self.abs_index(self.scroll_region_bottom);
        for _ in 0..count {
            self.rows.remove(bottom);
            self.rows.insert(at, Row::new(self.width));
        }

        self.cursor.pos.x = 0;
        self.cursor.pending_wrap = false;
        self.mark_region_dirty(y, self.scroll_region_bottom);
        self.debug_assert_invariants();
    }

    /// DL: rows vanish at the cursor, the region closes up from the bottom.
    pub fn delete_lines(&mut self, count: usize) {
        let y = self.cursor.pos.y;
        if y < self.scroll_region_top || y > self.scroll_region_bottom {
            return;
        }

        let count = count.clamp(1, self.scroll_region_bottom - y + 1);
        let at = self.abs_index(y);
        let bottom = self.abs_index(self.scroll_region_bottom);
        for _ in 0..count {
            self.rows.remove(at);
            self.rows.insert(bottom, Row::new(self.width));
        }

        self.cursor.pos.x = 0;
        self.cursor.pending_wrap = false;
        self.mark_region_dirty(y, self.scroll_region_bottom);
        self.debug_assert_invariants();
    }

    /// DECBI: step left, or shift the scroll-region contents right one
    /// column when already at the left margin.
    pub fn back_index(&mut self) {
        self.cursor.pending_wrap = false;
        if self.cursor.pos.x > 0 {
            self.cursor.pos.x -= 1;
            return;
        }

        let attr = self.current_attr;
        for y in self.scroll_region_top..=self.scroll_region_bottom {
            self.row_mut(y).insert_blanks(0, 1, attr);
        }
    }

    /// DECFI: step right, or shift the scroll-region contents left one
    /// column when already at the right margin.
    pub fn forward_index(&mut self) {
        self.cursor.pending_wrap = false;
        if self.cursor.pos.x + 1 < self.width {
            self.cursor.pos.x += 1;
            return;
        }

        let attr = self.current_attr;
        for y in self.scroll_region_top..=self.scroll_region_bottom {
            self.row_mut(y).delete_cells(0, 1, attr);
        }
    }

    // ------------------------------------------------------------------
    // In-row edits
    // ------------------------------------------------------------------

    pub fn insert_spaces(&mut self, count: usize) {
        let x = self.cursor.pos.x.min(self.width - 1);
        let y = self.cursor.pos.y;
        let attr = self.current_attr;
        self.row_mut(y).insert_blanks(x, count.max(1), attr);
    }

    pub fn delete_chars(&mut self, count: usize) {
        let x = self.cursor.pos.x.min(self.width - 1);
        let y = self.cursor.pos.y;
        let attr = self.current_attr;
        self.row_mut(y).delete_cells(x, count.max(1), attr);
    }

    pub fn erase_chars(&mut self, count: usize) {
        let x = self.cursor.pos.x.min(self.width - 1);
        let y = self.cursor.pos.y;
        let attr = self.current_attr;
        let end = x + count.max(1);
        self.row_mut(y).erase_range(x, end, attr);
    }

    // ------------------------------------------------------------------
    // Erasure
    // ------------------------------------------------------------------

    fn erase_full_row(&mut self, y: usize) {
        let attr = self.current_attr;
        let width = self.width;
        let row = self.row_mut(y);
        row.clear();
        if attr != Attribute::default() {
            row.erase_range(0, width, attr);
        }
    }

    pub fn erase_line_to_end(&mut self) {
        let x = self.cursor.pos.x.min(self.width - 1);
        let y = self.cursor.pos.y;
        let attr = self.current_attr;
        let width = self.width;
        let row = self.row_mut(y);
        row.erase_range(x, width, attr);
        row.wrapped = false;
    }

    pub fn erase_line_to_start(&mut self) {
        let x = self.cursor.pos.x.min(self.width - 1);
        let y = self.cursor.pos.y;
        let attr = self.current_attr;
        self.row_mut(y).erase_range(0, x + 1, attr);
    }

    pub fn erase_line(&mut self) {
        let y = self.cursor.pos.y;
        self.erase_full_row(y);
    }

    pub fn erase_to_end_of_display(&mut self) {
        self.erase_line_to_end();
        for y in self.cursor.pos.y + 1..self.height {
            self.erase_full_row(y);
        }
    }

    pub fn erase_to_start_of_display(&mut self) {
        self.erase_line_to_start();
        for y in 0..self.cursor.pos.y {
            self.erase_full_row(y);
        }
    }

    pub fn erase_display(&mut self) {
        for y in 0..self.height {
            self.erase_full_row(y);
        }
    }

    /// ED 3: drop all history, keep the screen.
    pub fn erase_scrollback(&mut self) {
        let history = self.first_screen_row();
        if history > 0 {
            self.rows.drain(0..history);
            self.rows_evicted += u64::try_from(history).unwrap_or(0);
        }
        self.scroll_offset = 0;
        self.mark_all_dirty();
        self.debug_assert_invariants();
    }

    /// DECALN: fill the screen with 'E', reset margins, home the cursor.
    pub fn screen_alignment_fill(&mut self) {
        for y in 0..self.height {
            let width = self.width;
            let row = self.row_mut(y);
            row.clear();
            for col in 0..width {
                row.put_cell(col, Cell::new('E', Attribute::default(), 1));
            }
        }
        self.scroll_region_top = 0;
        self.scroll_region_bottom = self.height - 1;
        self.cursor = CursorState::default();
        self.mark_all_dirty();
    }

    // ------------------------------------------------------------------
    // Scroll region
    // ------------------------------------------------------------------

    /// DECSTBM with 0-based inclusive margins. Invalid pairs are ignored;
    /// a valid pair homes the cursor (honoring origin mode).
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let bottom = bottom.min(self.height - 1);
        if top >= bottom {
            debug!("ignoring degenerate scroll region [{top}, {bottom}]");
            return;
        }

        self.scroll_region_top = top;
        self.scroll_region_bottom = bottom;
        self.set_cursor_pos(Some(0), Some(0));
    }

    // ------------------------------------------------------------------
    // Saved cursor
    // ------------------------------------------------------------------

    pub const fn store_saved_cursor(&mut self, saved: SavedCursor) {
        self.saved_cursor = Some(saved);
    }

    #[must_use]
    pub const fn saved_cursor(&self) -> Option<&SavedCursor> {
        self.saved_cursor.as_ref()
    }

    /// Re-apply the buffer-owned parts of a saved cursor (position, wrap
    /// state, origin mode); the dispatcher restores attribute and charsets.
    pub fn apply_saved_cursor(&mut self, saved: &SavedCursor) {
        self.origin_mode = saved.origin_mode;
        self.cursor.pos.x = saved.pos.x.min(self.width - 1);
        self.cursor.pos.y = saved.pos.y.min(self.height - 1);
        self.cursor.pending_wrap = saved.pending_wrap && saved.pos.x >= self.width - 1;
        self.debug_assert_invariants();
    }

    // ------------------------------------------------------------------
    // Resize
    // ------------------------------------------------------------------

    /// Change the grid size.
    ///
    /// The default policy is hard truncation with preserved storage: rows
    /// keep their cells, so shrink-then-grow restores the clipped content.
    /// With `rewrap_on_resize` set, soft-wrapped paragraphs reflow instead.
    pub fn resize(&mut self, new_width: usize, new_height: usize) {
        if new_width == self.width && new_height == self.height {
            return;
        }

        if self.rewrap_on_resize && new_width != self.width {
            self.rewrap(new_width);
        } else if new_width != self.width {
            for row in &mut self.rows {
                row.set_max_width(new_width);
            }
            self.width = new_width;
        }

        let cursor_abs = self.first_screen_row() + self.cursor.pos.y;

        match self.kind {
            BufferKind::Primary => {
                while self.rows.len() < new_height {
                    self.rows.push(Row::new(self.width));
                }
                let max_rows = new_height + self.scrollback_limit;
                while self.rows.len() > max_rows {
                    self.rows.remove(0);
                    self.rows_evicted += 1;
                }
            }
            BufferKind::Alternate => {
                while self.rows.len() < new_height {
                    self.rows.push(Row::new(self.width));
                }
                if self.rows.len() > new_height {
                    let excess = self.rows.len() - new_height;
                    self.rows.drain(0..excess);
                }
            }
        }

        self.height = new_height;

        let first = self.first_screen_row();
        self.cursor.pos.y = cursor_abs.saturating_sub(first).min(new_height - 1);
        self.cursor.pos.x = self.cursor.pos.x.min(self.width.saturating_sub(1));
        self.cursor.pending_wrap = false;

        self.scroll_region_top = 0;
        self.scroll_region_bottom = new_height - 1;

        let old_stops = std::mem::take(&mut self.tab_stops);
        self.tab_stops = default_tab_stops(self.width);
        for (col, stop) in old_stops.into_iter().enumerate().take(self.width) {
            self.tab_stops[col] = stop;
        }

        self.dirty = vec![true; new_height];
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        self.debug_assert_invariants();
    }

    /// Reflow soft-wrapped paragraphs to a new width. The cursor follows the
    /// logical cell it was on (best effort).
    fn rewrap(&mut self, new_width: usize) {
        let cursor_abs = self.first_screen_row() + self.cursor.pos.y;
        let old_width = self.width;
        let mut cursor_target: Option<(usize, usize)> = None;

        let old_rows = std::mem::take(&mut self.rows);
        let mut new_rows: Vec<Row> = Vec::with_capacity(old_rows.len());

        let mut i = 0;
        while i < old_rows.len() {
            let para_start = i;
            let new_para_start = new_rows.len();

            let mut content: Vec<Cell> = Vec::new();
            loop {
                let row = &old_rows[i];
                content.extend(row.cells().iter().filter(|c| !c.is_continuation()).cloned());
                let wrapped = row.wrapped;
                i += 1;
                if !wrapped || i == old_rows.len() {
                    break;
                }
            }

            if (para_start..i).contains(&cursor_abs) {
                let offset = (cursor_abs - para_start) * old_width + self.cursor.pos.x;
                cursor_target = Some((new_para_start, offset));
            }

            let mut current = Row::new(new_width);
            let mut col = 0;
            for cell in content {
                let w = cell.display_width().max(1);
                if col + w > new_width {
                    current.wrapped = true;
                    new_rows.push(current);
                    current = Row::new(new_width);
                    col = 0;
                }
                current.put_cell(col, cell);
                col += w;
            }
            new_rows.push(current);
        }

        if new_rows.is_empty() {
            new_rows.push(Row::new(new_width));
        }
        self.rows = new_rows;
        self.width = new_width;
        while self.rows.len() < self.height {
            self.rows.push(Row::new(new_width));
        }

        if let Some((para_start, offset)) = cursor_target {
            let row = para_start + offset / new_width;
            let col = offset % new_width;
            let row = row.min(self.rows.len() - 1);
            // height fixup happens in resize(); park the absolute position
            // in screen coordinates afterwards via the caller's clamping.
            let first = self.rows.len().saturating_sub(self.height);
            self.cursor.pos.y = row.saturating_sub(first).min(self.height - 1);
            self.cursor.pos.x = col;
        }
    }

    // ------------------------------------------------------------------
    // Viewport (user scrollback)
    // ------------------------------------------------------------------

    #[must_use]
    pub fn max_scroll_offset(&self) -> usize {
        self.rows.len() - self.height
    }

    /// The rows to display, honoring the user's scrollback position.
    ///
    /// Contract (unchanged from the start of this buffer's life):
    /// - returns a contiguous borrowed slice of length `height`
    /// - `scroll_offset == 0` shows the live tail
    /// - larger offsets slide the window into history, clamped at the
    ///   oldest retained row
    #[must_use]
    pub fn visible_rows(&self) -> &[Row] {
        let offset = self.scroll_offset.min(self.max_scroll_offset());
        let end = self.rows.len() - offset;
        &self.rows[end - self.height..end]
    }

    pub fn scroll_viewport_back(&mut self, lines: usize) {
        if self.kind == BufferKind::Alternate {
            return;
        }
        let new_offset = (self.scroll_offset + lines).min(self.max_scroll_offset());
        if new_offset != self.scroll_offset {
            self.scroll_offset = new_offset;
            self.mark_all_dirty();
        }
    }

    pub fn scroll_viewport_forward(&mut self, lines: usize) {
        let new_offset = self.scroll_offset.saturating_sub(lines);
        if new_offset != self.scroll_offset {
            self.scroll_offset = new_offset;
            self.mark_all_dirty();
        }
    }

    pub fn reset_viewport(&mut self) {
        if self.scroll_offset != 0 {
            self.scroll_offset = 0;
            self.mark_all_dirty();
        }
    }

    #[must_use]
    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    // ------------------------------------------------------------------
    // Stable row addressing (selection support)
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn rows_evicted(&self) -> u64 {
        self.rows_evicted
    }

    /// Stable id of a row currently visible at viewport position `y`.
    #[must_use]
    pub fn stable_row_for_visible(&self, y: usize) -> u64 {
        let offset = self.scroll_offset.min(self.max_scroll_offset());
        let start = self.rows.len() - offset - self.height;
        self.rows_evicted + u64::try_from(start + y.min(self.height - 1)).unwrap_or(0)
    }

    #[must_use]
    pub fn row_by_stable_id(&self, id: u64) -> Option<&Row> {
        let idx = id.checked_sub(self.rows_evicted)?;
        self.rows.get(usize::try_from(idx).ok()?)
    }

    /// Stable ids of the first and one-past-last retained rows.
    #[must_use]
    pub fn stable_row_bounds(&self) -> (u64, u64) {
        (
            self.rows_evicted,
            self.rows_evicted + u64::try_from(self.rows.len()).unwrap_or(0),
        )
    }

    // ------------------------------------------------------------------
    // Misc
    // ------------------------------------------------------------------

    pub fn set_row_render(&mut self, render: RowRender) {
        let y = self.cursor.pos.y;
        self.row_mut(y).render = render;
    }

    /// Rows scrolled into history since the last call; the dispatcher
    /// forwards this to the embedder.
    pub const fn take_scrolled_out(&mut self) -> usize {
        let n = self.scrolled_out_pending;
        self.scrolled_out_pending = 0;
        n
    }

    /// Full reinitialization (RIS), keeping the configured geometry.
    pub fn reset(&mut self) {
        let scrollback = self.scrollback_limit;
        let ambiguous = self.ambiguous_wide;
        let rewrap = self.rewrap_on_resize;
        *self = Self::new(self.width, self.height, self.kind, scrollback);
        self.ambiguous_wide = ambiguous;
        self.rewrap_on_resize = rewrap;
    }
}

fn default_tab_stops(width: usize) -> Vec<bool> {
    (0..width).map(|col| col % 8 == 0).collect()
}
