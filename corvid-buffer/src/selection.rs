// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::ops::Range;

use crate::{buffer::Buffer, row::Row};

/// How an anchor/active pair expands into selected cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Character,
    Word,
    Line,
    Rectangular,
}

/// A buffer-absolute position: `row` is a stable id that survives scrolling
/// (see `Buffer::stable_row_for_visible`), `col` a 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SelectionPoint {
    pub row: u64,
    pub col: usize,
}

/// Text extraction knobs for `selected_text`.
#[derive(Debug, Clone, Copy)]
pub struct SelectionTextOptions {
    /// Drop trailing blanks of each line.
    pub trim_trailing_blanks: bool,
    /// Soft-wrapped lines join without a newline.
    pub join_wrapped_lines: bool,
}

impl Default for SelectionTextOptions {
    fn default() -> Self {
        Self {
            trim_trailing_blanks: true,
            join_wrapped_lines: true,
        }
    }
}

/// An anchor/active selection over buffer contents, scrollback included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub mode: SelectionMode,
    anchor: SelectionPoint,
    active: SelectionPoint,
}

impl Selection {
    #[must_use]
    pub const fn new(mode: SelectionMode, anchor: SelectionPoint) -> Self {
        Self {
            mode,
            anchor,
            active: anchor,
        }
    }

    pub const fn extend(&mut self, to: SelectionPoint) {
        self.active = to;
    }

    #[must_use]
    pub const fn anchor(&self) -> SelectionPoint {
        self.anchor
    }

    #[must_use]
    pub const fn active(&self) -> SelectionPoint {
        self.active
    }

    /// Anchor/active ordered top-to-bottom, left-to-right.
    #[must_use]
    pub fn normalized(&self) -> (SelectionPoint, SelectionPoint) {
        if self.anchor <= self.active {
            (self.anchor, self.active)
        } else {
            (self.active, self.anchor)
        }
    }

    /// A selection whose start scrolled off the retained history is orphaned
    /// and should be cleared by the owner.
    #[must_use]
    pub fn is_orphaned(&self, buffer: &Buffer) -> bool {
        let (start, _) = self.normalized();
        let (retained_start, _) = buffer.stable_row_bounds();
        start.row < retained_start
    }

    /// The selected column span on `row_id`, or `None` when the row is
    /// outside the selection. `None` is also returned for rows no longer
    /// retained.
    #[must_use]
    pub fn span_for_row(
        &self,
        buffer: &Buffer,
        row_id: u64,
        word_delimiters: &str,
    ) -> Option<Range<usize>> {
        let (start, end) = self.normalized();
        if row_id < start.row || row_id > end.row {
            return None;
        }
        let row = buffer.row_by_stable_id(row_id)?;
        let width = row.max_width();

        let range = match self.mode {
            SelectionMode::Line => 0..width,
            SelectionMode::Rectangular => {
                let (lo, hi) = ordered(start.col, end.col);
                lo..(hi + 1).min(width)
            }
            SelectionMode::Character => linear_span(start, end, row_id, width),
            SelectionMode::Word => {
                let mut range = linear_span(start, end, row_id, width);
                if row_id == start.row {
                    range.start = word_start(row, range.start, word_delimiters);
                }
                if row_id == end.row {
                    range.end = word_end(row, range.end.saturating_sub(1), word_delimiters);
                }
                range
            }
        };

        if range.start >= range.end {
            None
        } else {
            Some(range)
        }
    }

    /// Extract the selected text.
    #[must_use]
    pub fn selected_text(
        &self,
        buffer: &Buffer,
        word_delimiters: &str,
        options: SelectionTextOptions,
    ) -> String {
        let (start, end) = self.normalized();
        let mut out = String::new();

        for row_id in start.row..=end.row {
            let Some(range) = self.span_for_row(buffer, row_id, word_delimiters) else {
                continue;
            };
            let Some(row) = buffer.row_by_stable_id(row_id) else {
                continue;
            };

            let mut line = String::new();
            for col in range {
                if let Some(cell) = row.get(col) {
                    if cell.is_continuation() {
                        continue;
                    }
                    line.push_str(&cell.grapheme());
                } else {
                    line.push(' ');
                }
            }

            if options.trim_trailing_blanks {
                let trimmed = line.trim_end_matches(' ').len();
                line.truncate(trimmed);
            }

            out.push_str(&line);

            if row_id != end.row {
                let joined = options.join_wrapped_lines
                    && self.mode != SelectionMode::Rectangular
                    && row.wrapped;
                if !joined {
                    out.push('\n');
                }
            }
        }

        out
    }
}

const fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

fn linear_span(
    start: SelectionPoint,
    end: SelectionPoint,
    row_id: u64,
    width: usize,
) -> Range<usize> {
    let from = if row_id == start.row { start.col } else { 0 };
    let to = if row_id == end.row {
        (end.col + 1).min(width)
    } else {
        width
    };
    from.min(width)..to
}

fn is_delimiter(row: &Row, col: usize, delimiters: &str) -> bool {
    row.get(col).is_none_or(|cell| {
        cell.is_continuation() || delimiters.contains(cell.base())
    })
}

fn word_start(row: &Row, col: usize, delimiters: &str) -> usize {
    if is_delimiter(row, col, delimiters) {
        return col;
    }
    let mut start = col;
    while start > 0 && !is_delimiter(row, start - 1, delimiters) {
        start -= 1;
    }
    start
}

fn word_end(row: &Row, col: usize, delimiters: &str) -> usize {
    if is_delimiter(row, col, delimiters) {
        return col + 1;
    }
    let mut end = col;
    let width = row.max_width();
    while end + 1 < width && !is_delimiter(row, end + 1, delimiters) {
        end += 1;
    }
    end + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Buffer, BufferKind};

    const DELIMS: &str = " \t'\"`()[]{}<>|;:,";

    fn buffer_with(lines: &[&str]) -> Buffer {
        let mut buf = Buffer::new(10, lines.len().max(2), BufferKind::Primary, 100);
        for (i, line) in lines.iter().enumerate() {
            buf.set_cursor_pos(Some(0), Some(i));
            buf.insert_text(line);
        }
        buf
    }

    fn point(row: u64, col: usize) -> SelectionPoint {
        SelectionPoint { row, col }
    }

    #[test]
    fn character_selection_spans_rows() {
        let buf = buffer_with(&["hello", "world"]);
        let mut sel = Selection::new(SelectionMode::Character, point(0, 2));
        sel.extend(point(1, 2));
        let text = sel.selected_text(&buf, DELIMS, SelectionTextOptions::default());
        assert_eq!(text, "llo\nwor");
    }

    #[test]
    fn reversed_selection_normalizes() {
        let buf = buffer_with(&["hello", "world"]);
        let mut sel = Selection::new(SelectionMode::Character, point(1, 2));
        sel.extend(point(0, 2));
        let text = sel.selected_text(&buf, DELIMS, SelectionTextOptions::default());
        assert_eq!(text, "llo\nwor");
    }

    #[test]
    fn word_selection_expands_to_boundaries() {
        let buf = buffer_with(&["one two три"]);
        let mut sel = Selection::new(SelectionMode::Word, point(0, 5));
        sel.extend(point(0, 5));
        let text = sel.selected_text(&buf, DELIMS, SelectionTextOptions::default());
        assert_eq!(text, "two");
    }

    #[test]
    fn line_selection_takes_whole_rows() {
        let buf = buffer_with(&["hello", "world"]);
        let sel = Selection::new(SelectionMode::Line, point(0, 3));
        let text = sel.selected_text(&buf, DELIMS, SelectionTextOptions::default());
        assert_eq!(text, "hello");
    }

    #[test]
    fn rectangular_selection_is_column_stable() {
        let buf = buffer_with(&["abcdef", "ghijkl", "mnopqr"]);
        let mut sel = Selection::new(SelectionMode::Rectangular, point(0, 1));
        sel.extend(point(2, 3));
        let text = sel.selected_text(&buf, DELIMS, SelectionTextOptions::default());
        assert_eq!(text, "bcd\nhij\nnop");
    }

    #[test]
    fn wrapped_lines_join_without_newline() {
        let mut buf = Buffer::new(4, 3, BufferKind::Primary, 100);
        buf.insert_text("abcdefgh");
        let mut sel = Selection::new(SelectionMode::Character, point(0, 0));
        sel.extend(point(1, 3));
        let text = sel.selected_text(&buf, DELIMS, SelectionTextOptions::default());
        assert_eq!(text, "abcdefgh");
    }

    #[test]
    fn selection_orphans_when_history_is_evicted() {
        let mut buf = Buffer::new(5, 2, BufferKind::Primary, 2);
        let sel = Selection::new(SelectionMode::Character, point(0, 0));
        assert!(!sel.is_orphaned(&buf));
        for _ in 0..10 {
            buf.index();
        }
        assert!(sel.is_orphaned(&buf));
    }
}
