// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use corvid_common::attribute::Attribute;

use crate::cell::Cell;

/// DECDHL / DECDWL rendition of a whole row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowRender {
    #[default]
    Single,
    DoubleWidth,
    DoubleHeightTop,
    DoubleHeightBottom,
}

/// One grid line.
///
/// Storage is sparse: `cells` only extends as far as content was written,
/// and columns past the end are implicit default blanks. `width` is the
/// logical column count; after a window shrink it may be smaller than the
/// stored cell count, which preserves the clipped content for a later grow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Cell>,
    width: usize,
    /// This row continues onto the next one (soft wrap).
    pub wrapped: bool,
    pub render: RowRender,
}

impl Row {
    #[must_use]
    pub const fn new(width: usize) -> Self {
        Self {
            cells: Vec::new(),
            width,
            wrapped: false,
            render: RowRender::Single,
        }
    }

    #[must_use]
    pub const fn from_cells(width: usize, wrapped: bool, cells: Vec<Cell>) -> Self {
        Self {
            cells,
            width,
            wrapped,
            render: RowRender::Single,
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.wrapped = false;
        self.render = RowRender::Single;
    }

    /// Logical row width (number of *columns*), not number of stored cells.
    #[must_use]
    pub const fn max_width(&self) -> usize {
        self.width
    }

    /// Update the logical width. Stored cells are left alone; content beyond
    /// the new width is merely clipped from display.
    pub const fn set_max_width(&mut self, new_width: usize) {
        self.width = new_width;
    }

    /// How many columns currently hold written content.
    #[must_use]
    pub fn occupied_columns(&self) -> usize {
        let mut cols = 0;
        let mut idx = 0;

        while idx < self.cells.len() {
            let cell = &self.cells[idx];
            if cell.is_head() {
                cols += 2;
                idx += 2;
            } else {
                cols += cell.display_width().max(1);
                idx += 1;
            }
        }

        cols.min(self.cells.len())
    }

    #[must_use]
    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Return the stored cell if present, otherwise an implicit blank.
    #[must_use]
    pub fn resolve_cell(&self, col: usize) -> Cell {
        self.cells
            .get(col)
            .cloned()
            .unwrap_or_else(|| Cell::blank_with_attr(Attribute::default()))
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clean up when overwriting part of a wide pair: blanking one half
    /// always blanks the other so no orphan head or tail survives.
    fn cleanup_wide_overwrite(&mut self, col: usize) {
        if col >= self.cells.len() {
            return;
        }

        if self.cells[col].is_continuation() {
            if col == 0 {
                // orphan tail; nothing to the left
                self.blank_preserving_attr(col);
                return;
            }
            if self.cells[col - 1].is_head() {
                self.blank_preserving_attr(col - 1);
            }
            self.blank_preserving_attr(col);
            return;
        }

        if self.cells[col].is_head() {
            if col + 1 < self.cells.len() && self.cells[col + 1].is_continuation() {
                self.blank_preserving_attr(col + 1);
            }
            self.blank_preserving_attr(col);
        }
    }

    fn blank_preserving_attr(&mut self, col: usize) {
        if let Some(cell) = self.cells.get_mut(col) {
            *cell = Cell::blank_with_attr(*cell.attr());
        }
    }

    /// Blank any wide pair left inconsistent by a shift: orphan tails, heads
    /// whose tail fell off the edge.
    fn repair_wide_pairs(&mut self) {
        let len = self.cells.len();
        for idx in 0..len {
            if self.cells[idx].is_continuation() && (idx == 0 || !self.cells[idx - 1].is_head()) {
                self.blank_preserving_attr(idx);
            }
            if self.cells[idx].is_head() {
                let tail_ok = idx + 1 < self.width
                    && idx + 1 < len
                    && self.cells[idx + 1].is_continuation();
                if !tail_ok {
                    self.blank_preserving_attr(idx);
                }
            }
        }
    }

    fn pad_to(&mut self, col: usize) {
        while self.cells.len() < col {
            self.cells.push(Cell::blank_with_attr(Attribute::default()));
        }
    }

    /// Write one cell at `col`, maintaining wide-pair integrity. A wide head
    /// written at the last column does not fit and is stored as a blank.
    pub fn put_cell(&mut self, col: usize, cell: Cell) {
        if col >= self.width {
            return;
        }

        let wide = cell.is_head();
        if wide && col + 1 >= self.width {
            self.put_cell(col, Cell::blank_with_attr(*cell.attr()));
            return;
        }

        self.pad_to(col);
        self.cleanup_wide_overwrite(col);
        if wide {
            self.cleanup_wide_overwrite(col + 1);
        }

        let attr = *cell.attr();
        if col == self.cells.len() {
            self.cells.push(cell);
        } else {
            self.cells[col] = cell;
        }

        if wide {
            let tail = Cell::wide_continuation(attr);
            if col + 1 == self.cells.len() {
                self.cells.push(tail);
            } else {
                self.cells[col + 1] = tail;
            }
        }

        self.trim_trailing_blanks();
    }

    /// Append a combining mark to the cell at `col` (or to the head when
    /// `col` points at a wide tail).
    pub fn attach_combining(&mut self, col: usize, mark: char) {
        let target = if col < self.cells.len() && self.cells[col].is_continuation() && col > 0 {
            col - 1
        } else {
            col
        };

        if target >= self.width {
            return;
        }
        self.pad_to(target + 1);
        self.cells[target].push_combining(mark);
    }

    /// Insert `n` blanks at `col`, shifting existing cells right; cells
    /// pushed past the logical width are discarded. This implements ICH.
    pub fn insert_blanks(&mut self, col: usize, n: usize, attr: Attribute) {
        let width = self.width;

        if n == 0 || col >= width {
            return;
        }

        self.cleanup_wide_overwrite(col);

        let insert_len = n.min(width - col);
        let old_len = self.cells.len();
        let needed_len = (old_len + insert_len).max(col + insert_len);

        self.cells
            .resize(needed_len, Cell::blank_with_attr(Attribute::default()));

        // Shift [col..old_len) right; anything landing at or past `width`
        // falls off the row.
        for i in (col..old_len).rev() {
            let dest = i + insert_len;
            if dest < width {
                self.cells[dest] = self.cells[i].clone();
            }
        }

        for i in col..(col + insert_len) {
            if i < self.cells.len() {
                self.cells[i] = Cell::blank_with_attr(attr);
            }
        }

        if self.cells.len() > width {
            self.cells.truncate(width);
        }

        self.repair_wide_pairs();
        self.trim_trailing_blanks();
    }

    /// Delete `n` cells at `col`, pulling the remainder left and padding the
    /// vacated tail with blanks in the erase attribute. This implements DCH.
    pub fn delete_cells(&mut self, col: usize, n: usize, attr: Attribute) {
        let width = self.width;

        if n == 0 || col >= width || col >= self.cells.len() {
            return;
        }

        let n = n.min(width - col);
        self.cleanup_wide_overwrite(col);
        let boundary = col + n;
        if boundary < self.cells.len() {
            self.cleanup_wide_overwrite(boundary);
        }

        let end = boundary.min(self.cells.len());
        self.cells.drain(col..end);

        // The pull exposes fresh columns at the right edge; they take the
        // current erase attribute.
        while self.cells.len() < width {
            self.cells.push(Cell::blank_with_attr(attr));
        }

        self.repair_wide_pairs();
        self.trim_trailing_blanks();
    }

    /// Fill `[start, end)` with blanks in the erase attribute (EL / ECH).
    pub fn erase_range(&mut self, start: usize, end: usize, attr: Attribute) {
        let end = end.min(self.width);
        if start >= end {
            return;
        }

        self.cleanup_wide_overwrite(start);
        if end < self.cells.len() {
            self.cleanup_wide_overwrite(end - 1);
        }

        if self.cells.len() < end {
            self.cells.resize(end, Cell::blank_with_attr(attr));
        }

        for col in start..end {
            self.cells[col] = Cell::blank_with_attr(attr);
        }

        self.repair_wide_pairs();
        self.trim_trailing_blanks();
    }

    /// Copy a span of cells out of another row. Wide pairs clipped by
    /// either end of the span are blanked rather than split.
    pub fn copy_cells_from(&mut self, source: &Row, src: std::ops::Range<usize>, dst: usize) {
        let mut offset = 0;
        for col in src {
            if dst + offset >= self.width {
                break;
            }
            let cell = source.resolve_cell(col);
            if cell.is_continuation() {
                offset += 1;
                continue;
            }
            self.put_cell(dst + offset, cell);
            offset += 1;
        }
        self.repair_wide_pairs();
        self.trim_trailing_blanks();
    }

    /// Visible text of the row, skipping wide-pair tails.
    #[must_use]
    pub fn as_text(&self, trim_trailing_blanks: bool) -> String {
        let mut out = String::with_capacity(self.width);
        for cell in self.cells.iter().take(self.width) {
            if cell.is_continuation() {
                continue;
            }
            out.push_str(&cell.grapheme());
        }

        if trim_trailing_blanks {
            let trimmed_len = out.trim_end_matches(' ').len();
            out.truncate(trimmed_len);
        }

        out
    }

    fn trim_trailing_blanks(&mut self) {
        while let Some(last) = self.cells.last() {
            if last.is_blank() && last.attr() == &Attribute::default() {
                self.cells.pop();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn narrow(ch: char) -> Cell {
        Cell::new(ch, Attribute::default(), 1)
    }

    fn wide(ch: char) -> Cell {
        Cell::new(ch, Attribute::default(), 2)
    }

    #[test]
    fn put_cell_pads_gaps() {
        let mut row = Row::new(10);
        row.put_cell(4, narrow('X'));
        assert_eq!(row.resolve_cell(0).base(), ' ');
        assert_eq!(row.resolve_cell(4).base(), 'X');
        assert_eq!(row.occupied_columns(), 5);
    }

    #[test]
    fn wide_cell_gets_a_tail() {
        let mut row = Row::new(10);
        row.put_cell(2, wide('あ'));
        assert!(row.resolve_cell(2).is_head());
        assert!(row.resolve_cell(3).is_continuation());
    }

    #[test]
    fn overwriting_a_tail_blanks_the_head() {
        let mut row = Row::new(10);
        row.put_cell(2, wide('あ'));
        row.put_cell(3, narrow('x'));
        assert!(!row.resolve_cell(2).is_head());
        assert_eq!(row.resolve_cell(2).base(), ' ');
        assert_eq!(row.resolve_cell(3).base(), 'x');
    }

    #[test]
    fn overwriting_a_head_blanks_the_tail() {
        let mut row = Row::new(10);
        row.put_cell(2, wide('あ'));
        row.put_cell(2, narrow('x'));
        assert_eq!(row.resolve_cell(2).base(), 'x');
        assert!(!row.resolve_cell(3).is_continuation());
    }

    #[test]
    fn wide_cell_does_not_fit_in_last_column() {
        let mut row = Row::new(4);
        row.put_cell(3, wide('あ'));
        assert!(!row.resolve_cell(3).is_head());
    }

    #[test]
    fn insert_blanks_shifts_right_and_discards_overflow() {
        let mut row = Row::new(5);
        for (i, ch) in ['a', 'b', 'c', 'd', 'e'].into_iter().enumerate() {
            row.put_cell(i, narrow(ch));
        }
        row.insert_blanks(1, 2, Attribute::default());
        assert_eq!(row.as_text(true), "a  bc");
    }

    #[test]
    fn delete_cells_pulls_left() {
        let mut row = Row::new(5);
        for (i, ch) in ['a', 'b', 'c', 'd', 'e'].into_iter().enumerate() {
            row.put_cell(i, narrow(ch));
        }
        row.delete_cells(1, 2, Attribute::default());
        assert_eq!(row.as_text(true), "ade");
    }

    #[test]
    fn delete_through_wide_pair_blanks_it() {
        let mut row = Row::new(6);
        row.put_cell(0, narrow('a'));
        row.put_cell(1, wide('あ'));
        row.put_cell(3, narrow('b'));
        row.delete_cells(2, 1, Attribute::default());
        // the pair straddling the deletion point is blanked first
        assert_eq!(row.as_text(true), "a b");
    }

    #[test]
    fn erase_range_keeps_attr() {
        use corvid_common::colors::TerminalColor;

        let mut row = Row::new(5);
        row.put_cell(0, narrow('a'));
        let attr = Attribute {
            bg: TerminalColor::Blue,
            ..Attribute::default()
        };
        row.erase_range(0, 3, attr);
        assert_eq!(row.resolve_cell(0).attr().bg, TerminalColor::Blue);
        assert_eq!(row.resolve_cell(2).attr().bg, TerminalColor::Blue);
        assert!(row.resolve_cell(0).is_blank());
    }

    #[test]
    fn copy_cells_between_rows() {
        let mut src = Row::new(8);
        src.put_cell(0, narrow('a'));
        src.put_cell(1, wide('あ'));
        src.put_cell(3, narrow('b'));

        let mut dst = Row::new(8);
        dst.copy_cells_from(&src, 0..4, 2);
        assert_eq!(dst.as_text(true), "  aあb");
        assert!(dst.resolve_cell(3).is_head());
        assert!(dst.resolve_cell(4).is_continuation());
    }

    #[test]
    fn shrinking_width_preserves_storage() {
        let mut row = Row::new(6);
        for (i, ch) in ['a', 'b', 'c', 'd', 'e', 'f'].into_iter().enumerate() {
            row.put_cell(i, narrow(ch));
        }
        row.set_max_width(3);
        assert_eq!(row.max_width(), 3);
        // stored cells survive a shrink for a later grow
        assert_eq!(row.get(5).map(Cell::base), Some('f'));
        row.set_max_width(6);
        assert_eq!(row.as_text(true), "abcdef");
    }
}
