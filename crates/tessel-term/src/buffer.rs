// SPDX-License-Identifier: MIT
//
// CellBuffer: the paired cell grids widgets paint into.
//
// Every character position on screen is a cell in this buffer. Widgets
// paint here during the draw stage; the diff renderer then compares this
// frame against the previous one and emits minimal escape sequences.
//
// Design:
//
//   - Two generations of a flat, row-major `Vec<Cell>`, each allocated
//     once at a fixed capacity. The screen uses the first `width * height`
//     cells of each. Frames are swapped by flipping an index, never copied.
//
//   - A resize that would need more cells than the capacity is rejected
//     and the previous dimensions are kept. No operation can index past
//     the capacity.
//
//   - All paint operations take signed coordinates and clip to the
//     screen, so widgets can be partially off-screen.
//
//   - Possibly-wide glyphs are tagged while drawing text. Once a string
//     contains one, every following cell of that string is tagged too:
//     the renderer can no longer trust where the terminal cursor is.
//
// Memory:
//
//   0x20000 cells × 8 bytes = 1 MB per generation, 2 MB in total.
//   Enough for a 512×256 terminal.

use crate::cell::{Cell, maybe_wide};

/// Cell capacity of one buffer generation.
pub const MAX_CELLS: usize = 0x20000;

// ─── CellBuffer ──────────────────────────────────────────────────────────────

/// A double-buffered grid of terminal cells.
///
/// # Examples
///
/// ```
/// use tessel_term::buffer::CellBuffer;
/// use tessel_term::cell::Cell;
///
/// let mut buf = CellBuffer::with_capacity(80 * 24);
/// assert!(buf.resize(80, 24));
/// buf.put(Cell::glyph("X", 7, 0), 5, 3);
/// assert_eq!(buf.get(5, 3).unwrap().bytes(), b"X");
///
/// // One row too many for the capacity: rejected, size unchanged.
/// assert!(!buf.resize(80, 25));
/// assert_eq!((buf.width(), buf.height()), (80, 24));
/// ```
pub struct CellBuffer {
    width: u16,
    height: u16,
    capacity: usize,
    generations: [Vec<Cell>; 2],
    current: usize,
    resized: bool,
}

impl CellBuffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create an empty (0×0) buffer with [`MAX_CELLS`] capacity per generation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_CELLS)
    }

    /// Create an empty (0×0) buffer with `capacity` cells per generation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            width: 0,
            height: 0,
            capacity,
            generations: [vec![Cell::BLANK; capacity], vec![Cell::BLANK; capacity]],
            current: 0,
            resized: false,
        }
    }

    // ─── Dimensions ──────────────────────────────────────────────────────

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Number of cells on screen (`width * height`).
    #[inline]
    #[must_use]
    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Cells per generation.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the dimensions changed since the last [`swap`](Self::swap).
    #[inline]
    #[must_use]
    pub const fn is_resized(&self) -> bool {
        self.resized
    }

    /// Change the screen dimensions.
    ///
    /// Returns `true` when the dimensions actually changed. A size whose
    /// area exceeds the capacity is rejected (returns `false`) and the
    /// prior dimensions are kept.
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        let area = usize::from(width) * usize::from(height);
        if area > self.capacity {
            tracing::warn!(width, height, capacity = self.capacity, "resize rejected");
            return false;
        }
        if width == self.width && height == self.height {
            return false;
        }
        tracing::debug!(width, height, "resize accepted");
        self.width = width;
        self.height = height;
        self.resized = true;
        true
    }

    // ─── Frames ──────────────────────────────────────────────────────────

    /// The frame being drawn.
    #[inline]
    #[must_use]
    pub fn current(&self) -> &[Cell] {
        &self.generations[self.current][..self.area()]
    }

    /// The frame last rendered.
    #[inline]
    #[must_use]
    pub fn previous(&self) -> &[Cell] {
        &self.generations[self.current ^ 1][..self.area()]
    }

    /// Blank every on-screen cell of the current frame.
    pub fn clear(&mut self) {
        let area = self.area();
        self.generations[self.current][..area].fill(Cell::BLANK);
    }

    /// Make the current frame the previous one and clear the resize flag.
    ///
    /// The new current frame still holds stale content from two frames
    /// ago; the draw stage clears it before painting.
    #[inline]
    pub const fn swap(&mut self) {
        self.current ^= 1;
        self.resized = false;
    }

    /// The cell at `(x, y)` in the current frame, if on screen.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(i32::from(x), i32::from(y))
            .map(|i| &self.generations[self.current][i])
    }

    /// Text of row `y` of the current frame, blank cells as spaces.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        let w = usize::from(self.width);
        let start = usize::from(y) * w;
        let Some(row) = self.current().get(start..start + w) else {
            return String::new();
        };
        let mut bytes = Vec::with_capacity(w);
        for cell in row {
            if cell.is_blank() {
                bytes.push(b' ');
            } else {
                bytes.extend_from_slice(cell.bytes());
            }
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)] // both checked non-negative
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let in_bounds =
            x >= 0 && y >= 0 && x < i32::from(self.width) && y < i32::from(self.height);
        in_bounds.then(|| x as usize + y as usize * usize::from(self.width))
    }

    /// Clip `[start, start + len)` to `[0, limit)`.
    #[inline]
    fn span(start: i32, len: i32, limit: u16) -> std::ops::Range<i32> {
        start.max(0)..start.saturating_add(len).min(i32::from(limit))
    }

    #[inline]
    fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.generations[self.current]
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Write one cell, ignoring off-screen positions.
    pub fn put(&mut self, cell: Cell, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells_mut()[i] = cell;
        }
    }

    /// Fill `w` cells of row `y` starting at `x`.
    pub fn fill_row(&mut self, cell: Cell, x: i32, y: i32, w: i32) {
        if y < 0 || y >= i32::from(self.height) || w <= 0 {
            return;
        }
        for ix in Self::span(x, w, self.width) {
            self.put(cell, ix, y);
        }
    }

    /// Fill `h` cells of column `x` starting at `y`.
    pub fn fill_col(&mut self, cell: Cell, x: i32, y: i32, h: i32) {
        if x < 0 || x >= i32::from(self.width) || h <= 0 {
            return;
        }
        for iy in Self::span(y, h, self.height) {
            self.put(cell, x, iy);
        }
    }

    /// Fill a `w`×`h` area.
    pub fn fill_area(&mut self, cell: Cell, x: i32, y: i32, w: i32, h: i32) {
        if w <= 0 || h <= 0 {
            return;
        }
        for iy in Self::span(y, h, self.height) {
            self.fill_row(cell, x, iy, w);
        }
    }

    /// Draw a UTF-8 string on row `y`, at most `w` glyphs, one glyph per
    /// cell. Glyphs left of the screen are consumed but not written.
    ///
    /// Wide tagging is sticky: once a possibly-wide glyph appears, it and
    /// every later cell of this string carry the wide flag.
    pub fn draw_text(&mut self, text: &[u8], x: i32, y: i32, w: i32, fg: u8, bg: u8) {
        if y < 0 || y >= i32::from(self.height) || x >= i32::from(self.width) {
            return;
        }
        let end = x.saturating_add(w).min(i32::from(self.width));
        let mut wide = false;
        let mut i = 0;
        let mut ix = x;
        while i < text.len() && ix < end {
            let cell = Cell::from_bytes(&text[i..], fg, bg);
            wide = wide || maybe_wide(cell.bytes());
            if ix >= 0 {
                self.put(cell.with_wide(wide), ix, y);
            }
            i += cell.len();
            ix += 1;
        }
    }

    /// Draw a light box border with a space-filled interior.
    ///
    /// The border uses `fg` on `bg`; the interior is filled with `bg`.
    pub fn draw_box(&mut self, x: i32, y: i32, w: i32, h: i32, fg: u8, bg: u8) {
        let right = x + w - 1;
        let bottom = y + h - 1;
        self.put(Cell::glyph("┌", fg, bg), x, y);
        self.put(Cell::glyph("┐", fg, bg), right, y);
        self.put(Cell::glyph("└", fg, bg), x, bottom);
        self.put(Cell::glyph("┘", fg, bg), right, bottom);
        let horizontal = Cell::glyph("─", fg, bg);
        self.fill_row(horizontal, x + 1, y, w - 2);
        self.fill_row(horizontal, x + 1, bottom, w - 2);
        let vertical = Cell::glyph("│", fg, bg);
        self.fill_col(vertical, x, y + 1, h - 2);
        self.fill_col(vertical, right, y + 1, h - 2);
        self.fill_area(Cell::glyph(" ", fg, bg), x + 1, y + 1, w - 2, h - 2);
    }

    /// Swap foreground and background of `w` cells on row `y`.
    pub fn invert_row(&mut self, x: i32, y: i32, w: i32) {
        if y < 0 || y >= i32::from(self.height) || w <= 0 {
            return;
        }
        for ix in Self::span(x, w, self.width) {
            if let Some(i) = self.index(ix, y) {
                self.cells_mut()[i].invert();
            }
        }
    }
}

impl Default for CellBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CellBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("capacity", &self.capacity)
            .field("resized", &self.resized)
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffer(w: u16, h: u16) -> CellBuffer {
        let mut buf = CellBuffer::with_capacity(usize::from(w) * usize::from(h));
        buf.resize(w, h);
        buf
    }

    // ── Dimensions ───────────────────────────────────────────────────────

    #[test]
    fn new_buffer_is_empty() {
        let buf = CellBuffer::with_capacity(16);
        assert_eq!((buf.width(), buf.height()), (0, 0));
        assert!(buf.current().is_empty());
        assert!(!buf.is_resized());
    }

    #[test]
    fn default_capacity_is_max_cells() {
        assert_eq!(CellBuffer::new().capacity(), MAX_CELLS);
    }

    #[test]
    fn resize_sets_flag_until_swap() {
        let mut buf = CellBuffer::with_capacity(100);
        assert!(buf.resize(10, 5));
        assert!(buf.is_resized());
        assert_eq!(buf.area(), 50);
        buf.swap();
        assert!(!buf.is_resized());
    }

    #[test]
    fn resize_to_same_size_is_not_a_change() {
        let mut buf = buffer(10, 5);
        buf.swap();
        assert!(!buf.resize(10, 5));
        assert!(!buf.is_resized());
    }

    #[test]
    fn resize_past_capacity_is_rejected() {
        let mut buf = buffer(80, 24);
        buf.swap();
        assert!(!buf.resize(80, 25));
        assert_eq!((buf.width(), buf.height()), (80, 24));
        assert!(!buf.is_resized());
        // Painting the would-be extra row stays in bounds.
        buf.fill_row(Cell::glyph("x", 1, 2), 0, 24, 80);
        assert_eq!(buf.current().len(), 80 * 24);
    }

    // ── Painting ─────────────────────────────────────────────────────────

    #[test]
    fn put_clips_off_screen() {
        let mut buf = buffer(4, 2);
        let c = Cell::glyph("x", 0, 0);
        buf.put(c, -1, 0);
        buf.put(c, 4, 0);
        buf.put(c, 0, 2);
        buf.put(c, 3, 1);
        assert_eq!(buf.row_text(0), "    ");
        assert_eq!(buf.row_text(1), "   x");
    }

    #[test]
    fn fill_row_clips_both_ends() {
        let mut buf = buffer(5, 1);
        buf.fill_row(Cell::glyph("=", 0, 0), -2, 0, 5);
        assert_eq!(buf.row_text(0), "===  ");
        buf.fill_row(Cell::glyph("#", 0, 0), 3, 0, 10);
        assert_eq!(buf.row_text(0), "===##");
    }

    #[test]
    fn fill_col_and_area() {
        let mut buf = buffer(3, 3);
        buf.fill_col(Cell::glyph("|", 0, 0), 1, -1, 10);
        assert_eq!(buf.row_text(0), " | ");
        assert_eq!(buf.row_text(2), " | ");
        buf.fill_area(Cell::glyph(".", 0, 0), 2, 1, 5, 5);
        assert_eq!(buf.row_text(1), " |.");
        assert_eq!(buf.row_text(2), " |.");
    }

    #[test]
    fn zero_or_negative_extent_paints_nothing() {
        let mut buf = buffer(3, 3);
        let c = Cell::glyph("x", 0, 0);
        buf.fill_row(c, 0, 0, 0);
        buf.fill_col(c, 0, 0, -1);
        buf.fill_area(c, 0, 0, 3, 0);
        buf.invert_row(0, 0, 0);
        assert!(buf.current().iter().all(Cell::is_blank));
    }

    #[test]
    fn draw_text_limits_to_width() {
        let mut buf = buffer(10, 1);
        buf.draw_text(b"hello world", 1, 0, 5, 7, 0);
        assert_eq!(buf.row_text(0), " hello    ");
    }

    #[test]
    fn draw_text_left_of_screen_skips_leading_glyphs() {
        let mut buf = buffer(5, 1);
        buf.draw_text("ab┌de".as_bytes(), -2, 0, 10, 7, 0);
        assert_eq!(buf.row_text(0), "┌de  ");
    }

    #[test]
    fn draw_text_sets_colors() {
        let mut buf = buffer(3, 1);
        buf.draw_text(b"ab", 0, 0, 3, 9, 4);
        let c = buf.get(1, 0).unwrap();
        assert_eq!((c.fg, c.bg), (9, 4));
        assert!(buf.get(2, 0).unwrap().is_blank());
    }

    #[test]
    fn draw_text_wide_tag_is_sticky() {
        let mut buf = buffer(6, 1);
        buf.draw_text("a日b c".as_bytes(), 0, 0, 6, 0, 0);
        let wide: Vec<bool> = (0..6).map(|x| buf.get(x, 0).unwrap().is_wide()).collect();
        assert_eq!(wide, [false, true, true, true, true, false]);
    }

    #[test]
    fn draw_text_box_glyphs_are_not_wide() {
        let mut buf = buffer(3, 1);
        buf.draw_text("┌─┐".as_bytes(), 0, 0, 3, 0, 0);
        assert!((0..3).all(|x| !buf.get(x, 0).unwrap().is_wide()));
    }

    #[test]
    fn draw_box_outline_and_fill() {
        let mut buf = buffer(5, 4);
        buf.draw_box(0, 0, 5, 4, 3, 4);
        assert_eq!(buf.row_text(0), "┌───┐");
        assert_eq!(buf.row_text(1), "│   │");
        assert_eq!(buf.row_text(2), "│   │");
        assert_eq!(buf.row_text(3), "└───┘");
        let inside = buf.get(2, 1).unwrap();
        assert!(!inside.is_blank());
        assert_eq!((inside.fg, inside.bg), (3, 4));
    }

    #[test]
    fn invert_row_swaps_colors() {
        let mut buf = buffer(3, 1);
        buf.draw_text(b"abc", 0, 0, 3, 1, 2);
        buf.invert_row(1, 0, 1);
        assert_eq!(buf.get(0, 0).unwrap().fg, 1);
        let c = buf.get(1, 0).unwrap();
        assert_eq!((c.fg, c.bg), (2, 1));
    }

    // ── Generations ──────────────────────────────────────────────────────

    #[test]
    fn swap_exposes_previous_frame() {
        let mut buf = buffer(2, 1);
        buf.put(Cell::glyph("x", 0, 0), 0, 0);
        buf.swap();
        assert_eq!(buf.previous()[0].bytes(), b"x");
        assert!(buf.current()[0].is_blank());
        buf.put(Cell::glyph("y", 0, 0), 1, 0);
        buf.swap();
        assert_eq!(buf.row_text(0), "x ");
        buf.clear();
        assert_eq!(buf.row_text(0), "  ");
        assert_eq!(buf.previous()[1].bytes(), b"y");
    }

    #[test]
    fn row_text_out_of_range_is_empty() {
        let buf = buffer(2, 1);
        assert_eq!(buf.row_text(5), "");
    }
}
