// SPDX-License-Identifier: MIT
//
// Differential renderer. Turns two cell frames into the bytes that change.
//
// Instead of redrawing the entire screen every frame, we compare the
// current generation of the CellBuffer against the previous one and skip
// everything that did not change. A keystroke in a dialog touches a few
// cells out of thousands; the output shrinks accordingly.
//
// Per frame:
//
//   1. Widgets paint the current generation of the CellBuffer.
//   2. DiffRenderer::render() scans it row-major, skipping aligned runs of
//      SKIP_RUN cells identical to the previous frame.
//   3. Everything else goes to the OutputBuffer with the minimum of cursor
//      moves and color changes.
//   4. The caller hands the bytes to the driver in one write and swaps the
//      CellBuffer generations.
//
// Scan state:
//
//   - fg/bg: the last palette indices emitted this frame (unset at start,
//     so the first rendered cell always sets both).
//   - skip: the previous run was skipped, the terminal cursor is elsewhere.
//   - wide: the terminal cursor may be one column further right than we
//     think because a possibly-wide glyph was emitted. Spaces after it
//     keep the uncertainty alive; the first narrow non-space cell re-homes.
//
// Runs are never skipped in a frame that follows a resize: the previous
// generation no longer matches what the terminal shows.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::CellBuffer;
use crate::output::OutputBuffer;

/// Cells compared at a time by the skip optimization.
pub const SKIP_RUN: usize = 8;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// What one `render` call did, as counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells emitted to the output.
    pub cells_rendered: usize,
    /// Cells inside skipped runs.
    pub cells_skipped: usize,
    /// Explicit cursor moves emitted.
    pub cursor_moves: usize,
    /// Total bytes of output generated.
    pub bytes_written: usize,
}

impl RenderStats {
    /// Cells examined in the pass.
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Differential renderer producing one frame of output at a time.
///
/// # Usage
///
/// ```
/// use tessel_term::buffer::CellBuffer;
/// use tessel_term::diff::DiffRenderer;
///
/// let mut cells = CellBuffer::with_capacity(80 * 24);
/// cells.resize(80, 24);
/// let mut renderer = DiffRenderer::new();
///
/// cells.draw_text(b"hi", 0, 0, 2, 7, 0);
/// let stats = renderer.render(&cells);
/// assert_eq!(stats.total_cells(), 80 * 24);
/// // ...write renderer.output_bytes() to the terminal, then:
/// cells.swap();
/// ```
pub struct DiffRenderer {
    output: OutputBuffer,
}

impl DiffRenderer {
    /// Create a renderer with the default output capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
        }
    }

    /// Create a renderer whose output holds at most `capacity` bytes.
    #[must_use]
    pub fn with_output_capacity(capacity: usize) -> Self {
        Self {
            output: OutputBuffer::with_capacity(capacity),
        }
    }

    /// Output of the last [`render`](Self::render).
    #[inline]
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Diff the current generation of `cells` against the previous one
    /// and build the frame's output.
    ///
    /// Does not swap generations; call [`CellBuffer::swap`] once the
    /// output has been written.
    #[allow(clippy::cast_possible_truncation)] // cell indices are < MAX_CELLS
    pub fn render(&mut self, cells: &CellBuffer) -> RenderStats {
        self.output.clear();
        let mut stats = RenderStats::default();

        let width = usize::from(cells.width());
        let area = cells.area();
        let current = cells.current();
        let previous = cells.previous();
        let resized = cells.is_resized();

        let mut fg: Option<u8> = None;
        let mut bg: Option<u8> = None;
        let mut wide = false;
        let mut skip = false;

        let out = &mut self.output;
        let mut i = 0;
        while i < area {
            if !resized && i % SKIP_RUN == 0 {
                let end = (i + SKIP_RUN).min(area);
                if current[i..end] == previous[i..end] {
                    stats.cells_skipped += end - i;
                    skip = true;
                    i = end;
                    continue;
                }
            }

            let cell = &current[i];
            let new_line = i % width == 0;
            let wide_spill = wide && cell.is_space();
            let wide_flank = wide && !wide_spill && !cell.is_wide();
            if new_line || wide_flank || skip {
                ansi::cursor_to(out, (i % width) as u32, (i / width) as u32).ok();
                stats.cursor_moves += 1;
            }
            wide = cell.is_wide() || wide_spill;
            skip = false;

            if fg != Some(cell.fg) {
                fg = Some(cell.fg);
                ansi::fg(out, cell.fg).ok();
            }
            if bg != Some(cell.bg) {
                bg = Some(cell.bg);
                ansi::bg(out, cell.bg).ok();
            }

            if cell.is_blank() {
                out.push(b' ');
            } else {
                out.push_bytes(cell.bytes());
            }
            stats.cells_rendered += 1;
            i += 1;
        }

        stats.bytes_written = self.output.len();
        if self.output.dropped() > 0 {
            tracing::warn!(dropped = self.output.dropped(), "frame output truncated");
        }
        tracing::trace!(
            rendered = stats.cells_rendered,
            skipped = stats.cells_skipped,
            bytes = stats.bytes_written,
            "frame rendered"
        );
        stats
    }

    /// Write the last frame's output to `w`.
    ///
    /// # Errors
    ///
    /// Fails only when `w` does.
    pub fn flush_to(&self, w: &mut impl Write) -> io::Result<()> {
        if !self.output.is_empty() {
            w.write_all(self.output.as_bytes())?;
            w.flush()?;
        }
        Ok(())
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use pretty_assertions::assert_eq;

    fn buffer(w: u16, h: u16) -> CellBuffer {
        let mut buf = CellBuffer::with_capacity(usize::from(w) * usize::from(h));
        buf.resize(w, h);
        buf
    }

    fn output(r: &DiffRenderer) -> String {
        String::from_utf8_lossy(r.output_bytes()).into_owned()
    }

    /// Render, then swap and redraw `paint` into the fresh generation.
    fn settle(buf: &mut CellBuffer, r: &mut DiffRenderer, paint: impl Fn(&mut CellBuffer)) {
        paint(buf);
        r.render(buf);
        buf.swap();
        buf.clear();
    }

    // ── Full frames ──────────────────────────────────────────────────────

    #[test]
    fn first_frame_renders_every_cell() {
        let mut buf = buffer(2, 1);
        buf.draw_text(b"ab", 0, 0, 2, 1, 2);
        let mut r = DiffRenderer::new();
        let stats = r.render(&buf);
        assert_eq!(output(&r), "\x1b[1;1H\x1b[38;5;1m\x1b[48;5;2mab");
        assert_eq!(stats.cells_rendered, 2);
        assert_eq!(stats.cells_skipped, 0);
        assert_eq!(stats.bytes_written, r.output_bytes().len());
    }

    #[test]
    fn blank_cells_render_as_spaces() {
        let buf = buffer(3, 1);
        let mut r = DiffRenderer::new();
        r.render(&buf);
        assert_eq!(output(&r), "\x1b[1;1H\x1b[38;5;0m\x1b[48;5;0m   ");
    }

    #[test]
    fn each_row_is_rehomed() {
        let buf = buffer(2, 2);
        let mut r = DiffRenderer::new();
        let stats = r.render(&buf);
        assert!(output(&r).contains("\x1b[2;1H"));
        assert_eq!(stats.cursor_moves, 2);
    }

    #[test]
    fn colors_only_emitted_on_change() {
        let mut buf = buffer(4, 1);
        buf.draw_text(b"aa", 0, 0, 2, 5, 6);
        buf.draw_text(b"bb", 2, 0, 2, 5, 9);
        let mut r = DiffRenderer::new();
        r.render(&buf);
        assert_eq!(
            output(&r),
            "\x1b[1;1H\x1b[38;5;5m\x1b[48;5;6maa\x1b[48;5;9mbb"
        );
    }

    #[test]
    fn empty_buffer_renders_nothing() {
        let buf = CellBuffer::with_capacity(0);
        let mut r = DiffRenderer::new();
        let stats = r.render(&buf);
        assert!(r.output_bytes().is_empty());
        assert_eq!(stats.total_cells(), 0);
    }

    // ── Skip optimization ────────────────────────────────────────────────

    #[test]
    fn unchanged_frame_emits_nothing() {
        let mut buf = buffer(10, 3);
        let mut r = DiffRenderer::new();
        let paint = |b: &mut CellBuffer| b.draw_text(b"static", 1, 1, 6, 3, 4);
        settle(&mut buf, &mut r, paint);
        paint(&mut buf);
        let stats = r.render(&buf);
        assert!(r.output_bytes().is_empty());
        assert_eq!(stats.cells_skipped, 30);
    }

    #[test]
    fn changed_run_is_rendered_after_rehome() {
        let mut buf = buffer(16, 1);
        let mut r = DiffRenderer::new();
        settle(&mut buf, &mut r, |_| {});
        buf.put(Cell::glyph("x", 0, 0), 12, 0);
        let stats = r.render(&buf);
        assert_eq!(
            output(&r),
            "\x1b[1;9H\x1b[38;5;0m\x1b[48;5;0m    x   "
        );
        assert_eq!(stats.cells_skipped, 8);
        assert_eq!(stats.cells_rendered, 8);
    }

    #[test]
    fn resize_disables_skipping() {
        let mut buf = CellBuffer::with_capacity(64);
        buf.resize(8, 1);
        let mut r = DiffRenderer::new();
        settle(&mut buf, &mut r, |_| {});
        buf.resize(4, 2);
        let stats = r.render(&buf);
        assert_eq!(stats.cells_skipped, 0);
        assert_eq!(stats.cells_rendered, 8);
    }

    #[test]
    fn partial_trailing_run_is_compared() {
        let mut buf = buffer(5, 2);
        let mut r = DiffRenderer::new();
        settle(&mut buf, &mut r, |_| {});
        buf.put(Cell::glyph("z", 0, 0), 4, 1);
        let stats = r.render(&buf);
        assert_eq!(stats.cells_skipped, 8);
        assert_eq!(output(&r), "\x1b[2;4H\x1b[38;5;0m\x1b[48;5;0m z");
    }

    // ── Wide glyphs ──────────────────────────────────────────────────────

    #[test]
    fn narrow_cell_after_wide_glyph_is_rehomed() {
        let mut buf = buffer(4, 1);
        buf.draw_text("日".as_bytes(), 0, 0, 1, 0, 0);
        buf.put(Cell::glyph("x", 0, 0), 1, 0);
        let mut r = DiffRenderer::new();
        r.render(&buf);
        assert!(output(&r).contains("日\x1b[1;2Hx"));
    }

    #[test]
    fn spaces_after_wide_glyph_defer_rehome() {
        let mut buf = buffer(4, 1);
        buf.draw_text("日".as_bytes(), 0, 0, 1, 0, 0);
        buf.put(Cell::glyph("x", 0, 0), 3, 0);
        let mut r = DiffRenderer::new();
        let stats = r.render(&buf);
        assert!(output(&r).contains("日  \x1b[1;4Hx"));
        assert_eq!(stats.cursor_moves, 2);
    }

    #[test]
    fn wide_tagged_string_is_written_contiguously() {
        let mut buf = buffer(4, 1);
        buf.draw_text("日ab".as_bytes(), 0, 0, 3, 0, 0);
        let mut r = DiffRenderer::new();
        let stats = r.render(&buf);
        assert!(output(&r).ends_with("日ab "));
        assert_eq!(stats.cursor_moves, 1);
    }

    // ── Capacity ─────────────────────────────────────────────────────────

    #[test]
    fn output_capacity_bounds_frame() {
        let mut buf = buffer(20, 5);
        for y in 0..5 {
            for x in 0..20 {
                buf.put(Cell::glyph("#", (x * 7 % 256) as u8, y as u8), x, y);
            }
        }
        let mut r = DiffRenderer::with_output_capacity(64);
        let stats = r.render(&buf);
        assert!(r.output_bytes().len() <= 64);
        assert_eq!(stats.bytes_written, r.output_bytes().len());
    }

    #[test]
    fn flush_to_writes_output() {
        let mut buf = buffer(1, 1);
        buf.put(Cell::glyph("q", 1, 1), 0, 0);
        let mut r = DiffRenderer::new();
        r.render(&buf);
        let mut sink = Vec::new();
        r.flush_to(&mut sink).unwrap();
        assert_eq!(sink, r.output_bytes());
    }
}
