// SPDX-License-Identifier: MIT
//
// UTF-8 text metrics.
//
// Widgets measure text in glyphs, one glyph per cell. Counting works on
// raw bytes: every byte that is not a UTF-8 continuation byte starts a
// codepoint, and a codepoint counts toward display width unless it is an
// ASCII control character. No tables, no allocation.

/// Whether `b` starts a codepoint (is not a continuation byte).
#[inline]
#[must_use]
pub const fn is_lead(b: u8) -> bool {
    b & 0xC0 != 0x80
}

/// Whether `b` starts a codepoint that occupies a cell.
#[inline]
const fn is_visible_lead(b: u8) -> bool {
    is_lead(b) && b > 31
}

/// Number of codepoints in `s`.
///
/// ```
/// use tessel_ui::text::char_count;
///
/// assert_eq!(char_count("héllo".as_bytes()), 5);
/// ```
#[must_use]
pub fn char_count(s: &[u8]) -> usize {
    s.iter().filter(|&&b| is_lead(b)).count()
}

/// Byte offset of codepoint `pos` in `s`, or `s.len()` past the end.
#[must_use]
pub fn byte_offset(s: &[u8], pos: usize) -> usize {
    s.iter()
        .enumerate()
        .filter(|&(_, &b)| is_lead(b))
        .nth(pos)
        .map_or(s.len(), |(i, _)| i)
}

// ─── Extent ─────────────────────────────────────────────────────────────────

/// Size of a block of text in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtent {
    /// Width of the widest line.
    pub width: usize,
    /// Number of lines (0 for empty text).
    pub lines: usize,
}

/// Measure multi-line text: widest line and line count.
///
/// Every newline adds a line, so a trailing newline counts as an extra
/// (empty) line.
#[must_use]
pub fn measure(s: &[u8]) -> TextExtent {
    let mut extent = TextExtent {
        width: 0,
        lines: usize::from(!s.is_empty()),
    };
    let mut width = 0;
    for &b in s {
        if b == b'\n' {
            extent.lines += 1;
            width = 0;
        } else if is_visible_lead(b) {
            width += 1;
            extent.width = extent.width.max(width);
        }
    }
    extent
}

// ─── Lines ──────────────────────────────────────────────────────────────────

/// One line of text, without its newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Raw bytes of the line.
    pub bytes: &'a [u8],
    /// Visible glyph count.
    pub width: usize,
}

/// Iterator over the lines of a text. A trailing newline does not start
/// another line.
pub struct Lines<'a> {
    rest: &'a [u8],
}

/// Split `s` into lines.
///
/// ```
/// use tessel_ui::text::lines;
///
/// let widths: Vec<usize> = lines(b"ab\n\nxyz\n").map(|l| l.width).collect();
/// assert_eq!(widths, [2, 0, 3]);
/// ```
#[must_use]
pub const fn lines(s: &[u8]) -> Lines<'_> {
    Lines { rest: s }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self
            .rest
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(self.rest.len());
        let bytes = &self.rest[..end];
        self.rest = self.rest.get(end + 1..).unwrap_or_default();
        Some(Line {
            bytes,
            width: bytes.iter().filter(|&&b| is_visible_lead(b)).count(),
        })
    }
}
