// SPDX-License-Identifier: MIT
//
// Cell: one glyph with its palette colors.
//
// Every character position on screen is a Cell. It holds the raw UTF-8
// bytes of one glyph, a foreground and background palette index, and a
// flag marking glyphs that may occupy two terminal columns. The whole
// rendering pipeline exists to produce, diff, and output these.
//
// Size: 8 bytes per cell. Two generations of 0x20000 cells cost 2 MB,
// allocated once and never grown.
//
// Glyphs are stored as bytes, not `char`s, because the renderer emits
// them verbatim and the diff compares whole cells byte for byte. A cell
// with zero bytes is blank and renders as a single space.
//
// Wide glyphs: there is no portable way to ask a terminal how wide a
// glyph is. `maybe_wide` is a deliberately small heuristic: anything
// below U+1000 and the box-drawing/block/geometric range are narrow,
// everything else of three or more bytes might not be. The renderer uses
// the flag to re-home the cursor after such glyphs.

use bitflags::bitflags;

// ─── Cell Flags ──────────────────────────────────────────────────────────────

bitflags! {
    /// Per-cell rendering flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CellFlags: u8 {
        /// The glyph (or an earlier glyph of the same string) may be two
        /// columns wide; the renderer cannot trust the cursor position
        /// after it.
        const WIDE = 1 << 0;
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// Maximum number of UTF-8 bytes in one glyph.
pub const GLYPH_BYTES: usize = 4;

/// A single terminal cell: one glyph plus its palette colors.
///
/// # Layout (8 bytes)
///
/// ```text
/// ┌────┬────┬───────┬─────┬─────────────┐
/// │ fg │ bg │ flags │ len │ bytes [u8;4] │
/// └────┴────┴───────┴─────┴─────────────┘
/// ```
///
/// Invariant: `len <= 4`. Bytes past `len` are always zero so that
/// derived equality is a plain byte comparison.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Foreground palette index (xterm-256).
    pub fg: u8,
    /// Background palette index (xterm-256).
    pub bg: u8,
    /// Rendering flags.
    pub flags: CellFlags,
    len: u8,
    bytes: [u8; GLYPH_BYTES],
}

impl Cell {
    /// A blank cell: no glyph, palette index 0 on 0.
    pub const BLANK: Self = Self {
        fg: 0,
        bg: 0,
        flags: CellFlags::empty(),
        len: 0,
        bytes: [0; GLYPH_BYTES],
    };

    /// Build a cell from the first glyph of `s`.
    ///
    /// Takes the lead byte and every following UTF-8 continuation byte,
    /// up to four bytes in total. An empty input yields a blank cell.
    ///
    /// ```
    /// use tessel_term::cell::Cell;
    ///
    /// let c = Cell::glyph("┌──", 7, 0);
    /// assert_eq!(c.bytes(), "┌".as_bytes());
    /// assert!(Cell::glyph("", 7, 0).is_blank());
    /// ```
    #[must_use]
    pub fn glyph(s: &str, fg: u8, bg: u8) -> Self {
        Self::from_bytes(s.as_bytes(), fg, bg)
    }

    /// Build a cell from the first glyph of a UTF-8 byte slice.
    ///
    /// Continuation bytes are taken without validation; a stray
    /// continuation byte as lead still yields a one-byte glyph.
    #[must_use]
    pub fn from_bytes(src: &[u8], fg: u8, bg: u8) -> Self {
        let mut cell = Self {
            fg,
            bg,
            ..Self::BLANK
        };
        let Some(&lead) = src.first() else {
            return cell;
        };
        cell.bytes[0] = lead;
        cell.len = 1;
        for &b in src.iter().skip(1).take(GLYPH_BYTES - 1) {
            if b & 0xC0 != 0x80 {
                break;
            }
            cell.bytes[usize::from(cell.len)] = b;
            cell.len += 1;
        }
        cell
    }

    /// Build a cell from a `char`.
    #[must_use]
    pub fn from_char(ch: char, fg: u8, bg: u8) -> Self {
        let mut enc = [0u8; GLYPH_BYTES];
        Self::glyph(ch.encode_utf8(&mut enc), fg, bg)
    }

    // ─── Queries ──────────────────────────────────────────────────────────

    /// The raw UTF-8 bytes of the glyph (empty for blank cells).
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Number of glyph bytes (0–4).
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the cell holds no glyph (renders as a space).
    #[inline]
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.len == 0
    }

    /// Whether the cell renders as a space, either blank or a literal space.
    #[inline]
    #[must_use]
    pub const fn is_space(&self) -> bool {
        self.len == 0 || self.bytes[0] == b' '
    }

    /// Whether the cell carries the wide-glyph flag.
    #[inline]
    #[must_use]
    pub const fn is_wide(&self) -> bool {
        self.flags.contains(CellFlags::WIDE)
    }

    // ─── Mutations ────────────────────────────────────────────────────────

    /// Return the cell with the wide flag set or cleared.
    #[inline]
    #[must_use]
    pub fn with_wide(mut self, wide: bool) -> Self {
        self.flags.set(CellFlags::WIDE, wide);
        self
    }

    /// Swap foreground and background.
    #[inline]
    pub fn invert(&mut self) {
        std::mem::swap(&mut self.fg, &mut self.bg);
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::BLANK
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_blank() {
            write!(f, "Cell(blank")?;
        } else {
            write!(f, "Cell({:?}", String::from_utf8_lossy(self.bytes()))?;
        }
        write!(f, ", fg={}, bg={}", self.fg, self.bg)?;
        if self.is_wide() {
            write!(f, ", wide")?;
        }
        write!(f, ")")
    }
}

// ─── Width Heuristic ─────────────────────────────────────────────────────────

/// Whether a UTF-8 glyph could be rendered two columns wide.
///
/// Width depends on glyph, terminal, and font; this is a best-effort
/// guess tuned for the common case. U+0000–U+0FFF (Latin through Tibetan)
/// and U+2500–U+25FF (box drawing, block elements, geometric shapes) are
/// narrow. Everything else with three or more bytes might be wide.
///
/// ```
/// use tessel_term::cell::maybe_wide;
///
/// assert!(!maybe_wide("a".as_bytes()));
/// assert!(!maybe_wide("─".as_bytes()));
/// assert!(maybe_wide("彁".as_bytes()));
/// ```
#[must_use]
pub fn maybe_wide(glyph: &[u8]) -> bool {
    match glyph {
        [] => false,
        [lead, ..] if glyph.len() < 3 || *lead < 0xE1 => false,
        [0xE2, second, ..] if (0x94..0x98).contains(second) => false,
        _ => true,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
