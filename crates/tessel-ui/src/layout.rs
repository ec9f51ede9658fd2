// SPDX-License-Identifier: MIT
//
// Layout directives and the resolver.
//
// Every widget call places itself with four directives, x, y, w and h,
// relative to the innermost scope. Each is one of:
//
//   Near(n)  x/y: offset n from the left/top edge.  w/h: exactly n cells.
//   Far(n)   x/y: anchored n cells from the right/bottom edge.
//            w/h: stretch until n cells before the right/bottom edge.
//   Auto     x/y: centered.  w/h: the widget's content size if it has one,
//            otherwise fill (same as Far(0)).
//
// Integer literals convert into directives: non-negative values are
// `Near`, negative values count from the far edge (`-1` is `Far(0)`,
// `-3` is `Far(2)`), which keeps call sites terse:
//
//   ui.button("OK", -2, -2, A, A, color);   // bottom-right corner
//
// Resolution is a pure function of the parent rect and the directives.
// The result is clipped to the parent, so it never escapes its scope.

/// Sentinel for automatic position (centered) or size (content/fill).
pub const A: Dim = Dim::Auto;

/// A far-edge anchored position or a fill-to-margin size.
#[inline]
#[must_use]
pub const fn far(n: u16) -> Dim {
    Dim::Far(n)
}

// ─── Dim ────────────────────────────────────────────────────────────────────

/// One layout directive along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    /// Offset from the near edge, or a fixed size.
    Near(u16),
    /// Offset from the far edge, or a size leaving a far margin.
    Far(u16),
    /// Centered position, or content/fill size.
    Auto,
}

impl From<u16> for Dim {
    #[inline]
    fn from(n: u16) -> Self {
        Self::Near(n)
    }
}

impl From<i32> for Dim {
    fn from(n: i32) -> Self {
        let clamp = |v: i32| u16::try_from(v).unwrap_or(u16::MAX);
        if n >= 0 {
            Self::Near(clamp(n))
        } else {
            Self::Far(clamp(-(n + 1)))
        }
    }
}

impl From<usize> for Dim {
    #[inline]
    fn from(n: usize) -> Self {
        Self::Near(u16::try_from(n).unwrap_or(u16::MAX))
    }
}

// ─── Rect ───────────────────────────────────────────────────────────────────

/// An absolute screen rectangle in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    /// Left column.
    pub x: u16,
    /// Top row.
    pub y: u16,
    /// Width in columns.
    pub w: u16,
    /// Height in rows.
    pub h: u16,
}

impl Rect {
    /// Create a rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(self) -> u32 {
        self.x as u32 + self.w as u32
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> u32 {
        self.y as u32 + self.h as u32
    }

    /// Whether the rectangle has zero area.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Whether the cell `(px, py)` lies inside.
    #[inline]
    #[must_use]
    pub const fn contains(self, px: u16, py: u16) -> bool {
        px >= self.x && (px as u32) < self.right() && py >= self.y && (py as u32) < self.bottom()
    }

    /// Whether `other` lies entirely inside `self`.
    #[must_use]
    pub const fn encloses(self, other: Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

// ─── Resolver ───────────────────────────────────────────────────────────────

/// Resolve directives against `parent` into an absolute rect.
///
/// ```
/// use tessel_ui::layout::{resolve, Dim, Rect, A};
///
/// let screen = Rect::new(0, 0, 80, 24);
/// let r = resolve(screen, A, 2.into(), Dim::Near(10), Dim::Near(3));
/// assert_eq!(r, Rect::new(35, 2, 10, 3));
/// ```
#[must_use]
pub fn resolve(parent: Rect, x: Dim, y: Dim, w: Dim, h: Dim) -> Rect {
    let (rx, rw) = resolve_axis(i32::from(parent.x), i32::from(parent.w), x, w);
    let (ry, rh) = resolve_axis(i32::from(parent.y), i32::from(parent.h), y, h);
    Rect::new(rx, ry, rw, rh)
}

/// One axis: parent start/length and the position/size directives.
/// Returns the start and length clipped to the parent.
fn resolve_axis(start: i32, span: i32, pos: Dim, len: Dim) -> (u16, u16) {
    let pos = if pos == Dim::Auto && len == Dim::Auto {
        Dim::Near(0)
    } else {
        pos
    };

    let near_offset = match pos {
        Dim::Near(n) => i32::from(n),
        _ => 0,
    };
    let length = match len {
        Dim::Near(n) => i32::from(n),
        Dim::Far(n) => span - near_offset - i32::from(n),
        Dim::Auto => span - near_offset,
    }
    .max(0);

    let from = match pos {
        Dim::Near(n) => start + i32::from(n),
        Dim::Far(n) => start + span - length - i32::from(n),
        Dim::Auto => start + (span - length) / 2,
    };

    let lo = from.clamp(start, start + span);
    let hi = (from + length).clamp(lo, start + span);
    let clip = |v: i32| u16::try_from(v).unwrap_or(0);
    (clip(lo), clip(hi - lo))
}
