// SPDX-License-Identifier: MIT
//
// Stateless and externally-stated widgets: frame, label, button, check
// and radio.
//
// Every widget resolves its rect against the innermost scope on every
// call. Painting happens only during the draw pass; click detection runs
// on every pass, since the click is only visible on the pass that
// delivers it.
//
// Colors are packed into a `u64`, one palette index per byte, byte 0 the
// least significant. Which byte feeds which role depends on the widget;
// see each method.

use tessel_term::Cell;

use crate::layout::{Dim, Rect};
use crate::text;
use crate::ui::Ui;

/// Pack up to three palette indices into a widget color value.
///
/// ```
/// assert_eq!(tessel_ui::colors(0x0f, 0x04, 0x0b), 0x0b_04_0f);
/// ```
#[inline]
#[must_use]
pub const fn colors(b0: u8, b1: u8, b2: u8) -> u64 {
    u64::from_le_bytes([b0, b1, b2, 0, 0, 0, 0, 0])
}

/// The first three palette indices of a packed color value.
#[inline]
const fn unpack(color: u64) -> (u8, u8, u8) {
    let [b0, b1, b2, ..] = color.to_le_bytes();
    (b0, b1, b2)
}

/// Substitute a content size for an `Auto` directive.
#[inline]
fn or_content(d: impl Into<Dim>, content: usize) -> Dim {
    match d.into() {
        Dim::Auto => Dim::from(content),
        other => other,
    }
}

// ─── Check State ────────────────────────────────────────────────────────────

/// State of a check box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CheckState {
    #[default]
    Unchecked,
    Checked,
    /// Neither; shown as `[-]`.
    Indeterminate,
}

impl CheckState {
    /// State after a click: unchecked becomes checked, anything else
    /// becomes unchecked.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Unchecked => Self::Checked,
            Self::Checked | Self::Indeterminate => Self::Unchecked,
        }
    }

    /// Whether the box is checked.
    #[inline]
    #[must_use]
    pub const fn is_checked(self) -> bool {
        matches!(self, Self::Checked)
    }

    const fn mark(self) -> &'static [u8] {
        match self {
            Self::Unchecked => b" ",
            Self::Checked => b"x",
            Self::Indeterminate => b"-",
        }
    }
}

impl From<bool> for CheckState {
    fn from(checked: bool) -> Self {
        if checked { Self::Checked } else { Self::Unchecked }
    }
}

// ─── Widgets ────────────────────────────────────────────────────────────────

impl Ui {
    /// Draw `text` at offset `dx` on row `dy` of `r`, at most `max`
    /// glyphs and never past the rect's right edge.
    #[allow(clippy::too_many_arguments)]
    fn text_in(&mut self, r: Rect, dx: u16, dy: u16, text: &[u8], max: usize, fg: u8, bg: u8) {
        if dx >= r.w || dy >= r.h {
            return;
        }
        let room = usize::from(r.w - dx).min(max);
        let w = i32::try_from(room).unwrap_or(i32::MAX);
        self.cells_mut().draw_text(
            text,
            i32::from(r.x) + i32::from(dx),
            i32::from(r.y) + i32::from(dy),
            w,
            fg,
            bg,
        );
    }

    fn boxed(&mut self, r: Rect, fg: u8, bg: u8) {
        if r.is_empty() {
            return;
        }
        self.cells_mut().draw_box(
            i32::from(r.x),
            i32::from(r.y),
            i32::from(r.w),
            i32::from(r.h),
            fg,
            bg,
        );
    }

    /// A bordered, filled box. Color: byte 0 border, byte 1 fill.
    pub fn frame(
        &mut self,
        x: impl Into<Dim>,
        y: impl Into<Dim>,
        w: impl Into<Dim>,
        h: impl Into<Dim>,
        color: u64,
    ) {
        if !self.is_drawing() {
            return;
        }
        let r = self.rect(x, y, w, h);
        let (border, fill, _) = unpack(color);
        self.boxed(r, border, fill);
    }

    /// Multi-line text on a filled background. `Auto` sizes to the widest
    /// line and the line count; overflow is clipped.
    /// Color: byte 0 text, byte 1 background.
    pub fn label(
        &mut self,
        text: &str,
        x: impl Into<Dim>,
        y: impl Into<Dim>,
        w: impl Into<Dim>,
        h: impl Into<Dim>,
        color: u64,
    ) {
        if !self.is_drawing() {
            return;
        }
        let extent = text::measure(text.as_bytes());
        let r = self.rect(x, y, or_content(w, extent.width), or_content(h, extent.lines));
        let (fg, bg, _) = unpack(color);
        self.cells_mut().fill_area(
            Cell::glyph(" ", fg, bg),
            i32::from(r.x),
            i32::from(r.y),
            i32::from(r.w),
            i32::from(r.h),
        );
        for (row, line) in (0..r.h).zip(text::lines(text.as_bytes())) {
            self.text_in(r, 0, row, line.bytes, line.width, fg, bg);
        }
    }

    /// A bordered button with a centered caption. Returns `true` when the
    /// current event is a left click inside it. `Auto` sizes to the
    /// caption plus padding and a height of 3.
    /// Color: byte 0 caption, byte 1 background, byte 2 border.
    pub fn button(
        &mut self,
        caption: &str,
        x: impl Into<Dim>,
        y: impl Into<Dim>,
        w: impl Into<Dim>,
        h: impl Into<Dim>,
        color: u64,
    ) -> bool {
        let tw = text::char_count(caption.as_bytes());
        let r = self.rect(x, y, or_content(w, tw + 4), or_content(h, 3));
        if self.is_drawing() {
            let (fg, bg, border) = unpack(color);
            self.boxed(r, border, bg);
            let dx = usize::from(r.w).saturating_sub(tw) / 2;
            let dx = u16::try_from(dx).unwrap_or(u16::MAX);
            self.text_in(r, dx, r.h / 2, caption.as_bytes(), tw, fg, bg);
        }
        self.is_click_over(r)
    }

    /// A check box with a caption, one row high. A click toggles `state`
    /// and returns `true`.
    /// Color: byte 0 text, byte 1 background, byte 2 mark.
    pub fn check(
        &mut self,
        caption: &str,
        state: &mut CheckState,
        x: impl Into<Dim>,
        y: impl Into<Dim>,
        w: impl Into<Dim>,
        color: u64,
    ) -> bool {
        let tw = text::char_count(caption.as_bytes());
        let r = self.rect(x, y, or_content(w, tw + 4), 1);
        if self.is_drawing() {
            self.toggle_row(r, b"[ ] ", state.mark(), caption, color);
        }
        let clicked = self.is_click_over(r);
        if clicked {
            *state = state.toggled();
        }
        clicked
    }

    /// A radio button, selected while `*state == value`. A click stores
    /// `value` into `state` and returns `true`.
    ///
    /// Buttons sharing one `state` form a group; their values should be
    /// distinct.
    /// Color: byte 0 text, byte 1 background, byte 2 mark.
    #[allow(clippy::too_many_arguments)]
    pub fn radio<T: Copy + PartialEq>(
        &mut self,
        caption: &str,
        state: &mut T,
        value: T,
        x: impl Into<Dim>,
        y: impl Into<Dim>,
        w: impl Into<Dim>,
        color: u64,
    ) -> bool {
        let tw = text::char_count(caption.as_bytes());
        let r = self.rect(x, y, or_content(w, tw + 4), 1);
        if self.is_drawing() {
            let mark: &[u8] = if *state == value { b"o" } else { b" " };
            self.toggle_row(r, b"( ) ", mark, caption, color);
        }
        let clicked = self.is_click_over(r);
        if clicked {
            *state = value;
        }
        clicked
    }

    /// Shared body of check and radio: bracket, mark, caption.
    fn toggle_row(&mut self, r: Rect, brackets: &[u8], mark: &[u8], caption: &str, color: u64) {
        let (fg, bg, mark_fg) = unpack(color);
        self.text_in(r, 0, 0, brackets, 4, fg, bg);
        self.text_in(r, 1, 0, mark, 1, mark_fg, bg);
        self.text_in(r, 4, 0, caption.as_bytes(), usize::MAX, fg, bg);
    }
}
