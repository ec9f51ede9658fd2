// SPDX-License-Identifier: MIT
//
// Single-line text entry.
//
// `EditState` is owned by the application and outlives frames; the
// `edit` widget mutates it. The text is a `String` bounded to a fixed
// number of bytes, and the cursor and length are counted in codepoints.
// Inserts that would exceed the bound are dropped whole.
//
// Focus protocol: a click over the widget claims focus. While focused,
// every key event is consumed so no later widget in the same pass sees
// it. Enter confirms (the widget returns `true`) and Escape cancels; both
// release focus.

use tessel_term::{Event, KeyCode, KeyEvent};

use crate::layout::{Dim, Rect};
use crate::text::{byte_offset, char_count};
use crate::ui::{FocusId, Ui};

/// Byte budget of an edit buffer, terminator slot included.
pub const EDIT_CAPACITY: usize = 256;

/// Most content bytes an edit buffer holds.
pub const MAX_EDIT_BYTES: usize = EDIT_CAPACITY - 1;

/// Persistent state of an [`Ui::edit`] widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    id: FocusId,
    text: String,
    cursor: usize,
    len: usize,
}

impl EditState {
    /// A state holding `initial` (cut to the byte bound on a codepoint
    /// boundary) with the cursor at the end.
    #[must_use]
    pub fn new(initial: &str) -> Self {
        let mut state = Self {
            id: FocusId::next(),
            text: String::with_capacity(MAX_EDIT_BYTES),
            cursor: 0,
            len: 0,
        };
        state.set_text(initial);
        state
    }

    /// The focus identity of this state.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> FocusId {
        self.id
    }

    /// The current text.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in codepoints, `0..=len()`.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in codepoints.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the text is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Replace the text and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        let mut end = text.len().min(MAX_EDIT_BYTES);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        self.text.clear();
        self.text.push_str(&text[..end]);
        self.len = self.text.chars().count();
        self.cursor = self.len;
    }

    fn cursor_byte(&self) -> usize {
        byte_offset(self.text.as_bytes(), self.cursor)
    }

    /// Insert `s` at the cursor and advance past it. Returns `false` and
    /// changes nothing if the result would not fit.
    pub fn insert(&mut self, s: &str) -> bool {
        if self.text.len() + s.len() > MAX_EDIT_BYTES {
            return false;
        }
        let at = self.cursor_byte();
        self.text.insert_str(at, s);
        let n = char_count(s.as_bytes());
        self.len += n;
        self.cursor += n;
        true
    }

    /// Remove the codepoint at the cursor, if any.
    pub fn delete(&mut self) {
        if self.cursor < self.len {
            let at = self.cursor_byte();
            self.text.remove(at);
            self.len -= 1;
        }
    }

    /// Remove the codepoint before the cursor, if any, and move left.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.delete();
        }
    }

    /// Move the cursor one codepoint left.
    pub const fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor one codepoint right.
    pub const fn move_right(&mut self) {
        if self.cursor < self.len {
            self.cursor += 1;
        }
    }

    /// Move the cursor to the start.
    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor to the end.
    pub const fn move_end(&mut self) {
        self.cursor = self.len;
    }

    /// Apply a key. Returns `true` for Enter. Text keys insert what was
    /// typed minus control characters.
    fn apply(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter => return true,
            KeyCode::Delete => self.delete(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            KeyCode::Char(c) if c >= ' ' => {
                let typed: String = String::from_utf8_lossy(key.text())
                    .chars()
                    .filter(|c| !c.is_control())
                    .collect();
                self.insert(&typed);
            }
            _ => {}
        }
        false
    }
}

impl Default for EditState {
    fn default() -> Self {
        Self::new("")
    }
}

impl Ui {
    /// A bordered, three-row text entry. Returns `true` when Enter is
    /// pressed while it has focus.
    /// Color: byte 0 text, byte 1 background, byte 2 border.
    pub fn edit(
        &mut self,
        state: &mut EditState,
        x: impl Into<Dim>,
        y: impl Into<Dim>,
        w: impl Into<Dim>,
        color: u64,
    ) -> bool {
        let r = self.rect(x, y, w, 3);
        if self.is_drawing() {
            self.draw_edit(state, r, color);
        }

        if self.is_click_over(r) {
            self.set_focus(state.id());
            return false;
        }
        if !self.is_focused(state.id()) {
            return false;
        }
        let Event::Key(key) = *self.event() else {
            return false;
        };
        self.consume();

        match key.code {
            KeyCode::Escape => {
                self.clear_focus();
                false
            }
            _ => {
                let confirmed = state.apply(&key);
                if confirmed {
                    self.clear_focus();
                }
                confirmed
            }
        }
    }

    /// Border, then the text scrolled so the cursor stays inside the
    /// `w - 4` cell window, with the cursor cell inverted when focused.
    fn draw_edit(&mut self, state: &EditState, r: Rect, color: u64) {
        if r.is_empty() {
            return;
        }
        let [fg, bg, border, ..] = color.to_le_bytes();
        let (x, y, w) = (i32::from(r.x), i32::from(r.y), i32::from(r.w));
        let cells = self.cells_mut();
        cells.draw_box(x, y, w, i32::from(r.h), border, bg);
        if r.h < 2 {
            return;
        }

        let text = state.text().as_bytes();
        let window = usize::from(r.w.saturating_sub(4));
        if self.is_focused(state.id()) {
            let skip = state.cursor().saturating_sub(window);
            let col = state.cursor().min(window);
            let cells = self.cells_mut();
            cells.draw_text(&text[byte_offset(text, skip)..], x + 2, y + 1, w - 3, fg, bg);
            let col = i32::try_from(col).unwrap_or(i32::MAX);
            cells.invert_row(x + 2 + col, y + 1, 1);
        } else {
            self.cells_mut().draw_text(text, x + 2, y + 1, w - 3, fg, bg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tessel_term::{MouseButton, MouseEvent};

    fn state(text: &str, cursor: usize) -> EditState {
        let mut s = EditState::new(text);
        s.cursor = cursor;
        s
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code))
    }

    fn ui() -> Ui {
        let mut ui = Ui::with_capacity(20 * 4);
        ui.resize(20, 4);
        ui
    }

    fn click(x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent {
            button: MouseButton::Left,
            x,
            y,
        })
    }

    // ── State ───────────────────────────────────────────────────────────

    #[test]
    fn new_puts_cursor_at_end() {
        let s = EditState::new("héllo");
        assert_eq!((s.cursor(), s.len()), (5, 5));
        assert!(EditState::default().is_empty());
    }

    #[test]
    fn new_truncates_on_codepoint_boundary() {
        let long = "é".repeat(200);
        let s = EditState::new(&long);
        assert_eq!(s.text().len(), 254);
        assert_eq!(s.len(), 127);
    }

    #[test]
    fn insert_at_cursor() {
        let mut s = state("ac", 1);
        assert!(s.insert("b"));
        assert_eq!((s.text(), s.cursor(), s.len()), ("abc", 2, 3));
        assert!(s.insert("日本"));
        assert_eq!((s.text(), s.cursor(), s.len()), ("ab日本c", 4, 5));
    }

    #[test]
    fn insert_past_capacity_is_dropped() {
        let mut s = EditState::new(&"x".repeat(MAX_EDIT_BYTES - 1));
        assert!(!s.insert("é"));
        assert_eq!(s.len(), MAX_EDIT_BYTES - 1);
        assert!(s.insert("y"));
        assert_eq!(s.text().len(), MAX_EDIT_BYTES);
        assert!(!s.insert("z"));
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut s = state("ab", 2);
        s.backspace();
        assert_eq!((s.text(), s.cursor(), s.len()), ("a", 1, 1));
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut s = state("ab", 0);
        s.backspace();
        assert_eq!((s.text(), s.cursor(), s.len()), ("ab", 0, 2));
    }

    #[test]
    fn delete_removes_at_cursor() {
        let mut s = state("a日b", 1);
        s.delete();
        assert_eq!((s.text(), s.cursor(), s.len()), ("ab", 1, 2));
        s.move_end();
        s.delete();
        assert_eq!(s.text(), "ab");
    }

    #[test]
    fn cursor_moves_are_clamped() {
        let mut s = state("abc", 0);
        s.move_left();
        assert_eq!(s.cursor(), 0);
        s.move_end();
        s.move_right();
        assert_eq!(s.cursor(), 3);
        s.move_home();
        s.move_right();
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn control_text_is_not_inserted() {
        let mut s = EditState::new("");
        s.apply(&KeyEvent::with_text(KeyCode::Char('a'), b"a\x01b"));
        assert_eq!(s.text(), "ab");
        s.apply(&KeyEvent::new(KeyCode::Char('\u{1}')));
        assert_eq!(s.text(), "ab");
    }

    // ── Widget ──────────────────────────────────────────────────────────

    #[test]
    fn click_claims_focus() {
        let mut ui = ui();
        let mut s = EditState::new("");
        ui.begin_input(click(3, 1));
        assert!(!ui.edit(&mut s, 0, 0, 10, 0));
        assert!(ui.is_focused(s.id()));
    }

    #[test]
    fn keys_are_ignored_without_focus() {
        let mut ui = ui();
        let mut s = EditState::new("");
        ui.begin_input(key(KeyCode::Char('a')));
        ui.edit(&mut s, 0, 0, 10, 0);
        assert_eq!(s.text(), "");
        assert!(ui.is_key_press(KeyCode::Char('a')));
    }

    #[test]
    fn focused_edit_consumes_keys() {
        let mut ui = ui();
        let mut s = EditState::new("");
        ui.set_focus(s.id());
        ui.begin_input(key(KeyCode::Char('a')));
        ui.edit(&mut s, 0, 0, 10, 0);
        assert_eq!(s.text(), "a");
        assert_eq!(*ui.event(), Event::Void);
    }

    #[test]
    fn enter_confirms_and_releases_focus() {
        let mut ui = ui();
        let mut s = EditState::new("x");
        ui.set_focus(s.id());
        ui.begin_input(key(KeyCode::Enter));
        assert!(ui.edit(&mut s, 0, 0, 10, 0));
        assert_eq!(ui.focus(), None);
    }

    #[test]
    fn escape_releases_focus_without_confirming() {
        let mut ui = ui();
        let mut s = EditState::new("x");
        ui.set_focus(s.id());
        ui.begin_input(key(KeyCode::Escape));
        assert!(!ui.edit(&mut s, 0, 0, 10, 0));
        assert_eq!(ui.focus(), None);
        assert_eq!(s.text(), "x");
    }

    #[test]
    fn only_focused_edit_receives_key() {
        let mut ui = ui();
        let mut a = EditState::new("");
        let mut b = EditState::new("");
        ui.set_focus(b.id());
        ui.begin_input(key(KeyCode::Char('k')));
        ui.edit(&mut a, 0, 0, 10, 0);
        ui.edit(&mut b, 10, 0, 10, 0);
        assert_eq!((a.text(), b.text()), ("", "k"));
    }

    #[test]
    fn draws_text_inside_border() {
        let mut ui = ui();
        let mut s = EditState::new("hi");
        ui.begin_draw();
        ui.edit(&mut s, 0, 0, 10, 0);
        assert_eq!(ui.cells().row_text(0), "┌────────┐          ");
        assert_eq!(ui.cells().row_text(1), "│ hi     │          ");
        assert_eq!(ui.cells().row_text(2), "└────────┘          ");
    }

    #[test]
    fn focused_view_scrolls_to_cursor() {
        let mut ui = ui();
        let mut s = EditState::new("abcdefghij");
        ui.set_focus(s.id());
        ui.begin_draw();
        ui.edit(&mut s, 0, 0, 8, crate::widgets::colors(1, 2, 3));
        // window of 4: cursor at 10 shows "ghij" with the cursor past it
        assert_eq!(ui.cells().row_text(1), "│ ghij │            ");
        let cursor = ui.cells().get(6, 1).copied().unwrap_or_default();
        assert_eq!((cursor.fg, cursor.bg), (2, 3));
        let glyph = ui.cells().get(5, 1).copied().unwrap_or_default();
        assert_eq!((glyph.fg, glyph.bg), (1, 2));
    }
}
