// SPDX-License-Identifier: MIT
//
// The UI context threaded through every widget call.
//
// `Ui` owns everything a frame needs: the current event, keyboard focus,
// the scope stack and the cell buffer. The event loop drives it through
// two stages per input: `begin_input` delivers a real event, `begin_draw`
// clears the grid and delivers the synthetic Draw event. Widgets read the
// event, paint during Draw, and may consume a key so later widgets in the
// same pass ignore it.

use std::sync::atomic::{AtomicU64, Ordering};

use tessel_term::{CellBuffer, Event, KeyCode};

use crate::layout::{Dim, Rect};
use crate::scope::ScopeStack;

// ─── Focus ──────────────────────────────────────────────────────────────────

/// Opaque identity of a focusable widget state.
///
/// Issued from a process-wide counter, so two states never share an id
/// and identity does not depend on where the state lives in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusId(u64);

impl FocusId {
    /// Issue a fresh id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// ─── Ui ─────────────────────────────────────────────────────────────────────

/// Per-run UI state: current event, focus, scopes and cells.
#[derive(Debug)]
pub struct Ui {
    event: Event,
    focus: Option<FocusId>,
    scopes: ScopeStack,
    cells: CellBuffer,
}

impl Ui {
    /// A context with the default cell capacity and a 0×0 screen.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cells(CellBuffer::new())
    }

    /// A context whose cell buffer holds at most `capacity` cells.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_cells(CellBuffer::with_capacity(capacity))
    }

    fn with_cells(cells: CellBuffer) -> Self {
        Self {
            event: Event::Draw,
            focus: None,
            scopes: ScopeStack::default(),
            cells,
        }
    }

    /// Screen size as `(cols, rows)`.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.cells.width(), self.cells.height())
    }

    /// Resize the screen. Returns `true` if the size changed; a size too
    /// large for the cell buffer is rejected and the old size kept.
    pub fn resize(&mut self, cols: u16, rows: u16) -> bool {
        let changed = self.cells.resize(cols, rows);
        self.scopes.reset(self.screen());
        changed
    }

    const fn screen(&self) -> Rect {
        Rect::new(0, 0, self.cells.width(), self.cells.height())
    }

    // ─── Stages ──────────────────────────────────────────────────────────

    /// Deliver a real event. A left click drops focus first; a widget
    /// under the pointer may claim it again during this pass.
    pub fn begin_input(&mut self, event: Event) {
        if event.is_left_click() {
            self.focus = None;
        }
        self.event = event;
    }

    /// Start a draw pass: blank the grid, reset scopes to the screen and
    /// make Draw the current event.
    pub fn begin_draw(&mut self) {
        self.cells.clear();
        self.scopes.reset(self.screen());
        self.event = Event::Draw;
    }

    // ─── Event Queries ───────────────────────────────────────────────────

    /// The current event.
    #[inline]
    #[must_use]
    pub const fn event(&self) -> &Event {
        &self.event
    }

    /// Whether this is the draw pass.
    #[inline]
    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        matches!(self.event, Event::Draw)
    }

    /// Whether the current event is a press of `code`.
    #[inline]
    #[must_use]
    pub fn is_key_press(&self, code: KeyCode) -> bool {
        self.event.is_key(code)
    }

    /// Whether the current event is a left click anywhere.
    #[inline]
    #[must_use]
    pub const fn is_left_click(&self) -> bool {
        self.event.is_left_click()
    }

    /// Whether the current event is a mouse event inside `r`.
    #[must_use]
    pub const fn is_mouse_over(&self, r: Rect) -> bool {
        match self.event {
            Event::Mouse(m) => r.contains(m.x, m.y),
            _ => false,
        }
    }

    /// Whether the current event is a left click inside `r`.
    #[must_use]
    pub const fn is_click_over(&self, r: Rect) -> bool {
        match self.event.left_click() {
            Some((x, y)) => r.contains(x, y),
            None => false,
        }
    }

    /// Mark the current event as handled.
    #[inline]
    pub const fn consume(&mut self) {
        self.event = Event::Void;
    }

    // ─── Focus ───────────────────────────────────────────────────────────

    /// The focused widget, if any.
    #[inline]
    #[must_use]
    pub const fn focus(&self) -> Option<FocusId> {
        self.focus
    }

    /// Whether `id` has focus.
    #[inline]
    #[must_use]
    pub fn is_focused(&self, id: FocusId) -> bool {
        self.focus == Some(id)
    }

    /// Give focus to `id`.
    #[inline]
    pub const fn set_focus(&mut self, id: FocusId) {
        self.focus = Some(id);
    }

    /// Drop focus.
    #[inline]
    pub const fn clear_focus(&mut self) {
        self.focus = None;
    }

    // ─── Cells ───────────────────────────────────────────────────────────

    /// The cell buffer.
    #[inline]
    #[must_use]
    pub const fn cells(&self) -> &CellBuffer {
        &self.cells
    }

    /// The cell buffer, for custom drawing.
    #[inline]
    pub const fn cells_mut(&mut self) -> &mut CellBuffer {
        &mut self.cells
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// The innermost scope.
    #[inline]
    #[must_use]
    pub const fn scope_rect(&self) -> Rect {
        self.scopes.current()
    }

    /// Number of entered scopes.
    #[inline]
    #[must_use]
    pub const fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Resolve directives against the innermost scope.
    #[must_use]
    pub fn rect(
        &self,
        x: impl Into<Dim>,
        y: impl Into<Dim>,
        w: impl Into<Dim>,
        h: impl Into<Dim>,
    ) -> Rect {
        self.scopes.resolve(x.into(), y.into(), w.into(), h.into())
    }

    /// Run `body` inside a nested scope.
    ///
    /// Widgets called from `body` lay out relative to the scope's rect.
    /// When the scope stack is full, `body` is skipped and `None` is
    /// returned.
    ///
    /// ```
    /// use tessel_ui::{Ui, A};
    ///
    /// let mut ui = Ui::with_capacity(80 * 24);
    /// ui.resize(80, 24);
    /// let inner = ui.scope(A, A, 20, 6, |ui| ui.scope_rect());
    /// assert_eq!(inner.map(|r| (r.x, r.y)), Some((30, 9)));
    /// ```
    pub fn scope<R>(
        &mut self,
        x: impl Into<Dim>,
        y: impl Into<Dim>,
        w: impl Into<Dim>,
        h: impl Into<Dim>,
        body: impl FnOnce(&mut Self) -> R,
    ) -> Option<R> {
        if !self.scopes.enter(x.into(), y.into(), w.into(), h.into()) {
            return None;
        }
        let depth = self.scopes.depth();
        let out = body(self);
        debug_assert_eq!(self.scopes.depth(), depth, "unbalanced scope");
        self.scopes.exit();
        Some(out)
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}
