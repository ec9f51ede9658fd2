// SPDX-License-Identifier: MIT
//
// Scope stack: nested coordinate frames for layout.
//
// Entry 0 is the root (the whole screen). Entering a scope resolves its
// directives against the innermost entry and pushes the result, so child
// widgets lay out relative to it. The stack has a fixed depth; entering
// beyond it is refused rather than overflowing. The stack is rebuilt
// every frame by re-entering scopes, so nothing stale survives a resize.

use crate::layout::{Dim, Rect, resolve};

/// Maximum scope depth, root included.
pub const MAX_SCOPE: usize = 20;

/// Bounded stack of resolved scope rects.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    entries: [Rect; MAX_SCOPE],
    top: usize,
}

impl ScopeStack {
    /// A stack holding only `root`.
    #[must_use]
    pub const fn new(root: Rect) -> Self {
        let mut entries = [Rect::new(0, 0, 0, 0); MAX_SCOPE];
        entries[0] = root;
        Self { entries, top: 0 }
    }

    /// The root rect.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> Rect {
        self.entries[0]
    }

    /// The innermost rect.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> Rect {
        self.entries[self.top]
    }

    /// Number of entered scopes above the root.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.top
    }

    /// Drop every entered scope and replace the root.
    pub const fn reset(&mut self, root: Rect) {
        self.entries[0] = root;
        self.top = 0;
    }

    /// Resolve directives against the innermost scope.
    #[inline]
    #[must_use]
    pub fn resolve(&self, x: Dim, y: Dim, w: Dim, h: Dim) -> Rect {
        resolve(self.current(), x, y, w, h)
    }

    /// Resolve and push a scope. Returns `false` (and pushes nothing) when
    /// the stack is full.
    pub fn enter(&mut self, x: Dim, y: Dim, w: Dim, h: Dim) -> bool {
        if self.top + 1 >= MAX_SCOPE {
            tracing::trace!(depth = self.top, "scope depth exhausted");
            return false;
        }
        let rect = self.resolve(x, y, w, h);
        self.top += 1;
        self.entries[self.top] = rect;
        true
    }

    /// Pop the innermost scope. The root is never popped; returns `false`
    /// when only the root is left.
    pub const fn exit(&mut self) -> bool {
        if self.top == 0 {
            return false;
        }
        self.top -= 1;
        true
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new(Rect::default())
    }
}
