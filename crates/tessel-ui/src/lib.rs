// SPDX-License-Identifier: MIT
//
// tessel-ui: immediate-mode widgets on top of tessel-term.
//
// Applications describe the whole screen every frame by calling widget
// methods on a `Ui`. Nothing is retained between frames except what the
// application owns (edit buffers, check and radio state) and the single
// keyboard focus. Layout is relative: each widget places itself with
// near/far/auto directives inside the innermost scope.
//
// The `EventLoop` owns the terminal driver and calls the application
// twice per input: once with the event, once to draw.

pub mod edit;
pub mod event_loop;
pub mod layout;
pub mod scope;
pub mod text;
pub mod ui;
pub mod widgets;

pub use edit::{EDIT_CAPACITY, EditState};
pub use event_loop::{Action, App, EventLoop, LoopConfig};
pub use layout::{A, Dim, Rect, far};
pub use scope::MAX_SCOPE;
pub use ui::{FocusId, Ui};
pub use widgets::{CheckState, colors};

pub use tessel_term::{Event, KeyCode};
