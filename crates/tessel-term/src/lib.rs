// SPDX-License-Identifier: MIT
//
// tessel-term: terminal layer for the tessel immediate-mode UI engine.
//
// Everything between the widget calls and the terminal's bytes: a fixed
// capacity, double-buffered grid of palette-colored glyph cells, a diff
// renderer that turns two generations of that grid into a minimal
// xterm-256 escape stream, a stateless decoder for key and SGR mouse
// input, and the driver seam that owns raw mode, the alternate screen
// and resize notifications.
//
// The only output format is xterm-256 color and CUP addressing, and the
// only input formats are legacy keys and SGR mouse reports.
// Nothing here allocates after startup: buffers are sized once for the
// largest supported screen and overflow degrades instead of growing.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod error;
pub mod input;
pub mod output;
pub mod terminal;

pub use buffer::{CellBuffer, MAX_CELLS};
pub use cell::Cell;
pub use diff::{DiffRenderer, RenderStats};
pub use error::{Error, Result};
pub use input::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent};
pub use terminal::{Driver, Size, Wake};
