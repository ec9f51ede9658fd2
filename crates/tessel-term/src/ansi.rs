// SPDX-License-Identifier: MIT
//
// Escape sequences, one function per terminal command.
//
// Each function appends its bytes to a writer and returns. Deciding when a
// sequence is needed belongs to the diff renderer; this file only encodes
// cursor addressing, xterm-256 colors, and the session mode switches.
//
// Callers pass zero-based cell coordinates; CUP wants one-based ones, so
// `cursor_to` adds one to each axis. Writing into an `OutputBuffer`
// cannot fail, but the signatures keep `io::Result` for arbitrary writers.
//
// Every sequence reaches the writer in a single `write_all`, so a
// capacity-bounded writer keeps or drops it whole.

use std::fmt;
use std::io::{self, Write};

/// Longest formatted sequence: CUP with two ten-digit coordinates.
const SEQ_MAX: usize = 32;

/// Format one sequence on the stack and hand it over in one write.
fn sequence(w: &mut impl Write, args: fmt::Arguments<'_>) -> io::Result<()> {
    let mut seq = [0u8; SEQ_MAX];
    let mut rest = &mut seq[..];
    rest.write_fmt(args)?;
    let len = SEQ_MAX - rest.len();
    w.write_all(&seq[..len])
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Place the cursor on column `x`, row `y` (CUP).
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u32, y: u32) -> io::Result<()> {
    let (row, col) = (u64::from(y) + 1, u64::from(x) + 1);
    sequence(w, format_args!("\x1b[{row};{col}H"))
}

/// `DECTCEM` off.
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// `DECTCEM` on.
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// SGR 0: back to the terminal's default colors.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[m")
}

/// Foreground from the 256-entry palette.
#[inline]
pub fn fg(w: &mut impl Write, idx: u8) -> io::Result<()> {
    sequence(w, format_args!("\x1b[38;5;{idx}m"))
}

/// Background from the 256-entry palette.
#[inline]
pub fn bg(w: &mut impl Write, idx: u8) -> io::Result<()> {
    sequence(w, format_args!("\x1b[48;5;{idx}m"))
}

// ─── Screen Modes ───────────────────────────────────────────────────────────

/// Switch to the alternate screen (private mode 1049) so the shell's
/// scrollback survives the session.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Back to the primary screen.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

/// Turn off private mode 2004 so a paste reads like typing.
#[inline]
pub fn disable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004l")
}

// ─── Mouse ──────────────────────────────────────────────────────────────────

/// Enable button press reporting with drag events, encoded in the SGR
/// extended format (DEC 1000 + 1002 + 1006).
///
/// SGR encoding has no 223-column coordinate limit and reports press and
/// release distinctly (`M` vs `m`).
pub fn enable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000h\x1b[?1002h\x1b[?1006h")
}

/// Disable all mouse tracking enabled by [`enable_mouse`].
pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000l\x1b[?1002l\x1b[?1006l")
}

// ─── Session ────────────────────────────────────────────────────────────────

/// Full session setup: bracketed paste off, alternate screen, hidden
/// cursor, SGR mouse reporting on.
pub fn enter_session(w: &mut impl Write) -> io::Result<()> {
    disable_bracketed_paste(w)?;
    enter_alt_screen(w)?;
    cursor_hide(w)?;
    enable_mouse(w)
}

/// Full session teardown, the reverse of [`enter_session`].
pub fn leave_session(w: &mut impl Write) -> io::Result<()> {
    disable_mouse(w)?;
    reset(w)?;
    cursor_show(w)?;
    exit_alt_screen(w)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
