// SPDX-License-Identifier: MIT
//
// Terminal control: the driver seam plus raw mode and cleanup on drop.
//
// Unsafe: termios, TIOCGWINSZ, isatty, poll(2) and raw reads and writes
// on fds 0 and 1 are all libc calls. Each block wraps a single call.
#![allow(unsafe_code)]
//
// The UI core never touches the terminal directly. It talks to a `Driver`:
// enter and leave the session, write a frame, query the size, and block
// until input, a resize, or a timeout. `UnixTerminal` is the real driver;
// tests script their own.
//
// Resizes arrive as SIGWINCH. signal-hook writes each delivery into one
// end of a socket pair, and `wait` polls the other end together with
// stdin, so a resize during a blocking wait wakes it immediately.
//
// On panic the hook writes a fixed teardown sequence to fd 1 with a raw
// write(2), never through `io::stdout()`, whose lock the panicking frame
// may hold. The saved termios goes back next, and only then does the
// previous hook print the message.

use std::io;
use std::time::Duration;

use crate::error::Result;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Width and height of the screen, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Columns.
    pub cols: u16,
    /// Rows.
    pub rows: u16,
}

impl Size {
    /// Size assumed when the terminal cannot be queried.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    /// Cell count.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.cols as u32 * self.rows as u32
    }
}

// ─── Driver ─────────────────────────────────────────────────────────────────

/// Why [`Driver::wait`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The timeout elapsed with nothing to report.
    Timeout,
    /// The terminal was resized; query [`Driver::size`].
    Resize,
    /// `n` input bytes were read into the caller's buffer.
    Input(usize),
    /// The input stream reached end of file.
    Closed,
}

/// The terminal collaborator the UI core is written against.
pub trait Driver {
    /// Acquire the terminal: raw mode, alternate screen, mouse reporting,
    /// resize notifications.
    ///
    /// # Errors
    ///
    /// Fails if the terminal mode or the resize channel cannot be set up.
    fn enter(&mut self) -> Result<()>;

    /// Restore the terminal to its original state. Idempotent.
    ///
    /// # Errors
    ///
    /// Fails if the restore sequence or termios restore cannot be written.
    fn leave(&mut self) -> io::Result<()>;

    /// Write one frame of output in a single call.
    ///
    /// # Errors
    ///
    /// Fails if the write fails; callers do not retry.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Current terminal size, or `None` if it cannot be determined.
    fn size(&mut self) -> Option<Size>;

    /// Block until input, a resize, or `timeout` (`None` blocks forever).
    /// Input bytes are read into `buf`.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors, including `ErrorKind::Interrupted`, which
    /// callers retry.
    fn wait(&mut self, timeout: Option<Duration>, buf: &mut [u8]) -> io::Result<Wake>;
}

/// `poll(2)` timeout in milliseconds, `-1` for "forever".
#[must_use]
pub fn poll_timeout(timeout: Option<Duration>) -> i32 {
    timeout.map_or(-1, |d| i32::try_from(d.as_millis()).unwrap_or(i32::MAX))
}

// ─── Teardown Bytes ─────────────────────────────────────────────────────────

/// The bytes `ansi::leave_session` produces, as a constant the panic hook
/// can write without allocating. Leaving the alternate screen comes last.
#[rustfmt::skip]
const PANIC_TEARDOWN: &[u8] = b"\
    \x1b[?1000l\x1b[?1002l\x1b[?1006l\
    \x1b[m\
    \x1b[?25h\
    \x1b[?1049l";

// ─── Poll Readiness ─────────────────────────────────────────────────────────

/// What one `poll(2)` round reported, resize channel before stdin.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ready {
    Resize,
    /// The resize channel reported an error or hangup without data.
    ResizeBroken,
    Input,
    Idle,
}

#[cfg(unix)]
const fn readiness(resize: libc::c_short, input: libc::c_short) -> Ready {
    const FAULT: libc::c_short = libc::POLLHUP | libc::POLLERR | libc::POLLNVAL;
    if resize & libc::POLLIN != 0 {
        Ready::Resize
    } else if resize & FAULT != 0 {
        Ready::ResizeBroken
    } else if input & (libc::POLLIN | FAULT) != 0 {
        Ready::Input
    } else {
        Ready::Idle
    }
}

#[cfg(unix)]
pub use unix::{UnixTerminal, get_size, is_tty};

#[cfg(unix)]
mod unix {
    use std::io::{self, Read, Write};
    use std::os::fd::AsRawFd;
    use std::os::unix::net::UnixStream;
    use std::sync::{Mutex, Once};
    use std::time::Duration;

    use signal_hook::SigId;
    use signal_hook::consts::signal::SIGWINCH;

    use super::{Driver, PANIC_TEARDOWN, Ready, Size, Wake, poll_timeout, readiness};
    use crate::ansi;
    use crate::error::{Error, Result};

    // ─── Terminal Queries ───────────────────────────────────────────────

    /// Screen size from `TIOCGWINSZ` on stdout. `None` when stdout is not a
    /// terminal or reports a zero dimension.
    #[must_use]
    pub fn get_size() -> Option<Size> {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

        if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
            Some(Size {
                cols: ws.ws_col,
                rows: ws.ws_row,
            })
        } else {
            None
        }
    }

    /// Whether stdin is a tty.
    #[must_use]
    pub fn is_tty() -> bool {
        unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
    }

    // ─── Panic hook ─────────────────────────────────────────────────────

    /// The termios saved by `enter`, for the panic hook.
    static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

    /// Panic hook guard, installed at most once per process.
    static HOOK_ONCE: Once = Once::new();

    fn restore_saved_termios() {
        if let Ok(saved) = SAVED_TERMIOS.lock()
            && let Some(termios) = saved.as_ref()
        {
            unsafe {
                libc::tcsetattr(libc::STDIN_FILENO, libc::TCSADRAIN, termios);
            }
        }
    }

    fn install_panic_hook() {
        HOOK_ONCE.call_once(|| {
            let previous = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                write_teardown();
                restore_saved_termios();
                previous(info);
            }));
        });
    }

    /// Write the restore sequence straight to fd 1, bypassing the stdout lock.
    fn write_teardown() {
        unsafe {
            let _ = libc::write(
                libc::STDOUT_FILENO,
                PANIC_TEARDOWN.as_ptr().cast::<libc::c_void>(),
                PANIC_TEARDOWN.len(),
            );
        }
    }

    // ─── UnixTerminal ───────────────────────────────────────────────────

    /// The stdin/stdout terminal driver with RAII cleanup.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tessel_term::terminal::{Driver, UnixTerminal};
    ///
    /// let mut term = UnixTerminal::new();
    /// term.enter()?;
    /// term.write(b"hello")?;
    /// drop(term); // leaves the session
    /// # Ok::<(), tessel_term::Error>(())
    /// ```
    pub struct UnixTerminal {
        saved_termios: Option<libc::termios>,
        resize_rx: Option<UnixStream>,
        resize_id: Option<SigId>,
        active: bool,
    }

    impl UnixTerminal {
        /// Create a driver. Does not touch the terminal until
        /// [`enter`](Driver::enter).
        #[must_use]
        pub const fn new() -> Self {
            Self {
                saved_termios: None,
                resize_rx: None,
                resize_id: None,
                active: false,
            }
        }

        /// Whether the session is active.
        #[inline]
        #[must_use]
        pub const fn is_active(&self) -> bool {
            self.active
        }

        // ── termios ─────────────────────────────────────────────────────

        /// Save the current termios and switch stdin to raw mode. A non-tty
        /// stdin is left alone.
        fn raw_mode_on(&mut self) -> io::Result<()> {
            if !is_tty() {
                return Ok(());
            }

            let mut mode: libc::termios = unsafe { std::mem::zeroed() };
            if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut mode) } != 0 {
                return Err(io::Error::last_os_error());
            }
            self.saved_termios = Some(mode);
            if let Ok(mut saved) = SAVED_TERMIOS.lock() {
                *saved = Some(mode);
            }

            unsafe { libc::cfmakeraw(&raw mut mode) };
            if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSADRAIN, &raw const mode) } != 0
            {
                let err = io::Error::last_os_error();
                self.forget_saved_termios();
                return Err(err);
            }
            Ok(())
        }

        fn forget_saved_termios(&mut self) {
            self.saved_termios = None;
            if let Ok(mut backup) = SAVED_TERMIOS.lock() {
                *backup = None;
            }
        }

        fn raw_mode_off(&mut self) -> io::Result<()> {
            let Some(saved) = self.saved_termios.take() else {
                return Ok(());
            };
            if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSADRAIN, &raw const saved) }
                != 0
            {
                self.saved_termios = Some(saved);
                return Err(io::Error::last_os_error());
            }
            self.forget_saved_termios();
            Ok(())
        }

        // ── Session ─────────────────────────────────────────────────────

        /// Raw mode first, then `setup`. The session counts as active as soon
        /// as the termios changes, so a failing `setup` is undone by `leave`.
        fn enter_with(&mut self, setup: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
            if self.active {
                return Ok(());
            }
            install_panic_hook();
            self.raw_mode_on()?;
            self.active = true;

            if let Err(err) = setup(self) {
                tracing::warn!(error = %err, "terminal setup failed, restoring");
                if let Err(restore) = self.leave() {
                    tracing::warn!(error = %restore, "terminal restore failed");
                }
                return Err(err);
            }
            tracing::debug!(tty = is_tty(), "terminal session entered");
            Ok(())
        }

        fn start_session(&mut self) -> Result<()> {
            let mut out = io::stdout().lock();
            ansi::enter_session(&mut out)?;
            out.flush()?;
            drop(out);
            self.watch_resizes()
        }

        // ── Resize channel ──────────────────────────────────────────────

        fn watch_resizes(&mut self) -> Result<()> {
            let (rx, tx) = UnixStream::pair().map_err(Error::ResizeChannel)?;
            rx.set_nonblocking(true).map_err(Error::ResizeChannel)?;
            tx.set_nonblocking(true).map_err(Error::ResizeChannel)?;
            let id = signal_hook::low_level::pipe::register(SIGWINCH, tx)
                .map_err(Error::ResizeChannel)?;
            self.resize_rx = Some(rx);
            self.resize_id = Some(id);
            Ok(())
        }

        fn unwatch_resizes(&mut self) {
            if let Some(id) = self.resize_id.take() {
                let _ = signal_hook::low_level::unregister(id);
            }
            self.resize_rx = None;
        }

        /// Empty the resize channel; one wakeup covers any number of signals.
        fn drain_resizes(&mut self) {
            let Some(rx) = self.resize_rx.as_mut() else {
                return;
            };
            let mut sink = [0u8; 64];
            while matches!(rx.read(&mut sink), Ok(n) if n > 0) {}
        }
    }

    impl Default for UnixTerminal {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Driver for UnixTerminal {
        fn enter(&mut self) -> Result<()> {
            self.enter_with(Self::start_session)
        }

        /// Every restore step runs even when an earlier one fails; the first
        /// error is returned.
        fn leave(&mut self) -> io::Result<()> {
            if !self.active {
                return Ok(());
            }
            self.active = false;
            self.unwatch_resizes();

            let mut out = io::stdout().lock();
            let session = ansi::leave_session(&mut out).and_then(|()| out.flush());
            drop(out);

            let termios = self.raw_mode_off();
            tracing::debug!("terminal session left");
            session.and(termios)
        }

        fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
            let mut out = io::stdout().lock();
            out.write_all(bytes)?;
            out.flush()
        }

        fn size(&mut self) -> Option<Size> {
            get_size()
        }

        fn wait(&mut self, timeout: Option<Duration>, buf: &mut [u8]) -> io::Result<Wake> {
            let resize_fd = self.resize_rx.as_ref().map_or(-1, AsRawFd::as_raw_fd);
            let mut fds = [
                libc::pollfd {
                    fd: resize_fd,
                    events: libc::POLLIN,
                    revents: 0,
                },
                libc::pollfd {
                    fd: libc::STDIN_FILENO,
                    events: libc::POLLIN,
                    revents: 0,
                },
            ];
            let ms = poll_timeout(timeout);

            loop {
                let ready = unsafe { libc::poll(fds.as_mut_ptr(), 2, ms) };
                if ready < 0 {
                    return Err(io::Error::last_os_error());
                }
                if ready == 0 {
                    return Ok(Wake::Timeout);
                }

                match readiness(fds[0].revents, fds[1].revents) {
                    Ready::Resize => {
                        self.drain_resizes();
                        return Ok(Wake::Resize);
                    }
                    Ready::ResizeBroken => {
                        tracing::warn!("resize channel failed, no longer watching resizes");
                        self.unwatch_resizes();
                        fds[0].fd = -1;
                    }
                    Ready::Input => {
                        let n = unsafe {
                            libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len())
                        };
                        return match usize::try_from(n) {
                            Ok(0) => Ok(Wake::Closed),
                            Ok(n) => Ok(Wake::Input(n)),
                            Err(_) => Err(io::Error::last_os_error()),
                        };
                    }
                    Ready::Idle => {}
                }
            }
        }
    }

    impl Drop for UnixTerminal {
        fn drop(&mut self) {
            if self.active {
                let _ = self.leave();
            }
        }
    }

}

// ─── Tests ───────────────────────────────────────────────────────────────────
