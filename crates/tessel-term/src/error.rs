// SPDX-License-Identifier: MIT
//
// Crate error type.
//
// Steady-state operation never fails: capacity overflows clamp, malformed
// input is dropped, size queries fall back to the last known size. What
// remains are failures to acquire or talk to the terminal at all.

use std::io;

/// Errors surfaced by the terminal layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Raw terminal I/O failed (termios, read, write).
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The resize notification channel could not be set up.
    #[error("cannot watch for terminal resizes: {0}")]
    ResizeChannel(#[source] io::Error),
}

/// Result alias for the terminal layer.
pub type Result<T> = std::result::Result<T, Error>;
