// SPDX-License-Identifier: MIT
//
// Output buffering.
//
// OutputBuffer accumulates all ANSI bytes of a frame in memory so the
// entire frame can be written with a single driver write. This eliminates
// per-escape overhead and keeps the terminal's input parser happy.
//
// The buffer is capacity-bounded: it is allocated once at its full size
// and never grows. A write that does not fit is dropped whole, so a frame
// that overflows degrades to a partially drawn screen rather than an
// allocation spike. At the default capacity (four bytes per cell of the
// largest cell buffer) that only happens with pathological color churn.

use std::io::{self, Write};

use crate::buffer::MAX_CELLS;

/// Default output capacity: four bytes per cell of a full cell buffer.
pub const MAX_OUTPUT: usize = MAX_CELLS * 4;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A fixed-capacity byte buffer that collects one frame of terminal output.
///
/// ```
/// use std::io::Write;
/// use tessel_term::output::OutputBuffer;
///
/// let mut out = OutputBuffer::with_capacity(4);
/// out.write_all(b"abc").unwrap();
/// out.write_all(b"de").unwrap(); // does not fit, dropped
/// assert_eq!(out.as_bytes(), b"abc");
/// assert_eq!(out.dropped(), 2);
/// ```
pub struct OutputBuffer {
    buf: Vec<u8>,
    capacity: usize,
    dropped: usize,
}

impl OutputBuffer {
    /// Create an empty buffer with the default capacity ([`MAX_OUTPUT`]).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_OUTPUT)
    }

    /// Create an empty buffer holding at most `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Maximum number of bytes the buffer accepts.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes discarded since the last [`clear`](Self::clear) because they
    /// did not fit.
    #[inline]
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a byte slice if it fits entirely; otherwise drop it.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        if self.buf.len() + bytes.len() <= self.capacity {
            self.buf.extend_from_slice(bytes);
        } else {
            self.dropped += bytes.len();
        }
    }

    /// Append a single byte if it fits.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.push_bytes(&[byte]);
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
        self.dropped = 0;
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.push_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing happens through the driver.
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
