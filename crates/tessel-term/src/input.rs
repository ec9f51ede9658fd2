// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns the bytes of one stdin read into a structured event. Handles the
// protocols the Unix driver enables:
//
// - Direct keys: a single byte, or anything not starting with ESC, is one
//   key press decoded as a UTF-8 codepoint
// - SGR mouse reports (`ESC [ < btn ; col ; row M`), left press only
// - A small table of CSI editing and arrow keys
//
// # Design
//
// Decoding is stateless: terminals deliver a key's full sequence in one
// read, so every read is decoded on its own and anything unrecognized is
// dropped. The caller simply waits for the next read. There is no pending
// buffer and no ESC timeout; a lone ESC byte is the Escape key.
//
// The codepoint decode is best-effort. The sequence length is inferred
// from the lead byte and continuation bytes are folded in without
// validation, so malformed input yields some value rather than an error.
// The raw bytes of the read travel with the key so text entry can insert
// exactly what was typed.

/// Maximum bytes requested from the terminal per read.
pub const READ_CHUNK: usize = 32;

/// Maximum raw bytes kept with a key event.
pub const MAX_KEY_TEXT: usize = READ_CHUNK - 1;

// ─── Event Types ────────────────────────────────────────────────────────────

/// The current event of a UI cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Event {
    /// Synthetic event asking every widget to draw itself.
    #[default]
    Draw,
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse button was pressed.
    Mouse(MouseEvent),
    /// The event was consumed by a widget; later widgets ignore it.
    Void,
}

impl Event {
    /// Whether this is a press of `code`.
    #[inline]
    #[must_use]
    pub fn is_key(&self, code: KeyCode) -> bool {
        matches!(self, Self::Key(k) if k.code == code)
    }

    /// The mouse position if this is a left button press.
    #[inline]
    #[must_use]
    pub const fn left_click(&self) -> Option<(u16, u16)> {
        match self {
            Self::Mouse(MouseEvent {
                button: MouseButton::Left,
                x,
                y,
            }) => Some((*x, *y)),
            _ => None,
        }
    }

    /// Whether this is a left button press.
    #[inline]
    #[must_use]
    pub const fn is_left_click(&self) -> bool {
        self.left_click().is_some()
    }
}

/// A key press together with the raw bytes that produced it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    text_len: u8,
    text: [u8; MAX_KEY_TEXT],
}

impl KeyEvent {
    /// A key event whose text is the key's own UTF-8 form (empty for
    /// named keys).
    #[must_use]
    pub fn new(code: KeyCode) -> Self {
        let mut enc = [0u8; 4];
        let text: &[u8] = match code {
            KeyCode::Char(c) => c.encode_utf8(&mut enc).as_bytes(),
            _ => &[],
        };
        Self::with_text(code, text)
    }

    /// A key event carrying `text` (truncated to [`MAX_KEY_TEXT`] bytes).
    #[must_use]
    pub fn with_text(code: KeyCode, text: &[u8]) -> Self {
        let n = text.len().min(MAX_KEY_TEXT);
        let mut buf = [0u8; MAX_KEY_TEXT];
        buf[..n].copy_from_slice(&text[..n]);
        Self {
            code,
            text_len: u8::try_from(n).unwrap_or(u8::MAX),
            text: buf,
        }
    }

    /// The raw bytes of the read that produced this key.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &[u8] {
        &self.text[..usize::from(self.text_len)]
    }
}

impl std::fmt::Debug for KeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyEvent")
            .field("code", &self.code)
            .field("text", &String::from_utf8_lossy(self.text()))
            .finish()
    }
}

/// Key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key (including control characters without a name).
    Char(char),
    Backspace,
    Tab,
    Enter,
    Escape,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
}

/// A mouse button press at a 0-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    /// Which button.
    pub button: MouseButton,
    /// Column (0 = left).
    pub x: u16,
    /// Row (0 = top).
    pub y: u16,
}

/// Mouse button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
}

// ─── Decoder ────────────────────────────────────────────────────────────────

const ESC: u8 = 0x1B;

/// Escape sequences after the ESC byte, matched exactly.
const KEY_TABLE: &[(&[u8], KeyCode)] = &[
    (b"[A", KeyCode::Up),
    (b"[B", KeyCode::Down),
    (b"[C", KeyCode::Right),
    (b"[D", KeyCode::Left),
    (b"[2~", KeyCode::Insert),
    (b"[4h", KeyCode::Insert),
    (b"[3~", KeyCode::Delete),
    (b"[P", KeyCode::Delete),
    (b"[H", KeyCode::Home),
    (b"[F", KeyCode::End),
    (b"[4~", KeyCode::End),
    (b"[5~", KeyCode::PageUp),
    (b"[6~", KeyCode::PageDown),
];

/// Decode the bytes of one read into an event.
///
/// Returns `None` for anything unrecognized (other mouse buttons, mouse
/// release, unknown escape sequences, empty input); the caller keeps
/// reading.
///
/// ```
/// use tessel_term::input::{decode, Event, KeyCode, MouseButton, MouseEvent};
///
/// let ev = decode(b"\x1b[<0;5;3M");
/// assert_eq!(ev, Some(Event::Mouse(MouseEvent { button: MouseButton::Left, x: 4, y: 2 })));
///
/// let ev = decode(b"\x1b[A").unwrap();
/// assert!(ev.is_key(KeyCode::Up));
/// ```
#[must_use]
pub fn decode(bytes: &[u8]) -> Option<Event> {
    let &first = bytes.first()?;

    if bytes.len() == 1 || first != ESC {
        let code = if first == 0x7F {
            KeyCode::Backspace
        } else {
            direct_key(utf8_codepoint(bytes))
        };
        return Some(Event::Key(KeyEvent::with_text(code, bytes)));
    }

    if bytes.len() >= 9 && bytes.starts_with(b"\x1b[<") {
        return decode_sgr_mouse(&bytes[3..]);
    }

    if matches!(bytes.len(), 3 | 4) {
        let suffix = &bytes[1..];
        return KEY_TABLE
            .iter()
            .find(|(seq, _)| *seq == suffix)
            .map(|&(_, code)| Event::Key(KeyEvent::with_text(code, bytes)));
    }

    None
}

/// `btn ; col ; row (M|m)` with 1-based coordinates.
fn decode_sgr_mouse(params: &[u8]) -> Option<Event> {
    let (button, rest) = parse_number(params);
    let (col, rest) = parse_number(rest.get(1..)?);
    let (row, rest) = parse_number(rest.get(1..)?);
    if button != 0 || rest.first() != Some(&b'M') {
        return None;
    }
    Some(Event::Mouse(MouseEvent {
        button: MouseButton::Left,
        x: u16::try_from(col.checked_sub(1)?).ok()?,
        y: u16::try_from(row.checked_sub(1)?).ok()?,
    }))
}

/// Leading decimal digits of `s` and the remainder. No digits parse as 0.
fn parse_number(s: &[u8]) -> (u32, &[u8]) {
    let digits = s.iter().take_while(|b| b.is_ascii_digit()).count();
    let value = s[..digits].iter().fold(0u32, |acc, &b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    });
    (value, &s[digits..])
}

/// Best-effort codepoint of the first bytes of `s`.
///
/// The lead byte is masked by its count of leading one bits, then up to
/// three following bytes contribute six bits each until a NUL byte.
#[must_use]
pub fn utf8_codepoint(s: &[u8]) -> u32 {
    let Some(&lead) = s.first() else {
        return 0;
    };
    let ones = lead.leading_ones();
    let mask = if ones >= 8 { 0 } else { (1u32 << (8 - ones)) - 1 };
    s.iter()
        .skip(1)
        .take(3)
        .take_while(|&&b| b != 0)
        .fold(u32::from(lead) & mask, |c, &b| (c << 6) | u32::from(b & 0x3F))
}

fn direct_key(cp: u32) -> KeyCode {
    match cp {
        8 => KeyCode::Backspace,
        9 => KeyCode::Tab,
        13 => KeyCode::Enter,
        27 => KeyCode::Escape,
        _ => KeyCode::Char(char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER)),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn key(bytes: &[u8]) -> KeyCode {
        match decode(bytes) {
            Some(Event::Key(k)) => k.code,
            other => panic!("expected key for {bytes:?}, got {other:?}"),
        }
    }

    fn mouse(x: u16, y: u16) -> Option<Event> {
        Some(Event::Mouse(MouseEvent {
            button: MouseButton::Left,
            x,
            y,
        }))
    }

    // ── Direct keys ─────────────────────────────────────────────────────

    #[test]
    fn ascii_chars() {
        assert_eq!(key(b"a"), KeyCode::Char('a'));
        assert_eq!(key(b" "), KeyCode::Char(' '));
        assert_eq!(key(b"~"), KeyCode::Char('~'));
    }

    #[test]
    fn named_control_bytes() {
        assert_eq!(key(b"\x7f"), KeyCode::Backspace);
        assert_eq!(key(b"\x08"), KeyCode::Backspace);
        assert_eq!(key(b"\t"), KeyCode::Tab);
        assert_eq!(key(b"\r"), KeyCode::Enter);
        assert_eq!(key(b"\x1b"), KeyCode::Escape);
    }

    #[test]
    fn other_control_bytes_are_chars() {
        assert_eq!(key(b"\x03"), KeyCode::Char('\u{3}'));
        assert_eq!(key(b"\n"), KeyCode::Char('\n'));
    }

    #[test]
    fn multibyte_chars() {
        assert_eq!(key("é".as_bytes()), KeyCode::Char('é'));
        assert_eq!(key("日".as_bytes()), KeyCode::Char('日'));
        assert_eq!(key("🔥".as_bytes()), KeyCode::Char('🔥'));
    }

    #[test]
    fn key_keeps_raw_text() {
        let Some(Event::Key(k)) = decode("ab".as_bytes()) else {
            panic!("expected key");
        };
        assert_eq!(k.text(), b"ab");
    }

    #[test]
    fn malformed_utf8_never_fails() {
        assert!(decode(&[0xFF]).is_some());
        assert!(decode(&[0xC3]).is_some());
        assert!(decode(&[0xED, 0xA0, 0x80]).is_some()); // surrogate
        assert_eq!(key(&[0xED, 0xA0, 0x80]), KeyCode::Char(char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn empty_read_is_nothing() {
        assert_eq!(decode(b""), None);
    }

    // ── Escape table ────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(key(b"\x1b[A"), KeyCode::Up);
        assert_eq!(key(b"\x1b[B"), KeyCode::Down);
        assert_eq!(key(b"\x1b[C"), KeyCode::Right);
        assert_eq!(key(b"\x1b[D"), KeyCode::Left);
    }

    #[test]
    fn editing_keys_both_forms() {
        assert_eq!(key(b"\x1b[2~"), KeyCode::Insert);
        assert_eq!(key(b"\x1b[4h"), KeyCode::Insert);
        assert_eq!(key(b"\x1b[3~"), KeyCode::Delete);
        assert_eq!(key(b"\x1b[P"), KeyCode::Delete);
        assert_eq!(key(b"\x1b[H"), KeyCode::Home);
        assert_eq!(key(b"\x1b[F"), KeyCode::End);
        assert_eq!(key(b"\x1b[4~"), KeyCode::End);
        assert_eq!(key(b"\x1b[5~"), KeyCode::PageUp);
        assert_eq!(key(b"\x1b[6~"), KeyCode::PageDown);
    }

    #[test]
    fn unknown_sequences_are_dropped() {
        assert_eq!(decode(b"\x1b[Z"), None);
        assert_eq!(decode(b"\x1bOP"), None);
        assert_eq!(decode(b"\x1ba"), None); // alt+a
        assert_eq!(decode(b"\x1b[15~"), None); // F5, length 5
        assert_eq!(decode(b"\x1b[A\x1b[A"), None);
    }

    // ── Mouse ───────────────────────────────────────────────────────────

    #[test]
    fn sgr_left_press() {
        assert_eq!(decode(b"\x1b[<0;5;3M"), mouse(4, 2));
        assert_eq!(decode(b"\x1b[<0;120;45M"), mouse(119, 44));
    }

    #[test]
    fn sgr_release_and_other_buttons_are_dropped() {
        assert_eq!(decode(b"\x1b[<0;5;3m"), None);
        assert_eq!(decode(b"\x1b[<2;5;3M"), None);
        assert_eq!(decode(b"\x1b[<32;5;3M"), None); // drag
        assert_eq!(decode(b"\x1b[<64;5;3M"), None); // wheel
    }

    #[test]
    fn sgr_malformed_is_dropped() {
        assert_eq!(decode(b"\x1b[<0;0;0M"), None);
        assert_eq!(decode(b"\x1b[<0;5;3X"), None);
        assert_eq!(decode(b"\x1b[<0;5M"), None);
    }

    #[test]
    fn sgr_shorter_than_nine_bytes_is_not_mouse() {
        assert_eq!(decode(b"\x1b[<0;1M"), None);
    }

    // ── Event helpers ───────────────────────────────────────────────────

    #[test]
    fn event_helpers() {
        let click = mouse(3, 4).unwrap();
        assert!(click.is_left_click());
        assert_eq!(click.left_click(), Some((3, 4)));
        assert!(!Event::Draw.is_left_click());
        assert!(Event::Key(KeyEvent::new(KeyCode::Enter)).is_key(KeyCode::Enter));
        assert!(!Event::Void.is_key(KeyCode::Enter));
    }

    #[test]
    fn key_event_new_encodes_char_text() {
        assert_eq!(KeyEvent::new(KeyCode::Char('ß')).text(), "ß".as_bytes());
        assert!(KeyEvent::new(KeyCode::Home).text().is_empty());
    }

    #[test]
    fn key_text_is_truncated() {
        let long = [b'x'; 40];
        assert_eq!(KeyEvent::with_text(KeyCode::Char('x'), &long).text().len(), MAX_KEY_TEXT);
    }

    #[test]
    fn codepoint_folds_following_bytes() {
        assert_eq!(utf8_codepoint("é".as_bytes()), 0xE9);
        assert_eq!(utf8_codepoint(b"a\0b"), u32::from(b'a'));
        assert_eq!(utf8_codepoint(b""), 0);
    }
}
