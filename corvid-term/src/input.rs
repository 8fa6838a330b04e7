// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

const fn char_to_ctrl_code(c: u8) -> u8 {
    // https://catern.com/posts/terminal_quirks.html
    // man ascii
    c & 0b0001_1111
}

/// A key the embedder wants delivered to the host. The terminal applies
/// application cursor/keypad modes when encoding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TerminalKey {
    /// A plain printable character; encoded as UTF-8.
    Char(char),
    /// A character with Control held.
    Ctrl(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowRight,
    ArrowLeft,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    F(u8),
    /// Keypad digit or operator, e.g. '0'..'9', '+', '-', '.', '/'.
    Keypad(char),
}

/// Encode a key press for the host.
///
/// `cursor_application` reflects DECCKM, `keypad_application` DECKPAM.
#[must_use]
pub fn encode_key(
    key: &TerminalKey,
    cursor_application: bool,
    keypad_application: bool,
) -> Vec<u8> {
    match key {
        TerminalKey::Char(c) => {
            let mut buf = [0u8; 4];
            c.encode_utf8(&mut buf).as_bytes().to_vec()
        }
        TerminalKey::Ctrl(c) => {
            let b = u8::try_from(*c as u32).unwrap_or(b' ');
            vec![char_to_ctrl_code(b)]
        }
        // CR, not LF: the line discipline owns newline translation
        TerminalKey::Enter => vec![b'\r'],
        TerminalKey::Tab => vec![b'\t'],
        // Default VERASE; see the terminfo entry
        TerminalKey::Backspace => vec![0x7f],
        TerminalKey::Escape => vec![0x1b],
        TerminalKey::ArrowUp => arrow(cursor_application, b'A'),
        TerminalKey::ArrowDown => arrow(cursor_application, b'B'),
        TerminalKey::ArrowRight => arrow(cursor_application, b'C'),
        TerminalKey::ArrowLeft => arrow(cursor_application, b'D'),
        TerminalKey::Home => arrow(cursor_application, b'H'),
        TerminalKey::End => arrow(cursor_application, b'F'),
        TerminalKey::Insert => b"\x1b[2~".to_vec(),
        TerminalKey::Delete => b"\x1b[3~".to_vec(),
        TerminalKey::PageUp => b"\x1b[5~".to_vec(),
        TerminalKey::PageDown => b"\x1b[6~".to_vec(),
        TerminalKey::F(n) => function_key(*n),
        TerminalKey::Keypad(c) => keypad(*c, keypad_application),
    }
}

fn arrow(application: bool, letter: u8) -> Vec<u8> {
    if application {
        vec![0x1b, b'O', letter]
    } else {
        vec![0x1b, b'[', letter]
    }
}

// https://invisible-island.net/xterm/ctlseqs/ctlseqs.html#h2-PC-Style-Function-Keys
fn function_key(n: u8) -> Vec<u8> {
    match n {
        1 => b"\x1bOP".to_vec(),
        2 => b"\x1bOQ".to_vec(),
        3 => b"\x1bOR".to_vec(),
        4 => b"\x1bOS".to_vec(),
        5 => b"\x1b[15~".to_vec(),
        6 => b"\x1b[17~".to_vec(),
        7 => b"\x1b[18~".to_vec(),
        8 => b"\x1b[19~".to_vec(),
        9 => b"\x1b[20~".to_vec(),
        10 => b"\x1b[21~".to_vec(),
        11 => b"\x1b[23~".to_vec(),
        12 => b"\x1b[24~".to_vec(),
        _ => Vec::new(),
    }
}

fn keypad(c: char, application: bool) -> Vec<u8> {
    if !application {
        let mut buf = [0u8; 4];
        return c.encode_utf8(&mut buf).as_bytes().to_vec();
    }

    // DECKPAM: keypad keys send SS3 sequences
    let letter = match c {
        '0'..='9' => b'p' + (c as u8 - b'0'),
        '.' => b'n',
        '+' => b'k',
        '-' => b'm',
        '*' => b'j',
        '/' => b'o',
        '\r' => b'M',
        _ => {
            let mut buf = [0u8; 4];
            return c.encode_utf8(&mut buf).as_bytes().to_vec();
        }
    };
    vec![0x1b, b'O', letter]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_follow_decckm() {
        assert_eq!(encode_key(&TerminalKey::ArrowUp, false, false), b"\x1b[A");
        assert_eq!(encode_key(&TerminalKey::ArrowUp, true, false), b"\x1bOA");
        assert_eq!(encode_key(&TerminalKey::ArrowLeft, false, false), b"\x1b[D");
    }

    #[test]
    fn control_characters() {
        assert_eq!(encode_key(&TerminalKey::Ctrl('c'), false, false), vec![0x03]);
        assert_eq!(encode_key(&TerminalKey::Ctrl('A'), false, false), vec![0x01]);
    }

    #[test]
    fn utf8_characters_pass_through() {
        assert_eq!(
            encode_key(&TerminalKey::Char('é'), false, false),
            "é".as_bytes().to_vec()
        );
    }

    #[test]
    fn keypad_follows_deckpam() {
        assert_eq!(encode_key(&TerminalKey::Keypad('5'), false, false), b"5");
        assert_eq!(encode_key(&TerminalKey::Keypad('5'), false, true), b"\x1bOu");
        assert_eq!(encode_key(&TerminalKey::Keypad('+'), false, true), b"\x1bOk");
    }

    #[test]
    fn function_keys() {
        assert_eq!(encode_key(&TerminalKey::F(1), false, false), b"\x1bOP");
        assert_eq!(encode_key(&TerminalKey::F(5), false, false), b"\x1b[15~");
        assert_eq!(encode_key(&TerminalKey::F(12), false, false), b"\x1b[24~");
        assert!(encode_key(&TerminalKey::F(42), false, false).is_empty());
    }
}
