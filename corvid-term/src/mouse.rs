// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use bitflags::bitflags;
use conv2::ConvUtil;

use corvid_common::modes::mouse::{MouseEncoding, MouseTrack};

bitflags! {
    /// Keyboard modifiers riding on a mouse report.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct MouseModifiers: u8 {
        const SHIFT = 1;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    /// Motion with no button held.
    None,
    WheelUp,
    WheelDown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MouseEventKind {
    Press,
    Release,
    Motion,
}

/// A grid-level mouse event from the embedder; `col`/`row` are 0-based.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub button: MouseButton,
    pub modifiers: MouseModifiers,
    pub col: usize,
    pub row: usize,
}

/// Encode a mouse event for the host under the active tracking mode and
/// wire encoding, or `None` when the mode filters the event out.
///
/// The mode decides *whether* to report (X10: presses only; normal: presses
/// and releases; button-event: + drag motion; any-event: everything); the
/// encoding decides the *bytes*.
#[must_use]
pub fn encode_mouse_event(
    track: &MouseTrack,
    encoding: &MouseEncoding,
    event: &MouseEvent,
) -> Option<Vec<u8>> {
    if !wants_event(track, event) {
        return None;
    }

    let mut cb = button_code(event.button);
    if event.kind == MouseEventKind::Motion {
        cb += 32;
    }
    if *track != MouseTrack::X10 {
        cb += modifier_bits(event.modifiers);
    }

    let col = event.col + 1;
    let row = event.row + 1;

    match encoding {
        MouseEncoding::Sgr | MouseEncoding::SgrPixels => {
            let suffix = if event.kind == MouseEventKind::Release {
                'm'
            } else {
                'M'
            };
            Some(format!("\x1b[<{cb};{col};{row}{suffix}").into_bytes())
        }
        MouseEncoding::Urxvt => {
            let cb = cb + 32;
            let cb = if event.kind == MouseEventKind::Release {
                // releases degrade to "button 3" in the legacy encodings
                32 + 3 + modifier_bits(event.modifiers)
            } else {
                cb
            };
            Some(format!("\x1b[{cb};{col};{row}M").into_bytes())
        }
        MouseEncoding::X11 => {
            let cb = if event.kind == MouseEventKind::Release {
                3 + if *track == MouseTrack::X10 {
                    0
                } else {
                    modifier_bits(event.modifiers)
                }
            } else {
                cb
            };
            let encode = |v: usize| -> u8 {
                (v + 32).min(255).approx_as::<u8>().unwrap_or(u8::MAX)
            };
            Some(vec![
                0x1b,
                b'[',
                b'M',
                encode(cb),
                // coordinates clamp at 223 so the byte stays printable
                encode(col.min(223)),
                encode(row.min(223)),
            ])
        }
    }
}

fn wants_event(track: &MouseTrack, event: &MouseEvent) -> bool {
    match track {
        MouseTrack::NoTracking => false,
        MouseTrack::X10 => {
            event.kind == MouseEventKind::Press
                && !matches!(event.button, MouseButton::WheelUp | MouseButton::WheelDown)
        }
        MouseTrack::Normal => event.kind != MouseEventKind::Motion,
        MouseTrack::ButtonEvent => {
            event.kind != MouseEventKind::Motion || event.button != MouseButton::None
        }
        MouseTrack::AnyEvent => true,
    }
}

const fn button_code(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::None => 3,
        MouseButton::WheelUp => 64,
        MouseButton::WheelDown => 65,
    }
}

const fn modifier_bits(modifiers: MouseModifiers) -> usize {
    let mut bits = 0;
    if modifiers.contains(MouseModifiers::SHIFT) {
        bits += 4;
    }
    if modifiers.contains(MouseModifiers::ALT) {
        bits += 8;
    }
    if modifiers.contains(MouseModifiers::CTRL) {
        bits += 16;
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(col: usize, row: usize) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Press,
            button: MouseButton::Left,
            modifiers: MouseModifiers::empty(),
            col,
            row,
        }
    }

    #[test]
    fn no_tracking_reports_nothing() {
        assert_eq!(
            encode_mouse_event(&MouseTrack::NoTracking, &MouseEncoding::Sgr, &press(0, 0)),
            None
        );
    }

    #[test]
    fn x11_press_is_offset_by_32() {
        let bytes =
            encode_mouse_event(&MouseTrack::Normal, &MouseEncoding::X11, &press(0, 0));
        assert_eq!(bytes, Some(b"\x1b[M \x21\x21".to_vec()));
    }

    #[test]
    fn sgr_release_uses_lowercase_m() {
        let event = MouseEvent {
            kind: MouseEventKind::Release,
            button: MouseButton::Left,
            modifiers: MouseModifiers::empty(),
            col: 9,
            row: 4,
        };
        let bytes = encode_mouse_event(&MouseTrack::Normal, &MouseEncoding::Sgr, &event);
        assert_eq!(bytes, Some(b"\x1b[<0;10;5m".to_vec()));
    }

    #[test]
    fn urxvt_format() {
        let bytes =
            encode_mouse_event(&MouseTrack::Normal, &MouseEncoding::Urxvt, &press(2, 3));
        assert_eq!(bytes, Some(b"\x1b[32;3;4M".to_vec()));
    }

    #[test]
    fn x10_filters_releases_and_modifiers() {
        let release = MouseEvent {
            kind: MouseEventKind::Release,
            button: MouseButton::Left,
            modifiers: MouseModifiers::empty(),
            col: 0,
            row: 0,
        };
        assert_eq!(
            encode_mouse_event(&MouseTrack::X10, &MouseEncoding::X11, &release),
            None
        );

        let shifted = MouseEvent {
            modifiers: MouseModifiers::SHIFT,
            ..press(0, 0)
        };
        // shift is not encoded in X10 mode
        assert_eq!(
            encode_mouse_event(&MouseTrack::X10, &MouseEncoding::X11, &shifted),
            Some(b"\x1b[M \x21\x21".to_vec())
        );
    }

    #[test]
    fn motion_filtering_by_mode() {
        let drag = MouseEvent {
            kind: MouseEventKind::Motion,
            button: MouseButton::Left,
            modifiers: MouseModifiers::empty(),
            col: 0,
            row: 0,
        };
        let hover = MouseEvent {
            button: MouseButton::None,
            ..drag
        };

        assert!(encode_mouse_event(&MouseTrack::Normal, &MouseEncoding::Sgr, &drag).is_none());
        assert!(encode_mouse_event(&MouseTrack::ButtonEvent, &MouseEncoding::Sgr, &drag).is_some());
        assert!(encode_mouse_event(&MouseTrack::ButtonEvent, &MouseEncoding::Sgr, &hover).is_none());
        assert!(encode_mouse_event(&MouseTrack::AnyEvent, &MouseEncoding::Sgr, &hover).is_some());
    }

    #[test]
    fn x11_coordinates_clamp_at_223() {
        let bytes = encode_mouse_event(
            &MouseTrack::Normal,
            &MouseEncoding::X11,
            &press(500, 500),
        );
        let bytes = bytes.unwrap_or_default();
        assert_eq!(bytes[4], 255);
        assert_eq!(bytes[5], 255);
    }

    #[test]
    fn wheel_events_use_the_64_range() {
        let wheel = MouseEvent {
            kind: MouseEventKind::Press,
            button: MouseButton::WheelUp,
            modifiers: MouseModifiers::empty(),
            col: 0,
            row: 0,
        };
        let bytes = encode_mouse_event(&MouseTrack::Normal, &MouseEncoding::Sgr, &wheel);
        assert_eq!(bytes, Some(b"\x1b[<64;1;1M".to_vec()));
    }
}
