// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use corvid_common::charset::{CharacterSet, CharsetIndex};

use crate::ansi::TerminalCommand;

/// Decode an ESC sequence once its final byte arrives: `ESC I.. F` with
/// zero or more intermediates.
pub fn esc_dispatch(intermediates: &[u8], terminator: u8, output: &mut Vec<TerminalCommand>) {
    let command = match (intermediates, terminator) {
        ([], b'7') => TerminalCommand::SaveCursor,
        ([], b'8') => TerminalCommand::RestoreCursor,
        ([], b'D') => TerminalCommand::Index,
        ([], b'E') => TerminalCommand::NextLine,
        ([], b'H') => TerminalCommand::SetTabStop,
        ([], b'M') => TerminalCommand::ReverseIndex,
        ([], b'N') => TerminalCommand::SingleShiftG2,
        ([], b'O') => TerminalCommand::SingleShiftG3,
        ([], b'6') => TerminalCommand::BackIndex,
        ([], b'9') => TerminalCommand::ForwardIndex,
        ([], b'=') => TerminalCommand::KeypadApplicationMode,
        ([], b'>') => TerminalCommand::KeypadNumericMode,
        ([], b'c') => TerminalCommand::ResetDevice,
        ([], b'F') => TerminalCommand::CursorToLowerLeft,
        // DECID, an ancient spelling of DA1
        ([], b'Z') => TerminalCommand::RequestDeviceAttributes,
        ([], b'\\') => TerminalCommand::Skipped, // stray ST
        ([b' '], b'F') => TerminalCommand::SevenBitControls,
        ([b' '], b'G') => TerminalCommand::EightBitControls,
        ([b'#'], b'3') => TerminalCommand::DoubleHeightTop,
        ([b'#'], b'4') => TerminalCommand::DoubleHeightBottom,
        ([b'#'], b'5') => TerminalCommand::SingleWidthLine,
        ([b'#'], b'6') => TerminalCommand::DoubleWidthLine,
        ([b'#'], b'8') => TerminalCommand::ScreenAlignmentTest,
        ([b'('], designator) => designate(CharsetIndex::G0, designator),
        ([b')'], designator) => designate(CharsetIndex::G1, designator),
        ([b'*'], designator) => designate(CharsetIndex::G2, designator),
        ([b'+'], designator) => designate(CharsetIndex::G3, designator),
        _ => {
            debug!(
                "unhandled ESC sequence: intermediates={intermediates:?} terminator={:?}",
                char::from(terminator)
            );
            TerminalCommand::Skipped
        }
    };

    output.push(command);
}

fn designate(slot: CharsetIndex, designator: u8) -> TerminalCommand {
    CharacterSet::from_designator(designator).map_or_else(
        || {
            debug!(
                "unknown charset designator {:?} for {slot:?}",
                char::from(designator)
            );
            TerminalCommand::Skipped
        },
        |charset| TerminalCommand::DesignateCharset { slot, charset },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(intermediates: &[u8], terminator: u8) -> TerminalCommand {
        let mut out = Vec::new();
        esc_dispatch(intermediates, terminator, &mut out);
        assert_eq!(out.len(), 1);
        out.remove(0)
    }

    #[test]
    fn cursor_save_restore() {
        assert_eq!(one(&[], b'7'), TerminalCommand::SaveCursor);
        assert_eq!(one(&[], b'8'), TerminalCommand::RestoreCursor);
    }

    #[test]
    fn index_family() {
        assert_eq!(one(&[], b'D'), TerminalCommand::Index);
        assert_eq!(one(&[], b'E'), TerminalCommand::NextLine);
        assert_eq!(one(&[], b'M'), TerminalCommand::ReverseIndex);
    }

    #[test]
    fn charset_designation() {
        assert_eq!(
            one(&[b'('], b'0'),
            TerminalCommand::DesignateCharset {
                slot: CharsetIndex::G0,
                charset: CharacterSet::DecSpecialGraphics
            }
        );
        assert_eq!(
            one(&[b')'], b'B'),
            TerminalCommand::DesignateCharset {
                slot: CharsetIndex::G1,
                charset: CharacterSet::UsAscii
            }
        );
        assert_eq!(one(&[b'('], b'!'), TerminalCommand::Skipped);
    }

    #[test]
    fn alignment_test() {
        assert_eq!(one(&[b'#'], b'8'), TerminalCommand::ScreenAlignmentTest);
    }

    #[test]
    fn unknown_sequences_are_skipped() {
        assert_eq!(one(&[b'%'], b'@'), TerminalCommand::Skipped);
    }
}
