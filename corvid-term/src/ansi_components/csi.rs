// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use corvid_common::mode::{Mode, SetMode};

use crate::ansi::TerminalCommand;
use crate::ansi_components::csi_commands::{
    cha, cnl, cpl, cub, cud, cuf, cup, cuu, da, dch, decrqm, decscusr, decstbm, dl, dsr, ech, ed,
    el, ich, il, scroll, sgr, tabs, vpa,
};
use crate::error::ParserFailures;

/// Execute a complete CSI sequence: parameter bytes, intermediates, and the
/// final byte. Unknown or malformed sequences are logged and dropped; the
/// caller sees `Invalid`/`Skipped` markers, never an error.
pub fn dispatch(
    params: &[u8],
    intermediates: &[u8],
    terminator: u8,
    output: &mut Vec<TerminalCommand>,
) {
    let result = match (intermediates, terminator) {
        ([], b'@') => ich::parse(params, output),
        ([], b'A') => cuu::parse(params, output),
        ([], b'B' | b'e') => cud::parse(params, output),
        ([], b'C' | b'a') => cuf::parse(params, output),
        ([], b'D') => cub::parse(params, output),
        ([], b'E') => cnl::parse(params, output),
        ([], b'F') => cpl::parse(params, output),
        ([], b'G' | b'`') => cha::parse(params, output),
        ([], b'H' | b'f') => cup::parse(params, output),
        ([], b'I') => tabs::parse_cht(params, output),
        ([], b'J') => ed::parse(params, output),
        ([], b'K') => el::parse(params, output),
        ([], b'L') => il::parse(params, output),
        ([], b'M') => dl::parse(params, output),
        ([], b'P') => dch::parse(params, output),
        ([], b'S') => scroll::parse_up(params, output),
        ([], b'T') => scroll::parse_down(params, output),
        ([], b'X') => ech::parse(params, output),
        ([], b'Z') => tabs::parse_cbt(params, output),
        ([], b'c') => da::parse(params, output),
        ([], b'd') => vpa::parse(params, output),
        ([], b'g') => tabs::parse_tbc(params, output),
        ([], b'h') => set_mode(params, &SetMode::DecSet, output),
        ([], b'l') => set_mode(params, &SetMode::DecRst, output),
        ([], b'm') => sgr::parse(params, output),
        ([], b'n') => dsr::parse(params, output),
        ([], b'q') if params.first() == Some(&b'>') => da::parse_xt_version(params, output),
        ([], b'r') => decstbm::parse(params, output),
        ([], b's') => {
            output.push(TerminalCommand::SaveCursor);
            Ok(())
        }
        ([], b'u') => {
            output.push(TerminalCommand::RestoreCursor);
            Ok(())
        }
        ([], b't') => {
            // XTWINOPS: window manipulation is an embedder concern
            debug!("skipping window manipulation request");
            output.push(TerminalCommand::Skipped);
            Ok(())
        }
        ([b'$'], b'p') => decrqm::parse(params, output),
        ([b' '], b'q') => decscusr::parse(params, output),
        _ => {
            debug!(
                "unhandled CSI: params={:?} intermediates={intermediates:?} terminator={:?}",
                String::from_utf8_lossy(params),
                char::from(terminator)
            );
            output.push(TerminalCommand::Skipped);
            Ok(())
        }
    };

    if let Err(failure) = result {
        warn!("CSI decode failure: {failure}");
        output.push(TerminalCommand::Invalid);
    }
}

fn set_mode(
    params: &[u8],
    mode: &SetMode,
    output: &mut Vec<TerminalCommand>,
) -> Result<(), ParserFailures> {
    // `CSI ? Pm h` may carry several modes at once; the private marker
    // applies to each.
    let (prefix, list): (&[u8], &[u8]) = params
        .strip_prefix(b"?")
        .map_or((b"", params), |rest| (b"?", rest));

    for entry in list.split(|b| *b == b';') {
        let mut raw = prefix.to_vec();
        raw.extend_from_slice(entry);
        output.push(TerminalCommand::Mode(Mode::terminal_mode_from_params(
            &raw, mode,
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_common::modes::{decawm::Decawm, dectcem::Dectcem};

    fn run(params: &[u8], intermediates: &[u8], terminator: u8) -> Vec<TerminalCommand> {
        let mut out = Vec::new();
        dispatch(params, intermediates, terminator, &mut out);
        out
    }

    #[test]
    fn cursor_motion_dispatch() {
        assert_eq!(
            run(b"3", &[], b'A'),
            vec![TerminalCommand::SetCursorPosRel {
                x: None,
                y: Some(-3)
            }]
        );
    }

    #[test]
    fn multiple_modes_in_one_sequence() {
        let out = run(b"?25;7", &[], b'l');
        assert_eq!(
            out,
            vec![
                TerminalCommand::Mode(Mode::Dectcem(Dectcem::Hide)),
                TerminalCommand::Mode(Mode::Decawm(Decawm::NoAutoWrap)),
            ]
        );
    }

    #[test]
    fn malformed_sequence_becomes_invalid() {
        let out = run(b"x;y", &[], b'H');
        assert_eq!(out, vec![TerminalCommand::Invalid]);
    }

    #[test]
    fn unknown_final_is_skipped() {
        let out = run(b"", &[], b'~');
        assert_eq!(out, vec![TerminalCommand::Skipped]);
    }

    #[test]
    fn decrqm_needs_dollar_intermediate() {
        let out = run(b"?2004", &[b'$'], b'p');
        assert_eq!(
            out,
            vec![TerminalCommand::RequestMode {
                raw: b"?2004".to_vec()
            }]
        );
    }
}
