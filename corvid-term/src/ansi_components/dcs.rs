// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, split_semicolon_params};

/// Execute a complete DCS once ST arrives: header (params, intermediates,
/// final byte) plus the buffered payload.
///
/// The core only frames payloads. SIXEL data is delivered with the raster
/// geometry scraped from its attributes; decoding is the embedder's job.
pub fn dispatch(
    params: &[u8],
    intermediates: &[u8],
    terminator: u8,
    data: Vec<u8>,
    output: &mut Vec<TerminalCommand>,
) {
    match (intermediates, terminator) {
        // DECRQSS: payload names the setting to report
        ([b'$'], b'q') => output.push(TerminalCommand::RequestSetting(data)),
        ([], b'q') => {
            let (width, height) = sixel_geometry(&data);
            output.push(TerminalCommand::ShowSixel {
                width,
                height,
                data,
            });
        }
        _ => {
            debug!(
                "unhandled DCS: params={:?} intermediates={intermediates:?} terminator={:?} ({} payload bytes)",
                String::from_utf8_lossy(params),
                char::from(terminator),
                data.len()
            );
        }
    }
}

/// Pixel dimensions from a SIXEL raster-attributes introducer
/// (`" Pan ; Pad ; Ph ; Pv`), or zeros when absent.
fn sixel_geometry(data: &[u8]) -> (usize, usize) {
    let Some(rest) = data.strip_prefix(b"\"") else {
        return (0, 0);
    };

    let end = rest
        .iter()
        .position(|b| !b.is_ascii_digit() && *b != b';')
        .unwrap_or(rest.len());

    split_semicolon_params(&rest[..end]).map_or((0, 0), |fields| {
        let width = fields.get(2).copied().flatten().unwrap_or(0);
        let height = fields.get(3).copied().flatten().unwrap_or(0);
        (width, height)
    })
}
