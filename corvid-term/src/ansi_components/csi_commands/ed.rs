// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, extract_param, split_semicolon_params};
use crate::error::ParserFailures;

/// Erase in Display (ED): ESC [ Ps J
///
/// Ps 0 erases cursor to end, 1 start to cursor, 2 the whole screen,
/// 3 screen plus scrollback. The DECSED selective variant (`?` prefix) is
/// treated the same; this terminal has no protected cells.
///
/// # Errors
/// Returns an error for a malformed or unknown parameter.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let params = params.strip_prefix(b"?").unwrap_or(params);

    let Ok(parsed) = split_semicolon_params(params) else {
        return Err(ParserFailures::UnhandledEDCommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    let command = match extract_param(0, &parsed) {
        Some(0) | None => TerminalCommand::ClearDisplayFromCursorToEnd,
        Some(1) => TerminalCommand::ClearDisplayFromStartToCursor,
        Some(2) => TerminalCommand::ClearDisplay,
        Some(3) => TerminalCommand::ClearScrollbackAndDisplay,
        Some(other) => {
            return Err(ParserFailures::UnhandledEDCommand(format!(
                "unknown ED mode {other}"
            )));
        }
    };

    output.push(command);
    Ok(())
}
