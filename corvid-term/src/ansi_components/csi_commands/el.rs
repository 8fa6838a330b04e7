// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, extract_param, split_semicolon_params};
use crate::error::ParserFailures;

/// Erase in Line (EL): ESC [ Ps K
///
/// Ps 0 erases cursor to end of line, 1 start of line to cursor, 2 the
/// whole line. DECSEL (`?` prefix) is treated identically.
///
/// # Errors
/// Returns an error for a malformed or unknown parameter.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let params = params.strip_prefix(b"?").unwrap_or(params);

    let Ok(parsed) = split_semicolon_params(params) else {
        return Err(ParserFailures::UnhandledELCommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    let command = match extract_param(0, &parsed) {
        Some(0) | None => TerminalCommand::ClearLineForwards,
        Some(1) => TerminalCommand::ClearLineBackwards,
        Some(2) => TerminalCommand::ClearLine,
        Some(other) => {
            return Err(ParserFailures::UnhandledELCommand(format!(
                "unknown EL mode {other}"
            )));
        }
    };

    output.push(command);
    Ok(())
}
