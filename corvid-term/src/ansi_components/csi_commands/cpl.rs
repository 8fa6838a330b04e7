// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, extract_param, split_semicolon_params};
use crate::error::ParserFailures;

/// Cursor Preceding Line (CPL): ESC [ Pn F — up Pn rows, column 1.
///
/// # Errors
/// Returns an error if the parameter is not a valid number.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let Ok(parsed) = split_semicolon_params(params) else {
        return Err(ParserFailures::UnhandledCursorMoveCommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    let count = match extract_param(0, &parsed) {
        Some(0) | None => 1,
        Some(n) => n,
    };

    output.push(TerminalCommand::CursorPreviousLine(count));
    Ok(())
}
