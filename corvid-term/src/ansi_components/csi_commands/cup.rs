// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, extract_param, split_semicolon_params};
use crate::error::ParserFailures;

/// Cursor Position (CUP / HVP)
///
/// ESC [ Pl ; Pc H — row and column are 1-based; absent or zero parameters
/// default to 1.
///
/// # Errors
/// Returns an error if a parameter is not a valid number.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let Ok(parsed) = split_semicolon_params(params) else {
        return Err(ParserFailures::UnhandledCUPCommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    let y = match extract_param(0, &parsed) {
        Some(0 | 1) | None => 1,
        Some(n) => n,
    };

    let x = match extract_param(1, &parsed) {
        Some(0 | 1) | None => 1,
        Some(n) => n,
    };

    output.push(TerminalCommand::SetCursorPos {
        x: Some(x),
        y: Some(y),
    });

    Ok(())
}
