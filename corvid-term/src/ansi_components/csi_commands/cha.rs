// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, extract_param, split_semicolon_params};
use crate::error::ParserFailures;

/// Cursor Horizontal Absolute (CHA): ESC [ Pn G, 1-based column. HPA
/// (ESC [ Pn `) is the same operation.
///
/// # Errors
/// Returns an error if the parameter is not a valid number.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let Ok(parsed) = split_semicolon_params(params) else {
        return Err(ParserFailures::UnhandledCHACommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    let col = match extract_param(0, &parsed) {
        Some(0) | None => 1,
        Some(n) => n,
    };

    output.push(TerminalCommand::SetCursorCol(col));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_based_column() {
        let mut out = Vec::new();
        assert!(parse(b"12", &mut out).is_ok());
        assert_eq!(out, vec![TerminalCommand::SetCursorCol(12)]);
    }

    #[test]
    fn default_is_column_one() {
        let mut out = Vec::new();
        assert!(parse(b"", &mut out).is_ok());
        assert_eq!(out, vec![TerminalCommand::SetCursorCol(1)]);
    }
}
