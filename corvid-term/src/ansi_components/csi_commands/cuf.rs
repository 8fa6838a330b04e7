// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, extract_param, split_semicolon_params};
use crate::error::ParserFailures;

/// Cursor Forward (CUF): ESC [ Pn C. Also covers HPR (ESC [ Pn a).
/// Stops at the right margin.
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

    output.push(TerminalCommand::SetCursorPosRel {
        x: Some(i32::try_from(count).unwrap_or(i32::MAX)),
        y: None,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_right() {
        let mut out = Vec::new();
        assert!(parse(b"7", &mut out).is_ok());
        assert_eq!(
            out,
            vec![TerminalCommand::SetCursorPosRel {
                x: Some(7),
                y: None
            }]
        );
    }
}
