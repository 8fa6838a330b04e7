// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, extract_param, split_semicolon_params};
use crate::error::ParserFailures;

/// Cursor Horizontal Tab (CHT): ESC [ Pn I.
///
/// # Errors
/// Returns an error if the parameter is not a valid number.
pub fn parse_cht(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    output.push(TerminalCommand::TabForward(count(params)?));
    Ok(())
}

/// Cursor Backward Tab (CBT): ESC [ Pn Z.
///
/// # Errors
/// Returns an error if the parameter is not a valid number.
pub fn parse_cbt(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    output.push(TerminalCommand::TabBackward(count(params)?));
    Ok(())
}

/// Tab Clear (TBC): ESC [ Ps g — 0 clears the stop at the cursor, 3 clears
/// every stop.
///
/// # Errors
/// Returns an error for a malformed or unknown parameter.
pub fn parse_tbc(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let Ok(parsed) = split_semicolon_params(params) else {
        return Err(ParserFailures::UnhandledTabCommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    let mode = extract_param(0, &parsed).unwrap_or(0);
    match mode {
        0 | 3 => {
            output.push(TerminalCommand::ClearTabStop(mode));
            Ok(())
        }
        other => Err(ParserFailures::UnhandledTabCommand(format!(
            "unknown TBC mode {other}"
        ))),
    }
}

fn count(params: &[u8]) -> Result<usize, ParserFailures> {
    let Ok(parsed) = split_semicolon_params(params) else {
        return Err(ParserFailures::UnhandledTabCommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    Ok(match extract_param(0, &parsed) {
        Some(0) | None => 1,
        Some(n) => n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_and_backward() {
        let mut out = Vec::new();
        assert!(parse_cht(b"2", &mut out).is_ok());
        assert!(parse_cbt(b"", &mut out).is_ok());
        assert_eq!(
            out,
            vec![TerminalCommand::TabForward(2), TerminalCommand::TabBackward(1)]
        );
    }

    #[test]
    fn clear_modes() {
        let mut out = Vec::new();
        assert!(parse_tbc(b"", &mut out).is_ok());
        assert!(parse_tbc(b"3", &mut out).is_ok());
        assert!(parse_tbc(b"1", &mut out).is_err());
        assert_eq!(
            out,
            vec![
                TerminalCommand::ClearTabStop(0),
                TerminalCommand::ClearTabStop(3)
            ]
        );
    }
}
