// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, extract_param, split_semicolon_params};
use crate::error::ParserFailures;

/// Scroll Up (SU): ESC [ Pn S — the region shifts up, blanks enter at the
/// bottom.
///
/// # Errors
/// Returns an error if the parameter is not a valid number.
pub fn parse_up(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    output.push(TerminalCommand::ScrollUp(count(params)?));
    Ok(())
}

/// Scroll Down (SD): ESC [ Pn T.
///
/// # Errors
/// Returns an error if the parameter is not a valid number.
pub fn parse_down(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    output.push(TerminalCommand::ScrollDown(count(params)?));
    Ok(())
}

fn count(params: &[u8]) -> Result<usize, ParserFailures> {
    let Ok(parsed) = split_semicolon_params(params) else {
        return Err(ParserFailures::UnhandledScrollCommand(
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
    fn scroll_directions() {
        let mut out = Vec::new();
        assert!(parse_up(b"3", &mut out).is_ok());
        assert!(parse_down(b"", &mut out).is_ok());
        assert_eq!(
            out,
            vec![TerminalCommand::ScrollUp(3), TerminalCommand::ScrollDown(1)]
        );
    }
}
