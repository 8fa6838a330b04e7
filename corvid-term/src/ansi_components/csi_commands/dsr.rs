// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, parse_numeric_param};
use crate::error::ParserFailures;

/// Device Status Report (DSR): ESC [ Ps n and the DEC `?`-prefixed forms.
///
/// Ps 5 asks for operating status, 6 for the cursor position; ?15 printer
/// status, ?25 UDK lock state, ?26 keyboard dialect.
///
/// # Errors
/// Returns an error for malformed or unknown parameters.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let (private, digits) = params
        .strip_prefix(b"?")
        .map_or((false, params), |rest| (true, rest));

    let Ok(param) = parse_numeric_param(digits) else {
        return Err(ParserFailures::UnhandledDSRCommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    let command = match (private, param.unwrap_or(0)) {
        (false, 5) => TerminalCommand::RequestStatus,
        (false, 6) => TerminalCommand::RequestCursorPosition,
        // DECXCPR: like CPR, the private variant answers with a `?` form,
        // which we do not distinguish
        (true, 6) => TerminalCommand::RequestCursorPosition,
        (true, 15) => TerminalCommand::RequestPrinterStatus,
        (true, 25) => TerminalCommand::RequestUdkStatus,
        (true, 26) => TerminalCommand::RequestKeyboardStatus,
        (_, other) => {
            return Err(ParserFailures::UnhandledDSRCommand(format!(
                "unknown DSR selector {other} (private={private})"
            )));
        }
    };

    output.push(command);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_position_report() {
        let mut out = Vec::new();
        assert!(parse(b"6", &mut out).is_ok());
        assert_eq!(out, vec![TerminalCommand::RequestCursorPosition]);
    }

    #[test]
    fn dec_private_forms() {
        let mut out = Vec::new();
        assert!(parse(b"?15", &mut out).is_ok());
        assert!(parse(b"?25", &mut out).is_ok());
        assert!(parse(b"?26", &mut out).is_ok());
        assert_eq!(
            out,
            vec![
                TerminalCommand::RequestPrinterStatus,
                TerminalCommand::RequestUdkStatus,
                TerminalCommand::RequestKeyboardStatus,
            ]
        );
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let mut out = Vec::new();
        assert!(parse(b"7", &mut out).is_err());
    }
}
