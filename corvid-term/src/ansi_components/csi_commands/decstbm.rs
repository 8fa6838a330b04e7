// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, extract_param, split_semicolon_params};
use crate::error::ParserFailures;

/// Set Top and Bottom Margins (DECSTBM): ESC [ Pt ; Pb r
///
/// Parameters are 1-based; 0 or absent selects the screen edge. The raw
/// values are forwarded; validation against the current height happens in
/// the dispatcher.
///
/// # Errors
/// Returns an error if a parameter is not a valid number.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let Ok(parsed) = split_semicolon_params(params) else {
        return Err(ParserFailures::UnhandledDECSTBMCommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    let top = extract_param(0, &parsed).unwrap_or(0);
    let bottom = extract_param(1, &parsed).unwrap_or(0);

    output.push(TerminalCommand::SetTopAndBottomMargins { top, bottom });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_margins() {
        let mut out = Vec::new();
        assert!(parse(b"5;20", &mut out).is_ok());
        assert_eq!(
            out,
            vec![TerminalCommand::SetTopAndBottomMargins { top: 5, bottom: 20 }]
        );
    }

    #[test]
    fn empty_resets_to_full_screen() {
        let mut out = Vec::new();
        assert!(parse(b"", &mut out).is_ok());
        assert_eq!(
            out,
            vec![TerminalCommand::SetTopAndBottomMargins { top: 0, bottom: 0 }]
        );
    }
}
