// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use corvid_common::cursor::CursorVisualStyle;

use crate::ansi::{TerminalCommand, extract_param, split_semicolon_params};
use crate::error::ParserFailures;

/// Set Cursor Style (DECSCUSR): ESC [ Ps SP q
///
/// # Errors
/// Returns an error if the parameter is not a valid number.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let Ok(parsed) = split_semicolon_params(params) else {
        return Err(ParserFailures::UnhandledDECSCUSRCommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    let style = extract_param(0, &parsed).unwrap_or(0);
    output.push(TerminalCommand::CursorStyle(CursorVisualStyle::from(style)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_map() {
        let mut out = Vec::new();
        assert!(parse(b"4", &mut out).is_ok());
        assert_eq!(
            out,
            vec![TerminalCommand::CursorStyle(
                CursorVisualStyle::UnderlineCursorSteady
            )]
        );
    }

    #[test]
    fn default_is_blinking_block() {
        let mut out = Vec::new();
        assert!(parse(b"", &mut out).is_ok());
        assert_eq!(
            out,
            vec![TerminalCommand::CursorStyle(
                CursorVisualStyle::BlockCursorBlink
            )]
        );
    }
}
