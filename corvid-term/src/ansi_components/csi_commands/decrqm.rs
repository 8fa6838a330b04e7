// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::TerminalCommand;
use crate::error::ParserFailures;

/// Request Mode (DECRQM): ESC [ Ps $ p (ANSI) or ESC [ ? Ps $ p (DEC
/// private). The raw parameter bytes (private marker included) travel with
/// the command so the dispatcher can answer from live mode state.
///
/// # Errors
/// Returns an error when the parameter is not a number.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let digits = params.strip_prefix(b"?").unwrap_or(params);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(ParserFailures::UnhandledDECRQMCommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    }

    output.push(TerminalCommand::RequestMode {
        raw: params.to_vec(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_and_ansi_forms() {
        let mut out = Vec::new();
        assert!(parse(b"?2004", &mut out).is_ok());
        assert!(parse(b"20", &mut out).is_ok());
        assert_eq!(
            out,
            vec![
                TerminalCommand::RequestMode {
                    raw: b"?2004".to_vec()
                },
                TerminalCommand::RequestMode {
                    raw: b"20".to_vec()
                },
            ]
        );
    }

    #[test]
    fn junk_is_rejected() {
        let mut out = Vec::new();
        assert!(parse(b"?x", &mut out).is_err());
        assert!(parse(b"", &mut out).is_err());
    }
}
