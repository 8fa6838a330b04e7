// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ansi::{TerminalCommand, parse_numeric_param};
use crate::error::ParserFailures;

/// Device Attributes queries.
///
/// Supported forms:
/// - `ESC [ c` / `ESC [ 0 c`  → Primary DA (DA1)
/// - `ESC [ > c` / `ESC [ > 0 c` → Secondary DA (DA2)
/// - `ESC [ = c` / `ESC [ = 0 c` → Tertiary DA (DA3)
///
/// # Errors
/// Returns an error for malformed parameters.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let (marker, digits) = match params.first() {
        Some(b'>') => (Some(b'>'), &params[1..]),
        Some(b'=') => (Some(b'='), &params[1..]),
        _ => (None, params),
    };

    let Ok(param) = parse_numeric_param(digits) else {
        return Err(ParserFailures::UnhandledDACommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    if param.unwrap_or(0) != 0 {
        return Err(ParserFailures::UnhandledDACommand(format!(
            "unsupported DA parameter {param:?}"
        )));
    }

    let command = match marker {
        None => TerminalCommand::RequestDeviceAttributes,
        Some(b'>') => TerminalCommand::RequestSecondaryDeviceAttributes,
        Some(_) => TerminalCommand::RequestTertiaryDeviceAttributes,
    };
    output.push(command);
    Ok(())
}

/// XTVERSION: ESC [ > Ps q — report the emulator name and version.
///
/// # Errors
/// Returns an error for malformed parameters.
pub fn parse_xt_version(
    params: &[u8],
    output: &mut Vec<TerminalCommand>,
) -> Result<(), ParserFailures> {
    let digits = params.strip_prefix(b">").unwrap_or(params);

    let Ok(param) = parse_numeric_param(digits) else {
        return Err(ParserFailures::UnhandledDACommand(
            String::from_utf8_lossy(params).to_string(),
        ));
    };

    if param.unwrap_or(0) != 0 {
        return Err(ParserFailures::UnhandledDACommand(format!(
            "unsupported XTVERSION parameter {param:?}"
        )));
    }

    output.push(TerminalCommand::RequestXtVersion);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_secondary_tertiary() {
        let mut out = Vec::new();
        assert!(parse(b"", &mut out).is_ok());
        assert!(parse(b"0", &mut out).is_ok());
        assert!(parse(b">", &mut out).is_ok());
        assert!(parse(b"=", &mut out).is_ok());
        assert_eq!(
            out,
            vec![
                TerminalCommand::RequestDeviceAttributes,
                TerminalCommand::RequestDeviceAttributes,
                TerminalCommand::RequestSecondaryDeviceAttributes,
                TerminalCommand::RequestTertiaryDeviceAttributes,
            ]
        );
    }

    #[test]
    fn nonzero_parameters_are_rejected() {
        let mut out = Vec::new();
        assert!(parse(b"1", &mut out).is_err());
        assert!(parse(b">2", &mut out).is_err());
    }

    #[test]
    fn xt_version() {
        let mut out = Vec::new();
        assert!(parse_xt_version(b">", &mut out).is_ok());
        assert_eq!(out, vec![TerminalCommand::RequestXtVersion]);
    }
}
