// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use corvid_common::{
    colors::TerminalColor,
    sgr::SelectGraphicRendition,
    style::UnderlineStyle,
};

use crate::ansi::{parse_numeric_param, split_colon_params, TerminalCommand};
use crate::error::ParserFailures;

/// Select Graphic Rendition (SGR): ESC [ Pm m
///
/// Handles the single-code renditions, the extended color selectors in
/// both spellings (`38;5;n` / `38;2;r;g;b` and the colon forms
/// `38:5:n` / `38:2::r:g:b`), underline sub-styles `4:x`, and underline
/// color via 58/59.
///
/// # Errors
/// Returns an error when a parameter fails to parse or an extended color
/// selector is missing its arguments.
pub fn parse(params: &[u8], output: &mut Vec<TerminalCommand>) -> Result<(), ParserFailures> {
    let segments: Vec<&[u8]> = params.split(|b| *b == b';').collect();
    let mut rendition = Vec::new();

    let mut i = 0;
    while i < segments.len() {
        let segment = segments[i];

        if segment.contains(&b':') {
            rendition.push(parse_colon_segment(segment)?);
            i += 1;
            continue;
        }

        let code = numeric(segment)?.unwrap_or(0);
        match code {
            38 | 48 | 58 => {
                let (color, consumed) = parse_semicolon_color(&segments[i + 1..], segment)?;
                rendition.push(apply_color(code, color));
                i += 1 + consumed;
            }
            _ => {
                rendition.push(SelectGraphicRendition::from_usize(code));
                i += 1;
            }
        }
    }

    output.push(TerminalCommand::Sgr(rendition));
    Ok(())
}

fn numeric(segment: &[u8]) -> Result<Option<usize>, ParserFailures> {
    parse_numeric_param(segment)
        .map_err(|_| ParserFailures::UnhandledSGRCommand(String::from_utf8_lossy(segment).to_string()))
}

/// One `a:b:c...` segment: either an underline sub-style or a colon-form
/// extended color.
fn parse_colon_segment(segment: &[u8]) -> Result<SelectGraphicRendition, ParserFailures> {
    let subs = split_colon_params(segment)
        .map_err(|_| ParserFailures::UnhandledSGRCommand(String::from_utf8_lossy(segment).to_string()))?;

    let code = subs.first().copied().flatten().unwrap_or(0);
    match code {
        4 => {
            let style = subs.get(1).copied().flatten().unwrap_or(1);
            Ok(SelectGraphicRendition::Underline(
                UnderlineStyle::from_subparam(style),
            ))
        }
        38 | 48 | 58 => {
            let color = colon_color(&subs).ok_or_else(|| {
                ParserFailures::UnhandledSGRCommand(String::from_utf8_lossy(segment).to_string())
            })?;
            Ok(apply_color(code, color))
        }
        _ => Ok(SelectGraphicRendition::from_usize(code)),
    }
}

fn colon_color(subs: &[Option<usize>]) -> Option<TerminalColor> {
    match subs.get(1).copied().flatten()? {
        5 => {
            let index = subs.get(2).copied().flatten()?;
            Some(TerminalColor::Palette(u8::try_from(index).ok()?))
        }
        2 => {
            // `38:2:r:g:b` or the ODA form `38:2::r:g:b` with a color space id
            let tail: Vec<usize> = subs[2..]
                .iter()
                .map(|v| v.unwrap_or(0))
                .collect();
            let rgb: &[usize] = match tail.len() {
                3 => &tail,
                l if l >= 4 => &tail[1..4],
                _ => return None,
            };
            Some(TerminalColor::Custom(
                u8::try_from(rgb[0]).ok()?,
                u8::try_from(rgb[1]).ok()?,
                u8::try_from(rgb[2]).ok()?,
            ))
        }
        _ => None,
    }
}

/// `38;5;n` / `38;2;r;g;b`: the color arguments ride in the following
/// semicolon segments. Returns the color and how many segments it ate.
fn parse_semicolon_color(
    rest: &[&[u8]],
    origin: &[u8],
) -> Result<(TerminalColor, usize), ParserFailures> {
    let fail = || ParserFailures::UnhandledSGRCommand(String::from_utf8_lossy(origin).to_string());

    match rest.first() {
        Some(mode) => match numeric(mode)?.unwrap_or(0) {
            5 => {
                let index = numeric(rest.get(1).copied().unwrap_or(b""))?.ok_or_else(fail)?;
                let index = u8::try_from(index).map_err(|_| fail())?;
                Ok((TerminalColor::Palette(index), 2))
            }
            2 => {
                if rest.len() < 4 {
                    return Err(fail());
                }
                let r = numeric(rest[1])?.ok_or_else(fail)?;
                let g = numeric(rest[2])?.ok_or_else(fail)?;
                let b = numeric(rest[3])?.ok_or_else(fail)?;
                Ok((
                    TerminalColor::Custom(
                        u8::try_from(r).map_err(|_| fail())?,
                        u8::try_from(g).map_err(|_| fail())?,
                        u8::try_from(b).map_err(|_| fail())?,
                    ),
                    4,
                ))
            }
            _ => Err(fail()),
        },
        None => Err(fail()),
    }
}

const fn apply_color(code: usize, color: TerminalColor) -> SelectGraphicRendition {
    match code {
        48 => SelectGraphicRendition::Background(color),
        58 => SelectGraphicRendition::UnderlineColor(color),
        _ => SelectGraphicRendition::Foreground(color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(params: &[u8]) -> Vec<SelectGraphicRendition> {
        let mut out = Vec::new();
        parse(params, &mut out).unwrap_or_else(|e| panic!("parse failed: {e}"));
        match out.remove(0) {
            TerminalCommand::Sgr(sgrs) => sgrs,
            other => panic!("expected Sgr, got {other:?}"),
        }
    }

    #[test]
    fn empty_is_reset() {
        assert_eq!(parse_one(b""), vec![SelectGraphicRendition::Reset]);
    }

    #[test]
    fn multiple_codes() {
        assert_eq!(
            parse_one(b"1;31"),
            vec![
                SelectGraphicRendition::Bold,
                SelectGraphicRendition::Foreground(TerminalColor::Red)
            ]
        );
    }

    #[test]
    fn palette_color_semicolon_form() {
        assert_eq!(
            parse_one(b"38;5;120"),
            vec![SelectGraphicRendition::Foreground(TerminalColor::Palette(
                120
            ))]
        );
    }

    #[test]
    fn truecolor_semicolon_form() {
        assert_eq!(
            parse_one(b"48;2;10;20;30"),
            vec![SelectGraphicRendition::Background(TerminalColor::Custom(
                10, 20, 30
            ))]
        );
    }

    #[test]
    fn truecolor_colon_form_with_colorspace() {
        assert_eq!(
            parse_one(b"38:2::255:0:128"),
            vec![SelectGraphicRendition::Foreground(TerminalColor::Custom(
                255, 0, 128
            ))]
        );
    }

    #[test]
    fn truecolor_colon_form_without_colorspace() {
        assert_eq!(
            parse_one(b"38:2:255:0:128"),
            vec![SelectGraphicRendition::Foreground(TerminalColor::Custom(
                255, 0, 128
            ))]
        );
    }

    #[test]
    fn curly_underline_subparam() {
        assert_eq!(
            parse_one(b"4:3"),
            vec![SelectGraphicRendition::Underline(UnderlineStyle::Curly)]
        );
        assert_eq!(
            parse_one(b"4:0"),
            vec![SelectGraphicRendition::Underline(UnderlineStyle::None)]
        );
    }

    #[test]
    fn underline_color() {
        assert_eq!(
            parse_one(b"58;2;1;2;3"),
            vec![SelectGraphicRendition::UnderlineColor(
                TerminalColor::Custom(1, 2, 3)
            )]
        );
        assert_eq!(
            parse_one(b"59"),
            vec![SelectGraphicRendition::ResetUnderlineColor]
        );
    }

    #[test]
    fn color_arguments_consume_segments() {
        assert_eq!(
            parse_one(b"1;38;5;9;4"),
            vec![
                SelectGraphicRendition::Bold,
                SelectGraphicRendition::Foreground(TerminalColor::Palette(9)),
                SelectGraphicRendition::Underline(UnderlineStyle::Single),
            ]
        );
    }

    #[test]
    fn missing_color_arguments_error() {
        let mut out = Vec::new();
        assert!(parse(b"38;5", &mut out).is_err());
        assert!(parse(b"38;2;1;2", &mut out).is_err());
    }
}
