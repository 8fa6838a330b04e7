// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt;

// OSC 0    SETTITLE     Change Window & Icon Title
// OSC 1    SETICON      Change Icon Title
// OSC 2    SETWINTITLE  Change Window Title
// OSC 4    SETCOLPAL    Set/Query color palette
// OSC 7    SETCWD       Set current working directory
// OSC 8    HYPERLINK    Hyperlinked Text
// OSC 10   COLORFG      Change or request text foreground color
// OSC 11   COLORBG      Change or request text background color
// OSC 12   COLORCURSOR  Change or request text cursor color
// OSC 52   CLIPBOARD    Clipboard management
// OSC 104  RCOLPAL      Reset color palette entries (or all)
// OSC 110  RCOLORFG     Reset text foreground color
// OSC 111  RCOLORBG     Reset text background color
// OSC 112  RCOLORCURSOR Reset text cursor color
// OSC 133  FTCS         Semantic prompt marks
// OSC 1337 ITERM2       Inline images and other iTerm2 extensions

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TitleKind {
    Window,
    Icon,
    Both,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DynamicColorSlot {
    Foreground,
    Background,
    Cursor,
}

impl DynamicColorSlot {
    /// The OSC selector that addresses this slot (and prefixes its reply).
    #[must_use]
    pub const fn selector(self) -> usize {
        match self {
            Self::Foreground => 10,
            Self::Background => 11,
            Self::Cursor => 12,
        }
    }
}

/// One entry of an OSC 4 request; set and query pairs can be mixed freely.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PaletteOp {
    Set(u8, String),
    Query(u8),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ClipboardPayload {
    /// Base64 payload exactly as sent; decoding and trust policy are the
    /// embedder's business.
    Set(Vec<u8>),
    Query,
}

/// FTCS marks (OSC 133) used by shell integration.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SemanticPrompt {
    PromptStart,
    CommandStart,
    CommandExecuted,
    CommandFinished(Option<i32>),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum OscCommand {
    SetTitle {
        kind: TitleKind,
        text: String,
    },
    Palette(Vec<PaletteOp>),
    /// OSC 104; an empty list resets the whole palette.
    ResetPalette(Vec<u8>),
    SetDynamicColor {
        slot: DynamicColorSlot,
        spec: String,
    },
    QueryDynamicColor(DynamicColorSlot),
    ResetDynamicColor(DynamicColorSlot),
    SetWorkingDirectory(String),
    Hyperlink {
        id: Option<String>,
        uri: String,
    },
    HyperlinkEnd,
    Clipboard {
        selection: String,
        payload: ClipboardPayload,
    },
    SemanticPrompt(SemanticPrompt),
    /// `OSC 1337 ; File=<args> : <base64>` — payload stays base64-encoded.
    ITerm2Image {
        args: String,
        data: Vec<u8>,
    },
    Unknown(String),
}

impl fmt::Display for OscCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetTitle { kind, text } => write!(f, "SetTitle({kind:?}, {text})"),
            Self::Palette(ops) => write!(f, "Palette({} ops)", ops.len()),
            Self::ResetPalette(indices) => write!(f, "ResetPalette({indices:?})"),
            Self::SetDynamicColor { slot, spec } => write!(f, "SetDynamicColor({slot:?}, {spec})"),
            Self::QueryDynamicColor(slot) => write!(f, "QueryDynamicColor({slot:?})"),
            Self::ResetDynamicColor(slot) => write!(f, "ResetDynamicColor({slot:?})"),
            Self::SetWorkingDirectory(path) => write!(f, "SetWorkingDirectory({path})"),
            Self::Hyperlink { id, uri } => write!(f, "Hyperlink({id:?}, {uri})"),
            Self::HyperlinkEnd => write!(f, "HyperlinkEnd"),
            Self::Clipboard { selection, .. } => write!(f, "Clipboard({selection})"),
            Self::SemanticPrompt(mark) => write!(f, "SemanticPrompt({mark:?})"),
            Self::ITerm2Image { args, data } => {
                write!(f, "ITerm2Image({args}, {} bytes)", data.len())
            }
            Self::Unknown(raw) => write!(f, "Unknown({raw})"),
        }
    }
}

/// Decode a complete OSC payload (terminator already stripped).
#[must_use]
pub fn parse(payload: &[u8]) -> OscCommand {
    let (selector, rest) = split_once(payload, b';');

    let Some(selector) = ascii_number(selector) else {
        debug!(
            "OSC with non-numeric selector: {:?}",
            String::from_utf8_lossy(payload)
        );
        return OscCommand::Unknown(String::from_utf8_lossy(payload).to_string());
    };

    let rest = rest.unwrap_or(b"");
    match selector {
        0 => OscCommand::SetTitle {
            kind: TitleKind::Both,
            text: String::from_utf8_lossy(rest).to_string(),
        },
        1 => OscCommand::SetTitle {
            kind: TitleKind::Icon,
            text: String::from_utf8_lossy(rest).to_string(),
        },
        2 => OscCommand::SetTitle {
            kind: TitleKind::Window,
            text: String::from_utf8_lossy(rest).to_string(),
        },
        4 => parse_palette(rest),
        7 => OscCommand::SetWorkingDirectory(String::from_utf8_lossy(rest).to_string()),
        8 => parse_hyperlink(rest),
        10 | 11 | 12 => parse_dynamic_color(selector, rest),
        52 => parse_clipboard(rest),
        104 => {
            let indices = rest
                .split(|b| *b == b';')
                .filter_map(ascii_number)
                .filter_map(|n| u8::try_from(n).ok())
                .collect();
            OscCommand::ResetPalette(indices)
        }
        110 => OscCommand::ResetDynamicColor(DynamicColorSlot::Foreground),
        111 => OscCommand::ResetDynamicColor(DynamicColorSlot::Background),
        112 => OscCommand::ResetDynamicColor(DynamicColorSlot::Cursor),
        133 => parse_semantic_prompt(rest),
        1337 => parse_iterm2(rest),
        other => {
            debug!("unhandled OSC selector {other}");
            OscCommand::Unknown(String::from_utf8_lossy(payload).to_string())
        }
    }
}

fn parse_palette(rest: &[u8]) -> OscCommand {
    let mut ops = Vec::new();
    let mut fields = rest.split(|b| *b == b';');

    while let Some(index) = fields.next() {
        let Some(spec) = fields.next() else { break };
        let Some(index) = ascii_number(index).and_then(|n| u8::try_from(n).ok()) else {
            continue;
        };
        if spec == b"?" {
            ops.push(PaletteOp::Query(index));
        } else {
            ops.push(PaletteOp::Set(
                index,
                String::from_utf8_lossy(spec).to_string(),
            ));
        }
    }

    OscCommand::Palette(ops)
}

fn parse_hyperlink(rest: &[u8]) -> OscCommand {
    let (params, uri) = split_once(rest, b';');
    let uri = uri.unwrap_or(b"");

    if uri.is_empty() {
        return OscCommand::HyperlinkEnd;
    }

    // params are `key=value` pairs separated by ':'; only `id` is defined
    let id = params
        .split(|b| *b == b':')
        .filter_map(|pair| {
            let (key, value) = split_once(pair, b'=');
            (key == b"id").then(|| String::from_utf8_lossy(value.unwrap_or(b"")).to_string())
        })
        .next()
        .filter(|id| !id.is_empty());

    OscCommand::Hyperlink {
        id,
        uri: String::from_utf8_lossy(uri).to_string(),
    }
}

fn parse_dynamic_color(selector: usize, rest: &[u8]) -> OscCommand {
    let slot = match selector {
        10 => DynamicColorSlot::Foreground,
        11 => DynamicColorSlot::Background,
        _ => DynamicColorSlot::Cursor,
    };

    // xterm allows `OSC 10;fg;bg`; only the first spec is honored here
    let (spec, _) = split_once(rest, b';');
    if spec == b"?" {
        OscCommand::QueryDynamicColor(slot)
    } else {
        OscCommand::SetDynamicColor {
            slot,
            spec: String::from_utf8_lossy(spec).to_string(),
        }
    }
}

fn parse_clipboard(rest: &[u8]) -> OscCommand {
    let (selection, data) = split_once(rest, b';');
    let data = data.unwrap_or(b"");

    let payload = if data == b"?" {
        ClipboardPayload::Query
    } else {
        ClipboardPayload::Set(data.to_vec())
    };

    OscCommand::Clipboard {
        selection: String::from_utf8_lossy(selection).to_string(),
        payload,
    }
}

fn parse_semantic_prompt(rest: &[u8]) -> OscCommand {
    let (mark, args) = split_once(rest, b';');
    let prompt = match mark {
        b"A" => SemanticPrompt::PromptStart,
        b"B" => SemanticPrompt::CommandStart,
        b"C" => SemanticPrompt::CommandExecuted,
        b"D" => {
            let exit = args
                .and_then(|a| std::str::from_utf8(a).ok())
                .and_then(|a| a.split(';').next())
                .and_then(|a| a.parse().ok());
            SemanticPrompt::CommandFinished(exit)
        }
        other => {
            debug!(
                "unknown FTCS mark {:?}",
                String::from_utf8_lossy(other)
            );
            return OscCommand::Unknown(format!("133;{}", String::from_utf8_lossy(rest)));
        }
    };
    OscCommand::SemanticPrompt(prompt)
}

fn parse_iterm2(rest: &[u8]) -> OscCommand {
    let Some(file) = rest.strip_prefix(b"File=") else {
        return OscCommand::Unknown(format!("1337;{}", String::from_utf8_lossy(rest)));
    };

    let (args, data) = split_once(file, b':');
    OscCommand::ITerm2Image {
        args: String::from_utf8_lossy(args).to_string(),
        data: data.unwrap_or(b"").to_vec(),
    }
}

fn split_once(bytes: &[u8], sep: u8) -> (&[u8], Option<&[u8]>) {
    bytes.iter().position(|&b| b == sep).map_or((bytes, None), |idx| {
        (&bytes[..idx], Some(&bytes[idx + 1..]))
    })
}

fn ascii_number(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let mut value: usize = 0;
    for &b in bytes {
        value = value.saturating_mul(10).saturating_add(usize::from(b - b'0'));
    }
    Some(value)
}
