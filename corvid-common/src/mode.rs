// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt;

use crate::modes::{
    decawm::Decawm, decckm::Decckm, deccolm::Deccolm, decom::Decom, decscnm::Decscnm,
    dectcem::Dectcem, lnm::Lnm,
    mouse::{MouseEncoding, MouseTrack},
    reverse_wrap_around::ReverseWrapAround, rl_bracket::RlBracket, unknown::UnknownMode,
    xtcblink::XtCBlink, xtextscrn::XtExtscrn, xtmsewin::XtMseWin,
};

/// Whether a `CSI h` or `CSI l` arrived.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Eq, PartialEq, Default, Clone, Copy)]
pub enum SetMode {
    DecSet,
    #[default]
    DecRst,
}

impl fmt::Display for SetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecSet => write!(f, "Mode Set"),
            Self::DecRst => write!(f, "Mode Reset"),
        }
    }
}

/// The live DECSET/DECRST state of a terminal.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub struct TerminalModes {
    pub cursor_key: Decckm,
    pub autowrap: Decawm,
    pub origin: Decom,
    pub column: Deccolm,
    pub invert_screen: Decscnm,
    pub show_cursor: Dectcem,
    pub line_feed: Lnm,
    pub cursor_blink: XtCBlink,
    pub bracketed_paste: RlBracket,
    pub focus_reporting: XtMseWin,
    pub reverse_wrap_around: ReverseWrapAround,
    pub mouse_tracking: MouseTrack,
    pub mouse_encoding: MouseEncoding,
    pub alt_screen: XtExtscrn,
}

/// One decoded mode-change request.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Mode {
    Decckm(Decckm),
    Decawm(Decawm),
    Deccolm(Deccolm),
    Decom(Decom),
    Decscnm(Decscnm),
    Dectcem(Dectcem),
    LineFeedMode(Lnm),
    XtCBlink(XtCBlink),
    /// ?1049: alternate screen with cursor save/restore and clear.
    XtExtscrn(XtExtscrn),
    /// ?47 / ?1047: plain alternate-screen switch.
    XtAltScreen(SetMode),
    /// ?1048: save/restore cursor only.
    XtSaveCursor(SetMode),
    FocusReporting(XtMseWin),
    BracketedPaste(RlBracket),
    ReverseWrapAround(ReverseWrapAround),
    MouseMode(MouseTrack),
    MouseEncoding {
        encoding: MouseEncoding,
        set: SetMode,
    },
    Unknown(UnknownMode),
}

impl Mode {
    /// Decode the raw parameter bytes of a `CSI ... h|l` into a mode change.
    /// The private-marker `?` is part of the parameter bytes.
    #[must_use]
    pub fn terminal_mode_from_params(params: &[u8], mode: &SetMode) -> Self {
        match params {
            // https://vt100.net/docs/vt510-rm/DECCKM.html
            b"?1" => Self::Decckm(Decckm::new(mode)),
            b"?3" => Self::Deccolm(Deccolm::new(mode)),
            b"?5" => Self::Decscnm(Decscnm::new(mode)),
            b"?6" => Self::Decom(Decom::new(mode)),
            b"?7" => Self::Decawm(Decawm::new(mode)),
            b"?9" => Self::mouse(MouseTrack::X10, mode),
            b"?12" => Self::XtCBlink(XtCBlink::new(mode)),
            b"20" => Self::LineFeedMode(Lnm::new(mode)),
            b"?25" => Self::Dectcem(Dectcem::new(mode)),
            b"?45" => Self::ReverseWrapAround(ReverseWrapAround::new(mode)),
            b"?47" | b"?1047" => Self::XtAltScreen(*mode),
            b"?1048" => Self::XtSaveCursor(*mode),
            b"?1000" => Self::mouse(MouseTrack::Normal, mode),
            b"?1002" => Self::mouse(MouseTrack::ButtonEvent, mode),
            b"?1003" => Self::mouse(MouseTrack::AnyEvent, mode),
            b"?1004" => Self::FocusReporting(XtMseWin::new(mode)),
            b"?1006" => Self::MouseEncoding {
                encoding: MouseEncoding::Sgr,
                set: *mode,
            },
            b"?1015" => Self::MouseEncoding {
                encoding: MouseEncoding::Urxvt,
                set: *mode,
            },
            b"?1016" => Self::MouseEncoding {
                encoding: MouseEncoding::SgrPixels,
                set: *mode,
            },
            b"?1049" => Self::XtExtscrn(XtExtscrn::new(mode)),
            b"?2004" => Self::BracketedPaste(RlBracket::new(mode)),
            _ => Self::Unknown(UnknownMode::new(params, *mode)),
        }
    }

    fn mouse(track: MouseTrack, mode: &SetMode) -> Self {
        match mode {
            SetMode::DecSet => Self::MouseMode(track),
            SetMode::DecRst => Self::MouseMode(MouseTrack::NoTracking),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decckm(m) => write!(f, "{m}"),
            Self::Decawm(m) => write!(f, "{m}"),
            Self::Deccolm(m) => write!(f, "{m}"),
            Self::Decom(m) => write!(f, "{m}"),
            Self::Decscnm(m) => write!(f, "{m}"),
            Self::Dectcem(m) => write!(f, "{m}"),
            Self::LineFeedMode(m) => write!(f, "{m}"),
            Self::XtCBlink(m) => write!(f, "{m}"),
            Self::XtExtscrn(m) => write!(f, "{m}"),
            Self::XtAltScreen(m) => write!(f, "Alternate Screen (?47/?1047) {m}"),
            Self::XtSaveCursor(m) => write!(f, "Save Cursor (?1048) {m}"),
            Self::FocusReporting(m) => write!(f, "{m}"),
            Self::BracketedPaste(m) => write!(f, "{m}"),
            Self::ReverseWrapAround(m) => write!(f, "{m}"),
            Self::MouseMode(m) => write!(f, "{m}"),
            Self::MouseEncoding { encoding, set } => write!(f, "{encoding} {set}"),
            Self::Unknown(m) => write!(f, "{m}"),
        }
    }
}
