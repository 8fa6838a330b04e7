// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt;

use crate::mode::SetMode;
use crate::modes::{MouseModeNumber, ReportMode};

/// Wire format for mouse reports. Orthogonal to the tracking mode: xterm
/// lets a host enable SGR or urxvt framing on top of any tracking protocol.
// https://invisible-island.net/xterm/ctlseqs/ctlseqs.html#h2-Mouse-Tracking
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub enum MouseEncoding {
    /// Legacy `CSI M` with each value offset by 32.
    #[default]
    X11,
    /// `CSI < b ; x ; y M|m` (?1006)
    Sgr,
    /// `CSI < b ; x ; y M|m` with pixel coordinates (?1016); a grid-driven
    /// core reports cell coordinates.
    SgrPixels,
    /// `CSI b ; x ; y M` (?1015)
    Urxvt,
}

impl MouseEncoding {
    #[must_use]
    pub const fn is_sgr(&self) -> bool {
        matches!(self, Self::Sgr | Self::SgrPixels)
    }
}

/// Which grid events the host asked to hear about.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub enum MouseTrack {
    #[default]
    NoTracking,
    /// ?9: presses only, no modifiers, no release.
    X10,
    /// ?1000: presses and releases.
    Normal,
    /// ?1002: presses, releases, and motion while a button is held.
    ButtonEvent,
    /// ?1003: everything, including bare motion.
    AnyEvent,
}

impl MouseModeNumber for MouseTrack {
    fn mouse_mode_number(&self) -> usize {
        match self {
            Self::NoTracking => 0,
            Self::X10 => 9,
            Self::Normal => 1000,
            Self::ButtonEvent => 1002,
            Self::AnyEvent => 1003,
        }
    }
}

impl ReportMode for MouseTrack {
    fn report(&self, override_mode: Option<SetMode>) -> String {
        let mode_number = self.mouse_mode_number();

        let state = match override_mode {
            Some(SetMode::DecSet) => 1,
            Some(SetMode::DecRst) => 2,
            None => {
                if *self == Self::NoTracking {
                    2
                } else {
                    1
                }
            }
        };
        format!("\x1b[?{mode_number};{state}$y")
    }
}

impl fmt::Display for MouseTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTracking => write!(f, "No Mouse Tracking"),
            Self::X10 => write!(f, "X10 Mouse Tracking (?9)"),
            Self::Normal => write!(f, "Normal Mouse Tracking (?1000)"),
            Self::ButtonEvent => write!(f, "Button-Event Mouse Tracking (?1002)"),
            Self::AnyEvent => write!(f, "Any-Event Mouse Tracking (?1003)"),
        }
    }
}

impl fmt::Display for MouseEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X11 => write!(f, "X11 Mouse Encoding"),
            Self::Sgr => write!(f, "SGR Mouse Encoding (?1006)"),
            Self::SgrPixels => write!(f, "SGR-Pixels Mouse Encoding (?1016)"),
            Self::Urxvt => write!(f, "URXVT Mouse Encoding (?1015)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_numbers() {
        assert_eq!(MouseTrack::X10.mouse_mode_number(), 9);
        assert_eq!(MouseTrack::Normal.mouse_mode_number(), 1000);
        assert_eq!(MouseTrack::ButtonEvent.mouse_mode_number(), 1002);
        assert_eq!(MouseTrack::AnyEvent.mouse_mode_number(), 1003);
    }

    #[test]
    fn report_reflects_current_state() {
        assert_eq!(MouseTrack::Normal.report(None), "\x1b[?1000;1$y");
        assert_eq!(MouseTrack::NoTracking.report(None), "\x1b[?0;2$y");
    }
}
