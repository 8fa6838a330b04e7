// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use core::fmt;

use crate::mode::SetMode;
use crate::modes::ReportMode;

/// A private mode this terminal does not implement. Kept around so DECRQM
/// can answer "not recognized" and so logs can show the raw request.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct UnknownMode {
    pub params: String,
    pub mode: SetMode,
}

impl UnknownMode {
    #[must_use]
    pub fn new(params: &[u8], mode: SetMode) -> Self {
        Self {
            params: String::from_utf8_lossy(params).to_string(),
            mode,
        }
    }
}

impl ReportMode for UnknownMode {
    fn report(&self, _override_mode: Option<SetMode>) -> String {
        format!("\x1b[{};0$y", self.params)
    }
}

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown Mode ({}) {}", self.params, self.mode)
    }
}
