// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Decode failures inside individual escape-sequence handlers.
///
/// These never escape the dispatch boundary: a failing sequence is logged
/// with its byte trace and dropped, per the fuzz contract.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum ParserFailures {
    #[error("Invalid cursor position (CUP) sequence: {0}")]
    UnhandledCUPCommand(String),
    #[error("Invalid cursor movement sequence: {0}")]
    UnhandledCursorMoveCommand(String),
    #[error("Invalid cursor column (CHA/HPA) sequence: {0}")]
    UnhandledCHACommand(String),
    #[error("Invalid cursor row (VPA) sequence: {0}")]
    UnhandledVPACommand(String),
    #[error("Invalid erase display (ED) sequence: {0}")]
    UnhandledEDCommand(String),
    #[error("Invalid erase line (EL) sequence: {0}")]
    UnhandledELCommand(String),
    #[error("Invalid erase character (ECH) sequence: {0}")]
    UnhandledECHCommand(String),
    #[error("Invalid insert character (ICH) sequence: {0}")]
    UnhandledICHCommand(String),
    #[error("Invalid delete character (DCH) sequence: {0}")]
    UnhandledDCHCommand(String),
    #[error("Invalid insert line (IL) sequence: {0}")]
    UnhandledILCommand(String),
    #[error("Invalid delete line (DL) sequence: {0}")]
    UnhandledDLCommand(String),
    #[error("Invalid scroll (SU/SD) sequence: {0}")]
    UnhandledScrollCommand(String),
    #[error("Invalid tab control sequence: {0}")]
    UnhandledTabCommand(String),
    #[error("Invalid SGR sequence: {0}")]
    UnhandledSGRCommand(String),
    #[error("Invalid set margins (DECSTBM) sequence: {0}")]
    UnhandledDECSTBMCommand(String),
    #[error("Invalid cursor style (DECSCUSR) sequence: {0}")]
    UnhandledDECSCUSRCommand(String),
    #[error("Invalid mode report request (DECRQM) sequence: {0}")]
    UnhandledDECRQMCommand(String),
    #[error("Invalid device attributes (DA) sequence: {0}")]
    UnhandledDACommand(String),
    #[error("Invalid device status report (DSR) sequence: {0}")]
    UnhandledDSRCommand(String),
}
