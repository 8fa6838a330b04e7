// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Embedder contract violations. These are the only errors the core ever
/// surfaces; malformed host byte streams are swallowed by the parser.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum TerminalError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
}
