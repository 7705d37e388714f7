// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Blufio routing core.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for fallible Blufio operations.
///
/// Routing itself never fails; this type covers the edges around it
/// (configuration handoff and the analytics sink).
#[derive(Debug, Error)]
pub enum BlufioError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The analytics sink could not be opened or written.
    #[error("analytics sink error at {}: {source}", path.display())]
    Analytics {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BlufioError {
    /// Wraps an I/O or serialization failure for the given analytics path.
    pub fn analytics(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        BlufioError::Analytics {
            path: path.into(),
            source: source.into(),
        }
    }
}
