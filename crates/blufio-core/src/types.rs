// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the configuration and routing crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BlufioError;

/// Provider assumed when a model string carries no `provider/` prefix.
pub const DEFAULT_PROVIDER: &str = "anthropic";

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A concrete backend model, resolved outside the routing core.
///
/// Both halves are opaque strings. The model identifier may itself contain
/// `/` (e.g. `openrouter/meta-llama/llama-3.1-8b`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRef {
    pub provider: String,
    pub model: String,
}

impl ModelRef {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Parse a `provider/model` reference, splitting on the first `/` only.
    ///
    /// A string without a separator is a bare model id on [`DEFAULT_PROVIDER`].
    /// Returns `None` for blank input or an empty provider/model half; callers
    /// treat that the same as "not configured".
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        match s.split_once('/') {
            Some((provider, model)) => {
                let provider = provider.trim();
                let model = model.trim();
                if provider.is_empty() || model.is_empty() {
                    None
                } else {
                    Some(Self::new(provider, model))
                }
            }
            None => Some(Self::new(DEFAULT_PROVIDER, s)),
        }
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

impl FromStr for ModelRef {
    type Err = BlufioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            BlufioError::Config(format!("malformed model reference `{s}`, expected provider/model"))
        })
    }
}
