// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the Blufio routing layer.
//!
//! This crate provides the error type and the small value types shared by
//! `blufio-config` and `blufio-router`.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BlufioError;
pub use types::{ModelRef, SessionId, DEFAULT_PROVIDER};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blufio_error_variants_render() {
        let config = BlufioError::Config("bad bias".into());
        assert_eq!(config.to_string(), "configuration error: bad bias");

        let analytics = BlufioError::analytics("/tmp/a.jsonl", std::io::Error::other("disk full"));
        let msg = analytics.to_string();
        assert!(msg.contains("/tmp/a.jsonl"));
        assert!(msg.contains("disk full"));

        let internal = BlufioError::Internal("oops".into());
        assert_eq!(internal.to_string(), "internal error: oops");
    }

    #[test]
    fn model_ref_serialization() {
        let m = ModelRef::new("ollama", "qwen2.5:7b");
        let json = serde_json::to_string(&m).expect("should serialize");
        let parsed: ModelRef = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(m, parsed);
    }

    #[test]
    fn session_id_display() {
        let sid = SessionId("session-1".into());
        assert_eq!(sid.to_string(), "session-1");
        assert_eq!(sid.clone(), sid);
    }
}
