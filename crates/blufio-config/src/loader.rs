// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./blufio.toml` > `~/.config/blufio/blufio.toml` > `/etc/blufio/blufio.toml`
//! with environment variable overrides via `BLUFIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::BlufioConfig;

/// Env key prefixes and the dotted section path they map to.
///
/// Nested sections come before their parent so the longest prefix wins:
/// `BLUFIO_ROUTING_BUDGET_DAILY_CAP_USD` must land on
/// `routing.budget.daily_cap_usd`, not `routing.budget_daily_cap_usd`.
const SECTION_PREFIXES: &[(&str, &str)] = &[
    ("routing_budget_", "routing.budget."),
    ("routing_analytics_", "routing.analytics."),
    ("routing_tiers_", "routing.tiers."),
    ("routing_", "routing."),
    ("providers_", "providers."),
    ("agent_", "agent."),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/blufio/blufio.toml` (system-wide)
/// 3. `~/.config/blufio/blufio.toml` (user XDG config)
/// 4. `./blufio.toml` (local directory)
/// 5. `BLUFIO_*` environment variables
pub fn load_config() -> Result<BlufioConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<BlufioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BlufioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BlufioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BlufioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config file locations in merge order, lowest precedence first.
///
/// The user config is omitted when the platform has no config dir.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/blufio/blufio.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("blufio/blufio.toml"));
    }
    paths.push(PathBuf::from("blufio.toml"));
    paths
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    config_file_paths()
        .iter()
        .fold(
            Figment::new().merge(Serialized::defaults(BlufioConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Map a prefix-stripped env key to its dotted config path.
///
/// Figment hands `map()` the key in its original case, so matching is done
/// on the lowercased key. Keys with no known section prefix are returned
/// lowercased and will be rejected by `deny_unknown_fields`.
pub fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for (prefix, section) in SECTION_PREFIXES {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{section}{rest}");
        }
    }
    key
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` because key names contain
/// underscores: `BLUFIO_ROUTING_BUDGET_PREFER_FREE` must map to
/// `routing.budget.prefer_free`, not `routing.budget.prefer.free`.
fn env_provider() -> Env {
    Env::prefixed("BLUFIO_").map(|key| map_env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_routing_sections_map_by_longest_prefix() {
        assert_eq!(
            map_env_key("routing_budget_daily_cap_usd"),
            "routing.budget.daily_cap_usd"
        );
        assert_eq!(
            map_env_key("routing_analytics_enabled"),
            "routing.analytics.enabled"
        );
        assert_eq!(map_env_key("routing_tiers_t1"), "routing.tiers.t1");
        assert_eq!(map_env_key("routing_bias"), "routing.bias");
    }

    #[test]
    fn top_level_sections_map() {
        assert_eq!(map_env_key("agent_state_dir"), "agent.state_dir");
        assert_eq!(
            map_env_key("providers_default_model"),
            "providers.default_model"
        );
    }

    #[test]
    fn uppercase_env_keys_map() {
        assert_eq!(
            map_env_key("ROUTING_BUDGET_PREFER_FREE"),
            "routing.budget.prefer_free"
        );
    }

    #[test]
    fn config_files_merge_local_last() {
        let paths = config_file_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("/etc/blufio/blufio.toml")));
        assert_eq!(paths.last(), Some(&PathBuf::from("blufio.toml")));
    }

    #[test]
    fn unknown_keys_pass_through() {
        assert_eq!(map_env_key("telemetry_level"), "telemetry_level");
    }
}
