// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Blufio model routing.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Blufio configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BlufioConfig {
    /// Agent identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Global default model and provider endpoints.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Tiered model routing settings.
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a markdown file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Root directory for agent state (analytics logs and the like).
    /// Falls back to the platform state directory when unset.
    #[serde(default)]
    pub state_dir: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
            state_dir: None,
        }
    }
}

impl AgentConfig {
    /// Resolve the state directory root.
    ///
    /// Order: `state_dir` setting, platform state dir, platform local data dir,
    /// then `./.blufio`.
    pub fn resolved_state_dir(&self) -> PathBuf {
        if let Some(dir) = self.state_dir.as_deref().filter(|d| !d.trim().is_empty()) {
            return PathBuf::from(dir);
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|p| p.join("blufio"))
            .unwrap_or_else(|| PathBuf::from(".blufio"))
    }
}

fn default_agent_name() -> String {
    "blufio".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Provider-level settings shared by every routed call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Global default model as `provider/model`. Used when routing is disabled
    /// and as a late fallback when a tier has no model.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Base URL per provider name (e.g. `ollama = "http://localhost:11434"`).
    #[serde(default)]
    pub base_urls: BTreeMap<String, String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            base_urls: BTreeMap::new(),
        }
    }
}

fn default_model() -> String {
    "anthropic/claude-sonnet-4-5".to_string()
}

/// Preference nudging tier selection toward cost or quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingBias {
    /// Drop one tier when above T1.
    Cost,
    /// Use the classifier's minimum tier as-is.
    #[default]
    Balanced,
    /// Raise one tier when below T4.
    Quality,
}

impl std::fmt::Display for RoutingBias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingBias::Cost => write!(f, "cost"),
            RoutingBias::Balanced => write!(f, "balanced"),
            RoutingBias::Quality => write!(f, "quality"),
        }
    }
}

/// Tiered model routing configuration.
///
/// When enabled, each inbound message is classified and sent to the cheapest
/// capability tier that can handle it, with the system prompt rewritten to
/// suit that tier.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Enable tiered routing. When false, `providers.default_model` handles every message.
    #[serde(default)]
    pub enabled: bool,

    /// Cost/quality bias applied after classification.
    #[serde(default)]
    pub bias: RoutingBias,

    /// Per-tier model overrides.
    #[serde(default)]
    pub tiers: TierModelsConfig,

    /// Spend caps that clamp routing to the free tiers.
    #[serde(default)]
    pub budget: RoutingBudgetConfig,

    /// Routing analytics sink.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Per-tier model override strings in `provider/model` form.
///
/// T0 has no entry: it never invokes a model. A malformed string is
/// treated as unset and routing falls through to the built-in default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierModelsConfig {
    #[serde(default)]
    pub t1: Option<String>,
    #[serde(default)]
    pub t2: Option<String>,
    #[serde(default)]
    pub t3: Option<String>,
    #[serde(default)]
    pub t4: Option<String>,
}

impl TierModelsConfig {
    /// Override string for a tier index (0..=4). T0 and out-of-range indices have none.
    pub fn for_index(&self, index: usize) -> Option<&str> {
        match index {
            1 => self.t1.as_deref(),
            2 => self.t2.as_deref(),
            3 => self.t3.as_deref(),
            4 => self.t4.as_deref(),
            _ => None,
        }
    }
}

/// Routing budget caps.
///
/// Spend totals are not tracked here; the caller passes the current daily and
/// monthly spend with each routing request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingBudgetConfig {
    /// Daily spend cap in USD. `None` disables the daily check.
    #[serde(default)]
    pub daily_cap_usd: Option<f64>,

    /// Monthly spend cap in USD. `None` disables the monthly check.
    #[serde(default)]
    pub monthly_cap_usd: Option<f64>,

    /// Always clamp to the free tiers (T0/T1).
    #[serde(default)]
    pub prefer_free: bool,
}

/// Routing analytics sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Write routing events to a JSONL file.
    #[serde(default = "default_analytics_enabled")]
    pub enabled: bool,

    /// Output path. Defaults to `<state_dir>/routing/analytics.jsonl`.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_analytics_enabled(),
            path: None,
        }
    }
}

fn default_analytics_enabled() -> bool {
    true
}

impl BlufioConfig {
    /// Effective analytics output path, resolving the default under the state dir.
    pub fn analytics_path(&self) -> PathBuf {
        match self.routing.analytics.path.as_deref() {
            Some(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => self
                .agent
                .resolved_state_dir()
                .join("routing")
                .join("analytics.jsonl"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_override_lookup_by_index() {
        let tiers = TierModelsConfig {
            t1: Some("ollama/qwen2.5:7b".into()),
            t4: Some("anthropic/claude-opus-4-1".into()),
            ..TierModelsConfig::default()
        };
        assert_eq!(tiers.for_index(0), None);
        assert_eq!(tiers.for_index(1), Some("ollama/qwen2.5:7b"));
        assert_eq!(tiers.for_index(2), None);
        assert_eq!(tiers.for_index(4), Some("anthropic/claude-opus-4-1"));
        assert_eq!(tiers.for_index(9), None);
    }

    #[test]
    fn analytics_path_defaults_under_state_dir() {
        let mut config = BlufioConfig::default();
        config.agent.state_dir = Some("/var/lib/blufio".into());
        assert_eq!(
            config.analytics_path(),
            PathBuf::from("/var/lib/blufio/routing/analytics.jsonl")
        );

        config.routing.analytics.path = Some("/tmp/routing.jsonl".into());
        assert_eq!(config.analytics_path(), PathBuf::from("/tmp/routing.jsonl"));
    }

    #[test]
    fn blank_state_dir_is_ignored() {
        let agent = AgentConfig {
            state_dir: Some("  ".into()),
            ..AgentConfig::default()
        };
        assert_ne!(agent.resolved_state_dir(), PathBuf::from("  "));
    }

    #[test]
    fn bias_display_matches_serde() {
        for bias in [RoutingBias::Cost, RoutingBias::Balanced, RoutingBias::Quality] {
            let json = serde_json::to_string(&bias).unwrap();
            assert_eq!(json, format!("\"{bias}\""));
        }
    }
}
