// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Blufio routing configuration.

use blufio_config::diagnostic::ConfigError;
use blufio_config::model::{BlufioConfig, RoutingBias};
use blufio_config::{load_and_validate_str, load_config_from_path, load_config_from_str};
use serial_test::serial;

/// Valid TOML with every routing field deserializes successfully.
#[test]
fn valid_toml_deserializes_into_blufio_config() {
    let toml = r#"
[agent]
name = "coach"
log_level = "debug"
state_dir = "/var/lib/blufio"

[providers]
default_model = "anthropic/claude-sonnet-4-5"

[providers.base_urls]
ollama = "http://localhost:11434"

[routing]
enabled = true
bias = "quality"

[routing.tiers]
t1 = "ollama/qwen2.5:7b"
t4 = "anthropic/claude-opus-4-1"

[routing.budget]
daily_cap_usd = 1.0
monthly_cap_usd = 30.0
prefer_free = true

[routing.analytics]
enabled = false
path = "/tmp/routing.jsonl"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "coach");
    assert_eq!(config.agent.state_dir.as_deref(), Some("/var/lib/blufio"));
    assert_eq!(
        config.providers.base_urls.get("ollama").map(String::as_str),
        Some("http://localhost:11434")
    );
    assert!(config.routing.enabled);
    assert_eq!(config.routing.bias, RoutingBias::Quality);
    assert_eq!(config.routing.tiers.t1.as_deref(), Some("ollama/qwen2.5:7b"));
    assert!(config.routing.tiers.t2.is_none());
    assert_eq!(config.routing.budget.daily_cap_usd, Some(1.0));
    assert_eq!(config.routing.budget.monthly_cap_usd, Some(30.0));
    assert!(config.routing.budget.prefer_free);
    assert!(!config.routing.analytics.enabled);
    assert_eq!(config.routing.analytics.path.as_deref(), Some("/tmp/routing.jsonl"));
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "blufio");
    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.providers.default_model, "anthropic/claude-sonnet-4-5");
    assert!(config.providers.base_urls.is_empty());
    assert!(!config.routing.enabled, "routing is opt-in");
    assert_eq!(config.routing.bias, RoutingBias::Balanced);
    assert!(config.routing.budget.daily_cap_usd.is_none());
    assert!(!config.routing.budget.prefer_free);
    assert!(config.routing.analytics.enabled);
    assert!(config.routing.analytics.path.is_none());
}

/// Unknown key in a nested routing table is rejected.
#[test]
fn unknown_field_in_routing_budget_produces_error() {
    let toml = r#"
[routing.budget]
daily_cap = 5.0
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("daily_cap"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// A misspelled bias surfaces as an UnknownVariant diagnostic with a suggestion.
#[test]
fn misspelled_bias_suggests_correction() {
    let toml = r#"
[routing]
bias = "qualty"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject bad bias");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownVariant { suggestion: Some(s), .. } if s == "quality"
    )));
}

/// Unknown key diagnostics carry a fuzzy suggestion.
#[test]
fn unknown_key_diagnostic_has_suggestion() {
    let toml = r#"
[routing]
enabeld = true
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject typo");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "enabled"
    )));
}

/// Semantic validation runs after a successful parse.
#[test]
fn negative_cap_fails_validation() {
    let toml = r#"
[routing.budget]
monthly_cap_usd = -3.0
"#;

    let errors = load_and_validate_str(toml).expect_err("negative cap");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { message } if message.contains("monthly_cap_usd")
    )));
}

/// Dotted overrides land on nested routing keys.
#[test]
fn dotted_override_sets_nested_routing_key() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let toml_content = r#"
[routing]
bias = "cost"
"#;

    let config: BlufioConfig = Figment::new()
        .merge(Serialized::defaults(BlufioConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("routing.budget.prefer_free", true))
        .merge(("routing.tiers.t1", "ollama/qwen2.5:7b"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.routing.bias, RoutingBias::Cost);
    assert!(config.routing.budget.prefer_free);
    assert_eq!(config.routing.tiers.t1.as_deref(), Some("ollama/qwen2.5:7b"));
}

/// `BLUFIO_ROUTING_BUDGET_DAILY_CAP_USD` overrides the file value.
#[test]
#[serial]
fn env_var_overrides_nested_budget_cap() {
    let dir = std::env::temp_dir().join(format!("blufio-config-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("blufio.toml");
    std::fs::write(&path, "[routing.budget]\ndaily_cap_usd = 1.0\n").unwrap();

    // SAFETY: env mutation is confined to #[serial] tests.
    unsafe { std::env::set_var("BLUFIO_ROUTING_BUDGET_DAILY_CAP_USD", "7.5") };
    let result = load_config_from_path(&path);
    unsafe { std::env::remove_var("BLUFIO_ROUTING_BUDGET_DAILY_CAP_USD") };
    let _ = std::fs::remove_dir_all(&dir);

    let config = result.expect("env override should parse");
    assert_eq!(config.routing.budget.daily_cap_usd, Some(7.5));
}
