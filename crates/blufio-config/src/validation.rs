// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-negative budget caps and well-formed provider URLs.
//!
//! Tier override strings are intentionally not validated here: a malformed
//! override is treated as unset at routing time rather than refusing to start.

use crate::diagnostic::ConfigError;
use crate::model::BlufioConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &BlufioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.providers.default_model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "providers.default_model must not be empty".to_string(),
        });
    }

    for (provider, url) in &config.providers.base_urls {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "providers.base_urls.{provider} must be an http(s) URL, got `{url}`"
                ),
            });
        }
    }

    let budget = &config.routing.budget;
    for (key, cap) in [
        ("daily_cap_usd", budget.daily_cap_usd),
        ("monthly_cap_usd", budget.monthly_cap_usd),
    ] {
        if let Some(cap) = cap
            && !(cap.is_finite() && cap >= 0.0)
        {
            errors.push(ConfigError::Validation {
                message: format!("routing.budget.{key} must be a non-negative number, got {cap}"),
            });
        }
    }

    if let Some(path) = &config.routing.analytics.path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "routing.analytics.path must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = BlufioConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn negative_daily_cap_fails_validation() {
        let mut config = BlufioConfig::default();
        config.routing.budget.daily_cap_usd = Some(-5.0);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "daily_cap_usd"));
    }

    #[test]
    fn nan_monthly_cap_fails_validation() {
        let mut config = BlufioConfig::default();
        config.routing.budget.monthly_cap_usd = Some(f64::NAN);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "monthly_cap_usd"));
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let mut config = BlufioConfig::default();
        config
            .providers
            .base_urls
            .insert("ollama".into(), "localhost:11434".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "providers.base_urls.ollama"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = BlufioConfig::default();
        config.providers.default_model = " ".into();
        config.routing.analytics.path = Some(String::new());
        config.routing.budget.daily_cap_usd = Some(-1.0);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn malformed_tier_override_is_not_an_error() {
        let mut config = BlufioConfig::default();
        config.routing.tiers.t2 = Some("ollama/".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = BlufioConfig::default();
        config.routing.enabled = true;
        config.routing.budget.daily_cap_usd = Some(1.0);
        config.routing.budget.monthly_cap_usd = Some(20.0);
        config
            .providers
            .base_urls
            .insert("ollama".into(), "http://localhost:11434".into());
        assert!(validate_config(&config).is_ok());
    }
}
