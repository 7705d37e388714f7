// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tiered model routing.
//!
//! Orchestrates model selection: session override > explicit request in the
//! message > classify > bias > budget clamp. The chosen tier then drives model
//! resolution and prompt adaptation, and every decision is reported to the
//! analytics sink when one is attached.

use std::collections::BTreeMap;
use std::sync::Arc;

use blufio_config::model::{BlufioConfig, RoutingConfig};
use blufio_core::{ModelRef, SessionId};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analytics::{AnalyticsEvent, AnalyticsEventKind, AnalyticsLogger};
use crate::classifier::{classify, ClassificationResult, IntentComplexity};
use crate::policy::{apply_bias, apply_budget, BudgetClamp, CurrentSpend, RoutingBudget};
use crate::prompt::{adapt, AdaptedPrompt};
use crate::tier::{default_model_for, minimum_tier, ModelTier};

/// Reason recorded when a session pins its model.
pub const SESSION_OVERRIDE_REASON: &str = "session model override";

/// Reason recorded when the message itself asks for a model.
pub const EXPLICIT_REQUEST_REASON: &str = "explicit model request in message";

/// Tier used for prompt adaptation when routing is bypassed.
pub const BYPASS_TIER: ModelTier = ModelTier::T3;

/// Last-resort model when nothing else resolves.
pub fn fallback_model() -> ModelRef {
    ModelRef::new("anthropic", "claude-sonnet-4-5")
}

/// Inputs for one routing call.
#[derive(Debug, Clone, Default)]
pub struct RouteRequest<'a> {
    pub message: &'a str,
    pub system_prompt: &'a str,
    pub session_override: Option<ModelRef>,
    pub current_spend: Option<CurrentSpend>,
    pub session_id: Option<&'a str>,
    pub channel: Option<&'a str>,
}

impl<'a> RouteRequest<'a> {
    pub fn new(message: &'a str, system_prompt: &'a str) -> Self {
        Self {
            message,
            system_prompt,
            ..Default::default()
        }
    }

    pub fn with_session_override(mut self, model: Option<ModelRef>) -> Self {
        self.session_override = model;
        self
    }

    pub fn with_spend(mut self, spend: CurrentSpend) -> Self {
        self.current_spend = Some(spend);
        self
    }

    pub fn with_session(mut self, session_id: &'a str) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_channel(mut self, channel: &'a str) -> Self {
        self.channel = Some(channel);
        self
    }
}

/// Request details carried on the decision for later analytics events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecisionContext {
    /// Message length in characters.
    pub message_length: usize,
    pub session_id: Option<SessionId>,
    pub channel: Option<String>,
}

/// Outcome of routing one message.
///
/// When `bypassed` is true, `tier == original_tier` and `bypass_reason` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub model: ModelRef,
    /// Tier actually used, after bias and budget.
    pub tier: ModelTier,
    /// Minimum tier for the classified intent, or the bypass tier.
    pub original_tier: ModelTier,
    pub classification: ClassificationResult,
    pub adapted_prompt: AdaptedPrompt,
    pub bypassed: bool,
    pub bypass_reason: Option<String>,
    /// Budget rule that lowered the tier, if any.
    pub budget_clamp: Option<BudgetClamp>,
    pub context: DecisionContext,
}

impl RoutingDecision {
    /// Whether a budget rule pushed the tier below the (biased) choice.
    pub fn downgraded(&self) -> bool {
        self.budget_clamp.is_some()
    }
}

/// Selects a tier and concrete model for each message.
#[derive(Debug, Clone)]
pub struct ModelRouter {
    config: RoutingConfig,
    default_model: Option<ModelRef>,
    base_urls: BTreeMap<String, String>,
    analytics: Option<Arc<AnalyticsLogger>>,
}

impl ModelRouter {
    /// Create a router with no global default model and no analytics.
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            config,
            default_model: None,
            base_urls: BTreeMap::new(),
            analytics: None,
        }
    }

    /// Create a router from the full configuration (routing, default model, endpoints).
    pub fn from_config(config: &BlufioConfig) -> Self {
        Self::new(config.routing.clone())
            .with_default_model(&config.providers.default_model)
            .with_base_urls(config.providers.base_urls.clone())
    }

    /// Set the caller's global default model. A malformed string is ignored.
    pub fn with_default_model(mut self, model: &str) -> Self {
        self.default_model = ModelRef::parse(model);
        if self.default_model.is_none() {
            warn!(model, "ignoring malformed default model");
        }
        self
    }

    pub fn with_base_urls(mut self, base_urls: BTreeMap<String, String>) -> Self {
        self.base_urls = base_urls;
        self
    }

    pub fn with_analytics(mut self, logger: Arc<AnalyticsLogger>) -> Self {
        self.analytics = Some(logger);
        self
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Route a message to a tier and model.
    ///
    /// Deterministic for identical requests; the only side effect is the
    /// analytics event.
    pub fn route(&self, request: &RouteRequest<'_>) -> RoutingDecision {
        let classification = classify(request.message);
        let context = DecisionContext {
            message_length: request.message.chars().count(),
            session_id: request.session_id.map(|id| SessionId(id.to_string())),
            channel: request.channel.map(str::to_string),
        };

        // 1. Session override
        if let Some(model) = &request.session_override {
            let decision = self.bypass(
                model.clone(),
                SESSION_OVERRIDE_REASON,
                classification,
                request.system_prompt,
                context,
            );
            return self.finish(decision);
        }

        // 2. Explicit model request in the message
        if classification.intent == IntentComplexity::Explicit {
            let model = self.resolve_model(BYPASS_TIER);
            let decision = self.bypass(
                model,
                EXPLICIT_REQUEST_REASON,
                classification,
                request.system_prompt,
                context,
            );
            return self.finish(decision);
        }

        // 3-5. Minimum tier, bias, budget
        let original_tier = minimum_tier(classification.intent);
        let biased = apply_bias(original_tier, self.config.bias);
        let budget =
            RoutingBudget::from_config(&self.config.budget).with_spend(request.current_spend);
        let (tier, budget_clamp) = apply_budget(biased, &budget);

        if let Some(rule) = budget_clamp {
            info!(
                intended = %biased,
                actual = %tier,
                rule = %rule,
                "budget-aware tier downgrade"
            );
        }

        // 6-7. Model and prompt for the final tier
        let decision = RoutingDecision {
            model: self.resolve_model(tier),
            tier,
            original_tier,
            classification,
            adapted_prompt: adapt(request.system_prompt, tier),
            bypassed: false,
            bypass_reason: None,
            budget_clamp,
            context,
        };
        self.finish(decision)
    }

    fn bypass(
        &self,
        model: ModelRef,
        reason: &str,
        classification: ClassificationResult,
        system_prompt: &str,
        context: DecisionContext,
    ) -> RoutingDecision {
        RoutingDecision {
            model,
            tier: BYPASS_TIER,
            original_tier: BYPASS_TIER,
            classification,
            adapted_prompt: adapt(system_prompt, BYPASS_TIER),
            bypassed: true,
            bypass_reason: Some(reason.to_string()),
            budget_clamp: None,
            context,
        }
    }

    // 8-9. Analytics, then hand the decision back.
    fn finish(&self, decision: RoutingDecision) -> RoutingDecision {
        let kind = if decision.bypassed {
            AnalyticsEventKind::Override
        } else if decision.tier != decision.original_tier {
            AnalyticsEventKind::BudgetDowngrade
        } else {
            AnalyticsEventKind::Route
        };

        debug!(
            intent = %decision.classification.intent,
            confidence = decision.classification.confidence,
            tier = %decision.tier,
            original_tier = %decision.original_tier,
            model = %decision.model,
            bypassed = decision.bypassed,
            reason = decision
                .bypass_reason
                .as_deref()
                .unwrap_or(decision.classification.reason),
            "routing decision"
        );

        self.emit(kind, &decision, |event| event);
        decision
    }

    /// Resolve the model for a tier.
    ///
    /// Tier override from config, then the built-in default for the tier,
    /// then the global default, then [`fallback_model`]. Malformed overrides
    /// are skipped with a warning.
    pub fn resolve_model(&self, tier: ModelTier) -> ModelRef {
        if let Some(raw) = self.config.tiers.for_index(tier.index()) {
            match ModelRef::parse(raw) {
                Some(model) => return model,
                None => warn!(
                    tier = %tier,
                    value = raw,
                    "ignoring malformed tier model override"
                ),
            }
        }

        default_model_for(tier)
            .or_else(|| self.default_model.clone())
            .unwrap_or_else(fallback_model)
    }

    /// Base URL configured for a provider, if any.
    pub fn endpoint_for(&self, provider: &str) -> Option<&str> {
        self.base_urls.get(provider).map(String::as_str)
    }

    /// Report a finished model call. Telemetry only.
    pub fn record_completion(
        &self,
        decision: &RoutingDecision,
        latency_ms: u64,
        response_size: usize,
    ) {
        self.emit(AnalyticsEventKind::Complete, decision, |event| {
            event.with_completion(latency_ms, response_size)
        });
    }

    /// Report that the host fell back to `fallback` after the routed call failed.
    pub fn record_fallback(&self, decision: &RoutingDecision, fallback: &ModelRef) {
        let endpoint = self.endpoint_for(&fallback.provider).map(str::to_string);
        self.emit(AnalyticsEventKind::Fallback, decision, |mut event| {
            event.provider = fallback.provider.clone();
            event.model = fallback.model.clone();
            event.endpoint = endpoint;
            event
        });
    }

    fn emit(
        &self,
        kind: AnalyticsEventKind,
        decision: &RoutingDecision,
        finish: impl FnOnce(AnalyticsEvent) -> AnalyticsEvent,
    ) {
        let Some(logger) = &self.analytics else {
            return;
        };
        let endpoint = self.endpoint_for(&decision.model.provider);
        logger.record(finish(AnalyticsEvent::from_decision(kind, decision, endpoint)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const PROMPT: &str = "# Coach\n\nYou coach.\n\n## Tools\n\nweb_search\n";

    fn router_with(config: RoutingConfig) -> ModelRouter {
        ModelRouter::new(config).with_default_model("anthropic/claude-sonnet-4-5")
    }

    fn route(router: &ModelRouter, message: &str) -> RoutingDecision {
        router.route(&RouteRequest::new(message, PROMPT))
    }

    #[test]
    fn trivial_message_routes_to_t0() {
        let d = route(&router_with(RoutingConfig::default()), "hi");
        assert_eq!(d.classification.intent, IntentComplexity::Trivial);
        assert_eq!(d.tier, ModelTier::T0);
        assert!(!d.bypassed);
        assert!(d.adapted_prompt.system_prompt.is_none());
    }

    #[test]
    fn session_override_bypasses_classification() {
        let router = router_with(RoutingConfig::default());
        let pinned = ModelRef::new("openrouter", "meta-llama/llama-3.1-8b");
        let d = router.route(
            &RouteRequest::new("design a distributed cache from scratch", PROMPT)
                .with_session_override(Some(pinned.clone())),
        );
        assert!(d.bypassed);
        assert_eq!(d.bypass_reason.as_deref(), Some(SESSION_OVERRIDE_REASON));
        assert_eq!(d.model, pinned);
        assert_eq!(d.tier, ModelTier::T3);
        assert_eq!(d.original_tier, d.tier);
        assert_eq!(d.classification.intent, IntentComplexity::Flagship);
        assert_eq!(d.adapted_prompt.system_prompt.as_deref(), Some(PROMPT));
    }

    #[test]
    fn explicit_request_resolves_t3_model() {
        let d = route(&router_with(RoutingConfig::default()), "/model opus");
        assert!(d.bypassed);
        assert_eq!(d.bypass_reason.as_deref(), Some(EXPLICIT_REQUEST_REASON));
        assert_eq!(d.model, default_model_for(ModelTier::T3).unwrap());
        assert_eq!(d.original_tier, ModelTier::T3);
    }

    #[test]
    fn bypass_ignores_budget() {
        let mut config = RoutingConfig::default();
        config.budget.prefer_free = true;
        let d = route(&router_with(config), "/model opus");
        assert_eq!(d.tier, ModelTier::T3);
        assert!(d.budget_clamp.is_none());
    }

    #[test]
    fn tier_override_wins_over_builtin() {
        let mut config = RoutingConfig::default();
        config.tiers.t1 = Some("ollama/qwen2.5:7b".into());
        let router = router_with(config);
        assert_eq!(
            router.resolve_model(ModelTier::T1),
            ModelRef::new("ollama", "qwen2.5:7b")
        );
        assert_eq!(
            router.resolve_model(ModelTier::T2),
            default_model_for(ModelTier::T2).unwrap()
        );
    }

    #[test]
    #[traced_test]
    fn malformed_override_falls_through() {
        let mut config = RoutingConfig::default();
        config.tiers.t2 = Some("ollama/".into());
        let router = router_with(config);
        assert_eq!(
            router.resolve_model(ModelTier::T2),
            default_model_for(ModelTier::T2).unwrap()
        );
        assert!(logs_contain("ignoring malformed tier model override"));
    }

    #[test]
    fn t0_resolves_to_global_default_then_fallback() {
        let router = router_with(RoutingConfig::default());
        assert_eq!(
            router.resolve_model(ModelTier::T0),
            ModelRef::new("anthropic", "claude-sonnet-4-5")
        );

        let bare = ModelRouter::new(RoutingConfig::default()).with_default_model("ollama/");
        assert_eq!(bare.resolve_model(ModelTier::T0), fallback_model());
    }

    #[test]
    #[traced_test]
    fn budget_downgrade_is_logged() {
        let mut config = RoutingConfig::default();
        config.budget.daily_cap_usd = Some(1.0);
        let router = router_with(config);
        let d = router.route(
            &RouteRequest::new("can you refactor and optimize this module?", PROMPT).with_spend(
                CurrentSpend {
                    daily_usd: Some(1.5),
                    monthly_usd: None,
                },
            ),
        );
        assert_eq!(d.original_tier, ModelTier::T3);
        assert_eq!(d.tier, ModelTier::T1);
        assert_eq!(d.budget_clamp, Some(BudgetClamp::DailyCapReached));
        assert!(d.downgraded());
        assert!(logs_contain("budget-aware tier downgrade"));
    }

    #[test]
    fn quality_bias_without_clamp_still_reports_tiers() {
        let mut config = RoutingConfig::default();
        config.bias = blufio_config::RoutingBias::Quality;
        let d = route(&router_with(config), "hi");
        assert_eq!(d.original_tier, ModelTier::T0);
        assert_eq!(d.tier, ModelTier::T1);
        assert!(!d.downgraded());
    }

    #[test]
    fn endpoint_lookup() {
        let mut urls = BTreeMap::new();
        urls.insert("ollama".to_string(), "http://localhost:11434".to_string());
        let router = router_with(RoutingConfig::default()).with_base_urls(urls);
        assert_eq!(router.endpoint_for("ollama"), Some("http://localhost:11434"));
        assert_eq!(router.endpoint_for("anthropic"), None);
    }

    #[test]
    fn routing_is_deterministic() {
        let router = router_with(RoutingConfig::default());
        let a = route(&router, "what is gradient descent?");
        let b = route(&router, "what is gradient descent?");
        assert_eq!(a, b);
    }

    #[test]
    fn context_carries_session_and_length() {
        let router = router_with(RoutingConfig::default());
        let d = router.route(
            &RouteRequest::new("héllo there friend", PROMPT)
                .with_session("s-42")
                .with_channel("telegram"),
        );
        assert_eq!(d.context.message_length, 18);
        assert_eq!(d.context.session_id, Some(SessionId("s-42".into())));
        assert_eq!(d.context.channel.as_deref(), Some("telegram"));
    }
}
