// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring between the host agent loop and the router.
//!
//! [`RoutingIntegration`] reads the routing feature flag once at start-up.
//! With routing off, every turn goes to `providers.default_model` with the
//! configured system prompt untouched. With routing on, turns are routed and
//! analytics events go to the logger the host's [`AnalyticsRegistry`] holds
//! for the configured path.

use std::sync::Arc;

use blufio_config::model::BlufioConfig;
use blufio_core::ModelRef;
use tracing::{info, warn};

use crate::analytics::AnalyticsRegistry;
use crate::policy::CurrentSpend;
use crate::router::{fallback_model, ModelRouter, RouteRequest, RoutingDecision};

/// Per-turn inputs from the agent loop.
#[derive(Debug, Clone, Default)]
pub struct TurnContext<'a> {
    pub message: &'a str,
    /// Model pinned for the session, if any.
    pub session_override: Option<ModelRef>,
    pub current_spend: Option<CurrentSpend>,
    pub session_id: Option<&'a str>,
    pub channel: Option<&'a str>,
}

/// What the agent loop should call for a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnPlan {
    /// Routing is enabled and produced a decision.
    Routed(RoutingDecision),
    /// Routing is disabled.
    Direct {
        model: ModelRef,
        system_prompt: String,
    },
}

impl TurnPlan {
    pub fn model(&self) -> &ModelRef {
        match self {
            TurnPlan::Routed(decision) => &decision.model,
            TurnPlan::Direct { model, .. } => model,
        }
    }

    /// `None` when the routed tier needs no model call.
    pub fn system_prompt(&self) -> Option<&str> {
        match self {
            TurnPlan::Routed(decision) => decision.adapted_prompt.system_prompt.as_deref(),
            TurnPlan::Direct { system_prompt, .. } => Some(system_prompt),
        }
    }

    pub fn user_preamble(&self) -> Option<&str> {
        match self {
            TurnPlan::Routed(decision) => decision.adapted_prompt.user_preamble.as_deref(),
            TurnPlan::Direct { .. } => None,
        }
    }

    pub fn decision(&self) -> Option<&RoutingDecision> {
        match self {
            TurnPlan::Routed(decision) => Some(decision),
            TurnPlan::Direct { .. } => None,
        }
    }
}

/// Feature-flag gate and config plumbing around [`ModelRouter`].
#[derive(Debug)]
pub struct RoutingIntegration {
    router: Option<ModelRouter>,
    default_model: ModelRef,
    system_prompt: String,
}

impl RoutingIntegration {
    /// Build from configuration. Analytics loggers come from `registry`, so
    /// the host decides when they are drained.
    pub fn new(config: &BlufioConfig, registry: &Arc<AnalyticsRegistry>) -> Self {
        let default_model =
            ModelRef::parse(&config.providers.default_model).unwrap_or_else(fallback_model);
        let system_prompt = load_system_prompt(config);

        let router = if config.routing.enabled {
            let mut router = ModelRouter::from_config(config);
            if config.routing.analytics.enabled {
                let path = config.analytics_path();
                info!(path = %path.display(), "routing analytics enabled");
                router = router.with_analytics(registry.logger_for(path));
            }
            info!(
                bias = %config.routing.bias,
                prefer_free = config.routing.budget.prefer_free,
                "model routing enabled"
            );
            Some(router)
        } else {
            info!(model = %default_model, "model routing disabled, using default model");
            None
        };

        Self {
            router,
            default_model,
            system_prompt,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.router.is_some()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Decide the model and prompt for one turn.
    pub fn plan_turn(&self, turn: &TurnContext<'_>) -> TurnPlan {
        let Some(router) = &self.router else {
            return TurnPlan::Direct {
                model: turn
                    .session_override
                    .clone()
                    .unwrap_or_else(|| self.default_model.clone()),
                system_prompt: self.system_prompt.clone(),
            };
        };

        let mut request = RouteRequest::new(turn.message, &self.system_prompt)
            .with_session_override(turn.session_override.clone());
        request.current_spend = turn.current_spend;
        request.session_id = turn.session_id;
        request.channel = turn.channel;

        TurnPlan::Routed(router.route(&request))
    }

    /// Report the finished call for a routed turn. No-op otherwise.
    pub fn complete_turn(&self, plan: &TurnPlan, latency_ms: u64, response_size: usize) {
        if let (Some(router), Some(decision)) = (&self.router, plan.decision()) {
            router.record_completion(decision, latency_ms, response_size);
        }
    }

    /// Report that the host retried a routed turn on `fallback`. No-op otherwise.
    pub fn fallback(&self, plan: &TurnPlan, fallback: &ModelRef) {
        if let (Some(router), Some(decision)) = (&self.router, plan.decision()) {
            router.record_fallback(decision, fallback);
        }
    }
}

fn load_system_prompt(config: &BlufioConfig) -> String {
    if let Some(path) = config.agent.system_prompt_file.as_deref() {
        match std::fs::read_to_string(path) {
            Ok(prompt) => return prompt,
            Err(e) => warn!(path, error = %e, "failed to read system prompt file"),
        }
    }
    config.agent.system_prompt.clone().unwrap_or_default()
}
