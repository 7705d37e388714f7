// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tiered model routing for the Blufio agent.
//!
//! This crate provides:
//! - [`classify`]: Heuristic intent classification (zero-cost, zero-latency)
//! - [`tier`]: The T0..T4 capability tier registry
//! - [`adapt`]: Tier-aware system prompt adaptation
//! - [`ModelRouter`]: Bias- and budget-aware tier and model selection
//! - [`AnalyticsLogger`]: Fire-and-forget JSONL routing analytics
//! - [`RoutingIntegration`]: Feature-flag gate for the host agent loop
//!
//! The router runs before each LLM call, choosing the cheapest tier that can
//! handle the message, nudged by the configured bias and clamped to the free
//! tiers once a spend cap is reached.

pub mod analytics;
pub mod classifier;
pub mod integration;
pub mod policy;
pub mod prompt;
pub mod router;
pub mod tier;

pub use analytics::{AnalyticsEvent, AnalyticsEventKind, AnalyticsLogger, AnalyticsRegistry};
pub use classifier::{classify, ClassificationResult, ClassificationSignal, IntentComplexity};
pub use integration::{RoutingIntegration, TurnContext, TurnPlan};
pub use policy::{apply_bias, apply_budget, BudgetClamp, CurrentSpend, RoutingBudget};
pub use prompt::{adapt, AdaptedPrompt};
pub use router::{ModelRouter, RouteRequest, RoutingDecision};
pub use tier::{ModelTier, TierDefinition};
