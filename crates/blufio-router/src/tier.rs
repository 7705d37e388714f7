// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability tiers and their static definitions.
//!
//! Tiers form a total order from T0 (no model call) to T4 (the most capable
//! and most expensive model). Capability scores never decrease from T1 to
//! T4; cost and latency are free to vary.

use blufio_core::ModelRef;
use serde::{Deserialize, Serialize};

use crate::classifier::IntentComplexity;

/// Discrete capability/cost bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ModelTier {
    /// No model invocation.
    T0,
    /// Small local model.
    T1,
    /// Fast hosted model.
    T2,
    /// General-purpose hosted model.
    T3,
    /// Flagship model.
    T4,
}

impl ModelTier {
    /// All tiers in ascending order.
    pub const ALL: [ModelTier; 5] = [
        ModelTier::T0,
        ModelTier::T1,
        ModelTier::T2,
        ModelTier::T3,
        ModelTier::T4,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn lowest() -> Self {
        ModelTier::T0
    }

    pub fn highest() -> Self {
        ModelTier::T4
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}", self.index())
    }
}

/// Position of a tier in the total order (0..=4).
pub fn tier_index(tier: ModelTier) -> usize {
    tier.index()
}

/// Whether `a` is strictly above `b`.
pub fn is_higher_tier(a: ModelTier, b: ModelTier) -> bool {
    a > b
}

pub fn max_tier(a: ModelTier, b: ModelTier) -> ModelTier {
    a.max(b)
}

/// Cap `tier` at `max_allowed`.
pub fn clamp_tier(tier: ModelTier, max_allowed: ModelTier) -> ModelTier {
    tier.min(max_allowed)
}

/// Coarse response latency class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyBucket {
    /// Nothing is invoked.
    None,
    Fast,
    Moderate,
    Slow,
}

/// Capability scores, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapabilityScores {
    pub reasoning: f32,
    pub coding: f32,
    pub instruction_following: f32,
    pub long_context: f32,
    pub tool_use: f32,
    pub world_knowledge: f32,
}

impl CapabilityScores {
    const ZERO: CapabilityScores = CapabilityScores {
        reasoning: 0.0,
        coding: 0.0,
        instruction_following: 0.0,
        long_context: 0.0,
        tool_use: 0.0,
        world_knowledge: 0.0,
    };

    /// Named dimensions, for iteration in tests and reports.
    pub fn dimensions(&self) -> [(&'static str, f32); 6] {
        [
            ("reasoning", self.reasoning),
            ("coding", self.coding),
            ("instruction_following", self.instruction_following),
            ("long_context", self.long_context),
            ("tool_use", self.tool_use),
            ("world_knowledge", self.world_knowledge),
        ]
    }
}

/// Immutable description of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierDefinition {
    pub tier: ModelTier,
    pub label: &'static str,
    pub capabilities: CapabilityScores,
    /// USD per 1k input tokens. Zero means free (local or no call).
    pub cost_per_1k_input_usd: f64,
    pub latency: LatencyBucket,
    pub requires_network: bool,
}

static TIERS: [TierDefinition; 5] = [
    TierDefinition {
        tier: ModelTier::T0,
        label: "none",
        capabilities: CapabilityScores::ZERO,
        cost_per_1k_input_usd: 0.0,
        latency: LatencyBucket::None,
        requires_network: false,
    },
    TierDefinition {
        tier: ModelTier::T1,
        label: "local",
        capabilities: CapabilityScores {
            reasoning: 0.30,
            coding: 0.25,
            instruction_following: 0.40,
            long_context: 0.20,
            tool_use: 0.10,
            world_knowledge: 0.30,
        },
        cost_per_1k_input_usd: 0.0,
        latency: LatencyBucket::Fast,
        requires_network: false,
    },
    TierDefinition {
        tier: ModelTier::T2,
        label: "fast",
        capabilities: CapabilityScores {
            reasoning: 0.55,
            coding: 0.55,
            instruction_following: 0.70,
            long_context: 0.60,
            tool_use: 0.60,
            world_knowledge: 0.60,
        },
        cost_per_1k_input_usd: 0.0008,
        latency: LatencyBucket::Fast,
        requires_network: true,
    },
    TierDefinition {
        tier: ModelTier::T3,
        label: "standard",
        capabilities: CapabilityScores {
            reasoning: 0.80,
            coding: 0.85,
            instruction_following: 0.85,
            long_context: 0.85,
            tool_use: 0.85,
            world_knowledge: 0.80,
        },
        cost_per_1k_input_usd: 0.003,
        latency: LatencyBucket::Moderate,
        requires_network: true,
    },
    TierDefinition {
        tier: ModelTier::T4,
        label: "flagship",
        capabilities: CapabilityScores {
            reasoning: 0.95,
            coding: 0.92,
            instruction_following: 0.92,
            long_context: 0.90,
            tool_use: 0.90,
            world_knowledge: 0.92,
        },
        cost_per_1k_input_usd: 0.015,
        latency: LatencyBucket::Slow,
        requires_network: true,
    },
];

pub fn tier_definition(tier: ModelTier) -> &'static TierDefinition {
    &TIERS[tier.index()]
}

/// Lowest tier able to serve an intent.
///
/// `Explicit` maps to T4 only as a sentinel; the router handles it as a
/// bypass before this lookup is consulted.
pub fn minimum_tier(intent: IntentComplexity) -> ModelTier {
    match intent {
        IntentComplexity::Trivial => ModelTier::T0,
        IntentComplexity::Simple => ModelTier::T1,
        IntentComplexity::Standard => ModelTier::T2,
        IntentComplexity::Complex => ModelTier::T3,
        IntentComplexity::Flagship => ModelTier::T4,
        IntentComplexity::Explicit => ModelTier::T4,
    }
}

/// Built-in model for a tier. `None` only for T0.
pub fn default_model_for(tier: ModelTier) -> Option<ModelRef> {
    let (provider, model) = match tier {
        ModelTier::T0 => return None,
        ModelTier::T1 => ("ollama", "llama3.2:3b"),
        ModelTier::T2 => ("anthropic", "claude-haiku-4-5"),
        ModelTier::T3 => ("anthropic", "claude-sonnet-4-5"),
        ModelTier::T4 => ("anthropic", "claude-opus-4-1"),
    };
    Some(ModelRef::new(provider, model))
}

/// Rough input cost for a message at a tier, assuming ~4 characters per token.
///
/// `None` for T0, where nothing is invoked.
pub fn estimate_input_cost_usd(tier: ModelTier, message_chars: usize) -> Option<f64> {
    if tier == ModelTier::T0 {
        return None;
    }
    let tokens = message_chars.div_ceil(4) as f64;
    Some(tokens / 1000.0 * tier_definition(tier).cost_per_1k_input_usd)
}
