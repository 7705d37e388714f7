// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bias and budget stages of the routing pipeline.

use blufio_config::model::{RoutingBias, RoutingBudgetConfig};
use serde::{Deserialize, Serialize};

use crate::tier::{clamp_tier, ModelTier};

/// Highest tier allowed once a budget rule fires.
pub const BUDGET_CEILING: ModelTier = ModelTier::T1;

/// Shift a tier by at most one step according to the bias.
///
/// `Cost` never drops below T1 (a T0 or T1 decision stays put) and
/// `Quality` never rises above T4.
pub fn apply_bias(tier: ModelTier, bias: RoutingBias) -> ModelTier {
    let index = tier.index();
    let shifted = match bias {
        RoutingBias::Cost if index > 1 => index - 1,
        RoutingBias::Quality if index < 4 => index + 1,
        _ => index,
    };
    ModelTier::from_index(shifted).unwrap_or(tier)
}

/// Spend already incurred, aggregated by the caller.
///
/// A missing field disables the corresponding cap check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentSpend {
    pub daily_usd: Option<f64>,
    pub monthly_usd: Option<f64>,
}

/// Budget caps from configuration plus the caller's current spend.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoutingBudget {
    pub daily_cap_usd: Option<f64>,
    pub monthly_cap_usd: Option<f64>,
    pub prefer_free: bool,
    pub current_spend: Option<CurrentSpend>,
}

impl RoutingBudget {
    pub fn from_config(config: &RoutingBudgetConfig) -> Self {
        Self {
            daily_cap_usd: config.daily_cap_usd,
            monthly_cap_usd: config.monthly_cap_usd,
            prefer_free: config.prefer_free,
            current_spend: None,
        }
    }

    pub fn with_spend(mut self, spend: Option<CurrentSpend>) -> Self {
        self.current_spend = spend;
        self
    }

    /// The first budget rule that applies, checked in precedence order:
    /// prefer-free, then the daily cap, then the monthly cap.
    pub fn triggered_rule(&self) -> Option<BudgetClamp> {
        if self.prefer_free {
            return Some(BudgetClamp::PreferFree);
        }
        let spend = self.current_spend.unwrap_or_default();
        if let (Some(cap), Some(spent)) = (self.daily_cap_usd, spend.daily_usd)
            && spent >= cap
        {
            return Some(BudgetClamp::DailyCapReached);
        }
        if let (Some(cap), Some(spent)) = (self.monthly_cap_usd, spend.monthly_usd)
            && spent >= cap
        {
            return Some(BudgetClamp::MonthlyCapReached);
        }
        None
    }
}

/// Why a budget rule lowered the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetClamp {
    PreferFree,
    DailyCapReached,
    MonthlyCapReached,
}

impl std::fmt::Display for BudgetClamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetClamp::PreferFree => write!(f, "prefer free tiers"),
            BudgetClamp::DailyCapReached => write!(f, "daily cap reached"),
            BudgetClamp::MonthlyCapReached => write!(f, "monthly cap reached"),
        }
    }
}

/// Clamp a tier to [`BUDGET_CEILING`] when a budget rule applies.
///
/// The clamp reason is returned only if the tier actually went down.
pub fn apply_budget(tier: ModelTier, budget: &RoutingBudget) -> (ModelTier, Option<BudgetClamp>) {
    match budget.triggered_rule() {
        Some(rule) if tier > BUDGET_CEILING => (clamp_tier(tier, BUDGET_CEILING), Some(rule)),
        _ => (tier, None),
    }
}
