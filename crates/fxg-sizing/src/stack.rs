use fxg_schemas::{AgentRole, Pair};
use serde::{Deserialize, Serialize};

use crate::policy::{DiscoveryEnvironment, PairPerformance, SizingPolicy};

/// Everything one sizing call needs. Multipliers arrive raw; the stack bounds
/// each one before combining.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizingInput {
    pub pair: Pair,
    pub account_balance: f64,
    /// Signal confidence, 0–100.
    pub confidence: f64,
    /// Account-currency value of one unit of quote currency.
    pub quote_to_account_rate: f64,

    pub state_multiplier: f64,
    pub pair_multiplier: f64,
    pub session_budget: f64,
    pub agent_size_multiplier: f64,
    pub agent_role: AgentRole,
    pub regime_multiplier: f64,
    pub discovery: DiscoveryEnvironment,
    /// Discovery override; when set, replaces the environment lookup.
    pub discovery_multiplier: Option<f64>,

    pub throttled: bool,
}

/// Step-by-step record of one sizing call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizingBreakdown {
    pub risk_amount: f64,
    pub risk_per_unit: f64,
    pub base_units: f64,
    pub state: f64,
    pub pair: f64,
    pub session: f64,
    pub agent_role: f64,
    pub regime: f64,
    pub discovery: f64,
    pub throttle: f64,
    pub raw_units: f64,
    pub units: u32,
    /// True when the final clamp changed the result.
    pub clamped: bool,
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Risk-normalized base units, before any multiplier.
///
/// `floor(balance × base_risk × confidence/ref ÷ (stop × atr_mult × pip × rate))`.
/// Returns (risk_amount, risk_per_unit, base_units); degenerate input gives 0 units.
pub fn base_units(policy: &SizingPolicy, input: &SizingInput) -> (f64, f64, f64) {
    let confidence = finite_or_zero(input.confidence).clamp(0.0, 100.0);
    let balance = finite_or_zero(input.account_balance).max(0.0);
    let reference = if policy.reference_confidence > 0.0 {
        policy.reference_confidence
    } else {
        80.0
    };

    let risk_amount = balance * policy.base_risk_fraction * confidence / reference;
    let risk_per_unit = policy.stop_pips
        * policy.atr_multiplier(&input.pair)
        * input.pair.pip_size()
        * finite_or_zero(input.quote_to_account_rate);

    if !(risk_per_unit.is_finite() && risk_per_unit > 0.0) || !risk_amount.is_finite() {
        return (risk_amount, risk_per_unit, 0.0);
    }
    (risk_amount, risk_per_unit, (risk_amount / risk_per_unit).floor())
}

/// Run the full stack: base units, bounded multipliers in order, optional
/// throttle, then the unit clamp.
pub fn compute_position_size(policy: &SizingPolicy, input: &SizingInput) -> SizingBreakdown {
    let (risk_amount, risk_per_unit, base) = base_units(policy, input);

    let state = policy.state_bounds.clamp(input.state_multiplier);
    let pair = policy.pair_bounds.clamp(input.pair_multiplier);
    let session = policy.session_bounds.clamp(input.session_budget);
    let agent_role = policy
        .agent_bounds
        .clamp(input.agent_size_multiplier * policy.roles.get(input.agent_role));
    let regime = policy.regime_bounds.clamp(input.regime_multiplier);
    let discovery = policy.discovery_bounds.clamp(
        input
            .discovery_multiplier
            .unwrap_or_else(|| policy.discovery.get(input.discovery)),
    );
    let throttle = if input.throttled {
        policy.throttle_factor
    } else {
        1.0
    };

    let raw_units = base * state * pair * session * agent_role * regime * discovery * throttle;

    let lo = policy.min_units.min(policy.max_units);
    let hi = policy.max_units.max(policy.min_units);
    let floored = raw_units.floor();
    let units = if floored.is_nan() {
        lo
    } else {
        floored.clamp(lo as f64, hi as f64) as u32
    };

    SizingBreakdown {
        risk_amount,
        risk_per_unit,
        base_units: base,
        state,
        pair,
        session,
        agent_role,
        regime,
        discovery,
        throttle,
        raw_units,
        units,
        clamped: floored.is_nan() || floored != units as f64,
    }
}

/// Pair capital multiplier from rolling pair performance.
///
/// Thin history stays neutral. Negative expectancy shrinks, high Sharpe with a
/// high win rate grows. Unbounded; the stack clamps it.
pub fn pair_capital_multiplier(policy: &SizingPolicy, perf: &PairPerformance) -> f64 {
    if perf.trades < policy.pair_min_trades {
        return 1.0;
    }
    if perf.expectancy_pips < 0.0 {
        return if perf.expectancy_pips > -1.0 { 0.75 } else { 0.5 };
    }
    let sharpe = perf.sharpe.filter(|s| s.is_finite()).unwrap_or(0.0);
    if sharpe >= 1.0 && perf.win_rate >= 0.55 {
        1.3
    } else if sharpe >= 0.5 || perf.win_rate >= 0.50 {
        1.1
    } else {
        1.0
    }
}
