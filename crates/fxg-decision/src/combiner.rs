use fxg_schemas::{Direction, Pair, Session, VolatilityPhase};
use serde::{Deserialize, Serialize};

use crate::context::{GovernanceContext, PnlRange, TradeProposal};
use crate::gates::{evaluate_gates, GateThresholds, TriggeredGate};
use crate::multipliers::{compose, GovernanceMultipliers, MultiplierTables};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationWindow {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

/// Expected holding time per volatility phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationTable {
    pub compression: DurationWindow,
    pub ignition: DurationWindow,
    pub expansion: DurationWindow,
    pub exhaustion: DurationWindow,
}

impl Default for DurationTable {
    fn default() -> Self {
        Self {
            compression: DurationWindow {
                min_minutes: 60,
                max_minutes: 180,
            },
            ignition: DurationWindow {
                min_minutes: 15,
                max_minutes: 45,
            },
            expansion: DurationWindow {
                min_minutes: 30,
                max_minutes: 90,
            },
            exhaustion: DurationWindow {
                min_minutes: 10,
                max_minutes: 30,
            },
        }
    }
}

impl DurationTable {
    pub fn get(&self, phase: VolatilityPhase) -> DurationWindow {
        match phase {
            VolatilityPhase::Compression => self.compression,
            VolatilityPhase::Ignition => self.ignition,
            VolatilityPhase::Expansion => self.expansion,
            VolatilityPhase::Exhaustion => self.exhaustion,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionPolicy {
    pub multipliers: MultiplierTables,
    pub gates: GateThresholds,
    pub durations: DurationTable,
    /// Composite below this throttles even with no gates.
    pub throttle_composite_below: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            multipliers: MultiplierTables::default(),
            gates: GateThresholds::default(),
            durations: DurationTable::default(),
            throttle_composite_below: 0.60,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Throttled,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Throttled => "throttled",
            Decision::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-decision blocks that reject a proposal regardless of its multipliers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HardBlock {
    MarketDataUnavailable { detail: String },
    CoalitionNotMet { required: usize, available: usize },
    /// Coalition met only with support agents; nobody may set direction.
    NoDirectionalLead,
    PairRestricted { pair: Pair },
    SessionBlocked { session: Session },
}

impl std::fmt::Display for HardBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HardBlock::MarketDataUnavailable { detail } => {
                write!(f, "market data unavailable: {detail}")
            }
            HardBlock::CoalitionNotMet {
                required,
                available,
            } => write!(
                f,
                "coalition requirement not met: {available} of {required} agents available"
            ),
            HardBlock::NoDirectionalLead => {
                f.write_str("no directional agent available to lead the coalition")
            }
            HardBlock::PairRestricted { pair } => {
                write!(f, "pair {pair} restricted in current governance state")
            }
            HardBlock::SessionBlocked { session } => {
                write!(f, "session {session} blocked in current governance state")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitLatencyGrade {
    A,
    B,
    C,
    D,
}

impl ExitLatencyGrade {
    pub fn from_capture(capture: f64) -> Self {
        if capture >= 0.70 {
            ExitLatencyGrade::A
        } else if capture >= 0.55 {
            ExitLatencyGrade::B
        } else if capture >= 0.40 {
            ExitLatencyGrade::C
        } else {
            ExitLatencyGrade::D
        }
    }
}

/// Scalping diagnostics. Populated only for approved proposals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalpingForensics {
    pub expected_capture_ratio: f64,
    pub expected_expectancy_pips: f64,
    pub friction_cost_pips: f64,
    pub exit_latency_grade: Option<ExitLatencyGrade>,
    pub quality_label: String,
    pub phase_label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernanceResult {
    pub pair: Pair,
    pub direction: Direction,
    pub decision: Decision,
    /// None when the proposal was hard-blocked before any context was read.
    pub multipliers: Option<GovernanceMultipliers>,
    pub composite_score: f64,
    pub triggered_gates: Vec<TriggeredGate>,
    pub hard_block: Option<HardBlock>,
    pub governance_score: f64,
    pub confidence_boost: f64,
    pub adjusted_win_probability: f64,
    pub adjusted_win_range: PnlRange,
    pub adjusted_loss_range: PnlRange,
    pub duration_minutes: Option<DurationWindow>,
    pub drawdown_cap: f64,
    pub forensics: ScalpingForensics,
}

impl GovernanceResult {
    /// Rejected result for a proposal that never reached the combiner.
    pub fn hard_block(proposal: &TradeProposal, block: HardBlock) -> Self {
        Self {
            pair: proposal.pair.clone(),
            direction: proposal.direction,
            decision: Decision::Rejected,
            multipliers: None,
            composite_score: 0.0,
            triggered_gates: Vec::new(),
            hard_block: Some(block),
            governance_score: 0.0,
            confidence_boost: 0.0,
            adjusted_win_probability: proposal.base_win_probability,
            adjusted_win_range: proposal.win_pnl_range,
            adjusted_loss_range: proposal.loss_pnl_range,
            duration_minutes: None,
            drawdown_cap: 0.0,
            forensics: ScalpingForensics::default(),
        }
    }

    /// Force an evaluated result to rejected, keeping its diagnostics.
    pub fn blocked(mut self, proposal: &TradeProposal, block: HardBlock) -> Self {
        self.decision = Decision::Rejected;
        self.hard_block = Some(block);
        self.confidence_boost = 0.0;
        self.adjusted_win_probability = proposal.base_win_probability;
        self.adjusted_win_range = proposal.win_pnl_range;
        self.adjusted_loss_range = proposal.loss_pnl_range;
        self.duration_minutes = None;
        self.forensics = ScalpingForensics::default();
        self
    }

    pub fn is_tradeable(&self) -> bool {
        self.decision != Decision::Rejected
    }

    /// One-line summary for logs and CLI output.
    pub fn reasons(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(b) = &self.hard_block {
            out.push(b.to_string());
        }
        out.extend(
            self.triggered_gates
                .iter()
                .map(|g| format!("{}: {}", g.gate, g.reason)),
        );
        out
    }
}

// ---------------------------------------------------------------------------
// Combiner
// ---------------------------------------------------------------------------

/// Decision from gate count and composite.
///
/// - 2+ gates → rejected
/// - 1 gate, or composite below `throttle_below` → throttled
/// - otherwise → approved
pub fn classify_decision(gate_count: usize, composite: f64, throttle_below: f64) -> Decision {
    if gate_count >= 2 {
        Decision::Rejected
    } else if gate_count == 1 || composite.is_nan() || composite < throttle_below {
        Decision::Throttled
    } else {
        Decision::Approved
    }
}

/// Evaluate a proposal against a context.
pub fn decide(
    policy: &DecisionPolicy,
    proposal: &TradeProposal,
    ctx: &GovernanceContext,
) -> GovernanceResult {
    let m = compose(&policy.multipliers, ctx);
    let gates = evaluate_gates(&policy.gates, ctx);
    let c = m.composite;
    let decision = classify_decision(gates.len(), c, policy.throttle_composite_below);

    let mut score = c * 60.0;
    if gates.is_empty() {
        score += 25.0;
    }
    if ctx.is_major_pair {
        score += 5.0;
    }
    let governance_score = score.clamp(0.0, 100.0);

    let drawdown_cap = (3.8 * (1.0 - (c - 0.5) * 0.5)).max(0.15);

    let mut result = GovernanceResult {
        pair: proposal.pair.clone(),
        direction: proposal.direction,
        decision,
        multipliers: Some(m),
        composite_score: c,
        triggered_gates: gates,
        hard_block: None,
        governance_score,
        confidence_boost: 0.0,
        adjusted_win_probability: proposal.base_win_probability,
        adjusted_win_range: proposal.win_pnl_range,
        adjusted_loss_range: proposal.loss_pnl_range,
        duration_minutes: None,
        drawdown_cap,
        forensics: ScalpingForensics::default(),
    };

    if decision == Decision::Rejected {
        return result;
    }

    let base_p = if proposal.base_win_probability.is_finite() {
        proposal.base_win_probability
    } else {
        0.0
    };
    let p = (base_p * (0.70 + c * 0.45)).clamp(0.30, 0.88);
    let loss_factor = (2.0 - m.microstructure * m.session).clamp(0.6, 1.4);

    result.adjusted_win_probability = p;
    result.adjusted_win_range = proposal.win_pnl_range.scaled(m.exit_efficiency);
    result.adjusted_loss_range = proposal.loss_pnl_range.scaled(loss_factor);
    result.confidence_boost = ((c - 1.0) * 20.0).clamp(-15.0, 15.0);
    result.duration_minutes = Some(policy.durations.get(ctx.phase));

    if decision == Decision::Approved {
        result.forensics = forensics(&result, &m, ctx, p);
    }

    result
}

fn forensics(
    result: &GovernanceResult,
    m: &GovernanceMultipliers,
    ctx: &GovernanceContext,
    p: f64,
) -> ScalpingForensics {
    let capture = (0.45 + (m.exit_efficiency - 1.0) * 0.8 + (m.microstructure - 1.0) * 0.3)
        .clamp(0.10, 0.95);

    let friction = if ctx.total_friction_pips.is_finite() {
        ctx.total_friction_pips.max(0.0)
    } else {
        0.0
    };

    let expectancy = p * result.adjusted_win_range.midpoint()
        - (1.0 - p) * result.adjusted_loss_range.midpoint()
        - friction;

    let quality = if m.composite >= 1.5 {
        "premium"
    } else if m.composite >= 1.0 {
        "standard"
    } else if m.composite >= 0.6 {
        "marginal"
    } else {
        "weak"
    };

    ScalpingForensics {
        expected_capture_ratio: capture,
        expected_expectancy_pips: expectancy,
        friction_cost_pips: friction,
        exit_latency_grade: Some(ExitLatencyGrade::from_capture(capture)),
        quality_label: format!("{quality} (composite {:.2})", m.composite),
        phase_label: format!("{} ({:.0}% confidence)", ctx.phase, ctx.phase_confidence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_all_cases() {
        assert_eq!(classify_decision(0, 1.2, 0.6), Decision::Approved);
        assert_eq!(classify_decision(0, 0.59, 0.6), Decision::Throttled);
        assert_eq!(classify_decision(1, 1.5, 0.6), Decision::Throttled);
        assert_eq!(classify_decision(2, 1.5, 0.6), Decision::Rejected);
        assert_eq!(classify_decision(0, f64::NAN, 0.6), Decision::Throttled);
    }

    #[test]
    fn grades_follow_capture() {
        assert_eq!(ExitLatencyGrade::from_capture(0.80), ExitLatencyGrade::A);
        assert_eq!(ExitLatencyGrade::from_capture(0.60), ExitLatencyGrade::B);
        assert_eq!(ExitLatencyGrade::from_capture(0.45), ExitLatencyGrade::C);
        assert_eq!(ExitLatencyGrade::from_capture(0.20), ExitLatencyGrade::D);
    }
}
