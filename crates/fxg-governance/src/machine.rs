use fxg_metrics::{GovernanceWindows, RollingWindowMetrics};
use serde::{Deserialize, Serialize};

use crate::{GovernanceState, GovernanceStateConfig, StateTable};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Transition thresholds. Defaults are the production values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceThresholds {
    pub halt_w20_min_trades: usize,
    pub halt_w20_max_win_rate: f64,
    pub halt_w20_max_expectancy_pips: f64,
    pub halt_w50_min_trades: usize,
    pub halt_w50_max_friction_pnl_pips: f64,

    pub throttle_w50_min_trades: usize,
    pub throttle_w50_max_win_rate: f64,
    pub throttle_w50_max_expectancy_pips: f64,

    pub defensive_w50_min_trades: usize,
    pub defensive_w50_max_expectancy_pips: f64,
    pub defensive_w200_min_trades: usize,
    pub defensive_w200_min_capture_ratio: f64,
}

impl Default for GovernanceThresholds {
    fn default() -> Self {
        Self {
            halt_w20_min_trades: 5,
            halt_w20_max_win_rate: 0.20,
            halt_w20_max_expectancy_pips: -5.0,
            halt_w50_min_trades: 20,
            halt_w50_max_friction_pnl_pips: -100.0,

            throttle_w50_min_trades: 20,
            throttle_w50_max_win_rate: 0.35,
            throttle_w50_max_expectancy_pips: -1.5,

            defensive_w50_min_trades: 20,
            defensive_w50_max_expectancy_pips: 0.0,
            defensive_w200_min_trades: 50,
            defensive_w200_min_capture_ratio: 0.30,
        }
    }
}

/// Bootstrap policy: below `milestone` total trades the effective state is
/// forced to NORMAL so the system keeps collecting the data it needs.
///
/// The milestone is owner policy, not a derived constant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningPhasePolicy {
    pub milestone: u64,
    /// 20-trade mean execution quality below this is reported as catastrophic.
    pub exec_quality_floor: f64,
}

impl Default for LearningPhasePolicy {
    fn default() -> Self {
        Self {
            milestone: 500,
            exec_quality_floor: 40.0,
        }
    }
}

impl LearningPhasePolicy {
    pub fn is_learning(&self, total_trades: u64) -> bool {
        total_trades < self.milestone
    }
}

/// Everything the state machine needs besides the windows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    pub thresholds: GovernanceThresholds,
    pub learning: LearningPhasePolicy,
    pub table: StateTable,
}

// ---------------------------------------------------------------------------
// Transition function
// ---------------------------------------------------------------------------

/// Evaluate severity top-down; the first (most severe) matching state wins.
///
/// Returns the state and the human-readable reasons behind it.
pub fn determine_state(
    t: &GovernanceThresholds,
    w20: &RollingWindowMetrics,
    w50: &RollingWindowMetrics,
    w200: &RollingWindowMetrics,
) -> (GovernanceState, Vec<String>) {
    // HALT
    let mut reasons = Vec::new();
    if w20.trade_count >= t.halt_w20_min_trades
        && w20.win_rate < t.halt_w20_max_win_rate
        && w20.expectancy_pips < t.halt_w20_max_expectancy_pips
    {
        reasons.push(format!(
            "20-trade win rate {:.1}% < {:.1}% with expectancy {:.2} < {:.2} pips ({} trades)",
            w20.win_rate * 100.0,
            t.halt_w20_max_win_rate * 100.0,
            w20.expectancy_pips,
            t.halt_w20_max_expectancy_pips,
            w20.trade_count
        ));
    }
    if w50.trade_count >= t.halt_w50_min_trades
        && w50.friction_adjusted_pnl_pips < t.halt_w50_max_friction_pnl_pips
    {
        reasons.push(format!(
            "50-trade friction-adjusted P&L {:.1} < {:.1} pips ({} trades)",
            w50.friction_adjusted_pnl_pips, t.halt_w50_max_friction_pnl_pips, w50.trade_count
        ));
    }
    if !reasons.is_empty() {
        return (GovernanceState::Halt, reasons);
    }

    // THROTTLED
    if w50.trade_count >= t.throttle_w50_min_trades
        && w50.win_rate < t.throttle_w50_max_win_rate
        && w50.expectancy_pips < t.throttle_w50_max_expectancy_pips
    {
        return (
            GovernanceState::Throttled,
            vec![format!(
                "50-trade win rate {:.1}% < {:.1}% with expectancy {:.2} < {:.2} pips ({} trades)",
                w50.win_rate * 100.0,
                t.throttle_w50_max_win_rate * 100.0,
                w50.expectancy_pips,
                t.throttle_w50_max_expectancy_pips,
                w50.trade_count
            )],
        );
    }

    // DEFENSIVE
    if w50.trade_count >= t.defensive_w50_min_trades
        && w50.expectancy_pips < t.defensive_w50_max_expectancy_pips
    {
        reasons.push(format!(
            "50-trade expectancy {:.2} pips is negative ({} trades)",
            w50.expectancy_pips, w50.trade_count
        ));
    }
    if w200.trade_count >= t.defensive_w200_min_trades
        && w200.capture_ratio < t.defensive_w200_min_capture_ratio
    {
        reasons.push(format!(
            "200-trade capture ratio {:.1}% < {:.1}% ({} trades)",
            w200.capture_ratio * 100.0,
            t.defensive_w200_min_capture_ratio * 100.0,
            w200.trade_count
        ));
    }
    if !reasons.is_empty() {
        return (GovernanceState::Defensive, reasons);
    }

    (
        GovernanceState::Normal,
        vec!["all governance windows within tolerance".to_string()],
    )
}

// ---------------------------------------------------------------------------
// Assessment (transition + learning-phase override + warnings)
// ---------------------------------------------------------------------------

/// Output of one governance evaluation cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernanceAssessment {
    /// Effective state after the learning-phase override.
    pub state: GovernanceState,
    /// State the metrics alone would have produced.
    pub raw_state: GovernanceState,
    pub reasons: Vec<String>,
    /// Execution-quality alarms. Reported even while the override holds.
    pub warnings: Vec<String>,
    pub learning_phase: bool,
    pub total_trades: u64,
    pub config: GovernanceStateConfig,
}

impl GovernanceAssessment {
    pub fn overridden(&self) -> bool {
        self.state != self.raw_state
    }
}

/// Determine the effective governance state for a cycle.
pub fn assess_governance(
    cfg: &GovernanceConfig,
    windows: &GovernanceWindows,
    total_trades: u64,
) -> GovernanceAssessment {
    let (raw_state, raw_reasons) =
        determine_state(&cfg.thresholds, &windows.w20, &windows.w50, &windows.w200);

    let warnings = execution_quality_warnings(&cfg.learning, windows);
    let learning_phase = cfg.learning.is_learning(total_trades);

    let (state, reasons) = if learning_phase {
        let mut reasons = vec![format!(
            "learning phase: {}/{} trades, state forced to NORMAL (metrics indicate {})",
            total_trades, cfg.learning.milestone, raw_state
        )];
        if raw_state != GovernanceState::Normal {
            reasons.extend(raw_reasons);
        }
        (GovernanceState::Normal, reasons)
    } else {
        (raw_state, raw_reasons)
    };

    GovernanceAssessment {
        state,
        raw_state,
        reasons,
        warnings,
        learning_phase,
        total_trades,
        config: cfg.table.config_for(state).clone(),
    }
}

fn execution_quality_warnings(
    learning: &LearningPhasePolicy,
    windows: &GovernanceWindows,
) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(q) = windows.w20.mean_execution_quality {
        if q < learning.exec_quality_floor {
            out.push(format!(
                "catastrophic execution quality: 20-trade mean {:.1} < floor {:.1}",
                q, learning.exec_quality_floor
            ));
        }
    }

    for w in [&windows.w20, &windows.w50] {
        if w.slippage_drift.flagged {
            out.push(format!(
                "slippage drift in {}-trade window: recent mean {:.2} vs older {:.2} pips",
                w.window_size, w.slippage_drift.recent_mean, w.slippage_drift.older_mean
            ));
        }
    }

    out
}
