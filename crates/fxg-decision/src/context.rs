use fxg_schemas::{Direction, Pair, SequencingCluster, Session, VolatilityPhase};
use serde::{Deserialize, Serialize};

/// A pip range (both bounds are positive magnitudes).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PnlRange {
    pub min_pips: f64,
    pub max_pips: f64,
}

impl PnlRange {
    pub fn new(min_pips: f64, max_pips: f64) -> Self {
        Self { min_pips, max_pips }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min_pips + self.max_pips) / 2.0
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min_pips: self.min_pips * factor,
            max_pips: self.max_pips * factor,
        }
    }
}

/// A candidate trade. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub pair: Pair,
    pub direction: Direction,
    /// Base probability of the trade winning, in [0, 1].
    pub base_win_probability: f64,
    pub win_pnl_range: PnlRange,
    pub loss_pnl_range: PnlRange,
}

/// Point-in-time market / microstructure / session snapshot for one proposal.
///
/// Percent-scale fields are in [0, 100].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernanceContext {
    // Multi-timeframe alignment
    pub alignment_score: f64,
    pub htf_supports: bool,
    pub mtf_confirms: bool,
    pub ltf_clean: bool,

    // Volatility
    pub phase: VolatilityPhase,
    pub phase_confidence: f64,

    // Microstructure
    pub liquidity_shock_prob: f64,
    pub spread_stability_rank: f64,
    /// Expected move ÷ total friction cost.
    pub friction_ratio: f64,
    /// Spread + slippage + latency cost in pips.
    #[serde(default)]
    pub total_friction_pips: f64,

    // Pair
    /// Pair expectancy rank.
    pub pair_expectancy: f64,
    pub pair_favored: bool,
    pub is_major_pair: bool,

    // Session
    pub session: Session,
    pub session_aggressiveness: f64,

    // Edge health
    #[serde(default)]
    pub edge_decaying: bool,
    /// Edge lost per window.
    #[serde(default)]
    pub edge_decay_pct: f64,
    #[serde(default)]
    pub overtrading_throttle: bool,

    pub sequencing: SequencingCluster,
}

/// Percent-scale input clamped into [0, 100]; NaN reads as 0.
pub(crate) fn pct(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
