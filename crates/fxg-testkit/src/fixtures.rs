use chrono::{DateTime, TimeZone, Utc};
use fxg_decision::{GovernanceContext, PnlRange, TradeProposal};
use fxg_metrics::{profit_factor_opt, RollingWindowMetrics, SlippageDrift};
use fxg_runtime::CandidateTrade;
use fxg_schemas::{Direction, Pair, SequencingCluster, Session, VolatilityPhase};

/// Synthetic rolling window with the headline statistics set directly.
///
/// Losing trades are 10 pips each. Drawdown is the full gross loss.
pub fn window(
    size: usize,
    trades: usize,
    win_rate: f64,
    expectancy_pips: f64,
) -> RollingWindowMetrics {
    let wins = ((trades as f64) * win_rate).round() as usize;
    let wins = wins.min(trades);
    let losses = trades - wins;

    let net = expectancy_pips * trades as f64;
    let mut gross_loss = losses as f64 * 10.0;
    let mut gross_profit = net + gross_loss;
    if gross_profit < 0.0 {
        gross_profit = 0.0;
        gross_loss = -net;
    }

    RollingWindowMetrics {
        window_size: size,
        rows_in_window: trades,
        trade_count: trades,
        win_rate,
        expectancy_pips,
        gross_profit_pips: gross_profit,
        gross_loss_pips: gross_loss,
        profit_factor: profit_factor_opt(gross_profit, gross_loss),
        max_drawdown_pips: gross_loss,
        drawdown_slope: if trades > 0 {
            gross_loss / trades as f64
        } else {
            0.0
        },
        friction_adjusted_pnl_pips: net,
        capture_ratio: 0.5,
        rejection_rate: 0.0,
        decision_entropy: 0.0,
        mean_execution_quality: None,
        slippage_drift: SlippageDrift::none(),
        neutral_default: false,
    }
}

/// p = 0.55, wins 8–14 pips, losses 6–10 pips.
pub fn proposal(pair: &str, direction: Direction) -> TradeProposal {
    TradeProposal {
        pair: Pair::parse(pair).expect("valid pair in fixture"),
        direction,
        base_win_probability: 0.55,
        win_pnl_range: PnlRange::new(8.0, 14.0),
        loss_pnl_range: PnlRange::new(6.0, 10.0),
    }
}

pub fn candidate(pair: &str, direction: Direction) -> CandidateTrade {
    CandidateTrade::new(proposal(pair, direction))
}

/// A context that clears every gate: full alignment, ignition, calm
/// microstructure, London open, profit momentum.
pub fn strong_context() -> GovernanceContext {
    GovernanceContext {
        alignment_score: 85.0,
        htf_supports: true,
        mtf_confirms: true,
        ltf_clean: true,
        phase: VolatilityPhase::Ignition,
        phase_confidence: 90.0,
        liquidity_shock_prob: 10.0,
        spread_stability_rank: 80.0,
        friction_ratio: 5.0,
        total_friction_pips: 1.2,
        pair_expectancy: 75.0,
        pair_favored: true,
        is_major_pair: true,
        session: Session::LondonOpen,
        session_aggressiveness: 85.0,
        edge_decaying: false,
        edge_decay_pct: 0.0,
        overtrading_throttle: false,
        sequencing: SequencingCluster::ProfitMomentum,
    }
}

/// Fluent tweaks on top of [`strong_context`].
#[derive(Clone, Debug)]
pub struct ContextBuilder {
    ctx: GovernanceContext,
}

impl ContextBuilder {
    pub fn strong() -> Self {
        Self {
            ctx: strong_context(),
        }
    }

    pub fn session(mut self, session: Session, aggressiveness: f64) -> Self {
        self.ctx.session = session;
        self.ctx.session_aggressiveness = aggressiveness;
        self
    }

    pub fn phase(mut self, phase: VolatilityPhase, confidence: f64) -> Self {
        self.ctx.phase = phase;
        self.ctx.phase_confidence = confidence;
        self
    }

    pub fn friction_ratio(mut self, ratio: f64) -> Self {
        self.ctx.friction_ratio = ratio;
        self
    }

    pub fn liquidity_shock(mut self, prob: f64) -> Self {
        self.ctx.liquidity_shock_prob = prob;
        self
    }

    pub fn alignment(mut self, score: f64, htf: bool, mtf: bool, ltf: bool) -> Self {
        self.ctx.alignment_score = score;
        self.ctx.htf_supports = htf;
        self.ctx.mtf_confirms = mtf;
        self.ctx.ltf_clean = ltf;
        self
    }

    pub fn major(mut self, is_major: bool) -> Self {
        self.ctx.is_major_pair = is_major;
        self
    }

    pub fn sequencing(mut self, cluster: SequencingCluster) -> Self {
        self.ctx.sequencing = cluster;
        self
    }

    pub fn overtrading(mut self) -> Self {
        self.ctx.overtrading_throttle = true;
        self
    }

    pub fn build(self) -> GovernanceContext {
        self.ctx
    }
}

/// Tuesday 2026-03-03 08:30 UTC: London open, New York still closed.
pub fn cycle_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 3, 8, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}
