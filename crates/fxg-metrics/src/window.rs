use fxg_schemas::{DecisionBucket, TradeRecord};
use serde::{Deserialize, Serialize};

use crate::stats::{
    capture_ratio, detect_slippage_drift, max_drawdown_pips, profit_factor, profit_factor_opt,
    shannon_entropy, SlippageDrift,
};
use crate::{MIN_FILLED_TRADES, WINDOW_LONG, WINDOW_MEDIUM, WINDOW_SHORT};

// ---------------------------------------------------------------------------
// RollingWindowMetrics
// ---------------------------------------------------------------------------

/// Statistics over the most recent `window_size` history rows.
///
/// A pure function of the window; never persisted or updated incrementally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RollingWindowMetrics {
    /// Requested window length.
    pub window_size: usize,
    /// Rows actually present in the window (≤ window_size).
    pub rows_in_window: usize,
    /// Filled (closed with exit price) trades in the window.
    pub trade_count: usize,
    pub win_rate: f64,
    /// Mean realized pips per filled trade.
    pub expectancy_pips: f64,
    pub gross_profit_pips: f64,
    pub gross_loss_pips: f64,
    /// `None` when gross loss ≈ 0 (undefined); never infinite.
    pub profit_factor: Option<f64>,
    pub max_drawdown_pips: f64,
    /// Running max drawdown ÷ trade count.
    pub drawdown_slope: f64,
    /// Net pips minus spread + slippage paid.
    pub friction_adjusted_pnl_pips: f64,
    pub capture_ratio: f64,
    /// Rejected + blocked rows ÷ rows in window.
    pub rejection_rate: f64,
    /// Shannon entropy (bits) over {enter, skip, blocked}.
    pub decision_entropy: f64,
    /// Mean execution-quality score; `None` without samples.
    pub mean_execution_quality: Option<f64>,
    pub slippage_drift: SlippageDrift,
    /// True when fewer than [`MIN_FILLED_TRADES`] fills forced the neutral default.
    pub neutral_default: bool,
}

impl RollingWindowMetrics {
    /// Neutral default used on cold start: no state transition can be driven by it.
    pub fn neutral(window_size: usize, trade_count: usize) -> Self {
        Self {
            window_size,
            rows_in_window: 0,
            trade_count,
            win_rate: 0.5,
            expectancy_pips: 0.0,
            gross_profit_pips: 0.0,
            gross_loss_pips: 0.0,
            profit_factor: None,
            max_drawdown_pips: 0.0,
            drawdown_slope: 0.0,
            friction_adjusted_pnl_pips: 0.0,
            capture_ratio: 0.5,
            rejection_rate: 0.0,
            decision_entropy: 0.0,
            mean_execution_quality: None,
            slippage_drift: SlippageDrift::none(),
            neutral_default: true,
        }
    }

    /// Profit factor with the 99 / 0 sentinel rule instead of `None`.
    pub fn profit_factor_or_sentinel(&self) -> f64 {
        profit_factor(self.gross_profit_pips, self.gross_loss_pips)
    }
}

/// The three windows the governance state machine consumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernanceWindows {
    pub w20: RollingWindowMetrics,
    pub w50: RollingWindowMetrics,
    pub w200: RollingWindowMetrics,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute 20 / 50 / 200 windows from a newest-first history.
pub fn compute_windows(history: &[TradeRecord]) -> GovernanceWindows {
    GovernanceWindows {
        w20: compute_window(history, WINDOW_SHORT),
        w50: compute_window(history, WINDOW_MEDIUM),
        w200: compute_window(history, WINDOW_LONG),
    }
}

/// Compute one window over the first `window_size` rows of a newest-first history.
///
/// Never fails: with fewer than [`MIN_FILLED_TRADES`] fills the P&L fields take
/// the neutral default (win rate 0.5, expectancy 0, capture 0.5). Decision-mix
/// fields (rejection rate, entropy, execution quality, slippage drift) do not
/// depend on fills and are always computed.
pub fn compute_window(history: &[TradeRecord], window_size: usize) -> RollingWindowMetrics {
    let window = &history[..history.len().min(window_size)];

    // Decision mix over every row.
    let mut buckets = [0usize; 3];
    for r in window {
        let idx = match r.decision_bucket() {
            DecisionBucket::Enter => 0,
            DecisionBucket::Skip => 1,
            DecisionBucket::Blocked => 2,
        };
        buckets[idx] += 1;
    }
    let rejection_rate = if window.is_empty() {
        0.0
    } else {
        buckets[2] as f64 / window.len() as f64
    };
    let decision_entropy = shannon_entropy(&buckets);

    let quality: Vec<f64> = window
        .iter()
        .filter_map(|r| r.execution_quality)
        .filter(|q| q.is_finite())
        .collect();
    let mean_execution_quality = if quality.is_empty() {
        None
    } else {
        Some(quality.iter().sum::<f64>() / quality.len() as f64)
    };

    let slippage: Vec<f64> = window.iter().filter_map(|r| r.slippage_pips).collect();
    let slippage_drift = detect_slippage_drift(&slippage);

    // Filled trades, newest-first.
    let filled: Vec<(&TradeRecord, f64)> = window
        .iter()
        .filter_map(|r| r.realized_pips().map(|p| (r, p)))
        .collect();

    if filled.len() < MIN_FILLED_TRADES {
        return RollingWindowMetrics {
            rows_in_window: window.len(),
            rejection_rate,
            decision_entropy,
            mean_execution_quality,
            slippage_drift,
            ..RollingWindowMetrics::neutral(window_size, filled.len())
        };
    }

    let n = filled.len() as f64;
    let mut wins = 0usize;
    let mut gross_profit = 0.0_f64;
    let mut gross_loss = 0.0_f64;
    let mut net = 0.0_f64;
    let mut friction = 0.0_f64;

    for (r, p) in &filled {
        if *p > 0.0 {
            wins += 1;
            gross_profit += p;
        } else {
            gross_loss += -p;
        }
        net += p;
        friction += r.friction_pips();
    }

    // Drawdown walks the curve oldest-first.
    let chronological: Vec<f64> = filled.iter().rev().map(|(_, p)| *p).collect();
    let max_dd = max_drawdown_pips(&chronological);

    let capture_samples: Vec<(f64, f64)> = filled
        .iter()
        .filter_map(|(r, p)| r.mfe_pips.map(|m| (*p, m)))
        .collect();

    RollingWindowMetrics {
        window_size,
        rows_in_window: window.len(),
        trade_count: filled.len(),
        win_rate: wins as f64 / n,
        expectancy_pips: net / n,
        gross_profit_pips: gross_profit,
        gross_loss_pips: gross_loss,
        profit_factor: profit_factor_opt(gross_profit, gross_loss),
        max_drawdown_pips: max_dd,
        drawdown_slope: max_dd / n,
        friction_adjusted_pnl_pips: net - friction,
        capture_ratio: capture_ratio(&capture_samples),
        rejection_rate,
        decision_entropy,
        mean_execution_quality,
        slippage_drift,
        neutral_default: false,
    }
}
