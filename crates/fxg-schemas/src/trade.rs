use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Direction, Pair, Session};

/// Lifecycle status of a trade-history row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Filled and still open.
    Open,
    /// Filled and closed; realized P&L is known.
    Closed,
    /// Proposal rejected by governance.
    Rejected,
    /// Proposal skipped (no signal / throttled away).
    Skipped,
    /// Blocked before evaluation (upstream outage, coalition shortfall, ...).
    Blocked,
}

/// Coarse decision bucket used for the decision-distribution entropy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionBucket {
    Enter,
    Skip,
    Blocked,
}

/// One row from the trade-history collaborator.
///
/// Histories are handed to the metrics engine **newest-first**.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    pub pair: Pair,
    pub direction: Direction,
    pub status: TradeStatus,
    pub entry_price: f64,
    #[serde(default)]
    pub exit_price: Option<f64>,
    pub opened_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub regime: Option<String>,
    /// Execution-quality score (0–100) assigned by the execution wrapper.
    #[serde(default)]
    pub execution_quality: Option<f64>,
    #[serde(default)]
    pub slippage_pips: Option<f64>,
    #[serde(default)]
    pub spread_pips: Option<f64>,
    /// Maximum favourable excursion while the trade was open, in pips.
    #[serde(default)]
    pub mfe_pips: Option<f64>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

impl TradeRecord {
    /// Closed with a known exit price.
    pub fn is_filled(&self) -> bool {
        self.status == TradeStatus::Closed && self.exit_price.is_some()
    }

    /// Signed realized P&L in pips; `None` unless the row is filled.
    pub fn realized_pips(&self) -> Option<f64> {
        if !self.is_filled() {
            return None;
        }
        let exit = self.exit_price?;
        let pips = self.pair.to_pips(exit - self.entry_price) * self.direction.sign();
        pips.is_finite().then_some(pips)
    }

    /// Spread + slippage paid on this row, in pips (missing samples count as 0).
    pub fn friction_pips(&self) -> f64 {
        let spread = self.spread_pips.filter(|v| v.is_finite()).unwrap_or(0.0);
        let slip = self.slippage_pips.filter(|v| v.is_finite()).unwrap_or(0.0);
        spread.abs() + slip.abs()
    }

    pub fn decision_bucket(&self) -> DecisionBucket {
        match self.status {
            TradeStatus::Open | TradeStatus::Closed => DecisionBucket::Enter,
            TradeStatus::Skipped => DecisionBucket::Skip,
            TradeStatus::Rejected | TradeStatus::Blocked => DecisionBucket::Blocked,
        }
    }
}
