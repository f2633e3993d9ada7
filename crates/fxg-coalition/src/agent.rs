use fxg_metrics::{profit_factor, profit_factor_opt};
use serde::{Deserialize, Serialize};

/// Totals for one side (long or short) of an agent's history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideStats {
    pub trades: u64,
    pub gross_profit_pips: f64,
    pub gross_loss_pips: f64,
}

impl SideStats {
    pub fn net_pips(&self) -> f64 {
        self.gross_profit_pips - self.gross_loss_pips
    }

    pub fn profit_factor(&self) -> f64 {
        profit_factor(self.gross_profit_pips, self.gross_loss_pips)
    }
}

/// Per-agent aggregate as returned by the agent-metrics collaborator.
///
/// Gross loss is a positive magnitude.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub agent_id: String,
    #[serde(default)]
    pub trades: u64,
    #[serde(default)]
    pub wins: u64,
    #[serde(default)]
    pub losses: u64,
    #[serde(default)]
    pub gross_profit_pips: f64,
    #[serde(default)]
    pub gross_loss_pips: f64,
    #[serde(default)]
    pub long: SideStats,
    #[serde(default)]
    pub short: SideStats,
    /// Grandfathered agent from a previous strategy generation.
    #[serde(default)]
    pub legacy: bool,
}

impl AgentStats {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            ..Self::default()
        }
    }

    pub fn net_pips(&self) -> f64 {
        self.gross_profit_pips - self.gross_loss_pips
    }

    pub fn win_rate(&self) -> f64 {
        if self.trades == 0 {
            0.0
        } else {
            self.wins as f64 / self.trades as f64
        }
    }

    pub fn expectancy_pips(&self) -> f64 {
        if self.trades == 0 {
            0.0
        } else {
            self.net_pips() / self.trades as f64
        }
    }

    /// None when gross loss ≈ 0.
    pub fn profit_factor(&self) -> Option<f64> {
        profit_factor_opt(self.gross_profit_pips, self.gross_loss_pips)
    }

    /// Sentinel rule: 99 when only profits, 0 when nothing.
    pub fn profit_factor_or_sentinel(&self) -> f64 {
        profit_factor(self.gross_profit_pips, self.gross_loss_pips)
    }
}
