use fxg_schemas::{AgentRole, Direction};
use serde::{Deserialize, Serialize};

use crate::agent::AgentStats;

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentTier {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B-Rescued")]
    BRescued,
    #[serde(rename = "B-Promotable")]
    BPromotable,
    #[serde(rename = "B-Shadow")]
    BShadow,
    #[serde(rename = "B-Legacy")]
    BLegacy,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
}

impl AgentTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentTier::A => "A",
            AgentTier::BRescued => "B-Rescued",
            AgentTier::BPromotable => "B-Promotable",
            AgentTier::BShadow => "B-Shadow",
            AgentTier::BLegacy => "B-Legacy",
            AgentTier::C => "C",
            AgentTier::D => "D",
        }
    }

    /// Tiers that go live without promotion.
    pub fn is_eligible(&self) -> bool {
        matches!(
            self,
            AgentTier::A | AgentTier::BPromotable | AgentTier::BRescued | AgentTier::BLegacy
        )
    }
}

impl std::fmt::Display for AgentTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentState {
    Deploy,
    Reduced,
    Shadow,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Fleet {
    Active,
    Bench,
    Shadow,
}

/// Tier cut-offs. Defaults are the production values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub table_version: String,

    /// Below this many trades an agent is observed, not rated.
    pub min_rated_trades: u64,

    pub a_min_trades: u64,
    pub a_min_profit_factor: f64,
    pub a_min_win_rate: f64,

    pub promotable_min_profit_factor: f64,

    pub rescue_min_side_trades: u64,
    pub rescue_min_side_profit_factor: f64,

    pub legacy_min_profit_factor: f64,
    pub c_min_profit_factor: f64,

    /// Bench admission: expectancy ≥ this, or PF ≥ `bench_min_profit_factor`.
    pub bench_min_expectancy_pips: f64,
    pub bench_min_profit_factor: f64,

    pub a_size: f64,
    pub promotable_size: f64,
    pub rescued_size: f64,
    pub legacy_size: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            table_version: "tiers/v1".to_string(),
            min_rated_trades: 20,
            a_min_trades: 50,
            a_min_profit_factor: 1.30,
            a_min_win_rate: 0.50,
            promotable_min_profit_factor: 1.05,
            rescue_min_side_trades: 10,
            rescue_min_side_profit_factor: 1.10,
            legacy_min_profit_factor: 0.95,
            c_min_profit_factor: 0.80,
            bench_min_expectancy_pips: 0.0,
            bench_min_profit_factor: 0.95,
            a_size: 1.0,
            promotable_size: 0.75,
            rescued_size: 0.5,
            legacy_size: 0.5,
        }
    }
}

/// Tier plus, for B-Rescued, the only side the agent may trade.
pub fn classify_tier(t: &TierThresholds, s: &AgentStats) -> (AgentTier, Option<Direction>) {
    if s.trades < t.min_rated_trades {
        return (AgentTier::BShadow, None);
    }

    let pf = s.profit_factor_or_sentinel();
    let expectancy = s.expectancy_pips();

    if s.trades >= t.a_min_trades
        && pf >= t.a_min_profit_factor
        && s.win_rate() >= t.a_min_win_rate
        && expectancy > 0.0
    {
        return (AgentTier::A, None);
    }
    if pf >= t.promotable_min_profit_factor && expectancy > 0.0 {
        return (AgentTier::BPromotable, None);
    }

    // Direction-split rescue: pick the stronger qualifying side.
    let side_ok = |side: &crate::agent::SideStats| {
        side.trades >= t.rescue_min_side_trades
            && side.profit_factor() >= t.rescue_min_side_profit_factor
    };
    let long_ok = side_ok(&s.long);
    let short_ok = side_ok(&s.short);
    match (long_ok, short_ok) {
        (true, true) => {
            let side = if s.long.profit_factor() >= s.short.profit_factor() {
                Direction::Long
            } else {
                Direction::Short
            };
            return (AgentTier::BRescued, Some(side));
        }
        (true, false) => return (AgentTier::BRescued, Some(Direction::Long)),
        (false, true) => return (AgentTier::BRescued, Some(Direction::Short)),
        (false, false) => {}
    }

    if s.legacy && pf >= t.legacy_min_profit_factor {
        return (AgentTier::BLegacy, None);
    }
    if pf >= t.c_min_profit_factor {
        return (AgentTier::C, None);
    }
    (AgentTier::D, None)
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub trades: u64,
    pub win_rate: f64,
    pub expectancy_pips: f64,
    pub profit_factor: Option<f64>,
    pub net_pips: f64,
}

impl AgentMetrics {
    pub fn from_stats(s: &AgentStats) -> Self {
        Self {
            trades: s.trades,
            win_rate: s.win_rate(),
            expectancy_pips: s.expectancy_pips(),
            profit_factor: s.profit_factor(),
            net_pips: s.net_pips(),
        }
    }

    pub fn profit_factor_or_sentinel(&self) -> f64 {
        match self.profit_factor {
            Some(pf) => pf,
            None if self.net_pips > 0.0 => fxg_metrics::PROFIT_FACTOR_SENTINEL,
            None => 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: String,
    pub fleet: Fleet,
    pub tier: AgentTier,
    pub deployment: DeploymentState,
    pub size_multiplier: f64,
    pub eligible: bool,
    /// Set once the agent is part of the live coalition.
    pub role: Option<AgentRole>,
    pub constraints: Vec<String>,
    pub metrics: AgentMetrics,
}

impl AgentSnapshot {
    pub fn is_live(&self) -> bool {
        self.role.is_some()
    }

    /// Direction restriction from a `long-only` / `short-only` constraint.
    pub fn allowed_direction(&self) -> Option<Direction> {
        if self.constraints.iter().any(|c| c == "long-only") {
            Some(Direction::Long)
        } else if self.constraints.iter().any(|c| c == "short-only") {
            Some(Direction::Short)
        } else {
            None
        }
    }
}

/// Build one agent's snapshot from its aggregate.
pub fn snapshot_agent(t: &TierThresholds, s: &AgentStats) -> AgentSnapshot {
    let (tier, side) = classify_tier(t, s);
    let metrics = AgentMetrics::from_stats(s);

    let (deployment, size_multiplier) = match tier {
        AgentTier::A => (DeploymentState::Deploy, t.a_size),
        AgentTier::BPromotable => (DeploymentState::Deploy, t.promotable_size),
        AgentTier::BRescued => (DeploymentState::Reduced, t.rescued_size),
        AgentTier::BLegacy => (DeploymentState::Reduced, t.legacy_size),
        AgentTier::BShadow | AgentTier::C => (DeploymentState::Shadow, 0.0),
        AgentTier::D => (DeploymentState::Disabled, 0.0),
    };

    let mut constraints = Vec::new();
    match side {
        Some(Direction::Long) => constraints.push("long-only".to_string()),
        Some(Direction::Short) => constraints.push("short-only".to_string()),
        None => {}
    }
    if deployment == DeploymentState::Reduced {
        constraints.push("reduced-size".to_string());
    }
    if tier == AgentTier::BLegacy {
        constraints.push("legacy".to_string());
    }

    let eligible = tier.is_eligible();
    let non_destructive = metrics.expectancy_pips >= t.bench_min_expectancy_pips
        || metrics.profit_factor_or_sentinel() >= t.bench_min_profit_factor;
    let fleet = if eligible {
        Fleet::Active
    } else if non_destructive && !matches!(tier, AgentTier::D | AgentTier::BShadow) {
        Fleet::Bench
    } else {
        Fleet::Shadow
    };

    AgentSnapshot {
        agent_id: s.agent_id.clone(),
        fleet,
        tier,
        deployment,
        size_multiplier,
        eligible,
        role: None,
        constraints,
        metrics,
    }
}
