use std::collections::BTreeMap;

use fxg_schemas::{Pair, Session};
use serde::{Deserialize, Serialize};

use crate::GovernanceState;

/// Which pairs a state allows to trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairRestriction {
    None,
    MajorsOnly,
}

impl PairRestriction {
    pub fn allows(&self, pair: &Pair) -> bool {
        match self {
            PairRestriction::None => true,
            PairRestriction::MajorsOnly => pair.is_major(),
        }
    }
}

/// Per-state configuration bundle. Read-only lookup data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernanceStateConfig {
    /// Scales the number of executable approvals per cycle.
    pub density_multiplier: f64,
    /// First multiplier of the position-sizing stack.
    pub sizing_multiplier: f64,
    /// Minimum friction ratio the friction gate demands in this state.
    pub friction_k_override: f64,
    pub pair_restriction: PairRestriction,
    /// Session → aggressiveness in [0, 1]. 0 means the session is auto-blocked.
    pub session_aggressiveness: BTreeMap<Session, f64>,
    /// What has to improve before the machine steps back down.
    pub recovery_conditions: Vec<String>,
}

impl GovernanceStateConfig {
    /// Aggressiveness for a session; sessions missing from the map count as 0.
    pub fn aggressiveness(&self, session: Session) -> f64 {
        self.session_aggressiveness
            .get(&session)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }

    pub fn session_blocked(&self, session: Session) -> bool {
        self.aggressiveness(session) <= 0.0
    }
}

fn sessions(asian: f64, london_open: f64, ny_overlap: f64, late_ny: f64) -> BTreeMap<Session, f64> {
    BTreeMap::from([
        (Session::Asian, asian),
        (Session::LondonOpen, london_open),
        (Session::NyOverlap, ny_overlap),
        (Session::LateNy, late_ny),
    ])
}

fn conditions(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Versioned lookup table keyed by governance state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateTable {
    pub table_version: String,
    pub normal: GovernanceStateConfig,
    pub defensive: GovernanceStateConfig,
    pub throttled: GovernanceStateConfig,
    pub halt: GovernanceStateConfig,
}

impl StateTable {
    pub fn config_for(&self, state: GovernanceState) -> &GovernanceStateConfig {
        match state {
            GovernanceState::Normal => &self.normal,
            GovernanceState::Defensive => &self.defensive,
            GovernanceState::Throttled => &self.throttled,
            GovernanceState::Halt => &self.halt,
        }
    }
}

impl Default for StateTable {
    fn default() -> Self {
        Self {
            table_version: "state-table/v1".to_string(),
            normal: GovernanceStateConfig {
                density_multiplier: 1.00,
                sizing_multiplier: 1.00,
                friction_k_override: 3.0,
                pair_restriction: PairRestriction::None,
                session_aggressiveness: sessions(0.60, 1.00, 0.95, 0.45),
                recovery_conditions: Vec::new(),
            },
            defensive: GovernanceStateConfig {
                density_multiplier: 0.70,
                sizing_multiplier: 0.75,
                friction_k_override: 3.5,
                pair_restriction: PairRestriction::None,
                session_aggressiveness: sessions(0.40, 0.85, 0.80, 0.25),
                recovery_conditions: conditions(&[
                    "50-trade expectancy back above 0 pips",
                    "200-trade capture ratio back above 30%",
                ]),
            },
            throttled: GovernanceStateConfig {
                density_multiplier: 0.45,
                sizing_multiplier: 0.50,
                friction_k_override: 4.0,
                pair_restriction: PairRestriction::MajorsOnly,
                session_aggressiveness: sessions(0.20, 0.70, 0.65, 0.00),
                recovery_conditions: conditions(&[
                    "50-trade win rate back above 35%",
                    "50-trade expectancy back above -1.5 pips",
                ]),
            },
            halt: GovernanceStateConfig {
                density_multiplier: 0.20,
                sizing_multiplier: 0.25,
                friction_k_override: 4.5,
                pair_restriction: PairRestriction::MajorsOnly,
                session_aggressiveness: sessions(0.00, 0.50, 0.45, 0.00),
                recovery_conditions: conditions(&[
                    "20-trade win rate above 20% or expectancy above -5 pips",
                    "50-trade friction-adjusted P&L above -100 pips",
                ]),
            },
        }
    }
}
