use std::collections::BTreeMap;

use fxg_schemas::{AgentRole, Pair, VolatilityPhase};
use serde::{Deserialize, Serialize};

// ─── Bounds ──────────────────────────────────────────────────────────────────

/// Inclusive clamp range for one sizing multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Finite and ordered.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// NaN maps to the lower bound. Reversed bounds are read in order.
    pub fn clamp(&self, v: f64) -> f64 {
        let lo = self.min.min(self.max);
        let hi = self.max.max(self.min);
        if v.is_nan() {
            lo
        } else {
            v.max(lo).min(hi)
        }
    }
}

// ─── Lookup tables ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleFactors {
    pub lead: f64,
    pub confirming: f64,
    pub support: f64,
}

impl Default for RoleFactors {
    fn default() -> Self {
        Self {
            lead: 1.0,
            confirming: 0.85,
            support: 0.5,
        }
    }
}

impl RoleFactors {
    pub fn get(&self, role: AgentRole) -> f64 {
        match role {
            AgentRole::Lead => self.lead,
            AgentRole::Confirming => self.confirming,
            AgentRole::Support => self.support,
        }
    }
}

/// Known deployment environment for a (pair, session, regime) combination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryEnvironment {
    /// Historically loses money here.
    Destructive,
    #[default]
    Neutral,
    /// Historically strong edge here.
    Edge,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryTable {
    pub destructive: f64,
    pub neutral: f64,
    pub edge: f64,
}

impl Default for DiscoveryTable {
    fn default() -> Self {
        Self {
            destructive: 0.5,
            neutral: 1.0,
            edge: 1.2,
        }
    }
}

impl DiscoveryTable {
    pub fn get(&self, env: DiscoveryEnvironment) -> f64 {
        match env {
            DiscoveryEnvironment::Destructive => self.destructive,
            DiscoveryEnvironment::Neutral => self.neutral,
            DiscoveryEnvironment::Edge => self.edge,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KellyPolicy {
    /// Fraction of full Kelly actually used.
    pub fraction: f64,
    /// Fractional-Kelly value that maps to a 1.0 multiplier.
    pub reference: f64,
    pub compression: f64,
    pub ignition: f64,
    pub expansion: f64,
    pub exhaustion: f64,
}

impl Default for KellyPolicy {
    fn default() -> Self {
        Self {
            fraction: 0.25,
            reference: 0.05,
            compression: 0.8,
            ignition: 1.2,
            expansion: 1.1,
            exhaustion: 0.7,
        }
    }
}

impl KellyPolicy {
    pub fn phase_weight(&self, phase: VolatilityPhase) -> f64 {
        match phase {
            VolatilityPhase::Compression => self.compression,
            VolatilityPhase::Ignition => self.ignition,
            VolatilityPhase::Expansion => self.expansion,
            VolatilityPhase::Exhaustion => self.exhaustion,
        }
    }
}

/// Rolling per-pair performance feeding the pair capital multiplier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairPerformance {
    pub trades: usize,
    pub win_rate: f64,
    pub expectancy_pips: f64,
    /// Per-trade Sharpe (mean ÷ stdev of realized pips); None with < 2 trades.
    pub sharpe: Option<f64>,
}

// ─── SizingPolicy ────────────────────────────────────────────────────────────

/// Every constant the sizing stack uses. Versioned so a config change is
/// visible in audit output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingPolicy {
    pub table_version: String,

    /// Fraction of balance risked at the reference confidence.
    pub base_risk_fraction: f64,
    pub reference_confidence: f64,
    pub stop_pips: f64,
    pub default_atr_multiplier: f64,
    /// Keyed by `BASE/QUOTE`.
    pub atr_multipliers: BTreeMap<String, f64>,

    pub state_bounds: Bounds,
    pub pair_bounds: Bounds,
    pub session_bounds: Bounds,
    pub agent_bounds: Bounds,
    pub regime_bounds: Bounds,
    pub discovery_bounds: Bounds,

    pub throttle_factor: f64,
    pub min_units: u32,
    pub max_units: u32,

    /// Below this many pair trades the pair multiplier stays neutral.
    pub pair_min_trades: usize,

    pub roles: RoleFactors,
    pub discovery: DiscoveryTable,
    pub kelly: KellyPolicy,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        let mut atr_multipliers = BTreeMap::new();
        atr_multipliers.insert("EUR/USD".to_string(), 1.2);
        atr_multipliers.insert("USD/JPY".to_string(), 1.3);
        atr_multipliers.insert("GBP/USD".to_string(), 1.5);
        atr_multipliers.insert("GBP/JPY".to_string(), 2.0);
        atr_multipliers.insert("EUR/JPY".to_string(), 1.8);

        Self {
            table_version: "sizing/v1".to_string(),
            base_risk_fraction: 0.005,
            reference_confidence: 80.0,
            stop_pips: 10.0,
            default_atr_multiplier: 1.5,
            atr_multipliers,

            state_bounds: Bounds::new(0.20, 1.00),
            pair_bounds: Bounds::new(0.50, 1.50),
            session_bounds: Bounds::new(0.10, 1.00),
            agent_bounds: Bounds::new(0.10, 1.50),
            regime_bounds: Bounds::new(0.25, 1.50),
            discovery_bounds: Bounds::new(0.25, 1.25),

            throttle_factor: 0.5,
            min_units: 500,
            max_units: 5000,

            pair_min_trades: 10,

            roles: RoleFactors::default(),
            discovery: DiscoveryTable::default(),
            kelly: KellyPolicy::default(),
        }
    }
}

impl SizingPolicy {
    /// Name and value of every bound the stack clamps with.
    pub fn bounds(&self) -> [(&'static str, Bounds); 6] {
        [
            ("state_bounds", self.state_bounds),
            ("pair_bounds", self.pair_bounds),
            ("session_bounds", self.session_bounds),
            ("agent_bounds", self.agent_bounds),
            ("regime_bounds", self.regime_bounds),
            ("discovery_bounds", self.discovery_bounds),
        ]
    }

    pub fn atr_multiplier(&self, pair: &Pair) -> f64 {
        self.atr_multipliers
            .get(pair.as_str())
            .copied()
            .unwrap_or(self.default_atr_multiplier)
    }
}
