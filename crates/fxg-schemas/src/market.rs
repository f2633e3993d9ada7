use serde::{Deserialize, Serialize};

/// Trade direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

/// FX trading session buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Session {
    Asian,
    LondonOpen,
    NyOverlap,
    LateNy,
}

impl Session {
    pub const ALL: [Session; 4] = [
        Session::Asian,
        Session::LondonOpen,
        Session::NyOverlap,
        Session::LateNy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Asian => "asian",
            Session::LondonOpen => "london-open",
            Session::NyOverlap => "ny-overlap",
            Session::LateNy => "late-ny",
        }
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volatility cycle phase reported by the indicator collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityPhase {
    Compression,
    Ignition,
    Expansion,
    Exhaustion,
}

impl VolatilityPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityPhase::Compression => "compression",
            VolatilityPhase::Ignition => "ignition",
            VolatilityPhase::Expansion => "expansion",
            VolatilityPhase::Exhaustion => "exhaustion",
        }
    }
}

impl std::fmt::Display for VolatilityPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recent win/loss sequencing state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequencingCluster {
    ProfitMomentum,
    LossCluster,
    Mixed,
    Neutral,
}

/// Role an agent plays inside an executing coalition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentRole {
    /// May set trade direction.
    Lead,
    /// Directional agent that concurs with the lead.
    Confirming,
    /// Non-directional filter agent; never sets direction.
    Support,
}

impl AgentRole {
    pub fn is_directional(self) -> bool {
        !matches!(self, AgentRole::Support)
    }
}
