use fxg_schemas::{SequencingCluster, VolatilityPhase};
use serde::{Deserialize, Serialize};

use crate::context::{pct, GovernanceContext};

/// Closed set of rejection gates. Order here is evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateId {
    FrictionRatio,
    HtfAlignment,
    EdgeDecay,
    SpreadInstability,
    CompressionSession,
    Overtrading,
    LossCluster,
    LiquidityShock,
}

impl GateId {
    pub const ALL: [GateId; 8] = [
        GateId::FrictionRatio,
        GateId::HtfAlignment,
        GateId::EdgeDecay,
        GateId::SpreadInstability,
        GateId::CompressionSession,
        GateId::Overtrading,
        GateId::LossCluster,
        GateId::LiquidityShock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GateId::FrictionRatio => "FRICTION_RATIO",
            GateId::HtfAlignment => "HTF_ALIGNMENT",
            GateId::EdgeDecay => "EDGE_DECAY",
            GateId::SpreadInstability => "SPREAD_INSTABILITY",
            GateId::CompressionSession => "COMPRESSION_SESSION",
            GateId::Overtrading => "OVERTRADING",
            GateId::LossCluster => "LOSS_CLUSTER",
            GateId::LiquidityShock => "LIQUIDITY_SHOCK",
        }
    }
}

impl std::fmt::Display for GateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gate that fired, with a human-readable reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggeredGate {
    pub gate: GateId,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateThresholds {
    /// Friction ratio below this rejects. The runtime replaces it with the
    /// active governance state's friction k.
    pub min_friction_ratio: f64,
    pub htf_min_alignment: f64,
    pub max_edge_decay_pct: f64,
    pub min_spread_stability: f64,
    pub compression_min_aggressiveness: f64,
    pub loss_cluster_min_alignment: f64,
    pub max_liquidity_shock: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            min_friction_ratio: 3.0,
            htf_min_alignment: 35.0,
            max_edge_decay_pct: 20.0,
            min_spread_stability: 30.0,
            compression_min_aggressiveness: 30.0,
            loss_cluster_min_alignment: 55.0,
            max_liquidity_shock: 70.0,
        }
    }
}

/// Evaluate all gates. Returns every gate that fired, never just the first.
pub fn evaluate_gates(t: &GateThresholds, ctx: &GovernanceContext) -> Vec<TriggeredGate> {
    let mut out = Vec::new();
    let mut fire = |gate: GateId, reason: String| out.push(TriggeredGate { gate, reason });

    let alignment = pct(ctx.alignment_score);

    // NaN friction ratio is treated as zero edge.
    let friction_ratio = if ctx.friction_ratio.is_finite() {
        ctx.friction_ratio
    } else {
        0.0
    };
    if friction_ratio < t.min_friction_ratio {
        fire(
            GateId::FrictionRatio,
            format!(
                "friction ratio {:.2} < required {:.2}",
                friction_ratio, t.min_friction_ratio
            ),
        );
    }

    if !ctx.htf_supports && alignment < t.htf_min_alignment {
        fire(
            GateId::HtfAlignment,
            format!(
                "higher timeframe not supportive and alignment {:.0} < {:.0}",
                alignment, t.htf_min_alignment
            ),
        );
    }

    let decay = pct(ctx.edge_decay_pct);
    if ctx.edge_decaying && decay > t.max_edge_decay_pct {
        fire(
            GateId::EdgeDecay,
            format!(
                "edge decaying {:.1}%/window > {:.1}%",
                decay, t.max_edge_decay_pct
            ),
        );
    }

    let spread = pct(ctx.spread_stability_rank);
    if spread < t.min_spread_stability {
        fire(
            GateId::SpreadInstability,
            format!(
                "spread stability rank {:.0} < {:.0}",
                spread, t.min_spread_stability
            ),
        );
    }

    let aggressiveness = pct(ctx.session_aggressiveness);
    if ctx.phase == VolatilityPhase::Compression
        && aggressiveness < t.compression_min_aggressiveness
    {
        fire(
            GateId::CompressionSession,
            format!(
                "compression phase in {} session with aggressiveness {:.0} < {:.0}",
                ctx.session, aggressiveness, t.compression_min_aggressiveness
            ),
        );
    }

    if ctx.overtrading_throttle {
        fire(
            GateId::Overtrading,
            "overtrading throttle active".to_string(),
        );
    }

    if ctx.sequencing == SequencingCluster::LossCluster && alignment < t.loss_cluster_min_alignment
    {
        fire(
            GateId::LossCluster,
            format!(
                "loss cluster with alignment {:.0} < {:.0}",
                alignment, t.loss_cluster_min_alignment
            ),
        );
    }

    let shock = pct(ctx.liquidity_shock_prob);
    if shock > t.max_liquidity_shock && ctx.phase != VolatilityPhase::Ignition {
        fire(
            GateId::LiquidityShock,
            format!(
                "liquidity shock probability {:.0}% > {:.0}% outside ignition",
                shock, t.max_liquidity_shock
            ),
        );
    }

    out
}
