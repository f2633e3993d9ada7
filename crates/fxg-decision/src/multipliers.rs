use fxg_schemas::{SequencingCluster, Session, VolatilityPhase, EPSILON};
use serde::{Deserialize, Serialize};

use crate::context::{pct, GovernanceContext};

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Clamp range applied to every individual multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplierBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for MultiplierBounds {
    fn default() -> Self {
        Self {
            min: 0.30,
            max: 1.60,
        }
    }
}

impl MultiplierBounds {
    /// Finite, ordered, and strictly positive so the composite never hits zero.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }

    /// NaN maps to the lower bound. The floor never drops below `EPSILON`.
    pub fn clamp(&self, v: f64) -> f64 {
        let lo = self.min.min(self.max).max(EPSILON);
        let hi = self.max.max(self.min).max(lo);
        if v.is_nan() {
            lo
        } else {
            v.max(lo).min(hi)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseTable {
    pub compression: f64,
    pub ignition: f64,
    pub expansion: f64,
    pub exhaustion: f64,
}

impl PhaseTable {
    pub fn get(&self, phase: VolatilityPhase) -> f64 {
        match phase {
            VolatilityPhase::Compression => self.compression,
            VolatilityPhase::Ignition => self.ignition,
            VolatilityPhase::Expansion => self.expansion,
            VolatilityPhase::Exhaustion => self.exhaustion,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionTable {
    pub asian: f64,
    pub london_open: f64,
    pub ny_overlap: f64,
    pub late_ny: f64,
}

impl SessionTable {
    pub fn get(&self, session: Session) -> f64 {
        match session {
            Session::Asian => self.asian,
            Session::LondonOpen => self.london_open,
            Session::NyOverlap => self.ny_overlap,
            Session::LateNy => self.late_ny,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequencingTable {
    pub profit_momentum: f64,
    pub loss_cluster: f64,
    pub mixed: f64,
    pub neutral: f64,
}

impl SequencingTable {
    pub fn get(&self, cluster: SequencingCluster) -> f64 {
        match cluster {
            SequencingCluster::ProfitMomentum => self.profit_momentum,
            SequencingCluster::LossCluster => self.loss_cluster,
            SequencingCluster::Mixed => self.mixed,
            SequencingCluster::Neutral => self.neutral,
        }
    }
}

/// Versioned multiplier tables. Any subset may be overridden from config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplierTables {
    pub table_version: String,
    pub bounds: MultiplierBounds,

    // Alignment: all three timeframes confirm → [full_min, full_max] by score.
    pub alignment_full_min: f64,
    pub alignment_full_max: f64,
    pub alignment_two_htf_base: f64,
    pub alignment_two_htf_span: f64,
    pub alignment_two_base: f64,
    pub alignment_two_span: f64,
    pub alignment_one: f64,
    pub alignment_none: f64,

    pub regime_base: PhaseTable,
    /// Regime multiplier at zero phase confidence, as a fraction of the base.
    pub regime_confidence_floor: f64,

    pub pair_major: f64,
    pub pair_minor: f64,
    pub pair_favored_rank: f64,

    /// Friction ratios above this add nothing to microstructure.
    pub micro_friction_cap: f64,
    pub micro_shock_threshold: f64,
    pub micro_max_shock_penalty: f64,

    pub exit_base: PhaseTable,

    pub session: SessionTable,
    pub sequencing: SequencingTable,
}

impl Default for MultiplierTables {
    fn default() -> Self {
        Self {
            table_version: "multipliers/v1".to_string(),
            bounds: MultiplierBounds::default(),

            alignment_full_min: 1.18,
            alignment_full_max: 1.35,
            alignment_two_htf_base: 1.00,
            alignment_two_htf_span: 0.08,
            alignment_two_base: 0.90,
            alignment_two_span: 0.05,
            alignment_one: 0.72,
            alignment_none: 0.55,

            regime_base: PhaseTable {
                compression: 0.55,
                ignition: 1.35,
                expansion: 1.25,
                exhaustion: 0.65,
            },
            regime_confidence_floor: 0.75,

            pair_major: 1.08,
            pair_minor: 0.92,
            pair_favored_rank: 70.0,

            micro_friction_cap: 6.0,
            micro_shock_threshold: 55.0,
            micro_max_shock_penalty: 0.22,

            exit_base: PhaseTable {
                compression: 0.72,
                ignition: 1.20,
                expansion: 1.15,
                exhaustion: 0.78,
            },

            session: SessionTable {
                asian: 0.78,
                london_open: 1.18,
                ny_overlap: 1.12,
                late_ny: 0.68,
            },
            sequencing: SequencingTable {
                profit_momentum: 1.12,
                loss_cluster: 0.70,
                mixed: 0.85,
                neutral: 1.00,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Multipliers
// ---------------------------------------------------------------------------

/// The seven multipliers and their product.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernanceMultipliers {
    pub alignment: f64,
    pub regime: f64,
    pub pair_performance: f64,
    pub microstructure: f64,
    pub exit_efficiency: f64,
    pub session: f64,
    pub sequencing: f64,
    pub composite: f64,
}

impl GovernanceMultipliers {
    pub fn factors(&self) -> [f64; 7] {
        [
            self.alignment,
            self.regime,
            self.pair_performance,
            self.microstructure,
            self.exit_efficiency,
            self.session,
            self.sequencing,
        ]
    }
}

/// Compute every multiplier for `ctx`. Each is clamped to `tables.bounds`;
/// the composite is their exact product.
pub fn compose(tables: &MultiplierTables, ctx: &GovernanceContext) -> GovernanceMultipliers {
    let b = &tables.bounds;
    let alignment = b.clamp(alignment(tables, ctx));
    let regime = b.clamp(regime(tables, ctx));
    let pair_performance = b.clamp(pair_performance(tables, ctx));
    let microstructure = b.clamp(microstructure(tables, ctx));
    let exit_efficiency = b.clamp(exit_efficiency(tables, ctx));
    let session = b.clamp(tables.session.get(ctx.session));
    let sequencing = b.clamp(tables.sequencing.get(ctx.sequencing));

    GovernanceMultipliers {
        alignment,
        regime,
        pair_performance,
        microstructure,
        exit_efficiency,
        session,
        sequencing,
        composite: alignment
            * regime
            * pair_performance
            * microstructure
            * exit_efficiency
            * session
            * sequencing,
    }
}

fn alignment(t: &MultiplierTables, ctx: &GovernanceContext) -> f64 {
    let s = pct(ctx.alignment_score) / 100.0;
    let confirmations = [ctx.htf_supports, ctx.mtf_confirms, ctx.ltf_clean]
        .iter()
        .filter(|c| **c)
        .count();

    match confirmations {
        3 => t.alignment_full_min + (t.alignment_full_max - t.alignment_full_min) * s,
        2 if ctx.htf_supports => t.alignment_two_htf_base + t.alignment_two_htf_span * s,
        2 => t.alignment_two_base + t.alignment_two_span * s,
        1 => t.alignment_one,
        _ => t.alignment_none,
    }
}

fn regime(t: &MultiplierTables, ctx: &GovernanceContext) -> f64 {
    let conf = pct(ctx.phase_confidence) / 100.0;
    let floor = t.regime_confidence_floor;
    t.regime_base.get(ctx.phase) * (floor + (1.0 - floor) * conf)
}

fn pair_performance(t: &MultiplierTables, ctx: &GovernanceContext) -> f64 {
    let class = if ctx.is_major_pair {
        t.pair_major
    } else {
        t.pair_minor
    };

    let r = pct(ctx.pair_expectancy);
    let fav = t.pair_favored_rank;
    let rank = if ctx.pair_favored && r >= fav {
        1.10 + (r - fav) / (100.0 - fav).max(1.0) * 0.10
    } else if r >= 50.0 {
        1.0 + (r - 50.0) / 50.0 * 0.08
    } else if r >= 30.0 {
        0.90 + (r - 30.0) / 20.0 * 0.10
    } else {
        0.80
    };

    class * rank
}

fn microstructure(t: &MultiplierTables, ctx: &GovernanceContext) -> f64 {
    let spread = 0.70 + 0.60 * pct(ctx.spread_stability_rank) / 100.0;

    let cap = t.micro_friction_cap.max(f64::EPSILON);
    let fr = if ctx.friction_ratio.is_finite() {
        ctx.friction_ratio.clamp(0.0, cap) / cap
    } else {
        0.0
    };
    let friction = 0.70 + 0.60 * fr;

    let blended = (spread + friction) / 2.0;

    let shock = pct(ctx.liquidity_shock_prob);
    if shock > t.micro_shock_threshold {
        let span = (100.0 - t.micro_shock_threshold).max(1.0);
        let severity = ((shock - t.micro_shock_threshold) / span).min(1.0);
        blended * (1.0 - t.micro_max_shock_penalty * severity)
    } else {
        blended
    }
}

fn exit_efficiency(t: &MultiplierTables, ctx: &GovernanceContext) -> f64 {
    t.exit_base.get(ctx.phase) * (0.85 + 0.15 * pct(ctx.spread_stability_rank) / 100.0)
}
