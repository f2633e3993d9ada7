//! fxg-governance
//!
//! Governance State Machine.
//!
//! - Four states ordered by severity: NORMAL < DEFENSIVE < THROTTLED < HALT
//! - Top-down evaluation over the 20 / 50 / 200 trade windows; most severe wins
//! - Static per-state configuration table (density, sizing, friction k,
//!   pair restriction, session aggressiveness, recovery conditions)
//! - Learning-phase override: below the trade milestone the effective state
//!   is always NORMAL; execution-quality warnings still surface
//!
//! HALT does not stop trading. It caps density and sizing at minimum viable
//! levels; the execution wrapper keeps evaluating proposals.
//!
//! Deterministic, pure logic. No IO, no time.

mod machine;
mod state;
mod table;

pub use machine::{
    assess_governance, determine_state, GovernanceAssessment, GovernanceConfig,
    GovernanceThresholds, LearningPhasePolicy,
};
pub use state::GovernanceState;
pub use table::{GovernanceStateConfig, PairRestriction, StateTable};
