//! fxg-decision
//!
//! Per-proposal approval pipeline:
//! - Multiplier Composer: seven independent multipliers, each clamped, and
//!   their product (the composite score)
//! - Gate Evaluator: eight named rejection gates, returned as a full list
//! - Decision Combiner: approved / throttled / rejected plus adjusted ranges,
//!   duration window, drawdown cap, governance score and forensics
//!
//! Every function here is pure and side-effect-free. Logging and persistence
//! belong to the caller.

mod combiner;
mod context;
mod gates;
mod multipliers;

pub use combiner::{
    classify_decision, decide, Decision, DecisionPolicy, DurationTable, DurationWindow,
    ExitLatencyGrade, GovernanceResult, HardBlock, ScalpingForensics,
};
pub use context::{GovernanceContext, PnlRange, TradeProposal};
pub use gates::{evaluate_gates, GateId, GateThresholds, TriggeredGate};
pub use multipliers::{
    compose, GovernanceMultipliers, MultiplierBounds, MultiplierTables, PhaseTable, SessionTable,
    SequencingTable,
};
