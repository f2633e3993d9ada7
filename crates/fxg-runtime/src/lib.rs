//! fxg-runtime
//!
//! Wires the five governance components into one evaluation cycle:
//!
//! 1. read trade history (failure aborts the cycle: no trades)
//! 2. rolling windows → governance assessment (learning-phase override included)
//! 3. agent metrics → coalition snapshot, seeded lead selection
//! 4. per proposal: hard blocks, state-adjusted decision, density cap, sizing
//! 5. optional audit events for every step
//!
//! Collaborators (history store, indicator provider, agent aggregation) are
//! traits; the mutable state that survives between cycles lives in an explicit
//! [`GovernanceStore`].

mod collaborators;
mod engine;
mod evaluate;
mod history;
mod policy;
mod store;

pub use collaborators::{
    AgentMetricsSource, Collaborators, MarketDataError, MarketDataProvider, TradeHistorySource,
};
pub use engine::{density_cap, CandidateTrade, CycleReport, GovernanceEngine, ProposalOutcome};
pub use evaluate::{evaluate_under_state, state_context, state_decision_policy};
pub use history::{load_history, pair_performance, sort_newest_first};
pub use policy::{GovernancePolicy, RuntimeConfig};
pub use store::GovernanceStore;
