//! Fixtures, builders and in-memory collaborators for the scenario tests.
//!
//! Nothing here is used by production code paths.

mod agents;
mod collaborators;
mod fixtures;
mod history;

pub use agents::{agent, AgentStatsBuilder};
pub use collaborators::{FailingHistory, StaticAgents, StaticHistory, StaticMarket};
pub use fixtures::{candidate, cycle_clock, proposal, strong_context, window, ContextBuilder};
pub use history::{write_history_csv, write_history_json, TradeHistoryBuilder};
