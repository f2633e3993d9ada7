//! Seams to the systems the engine does not own.
//!
//! The persistence layer, the indicator/market-data provider and the agent
//! metrics aggregation all live outside this workspace. The engine only sees
//! these traits.

use fxg_coalition::AgentStats;
use fxg_decision::{GovernanceContext, TradeProposal};
use fxg_schemas::{Pair, TradeRecord};

/// Trade-history rows, newest first.
pub trait TradeHistorySource {
    /// At most `limit` of the most recent rows, newest first.
    fn recent_trades(&self, limit: usize) -> anyhow::Result<Vec<TradeRecord>>;

    /// Lifetime count of filled trades (drives the learning phase).
    fn total_trades(&self) -> anyhow::Result<u64>;
}

/// Why a governance context could not be built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarketDataError {
    /// Provider unreachable or returned an error.
    Unavailable { provider: String, detail: String },
    /// Newest indicator snapshot is older than the provider's freshness limit.
    Stale { pair: Pair, age_secs: i64 },
    /// Timeframes disagree; there is no consensus direction to report.
    NoConsensus { pair: Pair },
}

impl std::fmt::Display for MarketDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { provider, detail } => {
                write!(f, "provider '{provider}' unavailable: {detail}")
            }
            Self::Stale { pair, age_secs } => {
                write!(
                    f,
                    "indicator snapshot for {pair} is stale ({age_secs}s old)"
                )
            }
            Self::NoConsensus { pair } => {
                write!(f, "no timeframe consensus for {pair}")
            }
        }
    }
}

impl std::error::Error for MarketDataError {}

/// Builds the per-proposal governance context from live indicators.
pub trait MarketDataProvider {
    fn context_for(&self, proposal: &TradeProposal) -> Result<GovernanceContext, MarketDataError>;
}

/// Per-agent aggregates from the history store.
pub trait AgentMetricsSource {
    fn agent_stats(&self) -> anyhow::Result<Vec<AgentStats>>;
}

/// The three collaborators one cycle reads from.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub history: &'a dyn TradeHistorySource,
    pub market: &'a dyn MarketDataProvider,
    pub agents: &'a dyn AgentMetricsSource,
}
