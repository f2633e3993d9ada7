use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use fxg_coalition::AgentStats;
use fxg_decision::{GovernanceContext, TradeProposal};
use fxg_runtime::{AgentMetricsSource, MarketDataError, MarketDataProvider, TradeHistorySource};
use fxg_schemas::{Pair, TradeRecord};

/// Fixed history rows (newest first).
#[derive(Clone, Debug, Default)]
pub struct StaticHistory {
    rows: Vec<TradeRecord>,
    total: Option<u64>,
}

impl StaticHistory {
    pub fn new(rows: Vec<TradeRecord>) -> Self {
        Self { rows, total: None }
    }

    /// Lifetime trade count reported to the learning phase. Defaults to the
    /// number of filled rows held.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

impl TradeHistorySource for StaticHistory {
    fn recent_trades(&self, limit: usize) -> Result<Vec<TradeRecord>> {
        Ok(self.rows.iter().take(limit).cloned().collect())
    }

    fn total_trades(&self) -> Result<u64> {
        Ok(self
            .total
            .unwrap_or_else(|| self.rows.iter().filter(|r| r.is_filled()).count() as u64))
    }
}

/// History store that is down.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingHistory;

impl TradeHistorySource for FailingHistory {
    fn recent_trades(&self, _limit: usize) -> Result<Vec<TradeRecord>> {
        bail!("history store connection refused")
    }

    fn total_trades(&self) -> Result<u64> {
        bail!("history store connection refused")
    }
}

/// Per-pair contexts with an optional fallback and simulated outages.
#[derive(Clone, Debug, Default)]
pub struct StaticMarket {
    by_pair: BTreeMap<Pair, GovernanceContext>,
    fallback: Option<GovernanceContext>,
    down: BTreeSet<Pair>,
}

impl StaticMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pair: &str, ctx: GovernanceContext) -> Self {
        self.by_pair.insert(parse(pair), ctx);
        self
    }

    /// Context for pairs without their own entry; `is_major_pair` follows the pair.
    pub fn with_default(mut self, ctx: GovernanceContext) -> Self {
        self.fallback = Some(ctx);
        self
    }

    pub fn outage(mut self, pair: &str) -> Self {
        self.down.insert(parse(pair));
        self
    }
}

impl MarketDataProvider for StaticMarket {
    fn context_for(&self, proposal: &TradeProposal) -> Result<GovernanceContext, MarketDataError> {
        let pair = &proposal.pair;
        if self.down.contains(pair) {
            return Err(MarketDataError::Unavailable {
                provider: "static".to_string(),
                detail: format!("no indicator feed for {pair}"),
            });
        }
        if let Some(ctx) = self.by_pair.get(pair) {
            return Ok(ctx.clone());
        }
        match &self.fallback {
            Some(ctx) => Ok(GovernanceContext {
                is_major_pair: pair.is_major(),
                ..ctx.clone()
            }),
            None => Err(MarketDataError::NoConsensus { pair: pair.clone() }),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticAgents(pub Vec<AgentStats>);

impl AgentMetricsSource for StaticAgents {
    fn agent_stats(&self) -> Result<Vec<AgentStats>> {
        Ok(self.0.clone())
    }
}

fn parse(pair: &str) -> Pair {
    Pair::parse(pair).expect("valid pair in fixture")
}
