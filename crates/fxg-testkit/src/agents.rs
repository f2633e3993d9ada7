use fxg_coalition::{AgentStats, SideStats};

/// Agent aggregates from a handful of headline numbers.
///
/// Losing trades are 10 pips each; gross profit is derived from the requested
/// profit factor.
#[derive(Clone, Debug)]
pub struct AgentStatsBuilder {
    stats: AgentStats,
}

impl AgentStatsBuilder {
    pub fn new(agent_id: &str) -> Self {
        Self {
            stats: AgentStats::new(agent_id),
        }
    }

    pub fn record(mut self, trades: u64, win_rate: f64, profit_factor: f64) -> Self {
        let wins = ((trades as f64) * win_rate).round() as u64;
        let wins = wins.min(trades);
        let losses = trades - wins;
        let gross_loss = losses as f64 * 10.0;
        let gross_profit = if gross_loss > 0.0 {
            profit_factor * gross_loss
        } else {
            wins as f64 * 10.0
        };

        let s = &mut self.stats;
        s.trades = trades;
        s.wins = wins;
        s.losses = losses;
        s.gross_profit_pips = gross_profit;
        s.gross_loss_pips = gross_loss;
        self
    }

    pub fn long_side(mut self, trades: u64, profit_factor: f64) -> Self {
        self.stats.long = side(trades, profit_factor);
        self
    }

    pub fn short_side(mut self, trades: u64, profit_factor: f64) -> Self {
        self.stats.short = side(trades, profit_factor);
        self
    }

    pub fn legacy(mut self) -> Self {
        self.stats.legacy = true;
        self
    }

    pub fn build(self) -> AgentStats {
        self.stats
    }
}

/// Shorthand for `AgentStatsBuilder::new(id).record(..).build()`.
pub fn agent(agent_id: &str, trades: u64, win_rate: f64, profit_factor: f64) -> AgentStats {
    AgentStatsBuilder::new(agent_id)
        .record(trades, win_rate, profit_factor)
        .build()
}

fn side(trades: u64, profit_factor: f64) -> SideStats {
    let gross_loss = trades as f64 * 5.0;
    SideStats {
        trades,
        gross_profit_pips: profit_factor * gross_loss,
        gross_loss_pips: gross_loss,
    }
}
