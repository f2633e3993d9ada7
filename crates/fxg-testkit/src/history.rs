use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use fxg_schemas::{classify_session, Direction, Pair, TradeRecord, TradeStatus};

/// Builds trade history the way the store hands it out.
///
/// Calls append rows chronologically (oldest first); [`build`](Self::build)
/// returns them newest-first.
#[derive(Clone, Debug)]
pub struct TradeHistoryBuilder {
    pair: Pair,
    direction: Direction,
    rows: Vec<TradeRecord>,
}

impl Default for TradeHistoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn base_time() -> DateTime<Utc> {
    // Monday 2026-03-02 12:00 UTC
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn default_pair() -> Pair {
    Pair::parse("EUR/USD").expect("EUR/USD parses")
}

impl TradeHistoryBuilder {
    pub fn new() -> Self {
        Self {
            pair: default_pair(),
            direction: Direction::Long,
            rows: Vec::new(),
        }
    }

    /// Pair for subsequently added rows.
    pub fn pair(mut self, pair: &str) -> Self {
        self.pair = Pair::parse(pair).expect("valid pair in fixture");
        self
    }

    /// Direction for subsequently added rows.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn win(self, pips: f64) -> Self {
        self.closed(pips.abs())
    }

    pub fn loss(self, pips: f64) -> Self {
        self.closed(-pips.abs())
    }

    pub fn wins(mut self, n: usize, pips: f64) -> Self {
        for _ in 0..n {
            self = self.win(pips);
        }
        self
    }

    pub fn losses(mut self, n: usize, pips: f64) -> Self {
        for _ in 0..n {
            self = self.loss(pips);
        }
        self
    }

    /// `n` rows with `status` and no exit price.
    pub fn rows(mut self, status: TradeStatus, n: usize) -> Self {
        for _ in 0..n {
            let mut r = self.next_row(status);
            r.closed_at = None;
            self.rows.push(r);
        }
        self
    }

    /// Mutate the most recently added row.
    pub fn with_last(mut self, f: impl FnOnce(&mut TradeRecord)) -> Self {
        if let Some(r) = self.rows.last_mut() {
            f(r);
        }
        self
    }

    /// Rows newest-first.
    pub fn build(self) -> Vec<TradeRecord> {
        let mut rows = self.rows;
        rows.reverse();
        rows
    }

    fn closed(mut self, signed_pips: f64) -> Self {
        let mut r = self.next_row(TradeStatus::Closed);
        let move_px = signed_pips * self.direction.sign() * self.pair.pip_size();
        r.exit_price = Some(r.entry_price + move_px);
        self.rows.push(r);
        self
    }

    fn next_row(&self, status: TradeStatus) -> TradeRecord {
        let i = self.rows.len();
        let opened_at = base_time() + Duration::minutes(15 * i as i64);
        let entry_price = if self.pair.is_jpy_quoted() { 150.00 } else { 1.1000 };
        TradeRecord {
            id: format!("t-{i:04}"),
            pair: self.pair.clone(),
            direction: self.direction,
            status,
            entry_price,
            exit_price: None,
            opened_at,
            closed_at: Some(opened_at + Duration::minutes(10)),
            session: Some(classify_session(opened_at)),
            regime: None,
            execution_quality: None,
            slippage_pips: None,
            spread_pips: None,
            mfe_pips: None,
            agent_id: None,
        }
    }
}

pub fn write_history_json(path: impl AsRef<Path>, rows: &[TradeRecord]) -> Result<()> {
    let path = path.as_ref();
    let s = serde_json::to_string_pretty(rows).context("serialize history")?;
    fs::write(path, s).with_context(|| format!("write history: {}", path.display()))
}

pub fn write_history_csv(path: impl AsRef<Path>, rows: &[TradeRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create history csv: {}", path.display()))?;
    for r in rows {
        w.serialize(r).context("serialize history row")?;
    }
    w.flush().context("flush history csv")?;
    Ok(())
}
