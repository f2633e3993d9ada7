use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use fxg_schemas::{Pair, TradeRecord, EPSILON};
use fxg_sizing::PairPerformance;

/// Load trade history from a `.json` array or a `.csv` file with a header row.
///
/// Rows come back newest-first regardless of file order.
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<TradeRecord>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let mut rows = match ext.as_str() {
        "json" => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read history: {}", path.display()))?;
            serde_json::from_str::<Vec<TradeRecord>>(&raw)
                .with_context(|| format!("parse history json: {}", path.display()))?
        }
        "csv" => load_history_csv(path)?,
        other => bail!(
            "unsupported history format '{}' for {} (expected .json or .csv)",
            other,
            path.display()
        ),
    };

    sort_newest_first(&mut rows);
    Ok(rows)
}

fn load_history_csv(path: &Path) -> Result<Vec<TradeRecord>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("open history csv: {}", path.display()))?;
    let mut out = Vec::new();
    for (i, rec) in rdr.deserialize::<TradeRecord>().enumerate() {
        out.push(rec.with_context(|| format!("parse history csv row {}", i + 1))?);
    }
    Ok(out)
}

/// Stable sort by `opened_at`, newest first.
pub fn sort_newest_first(rows: &mut [TradeRecord]) {
    rows.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
}

/// Rolling performance of one pair over the filled rows of `history`.
pub fn pair_performance(history: &[TradeRecord], pair: &Pair) -> PairPerformance {
    let pnl: Vec<f64> = history
        .iter()
        .filter(|r| &r.pair == pair)
        .filter_map(TradeRecord::realized_pips)
        .collect();

    let n = pnl.len();
    if n == 0 {
        return PairPerformance::default();
    }

    let wins = pnl.iter().filter(|p| **p > 0.0).count();
    let mean = pnl.iter().sum::<f64>() / n as f64;

    let sharpe = if n >= 2 {
        let var = pnl.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let sd = var.sqrt();
        (sd > EPSILON).then(|| mean / sd)
    } else {
        None
    };

    PairPerformance {
        trades: n,
        win_rate: wins as f64 / n as f64,
        expectancy_pips: mean,
        sharpe,
    }
}
