use anyhow::Result;
use fxg_governance::assess_governance;
use fxg_metrics::compute_windows;
use fxg_runtime::load_history;
use serde_json::json;

/// Execute `fxg assess`.
pub fn assess(
    config_paths: &[String],
    history_path: &str,
    total_trades: Option<u64>,
) -> Result<()> {
    let (loaded, policy) = super::load_policy(config_paths)?;
    let history = load_history(history_path)?;
    let filled = history.iter().filter(|r| r.is_filled()).count() as u64;
    let total = total_trades.unwrap_or(filled);

    let windows = compute_windows(&history);
    let a = assess_governance(&policy.governance, &windows, total);

    println!("config_hash={}", loaded.config_hash);
    println!(
        "state={} raw_state={} learning_phase={} total_trades={}",
        a.state, a.raw_state, a.learning_phase, a.total_trades
    );
    for r in &a.reasons {
        println!("reason={r}");
    }
    for w in &a.warnings {
        println!("warning={w}");
    }
    super::print_json(&json!({ "assessment": a, "windows": windows }))
}
