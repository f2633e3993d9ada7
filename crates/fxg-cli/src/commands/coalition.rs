use anyhow::Result;
use fxg_coalition::{resolve_agent_snapshot, select_lead_agent, AgentStats};
use fxg_metrics::compute_windows;
use fxg_runtime::load_history;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

/// Execute `fxg coalition`.
pub fn coalition(
    config_paths: &[String],
    agents_path: &str,
    history_path: Option<&str>,
    seed: u64,
) -> Result<()> {
    let (_, policy) = super::load_policy(config_paths)?;
    let stats: Vec<AgentStats> = super::read_json(agents_path)?;
    let windows = match history_path {
        Some(p) => Some(compute_windows(&load_history(p)?)),
        None => None,
    };

    let snap = resolve_agent_snapshot(&policy.coalition, &stats, windows.as_ref());
    let mut rng = StdRng::seed_from_u64(seed);
    let lead = if snap.coalition_met {
        select_lead_agent(&snap, &policy.coalition, &mut rng)
    } else {
        None
    };

    println!(
        "coalition_met={} min_agents={} live={} promotions={}",
        snap.coalition_met,
        snap.requirement.min_agents,
        snap.live_agent_ids.len(),
        snap.promotions.len()
    );
    println!(
        "lead={}",
        lead.map(|l| l.agent_id.as_str()).unwrap_or("none")
    );
    super::print_json(&json!({
        "snapshot": snap,
        "lead_agent": lead.map(|l| l.agent_id.clone()),
        "seed": seed,
    }))
}
