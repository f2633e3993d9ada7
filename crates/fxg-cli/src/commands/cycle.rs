//! `fxg cycle`: one governance cycle over file-backed collaborators.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use fxg_audit::{derive_run_id, AuditSink, AuditWriter};
use fxg_coalition::AgentStats;
use fxg_decision::{Decision, GovernanceContext, TradeProposal};
use fxg_runtime::{
    load_history, AgentMetricsSource, CandidateTrade, Collaborators, GovernanceEngine,
    MarketDataError, MarketDataProvider, TradeHistorySource,
};
use fxg_schemas::{Pair, TradeRecord};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

const DEFAULT_ENGINE_ID: &str = "fxg";

pub struct CycleArgs {
    pub history: String,
    pub total_trades: Option<u64>,
    pub agents: String,
    pub contexts: String,
    pub candidates: String,
    pub seed: u64,
    pub shadow: bool,
    pub audit: Option<String>,
}

struct FileHistory {
    rows: Vec<TradeRecord>,
    total: u64,
}

impl TradeHistorySource for FileHistory {
    fn recent_trades(&self, limit: usize) -> Result<Vec<TradeRecord>> {
        Ok(self.rows.iter().take(limit).cloned().collect())
    }

    fn total_trades(&self) -> Result<u64> {
        Ok(self.total)
    }
}

/// Contexts keyed by pair; `*` answers for any pair not listed.
struct FileMarket {
    by_pair: BTreeMap<Pair, GovernanceContext>,
    fallback: Option<GovernanceContext>,
}

impl FileMarket {
    fn from_map(raw: BTreeMap<String, GovernanceContext>) -> Result<Self> {
        let mut by_pair = BTreeMap::new();
        let mut fallback = None;
        for (key, ctx) in raw {
            if key == "*" {
                fallback = Some(ctx);
                continue;
            }
            let pair = Pair::parse(&key).with_context(|| format!("invalid context key '{key}'"))?;
            by_pair.insert(pair, ctx);
        }
        Ok(Self { by_pair, fallback })
    }
}

impl MarketDataProvider for FileMarket {
    fn context_for(&self, proposal: &TradeProposal) -> Result<GovernanceContext, MarketDataError> {
        self.by_pair
            .get(&proposal.pair)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| MarketDataError::Unavailable {
                provider: "file".to_string(),
                detail: format!("no context for {}", proposal.pair),
            })
    }
}

struct FileAgents(Vec<AgentStats>);

impl AgentMetricsSource for FileAgents {
    fn agent_stats(&self) -> Result<Vec<AgentStats>> {
        Ok(self.0.clone())
    }
}

/// Execute `fxg cycle`.
pub fn cycle(config_paths: &[String], args: CycleArgs) -> Result<()> {
    let (loaded, mut policy) = super::load_policy(config_paths)?;
    if args.shadow {
        policy.runtime.shadow_mode = true;
    }

    let rows = load_history(&args.history)?;
    let total = args
        .total_trades
        .unwrap_or_else(|| rows.iter().filter(|r| r.is_filled()).count() as u64);
    let history = FileHistory { rows, total };
    let market = FileMarket::from_map(super::read_json(&args.contexts)?)?;
    let agents = FileAgents(super::read_json(&args.agents)?);
    let candidates: Vec<CandidateTrade> = super::read_json(&args.candidates)?;

    let engine_id = loaded
        .section("/engine/engine_id")
        .as_str()
        .unwrap_or(DEFAULT_ENGINE_ID)
        .to_string();
    let run_id = derive_run_id(&engine_id, &loaded.config_hash);
    let mut writer = match &args.audit {
        Some(path) => Some(AuditWriter::resume(path, run_id, true)?),
        None => None,
    };

    let mut engine = GovernanceEngine::new(policy)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let report = engine.run_cycle(
        Utc::now(),
        &candidates,
        Collaborators {
            history: &history,
            market: &market,
            agents: &agents,
        },
        &mut rng,
        writer.as_mut().map(|w| w as &mut dyn AuditSink),
    )?;

    info!(run_id = %run_id, state = %report.assessment.state, "cycle complete");

    println!("run_id={run_id}");
    println!("config_hash={}", loaded.config_hash);
    println!(
        "state={} learning_phase={} coalition_met={} lead={}",
        report.assessment.state,
        report.assessment.learning_phase,
        report.coalition.coalition_met,
        report.lead_agent.as_deref().unwrap_or("none")
    );
    println!(
        "proposals={} approved={} throttled={} rejected={} executable={} density_cap={} shadow_mode={}",
        report.outcomes.len(),
        report.count(Decision::Approved),
        report.count(Decision::Throttled),
        report.count(Decision::Rejected),
        report.executable().count(),
        report.density_cap,
        report.shadow_mode
    );
    if let Some(w) = &writer {
        println!("audit_path={} audit_seq={}", w.path().display(), w.seq());
    }
    super::print_json(&report)
}
