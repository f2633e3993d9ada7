use std::cmp::Ordering;

use fxg_metrics::GovernanceWindows;
use fxg_schemas::AgentRole;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agent::AgentStats;
use crate::requirement::{resolve_requirement, CoalitionRequirement, RequirementPolicy};
use crate::tier::{
    snapshot_agent, AgentMetrics, AgentSnapshot, AgentTier, DeploymentState, Fleet, TierThresholds,
};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoalitionPolicy {
    pub requirement: RequirementPolicy,
    pub tiers: TierThresholds,

    pub bench_size_multiplier: f64,

    /// Shadow admission: expectancy above this, or fewer than
    /// `shadow_max_unproven_trades` trades.
    pub shadow_min_expectancy_pips: f64,
    pub shadow_max_unproven_trades: u64,
    pub shadow_size_multiplier: f64,

    /// Last-resort non-directional agents. When false, a short pool leaves
    /// the coalition unmet.
    pub allow_support_injection: bool,
    pub support_agents: Vec<String>,
    pub support_size_multiplier: f64,

    /// Lead-selection weight caps profit factor at this value.
    pub lead_weight_pf_cap: f64,
}

impl Default for CoalitionPolicy {
    fn default() -> Self {
        Self {
            requirement: RequirementPolicy::default(),
            tiers: TierThresholds::default(),
            bench_size_multiplier: 0.5,
            shadow_min_expectancy_pips: -2.0,
            shadow_max_unproven_trades: 3,
            shadow_size_multiplier: 0.35,
            allow_support_injection: true,
            support_agents: vec![
                "support-spread-guard".to_string(),
                "support-session-filter".to_string(),
                "support-volatility-filter".to_string(),
            ],
            support_size_multiplier: 0.25,
            lead_weight_pf_cap: 3.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionSource {
    Bench,
    Shadow,
    Support,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub source: PromotionSource,
    pub agent_id: String,
    pub size_multiplier: f64,
    pub trigger_metric: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    pub requirement: CoalitionRequirement,
    pub agents: Vec<AgentSnapshot>,
    pub promotions: Vec<Promotion>,
    pub live_agent_ids: Vec<String>,
    pub coalition_met: bool,
}

impl ExecutionSnapshot {
    pub fn agent(&self, agent_id: &str) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }

    pub fn live_agents(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.agents.iter().filter(|a| a.is_live())
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

fn by_pf_desc(a: &AgentSnapshot, b: &AgentSnapshot) -> Ordering {
    b.metrics
        .profit_factor_or_sentinel()
        .total_cmp(&a.metrics.profit_factor_or_sentinel())
        .then_with(|| a.agent_id.cmp(&b.agent_id))
}

fn by_expectancy_desc(a: &AgentSnapshot, b: &AgentSnapshot) -> Ordering {
    b.metrics
        .expectancy_pips
        .total_cmp(&a.metrics.expectancy_pips)
        .then_with(|| a.agent_id.cmp(&b.agent_id))
}

fn promote(agent: &mut AgentSnapshot, source: PromotionSource, size: f64) {
    agent.role = Some(AgentRole::Confirming);
    agent.eligible = true;
    agent.fleet = Fleet::Active;
    agent.deployment = DeploymentState::Reduced;
    agent.size_multiplier = size;
    agent.constraints.push(match source {
        PromotionSource::Bench => "promoted-from-bench".to_string(),
        PromotionSource::Shadow => "promoted-from-shadow".to_string(),
        PromotionSource::Support => "support-only".to_string(),
    });
}

fn record(promotions: &mut Vec<Promotion>, p: Promotion) {
    info!(
        source = ?p.source,
        agent = %p.agent_id,
        size_multiplier = p.size_multiplier,
        trigger = %p.trigger_metric,
        "coalition promotion"
    );
    promotions.push(p);
}

/// Build every agent's snapshot, decide the coalition size, and fill the live
/// pool in priority order: eligible, bench, shadow, support.
pub fn resolve_agent_snapshot(
    policy: &CoalitionPolicy,
    stats: &[AgentStats],
    windows: Option<&GovernanceWindows>,
) -> ExecutionSnapshot {
    let requirement = resolve_requirement(&policy.requirement, stats, windows);
    let min = requirement.min_agents;

    let mut agents: Vec<AgentSnapshot> = stats
        .iter()
        .map(|s| snapshot_agent(&policy.tiers, s))
        .collect();

    // Natively eligible agents: the strongest leads, the rest confirm.
    for a in agents.iter_mut().filter(|a| a.eligible) {
        a.role = Some(if a.tier == AgentTier::A {
            AgentRole::Lead
        } else {
            AgentRole::Confirming
        });
    }

    let mut live = agents.iter().filter(|a| a.is_live()).count();
    let mut promotions = Vec::new();

    // Bench: PF descending.
    if live < min {
        let mut bench: Vec<usize> = (0..agents.len())
            .filter(|&i| agents[i].fleet == Fleet::Bench)
            .collect();
        bench.sort_by(|&i, &j| by_pf_desc(&agents[i], &agents[j]));

        for i in bench.into_iter().take(min - live) {
            let a = &mut agents[i];
            let trigger = format!(
                "profit factor {:.2} over {} trades (expectancy {:.2} pips)",
                a.metrics.profit_factor_or_sentinel(),
                a.metrics.trades,
                a.metrics.expectancy_pips
            );
            promote(a, PromotionSource::Bench, policy.bench_size_multiplier);
            record(
                &mut promotions,
                Promotion {
                    source: PromotionSource::Bench,
                    agent_id: a.agent_id.clone(),
                    size_multiplier: policy.bench_size_multiplier,
                    trigger_metric: trigger,
                },
            );
            live += 1;
        }
    }

    // Shadow: looser gate, expectancy descending.
    if live < min {
        let mut shadow: Vec<usize> = (0..agents.len())
            .filter(|&i| {
                let a = &agents[i];
                a.fleet == Fleet::Shadow
                    && (a.metrics.expectancy_pips > policy.shadow_min_expectancy_pips
                        || a.metrics.trades < policy.shadow_max_unproven_trades)
            })
            .collect();
        shadow.sort_by(|&i, &j| by_expectancy_desc(&agents[i], &agents[j]));

        for i in shadow.into_iter().take(min - live) {
            let a = &mut agents[i];
            let trigger = format!(
                "expectancy {:.2} pips over {} trades",
                a.metrics.expectancy_pips, a.metrics.trades
            );
            promote(a, PromotionSource::Shadow, policy.shadow_size_multiplier);
            record(
                &mut promotions,
                Promotion {
                    source: PromotionSource::Shadow,
                    agent_id: a.agent_id.clone(),
                    size_multiplier: policy.shadow_size_multiplier,
                    trigger_metric: trigger,
                },
            );
            live += 1;
        }
    }

    // Support: always enough names to close the gap.
    if live < min && policy.allow_support_injection {
        let mut n = 0usize;
        while live < min {
            let id = policy
                .support_agents
                .get(n)
                .cloned()
                .unwrap_or_else(|| format!("support-{}", n + 1));
            n += 1;
            if agents.iter().any(|a| a.agent_id == id) {
                continue;
            }

            let mut a = AgentSnapshot {
                agent_id: id.clone(),
                fleet: Fleet::Active,
                tier: AgentTier::BShadow,
                deployment: DeploymentState::Reduced,
                size_multiplier: 0.0,
                eligible: true,
                role: None,
                constraints: vec!["non-directional".to_string()],
                metrics: AgentMetrics::from_stats(&AgentStats::new(id.clone())),
            };
            promote(
                &mut a,
                PromotionSource::Support,
                policy.support_size_multiplier,
            );
            a.role = Some(AgentRole::Support);

            record(
                &mut promotions,
                Promotion {
                    source: PromotionSource::Support,
                    agent_id: id,
                    size_multiplier: policy.support_size_multiplier,
                    trigger_metric: format!("live pool {live} < required {min}"),
                },
            );
            agents.push(a);
            live += 1;
        }
    }

    let live_agent_ids = agents
        .iter()
        .filter(|a| a.is_live())
        .map(|a| a.agent_id.clone())
        .collect();

    ExecutionSnapshot {
        coalition_met: live >= min,
        requirement,
        agents,
        promotions,
        live_agent_ids,
    }
}

/// Weighted random lead over live directional agents.
///
/// Weight = size multiplier × min(PF-or-sentinel, cap). Support agents never
/// lead. Falls back to a uniform pick when every weight is zero.
pub fn select_lead_agent<'a, R: Rng>(
    snapshot: &'a ExecutionSnapshot,
    policy: &CoalitionPolicy,
    rng: &mut R,
) -> Option<&'a AgentSnapshot> {
    let candidates: Vec<&AgentSnapshot> = snapshot
        .live_agents()
        .filter(|a| a.role.map(|r| r.is_directional()).unwrap_or(false))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|a| {
            let pf = a
                .metrics
                .profit_factor_or_sentinel()
                .min(policy.lead_weight_pf_cap);
            let w = a.size_multiplier * pf;
            if w.is_finite() && w > 0.0 {
                w
            } else {
                0.0
            }
        })
        .collect();

    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(candidates[dist.sample(rng)]),
        Err(_) => Some(candidates[rng.gen_range(0..candidates.len())]),
    }
}
