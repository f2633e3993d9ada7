use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fxg_audit::{AuditSink, EventKind};
use fxg_coalition::{resolve_agent_snapshot, select_lead_agent, AgentSnapshot, ExecutionSnapshot};
use fxg_decision::{Decision, GovernanceResult, HardBlock, TradeProposal};
use fxg_governance::{assess_governance, GovernanceAssessment, GovernanceState};
use fxg_metrics::{compute_windows, WINDOW_LONG};
use fxg_schemas::{AgentRole, Pair};
use fxg_sizing::{
    compute_position_size, kelly_multiplier, pair_capital_multiplier, DiscoveryEnvironment,
    SizingBreakdown, SizingInput,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::collaborators::Collaborators;
use crate::evaluate::{evaluate_under_state, state_decision_policy};
use crate::history::pair_performance;
use crate::policy::GovernancePolicy;
use crate::store::GovernanceStore;

fn default_confidence() -> f64 {
    80.0
}

fn default_rate() -> f64 {
    1.0
}

/// A proposal plus what the sizing stack needs to know about it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateTrade {
    pub proposal: TradeProposal,
    /// Signal confidence, 0–100.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Account-currency value of one unit of the quote currency.
    #[serde(default = "default_rate")]
    pub quote_to_account_rate: f64,
    #[serde(default)]
    pub discovery: DiscoveryEnvironment,
}

impl CandidateTrade {
    pub fn new(proposal: TradeProposal) -> Self {
        Self {
            proposal,
            confidence: default_confidence(),
            quote_to_account_rate: default_rate(),
            discovery: DiscoveryEnvironment::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalOutcome {
    pub result: GovernanceResult,
    pub lead_agent: Option<String>,
    pub sizing: Option<SizingBreakdown>,
    /// True only if the execution wrapper may place this trade now.
    pub executable: bool,
    /// Why a tradeable result was held back (density cap, shadow mode, ...).
    pub notes: Vec<String>,
}

impl ProposalOutcome {
    /// Units with the direction sign applied; 0 when not executable.
    pub fn signed_units(&self) -> i64 {
        match (&self.sizing, self.executable) {
            (Some(s), true) => (s.units as f64 * self.result.direction.sign()) as i64,
            _ => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_ts: DateTime<Utc>,
    pub assessment: GovernanceAssessment,
    pub previous_state: Option<GovernanceState>,
    pub coalition: ExecutionSnapshot,
    pub lead_agent: Option<String>,
    /// Executable approvals allowed this cycle.
    pub density_cap: usize,
    pub shadow_mode: bool,
    pub outcomes: Vec<ProposalOutcome>,
}

impl CycleReport {
    pub fn count(&self, decision: Decision) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.result.decision == decision)
            .count()
    }

    pub fn executable(&self) -> impl Iterator<Item = &ProposalOutcome> {
        self.outcomes.iter().filter(|o| o.executable)
    }
}

/// `ceil(max_trades × density)`; non-finite or negative density gives 0.
pub fn density_cap(max_trades_per_cycle: u32, density: f64) -> usize {
    if !density.is_finite() || density <= 0.0 {
        return 0;
    }
    (f64::from(max_trades_per_cycle) * density).ceil() as usize
}

/// Per-cycle evaluator. Owns the policy and the explicit governance store.
pub struct GovernanceEngine {
    policy: GovernancePolicy,
    store: GovernanceStore,
}

impl GovernanceEngine {
    pub fn new(policy: GovernancePolicy) -> Result<Self> {
        policy.validate()?;
        let mut store = GovernanceStore::new(policy.runtime.shadow_mode);
        for raw in &policy.runtime.pair_bypass {
            let pair = Pair::parse(raw)
                .with_context(|| format!("invalid /runtime/pair_bypass entry '{raw}'"))?;
            store.add_bypass(pair);
        }
        Ok(Self { policy, store })
    }

    pub fn policy(&self) -> &GovernancePolicy {
        &self.policy
    }

    pub fn store(&self) -> &GovernanceStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GovernanceStore {
        &mut self.store
    }

    /// One governance cycle.
    ///
    /// A history read failure aborts the cycle (no trades). Agent metrics are
    /// read next; every other failure is contained per proposal as a hard block.
    pub fn run_cycle<R: Rng>(
        &mut self,
        now: DateTime<Utc>,
        candidates: &[CandidateTrade],
        collab: Collaborators<'_>,
        rng: &mut R,
        mut audit: Option<&mut dyn AuditSink>,
    ) -> Result<CycleReport> {
        let history = collab
            .history
            .recent_trades(WINDOW_LONG)
            .context("trade history unavailable; cycle aborted")?;
        let total_trades = collab
            .history
            .total_trades()
            .context("trade count unavailable; cycle aborted")?;

        // Governance state
        let windows = compute_windows(&history);
        let assessment = assess_governance(&self.policy.governance, &windows, total_trades);
        let previous_state = self.store.record_assessment(assessment.clone());

        if previous_state.is_some_and(|p| p != assessment.state) {
            info!(
                from = ?previous_state,
                to = %assessment.state,
                reasons = ?assessment.reasons,
                "governance state transition"
            );
        }
        if assessment.overridden() {
            warn!(
                raw_state = %assessment.raw_state,
                total_trades,
                milestone = self.policy.governance.learning.milestone,
                "learning-phase override holds state at NORMAL"
            );
        }
        for w in &assessment.warnings {
            warn!(warning = %w, "execution quality warning");
        }
        emit(
            &mut audit,
            now,
            EventKind::GovernanceState,
            json!({
                "state": assessment.state,
                "raw_state": assessment.raw_state,
                "previous_state": previous_state,
                "learning_phase": assessment.learning_phase,
                "total_trades": total_trades,
                "reasons": assessment.reasons,
                "warnings": assessment.warnings,
            }),
        )?;

        // Coalition
        let stats = collab
            .agents
            .agent_stats()
            .context("agent metrics unavailable; cycle aborted")?;
        let coalition = resolve_agent_snapshot(&self.policy.coalition, &stats, Some(&windows));
        for p in &coalition.promotions {
            emit(
                &mut audit,
                now,
                EventKind::CoalitionPromotion,
                serde_json::to_value(p).context("serialize promotion")?,
            )?;
        }
        let lead: Option<AgentSnapshot> = if coalition.coalition_met {
            select_lead_agent(&coalition, &self.policy.coalition, rng).cloned()
        } else {
            warn!(
                required = coalition.requirement.min_agents,
                live = coalition.live_agent_ids.len(),
                "coalition requirement not met; every proposal is blocked"
            );
            None
        };

        // Proposals
        let state_cfg = &assessment.config;
        let decision_policy = state_decision_policy(&self.policy.decision, state_cfg);
        let cap = density_cap(
            self.policy.runtime.max_trades_per_cycle,
            state_cfg.density_multiplier,
        );
        let shadow = self.store.shadow_mode();
        let mut executable_count = 0usize;
        let mut outcomes = Vec::with_capacity(candidates.len());

        for cand in candidates {
            let proposal = &cand.proposal;
            let mut notes = Vec::new();

            let (result, ctx) = if !coalition.coalition_met {
                let block = HardBlock::CoalitionNotMet {
                    required: coalition.requirement.min_agents,
                    available: coalition.live_agent_ids.len(),
                };
                (GovernanceResult::hard_block(proposal, block), None)
            } else if lead.is_none() {
                (
                    GovernanceResult::hard_block(proposal, HardBlock::NoDirectionalLead),
                    None,
                )
            } else {
                match collab.market.context_for(proposal) {
                    Ok(ctx) => {
                        let r = evaluate_under_state(
                            &decision_policy,
                            state_cfg,
                            assessment.learning_phase,
                            self.store.is_bypassed(&proposal.pair),
                            proposal,
                            &ctx,
                        );
                        (r, Some(ctx))
                    }
                    Err(e) => {
                        warn!(
                            pair = %proposal.pair,
                            error = %e,
                            "market data unavailable; hard block"
                        );
                        let block = HardBlock::MarketDataUnavailable {
                            detail: e.to_string(),
                        };
                        (GovernanceResult::hard_block(proposal, block), None)
                    }
                }
            };

            let mut sizing = None;
            let mut executable = false;

            if let (true, Some(lead), Some(ctx)) =
                (result.is_tradeable(), lead.as_ref(), ctx.as_ref())
            {
                let perf = pair_performance(&history, &proposal.pair);
                let regime = kelly_multiplier(
                    &self.policy.sizing.kelly,
                    result.adjusted_win_probability,
                    result.adjusted_win_range.midpoint(),
                    result.adjusted_loss_range.midpoint(),
                    ctx.phase,
                );
                let input = SizingInput {
                    pair: proposal.pair.clone(),
                    account_balance: self.policy.runtime.account_balance,
                    confidence: cand.confidence,
                    quote_to_account_rate: cand.quote_to_account_rate,
                    state_multiplier: state_cfg.sizing_multiplier,
                    pair_multiplier: pair_capital_multiplier(&self.policy.sizing, &perf),
                    session_budget: state_cfg.aggressiveness(ctx.session),
                    agent_size_multiplier: lead.size_multiplier,
                    agent_role: AgentRole::Lead,
                    regime_multiplier: regime,
                    discovery: cand.discovery,
                    discovery_multiplier: None,
                    throttled: result.decision == Decision::Throttled,
                };
                sizing = Some(compute_position_size(&self.policy.sizing, &input));

                let lead_side = lead.allowed_direction();
                if let Some(d) = lead_side.filter(|d| *d != proposal.direction) {
                    notes.push(format!(
                        "lead agent {} is restricted to {:?} trades",
                        lead.agent_id, d
                    ));
                } else if executable_count >= cap {
                    notes.push(format!(
                        "density cap reached: {cap} executable trade(s) per cycle in {}",
                        assessment.state
                    ));
                    debug!(pair = %proposal.pair, cap, "density cap");
                } else if shadow {
                    notes.push("shadow mode: evaluated, not executed".to_string());
                    executable_count += 1;
                } else {
                    executable = true;
                    executable_count += 1;
                }
            }

            if let Some(b) = &result.hard_block {
                info!(pair = %proposal.pair, block = %b, "proposal hard-blocked");
            } else {
                info!(
                    pair = %proposal.pair,
                    decision = %result.decision,
                    composite = result.composite_score,
                    gates = result.triggered_gates.len(),
                    executable,
                    "proposal evaluated"
                );
            }

            let outcome = ProposalOutcome {
                lead_agent: lead.as_ref().map(|l| l.agent_id.clone()),
                result,
                sizing,
                executable,
                notes,
            };
            emit(
                &mut audit,
                now,
                EventKind::ProposalDecision,
                json!({
                    "pair": outcome.result.pair,
                    "direction": outcome.result.direction,
                    "decision": outcome.result.decision,
                    "composite_score": outcome.result.composite_score,
                    "governance_score": outcome.result.governance_score,
                    "reasons": outcome.result.reasons(),
                    "units": outcome.sizing.as_ref().map(|s| s.units),
                    "executable": outcome.executable,
                    "notes": outcome.notes,
                }),
            )?;
            outcomes.push(outcome);
        }

        let report = CycleReport {
            cycle_ts: now,
            previous_state,
            lead_agent: lead.map(|l| l.agent_id),
            density_cap: cap,
            shadow_mode: shadow,
            assessment,
            coalition,
            outcomes,
        };

        emit(
            &mut audit,
            now,
            EventKind::CycleSummary,
            json!({
                "state": report.assessment.state,
                "proposals": report.outcomes.len(),
                "approved": report.count(Decision::Approved),
                "throttled": report.count(Decision::Throttled),
                "rejected": report.count(Decision::Rejected),
                "executable": report.executable().count(),
                "density_cap": report.density_cap,
                "shadow_mode": report.shadow_mode,
            }),
        )?;

        Ok(report)
    }
}

fn emit(
    audit: &mut Option<&mut dyn AuditSink>,
    ts: DateTime<Utc>,
    kind: EventKind,
    payload: serde_json::Value,
) -> Result<()> {
    if let Some(sink) = audit.as_deref_mut() {
        sink.record(ts, kind, payload)
            .with_context(|| format!("audit write failed ({})", kind.as_str()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_cap_rounds_up() {
        assert_eq!(density_cap(4, 1.0), 4);
        assert_eq!(density_cap(4, 0.70), 3);
        assert_eq!(density_cap(4, 0.45), 2);
        assert_eq!(density_cap(4, 0.20), 1);
        assert_eq!(density_cap(4, 0.0), 0);
        assert_eq!(density_cap(4, f64::NAN), 0);
    }
}
