use anyhow::{anyhow, Context, Result};
use fxg_decision::{GovernanceContext, TradeProposal};
use fxg_governance::GovernanceState;
use fxg_runtime::{evaluate_under_state, state_decision_policy};
use fxg_schemas::Pair;

/// Execute `fxg evaluate`: one proposal, one context, a chosen state.
pub fn evaluate(
    config_paths: &[String],
    proposal_path: &str,
    context_path: &str,
    state: &str,
    learning: bool,
) -> Result<()> {
    let (_, policy) = super::load_policy(config_paths)?;
    let state: GovernanceState = state.parse().map_err(|e: String| anyhow!(e))?;
    let proposal: TradeProposal = super::read_json(proposal_path)?;
    let ctx: GovernanceContext = super::read_json(context_path)?;

    let mut bypassed = false;
    for raw in &policy.runtime.pair_bypass {
        let pair = Pair::parse(raw)
            .with_context(|| format!("invalid /runtime/pair_bypass entry '{raw}'"))?;
        bypassed |= pair == proposal.pair;
    }

    let state_cfg = policy.governance.table.config_for(state);
    let decision_policy = state_decision_policy(&policy.decision, state_cfg);
    let r = evaluate_under_state(
        &decision_policy,
        state_cfg,
        learning,
        bypassed,
        &proposal,
        &ctx,
    );

    println!(
        "pair={} direction={:?} state={} decision={} composite={:.4} governance_score={:.1}",
        r.pair, r.direction, state, r.decision, r.composite_score, r.governance_score
    );
    for reason in r.reasons() {
        println!("reason={reason}");
    }
    super::print_json(&r)
}
