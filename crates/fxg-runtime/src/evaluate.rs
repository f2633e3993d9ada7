use fxg_decision::{
    decide, DecisionPolicy, GovernanceContext, GovernanceResult, HardBlock, TradeProposal,
};
use fxg_governance::GovernanceStateConfig;

/// Decision policy with the friction gate raised to the state's friction k.
pub fn state_decision_policy(
    base: &DecisionPolicy,
    state: &GovernanceStateConfig,
) -> DecisionPolicy {
    let mut p = base.clone();
    if state.friction_k_override.is_finite() {
        p.gates.min_friction_ratio = p.gates.min_friction_ratio.max(state.friction_k_override);
    }
    p
}

/// Context with session aggressiveness scaled by the state's session table.
///
/// Both sides are aggressiveness levels: the context's on 0–100, the table's
/// on 0–1, so the product stays on 0–100.
pub fn state_context(ctx: &GovernanceContext, state: &GovernanceStateConfig) -> GovernanceContext {
    let raw = if ctx.session_aggressiveness.is_finite() {
        ctx.session_aggressiveness.clamp(0.0, 100.0)
    } else {
        0.0
    };
    GovernanceContext {
        session_aggressiveness: raw * state.aggressiveness(ctx.session),
        ..ctx.clone()
    }
}

/// Evaluate one proposal under a governance state.
///
/// Order: pair restriction (unless bypassed), session auto-block (outside the
/// learning phase), then the combiner on the state-adjusted context.
/// `policy` is expected to come from [`state_decision_policy`].
pub fn evaluate_under_state(
    policy: &DecisionPolicy,
    state: &GovernanceStateConfig,
    learning_phase: bool,
    pair_bypassed: bool,
    proposal: &TradeProposal,
    ctx: &GovernanceContext,
) -> GovernanceResult {
    if !pair_bypassed && !state.pair_restriction.allows(&proposal.pair) {
        return GovernanceResult::hard_block(
            proposal,
            HardBlock::PairRestricted {
                pair: proposal.pair.clone(),
            },
        );
    }

    if !learning_phase && state.session_blocked(ctx.session) {
        return GovernanceResult::hard_block(
            proposal,
            HardBlock::SessionBlocked {
                session: ctx.session,
            },
        );
    }

    decide(policy, proposal, &state_context(ctx, state))
}
