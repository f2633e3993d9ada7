use fxg_coalition::*;
use fxg_schemas::AgentRole;
use fxg_testkit::{agent, AgentStatsBuilder};

fn thin_pool() -> Vec<AgentStats> {
    vec![
        agent("alpha", 100, 0.55, 1.4),
        agent("bench-1", 150, 0.45, 0.97),
        agent("wreck", 200, 0.35, 0.6),
        agent("drifter", 150, 0.40, 0.75),
    ]
}

#[test]
fn weak_pool_after_learning_requires_trio_and_promotes_in_order() {
    let snap = resolve_agent_snapshot(&CoalitionPolicy::default(), &thin_pool(), None);

    assert!(!snap.requirement.learning_phase);
    assert_eq!(snap.requirement.total_trades, 600);
    assert!(snap.requirement.rolling_profit_factor < 1.05);
    assert_eq!(snap.requirement.tier, CoalitionTier::Trio);
    assert_eq!(snap.requirement.min_agents, 3);

    // One natively eligible agent; two promotions, bench before shadow.
    assert_eq!(snap.promotions.len(), 2);
    assert_eq!(snap.promotions[0].source, PromotionSource::Bench);
    assert_eq!(snap.promotions[0].agent_id, "bench-1");
    assert_eq!(snap.promotions[1].source, PromotionSource::Shadow);
    assert_eq!(snap.promotions[1].agent_id, "drifter");
    assert!(snap.promotions.iter().all(|p| !p.trigger_metric.is_empty()));

    assert!(snap.coalition_met);
    assert_eq!(snap.live_agent_ids, vec!["alpha", "bench-1", "drifter"]);

    // Expectancy below -2 pips stays out of the shadow pool.
    let wreck = snap.agent("wreck").unwrap();
    assert_eq!(wreck.tier, AgentTier::D);
    assert!(!wreck.is_live());
}

#[test]
fn support_agents_close_the_gap_as_last_resort() {
    let pool = vec![
        agent("alpha", 300, 0.55, 1.4),
        agent("wreck", 300, 0.30, 0.5),
    ];
    let snap = resolve_agent_snapshot(&CoalitionPolicy::default(), &pool, None);

    assert_eq!(snap.requirement.tier, CoalitionTier::Trio);
    assert_eq!(snap.promotions.len(), 2);
    assert!(snap
        .promotions
        .iter()
        .all(|p| p.source == PromotionSource::Support));

    let support = snap.agent("support-spread-guard").unwrap();
    assert_eq!(support.role, Some(AgentRole::Support));
    assert_eq!(support.metrics.trades, 0);
    assert!(support.size_multiplier <= 0.25);
    assert!(snap.coalition_met);
}

#[test]
fn minimum_is_never_below_two_even_for_an_empty_pool() {
    let snap = resolve_agent_snapshot(&CoalitionPolicy::default(), &[], None);
    assert_eq!(snap.requirement.tier, CoalitionTier::Duo);
    assert!(snap.requirement.min_agents >= MIN_COALITION);
    assert_eq!(snap.live_agent_ids.len(), 2);
    assert!(snap.coalition_met);
}

#[test]
fn without_support_injection_a_short_pool_is_unmet() {
    let policy = CoalitionPolicy {
        allow_support_injection: false,
        ..CoalitionPolicy::default()
    };
    let snap = resolve_agent_snapshot(&policy, &[], None);
    assert!(snap.requirement.min_agents >= 2);
    assert!(snap.live_agent_ids.is_empty());
    assert!(!snap.coalition_met);
}

#[test]
fn learning_phase_is_always_duo() {
    let pool = vec![
        agent("a", 120, 0.30, 0.5),
        agent("b", 120, 0.30, 0.5),
    ];
    let snap = resolve_agent_snapshot(&CoalitionPolicy::default(), &pool, None);
    assert!(snap.requirement.learning_phase);
    assert_eq!(snap.requirement.tier, CoalitionTier::Duo);
    assert!(snap.requirement.reasons[0].contains("learning phase"));
}

#[test]
fn healthy_pool_is_duo() {
    let pool = vec![
        agent("a", 400, 0.60, 1.6),
        agent("b", 300, 0.58, 1.5),
    ];
    let snap = resolve_agent_snapshot(&CoalitionPolicy::default(), &pool, None);
    assert!(snap.requirement.survivorship_score >= 40.0);
    assert_eq!(snap.requirement.tier, CoalitionTier::Duo);
    assert!(snap.promotions.is_empty());
}

#[test]
fn deteriorating_trend_escalates_to_trio() {
    let pool = vec![agent("a", 600, 0.60, 1.6)];
    let windows = fxg_metrics::GovernanceWindows {
        w20: fxg_testkit::window(20, 20, 0.55, 1.0),
        w50: fxg_testkit::window(50, 50, 0.55, 0.2),
        w200: fxg_testkit::window(200, 200, 0.60, 1.5),
    };
    let req = resolve_requirement(&RequirementPolicy::default(), &pool, Some(&windows));
    assert_eq!(req.stability_trend, StabilityTrend::Deteriorating);
    assert!((req.expectancy_slope + 1.3).abs() < 1e-9);
    assert_eq!(req.tier, CoalitionTier::Trio);
}

#[test]
fn unrated_agents_wait_in_shadow_and_can_be_promoted() {
    let pool = vec![
        agent("veteran", 600, 0.30, 0.5),
        agent("rookie", 2, 0.0, 0.0),
    ];
    let snap = resolve_agent_snapshot(&CoalitionPolicy::default(), &pool, None);
    let rookie = snap.agent("rookie").unwrap();
    assert_eq!(rookie.tier, AgentTier::BShadow);
    assert_eq!(rookie.role, Some(AgentRole::Confirming));
    let constraints = &rookie.constraints;
    assert!(constraints.iter().any(|c| c == "promoted-from-shadow"));
}

#[test]
fn one_sided_and_legacy_agents_deploy_reduced() {
    let t = TierThresholds::default();

    let one_sided = AgentStatsBuilder::new("one-sided")
        .record(120, 0.40, 0.85)
        .long_side(20, 1.2)
        .short_side(30, 1.4)
        .build();
    let snap = snapshot_agent(&t, &one_sided);
    assert_eq!(snap.tier, AgentTier::BRescued);
    assert_eq!(snap.deployment, DeploymentState::Reduced);
    // Both sides qualify; the stronger one wins.
    assert_eq!(
        snap.allowed_direction(),
        Some(fxg_schemas::Direction::Short)
    );

    let veteran = AgentStatsBuilder::new("veteran")
        .record(120, 0.45, 0.97)
        .legacy()
        .build();
    let snap = snapshot_agent(&t, &veteran);
    assert_eq!(snap.tier, AgentTier::BLegacy);
    assert_eq!(snap.size_multiplier, t.legacy_size);
    assert!(snap.constraints.contains(&"legacy".to_string()));
    assert_eq!(snap.allowed_direction(), None);
}
