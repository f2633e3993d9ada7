use fxg_audit::{EventKind, MemoryAuditSink};
use fxg_coalition::AgentStats;
use fxg_decision::{Decision, HardBlock};
use fxg_governance::GovernanceState;
use fxg_runtime::*;
use fxg_schemas::{Direction, Session, TradeRecord};
use fxg_testkit::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Two agents, 400 trades between them: the coalition stays in its learning
/// phase (duo), both are natively live.
fn duo() -> StaticAgents {
    StaticAgents(vec![
        agent("alpha", 200, 0.55, 1.4),
        agent("beta", 200, 0.55, 1.2),
    ])
}

fn losing_streak() -> Vec<TradeRecord> {
    TradeHistoryBuilder::new().losses(30, 10.0).build()
}

fn engine() -> GovernanceEngine {
    GovernanceEngine::new(GovernancePolicy::default()).unwrap()
}

fn run(
    engine: &mut GovernanceEngine,
    history: &dyn TradeHistorySource,
    market: &dyn MarketDataProvider,
    agents: &dyn AgentMetricsSource,
    candidates: &[CandidateTrade],
) -> CycleReport {
    let mut rng = StdRng::seed_from_u64(42);
    engine
        .run_cycle(
            cycle_clock(),
            candidates,
            Collaborators {
                history,
                market,
                agents,
            },
            &mut rng,
            None,
        )
        .unwrap()
}

#[test]
fn learning_phase_cycle_approves_and_sizes() {
    let rows = TradeHistoryBuilder::new()
        .wins(12, 6.0)
        .losses(8, 5.0)
        .build();
    let history = StaticHistory::new(rows);
    let market = StaticMarket::new().with_default(strong_context());
    let mut e = engine();

    let report = run(
        &mut e,
        &history,
        &market,
        &duo(),
        &[
            candidate("EUR/USD", Direction::Long),
            candidate("USD/JPY", Direction::Short),
        ],
    );

    assert_eq!(report.assessment.state, GovernanceState::Normal);
    assert!(report.assessment.learning_phase);
    assert!(report.coalition.coalition_met);
    assert_eq!(report.coalition.requirement.min_agents, 2);
    assert_eq!(report.density_cap, 4);
    let lead = report.lead_agent.clone().unwrap();
    assert!(lead == "alpha" || lead == "beta");

    assert_eq!(report.count(Decision::Approved), 2);
    assert_eq!(report.executable().count(), 2);
    for o in &report.outcomes {
        let s = o.sizing.as_ref().unwrap();
        assert!((500..=5000).contains(&s.units), "units {}", s.units);
        assert_eq!(o.lead_agent.as_deref(), Some(lead.as_str()));
        assert!(o.notes.is_empty());
    }
    assert!(report.outcomes[0].signed_units() > 0);
    assert!(report.outcomes[1].signed_units() < 0);
}

#[test]
fn learning_phase_holds_normal_despite_halt_metrics() {
    let history = StaticHistory::new(losing_streak());
    let market = StaticMarket::new().with_default(strong_context());
    let mut e = engine();

    let report = run(
        &mut e,
        &history,
        &market,
        &duo(),
        &[candidate("GBP/JPY", Direction::Long)],
    );

    assert_eq!(report.assessment.raw_state, GovernanceState::Halt);
    assert_eq!(report.assessment.state, GovernanceState::Normal);
    assert!(report.assessment.overridden());
    // NORMAL has no pair restriction.
    assert!(report.outcomes[0].result.hard_block.is_none());
}

#[test]
fn halt_restricts_pairs_blocks_sessions_and_caps_density() {
    let history = StaticHistory::new(losing_streak()).with_total(600);
    let market = StaticMarket::new()
        .with_default(strong_context())
        .with(
            "USD/JPY",
            ContextBuilder::strong()
                .session(Session::Asian, 70.0)
                .build(),
        );
    let mut e = engine();

    let report = run(
        &mut e,
        &history,
        &market,
        &duo(),
        &[
            candidate("EUR/USD", Direction::Long),
            candidate("GBP/JPY", Direction::Long),
            candidate("USD/JPY", Direction::Long),
            candidate("GBP/USD", Direction::Short),
        ],
    );

    assert_eq!(report.assessment.state, GovernanceState::Halt);
    assert!(!report.assessment.learning_phase);
    assert_eq!(report.density_cap, 1);

    let [eur, gbpjpy, usdjpy, gbpusd] = &report.outcomes[..] else {
        panic!("expected four outcomes");
    };

    assert_eq!(eur.result.decision, Decision::Approved);
    assert!(eur.executable);
    // HALT sizing multiplier 0.25 and London budget 0.5 shrink the trade.
    assert!(eur.sizing.as_ref().unwrap().units <= 5000);

    assert!(matches!(
        gbpjpy.result.hard_block,
        Some(HardBlock::PairRestricted { .. })
    ));
    assert!(matches!(
        usdjpy.result.hard_block,
        Some(HardBlock::SessionBlocked {
            session: Session::Asian
        })
    ));

    assert_eq!(gbpusd.result.decision, Decision::Approved);
    assert!(!gbpusd.executable);
    assert!(gbpusd.notes[0].contains("density cap"));
    assert_eq!(report.executable().count(), 1);
}

#[test]
fn halt_friction_gate_uses_state_override() {
    let history = StaticHistory::new(losing_streak()).with_total(600);
    // 4.2 clears the default 3.0 gate but not HALT's 4.5.
    let ctx = ContextBuilder::strong().friction_ratio(4.2).build();
    let market = StaticMarket::new().with_default(ctx);
    let mut e = engine();

    let report = run(
        &mut e,
        &history,
        &market,
        &duo(),
        &[candidate("EUR/USD", Direction::Long)],
    );
    let r = &report.outcomes[0].result;
    assert_eq!(r.triggered_gates.len(), 1);
    assert_eq!(r.decision, Decision::Throttled);
}

#[test]
fn bypassed_pair_escapes_restriction() {
    let history = StaticHistory::new(losing_streak()).with_total(600);
    let market = StaticMarket::new().with_default(strong_context());
    let policy = GovernancePolicy {
        runtime: RuntimeConfig {
            pair_bypass: vec!["gbpjpy".to_string()],
            ..RuntimeConfig::default()
        },
        ..GovernancePolicy::default()
    };
    let mut e = GovernanceEngine::new(policy).unwrap();

    let report = run(
        &mut e,
        &history,
        &market,
        &duo(),
        &[candidate("GBP/JPY", Direction::Long)],
    );
    assert_eq!(report.assessment.state, GovernanceState::Halt);
    assert!(report.outcomes[0].result.hard_block.is_none());
}

#[test]
fn invalid_bypass_pair_fails_construction() {
    let policy = GovernancePolicy {
        runtime: RuntimeConfig {
            pair_bypass: vec!["EURO".to_string()],
            ..RuntimeConfig::default()
        },
        ..GovernancePolicy::default()
    };
    let err = GovernanceEngine::new(policy).err().unwrap();
    assert!(format!("{err:#}").contains("pair_bypass"));
}

#[test]
fn reversed_sizing_bounds_fail_construction() {
    let mut policy = GovernancePolicy::default();
    policy.sizing.state_bounds.min = 1.0;
    policy.sizing.state_bounds.max = 0.2;
    let err = GovernanceEngine::new(policy).err().unwrap();
    assert!(format!("{err:#}").contains("state_bounds"));
}

#[test]
fn shadow_mode_evaluates_without_executing() {
    let history = StaticHistory::new(Vec::new());
    let market = StaticMarket::new().with_default(strong_context());
    let mut e = engine();
    e.store_mut().set_shadow_mode(true);

    let report = run(
        &mut e,
        &history,
        &market,
        &duo(),
        &[candidate("EUR/USD", Direction::Long)],
    );
    let o = &report.outcomes[0];
    assert!(report.shadow_mode);
    assert_eq!(o.result.decision, Decision::Approved);
    assert!(o.sizing.is_some());
    assert!(!o.executable);
    assert_eq!(o.signed_units(), 0);
    assert!(o.notes[0].starts_with("shadow mode"));
}

#[test]
fn market_outage_blocks_only_that_pair() {
    let history = StaticHistory::new(Vec::new());
    let market = StaticMarket::new()
        .with_default(strong_context())
        .outage("AUD/USD");
    let mut e = engine();

    let report = run(
        &mut e,
        &history,
        &market,
        &duo(),
        &[
            candidate("AUD/USD", Direction::Long),
            candidate("EUR/USD", Direction::Long),
        ],
    );
    let down = &report.outcomes[0].result;
    assert_eq!(down.decision, Decision::Rejected);
    assert!(matches!(
        down.hard_block,
        Some(HardBlock::MarketDataUnavailable { .. })
    ));
    assert!(down.multipliers.is_none());
    assert!(report.outcomes[1].executable);
}

#[test]
fn history_failure_aborts_cycle() {
    let market = StaticMarket::new().with_default(strong_context());
    let mut e = engine();
    let mut rng = StdRng::seed_from_u64(1);
    let mut sink = MemoryAuditSink::default();

    let err = e
        .run_cycle(
            cycle_clock(),
            &[candidate("EUR/USD", Direction::Long)],
            Collaborators {
                history: &FailingHistory,
                market: &market,
                agents: &duo(),
            },
            &mut rng,
            Some(&mut sink),
        )
        .err()
        .unwrap();

    assert!(format!("{err:#}").contains("cycle aborted"));
    assert!(sink.events.is_empty());
    assert!(e.store().last_assessment().is_none());
}

#[test]
fn unmet_coalition_blocks_every_proposal() {
    let history = StaticHistory::new(Vec::new());
    let market = StaticMarket::new().with_default(strong_context());
    let policy = GovernancePolicy {
        coalition: fxg_coalition::CoalitionPolicy {
            allow_support_injection: false,
            ..Default::default()
        },
        ..GovernancePolicy::default()
    };
    let mut e = GovernanceEngine::new(policy).unwrap();
    let solo = StaticAgents(vec![agent("alpha", 200, 0.55, 1.4)]);

    let report = run(
        &mut e,
        &history,
        &market,
        &solo,
        &[
            candidate("EUR/USD", Direction::Long),
            candidate("GBP/USD", Direction::Long),
        ],
    );
    assert!(!report.coalition.coalition_met);
    assert!(report.lead_agent.is_none());
    for o in &report.outcomes {
        assert_eq!(
            o.result.hard_block,
            Some(HardBlock::CoalitionNotMet {
                required: 2,
                available: 1
            })
        );
        assert!(o.sizing.is_none());
    }
}

#[test]
fn support_only_coalition_has_no_lead() {
    let history = StaticHistory::new(Vec::new());
    let market = StaticMarket::new().with_default(strong_context());
    let mut e = engine();

    let report = run(
        &mut e,
        &history,
        &market,
        &StaticAgents(Vec::<AgentStats>::new()),
        &[candidate("EUR/USD", Direction::Long)],
    );
    assert!(report.coalition.coalition_met);
    assert_eq!(report.coalition.promotions.len(), 2);
    assert_eq!(
        report.outcomes[0].result.hard_block,
        Some(HardBlock::NoDirectionalLead)
    );
}

#[test]
fn store_tracks_previous_state_across_cycles() {
    let market = StaticMarket::new().with_default(strong_context());
    let mut e = engine();

    let calm = StaticHistory::new(Vec::new()).with_total(600);
    let first = run(&mut e, &calm, &market, &duo(), &[]);
    assert_eq!(first.previous_state, None);
    assert_eq!(first.assessment.state, GovernanceState::Normal);

    let bad = StaticHistory::new(losing_streak()).with_total(630);
    let second = run(&mut e, &bad, &market, &duo(), &[]);
    assert_eq!(second.previous_state, Some(GovernanceState::Normal));
    assert_eq!(second.assessment.state, GovernanceState::Halt);
    assert_eq!(e.store().last_state(), Some(GovernanceState::Halt));
}

#[test]
fn cycle_emits_audit_events_in_order() {
    let history = StaticHistory::new(Vec::new());
    let market = StaticMarket::new().with_default(strong_context());
    let mut e = engine();
    let mut sink = MemoryAuditSink::default();
    let mut rng = StdRng::seed_from_u64(3);

    e.run_cycle(
        cycle_clock(),
        &[
            candidate("EUR/USD", Direction::Long),
            candidate("GBP/USD", Direction::Short),
        ],
        Collaborators {
            history: &history,
            market: &market,
            agents: &StaticAgents(Vec::new()),
        },
        &mut rng,
        Some(&mut sink),
    )
    .unwrap();

    let kinds: Vec<EventKind> = sink.events.iter().map(|(_, k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::GovernanceState,
            EventKind::CoalitionPromotion,
            EventKind::CoalitionPromotion,
            EventKind::ProposalDecision,
            EventKind::ProposalDecision,
            EventKind::CycleSummary,
        ]
    );
    let summary = sink.of_kind(EventKind::CycleSummary).next().unwrap();
    assert_eq!(summary["proposals"], 2);
    assert_eq!(summary["executable"], 0);
}
