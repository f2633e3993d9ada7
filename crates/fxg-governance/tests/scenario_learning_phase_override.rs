//! Below the trade milestone the effective state is NORMAL regardless of
//! metrics, but execution-quality alarms still surface.

use fxg_governance::*;
use fxg_metrics::{GovernanceWindows, RollingWindowMetrics, SlippageDrift};
use fxg_testkit::window;

fn collapsing() -> GovernanceWindows {
    GovernanceWindows {
        w20: RollingWindowMetrics {
            mean_execution_quality: Some(22.0),
            ..window(20, 8, 0.15, -8.0)
        },
        w50: window(50, 30, 0.30, -3.0),
        w200: window(200, 30, 0.30, -3.0),
    }
}

#[test]
fn learning_phase_forces_normal_but_keeps_raw_state() {
    let cfg = GovernanceConfig::default();
    let a = assess_governance(&cfg, &collapsing(), 120);

    assert!(a.learning_phase);
    assert_eq!(a.state, GovernanceState::Normal);
    assert_eq!(a.raw_state, GovernanceState::Halt);
    assert!(a.overridden());
    assert!(a.reasons[0].contains("learning phase: 120/500"));
    assert!(a.reasons.iter().any(|r| r.contains("20-trade win rate")));
    assert_eq!(a.config, cfg.table.normal);
}

#[test]
fn catastrophic_execution_quality_warns_during_learning() {
    let a = assess_governance(&GovernanceConfig::default(), &collapsing(), 10);
    assert_eq!(a.state, GovernanceState::Normal);
    assert_eq!(a.warnings.len(), 1);
    assert!(a.warnings[0].contains("catastrophic execution quality"));
}

#[test]
fn past_milestone_metrics_take_effect() {
    let cfg = GovernanceConfig::default();
    let a = assess_governance(&cfg, &collapsing(), 500);
    assert!(!a.learning_phase);
    assert_eq!(a.state, GovernanceState::Halt);
    assert_eq!(a.config.sizing_multiplier, cfg.table.halt.sizing_multiplier);
    assert_eq!(a.config.pair_restriction, PairRestriction::MajorsOnly);
}

#[test]
fn milestone_is_configurable() {
    let cfg = GovernanceConfig {
        learning: LearningPhasePolicy {
            milestone: 100,
            exec_quality_floor: 40.0,
        },
        ..GovernanceConfig::default()
    };
    let a = assess_governance(&cfg, &collapsing(), 120);
    assert!(!a.learning_phase);
    assert_eq!(a.state, GovernanceState::Halt);
}

#[test]
fn slippage_drift_is_reported_as_warning() {
    let mut w = GovernanceWindows {
        w20: window(20, 20, 0.55, 1.0),
        w50: window(50, 50, 0.55, 1.0),
        w200: window(200, 200, 0.55, 1.0),
    };
    w.w50.slippage_drift = SlippageDrift {
        samples: 40,
        recent_mean: 1.8,
        older_mean: 0.6,
        flagged: true,
    };
    let a = assess_governance(&GovernanceConfig::default(), &w, 900);
    assert_eq!(a.state, GovernanceState::Normal);
    assert!(a.warnings[0].contains("50-trade window"));
}

#[test]
fn halt_keeps_minimum_viable_parameters() {
    let table = StateTable::default();
    let halt = table.config_for(GovernanceState::Halt);
    assert!(halt.density_multiplier > 0.0);
    assert!(halt.sizing_multiplier > 0.0);
    assert!(!halt.session_blocked(fxg_schemas::Session::LondonOpen));
    assert!(halt.session_blocked(fxg_schemas::Session::LateNy));
    assert!(!halt.recovery_conditions.is_empty());
}

#[test]
fn state_table_roundtrips_through_json() {
    let table = StateTable::default();
    let json = serde_json::to_string(&table).unwrap();
    let back: StateTable = serde_json::from_str(&json).unwrap();
    assert_eq!(table, back);

    let partial: StateTable = serde_json::from_str(r#"{"table_version":"custom"}"#).unwrap();
    assert_eq!(partial.table_version, "custom");
    assert_eq!(partial.halt, table.halt);
}
