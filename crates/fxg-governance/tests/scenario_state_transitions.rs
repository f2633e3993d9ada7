use fxg_governance::*;
use fxg_metrics::RollingWindowMetrics;
use fxg_testkit::window;

fn quiet() -> (RollingWindowMetrics, RollingWindowMetrics, RollingWindowMetrics) {
    (
        window(20, 20, 0.55, 1.2),
        window(50, 50, 0.55, 1.0),
        window(200, 200, 0.55, 1.1),
    )
}

#[test]
fn healthy_windows_are_normal() {
    let (w20, w50, w200) = quiet();
    let (state, reasons) = determine_state(&GovernanceThresholds::default(), &w20, &w50, &w200);
    assert_eq!(state, GovernanceState::Normal);
    assert_eq!(reasons.len(), 1);
}

#[test]
fn short_window_collapse_halts() {
    let (_, w50, w200) = quiet();
    let w20 = window(20, 8, 0.15, -8.0);
    let (state, reasons) = determine_state(&GovernanceThresholds::default(), &w20, &w50, &w200);
    assert_eq!(state, GovernanceState::Halt);
    assert!(reasons[0].contains("20-trade win rate 15.0%"));
}

#[test]
fn halt_needs_five_short_window_trades() {
    let (_, w50, w200) = quiet();
    let w20 = window(20, 4, 0.0, -20.0);
    let (state, _) = determine_state(&GovernanceThresholds::default(), &w20, &w50, &w200);
    assert_eq!(state, GovernanceState::Normal);
}

#[test]
fn friction_bleed_halts_from_medium_window() {
    let (w20, _, w200) = quiet();
    let w50 = RollingWindowMetrics {
        friction_adjusted_pnl_pips: -140.0,
        ..window(50, 30, 0.50, 0.5)
    };
    let (state, reasons) = determine_state(&GovernanceThresholds::default(), &w20, &w50, &w200);
    assert_eq!(state, GovernanceState::Halt);
    assert!(reasons[0].contains("friction-adjusted"));
}

#[test]
fn weak_medium_window_throttles() {
    let (w20, _, w200) = quiet();
    let w50 = window(50, 25, 0.30, -2.0);
    let (state, _) = determine_state(&GovernanceThresholds::default(), &w20, &w50, &w200);
    assert_eq!(state, GovernanceState::Throttled);
}

#[test]
fn negative_expectancy_alone_is_defensive() {
    let (w20, _, w200) = quiet();
    let w50 = window(50, 25, 0.45, -0.3);
    let (state, reasons) = determine_state(&GovernanceThresholds::default(), &w20, &w50, &w200);
    assert_eq!(state, GovernanceState::Defensive);
    assert_eq!(reasons.len(), 1);
}

#[test]
fn poor_long_window_capture_is_defensive() {
    let (w20, w50, _) = quiet();
    let w200 = RollingWindowMetrics {
        capture_ratio: 0.22,
        ..window(200, 120, 0.55, 0.8)
    };
    let (state, reasons) = determine_state(&GovernanceThresholds::default(), &w20, &w50, &w200);
    assert_eq!(state, GovernanceState::Defensive);
    assert!(reasons[0].contains("capture ratio"));

    // Same capture but below the 50-trade sample floor: ignored.
    let thin = RollingWindowMetrics {
        capture_ratio: 0.22,
        ..window(200, 40, 0.55, 0.8)
    };
    let (state, _) = determine_state(&GovernanceThresholds::default(), &w20, &w50, &thin);
    assert_eq!(state, GovernanceState::Normal);
}

#[test]
fn most_severe_state_wins() {
    // Both THROTTLED and DEFENSIVE conditions hold on w50, HALT on w20.
    let w20 = window(20, 10, 0.10, -9.0);
    let w50 = window(50, 30, 0.30, -3.0);
    let w200 = RollingWindowMetrics {
        capture_ratio: 0.1,
        ..window(200, 150, 0.4, -1.0)
    };
    let (state, _) = determine_state(&GovernanceThresholds::default(), &w20, &w50, &w200);
    assert_eq!(state, GovernanceState::Halt);
}

#[test]
fn cold_start_windows_never_transition() {
    let n20 = RollingWindowMetrics::neutral(20, 2);
    let n50 = RollingWindowMetrics::neutral(50, 2);
    let n200 = RollingWindowMetrics::neutral(200, 2);
    let (state, _) = determine_state(&GovernanceThresholds::default(), &n20, &n50, &n200);
    assert_eq!(state, GovernanceState::Normal);
}

#[test]
fn states_order_by_severity() {
    assert!(GovernanceState::Halt > GovernanceState::Throttled);
    assert!(GovernanceState::Throttled > GovernanceState::Defensive);
    assert!(GovernanceState::Defensive > GovernanceState::Normal);
    assert!(GovernanceState::Halt.is_escalation_from(GovernanceState::Normal));
    assert_eq!(
        "throttled".parse::<GovernanceState>().unwrap(),
        GovernanceState::Throttled
    );
}
