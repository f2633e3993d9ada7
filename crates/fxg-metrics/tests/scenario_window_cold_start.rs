//! Cold start: fewer than 3 filled trades must return the neutral default,
//! never divide by zero, never panic.

use fxg_metrics::{compute_window, compute_windows, RollingWindowMetrics, WINDOW_SHORT};
use fxg_schemas::TradeStatus;
use fxg_testkit::TradeHistoryBuilder;

fn assert_neutral(m: &RollingWindowMetrics, expected_fills: usize) {
    assert!(m.neutral_default);
    assert_eq!(m.trade_count, expected_fills);
    assert_eq!(m.win_rate, 0.5);
    assert_eq!(m.expectancy_pips, 0.0);
    assert_eq!(m.capture_ratio, 0.5);
    assert_eq!(m.profit_factor, None);
    assert!(m.drawdown_slope.is_finite());
}

#[test]
fn empty_history_is_neutral() {
    let m = compute_window(&[], WINDOW_SHORT);
    assert_neutral(&m, 0);
    assert_eq!(m.rows_in_window, 0);
    assert_eq!(m.rejection_rate, 0.0);
    assert_eq!(m.decision_entropy, 0.0);
}

#[test]
fn two_fills_are_neutral_even_if_both_lost_big() {
    let history = TradeHistoryBuilder::new().loss(40.0).loss(55.0).build();
    let m = compute_window(&history, WINDOW_SHORT);
    assert_neutral(&m, 2);
}

#[test]
fn non_filled_rows_do_not_count_toward_minimum() {
    let history = TradeHistoryBuilder::new()
        .win(10.0)
        .rows(TradeStatus::Rejected, 6)
        .rows(TradeStatus::Open, 3)
        .win(5.0)
        .build();

    let m = compute_window(&history, WINDOW_SHORT);
    assert_neutral(&m, 2);
    // Decision-mix fields are still computed.
    assert_eq!(m.rows_in_window, 11);
    assert!((m.rejection_rate - 6.0 / 11.0).abs() < 1e-12);
    assert!(m.decision_entropy > 0.0);
}

#[test]
fn all_three_windows_neutral_on_cold_start() {
    let history = TradeHistoryBuilder::new().win(3.0).build();
    let w = compute_windows(&history);
    assert_neutral(&w.w20, 1);
    assert_neutral(&w.w50, 1);
    assert_neutral(&w.w200, 1);
}
