use fxg_metrics::{
    compute_window, profit_factor, PROFIT_FACTOR_SENTINEL, WINDOW_LONG, WINDOW_MEDIUM, WINDOW_SHORT,
};
use fxg_schemas::TradeStatus;
use fxg_testkit::TradeHistoryBuilder;

#[test]
fn window_takes_newest_rows_only() {
    // 30 old losers, then 20 recent winners. The 20-window sees only winners.
    let history = TradeHistoryBuilder::new()
        .losses(30, 10.0)
        .wins(20, 5.0)
        .build();

    let w20 = compute_window(&history, WINDOW_SHORT);
    assert_eq!(w20.trade_count, 20);
    assert_eq!(w20.win_rate, 1.0);
    assert!((w20.expectancy_pips - 5.0).abs() < 1e-6);

    let w50 = compute_window(&history, WINDOW_MEDIUM);
    assert_eq!(w50.trade_count, 50);
    assert!((w50.win_rate - 0.4).abs() < 1e-12);
    assert!((w50.expectancy_pips - (100.0 - 300.0) / 50.0).abs() < 1e-6);

    let w200 = compute_window(&history, WINDOW_LONG);
    assert_eq!(w200.trade_count, 50);
    assert_eq!(w200.rows_in_window, 50);
}

#[test]
fn profit_factor_and_sentinels() {
    let history = TradeHistoryBuilder::new()
        .win(30.0)
        .loss(10.0)
        .win(10.0)
        .loss(10.0)
        .build();
    let m = compute_window(&history, WINDOW_SHORT);
    assert!((m.profit_factor.unwrap() - 2.0).abs() < 1e-6);
    assert!((m.profit_factor_or_sentinel() - 2.0).abs() < 1e-6);

    // All winners: PF undefined in the window, sentinel 99 when forced.
    let winners = TradeHistoryBuilder::new().wins(5, 4.0).build();
    let m = compute_window(&winners, WINDOW_SHORT);
    assert_eq!(m.profit_factor, None);
    assert_eq!(m.profit_factor_or_sentinel(), PROFIT_FACTOR_SENTINEL);

    assert_eq!(profit_factor(0.0, 0.0), 0.0);
    assert_eq!(profit_factor(12.0, 0.0), PROFIT_FACTOR_SENTINEL);
    assert_eq!(profit_factor(f64::NAN, f64::INFINITY), 0.0);
}

#[test]
fn drawdown_slope_is_max_drawdown_over_trade_count() {
    // Chronological: +10, -6, -6, +2 => peak 10, trough -2 => dd 12 over 4 trades.
    let history = TradeHistoryBuilder::new()
        .win(10.0)
        .loss(6.0)
        .loss(6.0)
        .win(2.0)
        .build();
    let m = compute_window(&history, WINDOW_SHORT);
    assert!((m.max_drawdown_pips - 12.0).abs() < 1e-6);
    assert!((m.drawdown_slope - 3.0).abs() < 1e-6);
}

#[test]
fn friction_adjusted_pnl_subtracts_spread_and_slippage() {
    let history = TradeHistoryBuilder::new()
        .win(10.0)
        .with_last(|r| {
            r.spread_pips = Some(1.0);
            r.slippage_pips = Some(0.5);
        })
        .win(10.0)
        .with_last(|r| r.spread_pips = Some(1.0))
        .loss(5.0)
        .build();
    let m = compute_window(&history, WINDOW_SHORT);
    assert!((m.friction_adjusted_pnl_pips - (15.0 - 2.5)).abs() < 1e-6);
}

#[test]
fn capture_ratio_uses_mfe_rows_only() {
    let history = TradeHistoryBuilder::new()
        .win(6.0)
        .with_last(|r| r.mfe_pips = Some(10.0))
        .win(4.0)
        .with_last(|r| r.mfe_pips = Some(10.0))
        .loss(3.0)
        .with_last(|r| r.mfe_pips = Some(5.0))
        .win(50.0)
        .build();
    let m = compute_window(&history, WINDOW_SHORT);
    // (6 + 4 + 0) / (10 + 10 + 5)
    assert!((m.capture_ratio - 0.4).abs() < 1e-6);
}

#[test]
fn entropy_and_rejection_rate_cover_all_rows() {
    let history = TradeHistoryBuilder::new()
        .wins(3, 2.0)
        .rows(TradeStatus::Skipped, 3)
        .rows(TradeStatus::Blocked, 3)
        .build();
    let m = compute_window(&history, WINDOW_SHORT);
    assert!((m.decision_entropy - 3f64.log2()).abs() < 1e-9);
    assert!((m.rejection_rate - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn slippage_drift_flags_recent_deterioration() {
    let mut b = TradeHistoryBuilder::new();
    for _ in 0..6 {
        b = b.win(2.0).with_last(|r| r.slippage_pips = Some(0.5));
    }
    for _ in 0..5 {
        b = b.loss(2.0).with_last(|r| r.slippage_pips = Some(1.2));
    }
    let m = compute_window(&b.build(), WINDOW_SHORT);
    assert_eq!(m.slippage_drift.samples, 11);
    assert!((m.slippage_drift.recent_mean - 1.2).abs() < 1e-9);
    assert!((m.slippage_drift.older_mean - 0.5).abs() < 1e-9);
    assert!(m.slippage_drift.flagged);
}

#[test]
fn execution_quality_mean_is_optional() {
    let history = TradeHistoryBuilder::new()
        .win(1.0)
        .with_last(|r| r.execution_quality = Some(80.0))
        .win(1.0)
        .with_last(|r| r.execution_quality = Some(40.0))
        .win(1.0)
        .build();
    let m = compute_window(&history, WINDOW_SHORT);
    assert_eq!(m.mean_execution_quality, Some(60.0));

    let plain = TradeHistoryBuilder::new().wins(4, 1.0).build();
    assert_eq!(
        compute_window(&plain, WINDOW_SHORT).mean_execution_quality,
        None
    );
}
