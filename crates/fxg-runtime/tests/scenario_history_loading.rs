use fxg_runtime::{load_history, pair_performance};
use fxg_schemas::{Pair, TradeStatus};
use fxg_testkit::{write_history_csv, write_history_json, TradeHistoryBuilder};

fn sample() -> Vec<fxg_schemas::TradeRecord> {
    TradeHistoryBuilder::new()
        .win(8.0)
        .loss(4.0)
        .with_last(|r| r.spread_pips = Some(0.8))
        .rows(TradeStatus::Skipped, 2)
        .pair("USD/JPY")
        .win(12.0)
        .build()
}

#[test]
fn json_and_csv_load_the_same_rows() {
    let dir = tempfile::tempdir().unwrap();
    let rows = sample();

    let json = dir.path().join("history.json");
    write_history_json(&json, &rows).unwrap();
    let csv = dir.path().join("history.csv");
    write_history_csv(&csv, &rows).unwrap();

    let from_json = load_history(&json).unwrap();
    let from_csv = load_history(&csv).unwrap();

    assert_eq!(from_json.len(), 5);
    assert_eq!(from_csv.len(), 5);
    for (a, b) in from_json.iter().zip(&from_csv) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.status, b.status);
        assert_eq!(a.session, b.session);
        assert_eq!(a.spread_pips, b.spread_pips);
    }
    assert_eq!(from_csv[0].pair.as_str(), "USD/JPY");
    assert_eq!(from_csv[2].exit_price, None);
}

#[test]
fn rows_come_back_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = sample();
    rows.reverse();

    let path = dir.path().join("history.json");
    write_history_json(&path, &rows).unwrap();
    let loaded = load_history(&path).unwrap();
    assert!(loaded.windows(2).all(|w| w[0].opened_at >= w[1].opened_at));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.txt");
    std::fs::write(&path, "[]").unwrap();
    let err = load_history(&path).unwrap_err();
    assert!(err.to_string().contains("unsupported history format"));
}

#[test]
fn pair_performance_filters_by_pair() {
    let history = TradeHistoryBuilder::new()
        .wins(3, 10.0)
        .loss(10.0)
        .pair("GBP/USD")
        .losses(5, 3.0)
        .build();

    let eur = pair_performance(&history, &Pair::parse("EUR/USD").unwrap());
    assert_eq!(eur.trades, 4);
    assert!((eur.win_rate - 0.75).abs() < 1e-12);
    assert!((eur.expectancy_pips - 5.0).abs() < 1e-6);
    assert!(eur.sharpe.unwrap() > 0.0);

    // Identical losses: zero variance, no Sharpe.
    let gbp = pair_performance(&history, &Pair::parse("GBP/USD").unwrap());
    assert_eq!(gbp.trades, 5);
    assert_eq!(gbp.sharpe, None);

    let none = pair_performance(&history, &Pair::parse("AUD/USD").unwrap());
    assert_eq!(none.trades, 0);
}
