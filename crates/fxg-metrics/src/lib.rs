//! fxg-metrics
//!
//! Rolling Metrics Engine.
//!
//! Reduces a newest-first trade history into fixed-size windowed statistics.
//! Windows are recomputed from scratch on every governance cycle; nothing here
//! keeps running counters, so entropy and drift always reflect exactly the
//! rows inside the window.
//!
//! Deterministic, pure logic. No IO, no time.

mod stats;
mod window;

pub use stats::{
    capture_ratio, detect_slippage_drift, max_drawdown_pips, profit_factor, profit_factor_opt,
    shannon_entropy, SlippageDrift,
};
pub use window::{compute_window, compute_windows, GovernanceWindows, RollingWindowMetrics};

/// Short governance window (trades).
pub const WINDOW_SHORT: usize = 20;
/// Medium governance window (trades).
pub const WINDOW_MEDIUM: usize = 50;
/// Long governance window (trades).
pub const WINDOW_LONG: usize = 200;

/// Below this many filled trades a window returns the neutral default.
pub const MIN_FILLED_TRADES: usize = 3;

/// Profit factor reported when gross loss ≈ 0 but gross profit > 0.
pub const PROFIT_FACTOR_SENTINEL: f64 = 99.0;

/// Slippage drift: number of newest samples compared against the rest.
pub const SLIPPAGE_RECENT_SAMPLES: usize = 5;
/// Slippage drift: minimum samples before drift is evaluated at all.
pub const SLIPPAGE_MIN_SAMPLES: usize = 8;
/// Slippage drift: recent mean must exceed older mean by more than this fraction.
pub const SLIPPAGE_DRIFT_THRESHOLD: f64 = 0.40;
/// Slippage drift: absolute floor used when the older mean is ≈ 0.
pub const SLIPPAGE_ABSOLUTE_FLOOR_PIPS: f64 = 0.5;
