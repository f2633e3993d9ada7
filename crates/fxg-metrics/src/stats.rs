use fxg_schemas::EPSILON;
use serde::{Deserialize, Serialize};

use crate::{
    PROFIT_FACTOR_SENTINEL, SLIPPAGE_ABSOLUTE_FLOOR_PIPS, SLIPPAGE_DRIFT_THRESHOLD,
    SLIPPAGE_MIN_SAMPLES, SLIPPAGE_RECENT_SAMPLES,
};

// ---------------------------------------------------------------------------
// Profit factor
// ---------------------------------------------------------------------------

/// PF = gross profit / gross loss, never infinite or NaN.
///
/// - gross loss ≈ 0, gross profit > 0 => [`PROFIT_FACTOR_SENTINEL`] (99)
/// - gross loss ≈ 0, gross profit ≈ 0 => 0
pub fn profit_factor(gross_profit: f64, gross_loss: f64) -> f64 {
    let gp = sanitize_non_negative(gross_profit);
    let gl = sanitize_non_negative(gross_loss);

    if gl <= EPSILON {
        if gp > EPSILON {
            PROFIT_FACTOR_SENTINEL
        } else {
            0.0
        }
    } else {
        gp / gl
    }
}

/// Same as [`profit_factor`] but reports "undefined" as `None` when gross loss ≈ 0.
pub fn profit_factor_opt(gross_profit: f64, gross_loss: f64) -> Option<f64> {
    let gl = sanitize_non_negative(gross_loss);
    if gl <= EPSILON {
        None
    } else {
        Some(sanitize_non_negative(gross_profit) / gl)
    }
}

fn sanitize_non_negative(v: f64) -> f64 {
    if v.is_finite() {
        v.abs()
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Drawdown
// ---------------------------------------------------------------------------

/// Largest peak-to-trough fall of the cumulative pip curve.
///
/// `pnl_chronological` must be oldest-first. The curve starts at 0.
pub fn max_drawdown_pips(pnl_chronological: &[f64]) -> f64 {
    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for &p in pnl_chronological {
        if !p.is_finite() {
            continue;
        }
        equity += p;
        if equity > peak {
            peak = equity;
        }
        let dd = peak - equity;
        if dd > max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

// ---------------------------------------------------------------------------
// Capture ratio
// ---------------------------------------------------------------------------

/// Fraction of the available move actually banked.
///
/// Input pairs are (realized pips, maximum favourable excursion pips).
/// Rows without a positive MFE are ignored; with none left the ratio is the
/// neutral 0.5.
pub fn capture_ratio(samples: &[(f64, f64)]) -> f64 {
    let mut captured = 0.0_f64;
    let mut available = 0.0_f64;

    for &(realized, mfe) in samples {
        if !realized.is_finite() || !mfe.is_finite() || mfe <= EPSILON {
            continue;
        }
        captured += realized.max(0.0);
        available += mfe;
    }

    if available <= EPSILON {
        0.5
    } else {
        (captured / available).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Entropy
// ---------------------------------------------------------------------------

/// Shannon entropy (bits) of a categorical count vector.
///
/// Zero-count buckets are skipped so `log(0)` never occurs. An empty or
/// all-zero vector has entropy 0.
pub fn shannon_entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;

    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Slippage drift
// ---------------------------------------------------------------------------

/// Comparison of the newest slippage samples against the older remainder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlippageDrift {
    pub samples: usize,
    pub recent_mean: f64,
    pub older_mean: f64,
    pub flagged: bool,
}

impl SlippageDrift {
    pub fn none() -> Self {
        Self {
            samples: 0,
            recent_mean: 0.0,
            older_mean: 0.0,
            flagged: false,
        }
    }
}

/// Detect slippage drift over newest-first absolute slippage samples.
///
/// Flagged when at least [`SLIPPAGE_MIN_SAMPLES`] exist and the mean of the
/// newest [`SLIPPAGE_RECENT_SAMPLES`] exceeds the older mean by more than
/// [`SLIPPAGE_DRIFT_THRESHOLD`]. With an older mean ≈ 0 the recent mean must
/// reach [`SLIPPAGE_ABSOLUTE_FLOOR_PIPS`] instead.
pub fn detect_slippage_drift(newest_first: &[f64]) -> SlippageDrift {
    let samples: Vec<f64> = newest_first
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .map(f64::abs)
        .collect();

    if samples.len() < SLIPPAGE_MIN_SAMPLES {
        return SlippageDrift {
            samples: samples.len(),
            ..SlippageDrift::none()
        };
    }

    let (recent, older) = samples.split_at(SLIPPAGE_RECENT_SAMPLES);
    let recent_mean = mean(recent);
    let older_mean = mean(older);

    let flagged = if older_mean <= EPSILON {
        recent_mean >= SLIPPAGE_ABSOLUTE_FLOOR_PIPS
    } else {
        recent_mean > older_mean * (1.0 + SLIPPAGE_DRIFT_THRESHOLD)
    };

    SlippageDrift {
        samples: samples.len(),
        recent_mean,
        older_mean,
        flagged,
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_of_uniform_three_way_split_is_log2_3() {
        let h = shannon_entropy(&[4, 4, 4]);
        assert!((h - 3f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn entropy_skips_empty_buckets() {
        assert_eq!(shannon_entropy(&[10, 0, 0]), 0.0);
        assert!((shannon_entropy(&[5, 5, 0]) - 1.0).abs() < 1e-12);
        assert_eq!(shannon_entropy(&[]), 0.0);
    }

    #[test]
    fn drawdown_tracks_single_running_peak() {
        // +10, -4, -8 (trough at -2 from peak 10 => dd 12), +20
        assert!((max_drawdown_pips(&[10.0, -4.0, -8.0, 20.0]) - 12.0).abs() < 1e-12);
        assert_eq!(max_drawdown_pips(&[]), 0.0);
    }

    #[test]
    fn drift_needs_eight_samples() {
        let d = detect_slippage_drift(&[3.0, 3.0, 3.0, 3.0, 3.0, 0.1, 0.1]);
        assert!(!d.flagged);
        assert_eq!(d.samples, 7);
    }

    #[test]
    fn drift_flags_forty_percent_rise() {
        // recent mean 1.5, older mean 1.0 => +50%
        let d = detect_slippage_drift(&[1.5, 1.5, 1.5, 1.5, 1.5, 1.0, 1.0, 1.0]);
        assert!(d.flagged);

        // recent mean 1.3, older mean 1.0 => +30%
        let d = detect_slippage_drift(&[1.3, 1.3, 1.3, 1.3, 1.3, 1.0, 1.0, 1.0]);
        assert!(!d.flagged);
    }
}
