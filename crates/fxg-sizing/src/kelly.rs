use fxg_schemas::VolatilityPhase;

use crate::policy::KellyPolicy;

/// Full Kelly fraction f* = p − (1 − p) / b, with b = avg win ÷ avg loss.
///
/// A zero average loss means b → ∞ and f* → p. Non-finite input yields 0.
pub fn kelly_fraction(win_probability: f64, avg_win_pips: f64, avg_loss_pips: f64) -> f64 {
    if !win_probability.is_finite() || !avg_win_pips.is_finite() || !avg_loss_pips.is_finite() {
        return 0.0;
    }
    let p = win_probability.clamp(0.0, 1.0);
    let loss = avg_loss_pips.abs();
    if loss <= fxg_schemas::EPSILON {
        return p;
    }
    let b = avg_win_pips.abs() / loss;
    if b <= fxg_schemas::EPSILON {
        return 0.0;
    }
    p - (1.0 - p) / b
}

/// Regime-weighted fractional-Kelly multiplier (unbounded; the stack clamps it).
///
/// Negative edge gives 0, which the regime bounds lift to their floor.
pub fn kelly_multiplier(
    policy: &KellyPolicy,
    win_probability: f64,
    avg_win_pips: f64,
    avg_loss_pips: f64,
    phase: VolatilityPhase,
) -> f64 {
    let f = kelly_fraction(win_probability, avg_win_pips, avg_loss_pips).max(0.0);
    if policy.reference <= 0.0 {
        return 0.0;
    }
    f * policy.fraction / policy.reference * policy.phase_weight(phase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_matches_closed_form() {
        // p = 0.6, b = 1 → 0.2
        assert!((kelly_fraction(0.6, 10.0, 10.0) - 0.2).abs() < 1e-12);
        // p = 0.4, b = 2 → 0.1
        assert!((kelly_fraction(0.4, 20.0, 10.0) - 0.1).abs() < 1e-12);
        assert_eq!(kelly_fraction(0.7, 10.0, 0.0), 0.7);
        assert_eq!(kelly_fraction(f64::NAN, 10.0, 5.0), 0.0);
    }

    #[test]
    fn negative_edge_is_zero_multiplier() {
        let k = KellyPolicy::default();
        assert_eq!(
            kelly_multiplier(&k, 0.3, 5.0, 10.0, VolatilityPhase::Ignition),
            0.0
        );
    }

    #[test]
    fn quarter_kelly_at_reference_is_phase_weight() {
        let k = KellyPolicy::default();
        // f* = 0.2 → quarter 0.05 = reference.
        let m = kelly_multiplier(&k, 0.6, 10.0, 10.0, VolatilityPhase::Expansion);
        assert!((m - 1.1).abs() < 1e-9);
    }
}
