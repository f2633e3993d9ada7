use fxg_metrics::{profit_factor, GovernanceWindows};
use serde::{Deserialize, Serialize};

use crate::agent::AgentStats;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoalitionTier {
    Duo,
    Trio,
}

impl CoalitionTier {
    pub fn min_agents(&self) -> usize {
        match self {
            CoalitionTier::Duo => 2,
            CoalitionTier::Trio => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityTrend {
    Improving,
    Flat,
    Deteriorating,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementPolicy {
    /// Below this many aggregate trades the coalition is always a duo.
    pub learning_milestone: u64,
    pub duo_min_survivorship: f64,
    pub duo_min_profit_factor: f64,
    /// |w50 − w200 expectancy| beyond this counts as a trend.
    pub trend_threshold_pips: f64,
}

impl Default for RequirementPolicy {
    fn default() -> Self {
        Self {
            learning_milestone: 500,
            duo_min_survivorship: 40.0,
            duo_min_profit_factor: 1.05,
            trend_threshold_pips: 0.25,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoalitionRequirement {
    pub tier: CoalitionTier,
    pub min_agents: usize,
    pub survivorship_score: f64,
    pub rolling_profit_factor: f64,
    pub expectancy_slope: f64,
    pub stability_trend: StabilityTrend,
    pub learning_phase: bool,
    pub total_trades: u64,
    pub reasons: Vec<String>,
}

/// Trade-weighted survivorship score in [0, 100].
///
/// Points: win rate 30 (capped at 55%), expectancy 25 (capped at +2 pips),
/// profit factor 30 (capped at 1.5), sample size 15 (capped at 500 trades).
pub fn survivorship_score(agents: &[AgentStats]) -> f64 {
    let trades: u64 = agents.iter().map(|a| a.trades).sum();
    if trades == 0 {
        return 0.0;
    }
    let wins: u64 = agents.iter().map(|a| a.wins).sum();
    let gp: f64 = agents.iter().map(|a| a.gross_profit_pips).sum();
    let gl: f64 = agents.iter().map(|a| a.gross_loss_pips).sum();

    let n = trades as f64;
    let win_rate = wins as f64 / n;
    let expectancy = (gp - gl) / n;
    let pf = profit_factor(gp, gl);

    let score = 30.0 * unit(win_rate / 0.55)
        + 25.0 * unit(expectancy / 2.0)
        + 30.0 * unit(pf / 1.5)
        + 15.0 * unit(n / 500.0);
    score.clamp(0.0, 100.0)
}

fn unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Decide duo vs trio for this cycle.
///
/// `windows` comes from the global trade history; when absent (or still at
/// the cold-start default) the rolling PF falls back to the agents' aggregate
/// and the trend reads flat.
pub fn resolve_requirement(
    policy: &RequirementPolicy,
    agents: &[AgentStats],
    windows: Option<&GovernanceWindows>,
) -> CoalitionRequirement {
    let total_trades: u64 = agents.iter().map(|a| a.trades).sum();
    let survivorship = survivorship_score(agents);

    let aggregate_pf = profit_factor(
        agents.iter().map(|a| a.gross_profit_pips).sum(),
        agents.iter().map(|a| a.gross_loss_pips).sum(),
    );

    let (rolling_pf, slope) = match windows {
        Some(w) if !w.w50.neutral_default => {
            let slope = if w.w200.neutral_default {
                0.0
            } else {
                w.w50.expectancy_pips - w.w200.expectancy_pips
            };
            (w.w50.profit_factor_or_sentinel(), slope)
        }
        _ => (aggregate_pf, 0.0),
    };

    let trend = if slope > policy.trend_threshold_pips {
        StabilityTrend::Improving
    } else if slope < -policy.trend_threshold_pips {
        StabilityTrend::Deteriorating
    } else {
        StabilityTrend::Flat
    };

    let learning_phase = total_trades < policy.learning_milestone;
    let mut reasons = Vec::new();

    let tier = if learning_phase {
        reasons.push(format!(
            "learning phase: {}/{} aggregate trades, duo enforced",
            total_trades, policy.learning_milestone
        ));
        CoalitionTier::Duo
    } else {
        if survivorship < policy.duo_min_survivorship {
            reasons.push(format!(
                "survivorship {:.1} < {:.1}",
                survivorship, policy.duo_min_survivorship
            ));
        }
        if rolling_pf < policy.duo_min_profit_factor {
            reasons.push(format!(
                "rolling profit factor {:.2} < {:.2}",
                rolling_pf, policy.duo_min_profit_factor
            ));
        }
        if trend == StabilityTrend::Deteriorating {
            reasons.push(format!("expectancy deteriorating (slope {slope:.2} pips)"));
        }

        if reasons.is_empty() {
            reasons.push(format!(
                "survivorship {:.1}, profit factor {:.2}, trend {:?}: duo sufficient",
                survivorship, rolling_pf, trend
            ));
            CoalitionTier::Duo
        } else {
            CoalitionTier::Trio
        }
    };

    CoalitionRequirement {
        tier,
        min_agents: tier.min_agents(),
        survivorship_score: survivorship,
        rolling_profit_factor: rolling_pf,
        expectancy_slope: slope,
        stability_trend: trend,
        learning_phase,
        total_trades,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_scores_zero() {
        assert_eq!(survivorship_score(&[]), 0.0);
    }

    #[test]
    fn perfect_pool_scores_hundred() {
        let a = AgentStats {
            agent_id: "a".into(),
            trades: 600,
            wins: 400,
            losses: 200,
            gross_profit_pips: 2400.0,
            gross_loss_pips: 600.0,
            ..AgentStats::default()
        };
        assert!((survivorship_score(&[a]) - 100.0).abs() < 1e-9);
    }
}
