use anyhow::{bail, Context, Result};
use fxg_coalition::CoalitionPolicy;
use fxg_config::LoadedConfig;
use fxg_decision::DecisionPolicy;
use fxg_governance::GovernanceConfig;
use fxg_sizing::SizingPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cycle-level knobs that belong to no single component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Executable approvals per cycle at density 1.0.
    pub max_trades_per_cycle: u32,
    /// Evaluate everything, execute nothing.
    pub shadow_mode: bool,
    /// Account balance handed to the sizing stack (account currency).
    pub account_balance: f64,
    /// Pairs exempt from the state's pair restriction at startup.
    pub pair_bypass: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_trades_per_cycle: 4,
            shadow_mode: false,
            account_balance: 10_000.0,
            pair_bypass: Vec::new(),
        }
    }
}

/// Every typed policy the engine consumes, read from one merged config tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernancePolicy {
    pub governance: GovernanceConfig,
    pub decision: DecisionPolicy,
    pub coalition: CoalitionPolicy,
    pub sizing: SizingPolicy,
    pub runtime: RuntimeConfig,
}

impl GovernancePolicy {
    /// Read the five policy sections. Missing sections and fields take their defaults;
    /// anything outside them (e.g. `/engine`) is ignored here.
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let section = |name: &str| -> Value {
            config_json
                .get(name)
                .cloned()
                .filter(|v| !v.is_null())
                .unwrap_or_else(|| Value::Object(Default::default()))
        };

        let policy = Self {
            governance: serde_json::from_value(section("governance"))
                .context("invalid /governance policy")?,
            decision: serde_json::from_value(section("decision"))
                .context("invalid /decision policy")?,
            coalition: serde_json::from_value(section("coalition"))
                .context("invalid /coalition policy")?,
            sizing: serde_json::from_value(section("sizing")).context("invalid /sizing policy")?,
            runtime: serde_json::from_value(section("runtime"))
                .context("invalid /runtime policy")?,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Reject bounds the clamps cannot honour: reversed, non-finite, or a
    /// zero multiplier floor.
    pub fn validate(&self) -> Result<()> {
        let m = self.decision.multipliers.bounds;
        if !m.is_valid() {
            bail!(
                "invalid /decision policy: multipliers.bounds must be finite with 0 < min <= max \
                 (min={}, max={})",
                m.min,
                m.max
            );
        }
        for (name, b) in self.sizing.bounds() {
            if !b.is_valid() {
                bail!(
                    "invalid /sizing policy: {name} must be finite with min <= max \
                     (min={}, max={})",
                    b.min,
                    b.max
                );
            }
        }
        Ok(())
    }

    pub fn from_loaded(cfg: &LoadedConfig) -> Result<Self> {
        Self::from_config_json(&cfg.config_json)
    }
}
