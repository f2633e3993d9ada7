//! fxg-coalition
//!
//! Coalition Resolver.
//!
//! Rebuilds per-agent snapshots from aggregated history each cycle, decides
//! whether the coalition is a duo or a trio, and tops up the live pool from
//! bench, shadow, then support agents until the minimum holds.
//!
//! Deterministic logic. Randomness (lead selection) is always injected.

mod agent;
mod requirement;
mod resolver;
mod tier;

pub use agent::{AgentStats, SideStats};
pub use requirement::{
    resolve_requirement, survivorship_score, CoalitionRequirement, CoalitionTier, RequirementPolicy,
    StabilityTrend,
};
pub use resolver::{
    resolve_agent_snapshot, select_lead_agent, CoalitionPolicy, ExecutionSnapshot, Promotion,
    PromotionSource,
};
pub use tier::{
    classify_tier, snapshot_agent, AgentMetrics, AgentSnapshot, AgentTier, DeploymentState, Fleet,
    TierThresholds,
};

/// Solo execution is never allowed.
pub const MIN_COALITION: usize = 2;
