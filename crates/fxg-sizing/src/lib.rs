//! fxg-sizing
//!
//! Position Sizing Stack.
//!
//! Risk-normalized base units, then six independently bounded multipliers
//! applied in a fixed order, then a hard clamp to the unit range.
//!
//! Deterministic, pure logic. No IO, no time, no broker calls.

mod kelly;
mod policy;
mod stack;

pub use kelly::{kelly_fraction, kelly_multiplier};
pub use policy::{
    Bounds, DiscoveryEnvironment, DiscoveryTable, KellyPolicy, PairPerformance, RoleFactors,
    SizingPolicy,
};
pub use stack::{
    base_units, compute_position_size, pair_capital_multiplier, SizingBreakdown, SizingInput,
};
