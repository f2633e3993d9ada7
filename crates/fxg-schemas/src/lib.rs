//! fxg-schemas
//!
//! Shared data model for the governance workspace.
//!
//! - Currency pairs and pip arithmetic
//! - Market-state labels (direction, session, volatility phase, sequencing)
//! - Trade-history rows as read from the persistence collaborator
//!
//! Pure types. No IO, no wall-clock.

mod market;
mod pair;
mod session;
mod trade;

pub use market::{AgentRole, Direction, SequencingCluster, Session, VolatilityPhase};
pub use pair::{Pair, PairError, MAJOR_PAIRS};
pub use session::classify_session;
pub use trade::{DecisionBucket, TradeRecord, TradeStatus};

/// Tolerance used for "≈ 0" comparisons on pip and ratio values.
pub const EPSILON: f64 = 1e-9;
