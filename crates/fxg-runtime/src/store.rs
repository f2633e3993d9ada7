use std::collections::BTreeSet;

use fxg_governance::{GovernanceAssessment, GovernanceState};
use fxg_schemas::Pair;

/// Mutable governance state carried between cycles.
///
/// Lifecycle: built once at process start, mutated only through the methods
/// below, dropped with the engine. Nothing here is global.
#[derive(Clone, Debug, Default)]
pub struct GovernanceStore {
    last_assessment: Option<GovernanceAssessment>,
    shadow_mode: bool,
    pair_bypass: BTreeSet<Pair>,
}

impl GovernanceStore {
    pub fn new(shadow_mode: bool) -> Self {
        Self {
            shadow_mode,
            ..Self::default()
        }
    }

    /// Store this cycle's assessment; returns the previous effective state.
    pub fn record_assessment(&mut self, a: GovernanceAssessment) -> Option<GovernanceState> {
        let prev = self.last_state();
        self.last_assessment = Some(a);
        prev
    }

    pub fn last_assessment(&self) -> Option<&GovernanceAssessment> {
        self.last_assessment.as_ref()
    }

    pub fn last_state(&self) -> Option<GovernanceState> {
        self.last_assessment.as_ref().map(|a| a.state)
    }

    pub fn shadow_mode(&self) -> bool {
        self.shadow_mode
    }

    pub fn set_shadow_mode(&mut self, on: bool) {
        self.shadow_mode = on;
    }

    /// Exempt a pair from the state's pair restriction. Returns false if it already was.
    pub fn add_bypass(&mut self, pair: Pair) -> bool {
        self.pair_bypass.insert(pair)
    }

    pub fn remove_bypass(&mut self, pair: &Pair) -> bool {
        self.pair_bypass.remove(pair)
    }

    pub fn is_bypassed(&self, pair: &Pair) -> bool {
        self.pair_bypass.contains(pair)
    }

    pub fn bypassed_pairs(&self) -> impl Iterator<Item = &Pair> {
        self.pair_bypass.iter()
    }

    /// Back to the startup state. Shadow mode is kept.
    pub fn reset(&mut self) {
        self.last_assessment = None;
        self.pair_bypass.clear();
    }
}
