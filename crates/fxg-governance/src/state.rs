use serde::{Deserialize, Serialize};

/// Governance states, declared in increasing severity so `Ord` follows severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GovernanceState {
    Normal,
    Defensive,
    Throttled,
    Halt,
}

impl GovernanceState {
    pub const ALL: [GovernanceState; 4] = [
        GovernanceState::Normal,
        GovernanceState::Defensive,
        GovernanceState::Throttled,
        GovernanceState::Halt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GovernanceState::Normal => "NORMAL",
            GovernanceState::Defensive => "DEFENSIVE",
            GovernanceState::Throttled => "THROTTLED",
            GovernanceState::Halt => "HALT",
        }
    }

    /// 0 (NORMAL) .. 3 (HALT).
    pub fn severity(&self) -> u8 {
        *self as u8
    }

    pub fn is_escalation_from(&self, previous: GovernanceState) -> bool {
        *self > previous
    }
}

impl std::fmt::Display for GovernanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GovernanceState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Ok(GovernanceState::Normal),
            "DEFENSIVE" => Ok(GovernanceState::Defensive),
            "THROTTLED" => Ok(GovernanceState::Throttled),
            "HALT" => Ok(GovernanceState::Halt),
            other => Err(format!("unknown governance state '{other}'")),
        }
    }
}
