use serde::{Deserialize, Serialize};
use std::fmt;

/// Ailments a move can inflict. Confusion is tracked apart from the primary
/// status slot, so a combatant can be paralyzed and confused at once.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Paralyzed,
    Sleep,
    Confused,
    Poisoned,
}

impl StatusKind {
    pub fn is_primary(self) -> bool {
        !matches!(self, StatusKind::Confused)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusKind::Paralyzed => "PARALYZED",
            StatusKind::Sleep => "SLEEP",
            StatusKind::Confused => "CONFUSED",
            StatusKind::Poisoned => "POISONED",
        };
        write!(f, "{}", label)
    }
}

/// Stats that carry a stage modifier. Speed is deliberately absent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageStat {
    Attack,
    Defense,
    Accuracy,
    Evasion,
}

impl fmt::Display for StageStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            StageStat::Attack => "Attack",
            StageStat::Defense => "Defense",
            StageStat::Accuracy => "accuracy",
            StageStat::Evasion => "evasiveness",
        };
        write!(f, "{}", display_name)
    }
}
