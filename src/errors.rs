use crate::battle::state::{BattlePhase, BattleSide};
use thiserror::Error;

/// Main error type for the battle engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleEngineError {
    /// Error related to invalid player input
    #[error("action error: {0}")]
    Action(#[from] ActionError),
    /// Error related to invalid battle state
    #[error("battle state error: {0}")]
    BattleState(#[from] BattleStateError),
    /// Error related to roster lookup or hydration
    #[error("roster error: {0}")]
    Roster(#[from] RosterError),
}

/// Player input that was rejected. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("no battle is in progress")]
    NoActiveBattle,
    #[error("input is not accepted while the battle is {0}")]
    NotAcceptingInput(BattlePhase),
    #[error("invalid move index: {0}")]
    InvalidMoveIndex(usize),
    #[error("no PP left for {0}")]
    NoPpRemaining(String),
    #[error("invalid team index: {0}")]
    InvalidPokemonIndex(usize),
    #[error("{0} has fainted and cannot battle")]
    PokemonFainted(String),
    #[error("{0} is already in battle")]
    AlreadyActive(String),
    #[error("{0} is trapped and cannot be switched out")]
    Trapped(String),
}

/// Errors related to battle state validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleStateError {
    /// No active combatant found when one was expected
    #[error("no active combatant on the {0} side")]
    NoActivePokemon(BattleSide),
    /// Battle state is in an inconsistent state
    #[error("inconsistent battle state: {0}")]
    InconsistentState(String),
}

/// Errors related to rosters and team selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("unknown opponent: {0}")]
    UnknownOpponent(String),
    #[error("the {0} roster is empty")]
    EmptyRoster(BattleSide),
    #[error("roster data is malformed: {0}")]
    MalformedData(String),
    #[error("a creature name is required")]
    InvalidName,
    #[error("{0} is already on the team")]
    AlreadySelected(String),
    #[error("the team already has {0} members")]
    TeamFull(usize),
    #[error("{0} is not available")]
    NotFound(String),
    #[error("{0} is not on the team")]
    NotSelected(String),
}

/// Errors raised while loading a battle configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("unknown opponent {id:?}, expected one of: {}", .known.join(", "))]
    UnknownOpponent { id: String, known: Vec<String> },
}

/// Failure reported by an external presentation or animation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{collaborator} failed: {reason}")]
pub struct CollaboratorError {
    pub collaborator: &'static str,
    pub reason: String,
}

impl CollaboratorError {
    pub fn new(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self {
            collaborator,
            reason: reason.into(),
        }
    }
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;
