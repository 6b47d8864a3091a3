// In: src/lib.rs

//! Exploration Battle Engine
//!
//! Turn-based creature battles for a 3D exploration game: a synchronous turn
//! resolver, a heuristic opponent, and an async controller that plays each
//! turn back through injected presentation and animation collaborators.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod errors;
pub mod move_data;
pub mod player;
pub mod pokemon;
pub mod teams;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Re-export all core data definitions and static enums.
pub use schema::{
    // Supporting Types & Enums
    BaseStats,
    // Core Data Structs
    CreatureTemplate,
    // Core Enums
    PokemonType,
    SpriteDescriptor,
    SpriteSheet,
    StageStat,
    StatusKind,
};

// --- From this crate's modules (`src/`) ---

// Core battle engine functions and state.
pub use battle::ai::ScoringAI;
pub use battle::controller::{
    ActionId, BattleController, BattleEndHandler, BattlePresenter, MenuMode, MoveAnimator,
    MoveOption, NoAnimation, SwitchOption,
};
pub use battle::engine::{get_valid_actions, resolve_turn, validate_player_action};
pub use battle::state::{BattleEvent, BattleOutcome, BattlePhase, BattleSide, BattleState, EventBus, TurnRng};

// Core runtime types for a battle.
pub use player::{BattlePlayer, PlayerAction};
pub use pokemon::{Combatant, PanelData, StatusCondition};

// Primary data access functions.
pub use move_data::{get_move_data, instantiate, MoveData, MoveInstance};
pub use teams::{npc_team, player_choices, TeamSelection};

// Configuration.
pub use config::{AiConfig, BattleConfig};

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleResult, BattleStateError, CollaboratorError, ConfigError,
    RosterError,
};
