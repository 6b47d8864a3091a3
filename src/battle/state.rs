use crate::errors::{BattleResult, BattleStateError};
use crate::player::BattlePlayer;
use crate::pokemon::{Combatant, PanelData};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{StageStat, StatusKind};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattleSide {
    Player,
    Opponent,
}

impl BattleSide {
    pub fn to_index(self) -> usize {
        match self {
            BattleSide::Player => 0,
            BattleSide::Opponent => 1,
        }
    }

    pub fn opponent(self) -> BattleSide {
        match self {
            BattleSide::Player => BattleSide::Opponent,
            BattleSide::Opponent => BattleSide::Player,
        }
    }
}

impl fmt::Display for BattleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleSide::Player => write!(f, "player"),
            BattleSide::Opponent => write!(f, "opponent"),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    PlayerChoice,
    Resolving,
    Finished,
}

impl fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattlePhase::PlayerChoice => write!(f, "waiting for a choice"),
            BattlePhase::Resolving => write!(f, "resolving a turn"),
            BattlePhase::Finished => write!(f, "finished"),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    Win,
    Lose,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleOutcome::Win => write!(f, "win"),
            BattleOutcome::Lose => write!(f, "lose"),
        }
    }
}

/// What the opponent AI remembers about the player during one battle.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AiMemory {
    /// Times the player used each move, keyed by move id.
    pub move_usage: HashMap<String, u32>,
    pub player_super_effective_streak: u32,
}

impl AiMemory {
    pub fn record_player_move(&mut self, move_id: &str) {
        *self.move_usage.entry(move_id.to_string()).or_insert(0) += 1;
    }

    /// Track how hard the player's last hit landed.
    pub fn record_player_effectiveness(&mut self, multiplier: f64) {
        if multiplier > 1.0 {
            self.player_super_effective_streak += 1;
        } else if multiplier < 1.0 {
            self.player_super_effective_streak = self.player_super_effective_streak.saturating_sub(1);
        } else {
            self.player_super_effective_streak = 0;
        }
    }

    pub fn reset_streak(&mut self) {
        self.player_super_effective_streak = 0;
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailureReason {
    IsAsleep,
    IsParalyzed,
    HurtItselfInConfusion,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Turn management
    TurnStarted {
        turn_number: u32,
    },
    TurnEnded,

    // Switching
    PokemonSwitched {
        side: BattleSide,
        old_pokemon: String,
        new_pokemon: String,
        /// Sent in to replace a fainted combatant rather than by choice.
        replacement: bool,
    },

    // Moves
    MoveUsed {
        side: BattleSide,
        pokemon: String,
        move_id: String,
        move_name: String,
    },
    MoveMissed {
        attacker: String,
    },
    MoveFailed,
    CriticalHit,
    AttackTypeEffectiveness {
        multiplier: f64,
    },

    // HP
    DamageDealt {
        target: String,
        damage: u16,
        remaining_hp: u16,
    },
    PokemonHealed {
        target: String,
        amount: u16,
        new_hp: u16,
    },
    PokemonFainted {
        side: BattleSide,
        pokemon: String,
    },

    // Status
    StatusApplied {
        target: String,
        status: StatusKind,
    },
    StatusRemoved {
        target: String,
        status: StatusKind,
    },
    StatusDamage {
        target: String,
        status: StatusKind,
        damage: u16,
        remaining_hp: u16,
    },
    Confused {
        pokemon: String,
    },
    ActionPrevented {
        pokemon: String,
        reason: ActionFailureReason,
    },

    // Stat stages
    StatStageChanged {
        target: String,
        stat: StageStat,
        old_stage: i8,
        new_stage: i8,
    },
    StatChangeBlocked {
        target: String,
        stat: StageStat,
        rising: bool,
    },
    FocusEnergyRaised {
        pokemon: String,
    },
    Trapped {
        target: String,
    },

    /// HUD refresh for both sides. Never narrated.
    PanelsChanged {
        player: PanelData,
        opponent: PanelData,
    },

    BattleEnded {
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// Formats the event into the narration line shown to the player.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::TurnStarted { .. } | BattleEvent::TurnEnded => None,
            BattleEvent::PanelsChanged { .. } => None,

            BattleEvent::PokemonSwitched {
                side,
                old_pokemon,
                new_pokemon,
                replacement,
            } => Some(match (side, replacement) {
                (BattleSide::Player, true) => format!("Go! {}!", new_pokemon),
                (BattleSide::Player, false) => {
                    format!("Come back, {}! Go! {}!", old_pokemon, new_pokemon)
                }
                (BattleSide::Opponent, true) => format!("Foe sends out {}!", new_pokemon),
                (BattleSide::Opponent, false) => {
                    format!("Foe withdrew {} and sent out {}!", old_pokemon, new_pokemon)
                }
            }),

            BattleEvent::MoveUsed {
                pokemon, move_name, ..
            } => Some(format!("{} used {}!", pokemon, move_name)),
            BattleEvent::MoveMissed { attacker } => {
                Some(format!("{}'s attack missed!", attacker))
            }
            BattleEvent::MoveFailed => Some("But it failed!".to_string()),
            BattleEvent::CriticalHit => Some("A critical hit!".to_string()),
            BattleEvent::AttackTypeEffectiveness { multiplier } => match *multiplier {
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m < 1.0 => Some("It's not very effective...".to_string()),
                _ => None,
            },

            BattleEvent::DamageDealt { target, damage, .. } => {
                Some(format!("{} took {} damage!", target, damage))
            }
            BattleEvent::PokemonHealed { target, amount, .. } => {
                Some(format!("{} regained {} HP!", target, amount))
            }
            BattleEvent::PokemonFainted { pokemon, .. } => Some(format!("{} fainted!", pokemon)),

            BattleEvent::StatusApplied { target, status } => Some(format!(
                "{} {}",
                target,
                Self::format_status_applied(*status)
            )),
            BattleEvent::StatusRemoved { target, status } => Some(format!(
                "{} {}",
                target,
                Self::format_status_removed(*status)
            )),
            BattleEvent::StatusDamage { target, .. } => {
                Some(format!("{} is hurt by poison!", target))
            }
            BattleEvent::Confused { pokemon } => Some(format!("{} is confused!", pokemon)),
            BattleEvent::ActionPrevented { pokemon, reason } => Some(match reason {
                ActionFailureReason::IsAsleep => format!("{} is fast asleep.", pokemon),
                ActionFailureReason::IsParalyzed => format!("{} is fully paralyzed!", pokemon),
                ActionFailureReason::HurtItselfInConfusion => {
                    "It hurt itself in its confusion!".to_string()
                }
            }),

            BattleEvent::StatStageChanged {
                target,
                stat,
                old_stage,
                new_stage,
            } => {
                let verb = if new_stage > old_stage { "rose" } else { "fell" };
                Some(format!("{}'s {} {}!", target, stat, verb))
            }
            BattleEvent::StatChangeBlocked {
                target,
                stat,
                rising,
            } => {
                let direction = if *rising { "higher" } else { "lower" };
                Some(format!("{}'s {} won't go any {}!", target, stat, direction))
            }
            BattleEvent::FocusEnergyRaised { pokemon } => {
                Some(format!("{} is getting pumped!", pokemon))
            }
            BattleEvent::Trapped { target } => Some(format!("{} can no longer escape!", target)),

            BattleEvent::BattleEnded { outcome } => Some(match outcome {
                BattleOutcome::Win => "You won the battle!".to_string(),
                BattleOutcome::Lose => "You have no more Pokémon...".to_string(),
            }),
        }
    }

    fn format_status_applied(status: StatusKind) -> &'static str {
        match status {
            StatusKind::Paralyzed => "is paralyzed! It may be unable to move!",
            StatusKind::Sleep => "fell asleep!",
            StatusKind::Poisoned => "was poisoned!",
            StatusKind::Confused => "became confused!",
        }
    }

    fn format_status_removed(status: StatusKind) -> &'static str {
        match status {
            StatusKind::Sleep => "woke up!",
            StatusKind::Confused => "snapped out of its confusion!",
            StatusKind::Paralyzed => "was cured of its paralysis!",
            StatusKind::Poisoned => "was cured of its poison!",
        }
    }
}

/// Ordered record of everything that happened while resolving a turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Narration lines in order, skipping silent events.
    pub fn messages(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl IntoIterator for EventBus {
    type Item = BattleEvent;
    type IntoIter = std::vec::IntoIter<BattleEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Source of unit samples in [0, 1) for every random roll in a turn.
#[derive(Debug, Clone)]
pub enum TurnRng {
    Seeded(StdRng),
    Scripted { outcomes: Vec<f64>, index: usize },
}

impl TurnRng {
    pub fn new_random() -> Self {
        TurnRng::Seeded(StdRng::from_os_rng())
    }

    pub fn from_seed(seed: u64) -> Self {
        TurnRng::Seeded(StdRng::seed_from_u64(seed))
    }

    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        TurnRng::Scripted { outcomes, index: 0 }
    }

    pub fn next_unit(&mut self, reason: &str) -> f64 {
        let outcome = match self {
            TurnRng::Seeded(rng) => rng.random::<f64>(),
            TurnRng::Scripted { outcomes, index } => {
                let Some(outcome) = outcomes.get(*index).copied() else {
                    panic!(
                        "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                        reason
                    );
                };
                *index += 1;
                outcome
            }
        };
        tracing::trace!(outcome, reason, "rng consumed");
        outcome
    }

    /// Scripted values not yet consumed; always 0 for a seeded generator.
    pub fn remaining(&self) -> usize {
        match self {
            TurnRng::Seeded(_) => 0,
            TurnRng::Scripted { outcomes, index } => outcomes.len().saturating_sub(*index),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct BattleState {
    pub opponent_id: String,
    pub players: [BattlePlayer; 2],
    pub turn_number: u32,
    pub phase: BattlePhase,
    pub ai_memory: AiMemory,
}

impl BattleState {
    pub fn new(opponent_id: impl Into<String>, player: BattlePlayer, opponent: BattlePlayer) -> Self {
        Self {
            opponent_id: opponent_id.into(),
            players: [player, opponent],
            turn_number: 1,
            phase: BattlePhase::PlayerChoice,
            ai_memory: AiMemory::default(),
        }
    }

    pub fn player(&self, side: BattleSide) -> &BattlePlayer {
        &self.players[side.to_index()]
    }

    pub fn player_mut(&mut self, side: BattleSide) -> &mut BattlePlayer {
        &mut self.players[side.to_index()]
    }

    pub fn active(&self, side: BattleSide) -> BattleResult<&Combatant> {
        self.player(side)
            .active_pokemon()
            .ok_or_else(|| BattleStateError::NoActivePokemon(side).into())
    }

    pub fn active_mut(&mut self, side: BattleSide) -> BattleResult<&mut Combatant> {
        self.player_mut(side)
            .active_pokemon_mut()
            .ok_or_else(|| BattleStateError::NoActivePokemon(side).into())
    }

    pub fn panels_event(&self) -> BattleResult<BattleEvent> {
        Ok(BattleEvent::PanelsChanged {
            player: self.active(BattleSide::Player)?.panel_data(),
            opponent: self.active(BattleSide::Opponent)?.panel_data(),
        })
    }

    /// A trap only holds while its holder is still the opposing active
    /// combatant and has not fainted.
    pub fn is_trapped(&self, side: BattleSide) -> bool {
        let Some(pokemon) = self.player(side).active_pokemon() else {
            return false;
        };
        match pokemon.runtime.trapped_by {
            Some(trapper) => {
                let holder = self.player(trapper.side);
                holder.active_pokemon_index == trapper.index
                    && holder.active_pokemon().is_some_and(|p| !p.is_fainted())
            }
            None => false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == BattlePhase::Finished
    }
}
