use std::collections::VecDeque;

use crate::battle::state::{BattleSide, BattleState};
use crate::battle::stats::effective_speed;
use crate::player::PlayerAction;

/// Internal action types for the action stack.
/// These represent atomic actions that can be executed during battle resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleAction {
    Switch { side: BattleSide, team_index: usize },
    UseMove { side: BattleSide, move_index: usize },
}

impl BattleAction {
    pub fn side(&self) -> BattleSide {
        match self {
            BattleAction::Switch { side, .. } | BattleAction::UseMove { side, .. } => *side,
        }
    }
}

#[derive(Debug, Default)]
pub struct ActionStack {
    actions: VecDeque<BattleAction>,
}

// Sort key for one queued action. Compared field by field, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ActionPriority {
    action_priority: i8, // Switch: 6, Move: 0
    move_priority: i8,   // Priority from move data (e.g., Quick Attack)
    speed: u16,          // Effective speed for tiebreaking
}

impl ActionStack {
    /// Order this turn's chosen actions: switches first, then by move
    /// priority, then by speed. A full tie keeps submission order.
    pub fn build_initial(battle_state: &BattleState, chosen: &[(BattleSide, PlayerAction)]) -> Self {
        let mut keyed: Vec<(ActionPriority, BattleAction)> = chosen
            .iter()
            .filter_map(|(side, action)| Self::convert_player_action(battle_state, *side, action))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| b.cmp(a));

        Self {
            actions: keyed.into_iter().map(|(_, action)| action).collect(),
        }
    }

    fn convert_player_action(
        battle_state: &BattleState,
        side: BattleSide,
        action: &PlayerAction,
    ) -> Option<(ActionPriority, BattleAction)> {
        let pokemon = battle_state.active(side).ok()?;
        let speed = effective_speed(pokemon);

        match *action {
            PlayerAction::SwitchPokemon { team_index } => Some((
                ActionPriority {
                    action_priority: 6,
                    move_priority: 0,
                    speed,
                },
                BattleAction::Switch { side, team_index },
            )),
            PlayerAction::UseMove { move_index } => {
                let move_priority = pokemon.moves.get(move_index)?.data.priority;
                Some((
                    ActionPriority {
                        action_priority: 0,
                        move_priority,
                        speed,
                    },
                    BattleAction::UseMove { side, move_index },
                ))
            }
            PlayerAction::Pass => None,
        }
    }

    pub fn pop_front(&mut self) -> Option<BattleAction> {
        self.actions.pop_front()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}
