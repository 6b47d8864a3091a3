use crate::pokemon::Combatant;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    // The index refers to the move's position (0-3) in the active combatant's move list.
    UseMove { move_index: usize },

    // The index refers to the combatant's position in the player's roster.
    SwitchPokemon { team_index: usize },

    // Nothing left to use; the opponent still acts.
    Pass,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BattlePlayer {
    pub player_name: String,

    // Roster in battle order. Never empty once a battle has started.
    pub team: Vec<Combatant>,

    pub active_pokemon_index: usize,
}

impl BattlePlayer {
    pub fn new(player_name: impl Into<String>, team: Vec<Combatant>) -> Self {
        BattlePlayer {
            player_name: player_name.into(),
            team,
            active_pokemon_index: 0,
        }
    }

    /// Get the currently active combatant
    pub fn active_pokemon(&self) -> Option<&Combatant> {
        self.team.get(self.active_pokemon_index)
    }

    /// Get the currently active combatant mutably
    pub fn active_pokemon_mut(&mut self) -> Option<&mut Combatant> {
        self.team.get_mut(self.active_pokemon_index)
    }

    pub fn has_living_pokemon(&self) -> bool {
        self.team.iter().any(|p| !p.is_fainted())
    }

    /// Living members other than the active one, in roster order.
    pub fn bench_indices(&self) -> Vec<usize> {
        self.team
            .iter()
            .enumerate()
            .filter(|(i, p)| *i != self.active_pokemon_index && !p.is_fainted())
            .map(|(i, _)| i)
            .collect()
    }

    /// First living member at or after `from`, wrapping to the start of the roster.
    pub fn next_living_from(&self, from: usize) -> Option<usize> {
        let len = self.team.len();
        (0..len)
            .map(|offset| (from + offset) % len)
            .find(|&i| !self.team[i].is_fainted())
    }

    /// Switch the active combatant. Stat stages live on the combatant and are
    /// not cleared.
    pub fn switch_pokemon(&mut self, new_index: usize) -> Result<(), String> {
        match self.team.get(new_index) {
            Some(p) if !p.is_fainted() => {
                self.active_pokemon_index = new_index;
                Ok(())
            }
            Some(_) => Err("Cannot switch to a fainted combatant".to_string()),
            None => Err("Invalid team index".to_string()),
        }
    }
}
