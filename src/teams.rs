use crate::battle::state::BattleSide;
use crate::errors::RosterError;
use schema::CreatureTemplate;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Largest team a player can take into battle.
pub const MAX_TEAM_SIZE: usize = 3;

const TEAMS_RON: &str = include_str!("../data/teams.ron");

/// A trainer the player can be challenged by.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NpcTeam {
    pub name: String,
    pub trainer_id: String,
    pub level_cap: u8,
    pub pokemon: Vec<CreatureTemplate>,
}

#[derive(Debug, Deserialize)]
struct Registry {
    player_choices: Vec<CreatureTemplate>,
    npc_teams: HashMap<String, NpcTeam>,
}

// Parsed once on first use.
static REGISTRY: LazyLock<Result<Registry, RosterError>> = LazyLock::new(|| {
    ron::from_str(TEAMS_RON).map_err(|e| {
        tracing::error!(error = %e, "embedded roster data failed to parse");
        RosterError::MalformedData(e.to_string())
    })
});

fn registry() -> Result<&'static Registry, RosterError> {
    REGISTRY.as_ref().map_err(Clone::clone)
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Creatures the player may pick their team from, in menu order.
pub fn player_choices() -> Result<&'static [CreatureTemplate], RosterError> {
    Ok(&registry()?.player_choices)
}

/// Look up a trainer team by opponent id (case-sensitive, e.g. `kidJonathan`).
pub fn npc_team(id: &str) -> Result<&'static NpcTeam, RosterError> {
    let team = registry()?
        .npc_teams
        .get(id)
        .ok_or_else(|| RosterError::UnknownOpponent(id.to_string()))?;
    if team.pokemon.is_empty() {
        return Err(RosterError::EmptyRoster(BattleSide::Opponent));
    }
    Ok(team)
}

/// All known opponent ids, sorted.
pub fn npc_team_ids() -> Vec<String> {
    let mut ids: Vec<String> = registry()
        .map(|r| r.npc_teams.keys().cloned().collect())
        .unwrap_or_default();
    ids.sort();
    ids
}

/// Find a player choice by name, ignoring case and surrounding whitespace.
pub fn find_choice(name: &str) -> Result<&'static CreatureTemplate, RosterError> {
    let normalized = normalize_name(name);
    player_choices()?
        .iter()
        .find(|t| normalize_name(&t.name) == normalized)
        .ok_or_else(|| RosterError::NotFound(name.trim().to_string()))
}

/// The player's team being assembled before a battle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSelection {
    selected: Vec<CreatureTemplate>,
}

impl TeamSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, name: &str) -> Result<(), RosterError> {
        if name.trim().is_empty() {
            return Err(RosterError::InvalidName);
        }
        if self.is_selected(name) {
            return Err(RosterError::AlreadySelected(name.trim().to_string()));
        }
        if self.selected.len() >= MAX_TEAM_SIZE {
            return Err(RosterError::TeamFull(MAX_TEAM_SIZE));
        }
        let template = find_choice(name)?;
        self.selected.push(template.clone());
        Ok(())
    }

    pub fn deselect(&mut self, name: &str) -> Result<(), RosterError> {
        if name.trim().is_empty() {
            return Err(RosterError::InvalidName);
        }
        if !self.is_selected(name) {
            return Err(RosterError::NotSelected(name.trim().to_string()));
        }
        let normalized = normalize_name(name);
        self.selected.retain(|t| normalize_name(&t.name) != normalized);
        Ok(())
    }

    pub fn is_selected(&self, name: &str) -> bool {
        let normalized = normalize_name(name);
        self.selected.iter().any(|t| normalize_name(&t.name) == normalized)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.selected.len() == MAX_TEAM_SIZE
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Independent copies of the chosen templates, in selection order.
    pub fn templates(&self) -> Vec<CreatureTemplate> {
        self.selected.clone()
    }

    pub fn summary(&self) -> String {
        if self.selected.is_empty() {
            return "Empty team".to_string();
        }
        let names: Vec<&str> = self.selected.iter().map(|t| t.name.as_str()).collect();
        format!(
            "Team: {} ({}/{})",
            names.join(", "),
            self.selected.len(),
            MAX_TEAM_SIZE
        )
    }
}
