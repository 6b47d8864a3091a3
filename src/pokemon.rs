use crate::battle::state::BattleSide;
use crate::move_data::MoveInstance;
use schema::{BaseStats, CreatureTemplate, PokemonType, StageStat, StatusKind};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

/// Primary status. A combatant carries at most one at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StatusCondition {
    Paralysis,
    Sleep { turns_remaining: u8 },
    Poison,
}

impl StatusCondition {
    pub fn kind(&self) -> StatusKind {
        match self {
            StatusCondition::Paralysis => StatusKind::Paralyzed,
            StatusCondition::Sleep { .. } => StatusKind::Sleep,
            StatusCondition::Poison => StatusKind::Poisoned,
        }
    }
}

impl fmt::Display for StatusCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Confusion {
    pub turns_remaining: u8,
}

/// Identifies the combatant holding a trap by side and roster slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TrapperId {
    pub side: BattleSide,
    pub index: usize,
}

/// Volatile battle state. Created once at hydration and kept across switches.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Runtime {
    // Missing entries are stage 0.
    pub stages: HashMap<StageStat, i8>,
    pub focus_turns: u8,
    pub trapped_by: Option<TrapperId>,
}

/// Multiplier for a stat stage: (2+s)/2 when raised, 2/(2-s) when lowered.
pub fn stage_multiplier(stage: i8) -> f64 {
    let stage = stage.clamp(MIN_STAGE, MAX_STAGE) as f64;
    if stage >= 0.0 {
        (2.0 + stage) / 2.0
    } else {
        2.0 / (2.0 - stage)
    }
}

/// Snapshot handed to the display collaborator for one side's HUD.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PanelData {
    pub name: String,
    pub level: u8,
    pub current_hp: u16,
    pub max_hp: u16,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Combatant {
    pub name: String,
    pub level: u8,
    pub types: Vec<PokemonType>,
    pub stats: BaseStats,
    pub max_hp: u16,
    pub current_hp: u16,
    pub status: Option<StatusCondition>,
    pub confusion: Option<Confusion>,
    pub moves: Vec<MoveInstance>,
    pub runtime: Runtime,
}

impl Combatant {
    /// Build a fresh in-battle unit from a template. The template is only read.
    pub fn hydrate(template: &CreatureTemplate) -> Self {
        let types = template
            .types
            .iter()
            .filter_map(|name| {
                let resolved = PokemonType::from_name(name);
                if resolved.is_none() {
                    tracing::warn!(creature = %template.name, type_name = %name, "dropping unknown type");
                }
                resolved
            })
            .collect();

        let moves = template
            .moveset
            .iter()
            .take(CreatureTemplate::MAX_MOVES)
            .map(|name| MoveInstance::new(name))
            .collect();

        let max_hp = template.stats.hp.max(1);
        Self {
            name: template.name.clone(),
            level: template.level,
            types,
            stats: template.stats,
            max_hp,
            current_hp: max_hp,
            status: None,
            confusion: None,
            moves,
            runtime: Runtime::default(),
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn hp_ratio(&self) -> f64 {
        self.current_hp as f64 / self.max_hp.max(1) as f64
    }

    /// Indices of moves that still have PP, in movepool order.
    pub fn available_moves(&self) -> Vec<usize> {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, m)| m.has_pp())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has_usable_move(&self) -> bool {
        self.moves.iter().any(|m| m.has_pp())
    }

    // === Stat stages ===

    pub fn stage(&self, stat: StageStat) -> i8 {
        self.runtime.stages.get(&stat).copied().unwrap_or(0)
    }

    /// Shift a stage by `delta`, clamped to [-6, 6]. Returns false when the
    /// stage was already pinned at the boundary in that direction.
    pub fn modify_stage(&mut self, stat: StageStat, delta: i8) -> bool {
        let current = self.stage(stat);
        let next = current.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE);
        if next == current {
            return false;
        }
        if next == 0 {
            self.runtime.stages.remove(&stat);
        } else {
            self.runtime.stages.insert(stat, next);
        }
        true
    }

    /// Base value for a staged stat. Accuracy and evasion have a neutral base of 1.
    fn base_value(&self, stat: StageStat) -> u16 {
        match stat {
            StageStat::Attack => self.stats.attack,
            StageStat::Defense => self.stats.defense,
            StageStat::Accuracy | StageStat::Evasion => 1,
        }
    }

    pub fn effective_stat(&self, stat: StageStat) -> u16 {
        let scaled = self.base_value(stat) as f64 * stage_multiplier(self.stage(stat));
        (scaled.round() as u16).max(1)
    }

    /// Speed has no stage in this model.
    pub fn effective_speed(&self) -> u16 {
        self.stats.speed.max(1)
    }

    // === HP ===

    /// Returns true if this damage caused the combatant to faint.
    pub fn apply_damage(&mut self, amount: u16) -> bool {
        let was_fainted = self.is_fainted();
        self.current_hp = self.current_hp.saturating_sub(amount);
        !was_fainted && self.is_fainted()
    }

    /// Restore HP up to the maximum and report how much was actually gained.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let before = self.current_hp;
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
        self.current_hp - before
    }

    // === Status ===

    /// Apply a primary status. Rejected when any primary status is present.
    pub fn inflict_status(&mut self, status: StatusCondition) -> bool {
        if self.status.is_some() || self.is_fainted() {
            return false;
        }
        self.status = Some(status);
        true
    }

    pub fn cure_status(&mut self) -> Option<StatusCondition> {
        self.status.take()
    }

    pub fn confuse(&mut self, turns: u8) -> bool {
        if self.confusion.is_some() || self.is_fainted() {
            return false;
        }
        self.confusion = Some(Confusion {
            turns_remaining: turns,
        });
        true
    }

    pub fn is_afflicted(&self) -> bool {
        self.status.is_some() || self.confusion.is_some()
    }

    pub fn can_receive(&self, kind: StatusKind) -> bool {
        if kind.is_primary() {
            self.status.is_none()
        } else {
            self.confusion.is_none()
        }
    }

    // === Trapping ===

    pub fn trap(&mut self, by: TrapperId) -> bool {
        if self.runtime.trapped_by.is_some() {
            return false;
        }
        self.runtime.trapped_by = Some(by);
        true
    }

    pub fn release_trap(&mut self) {
        self.runtime.trapped_by = None;
    }

    // === Focus energy ===

    pub fn focus_energy(&mut self, turns: u8) -> bool {
        if self.runtime.focus_turns > 0 {
            return false;
        }
        self.runtime.focus_turns = turns;
        true
    }

    pub fn status_label(&self) -> String {
        match (&self.status, &self.confusion) {
            (Some(status), _) => status.to_string(),
            (None, Some(_)) => StatusKind::Confused.to_string(),
            (None, None) => "OK".to_string(),
        }
    }

    pub fn panel_data(&self) -> PanelData {
        PanelData {
            name: self.name.clone(),
            level: self.level,
            current_hp: self.current_hp,
            max_hp: self.max_hp,
            status: self.status_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn template() -> CreatureTemplate {
        CreatureTemplate {
            name: "Chikorita".to_string(),
            level: 13,
            types: vec!["Planta".to_string(), "Mystery".to_string()],
            stats: BaseStats {
                hp: 41,
                attack: 20,
                defense: 27,
                special_attack: 21,
                special_defense: 27,
                speed: 20,
            },
            moveset: vec![
                "Razor Leaf".to_string(),
                "Tackle".to_string(),
                "Poison Powder".to_string(),
                "Synthesis".to_string(),
                "Growl".to_string(),
            ],
            sprite: None,
        }
    }

    #[test]
    fn test_hydrate_copies_template_without_mutation() {
        let source = template();
        let combatant = Combatant::hydrate(&source);

        assert_eq!(source, template());
        assert_eq!(combatant.name, "Chikorita");
        assert_eq!(combatant.types, vec![PokemonType::Grass]);
        assert_eq!(combatant.max_hp, 41);
        assert_eq!(combatant.current_hp, 41);
        assert_eq!(combatant.moves.len(), 4);
        assert_eq!(combatant.moves[3].data.id, "synthesis");
        assert_eq!(combatant.runtime, Runtime::default());
    }

    #[test]
    fn test_stage_multiplier_closed_form() {
        assert_eq!(stage_multiplier(0), 1.0);
        assert_eq!(stage_multiplier(1), 1.5);
        assert_eq!(stage_multiplier(6), 4.0);
        assert_eq!(stage_multiplier(-1), 2.0 / 3.0);
        assert_eq!(stage_multiplier(-6), 0.25);

        for stage in MIN_STAGE..MAX_STAGE {
            assert!(stage_multiplier(stage) < stage_multiplier(stage + 1));
        }
    }

    #[test]
    fn test_modify_stage_stops_at_boundaries() {
        let mut combatant = Combatant::hydrate(&template());

        for _ in 0..6 {
            assert!(combatant.modify_stage(StageStat::Attack, 1));
        }
        assert!(!combatant.modify_stage(StageStat::Attack, 1));
        assert_eq!(combatant.stage(StageStat::Attack), 6);

        assert!(combatant.modify_stage(StageStat::Defense, -12));
        assert_eq!(combatant.stage(StageStat::Defense), -6);
        assert!(!combatant.modify_stage(StageStat::Defense, -1));
        assert!(combatant.modify_stage(StageStat::Defense, 2));
        assert_eq!(combatant.stage(StageStat::Defense), -4);
    }

    #[test]
    fn test_effective_stat_rounds_and_floors_at_one() {
        let mut combatant = Combatant::hydrate(&template());
        assert_eq!(combatant.effective_stat(StageStat::Attack), 20);

        combatant.modify_stage(StageStat::Attack, 1);
        assert_eq!(combatant.effective_stat(StageStat::Attack), 30);

        combatant.modify_stage(StageStat::Defense, -1);
        // 27 * 2/3 = 18
        assert_eq!(combatant.effective_stat(StageStat::Defense), 18);

        combatant.stats.attack = 1;
        combatant.modify_stage(StageStat::Attack, -12);
        assert_eq!(combatant.effective_stat(StageStat::Attack), 1);
    }

    #[test]
    fn test_hp_stays_within_bounds() {
        let mut combatant = Combatant::hydrate(&template());

        assert!(!combatant.apply_damage(10));
        assert_eq!(combatant.current_hp, 31);
        assert_eq!(combatant.heal(100), 10);
        assert_eq!(combatant.current_hp, 41);

        assert!(combatant.apply_damage(u16::MAX));
        assert_eq!(combatant.current_hp, 0);
        assert!(!combatant.apply_damage(5));
        assert_eq!(combatant.heal(20), 0);
        assert_eq!(combatant.current_hp, 0);
    }

    #[test]
    fn test_primary_status_and_confusion_are_independent() {
        let mut combatant = Combatant::hydrate(&template());

        assert!(combatant.inflict_status(StatusCondition::Paralysis));
        assert!(!combatant.inflict_status(StatusCondition::Poison));
        assert!(!combatant.inflict_status(StatusCondition::Paralysis));
        assert!(combatant.confuse(3));
        assert!(!combatant.confuse(2));
        assert_eq!(combatant.status_label(), "PARALYZED");

        combatant.cure_status();
        assert_eq!(combatant.status_label(), "CONFUSED");
        combatant.confusion = None;
        assert_eq!(combatant.status_label(), "OK");
    }

    #[test]
    fn test_trap_only_applies_once() {
        let mut combatant = Combatant::hydrate(&template());
        let by = TrapperId {
            side: BattleSide::Opponent,
            index: 2,
        };

        assert!(combatant.trap(by));
        assert!(!combatant.trap(by));
        combatant.release_trap();
        assert!(combatant.trap(by));
    }

    #[test]
    fn test_available_moves_skip_empty_pp() {
        let mut combatant = Combatant::hydrate(&template());
        combatant.moves[1].current_pp = 0;
        assert_eq!(combatant.available_moves(), vec![0, 2, 3]);

        for m in combatant.moves.iter_mut() {
            m.current_pp = 0;
        }
        assert!(combatant.available_moves().is_empty());
        assert!(!combatant.has_usable_move());
    }
}
