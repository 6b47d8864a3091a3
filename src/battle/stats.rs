use crate::battle::state::TurnRng;
use crate::move_data::MoveData;
use crate::pokemon::{stage_multiplier, Combatant};
use schema::StageStat;

pub const BASE_CRIT_CHANCE: f64 = 0.0625;
pub const FOCUS_CRIT_BONUS: f64 = 0.30;
pub const MAX_CRIT_CHANCE: f64 = 0.95;
pub const CRIT_MULTIPLIER: f64 = 1.5;
pub const STAB_MULTIPLIER: f64 = 1.5;

/// Effective attack including the attack stage.
pub fn effective_attack(pokemon: &Combatant) -> u16 {
    pokemon.effective_stat(StageStat::Attack)
}

/// Effective defense including the defense stage.
pub fn effective_defense(pokemon: &Combatant) -> u16 {
    pokemon.effective_stat(StageStat::Defense)
}

/// Speed ignores stages; ties keep the queue's existing order.
pub fn effective_speed(pokemon: &Combatant) -> u16 {
    pokemon.effective_speed()
}

/// Hit threshold after the attacker's accuracy and the defender's evasion
/// stages, clamped to [1, 100].
pub fn final_accuracy(attacker: &Combatant, defender: &Combatant, move_data: &MoveData) -> f64 {
    let accuracy = move_data.accuracy as f64 * stage_multiplier(attacker.stage(StageStat::Accuracy))
        / stage_multiplier(defender.stage(StageStat::Evasion));
    accuracy.clamp(1.0, 100.0)
}

/// Roll for hit/miss. Returns true if the move hits.
pub fn move_hits(
    attacker: &Combatant,
    defender: &Combatant,
    move_data: &MoveData,
    rng: &mut TurnRng,
) -> bool {
    let threshold = final_accuracy(attacker, defender, move_data);
    let roll = rng.next_unit("accuracy check") * 100.0;
    roll <= threshold
}

pub fn critical_hit_chance(attacker: &Combatant) -> f64 {
    let bonus = if attacker.runtime.focus_turns > 0 {
        FOCUS_CRIT_BONUS
    } else {
        0.0
    };
    (BASE_CRIT_CHANCE + bonus).min(MAX_CRIT_CHANCE)
}

/// Roll for a critical hit. Every check spends one turn of focus energy.
pub fn roll_critical_hit(attacker: &mut Combatant, rng: &mut TurnRng) -> bool {
    let chance = critical_hit_chance(attacker);
    attacker.runtime.focus_turns = attacker.runtime.focus_turns.saturating_sub(1);
    rng.next_unit("critical hit") < chance
}

/// Damage spread in [0.85, 1.0).
pub fn random_factor(rng: &mut TurnRng) -> f64 {
    0.85 + rng.next_unit("damage spread") * 0.15
}

/// Level-scaled damage before any multiplier.
pub fn base_damage(level: u8, power: u16, attack: u16, defense: u16) -> f64 {
    let level_factor = 2.0 * level as f64 / 5.0 + 2.0;
    let ratio = attack as f64 / defense.max(1) as f64;
    (level_factor * power as f64 * ratio) / 50.0 + 2.0
}
