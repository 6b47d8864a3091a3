use crate::battle::state::TurnRng;
use crate::battle::stats::{
    base_damage, effective_attack, effective_defense, random_factor, roll_critical_hit,
    CRIT_MULTIPLIER, STAB_MULTIPLIER,
};
use crate::move_data::MoveData;
use crate::pokemon::Combatant;
use schema::{is_stab, type_multiplier};

/// Result of one damaging hit before it is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: u16,
    pub critical: bool,
    pub effectiveness: f64,
}

/// Type multiplier of a move against the defender's full type list.
pub fn move_effectiveness(move_data: &MoveData, defender: &Combatant) -> f64 {
    type_multiplier(&[move_data.move_type], &defender.types)
}

pub fn stab_bonus(move_data: &MoveData, attacker: &Combatant) -> f64 {
    if is_stab(move_data.move_type, &attacker.types) {
        STAB_MULTIPLIER
    } else {
        1.0
    }
}

/// Compute the damage a hit would do. Rolls crit then spread. Every hit deals
/// at least 1, type immunity included.
pub fn calculate_attack_outcome(
    attacker: &mut Combatant,
    defender: &Combatant,
    move_data: &MoveData,
    rng: &mut TurnRng,
) -> DamageOutcome {
    let effectiveness = move_effectiveness(move_data, defender);
    let critical = roll_critical_hit(attacker, rng);
    let spread = random_factor(rng);

    let base = base_damage(
        attacker.level,
        move_data.power,
        effective_attack(attacker),
        effective_defense(defender),
    );
    let crit = if critical { CRIT_MULTIPLIER } else { 1.0 };
    let total = base * spread * effectiveness * stab_bonus(move_data, attacker) * crit;
    let damage = (total.floor() as u16).max(1);

    DamageOutcome {
        damage,
        critical,
        effectiveness,
    }
}
