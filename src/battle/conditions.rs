use crate::battle::state::{ActionFailureReason, BattleEvent, BattleSide, BattleState, EventBus, TurnRng};
use crate::errors::BattleResult;
use crate::pokemon::{Confusion, StatusCondition};
use schema::StatusKind;

pub const PARALYSIS_CHANCE: f64 = 0.25;
pub const CONFUSION_SELF_HIT_CHANCE: f64 = 1.0 / 3.0;

/// What the pre-move checks decided for the acting combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Proceed,
    Prevented,
    /// The combatant fainted from poison or hitting itself.
    Fainted,
}

/// Run poison, sleep, paralysis, then confusion for the combatant about to act.
/// Each step can end the action early.
pub fn run_pre_move_gate(
    state: &mut BattleState,
    side: BattleSide,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> BattleResult<GateOutcome> {
    let pokemon = state.active_mut(side)?;
    let name = pokemon.name.clone();

    match pokemon.status {
        Some(StatusCondition::Poison) => {
            let damage = (pokemon.max_hp / 8).max(1);
            let fainted = pokemon.apply_damage(damage);
            bus.push(BattleEvent::StatusDamage {
                target: name.clone(),
                status: StatusKind::Poisoned,
                damage,
                remaining_hp: pokemon.current_hp,
            });
            bus.push(state.panels_event()?);
            if fainted {
                return Ok(GateOutcome::Fainted);
            }
        }
        Some(StatusCondition::Sleep { turns_remaining }) => {
            let remaining = turns_remaining.saturating_sub(1);
            if remaining == 0 {
                pokemon.cure_status();
                bus.push(BattleEvent::StatusRemoved {
                    target: name.clone(),
                    status: StatusKind::Sleep,
                });
                bus.push(state.panels_event()?);
            } else {
                pokemon.status = Some(StatusCondition::Sleep {
                    turns_remaining: remaining,
                });
                bus.push(BattleEvent::ActionPrevented {
                    pokemon: name,
                    reason: ActionFailureReason::IsAsleep,
                });
                return Ok(GateOutcome::Prevented);
            }
        }
        Some(StatusCondition::Paralysis) => {
            if rng.next_unit("paralysis check") < PARALYSIS_CHANCE {
                bus.push(BattleEvent::ActionPrevented {
                    pokemon: name,
                    reason: ActionFailureReason::IsParalyzed,
                });
                return Ok(GateOutcome::Prevented);
            }
        }
        None => {}
    }

    check_confusion(state, side, rng, bus)
}

fn check_confusion(
    state: &mut BattleState,
    side: BattleSide,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> BattleResult<GateOutcome> {
    let pokemon = state.active_mut(side)?;
    let Some(confusion) = pokemon.confusion else {
        return Ok(GateOutcome::Proceed);
    };
    let name = pokemon.name.clone();

    let remaining = confusion.turns_remaining.saturating_sub(1);
    if remaining == 0 {
        pokemon.confusion = None;
        bus.push(BattleEvent::StatusRemoved {
            target: name,
            status: StatusKind::Confused,
        });
        bus.push(state.panels_event()?);
        return Ok(GateOutcome::Proceed);
    }

    pokemon.confusion = Some(Confusion {
        turns_remaining: remaining,
    });
    bus.push(BattleEvent::Confused {
        pokemon: name.clone(),
    });

    if rng.next_unit("confusion self-hit") >= CONFUSION_SELF_HIT_CHANCE {
        return Ok(GateOutcome::Proceed);
    }

    // Unstaged attack stat.
    let damage = pokemon.stats.attack / 2;
    let fainted = pokemon.apply_damage(damage);
    bus.push(BattleEvent::ActionPrevented {
        pokemon: name.clone(),
        reason: ActionFailureReason::HurtItselfInConfusion,
    });
    bus.push(BattleEvent::DamageDealt {
        target: name,
        damage,
        remaining_hp: pokemon.current_hp,
    });
    bus.push(state.panels_event()?);

    Ok(if fainted {
        GateOutcome::Fainted
    } else {
        GateOutcome::Prevented
    })
}
