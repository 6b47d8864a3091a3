use super::EffectContext;
use crate::battle::state::{BattleEvent, BattleState, EventBus, TurnRng};
use crate::errors::BattleResult;
use crate::move_data::StatusEffect;
use crate::pokemon::StatusCondition;
use schema::StatusKind;

/// Draw a duration from the effect's declared range, if it has one.
pub(super) fn roll_duration(effect: &StatusEffect, rng: &mut TurnRng) -> Option<u8> {
    let (min, max) = match (effect.min_turns, effect.max_turns) {
        (Some(min), Some(max)) if max >= min => (min, max),
        (Some(turns), _) | (None, Some(turns)) => return Some(turns),
        (None, None) => return None,
    };
    let span = (max - min + 1) as f64;
    let offset = (rng.next_unit("status duration") * span).floor() as u8;
    Some((min + offset).min(max))
}

/// Try to inflict the move's status. A target that already carries a
/// conflicting status is left alone without a message and without rolling.
pub(super) fn apply_status_effect(
    effect: &StatusEffect,
    context: &EffectContext,
    state: &mut BattleState,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let side = context.target_side(&effect.target());
    let target = state.active(side)?;
    if target.is_fainted() || !target.can_receive(effect.kind) {
        return Ok(());
    }

    if effect.chance < 1.0 && rng.next_unit("status chance") >= effect.chance {
        return Ok(());
    }

    let turns = roll_duration(effect, rng).unwrap_or(1);
    let target = state.active_mut(side)?;
    let applied = match effect.kind {
        StatusKind::Paralyzed => target.inflict_status(StatusCondition::Paralysis),
        StatusKind::Sleep => target.inflict_status(StatusCondition::Sleep {
            turns_remaining: turns,
        }),
        StatusKind::Poisoned => target.inflict_status(StatusCondition::Poison),
        StatusKind::Confused => target.confuse(turns),
    };

    if applied {
        tracing::debug!(pokemon = %target.name, status = %effect.kind, turns, "status applied");
        bus.push(BattleEvent::StatusApplied {
            target: target.name.clone(),
            status: effect.kind,
        });
        bus.push(state.panels_event()?);
    }
    Ok(())
}
