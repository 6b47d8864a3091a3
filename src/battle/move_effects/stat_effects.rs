use super::EffectContext;
use crate::battle::state::{BattleEvent, BattleState, EventBus};
use crate::errors::BattleResult;
use crate::move_data::EffectTarget;
use schema::StageStat;

/// Apply each stage change in order. A change that would push past ±6
/// reports that the stat won't go any further.
pub(super) fn apply_stat_change_effect(
    target: &EffectTarget,
    changes: &[(StageStat, i8)],
    context: &EffectContext,
    state: &mut BattleState,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let side = context.target_side(target);
    let pokemon = state.active_mut(side)?;
    if pokemon.is_fainted() {
        return Ok(());
    }

    for &(stat, delta) in changes {
        let old_stage = pokemon.stage(stat);
        if pokemon.modify_stage(stat, delta) {
            bus.push(BattleEvent::StatStageChanged {
                target: pokemon.name.clone(),
                stat,
                old_stage,
                new_stage: pokemon.stage(stat),
            });
        } else {
            bus.push(BattleEvent::StatChangeBlocked {
                target: pokemon.name.clone(),
                stat,
                rising: delta > 0,
            });
        }
    }
    Ok(())
}
