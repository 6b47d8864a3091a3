use super::EffectContext;
use crate::battle::state::{BattleEvent, BattleState, EventBus};
use crate::errors::BattleResult;
use crate::pokemon::TrapperId;

/// Heal the user by a share of its max HP (at least 1). Fails at full HP.
pub(super) fn apply_heal_effect(
    percent: u8,
    context: &EffectContext,
    state: &mut BattleState,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let user = state.active_mut(context.attacker)?;
    let amount = ((user.max_hp as u32 * percent as u32) / 100).max(1) as u16;
    let healed = user.heal(amount);

    if healed == 0 {
        bus.push(BattleEvent::MoveFailed);
        return Ok(());
    }

    bus.push(BattleEvent::PokemonHealed {
        target: user.name.clone(),
        amount: healed,
        new_hp: user.current_hp,
    });
    bus.push(state.panels_event()?);
    Ok(())
}

/// Bind the defender to the user. Fails if a live trap already holds it.
pub(super) fn apply_trap_effect(
    context: &EffectContext,
    state: &mut BattleState,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let trapper = TrapperId {
        side: context.attacker,
        index: state.player(context.attacker).active_pokemon_index,
    };
    let already_trapped = state.is_trapped(context.defender);

    let target = state.active_mut(context.defender)?;
    if already_trapped || target.is_fainted() {
        bus.push(BattleEvent::MoveFailed);
        return Ok(());
    }

    // The previous holder left the field, so its hold is void.
    target.release_trap();
    target.trap(trapper);
    bus.push(BattleEvent::Trapped {
        target: target.name.clone(),
    });
    Ok(())
}

pub(super) fn apply_focus_energy_effect(
    turns: u8,
    context: &EffectContext,
    state: &mut BattleState,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let user = state.active_mut(context.attacker)?;
    if user.focus_energy(turns) {
        bus.push(BattleEvent::FocusEnergyRaised {
            pokemon: user.name.clone(),
        });
    } else {
        bus.push(BattleEvent::MoveFailed);
    }
    Ok(())
}
