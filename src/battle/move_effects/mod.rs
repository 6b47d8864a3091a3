mod special_effects;
mod stat_effects;
mod status_effects;

use crate::battle::state::{BattleSide, BattleState, EventBus, TurnRng};
use crate::errors::BattleResult;
use crate::move_data::{EffectTarget, MoveData, MoveEffect};

use self::{special_effects::*, stat_effects::*, status_effects::*};

#[derive(Debug, Clone)]
pub struct EffectContext {
    pub attacker: BattleSide,
    pub defender: BattleSide,
    pub move_data: MoveData,
}

impl EffectContext {
    pub fn new(attacker: BattleSide, move_data: MoveData) -> Self {
        Self {
            attacker,
            defender: attacker.opponent(),
            move_data,
        }
    }

    pub fn target_side(&self, target: &EffectTarget) -> BattleSide {
        match target {
            EffectTarget::User => self.attacker,
            EffectTarget::Target => self.defender,
        }
    }
}

pub trait BattleMoveEffectExt {
    /// Apply the non-damage part of a move that already passed its accuracy
    /// check, mutating the session and recording what happened.
    fn apply(
        &self,
        context: &EffectContext,
        state: &mut BattleState,
        rng: &mut TurnRng,
        bus: &mut EventBus,
    ) -> BattleResult<()>;
}

impl BattleMoveEffectExt for MoveEffect {
    fn apply(
        &self,
        context: &EffectContext,
        state: &mut BattleState,
        rng: &mut TurnRng,
        bus: &mut EventBus,
    ) -> BattleResult<()> {
        match self {
            Self::Damaging => Ok(()),
            Self::StatusInflicting(effect) => apply_status_effect(effect, context, state, rng, bus),
            Self::StatChanging { target, changes } => {
                apply_stat_change_effect(target, changes, context, state, bus)
            }
            Self::Healing { percent } => apply_heal_effect(*percent, context, state, bus),
            Self::Trapping => apply_trap_effect(context, state, bus),
            Self::FocusEnergy { turns } => apply_focus_energy_effect(*turns, context, state, bus),
        }
    }
}
