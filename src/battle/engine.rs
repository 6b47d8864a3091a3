use crate::battle::action_stack::{ActionStack, BattleAction};
use crate::battle::ai::ScoringAI;
use crate::battle::calculators::calculate_attack_outcome;
use crate::battle::conditions::{run_pre_move_gate, GateOutcome};
use crate::battle::move_effects::{BattleMoveEffectExt, EffectContext};
use crate::battle::state::{
    BattleEvent, BattleOutcome, BattlePhase, BattleSide, BattleState, EventBus, TurnRng,
};
use crate::battle::stats::move_hits;
use crate::errors::{ActionError, BattleResult, BattleStateError};
use crate::player::PlayerAction;
use crate::pokemon::Combatant;

/// Whether the rest of the turn's queue should still run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionResult {
    Continue,
    TurnOver,
}

/// Resolve one full turn from the player's choice.
///
/// The opponent's action is chosen by `ai`. Everything observable is recorded
/// in the returned bus, in order. On error the phase is put back to
/// `PlayerChoice` so the battle can be re-prompted.
pub fn resolve_turn(
    battle_state: &mut BattleState,
    player_action: PlayerAction,
    ai: &ScoringAI,
    rng: &mut TurnRng,
) -> BattleResult<EventBus> {
    if battle_state.phase != BattlePhase::PlayerChoice {
        return Err(ActionError::NotAcceptingInput(battle_state.phase).into());
    }
    validate_player_action(battle_state, BattleSide::Player, &player_action)?;

    battle_state.phase = BattlePhase::Resolving;
    let mut bus = EventBus::new();
    match run_turn(battle_state, player_action, ai, rng, &mut bus) {
        Ok(()) => Ok(bus),
        Err(error) => {
            tracing::error!(error = %error, turn = battle_state.turn_number, "turn resolution failed");
            battle_state.phase = BattlePhase::PlayerChoice;
            Err(error)
        }
    }
}

fn run_turn(
    battle_state: &mut BattleState,
    player_action: PlayerAction,
    ai: &ScoringAI,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> BattleResult<()> {
    bus.push(BattleEvent::TurnStarted {
        turn_number: battle_state.turn_number,
    });
    tracing::debug!(turn = battle_state.turn_number, action = ?player_action, "resolving turn");

    // PP is spent on selection, even if the move never gets to run.
    if let PlayerAction::UseMove { move_index } = player_action {
        let pokemon = battle_state.active_mut(BattleSide::Player)?;
        let move_instance = pokemon
            .moves
            .get_mut(move_index)
            .ok_or(ActionError::InvalidMoveIndex(move_index))?;
        move_instance.spend_pp();
        let move_id = move_instance.data.id.clone();
        battle_state.ai_memory.record_player_move(&move_id);
    }

    let opponent_action = choose_opponent_action(battle_state, ai)?;
    tracing::debug!(action = ?opponent_action, "opponent decided");

    let chosen = [
        (BattleSide::Player, player_action),
        (BattleSide::Opponent, opponent_action),
    ];
    let mut action_stack = ActionStack::build_initial(battle_state, &chosen);

    while let Some(action) = action_stack.pop_front() {
        let result = execute_battle_action(action, battle_state, ai, rng, bus)?;
        if result == ActionResult::TurnOver {
            action_stack.clear();
        }
    }

    if !battle_state.is_finished() {
        bus.push(BattleEvent::TurnEnded);
        battle_state.turn_number += 1;
        battle_state.phase = BattlePhase::PlayerChoice;
    }
    Ok(())
}

/// Switch if the AI wants to (resetting its streak), otherwise pick a move
/// and spend its PP. An opponent with nothing usable passes.
fn choose_opponent_action(battle_state: &mut BattleState, ai: &ScoringAI) -> BattleResult<PlayerAction> {
    if let Some(team_index) = ai.choose_switch_target(battle_state) {
        battle_state.ai_memory.reset_streak();
        return Ok(PlayerAction::SwitchPokemon { team_index });
    }

    let attacker = battle_state.active(BattleSide::Opponent)?;
    let defender = battle_state.active(BattleSide::Player)?;
    let Some(move_index) = ai.choose_move(attacker, defender, &battle_state.ai_memory) else {
        return Ok(PlayerAction::Pass);
    };

    battle_state.active_mut(BattleSide::Opponent)?.moves[move_index].spend_pp();
    Ok(PlayerAction::UseMove { move_index })
}

fn execute_battle_action(
    action: BattleAction,
    battle_state: &mut BattleState,
    ai: &ScoringAI,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> BattleResult<ActionResult> {
    // Anything queued for a combatant that fainted earlier this turn is dropped.
    if battle_state.active(action.side())?.is_fainted() {
        tracing::debug!(side = %action.side(), "skipping action of fainted combatant");
        return Ok(ActionResult::Continue);
    }

    match action {
        BattleAction::Switch { side, team_index } => {
            switch_in(battle_state, side, team_index, false, bus)?;
            Ok(ActionResult::Continue)
        }
        BattleAction::UseMove { side, move_index } => {
            execute_move(battle_state, side, move_index, ai, rng, bus)
        }
    }
}

fn switch_in(
    battle_state: &mut BattleState,
    side: BattleSide,
    team_index: usize,
    replacement: bool,
    bus: &mut EventBus,
) -> BattleResult<()> {
    let old_pokemon = battle_state.active(side)?.name.clone();
    battle_state
        .player_mut(side)
        .switch_pokemon(team_index)
        .map_err(BattleStateError::InconsistentState)?;
    let new_pokemon = battle_state.active(side)?.name.clone();

    tracing::debug!(%side, from = %old_pokemon, to = %new_pokemon, replacement, "switch");
    bus.push(BattleEvent::PokemonSwitched {
        side,
        old_pokemon,
        new_pokemon,
        replacement,
    });
    bus.push(battle_state.panels_event()?);
    Ok(())
}

/// Borrow the attacker mutably and the defender immutably at the same time.
fn attacker_and_defender(
    battle_state: &mut BattleState,
    attacker_side: BattleSide,
) -> BattleResult<(&mut Combatant, &Combatant)> {
    let [player, opponent] = &mut battle_state.players;
    let (attacker, defender) = match attacker_side {
        BattleSide::Player => (player, &*opponent),
        BattleSide::Opponent => (opponent, &*player),
    };
    let attacker = attacker
        .active_pokemon_mut()
        .ok_or(BattleStateError::NoActivePokemon(attacker_side))?;
    let defender = defender
        .active_pokemon()
        .ok_or(BattleStateError::NoActivePokemon(attacker_side.opponent()))?;
    Ok((attacker, defender))
}

fn execute_move(
    battle_state: &mut BattleState,
    side: BattleSide,
    move_index: usize,
    ai: &ScoringAI,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> BattleResult<ActionResult> {
    match run_pre_move_gate(battle_state, side, rng, bus)? {
        GateOutcome::Proceed => {}
        GateOutcome::Prevented => return Ok(ActionResult::Continue),
        GateOutcome::Fainted => return handle_faint(battle_state, side, ai, bus),
    }

    let attacker = battle_state.active(side)?;
    let move_data = attacker
        .moves
        .get(move_index)
        .map(|m| m.data.clone())
        .ok_or_else(|| BattleStateError::InconsistentState(format!("{} has no move {}", attacker.name, move_index)))?;
    bus.push(BattleEvent::MoveUsed {
        side,
        pokemon: attacker.name.clone(),
        move_id: move_data.id.clone(),
        move_name: move_data.name.clone(),
    });
    bus.push(battle_state.panels_event()?);

    let defender_side = side.opponent();
    {
        let attacker = battle_state.active(side)?;
        let defender = battle_state.active(defender_side)?;
        if !move_hits(attacker, defender, &move_data, rng) {
            tracing::debug!(move_id = %move_data.id, "missed");
            bus.push(BattleEvent::MoveMissed {
                attacker: attacker.name.clone(),
            });
            return Ok(ActionResult::Continue);
        }
    }

    let context = EffectContext::new(side, move_data.clone());
    move_data.effect.apply(&context, battle_state, rng, bus)?;

    if !move_data.is_damaging() {
        return Ok(ActionResult::Continue);
    }

    let (attacker, defender) = attacker_and_defender(battle_state, side)?;
    let outcome = calculate_attack_outcome(attacker, defender, &move_data, rng);
    let defender_name = defender.name.clone();

    if side == BattleSide::Player {
        battle_state.ai_memory.record_player_effectiveness(outcome.effectiveness);
    }

    if outcome.critical {
        bus.push(BattleEvent::CriticalHit);
    }
    bus.push(BattleEvent::AttackTypeEffectiveness {
        multiplier: outcome.effectiveness,
    });

    let defender = battle_state.active_mut(defender_side)?;
    let fainted = defender.apply_damage(outcome.damage);
    tracing::debug!(
        move_id = %move_data.id,
        damage = outcome.damage,
        critical = outcome.critical,
        effectiveness = outcome.effectiveness,
        remaining_hp = defender.current_hp,
        "hit"
    );
    bus.push(BattleEvent::DamageDealt {
        target: defender_name,
        damage: outcome.damage,
        remaining_hp: defender.current_hp,
    });
    bus.push(battle_state.panels_event()?);

    if fainted {
        return handle_faint(battle_state, defender_side, ai, bus);
    }
    Ok(ActionResult::Continue)
}

/// Announce a faint and bring in the next combatant, or end the battle when
/// the side has nobody left. Either way the turn is over.
fn handle_faint(
    battle_state: &mut BattleState,
    fainted_side: BattleSide,
    ai: &ScoringAI,
    bus: &mut EventBus,
) -> BattleResult<ActionResult> {
    let fainted = battle_state.active(fainted_side)?.name.clone();
    bus.push(BattleEvent::PokemonFainted {
        side: fainted_side,
        pokemon: fainted,
    });

    let team = battle_state.player(fainted_side);
    let replacement = match fainted_side {
        BattleSide::Player => team.next_living_from(team.active_pokemon_index),
        BattleSide::Opponent => {
            let defender = battle_state.active(BattleSide::Player)?;
            ai.choose_replacement(team, defender)
        }
    };

    match replacement {
        Some(team_index) => {
            switch_in(battle_state, fainted_side, team_index, true, bus)?;
        }
        None => {
            let outcome = match fainted_side {
                BattleSide::Opponent => BattleOutcome::Win,
                BattleSide::Player => BattleOutcome::Lose,
            };
            tracing::info!(%outcome, turn = battle_state.turn_number, opponent = %battle_state.opponent_id, "battle finished");
            battle_state.phase = BattlePhase::Finished;
            bus.push(BattleEvent::BattleEnded { outcome });
        }
    }
    Ok(ActionResult::TurnOver)
}

/// Validates a player action for detailed correctness.
/// Checks move PP, bounds, switch targets and trapping.
pub fn validate_player_action(
    battle_state: &BattleState,
    side: BattleSide,
    action: &PlayerAction,
) -> BattleResult<()> {
    let player = battle_state.player(side);
    let pokemon = battle_state.active(side)?;

    match *action {
        PlayerAction::UseMove { move_index } => {
            let move_instance = pokemon
                .moves
                .get(move_index)
                .ok_or(ActionError::InvalidMoveIndex(move_index))?;
            if !move_instance.has_pp() {
                return Err(ActionError::NoPpRemaining(move_instance.data.name.clone()).into());
            }
        }
        PlayerAction::SwitchPokemon { team_index } => {
            let target = player
                .team
                .get(team_index)
                .ok_or(ActionError::InvalidPokemonIndex(team_index))?;
            if team_index == player.active_pokemon_index {
                return Err(ActionError::AlreadyActive(target.name.clone()).into());
            }
            if target.is_fainted() {
                return Err(ActionError::PokemonFainted(target.name.clone()).into());
            }
            if battle_state.is_trapped(side) {
                return Err(ActionError::Trapped(pokemon.name.clone()).into());
            }
        }
        PlayerAction::Pass => {}
    }
    Ok(())
}

/// Every action `side` could legally submit right now.
pub fn get_valid_actions(battle_state: &BattleState, side: BattleSide) -> Vec<PlayerAction> {
    let Ok(pokemon) = battle_state.active(side) else {
        return Vec::new();
    };

    let mut actions: Vec<PlayerAction> = pokemon
        .available_moves()
        .into_iter()
        .map(|move_index| PlayerAction::UseMove { move_index })
        .collect();
    if actions.is_empty() {
        actions.push(PlayerAction::Pass);
    }

    if !battle_state.is_trapped(side) {
        actions.extend(
            battle_state
                .player(side)
                .bench_indices()
                .into_iter()
                .map(|team_index| PlayerAction::SwitchPokemon { team_index }),
        );
    }
    actions
}
