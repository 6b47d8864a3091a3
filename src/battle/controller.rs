//! Owns the single live battle session and drives it from menu input.
//!
//! Turns are resolved synchronously by the engine; the controller then plays
//! the resulting events back through the injected collaborators, pausing
//! between narration lines and awaiting move animations.

use crate::battle::ai::ScoringAI;
use crate::battle::engine::{resolve_turn, validate_player_action};
use crate::battle::state::{
    BattleEvent, BattleOutcome, BattlePhase, BattleSide, BattleState, EventBus, TurnRng,
};
use crate::config::BattleConfig;
use crate::errors::{ActionError, BattleEngineError, BattleResult, CollaboratorError, RosterError};
use crate::player::{BattlePlayer, PlayerAction};
use crate::pokemon::{Combatant, PanelData};
use crate::teams::npc_team;
use async_trait::async_trait;
use schema::{CreatureTemplate, PokemonType};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Entries of the top-level battle menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionId {
    Fight,
    Bag,
    Pokemon,
    Run,
}

impl ActionId {
    pub const ALL: [ActionId; 4] = [ActionId::Fight, ActionId::Bag, ActionId::Pokemon, ActionId::Run];

    pub fn label(self) -> &'static str {
        match self {
            ActionId::Fight => "Fight",
            ActionId::Bag => "Bag",
            ActionId::Pokemon => "Pokémon",
            ActionId::Run => "Run",
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which menu the player is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MenuMode {
    Action,
    Moves,
    Switch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOption {
    pub index: usize,
    pub name: String,
    pub move_type: PokemonType,
    pub current_pp: u8,
    pub max_pp: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchOption {
    pub index: usize,
    pub panel: PanelData,
    pub is_active: bool,
    /// Living and not already in battle.
    pub selectable: bool,
}

/// Display sink for narration, HUD panels and menus.
pub trait BattlePresenter: Send {
    fn show_message(&mut self, message: &str) -> Result<(), CollaboratorError>;
    fn update_panels(&mut self, player: &PanelData, opponent: &PanelData) -> Result<(), CollaboratorError>;
    fn show_action_menu(&mut self, actions: &[ActionId]) -> Result<(), CollaboratorError>;
    fn show_move_menu(&mut self, moves: &[MoveOption]) -> Result<(), CollaboratorError>;
    fn show_switch_menu(&mut self, options: &[SwitchOption]) -> Result<(), CollaboratorError>;
}

/// Visual beat played when a move is announced.
#[async_trait]
pub trait MoveAnimator: Send + Sync {
    /// Resolves once the animation is done. `Ok(false)` means nothing was played.
    async fn play_move_animation(&self, move_id: &str, side: BattleSide) -> Result<bool, CollaboratorError>;
}

/// Animator for front ends without move animations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnimation;

#[async_trait]
impl MoveAnimator for NoAnimation {
    async fn play_move_animation(&self, _move_id: &str, _side: BattleSide) -> Result<bool, CollaboratorError> {
        Ok(false)
    }
}

/// Told once when a battle reaches its outcome.
pub trait BattleEndHandler: Send {
    fn battle_ended(&mut self, outcome: BattleOutcome);
}

impl<F> BattleEndHandler for F
where
    F: FnMut(BattleOutcome) + Send,
{
    fn battle_ended(&mut self, outcome: BattleOutcome) {
        self(outcome)
    }
}

#[derive(Debug)]
struct BattleSession {
    state: BattleState,
    rng: TurnRng,
    menu: MenuMode,
}

pub struct BattleController {
    config: BattleConfig,
    ai: ScoringAI,
    presenter: Box<dyn BattlePresenter>,
    animator: Box<dyn MoveAnimator>,
    end_handler: Box<dyn BattleEndHandler>,
    session: Option<BattleSession>,
    last_outcome: Option<BattleOutcome>,
}

impl fmt::Debug for BattleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleController")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

impl BattleController {
    pub fn new(
        config: BattleConfig,
        presenter: Box<dyn BattlePresenter>,
        animator: Box<dyn MoveAnimator>,
        end_handler: Box<dyn BattleEndHandler>,
    ) -> Self {
        Self {
            ai: ScoringAI::new(config.ai.clone()),
            config,
            presenter,
            animator,
            end_handler,
            session: None,
            last_outcome: None,
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// The live session, if a battle is in progress.
    pub fn state(&self) -> Option<&BattleState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn phase(&self) -> Option<BattlePhase> {
        self.state().map(|s| s.phase)
    }

    pub fn menu_mode(&self) -> Option<MenuMode> {
        self.session.as_ref().map(|s| s.menu)
    }

    /// Outcome of the most recently finished battle.
    pub fn last_outcome(&self) -> Option<BattleOutcome> {
        self.last_outcome
    }

    /// Hydrate both rosters and open the action menu. Any previous session is
    /// discarded. On error no session exists afterwards.
    pub fn start_battle(&mut self, player_roster: &[CreatureTemplate], opponent_id: &str) -> BattleResult<()> {
        if self.session.take().is_some() {
            tracing::info!("discarding previous battle session");
        }
        self.last_outcome = None;

        let npc = npc_team(opponent_id)?;
        if player_roster.is_empty() {
            return Err(RosterError::EmptyRoster(BattleSide::Player).into());
        }

        let player_team: Vec<Combatant> = player_roster.iter().map(Combatant::hydrate).collect();
        let mut opponent_team: Vec<Combatant> = npc.pokemon.iter().map(Combatant::hydrate).collect();
        self.ai.order_lead(&mut opponent_team, &player_team);

        let rng = match self.config.rng_seed {
            Some(seed) => TurnRng::from_seed(seed),
            None => TurnRng::new_random(),
        };
        let state = BattleState::new(
            opponent_id,
            BattlePlayer::new("Player", player_team),
            BattlePlayer::new(npc.name.clone(), opponent_team),
        );

        tracing::info!(
            opponent = opponent_id,
            player_lead = %state.active(BattleSide::Player)?.name,
            opponent_lead = %state.active(BattleSide::Opponent)?.name,
            seeded = self.config.rng_seed.is_some(),
            "battle started"
        );

        let panels = state.panels_event()?;
        let intro = format!("{} wants to battle!", npc.name);
        self.session = Some(BattleSession {
            state,
            rng,
            menu: MenuMode::Action,
        });

        self.present_message(&intro);
        self.present_event(&panels);
        self.return_to_action_menu();
        Ok(())
    }

    /// Top-level menu entries, or nothing when no input is accepted.
    pub fn available_actions(&self) -> Vec<ActionId> {
        match self.phase() {
            Some(BattlePhase::PlayerChoice) => ActionId::ALL.to_vec(),
            _ => Vec::new(),
        }
    }

    /// Every move of the active combatant with its PP readout.
    pub fn move_options(&self) -> Vec<MoveOption> {
        let Some(pokemon) = self.state().and_then(|s| s.active(BattleSide::Player).ok()) else {
            return Vec::new();
        };
        pokemon
            .moves
            .iter()
            .enumerate()
            .map(|(index, m)| MoveOption {
                index,
                name: m.data.name.clone(),
                move_type: m.data.move_type,
                current_pp: m.current_pp,
                max_pp: m.data.max_pp,
            })
            .collect()
    }

    /// Moves that can still be selected (PP left).
    pub fn available_moves(&self) -> Vec<MoveOption> {
        self.move_options()
            .into_iter()
            .filter(|m| m.current_pp > 0)
            .collect()
    }

    pub fn switch_options(&self) -> Vec<SwitchOption> {
        let Some(state) = self.state() else {
            return Vec::new();
        };
        let player = state.player(BattleSide::Player);
        player
            .team
            .iter()
            .enumerate()
            .map(|(index, pokemon)| {
                let is_active = index == player.active_pokemon_index;
                SwitchOption {
                    index,
                    panel: pokemon.panel_data(),
                    is_active,
                    selectable: !is_active && !pokemon.is_fainted(),
                }
            })
            .collect()
    }

    fn session_accepting_input(&self) -> Result<&BattleSession, ActionError> {
        let session = self.session.as_ref().ok_or(ActionError::NoActiveBattle)?;
        if session.state.phase != BattlePhase::PlayerChoice {
            return Err(ActionError::NotAcceptingInput(session.state.phase));
        }
        Ok(session)
    }

    pub async fn submit_action_choice(&mut self, action: ActionId) -> BattleResult<()> {
        let session = self.session_accepting_input()?;
        let pokemon = session.state.active(BattleSide::Player)?;
        let name = pokemon.name.clone();
        let has_usable_move = pokemon.has_usable_move();

        match action {
            ActionId::Fight if !has_usable_move => {
                self.present_message(&format!("{} has no moves left!", name));
                self.run_turn(PlayerAction::Pass).await
            }
            ActionId::Fight => {
                self.set_menu(MenuMode::Moves);
                let moves = self.move_options();
                self.present(|p| p.show_move_menu(&moves));
                self.present_message(&format!("What will {} do?", name));
                Ok(())
            }
            ActionId::Pokemon => {
                self.set_menu(MenuMode::Switch);
                let options = self.switch_options();
                self.present(|p| p.show_switch_menu(&options));
                self.present_message("Choose a Pokémon.");
                Ok(())
            }
            ActionId::Bag => {
                self.present_message("The bag isn't available yet.");
                Ok(())
            }
            ActionId::Run => {
                self.present_message("You can't run from a trainer battle!");
                Ok(())
            }
        }
    }

    pub async fn submit_move_choice(&mut self, move_index: usize) -> BattleResult<()> {
        self.submit_player_action(PlayerAction::UseMove { move_index }).await
    }

    pub async fn submit_switch_choice(&mut self, team_index: usize) -> BattleResult<()> {
        self.submit_player_action(PlayerAction::SwitchPokemon { team_index }).await
    }

    async fn submit_player_action(&mut self, action: PlayerAction) -> BattleResult<()> {
        let session = self.session_accepting_input()?;
        if let Err(error) = validate_player_action(&session.state, BattleSide::Player, &action) {
            tracing::debug!(error = %error, ?action, "rejected player input");
            if let BattleEngineError::Action(reason) = &error {
                self.present_message(&rejection_message(reason));
            }
            return Err(error);
        }
        self.run_turn(action).await
    }

    /// Leave a sub-menu for the action menu. Returns whether anything changed.
    pub fn cancel(&mut self) -> bool {
        match self.menu_mode() {
            Some(MenuMode::Moves | MenuMode::Switch) => {
                self.return_to_action_menu();
                true
            }
            _ => false,
        }
    }

    /// Drop the session without reporting an outcome.
    pub fn abort(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(turn = session.state.turn_number, "battle aborted");
        }
    }

    async fn run_turn(&mut self, action: PlayerAction) -> BattleResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(ActionError::NoActiveBattle.into());
        };

        let bus = match resolve_turn(&mut session.state, action, &self.ai, &mut session.rng) {
            Ok(bus) => bus,
            Err(error) => {
                tracing::error!(error = %error, "turn could not be resolved, returning to action menu");
                self.return_to_action_menu();
                return Err(error);
            }
        };

        let outcome = self.play_events(bus).await;
        match outcome {
            Some(outcome) => self.finish(outcome),
            None => self.return_to_action_menu(),
        }
        Ok(())
    }

    /// Replay a turn's events with pacing. Returns the outcome if the battle ended.
    async fn play_events(&mut self, bus: EventBus) -> Option<BattleOutcome> {
        let mut outcome = None;
        for event in bus {
            match &event {
                BattleEvent::PanelsChanged { .. } => {
                    self.present_event(&event);
                    continue;
                }
                BattleEvent::PokemonSwitched { replacement: true, .. } => {
                    pause(self.config.replacement_delay_ms).await;
                }
                BattleEvent::BattleEnded { outcome: ended } => outcome = Some(*ended),
                _ => {}
            }

            let Some(message) = event.format() else {
                continue;
            };
            self.present_message(&message);

            let animated = match &event {
                BattleEvent::MoveUsed { side, move_id, .. } => Some(self.animate(move_id, *side).await),
                _ => None,
            };
            pause(pause_after(&self.config, &event, animated)).await;
        }
        outcome
    }

    async fn animate(&self, move_id: &str, side: BattleSide) -> bool {
        match self.animator.play_move_animation(move_id, side).await {
            Ok(played) => played,
            Err(error) => {
                tracing::warn!(error = %error, move_id, %side, "move animation failed");
                false
            }
        }
    }

    fn finish(&mut self, outcome: BattleOutcome) {
        if let Some(session) = self.session.take() {
            tracing::info!(%outcome, turns = session.state.turn_number, "battle session closed");
            self.last_outcome = Some(outcome);
            self.end_handler.battle_ended(outcome);
        }
    }

    fn set_menu(&mut self, menu: MenuMode) {
        if let Some(session) = self.session.as_mut() {
            session.menu = menu;
        }
    }

    fn return_to_action_menu(&mut self) {
        self.set_menu(MenuMode::Action);
        let prompt = match self.state().and_then(|s| s.active(BattleSide::Player).ok()) {
            Some(pokemon) => format!("What will {} do?", pokemon.name),
            None => "Choose an action.".to_string(),
        };
        let actions = self.available_actions();
        self.present(|p| p.show_action_menu(&actions));
        self.present_message(&prompt);
    }

    fn present_message(&mut self, message: &str) {
        self.present(|p| p.show_message(message));
    }

    fn present_event(&mut self, event: &BattleEvent) {
        if let BattleEvent::PanelsChanged { player, opponent } = event {
            self.present(|p| p.update_panels(player, opponent));
        }
    }

    // Display failures never interrupt a battle.
    fn present<F>(&mut self, call: F)
    where
        F: FnOnce(&mut dyn BattlePresenter) -> Result<(), CollaboratorError>,
    {
        if let Err(error) = call(self.presenter.as_mut()) {
            tracing::warn!(error = %error, "presenter call failed");
        }
    }
}

/// Pause after a shown event. A move announcement with no animation moves on
/// immediately; `animated` is `None` for anything that is not a move.
fn pause_after(config: &BattleConfig, event: &BattleEvent, animated: Option<bool>) -> u64 {
    match (event, animated) {
        (BattleEvent::BattleEnded { .. }, _) => config.finish_delay_ms,
        (_, Some(false)) => 0,
        _ => config.turn_delay_ms,
    }
}

fn rejection_message(reason: &ActionError) -> String {
    match reason {
        ActionError::NoPpRemaining(name) => format!("There's no PP left for {}!", name),
        ActionError::Trapped(name) => format!("{} can't escape!", name),
        ActionError::AlreadyActive(name) => format!("{} is already in battle!", name),
        ActionError::PokemonFainted(name) => format!("{} has no energy left to battle!", name),
        other => format!("{}.", capitalize(&other.to_string())),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pause_after_events() {
        let config = BattleConfig::default();
        let used = BattleEvent::MoveUsed {
            side: BattleSide::Player,
            pokemon: "Eevee".to_string(),
            move_id: "tackle".to_string(),
            move_name: "Tackle".to_string(),
        };
        let ended = BattleEvent::BattleEnded {
            outcome: BattleOutcome::Win,
        };

        assert_eq!(pause_after(&config, &used, Some(true)), 900);
        assert_eq!(pause_after(&config, &used, Some(false)), 0);
        assert_eq!(pause_after(&config, &BattleEvent::CriticalHit, None), 900);
        assert_eq!(pause_after(&config, &ended, None), 1500);
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            rejection_message(&ActionError::NoPpRemaining("Tackle".to_string())),
            "There's no PP left for Tackle!"
        );
        assert_eq!(rejection_message(&ActionError::InvalidMoveIndex(9)), "Invalid move index: 9.");
    }
}
