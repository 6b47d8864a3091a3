use crate::battle::ai::ScoringAI;
use crate::battle::controller::{
    ActionId, BattleController, BattlePresenter, MoveAnimator, MoveOption, SwitchOption,
};
use crate::battle::state::{BattleEvent, BattleOutcome, BattleSide, BattleState, EventBus, TurnRng};
use crate::config::{AiConfig, BattleConfig};
use crate::errors::{BattleResult, CollaboratorError};
use crate::player::BattlePlayer;
use crate::pokemon::{Combatant, Confusion, PanelData, StatusCondition};
use async_trait::async_trait;
use schema::{BaseStats, CreatureTemplate};
use std::sync::{Arc, Mutex};

/// A builder for creating test combatants with common defaults.
///
/// # Example
/// ```ignore
/// let pokemon = TestPokemonBuilder::new("Pikachu", 13)
///     .with_types(&["Electric"])
///     .with_moves(&["Thunder Shock"])
///     .with_status(StatusCondition::Paralysis)
///     .build();
/// ```
pub struct TestPokemonBuilder {
    name: String,
    level: u8,
    types: Vec<String>,
    stats: BaseStats,
    moves: Vec<String>,
    status: Option<StatusCondition>,
    confusion_turns: Option<u8>,
    current_hp: Option<u16>,
}

impl TestPokemonBuilder {
    /// A Normal-type combatant with 40 HP and 20 in every other stat.
    pub fn new(name: &str, level: u8) -> Self {
        Self {
            name: name.to_string(),
            level,
            types: vec!["Normal".to_string()],
            stats: BaseStats {
                hp: 40,
                attack: 20,
                defense: 20,
                special_attack: 20,
                special_defense: 20,
                speed: 20,
            },
            moves: vec!["Tackle".to_string()],
            status: None,
            confusion_turns: None,
            current_hp: None,
        }
    }

    pub fn with_types(mut self, types: &[&str]) -> Self {
        self.types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_moves(mut self, moves: &[&str]) -> Self {
        self.moves = moves.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_max_hp(mut self, hp: u16) -> Self {
        self.stats.hp = hp;
        self
    }

    pub fn with_attack(mut self, attack: u16) -> Self {
        self.stats.attack = attack;
        self
    }

    pub fn with_defense(mut self, defense: u16) -> Self {
        self.stats.defense = defense;
        self
    }

    pub fn with_speed(mut self, speed: u16) -> Self {
        self.stats.speed = speed;
        self
    }

    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_confusion(mut self, turns: u8) -> Self {
        self.confusion_turns = Some(turns);
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn template(&self) -> CreatureTemplate {
        CreatureTemplate {
            name: self.name.clone(),
            level: self.level,
            types: self.types.clone(),
            stats: self.stats,
            moveset: self.moves.clone(),
            sprite: None,
        }
    }

    pub fn build(self) -> Combatant {
        let mut pokemon = Combatant::hydrate(&self.template());
        pokemon.status = self.status;
        pokemon.confusion = self
            .confusion_turns
            .map(|turns_remaining| Confusion { turns_remaining });
        if let Some(hp) = self.current_hp {
            pokemon.current_hp = hp.min(pokemon.max_hp);
        }
        pokemon
    }
}

/// Creates a standard 1v1 battle state for testing.
pub fn create_test_battle(player: Combatant, opponent: Combatant) -> BattleState {
    create_team_battle(vec![player], vec![opponent])
}

pub fn create_team_battle(player_team: Vec<Combatant>, opponent_team: Vec<Combatant>) -> BattleState {
    BattleState::new(
        "test_battle",
        BattlePlayer::new("Player", player_team),
        BattlePlayer::new("Rival", opponent_team),
    )
}

/// Scripted RNG that always rolls 0.5: paralysis and confusion pass, moves with
/// at least 50 accuracy hit, no crits, spread 0.925.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![0.5; 100])
}

/// An opponent that never switches on its own.
pub fn steady_ai() -> ScoringAI {
    ScoringAI::new(AiConfig {
        switching_enabled: false,
        ..AiConfig::default()
    })
}

/// Helper function to assert that a Result is Ok and return the value.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}

pub fn count_events(bus: &EventBus, predicate: impl Fn(&BattleEvent) -> bool) -> usize {
    bus.events().iter().filter(|e| predicate(e)).count()
}

pub fn moves_used_by(bus: &EventBus, side: BattleSide) -> Vec<String> {
    bus.events()
        .iter()
        .filter_map(|e| match e {
            BattleEvent::MoveUsed { side: s, move_id, .. } if *s == side => Some(move_id.clone()),
            _ => None,
        })
        .collect()
}

/// Everything a presenter was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    Message(String),
    Panels(PanelData, PanelData),
    ActionMenu(Vec<ActionId>),
    MoveMenu(Vec<MoveOption>),
    SwitchMenu(Vec<SwitchOption>),
}

#[derive(Clone, Default)]
pub struct RecordingPresenter {
    pub calls: Arc<Mutex<Vec<PresenterCall>>>,
    /// Makes every message fail, to check that display errors are survivable.
    pub fail_messages: bool,
}

impl RecordingPresenter {
    pub fn messages(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                PresenterCall::Message(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: PresenterCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl BattlePresenter for RecordingPresenter {
    fn show_message(&mut self, message: &str) -> Result<(), CollaboratorError> {
        self.record(PresenterCall::Message(message.to_string()));
        if self.fail_messages {
            return Err(CollaboratorError::new("presenter", "message box unavailable"));
        }
        Ok(())
    }

    fn update_panels(&mut self, player: &PanelData, opponent: &PanelData) -> Result<(), CollaboratorError> {
        self.record(PresenterCall::Panels(player.clone(), opponent.clone()));
        Ok(())
    }

    fn show_action_menu(&mut self, actions: &[ActionId]) -> Result<(), CollaboratorError> {
        self.record(PresenterCall::ActionMenu(actions.to_vec()));
        Ok(())
    }

    fn show_move_menu(&mut self, moves: &[MoveOption]) -> Result<(), CollaboratorError> {
        self.record(PresenterCall::MoveMenu(moves.to_vec()));
        Ok(())
    }

    fn show_switch_menu(&mut self, options: &[SwitchOption]) -> Result<(), CollaboratorError> {
        self.record(PresenterCall::SwitchMenu(options.to_vec()));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingAnimator {
    pub played: Arc<Mutex<Vec<(String, BattleSide)>>>,
    pub fail: bool,
}

#[async_trait]
impl MoveAnimator for RecordingAnimator {
    async fn play_move_animation(&self, move_id: &str, side: BattleSide) -> Result<bool, CollaboratorError> {
        self.played.lock().unwrap().push((move_id.to_string(), side));
        if self.fail {
            return Err(CollaboratorError::new("animator", "scene not loaded"));
        }
        Ok(true)
    }
}

/// A controller with zero delays, a fixed seed and recording collaborators.
pub struct ControllerHarness {
    pub controller: BattleController,
    pub presenter: RecordingPresenter,
    pub animator: RecordingAnimator,
    pub outcomes: Arc<Mutex<Vec<BattleOutcome>>>,
}

impl ControllerHarness {
    pub fn new() -> Self {
        Self::with(BattleConfig {
            rng_seed: Some(7),
            ..BattleConfig::instant()
        }, RecordingPresenter::default(), RecordingAnimator::default())
    }

    pub fn with(config: BattleConfig, presenter: RecordingPresenter, animator: RecordingAnimator) -> Self {
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&outcomes);
        let controller = BattleController::new(
            config,
            Box::new(presenter.clone()),
            Box::new(animator.clone()),
            Box::new(move |outcome: BattleOutcome| sink.lock().unwrap().push(outcome)),
        );
        Self {
            controller,
            presenter,
            animator,
            outcomes,
        }
    }

    pub fn outcomes(&self) -> Vec<BattleOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}
