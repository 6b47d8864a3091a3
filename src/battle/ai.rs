//! Heuristic opponent: move scoring, proactive switching and lead ordering.

use crate::battle::calculators::{move_effectiveness, stab_bonus};
use crate::battle::state::{AiMemory, BattleSide, BattleState};
use crate::config::AiConfig;
use crate::move_data::{status_move_bonus, MoveData};
use crate::player::BattlePlayer;
use crate::pokemon::Combatant;
use ordered_float::OrderedFloat;

pub const PRIORITY_WEIGHT: f64 = 15.0;

/// Index of the highest score; the earliest entry wins a tie.
fn first_best<I>(scored: I) -> Option<(usize, f64)>
where
    I: DoubleEndedIterator<Item = (usize, f64)>,
{
    scored.rev().max_by_key(|(_, score)| OrderedFloat(*score))
}

#[derive(Debug, Clone, Default)]
pub struct ScoringAI {
    config: AiConfig,
}

impl ScoringAI {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Raw value of a move against a defender, before any situational bias.
    pub fn score_move(&self, move_data: &MoveData, attacker: &Combatant, defender: &Combatant) -> f64 {
        let accuracy = (move_data.accuracy as f64 / 100.0).clamp(0.1, 1.0);
        let damage_score = move_data.power as f64
            * stab_bonus(move_data, attacker)
            * move_effectiveness(move_data, defender)
            * accuracy;

        let mut score = damage_score + move_data.priority as f64 * PRIORITY_WEIGHT;
        if move_data.power == 0 {
            score += status_move_bonus(&move_data.id);
        }
        score
    }

    /// Best raw score any usable move of `attacker` reaches against `defender`.
    pub fn matchup_score(&self, attacker: &Combatant, defender: &Combatant) -> f64 {
        attacker
            .moves
            .iter()
            .filter(|m| m.has_pp())
            .map(|m| self.score_move(&m.data, attacker, defender))
            .max_by_key(|score| OrderedFloat(*score))
            .unwrap_or(0.0)
    }

    /// Lean on status moves when the player keeps landing super-effective
    /// hits or the AI is low, as long as the target is still clean.
    pub fn prefers_status(&self, attacker: &Combatant, defender: &Combatant, memory: &AiMemory) -> bool {
        let pressured = memory.player_super_effective_streak >= self.config.streak_threshold
            || attacker.hp_ratio() <= self.config.low_hp_ratio;
        pressured && !defender.is_afflicted()
    }

    fn can_inflict(move_data: &MoveData, attacker: &Combatant, defender: &Combatant) -> bool {
        match move_data.effect.status_effect() {
            Some(effect) => {
                let target = if effect.self_targeted { attacker } else { defender };
                !target.is_fainted() && target.can_receive(effect.kind)
            }
            None => false,
        }
    }

    fn selection_score(
        &self,
        move_data: &MoveData,
        attacker: &Combatant,
        defender: &Combatant,
        prefer_status: bool,
    ) -> f64 {
        let mut score = self.score_move(move_data, attacker, defender);
        let inflicts_status = move_data.effect.status_effect().is_some();
        let can_inflict = Self::can_inflict(move_data, attacker, defender);

        if prefer_status {
            if can_inflict {
                score += self.config.status_preference_bonus;
            } else if !move_data.is_damaging() {
                score -= self.config.status_futility_penalty;
            }
        }

        if defender.is_afflicted() {
            if move_data.is_damaging() {
                score += self.config.afflicted_damage_bias;
            } else if inflicts_status && !can_inflict {
                score -= self.config.status_futility_penalty;
            }
        }
        score
    }

    /// Pick the best usable move. Ties go to the earliest move in the movepool.
    pub fn choose_move(&self, attacker: &Combatant, defender: &Combatant, memory: &AiMemory) -> Option<usize> {
        let prefer_status = self.prefers_status(attacker, defender, memory);
        let scored: Vec<(usize, f64)> = attacker
            .available_moves()
            .into_iter()
            .map(|i| {
                let score = self.selection_score(&attacker.moves[i].data, attacker, defender, prefer_status);
                (i, score)
            })
            .collect();

        first_best(scored.into_iter()).map(|(i, _)| i)
    }

    /// Best living member of `team` to face `defender`, excluding `exclude`.
    fn best_member(&self, team: &BattlePlayer, defender: &Combatant, exclude: Option<usize>) -> Option<(usize, f64)> {
        let scored: Vec<(usize, f64)> = team
            .team
            .iter()
            .enumerate()
            .filter(|(i, p)| Some(*i) != exclude && !p.is_fainted())
            .map(|(i, p)| (i, self.matchup_score(p, defender)))
            .collect();
        first_best(scored.into_iter())
    }

    /// Decide whether the opponent should switch out this turn, and to whom.
    pub fn choose_switch_target(&self, state: &BattleState) -> Option<usize> {
        if !self.config.switching_enabled || state.is_trapped(BattleSide::Opponent) {
            return None;
        }

        let team = state.player(BattleSide::Opponent);
        let active = state.active(BattleSide::Opponent).ok()?;
        let defender = state.active(BattleSide::Player).ok()?;
        let (target, alternative) = self.best_member(team, defender, Some(team.active_pokemon_index))?;

        let current = self.matchup_score(active, defender);
        let outclassed = alternative > current + self.config.switch_margin;
        let low_hp = active.hp_ratio() <= self.config.low_hp_ratio;
        let pressured = state.ai_memory.player_super_effective_streak >= self.config.streak_threshold;

        if outclassed || low_hp || pressured {
            tracing::debug!(
                from = %active.name,
                to = %team.team[target].name,
                current,
                alternative,
                low_hp,
                pressured,
                "opponent switching"
            );
            Some(target)
        } else {
            None
        }
    }

    /// Replacement after a faint: the living member with the best matchup.
    pub fn choose_replacement(&self, team: &BattlePlayer, defender: &Combatant) -> Option<usize> {
        self.best_member(team, defender, None).map(|(i, _)| i)
    }

    /// Sort the opponent roster so the member with the best average matchup
    /// against the whole player roster leads. Equal averages keep roster order.
    pub fn order_lead(&self, opponent: &mut [Combatant], player: &[Combatant]) {
        if player.is_empty() {
            return;
        }
        let average = |member: &Combatant| {
            player.iter().map(|p| self.matchup_score(member, p)).sum::<f64>() / player.len() as f64
        };
        opponent.sort_by_cached_key(|member| std::cmp::Reverse(OrderedFloat(average(member))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_data::get_move_data;
    use crate::pokemon::StatusCondition;
    use pretty_assertions::assert_eq;
    use schema::{BaseStats, CreatureTemplate};

    fn combatant(name: &str, types: &[&str], moves: &[&str]) -> Combatant {
        Combatant::hydrate(&CreatureTemplate {
            name: name.to_string(),
            level: 13,
            types: types.iter().map(|t| t.to_string()).collect(),
            stats: BaseStats {
                hp: 40,
                attack: 20,
                defense: 20,
                special_attack: 20,
                special_defense: 20,
                speed: 20,
            },
            moveset: moves.iter().map(|m| m.to_string()).collect(),
            sprite: None,
        })
    }

    #[test]
    fn test_score_move_formula() {
        let ai = ScoringAI::default();
        let cyndaquil = combatant("Cyndaquil", &["Fire"], &[]);
        let chikorita = combatant("Chikorita", &["Grass"], &[]);
        let gastly = combatant("Gastly", &["Ghost", "Poison"], &[]);

        // 40 * 1.5 STAB * 2.0
        assert_eq!(ai.score_move(&get_move_data("Ember"), &cyndaquil, &chikorita), 120.0);
        // 40 * 1 * 1 + 15 priority
        assert_eq!(ai.score_move(&get_move_data("Quick Attack"), &cyndaquil, &chikorita), 55.0);
        // immune, only priority remains
        assert_eq!(ai.score_move(&get_move_data("Quick Attack"), &cyndaquil, &gastly), 15.0);
        assert_eq!(ai.score_move(&get_move_data("Hypnosis"), &gastly, &chikorita), 35.0);
        // 55 * 0.5 * 0.95 accuracy against Fire
        let razor = ai.score_move(&get_move_data("Razor Leaf"), &chikorita, &cyndaquil);
        assert!((razor - 55.0 * 1.5 * 0.5 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_choose_move_prefers_damage_when_comfortable() {
        let ai = ScoringAI::default();
        let gastly = combatant("Gastly", &["Ghost", "Poison"], &["Hypnosis", "Lick", "Mean Look", "Curse"]);
        let pidgey = combatant("Pidgey", &["Normal", "Flying"], &["Tackle"]);

        // Lick is immune against Normal, so Hypnosis (35) beats Curse (18).
        assert_eq!(ai.choose_move(&gastly, &pidgey, &AiMemory::default()), Some(0));

        let chikorita = combatant("Chikorita", &["Grass"], &["Tackle"]);
        // Lick: 30 * 1.5 = 45 beats Hypnosis 35.
        assert_eq!(ai.choose_move(&gastly, &chikorita, &AiMemory::default()), Some(1));
    }

    #[test]
    fn test_status_preference_under_pressure() {
        let ai = ScoringAI::default();
        let gastly = combatant("Gastly", &["Ghost", "Poison"], &["Hypnosis", "Lick"]);
        let chikorita = combatant("Chikorita", &["Grass"], &["Tackle"]);
        let memory = AiMemory {
            player_super_effective_streak: 2,
            ..AiMemory::default()
        };

        assert!(ai.prefers_status(&gastly, &chikorita, &memory));
        // Hypnosis 35 + 30 beats Lick 45.
        assert_eq!(ai.choose_move(&gastly, &chikorita, &memory), Some(0));

        let mut asleep = chikorita.clone();
        asleep.inflict_status(StatusCondition::Sleep { turns_remaining: 2 });
        assert!(!ai.prefers_status(&gastly, &asleep, &memory));
        assert_eq!(ai.choose_move(&gastly, &asleep, &memory), Some(1));
    }

    #[test]
    fn test_ties_go_to_first_move() {
        let ai = ScoringAI::default();
        let rattata = combatant("Rattata", &["Normal"], &["Tackle", "Scratch"]);
        let totodile = combatant("Totodile", &["Water"], &["Tackle"]);
        assert_eq!(ai.choose_move(&rattata, &totodile, &AiMemory::default()), Some(0));

        let mut spent = rattata.clone();
        spent.moves[0].current_pp = 0;
        assert_eq!(ai.choose_move(&spent, &totodile, &AiMemory::default()), Some(1));
        spent.moves[1].current_pp = 0;
        assert_eq!(ai.choose_move(&spent, &totodile, &AiMemory::default()), None);
    }

    #[test]
    fn test_order_lead_puts_best_average_first() {
        let ai = ScoringAI::default();
        let mut opponent = vec![
            combatant("Totodile", &["Water"], &["Water Gun"]),
            combatant("Cyndaquil", &["Fire"], &["Ember"]),
            combatant("Rattata", &["Normal"], &["Tackle"]),
        ];
        let player = vec![
            combatant("Chikorita", &["Grass"], &["Tackle"]),
            combatant("Pikachu", &["Electric"], &["Tackle"]),
        ];

        ai.order_lead(&mut opponent, &player);
        let names: Vec<&str> = opponent.iter().map(|p| p.name.as_str()).collect();
        // Ember: (120 + 60) / 2 = 90; Tackle with STAB: 60; Water Gun: (30 + 60) / 2 = 45.
        assert_eq!(names, vec!["Cyndaquil", "Rattata", "Totodile"]);
    }

    #[test]
    fn test_switch_target_when_outclassed() {
        let player = BattlePlayer::new("Player", vec![combatant("Chikorita", &["Grass"], &["Razor Leaf"])]);
        let opponent = BattlePlayer::new(
            "Rival",
            vec![
                combatant("Totodile", &["Water"], &["Water Gun"]),
                combatant("Cyndaquil", &["Fire"], &["Ember"]),
            ],
        );
        let state = BattleState::new("switch_check", player, opponent);

        // Water Gun scores 30 against Grass, Ember 120.
        assert_eq!(ScoringAI::default().choose_switch_target(&state), Some(1));

        let disabled = ScoringAI::new(AiConfig {
            switching_enabled: false,
            ..AiConfig::default()
        });
        assert_eq!(disabled.choose_switch_target(&state), None);
    }
}
