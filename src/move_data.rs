use schema::{PokemonType, StageStat, StatusKind};
use serde::Serialize;

/// Who a move effect lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EffectTarget {
    User,
    Target,
}

/// Status a move tries to inflict, with its odds and optional duration range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Probability in (0, 1].
    pub chance: f64,
    pub self_targeted: bool,
    pub min_turns: Option<u8>,
    pub max_turns: Option<u8>,
}

impl StatusEffect {
    pub fn target(&self) -> EffectTarget {
        if self.self_targeted {
            EffectTarget::User
        } else {
            EffectTarget::Target
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MoveEffect {
    /// Plain damage, nothing else.
    Damaging,
    StatusInflicting(StatusEffect),
    StatChanging {
        target: EffectTarget,
        changes: &'static [(StageStat, i8)],
    },
    /// Heals the user by a percentage of its max HP.
    Healing { percent: u8 },
    Trapping,
    FocusEnergy { turns: u8 },
}

impl MoveEffect {
    pub fn status_effect(&self) -> Option<&StatusEffect> {
        match self {
            MoveEffect::StatusInflicting(effect) => Some(effect),
            _ => None,
        }
    }
}

/// Static row of the move table.
#[derive(Debug, Clone, Copy)]
struct MoveRow {
    move_type: PokemonType,
    power: u16,
    accuracy: u8,
    pp: u8,
    priority: i8,
    effect: MoveEffect,
    /// AI bias for non-damaging moves.
    ai_bonus: f64,
}

const fn row(move_type: PokemonType, power: u16, accuracy: u8, pp: u8) -> MoveRow {
    MoveRow {
        move_type,
        power,
        accuracy,
        pp,
        priority: 0,
        effect: MoveEffect::Damaging,
        ai_bonus: 0.0,
    }
}

const fn support(
    move_type: PokemonType,
    accuracy: u8,
    pp: u8,
    effect: MoveEffect,
    ai_bonus: f64,
) -> MoveRow {
    MoveRow {
        move_type,
        power: 0,
        accuracy,
        pp,
        priority: 0,
        effect,
        ai_bonus,
    }
}

const fn inflict(kind: StatusKind, chance: f64, turns: Option<(u8, u8)>) -> MoveEffect {
    let (min_turns, max_turns) = match turns {
        Some((min, max)) => (Some(min), Some(max)),
        None => (None, None),
    };
    MoveEffect::StatusInflicting(StatusEffect {
        kind,
        chance,
        self_targeted: false,
        min_turns,
        max_turns,
    })
}

static MOVE_TABLE: phf::Map<&'static str, MoveRow> = phf::phf_map! {
    "razor leaf" => row(PokemonType::Grass, 55, 95, 25),
    "tackle" => row(PokemonType::Normal, 40, 100, 35),
    "poison powder" => support(PokemonType::Poison, 75, 35, inflict(StatusKind::Poisoned, 1.0, None), 25.0),
    "synthesis" => support(PokemonType::Grass, 100, 5, MoveEffect::Healing { percent: 50 }, 16.0),
    "water gun" => row(PokemonType::Water, 40, 100, 25),
    "bite" => row(PokemonType::Dark, 60, 100, 25),
    "withdraw" => support(PokemonType::Water, 100, 40, MoveEffect::StatChanging {
        target: EffectTarget::User,
        changes: &[(StageStat::Defense, 1)],
    }, 10.0),
    "quick attack" => MoveRow { priority: 1, ..row(PokemonType::Normal, 40, 100, 30) },
    "focus energy" => support(PokemonType::Normal, 100, 30, MoveEffect::FocusEnergy { turns: 4 }, 15.0),
    "thunder shock" => row(PokemonType::Electric, 40, 100, 30),
    "thunder wave" => support(PokemonType::Electric, 90, 20, inflict(StatusKind::Paralyzed, 1.0, None), 30.0),
    "double team" => support(PokemonType::Normal, 100, 15, MoveEffect::StatChanging {
        target: EffectTarget::User,
        changes: &[(StageStat::Evasion, 1)],
    }, 12.0),
    "sand attack" => support(PokemonType::Ground, 100, 15, MoveEffect::StatChanging {
        target: EffectTarget::Target,
        changes: &[(StageStat::Accuracy, -1)],
    }, 12.0),
    "covet" => row(PokemonType::Normal, 60, 100, 25),
    "growl" => support(PokemonType::Normal, 100, 40, MoveEffect::StatChanging {
        target: EffectTarget::Target,
        changes: &[(StageStat::Attack, -1)],
    }, 12.0),
    "gust" => row(PokemonType::Flying, 40, 100, 35),
    "ember" => row(PokemonType::Fire, 40, 100, 25),
    "smokescreen" => support(PokemonType::Normal, 100, 20, inflict(StatusKind::Confused, 0.5, Some((2, 4))), 20.0),
    "scratch" => row(PokemonType::Normal, 40, 100, 35),
    "leer" => support(PokemonType::Normal, 100, 30, MoveEffect::StatChanging {
        target: EffectTarget::Target,
        changes: &[(StageStat::Defense, -1)],
    }, 12.0),
    "hypnosis" => support(PokemonType::Psychic, 60, 20, inflict(StatusKind::Sleep, 1.0, Some((2, 4))), 35.0),
    "lick" => row(PokemonType::Ghost, 30, 100, 30),
    "mean look" => support(PokemonType::Normal, 100, 5, MoveEffect::Trapping, 8.0),
    "curse" => support(PokemonType::Ghost, 100, 10, MoveEffect::StatChanging {
        target: EffectTarget::User,
        changes: &[(StageStat::Attack, 1), (StageStat::Defense, 1)],
    }, 18.0),
};

/// Fully resolved move definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveData {
    /// Normalized lookup key, e.g. "quick attack".
    pub id: String,
    /// Name as written in the creature's movepool.
    pub name: String,
    pub move_type: PokemonType,
    pub power: u16,
    pub accuracy: u8,
    pub max_pp: u8,
    pub priority: i8,
    pub effect: MoveEffect,
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        self.power > 0
    }
}

pub fn normalize_move_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Look up a move by name.
///
/// Never fails: names missing from the table resolve to a harmless Normal
/// move with no power, so a bad movepool entry cannot break a battle.
pub fn get_move_data(name: &str) -> MoveData {
    let id = normalize_move_name(name);
    let row = MOVE_TABLE
        .get(id.as_str())
        .copied()
        .unwrap_or_else(|| {
            tracing::debug!(move_name = name, "unknown move, using neutral default");
            row(PokemonType::Normal, 0, 100, 20)
        });

    MoveData {
        id,
        name: name.to_string(),
        move_type: row.move_type,
        power: row.power,
        accuracy: row.accuracy,
        max_pp: row.pp,
        priority: row.priority,
        effect: row.effect,
    }
}

/// AI bias toward disruptive non-damaging moves; zero for everything else.
pub fn status_move_bonus(id: &str) -> f64 {
    MOVE_TABLE
        .get(normalize_move_name(id).as_str())
        .map(|row| row.ai_bonus)
        .unwrap_or(0.0)
}

/// Per-battle copy of a move with its own PP counter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveInstance {
    pub data: MoveData,
    pub current_pp: u8,
}

impl MoveInstance {
    pub fn new(name: &str) -> Self {
        let data = get_move_data(name);
        Self {
            current_pp: data.max_pp,
            data,
        }
    }

    pub fn has_pp(&self) -> bool {
        self.current_pp > 0
    }

    /// Spend one PP, never going below zero.
    pub fn spend_pp(&mut self) {
        self.current_pp = self.current_pp.saturating_sub(1);
    }
}

pub fn instantiate(name: &str) -> MoveInstance {
    MoveInstance::new(name)
}
