use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, EnumIter)]
pub enum PokemonType {
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl PokemonType {
    /// Resolve a type name in either supported language.
    ///
    /// Matching ignores surrounding whitespace, case and Latin accents, so
    /// "Eléctrico", "electrico" and "ELECTRIC" all resolve to `Electric`.
    pub fn from_name(name: &str) -> Option<PokemonType> {
        use PokemonType::*;

        let key = fold_name(name);
        let resolved = match key.as_str() {
            "normal" => Normal,
            "fighting" | "lucha" => Fighting,
            "flying" | "volador" => Flying,
            "poison" | "veneno" => Poison,
            "ground" | "tierra" => Ground,
            "rock" | "roca" => Rock,
            "bug" | "bicho" => Bug,
            "ghost" | "fantasma" => Ghost,
            "steel" | "acero" => Steel,
            "fire" | "fuego" => Fire,
            "water" | "agua" => Water,
            "grass" | "planta" => Grass,
            "electric" | "electrico" | "eletrico" => Electric,
            "psychic" | "psiquico" => Psychic,
            "ice" | "hielo" => Ice,
            "dragon" => Dragon,
            "dark" | "siniestro" => Dark,
            "fairy" | "hada" => Fairy,
            _ => return None,
        };
        Some(resolved)
    }

    /// All canonical types in chart order.
    pub fn all() -> impl Iterator<Item = PokemonType> {
        PokemonType::iter()
    }

    /// Calculate type effectiveness multiplier for attacking type vs defending type
    /// Returns: 2.0 = Super Effective, 1.0 = Normal, 0.5 = Not Very Effective, 0.0 = No Effect
    pub fn type_effectiveness(attacking: PokemonType, defending: PokemonType) -> f64 {
        use PokemonType::*;

        match (attacking, defending) {
            // Normal
            (Normal, Ghost) => 0.0,
            (Normal, Rock) | (Normal, Steel) => 0.5,

            // Fire
            (Fire, Fire) | (Fire, Water) | (Fire, Rock) | (Fire, Dragon) => 0.5,
            (Fire, Grass) | (Fire, Ice) | (Fire, Bug) | (Fire, Steel) => 2.0,

            // Water
            (Water, Water) | (Water, Grass) | (Water, Dragon) => 0.5,
            (Water, Fire) | (Water, Ground) | (Water, Rock) => 2.0,

            // Electric
            (Electric, Electric) | (Electric, Grass) | (Electric, Dragon) => 0.5,
            (Electric, Ground) => 0.0,
            (Electric, Water) | (Electric, Flying) => 2.0,

            // Grass
            (Grass, Fire)
            | (Grass, Grass)
            | (Grass, Poison)
            | (Grass, Flying)
            | (Grass, Bug)
            | (Grass, Dragon)
            | (Grass, Steel) => 0.5,
            (Grass, Water) | (Grass, Ground) | (Grass, Rock) => 2.0,

            // Ice
            (Ice, Fire) | (Ice, Water) | (Ice, Ice) | (Ice, Steel) => 0.5,
            (Ice, Grass) | (Ice, Ground) | (Ice, Flying) | (Ice, Dragon) => 2.0,

            // Poison
            (Poison, Poison) | (Poison, Ground) | (Poison, Rock) | (Poison, Ghost) => 0.5,
            (Poison, Grass) | (Poison, Fairy) => 2.0,

            // Ground
            (Ground, Grass) | (Ground, Bug) => 0.5,
            (Ground, Flying) => 0.0,
            (Ground, Fire)
            | (Ground, Electric)
            | (Ground, Poison)
            | (Ground, Rock)
            | (Ground, Steel) => 2.0,

            // Flying
            (Flying, Electric) | (Flying, Rock) | (Flying, Steel) => 0.5,
            (Flying, Grass) | (Flying, Fighting) | (Flying, Bug) => 2.0,

            // Rock
            (Rock, Fighting) | (Rock, Ground) | (Rock, Steel) => 0.5,
            (Rock, Fire) | (Rock, Ice) | (Rock, Flying) | (Rock, Bug) => 2.0,

            // Ghost
            (Ghost, Normal) => 0.0,
            (Ghost, Dark) => 0.5,
            (Ghost, Ghost) | (Ghost, Psychic) => 2.0,

            // Dark
            (Dark, Fighting) | (Dark, Dark) | (Dark, Fairy) => 0.5,
            (Dark, Ghost) | (Dark, Psychic) => 2.0,

            // Anything the chart does not list is neutral.
            _ => 1.0,
        }
    }
}

/// Product of the chart entries over every (attacking, defending) pair.
///
/// A Fire move against a Grass/Ice defender is 2 × 2 = 4. Either side being
/// empty yields the neutral multiplier.
pub fn type_multiplier(attacking: &[PokemonType], defending: &[PokemonType]) -> f64 {
    if attacking.is_empty() || defending.is_empty() {
        return 1.0;
    }

    attacking
        .iter()
        .flat_map(|atk| {
            defending
                .iter()
                .map(move |def| PokemonType::type_effectiveness(*atk, *def))
        })
        .product()
}

/// Name-based variant of [`type_multiplier`]. Unrecognized names are dropped.
pub fn type_multiplier_by_name(attacking: &[&str], defending: &[&str]) -> f64 {
    let atk: Vec<PokemonType> = attacking.iter().filter_map(|n| PokemonType::from_name(n)).collect();
    let def: Vec<PokemonType> = defending.iter().filter_map(|n| PokemonType::from_name(n)).collect();
    type_multiplier(&atk, &def)
}

/// Same-type attack bonus check.
pub fn is_stab(move_type: PokemonType, attacker_types: &[PokemonType]) -> bool {
    attacker_types.contains(&move_type)
}

fn fold_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
