use serde::{Deserialize, Serialize};

/// Level-adjusted stat block of a creature template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub special_attack: u16,
    pub special_defense: u16,
    pub speed: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub image: String,
    pub frames: u16,
    pub width: Option<u16>,
    pub height: Option<u16>,
}

/// Visual descriptor handed through untouched to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    pub front: Option<SpriteSheet>,
    pub back: Option<SpriteSheet>,
}

/// Immutable creature definition supplied by the roster collaborators.
///
/// Types and moves are kept as names: types go through the alias table on
/// hydration and moves through the move catalog, so both languages and
/// unknown entries degrade gracefully instead of failing to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureTemplate {
    pub name: String,
    pub level: u8,
    pub types: Vec<String>,
    pub stats: BaseStats,
    pub moveset: Vec<String>,
    #[serde(default)]
    pub sprite: Option<SpriteDescriptor>,
}

impl CreatureTemplate {
    /// At most four moves are ever brought into battle.
    pub const MAX_MOVES: usize = 4;
}
