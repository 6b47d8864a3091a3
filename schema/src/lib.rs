// Exploration Battle Schema - Shared type definitions
// This crate contains the static enums and template types shared between the
// battle resolver and the roster data it is hydrated from.

// Re-export the main types
pub use battle_data::*;
pub use pokemon_types::*;
pub use species_data::*;

pub mod battle_data;
pub mod pokemon_types;
pub mod species_data;
