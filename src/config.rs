//! Battle pacing and opponent tuning.
//!
//! Values come from `BattleConfig::default()`, an optional RON file, and then
//! environment overrides, in that order.

use crate::errors::ConfigError;
use crate::teams::npc_team_ids;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_OPPONENT: &str = "kidJonathan";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Pause after each narration line.
    pub turn_delay_ms: u64,
    /// Pause before a replacement is sent out after a faint.
    pub replacement_delay_ms: u64,
    /// Pause after the final message, before the end callback fires.
    pub finish_delay_ms: u64,
    /// Fixed seed for reproducible battles. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    pub opponent: String,
    pub ai: AiConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            turn_delay_ms: 900,
            replacement_delay_ms: 400,
            finish_delay_ms: 1500,
            rng_seed: None,
            opponent: DEFAULT_OPPONENT.to_string(),
            ai: AiConfig::default(),
        }
    }
}

impl BattleConfig {
    /// No pauses at all. Used by tests and the JSON event stream.
    pub fn instant() -> Self {
        Self {
            turn_delay_ms: 0,
            replacement_delay_ms: 0,
            finish_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_TURN_DELAY_MS` - Pause after each message (default: 900)
    /// - `BATTLE_REPLACEMENT_DELAY_MS` - Pause before a replacement (default: 400)
    /// - `BATTLE_FINISH_DELAY_MS` - Pause before the battle closes (default: 1500)
    /// - `BATTLE_AI_SWITCHING` - Let the opponent switch proactively (default: true)
    /// - `BATTLE_RNG_SEED` - Fixed RNG seed (default: unset)
    /// - `BATTLE_OPPONENT` - NPC team id (default: kidJonathan)
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Check that the configured opponent exists in the NPC registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let known = npc_team_ids();
        if known.iter().any(|id| *id == self.opponent) {
            return Ok(());
        }
        Err(ConfigError::UnknownOpponent {
            id: self.opponent.clone(),
            known,
        })
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key/value source. Unparseable values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = parse_value::<u64>(&lookup, "BATTLE_TURN_DELAY_MS") {
            self.turn_delay_ms = ms;
        }
        if let Some(ms) = parse_value::<u64>(&lookup, "BATTLE_REPLACEMENT_DELAY_MS") {
            self.replacement_delay_ms = ms;
        }
        if let Some(ms) = parse_value::<u64>(&lookup, "BATTLE_FINISH_DELAY_MS") {
            self.finish_delay_ms = ms;
        }
        if let Some(enabled) = lookup("BATTLE_AI_SWITCHING").as_deref().and_then(parse_bool) {
            self.ai.switching_enabled = enabled;
        }
        if let Some(seed) = parse_value::<u64>(&lookup, "BATTLE_RNG_SEED") {
            self.rng_seed = Some(seed);
        }
        if let Some(opponent) = lookup("BATTLE_OPPONENT").filter(|id| !id.trim().is_empty()) {
            self.opponent = opponent.trim().to_string();
        }
        self
    }
}

/// Opponent decision thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub switching_enabled: bool,
    /// How much better a bench member must score before the AI switches.
    pub switch_margin: f64,
    pub low_hp_ratio: f64,
    pub streak_threshold: u32,
    pub status_preference_bonus: f64,
    pub status_futility_penalty: f64,
    pub afflicted_damage_bias: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            switching_enabled: true,
            switch_margin: 22.0,
            low_hp_ratio: 0.35,
            streak_threshold: 2,
            status_preference_bonus: 30.0,
            status_futility_penalty: 20.0,
            afflicted_damage_bias: 10.0,
        }
    }
}

fn parse_value<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key)?.trim().parse().ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
