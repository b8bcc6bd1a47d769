//! Configuration types for the auto-timer engine
//!
//! These types mirror the settings a host persists for the autosplitter and
//! are loaded from TOML. Every field has a default so partial files are fine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::games::GameSlot;
use crate::{AutosplitterError, Result};

/// How a hit is registered on the host's counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitMode {
    /// Hits count against the current split
    #[default]
    Common,
    /// Hits count as "way hits" (taken on the way to the split)
    Way,
}

impl HitMode {
    /// Whether the host should book the hit as a way hit
    pub fn is_way(&self) -> bool {
        matches!(self, HitMode::Way)
    }
}

/// Per-game timer toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameSettings {
    /// Let the engine start and stop the host timer
    #[serde(default)]
    pub auto_timer: bool,
    /// Follow the game's own clock instead of real time where supported
    #[serde(default)]
    pub game_timer: bool,
}

impl GameSettings {
    pub fn new(auto_timer: bool, game_timer: bool) -> Self {
        Self { auto_timer, game_timer }
    }
}

/// Timer toggles for every supported game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesConfig {
    pub sekiro: GameSettings,
    pub dark_souls_1: GameSettings,
    pub dark_souls_2: GameSettings,
    pub dark_souls_3: GameSettings,
    pub elden_ring: GameSettings,
    pub hollow_knight: GameSettings,
    pub celeste: GameSettings,
    pub dishonored: GameSettings,
    pub cuphead: GameSettings,
}

impl GamesConfig {
    /// Settings for a slot. `GameSlot::None` has auto-timing off.
    pub fn get(&self, slot: GameSlot) -> GameSettings {
        match slot {
            GameSlot::None => GameSettings::default(),
            GameSlot::Sekiro => self.sekiro,
            GameSlot::DarkSouls1 => self.dark_souls_1,
            GameSlot::DarkSouls2 => self.dark_souls_2,
            GameSlot::DarkSouls3 => self.dark_souls_3,
            GameSlot::EldenRing => self.elden_ring,
            GameSlot::HollowKnight => self.hollow_knight,
            GameSlot::Celeste => self.celeste,
            GameSlot::Dishonored => self.dishonored,
            GameSlot::Cuphead => self.cuphead,
        }
    }

    /// Mutable settings for a slot, `None` for `GameSlot::None`
    pub fn get_mut(&mut self, slot: GameSlot) -> Option<&mut GameSettings> {
        match slot {
            GameSlot::None => None,
            GameSlot::Sekiro => Some(&mut self.sekiro),
            GameSlot::DarkSouls1 => Some(&mut self.dark_souls_1),
            GameSlot::DarkSouls2 => Some(&mut self.dark_souls_2),
            GameSlot::DarkSouls3 => Some(&mut self.dark_souls_3),
            GameSlot::EldenRing => Some(&mut self.elden_ring),
            GameSlot::HollowKnight => Some(&mut self.hollow_knight),
            GameSlot::Celeste => Some(&mut self.celeste),
            GameSlot::Dishonored => Some(&mut self.dishonored),
            GameSlot::Cuphead => Some(&mut self.cuphead),
        }
    }
}

/// Tick intervals and thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Interval of the split-drain tick
    pub fast_tick_ms: u64,
    /// Interval of the auto-timer / auto-reset tick
    pub slow_tick_ms: u64,
    /// Minimum spacing between two accepted split (or hit) signals
    pub split_cooldown_ms: u64,
    /// IGT at or below this (and above zero) counts as a fresh run
    pub reset_threshold_ms: i64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fast_tick_ms: 100,
            slow_tick_ms: 500,
            split_cooldown_ms: 2000,
            reset_threshold_ms: 10_000,
        }
    }
}

impl TimingConfig {
    pub fn fast_tick(&self) -> Duration {
        Duration::from_millis(self.fast_tick_ms)
    }

    pub fn slow_tick(&self) -> Duration {
        Duration::from_millis(self.slow_tick_ms)
    }

    pub fn split_cooldown(&self) -> Duration {
        Duration::from_millis(self.split_cooldown_ms)
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosplitterConfig {
    /// Suppresses every automatic split, hit, timer and reset action
    pub practice_mode: bool,
    /// Reset the profile when a new run is detected
    pub auto_reset_split: bool,
    /// Log signals without forwarding splits, hits or resets to the host
    pub debug_mode: bool,
    pub hit_mode: HitMode,
    pub timing: TimingConfig,
    pub games: GamesConfig,
}

impl AutosplitterConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|source| AutosplitterError::ConfigParse { source })
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AutosplitterError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        log::info!("Loaded autosplitter config from {}", path.display());
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|source| AutosplitterError::ConfigSerialize { source })
    }
}
