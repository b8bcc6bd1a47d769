//! Supported games and their providers
//!
//! This module defines the `GameSlot` enum naming every game the engine can
//! drive, the per-game policy table, the `CapabilityProvider` trait and the
//! `ActiveGameRegistry` that keeps at most one provider engaged.

mod provider;
mod registry;
mod telemetry;

pub use provider::{BoundingBox, BoxedProvider, CapabilityProvider, Position3D, ProbeError};
pub use registry::ActiveGameRegistry;
pub use telemetry::{ProviderState, TelemetryHandle, TelemetryProvider};

use serde::{Deserialize, Serialize};

use crate::config::GameSettings;
use crate::engines::{EventTrigger, ResetPolicy, TimerPolicy};

/// Spawn point of a fresh DS2 character in Things Betwixt
pub const DS2_NEW_GAME_REGION: BoundingBox = BoundingBox::new(-214.0, -213.0, -323.0, -322.0);

/// A game the engine can be engaged on
///
/// Declaration order doubles as precedence: when several providers report
/// enabled at once, the first one declared here wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameSlot {
    /// No splitter engaged
    #[default]
    None,
    Sekiro,
    DarkSouls1,
    DarkSouls2,
    DarkSouls3,
    EldenRing,
    HollowKnight,
    Celeste,
    Dishonored,
    Cuphead,
}

impl GameSlot {
    /// Every real game, in precedence order
    pub const GAMES: [GameSlot; 9] = [
        GameSlot::Sekiro,
        GameSlot::DarkSouls1,
        GameSlot::DarkSouls2,
        GameSlot::DarkSouls3,
        GameSlot::EldenRing,
        GameSlot::HollowKnight,
        GameSlot::Celeste,
        GameSlot::Dishonored,
        GameSlot::Cuphead,
    ];

    /// Index used by the host's game selector (`None` is 0)
    pub fn index(self) -> i32 {
        match self {
            GameSlot::None => 0,
            other => Self::GAMES.iter().position(|g| *g == other).map_or(0, |i| i as i32 + 1),
        }
    }

    /// Slot for a host selector index
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(GameSlot::None),
            i if i > 0 => Self::GAMES.get(i as usize - 1).copied(),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            GameSlot::None => "None",
            GameSlot::Sekiro => "Sekiro: Shadows Die Twice",
            GameSlot::DarkSouls1 => "Dark Souls Remastered",
            GameSlot::DarkSouls2 => "Dark Souls II: Scholar of the First Sin",
            GameSlot::DarkSouls3 => "Dark Souls III",
            GameSlot::EldenRing => "Elden Ring",
            GameSlot::HollowKnight => "Hollow Knight",
            GameSlot::Celeste => "Celeste",
            GameSlot::Dishonored => "Dishonored",
            GameSlot::Cuphead => "Cuphead",
        }
    }

    /// Whether the game's provider exposes an in-game clock
    pub fn supports_igt(self) -> bool {
        matches!(
            self,
            GameSlot::Sekiro
                | GameSlot::DarkSouls1
                | GameSlot::DarkSouls3
                | GameSlot::EldenRing
                | GameSlot::Celeste
                | GameSlot::Cuphead
        )
    }

    /// Auto-timer policy for this game, `None` when auto-timing is off
    pub fn timer_policy(self, settings: GameSettings) -> Option<TimerPolicy> {
        if !settings.auto_timer {
            return None;
        }

        let policy = match self {
            GameSlot::None => return None,
            GameSlot::Sekiro | GameSlot::DarkSouls1 | GameSlot::EldenRing => TimerPolicy::TimeDriven {
                pause_on_frozen: settings.game_timer,
            },
            // DS3 stores its game-timer toggle inverted
            GameSlot::DarkSouls3 => TimerPolicy::TimeDriven {
                pause_on_frozen: !settings.game_timer,
            },
            GameSlot::DarkSouls2 | GameSlot::HollowKnight => TimerPolicy::LoadingFlag {
                pause_while_loading: false,
            },
            GameSlot::Dishonored => TimerPolicy::LoadingFlag {
                pause_while_loading: settings.game_timer,
            },
            GameSlot::Celeste => {
                if settings.game_timer {
                    TimerPolicy::EventDriven(EventTrigger::ClockAdvance)
                } else {
                    TimerPolicy::EventDriven(EventTrigger::RunStartEdge)
                }
            }
            GameSlot::Cuphead => TimerPolicy::EventDriven(EventTrigger::InGameSession {
                stop_on_level_complete: settings.game_timer,
            }),
        };
        Some(policy)
    }

    /// How a fresh run is detected for this game
    pub fn reset_policy(self) -> ResetPolicy {
        match self {
            GameSlot::DarkSouls2 => ResetPolicy::PositionalSnapshot {
                region: DS2_NEW_GAME_REGION,
            },
            GameSlot::HollowKnight => ResetPolicy::NewGameFlag,
            _ => ResetPolicy::Generic,
        }
    }
}

impl std::fmt::Display for GameSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
