//! Engine state types

use serde::{Deserialize, Serialize};

use crate::engines::{GateStats, SignalStatus};
use crate::games::GameSlot;

/// What the auto-timer remembers between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerObservation {
    /// Host timer state after the last tick
    pub running: bool,
    /// Last usable in-game time, used to tell an advancing clock from a frozen one
    pub last_observed_igt: i64,
    /// Run-start edge already consumed
    pub run_start_latched: bool,
}

/// One-shot guard of the auto-reset watchdog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetLatch {
    /// Set when a reset fired; cleared once the triggering condition is false
    pub profile_reset_done: bool,
}

/// Observable state of one dispatch gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSnapshot {
    pub status: SignalStatus,
    pub pending: bool,
    pub stats: GateStats,
}

/// Serializable picture of the whole engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub active_game: GameSlot,
    pub game_on: bool,
    pub practice_mode: bool,
    pub debug_mode: bool,
    pub auto_reset_split: bool,
    pub checking: bool,
    /// In-game time with `-1` for unknown
    pub in_game_time_ms: i64,
    pub timer: TimerObservation,
    pub reset_latch: ResetLatch,
    pub split: GateSnapshot,
    pub hit: GateSnapshot,
}

impl EngineSnapshot {
    /// Whether the last split signal was accepted
    pub fn split_accepted(&self) -> bool {
        self.split.status == SignalStatus::Accepted
    }
}
