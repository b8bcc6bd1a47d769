//! Auto-reset watchdog
//!
//! Detects that a run restarted from zero and resets split progress and the
//! host profile once per occurrence. The [`ResetLatch`] keeps a condition
//! that stays true across ticks from firing more than once.

use serde::{Deserialize, Serialize};

use crate::core::ResetLatch;
use crate::games::{ActiveGameRegistry, BoundingBox};
use crate::host::TimerFacade;
use crate::igt::Igt;

/// How a fresh run is recognised for a game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ResetPolicy {
    /// In-game time just above zero
    Generic,
    /// Player standing inside the new-character spawn area, checked outside loads
    PositionalSnapshot { region: BoundingBox },
    /// Provider reports a new game
    NewGameFlag,
}

/// Runtime switches read by the watchdog each tick
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetSwitches {
    pub auto_reset: bool,
    pub practice_mode: bool,
    pub debug_mode: bool,
}

/// Outcome of one watchdog tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Nothing detected, or already handled
    Idle,
    /// Reset performed
    Fired,
    /// Detected while practice mode is on; latch set, no action
    Suppressed,
}

/// Per-tick auto-reset engine
#[derive(Debug)]
pub struct AutoResetWatchdog {
    latch: ResetLatch,
    threshold_ms: i64,
}

impl AutoResetWatchdog {
    pub fn new(threshold_ms: i64) -> Self {
        Self {
            latch: ResetLatch::default(),
            threshold_ms,
        }
    }

    pub fn latch(&self) -> &ResetLatch {
        &self.latch
    }

    pub fn reset(&mut self) {
        self.latch = ResetLatch::default();
    }

    /// Evaluate one slow tick
    pub fn tick(
        &mut self,
        switches: ResetSwitches,
        registry: &mut ActiveGameRegistry,
        igt: Igt,
        facade: &TimerFacade,
    ) -> ResetOutcome {
        if !switches.auto_reset {
            return ResetOutcome::Idle;
        }

        let slot = registry.active();
        let special = match (registry.game_on(), slot.reset_policy()) {
            (true, ResetPolicy::PositionalSnapshot { region }) => {
                let provider = registry.active_provider();
                // Leave the latch alone while loading; positions are stale
                match provider {
                    Some(p) if !p.is_loading() => {
                        Some(Some(p.position().is_some_and(|pos| region.contains(&pos))))
                    }
                    _ => Some(None),
                }
            }
            (true, ResetPolicy::NewGameFlag) => {
                Some(Some(registry.active_provider().is_some_and(|p| p.is_new_game())))
            }
            _ => None,
        };

        let condition = match special {
            Some(Some(condition)) => condition,
            Some(None) => return ResetOutcome::Idle,
            None => igt.millis().is_some_and(|ms| ms <= self.threshold_ms),
        };

        if !condition {
            self.latch.profile_reset_done = false;
            return ResetOutcome::Idle;
        }
        if self.latch.profile_reset_done {
            return ResetOutcome::Idle;
        }
        self.latch.profile_reset_done = true;

        if switches.practice_mode {
            log::debug!("{}: new run detected in practice mode, not resetting", slot);
            return ResetOutcome::Suppressed;
        }

        log::info!("{}: new run detected, resetting profile", slot);
        registry.reset_split_flags();
        if !switches.debug_mode {
            facade.ensure(false, false);
            facade.profile_reset();
        }
        ResetOutcome::Fired
    }
}
