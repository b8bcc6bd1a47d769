//! In-game time resolution
//!
//! Reads the active provider's clock and folds every way it can fail into
//! [`Igt::Unavailable`]. Hosts that still speak the `-1` convention get it
//! from [`Igt::as_sentinel`].

use serde::{Deserialize, Serialize};

use crate::games::ActiveGameRegistry;

/// In-game time as seen by the engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Igt {
    /// A usable elapsed time, always greater than zero
    Valid(i64),
    /// No usable time this tick
    Unavailable,
}

impl Igt {
    /// Value hosts see for an unavailable clock
    pub const SENTINEL: i64 = -1;

    /// Classify a raw millisecond reading
    pub fn from_millis(ms: i64) -> Self {
        if ms > 0 {
            Igt::Valid(ms)
        } else {
            Igt::Unavailable
        }
    }

    pub fn millis(&self) -> Option<i64> {
        match self {
            Igt::Valid(ms) => Some(*ms),
            Igt::Unavailable => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Igt::Valid(_))
    }

    /// Raw value with `-1` standing in for "unknown"
    pub fn as_sentinel(&self) -> i64 {
        self.millis().unwrap_or(Self::SENTINEL)
    }
}

/// Resolves the current in-game time from whichever provider is active
#[derive(Debug, Default)]
pub struct IgtAggregator {
    /// Set while the active provider keeps failing, to log once per streak
    failing: bool,
}

impl IgtAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current in-game time of the active game
    pub fn current(&mut self, registry: &ActiveGameRegistry) -> Igt {
        let slot = registry.active();
        if !slot.supports_igt() || !registry.game_on() {
            return Igt::Unavailable;
        }

        let Some(provider) = registry.active_provider() else {
            return Igt::Unavailable;
        };

        match provider.in_game_time() {
            Ok(ms) => {
                if self.failing {
                    log::info!("{}: in-game time readable again", slot);
                    self.failing = false;
                }
                Igt::from_millis(ms)
            }
            Err(e) => {
                if !self.failing {
                    log::warn!("{}: in-game time unavailable: {}", slot, e);
                    self.failing = true;
                }
                Igt::Unavailable
            }
        }
    }

    /// Forget failure state, used when the active game changes
    pub fn reset(&mut self) {
        self.failing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{GameSlot, TelemetryProvider};

    #[test]
    fn test_from_millis() {
        assert_eq!(Igt::from_millis(250), Igt::Valid(250));
        assert_eq!(Igt::from_millis(0), Igt::Unavailable);
        assert_eq!(Igt::from_millis(-1), Igt::Unavailable);
        assert_eq!(Igt::Valid(5).as_sentinel(), 5);
        assert_eq!(Igt::Unavailable.as_sentinel(), -1);
    }

    #[test]
    fn test_no_active_game() {
        let (provider, handle) = TelemetryProvider::new(true);
        handle.update(|s| {
            s.attached = true;
            s.in_game_time_ms = Some(1000);
        });
        let registry = ActiveGameRegistry::new().with_provider(GameSlot::Sekiro, provider);

        let mut igt = IgtAggregator::new();
        assert_eq!(igt.current(&registry), Igt::Unavailable);
    }

    #[test]
    fn test_active_game_reports_time() {
        let (provider, handle) = TelemetryProvider::new(true);
        handle.update(|s| {
            s.attached = true;
            s.in_game_time_ms = Some(1000);
        });
        let mut registry = ActiveGameRegistry::new().with_provider(GameSlot::Sekiro, provider);
        registry.set_active(GameSlot::Sekiro);

        let mut igt = IgtAggregator::new();
        assert_eq!(igt.current(&registry), Igt::Valid(1000));

        handle.update(|s| s.attached = false);
        assert_eq!(igt.current(&registry), Igt::Unavailable);
    }

    #[test]
    fn test_probe_failure_is_swallowed() {
        let (provider, handle) = TelemetryProvider::new(true);
        handle.update(|s| s.attached = true);
        let mut registry = ActiveGameRegistry::new().with_provider(GameSlot::EldenRing, provider);
        registry.set_active(GameSlot::EldenRing);

        let mut igt = IgtAggregator::new();
        assert_eq!(igt.current(&registry), Igt::Unavailable);
        assert!(igt.failing);

        handle.update(|s| s.in_game_time_ms = Some(42));
        assert_eq!(igt.current(&registry), Igt::Valid(42));
        assert!(!igt.failing);
    }

    #[test]
    fn test_games_without_clock() {
        let (provider, handle) = TelemetryProvider::new(true);
        handle.update(|s| {
            s.attached = true;
            s.in_game_time_ms = Some(1000);
        });
        let mut registry = ActiveGameRegistry::new().with_provider(GameSlot::HollowKnight, provider);
        registry.set_active(GameSlot::HollowKnight);

        let mut igt = IgtAggregator::new();
        assert_eq!(igt.current(&registry), Igt::Unavailable);
    }
}
