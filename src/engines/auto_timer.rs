//! Auto-timer state machine
//!
//! Runs on the slow tick and decides whether the host timer should be
//! running for the active game. Each game maps to one [`TimerPolicy`].
//! Whatever the policy, a session that is not live forces the timer off,
//! and the host only ever sees genuine start/stop transitions.

use serde::{Deserialize, Serialize};

use crate::core::TimerObservation;
use crate::games::{ActiveGameRegistry, CapabilityProvider};
use crate::host::{TimerFacade, TimerTransition};
use crate::igt::Igt;

/// Discrete events an event-driven game starts or stops the timer on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTrigger {
    /// Start once when the player first enters gameplay; never stops on its own
    RunStartEdge,
    /// Run while the game's own clock keeps changing between ticks
    ClockAdvance,
    /// Run while the player is in gameplay
    InGameSession { stop_on_level_complete: bool },
}

/// Shape of the auto-timer decision for a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerPolicy {
    /// Driven by the provider's in-game time. With `pause_on_frozen` the
    /// timer also stops while the time does not advance between ticks.
    TimeDriven { pause_on_frozen: bool },
    /// Driven by the provider's run-started latch, optionally paused during loads
    LoadingFlag { pause_while_loading: bool },
    EventDriven(EventTrigger),
}

impl TimerPolicy {
    /// Whether the host may display the game's clock for this policy
    pub fn reports_game_time(&self) -> bool {
        matches!(
            self,
            TimerPolicy::TimeDriven { pause_on_frozen: true }
                | TimerPolicy::EventDriven(EventTrigger::ClockAdvance)
                | TimerPolicy::EventDriven(EventTrigger::InGameSession {
                    stop_on_level_complete: true
                })
        )
    }

    /// Whether transitions are bracketed by duration flushes
    fn flushes_duration(&self) -> bool {
        matches!(self, TimerPolicy::TimeDriven { pause_on_frozen: true })
    }
}

/// Per-tick auto-timer engine
#[derive(Debug, Default)]
pub struct AutoTimer {
    observation: TimerObservation,
}

impl AutoTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observation(&self) -> &TimerObservation {
        &self.observation
    }

    /// Back to the initial observation, used when the active game changes
    pub fn reset(&mut self) {
        self.observation = TimerObservation::default();
    }

    /// Re-arm the run-start edge after the profile was reset
    pub fn clear_run_start(&mut self) {
        self.observation.run_start_latched = false;
    }

    /// Evaluate one slow tick. `policy` is `None` when auto-timing is off,
    /// practice mode is on or no game is active.
    pub fn tick(
        &mut self,
        policy: Option<TimerPolicy>,
        registry: &ActiveGameRegistry,
        igt: Igt,
        facade: &TimerFacade,
    ) -> TimerTransition {
        let Some(policy) = policy else {
            return TimerTransition::Unchanged;
        };

        let desired = match registry.active_provider() {
            Some(provider) if registry.game_on() => self.decide(policy, provider, igt, facade),
            _ => Some(false),
        };

        let transition = match desired {
            Some(run) => facade.ensure(run, policy.flushes_duration()),
            None => TimerTransition::Unchanged,
        };
        self.observation.running = facade.is_running();

        log::debug!(
            "Auto-timer {:?}: igt={} desired={:?} -> {:?}",
            policy,
            igt.as_sentinel(),
            desired,
            transition
        );
        transition
    }

    /// `Some(run)` when the policy has an opinion this tick
    fn decide(
        &mut self,
        policy: TimerPolicy,
        provider: &dyn CapabilityProvider,
        igt: Igt,
        facade: &TimerFacade,
    ) -> Option<bool> {
        match policy {
            TimerPolicy::TimeDriven { pause_on_frozen } => {
                let advancing = match igt {
                    Igt::Valid(ms) => !pause_on_frozen || ms != self.observation.last_observed_igt,
                    Igt::Unavailable => false,
                };
                let run = advancing && !facade.is_final_split();
                self.observe(igt);
                Some(run)
            }
            TimerPolicy::LoadingFlag { pause_while_loading } => {
                Some(provider.run_started() && !(pause_while_loading && provider.is_loading()))
            }
            TimerPolicy::EventDriven(EventTrigger::RunStartEdge) => {
                if !self.observation.run_start_latched && provider.is_in_game() {
                    self.observation.run_start_latched = true;
                    Some(true)
                } else {
                    None
                }
            }
            TimerPolicy::EventDriven(EventTrigger::ClockAdvance) => {
                let advancing = match igt {
                    Igt::Valid(ms) => ms != self.observation.last_observed_igt,
                    Igt::Unavailable => false,
                };
                let run = advancing && provider.is_in_game();
                self.observe(igt);
                Some(run)
            }
            TimerPolicy::EventDriven(EventTrigger::InGameSession { stop_on_level_complete }) => {
                Some(provider.is_in_game() && !(stop_on_level_complete && provider.is_complete()))
            }
        }
    }

    fn observe(&mut self, igt: Igt) {
        if let Igt::Valid(ms) = igt {
            self.observation.last_observed_igt = ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{GameSlot, TelemetryHandle, TelemetryProvider};
    use crate::host::testing::{HostCall, RecordingHost};
    use crate::host::TimerHost;
    use crate::igt::IgtAggregator;
    use std::sync::Arc;

    struct Rig {
        registry: ActiveGameRegistry,
        handle: TelemetryHandle,
        host: Arc<RecordingHost>,
        facade: TimerFacade,
        timer: AutoTimer,
        igt: IgtAggregator,
    }

    impl Rig {
        fn new(slot: GameSlot) -> Self {
            let (provider, handle) = TelemetryProvider::new(slot.supports_igt());
            handle.update(|s| s.attached = true);
            let mut registry = ActiveGameRegistry::new().with_provider(slot, provider);
            registry.set_active(slot);
            let host = Arc::new(RecordingHost::new());
            Self {
                registry,
                handle,
                facade: TimerFacade::new(host.clone()),
                host,
                timer: AutoTimer::new(),
                igt: IgtAggregator::new(),
            }
        }

        fn tick(&mut self, policy: TimerPolicy) -> bool {
            let igt = self.igt.current(&self.registry);
            self.timer.tick(Some(policy), &self.registry, igt, &self.facade);
            self.host.timer_running()
        }

        fn tick_igt(&mut self, policy: TimerPolicy, ms: i64) -> bool {
            self.handle.update(|s| s.in_game_time_ms = Some(ms));
            self.tick(policy)
        }
    }

    const FROZEN: TimerPolicy = TimerPolicy::TimeDriven { pause_on_frozen: true };

    #[test]
    fn test_time_driven_sequence() {
        let mut rig = Rig::new(GameSlot::Sekiro);
        let running: Vec<bool> = [-1, 100, 100, 250, -1]
            .into_iter()
            .map(|ms| rig.tick_igt(FROZEN, ms))
            .collect();
        assert_eq!(running, vec![false, true, false, true, false]);
        assert_eq!(rig.timer.observation().last_observed_igt, 250);
    }

    #[test]
    fn test_time_driven_first_valid_value() {
        let mut rig = Rig::new(GameSlot::Sekiro);
        let running: Vec<bool> = [0, 5, 5, 12, 12, -1]
            .into_iter()
            .map(|ms| rig.tick_igt(FROZEN, ms))
            .collect();
        assert_eq!(running, vec![false, true, false, true, false, false]);
    }

    #[test]
    fn test_time_driven_brackets_duration() {
        let mut rig = Rig::new(GameSlot::EldenRing);
        rig.tick_igt(FROZEN, 100);
        rig.tick_igt(FROZEN, 100);
        assert_eq!(
            rig.host.calls(),
            vec![
                HostCall::UpdateDuration,
                HostCall::StartStop(true),
                HostCall::UpdateDuration,
                HostCall::UpdateDuration,
                HostCall::StartStop(false),
                HostCall::UpdateDuration,
            ]
        );
    }

    #[test]
    fn test_final_split_forces_stop() {
        let mut rig = Rig::new(GameSlot::Sekiro);
        assert!(rig.tick_igt(FROZEN, 100));
        rig.host.set_final_split(true);
        assert!(!rig.tick_igt(FROZEN, 200));
        assert!(!rig.tick_igt(FROZEN, 300));
    }

    #[test]
    fn test_real_time_ignores_frozen_clock() {
        let policy = TimerPolicy::TimeDriven { pause_on_frozen: false };
        let mut rig = Rig::new(GameSlot::DarkSouls1);
        assert!(rig.tick_igt(policy, 100));
        assert!(rig.tick_igt(policy, 100));
        assert!(!rig.tick_igt(policy, -1));
        // No duration flushes for real-time timing
        assert_eq!(rig.host.count(|c| *c == HostCall::UpdateDuration), 0);
    }

    #[test]
    fn test_game_off_forces_stop() {
        let policy = TimerPolicy::LoadingFlag { pause_while_loading: false };
        let mut rig = Rig::new(GameSlot::DarkSouls2);
        rig.handle.update(|s| s.run_started = true);
        assert!(rig.tick(policy));

        rig.handle.update(|s| s.attached = false);
        assert!(!rig.tick(policy));
    }

    #[test]
    fn test_loading_flag_policy() {
        let policy = TimerPolicy::LoadingFlag { pause_while_loading: true };
        let mut rig = Rig::new(GameSlot::Dishonored);
        assert!(!rig.tick(policy));

        rig.handle.update(|s| s.run_started = true);
        assert!(rig.tick(policy));

        rig.handle.update(|s| s.is_loading = true);
        assert!(!rig.tick(policy));

        rig.handle.update(|s| s.is_loading = false);
        assert!(rig.tick(policy));
    }

    #[test]
    fn test_loading_ignored_without_pause() {
        let policy = TimerPolicy::LoadingFlag { pause_while_loading: false };
        let mut rig = Rig::new(GameSlot::HollowKnight);
        rig.handle.update(|s| {
            s.run_started = true;
            s.is_loading = true;
        });
        assert!(rig.tick(policy));
    }

    #[test]
    fn test_run_start_edge_fires_once() {
        let policy = TimerPolicy::EventDriven(EventTrigger::RunStartEdge);
        let mut rig = Rig::new(GameSlot::Celeste);
        assert!(!rig.tick(policy));

        rig.handle.update(|s| s.in_game = true);
        assert!(rig.tick(policy));
        assert!(rig.timer.observation().run_start_latched);

        // A manual stop is left alone while the latch holds
        rig.host.set_running(false);
        assert!(!rig.tick(policy));
        assert_eq!(rig.host.count(|c| *c == HostCall::StartStop(true)), 1);

        rig.timer.clear_run_start();
        assert!(rig.tick(policy));
    }

    #[test]
    fn test_clock_advance_requires_in_game() {
        let policy = TimerPolicy::EventDriven(EventTrigger::ClockAdvance);
        let mut rig = Rig::new(GameSlot::Celeste);
        assert!(!rig.tick_igt(policy, 100));

        rig.handle.update(|s| s.in_game = true);
        assert!(rig.tick_igt(policy, 200));
        assert!(!rig.tick_igt(policy, 200));
        assert!(rig.tick_igt(policy, 300));
    }

    #[test]
    fn test_in_game_session() {
        let policy = TimerPolicy::EventDriven(EventTrigger::InGameSession {
            stop_on_level_complete: true,
        });
        let mut rig = Rig::new(GameSlot::Cuphead);
        rig.handle.update(|s| s.in_game = true);
        assert!(rig.tick(policy));

        rig.handle.update(|s| s.is_complete = true);
        assert!(!rig.tick(policy));

        rig.handle.update(|s| s.is_complete = false);
        assert!(rig.tick(policy));
    }

    #[test]
    fn test_no_policy_is_idle() {
        let mut rig = Rig::new(GameSlot::Sekiro);
        rig.host.set_running(true);
        rig.handle.update(|s| s.attached = false);
        let igt = rig.igt.current(&rig.registry);
        rig.timer.tick(None, &rig.registry, igt, &rig.facade);
        assert!(rig.host.timer_running());
        assert!(rig.host.calls().is_empty());
    }

    #[test]
    fn test_reports_game_time() {
        assert!(FROZEN.reports_game_time());
        assert!(!TimerPolicy::TimeDriven { pause_on_frozen: false }.reports_game_time());
        assert!(TimerPolicy::EventDriven(EventTrigger::ClockAdvance).reports_game_time());
        assert!(!TimerPolicy::LoadingFlag { pause_while_loading: true }.reports_game_time());
    }
}
