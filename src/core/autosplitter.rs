//! The engine host-facing object
//!
//! `Autosplitter` owns one of everything: the provider registry, the IGT
//! aggregator, both tick engines and the dispatch gates. The host drives it
//! through `tick_fast` / `tick_slow` (directly or via a `TickRunner`) and
//! forwards its own game selection and mode toggles to it.

use std::sync::Arc;
use std::time::Instant;

use super::events::SignalCallback;
use super::state::{EngineSnapshot, GateSnapshot};
use crate::config::AutosplitterConfig;
use crate::engines::{
    AutoResetWatchdog, AutoTimer, DispatchGates, ResetOutcome, ResetSwitches, SignalKind, SignalSender,
    SignalStatus, TimerPolicy,
};
use crate::games::{ActiveGameRegistry, GameSlot};
use crate::host::{SharedHost, TimerFacade, TimerTransition};
use crate::igt::{Igt, IgtAggregator};
use crate::{AutosplitterError, Result};

/// What a slow tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlowTickReport {
    pub igt: Igt,
    pub timer: TimerTransition,
    pub reset: ResetOutcome,
}

/// Auto-timer, auto-reset and dispatch for one host
pub struct Autosplitter {
    config: AutosplitterConfig,
    registry: ActiveGameRegistry,
    igt: IgtAggregator,
    facade: TimerFacade,
    auto_timer: AutoTimer,
    watchdog: AutoResetWatchdog,
    gates: Arc<DispatchGates>,
    settings_open: bool,
}

impl Autosplitter {
    /// Build the engine. Any providers already enabled are resolved to a
    /// single active game by precedence; with none enabled the host's game
    /// selector decides.
    pub fn new(config: AutosplitterConfig, registry: ActiveGameRegistry, host: SharedHost) -> Self {
        let gates = Arc::new(DispatchGates::new(host.clone(), config.timing.split_cooldown()));
        gates.set_debug(config.debug_mode);
        gates.set_way_mode(config.hit_mode.is_way());

        let mut autosplitter = Self {
            watchdog: AutoResetWatchdog::new(config.timing.reset_threshold_ms),
            config,
            registry,
            igt: IgtAggregator::new(),
            facade: TimerFacade::new(host),
            auto_timer: AutoTimer::new(),
            gates,
            settings_open: false,
        };

        let initial = match autosplitter.registry.resolve_enabled() {
            GameSlot::None => autosplitter.host_selection(),
            slot => slot,
        };
        autosplitter.set_active_game(initial);
        autosplitter
    }

    // =========================================================================
    // Ticks
    // =========================================================================

    /// Drain accepted splits to the host
    pub fn tick_fast(&mut self) -> u32 {
        if !self.gates.is_checking() {
            return 0;
        }
        self.gates.drain_splits()
    }

    /// Run the auto-timer, then the auto-reset watchdog
    pub fn tick_slow(&mut self) -> SlowTickReport {
        let igt = self.igt.current(&self.registry);
        let policy = self.timer_policy();
        let timer = self.auto_timer.tick(policy, &self.registry, igt, &self.facade);

        let switches = ResetSwitches {
            auto_reset: self.config.auto_reset_split,
            practice_mode: self.config.practice_mode,
            debug_mode: self.config.debug_mode,
        };
        let reset = self.watchdog.tick(switches, &mut self.registry, igt, &self.facade);
        if reset == ResetOutcome::Fired {
            self.auto_timer.clear_run_start();
        }

        SlowTickReport { igt, timer, reset }
    }

    /// Policy of the active game this tick, `None` when idle
    fn timer_policy(&self) -> Option<TimerPolicy> {
        if self.config.practice_mode {
            return None;
        }
        let slot = self.registry.active();
        slot.timer_policy(self.config.games.get(slot))
    }

    // =========================================================================
    // Game selection
    // =========================================================================

    /// Engage a game (host-initiated). Switching games resets the timer
    /// observation and the reset latch.
    pub fn set_active_game(&mut self, slot: GameSlot) {
        if self.registry.set_active(slot) {
            self.auto_timer.reset();
            self.watchdog.reset();
            self.igt.reset();
        }
        self.update_checking();
    }

    /// Engage a game by host selector index. Unknown indices disengage
    /// every game.
    pub fn set_active_game_index(&mut self, index: i32) -> Result<()> {
        match GameSlot::from_index(index) {
            Some(slot) => {
                self.set_active_game(slot);
                Ok(())
            }
            None => {
                log::warn!("Unknown game index {}, disabling all splitters", index);
                self.set_active_game(GameSlot::None);
                Err(AutosplitterError::UnknownGameIndex(index))
            }
        }
    }

    /// Slot currently picked in the host's game selector
    fn host_selection(&self) -> GameSlot {
        let index = self.facade.host().active_game_index();
        GameSlot::from_index(index).unwrap_or_else(|| {
            log::warn!("Host selector holds unknown game index {}", index);
            GameSlot::None
        })
    }

    /// Engage a game from the engine side and mirror it on the host selector
    pub fn select_game(&mut self, slot: GameSlot) {
        self.set_active_game(slot);
        self.facade.host().set_active_game_index(slot.index());
    }

    pub fn active_game(&self) -> GameSlot {
        self.registry.active()
    }

    /// Whether the active game's session is live
    pub fn game_on(&self) -> bool {
        self.registry.game_on()
    }

    pub fn registry(&self) -> &ActiveGameRegistry {
        &self.registry
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Feed a raw split or hit signal through its gate
    pub fn signal(&self, kind: SignalKind, message: &str) -> SignalStatus {
        self.gates.signal(kind, message)
    }

    pub fn signal_at(&self, kind: SignalKind, message: &str, now: Instant) -> SignalStatus {
        self.gates.signal_at(kind, message, now)
    }

    /// Handle for probes raising signals from other threads
    pub fn signal_sender(&self) -> SignalSender {
        SignalSender::new(self.gates.clone())
    }

    /// Observe every raw signal
    pub fn on_signal(&self, callback: SignalCallback) {
        self.gates.on_signal(callback);
    }

    /// Whether the last split signal was accepted
    pub fn split_status(&self) -> bool {
        self.gates.gate(SignalKind::Split).status() == SignalStatus::Accepted
    }

    // =========================================================================
    // Host callbacks
    // =========================================================================

    /// In-game time for the host display, when the active game times by it
    pub fn current_in_game_time(&mut self) -> Option<i64> {
        let reports = self.timer_policy().is_some_and(|p| p.reports_game_time());
        if !reports {
            return None;
        }
        self.igt.current(&self.registry).millis()
    }

    /// Clear split progress on every game (host-initiated reset)
    pub fn reset_splitter_flags(&mut self) {
        self.registry.reset_split_flags();
        self.auto_timer.clear_run_start();
    }

    /// Run-start event raised by a script-driven game
    pub fn on_run_start(&self) {
        if self.config.debug_mode {
            log::info!("Run start ignored in debug mode");
            return;
        }
        if self.config.practice_mode || self.active_game() == GameSlot::None {
            return;
        }
        // Games timing by their own clock start through the auto-timer
        if self.timer_policy().is_some_and(|p| p.reports_game_time()) {
            return;
        }
        self.facade.ensure(true, false);
    }

    /// Run-reset event raised by a script-driven game
    pub fn on_run_reset(&self) {
        if self.config.debug_mode {
            log::info!("Run reset ignored in debug mode");
            return;
        }
        if self.config.practice_mode || self.active_game() == GameSlot::None {
            return;
        }
        self.facade.profile_reset();
    }

    // =========================================================================
    // Modes
    // =========================================================================

    pub fn set_practice_mode(&mut self, enabled: bool) {
        if self.config.practice_mode != enabled {
            log::info!("Practice mode {}", if enabled { "on" } else { "off" });
        }
        self.config.practice_mode = enabled;
        self.update_checking();
    }

    pub fn practice_mode(&self) -> bool {
        self.config.practice_mode
    }

    /// Suspend dispatch while the settings dialog is open
    pub fn set_settings_open(&mut self, open: bool) {
        self.settings_open = open;
        self.update_checking();
    }

    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.config.debug_mode = enabled;
        self.gates.set_debug(enabled);
    }

    pub fn set_auto_reset(&mut self, enabled: bool) {
        self.config.auto_reset_split = enabled;
    }

    pub fn config(&self) -> &AutosplitterConfig {
        &self.config
    }

    fn update_checking(&self) {
        let checking =
            self.registry.active() != GameSlot::None && !self.config.practice_mode && !self.settings_open;
        self.gates.set_checking(checking);
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub fn snapshot(&self) -> EngineSnapshot {
        let gate = |kind| {
            let gate = self.gates.gate(kind);
            GateSnapshot {
                status: gate.status(),
                pending: gate.is_pending(),
                stats: gate.stats(),
            }
        };

        // Read-only view: a fresh aggregator so snapshots never touch log state
        let igt = IgtAggregator::new().current(&self.registry);

        EngineSnapshot {
            active_game: self.registry.active(),
            game_on: self.registry.game_on(),
            practice_mode: self.config.practice_mode,
            debug_mode: self.config.debug_mode,
            auto_reset_split: self.config.auto_reset_split,
            checking: self.gates.is_checking(),
            in_game_time_ms: igt.as_sentinel(),
            timer: *self.auto_timer.observation(),
            reset_latch: *self.watchdog.latch(),
            split: gate(SignalKind::Split),
            hit: gate(SignalKind::Hit),
        }
    }

    pub fn snapshot_json(&self) -> Result<String> {
        serde_json::to_string(&self.snapshot()).map_err(|source| AutosplitterError::Snapshot { source })
    }
}
