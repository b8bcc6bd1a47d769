//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use nyacore_autotimer::games::{ActiveGameRegistry, GameSlot, TelemetryHandle, TelemetryProvider};
use nyacore_autotimer::{Autosplitter, AutosplitterConfig, TimerHost};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    StartStop(bool),
    UpdateDuration,
    ProfileReset,
    SplitGo(u32),
    HitGo(u32, bool),
    SetIndex(i32),
}

#[derive(Debug, Default)]
struct HostState {
    running: bool,
    final_split: bool,
    index: i32,
    calls: Vec<HostCall>,
}

/// Host that records every call made by the engine
#[derive(Debug, Default)]
pub struct RecordingHost {
    state: Mutex<HostState>,
}

impl RecordingHost {
    /// Host whose game selector already points at `index`
    pub fn with_index(index: i32) -> Self {
        let host = Self::default();
        host.state.lock().index = index;
        host
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, call: HostCall) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == call).count()
    }

    pub fn splits(&self) -> u32 {
        self.state
            .lock()
            .calls
            .iter()
            .map(|c| if let HostCall::SplitGo(n) = c { *n } else { 0 })
            .sum()
    }

    pub fn set_final_split(&self, final_split: bool) {
        self.state.lock().final_split = final_split;
    }

    pub fn set_running(&self, running: bool) {
        self.state.lock().running = running;
    }

    pub fn index(&self) -> i32 {
        self.state.lock().index
    }
}

impl TimerHost for RecordingHost {
    fn start_stop_timer(&self, start: bool) {
        let mut s = self.state.lock();
        s.running = start;
        s.calls.push(HostCall::StartStop(start));
    }

    fn update_duration(&self) {
        self.state.lock().calls.push(HostCall::UpdateDuration);
    }

    fn profile_reset(&self) {
        let mut s = self.state.lock();
        s.running = false;
        s.calls.push(HostCall::ProfileReset);
    }

    fn profile_split_go(&self, count: u32) {
        self.state.lock().calls.push(HostCall::SplitGo(count));
    }

    fn profile_hit_go(&self, count: u32, way_mode: bool) {
        self.state.lock().calls.push(HostCall::HitGo(count, way_mode));
    }

    fn current_final_split(&self) -> bool {
        self.state.lock().final_split
    }

    fn timer_running(&self) -> bool {
        self.state.lock().running
    }

    fn active_game_index(&self) -> i32 {
        self.state.lock().index
    }

    fn set_active_game_index(&self, index: i32) {
        let mut s = self.state.lock();
        s.index = index;
        s.calls.push(HostCall::SetIndex(index));
    }
}

/// Engine with a telemetry provider for every game
pub struct Fixture {
    pub autosplitter: Autosplitter,
    pub host: Arc<RecordingHost>,
    handles: Vec<(GameSlot, TelemetryHandle)>,
}

impl Fixture {
    pub fn new(config: AutosplitterConfig) -> Self {
        Self::with_enabled(config, &[])
    }

    /// Build with some providers already reporting enabled
    pub fn with_enabled(config: AutosplitterConfig, enabled: &[GameSlot]) -> Self {
        Self::build(config, enabled, RecordingHost::default())
    }

    pub fn build(config: AutosplitterConfig, enabled: &[GameSlot], host: RecordingHost) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut registry = ActiveGameRegistry::new();
        let mut handles = Vec::new();
        for slot in GameSlot::GAMES {
            let (provider, handle) = TelemetryProvider::new(slot.supports_igt());
            handle.update(|s| s.enabled = enabled.contains(&slot));
            registry.register(slot, Box::new(provider));
            handles.push((slot, handle));
        }

        let host = Arc::new(host);
        let autosplitter = Autosplitter::new(config, registry, host.clone());
        Self {
            autosplitter,
            host,
            handles,
        }
    }

    pub fn handle(&self, slot: GameSlot) -> &TelemetryHandle {
        self.handles
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, h)| h)
            .expect("every game has a handle")
    }

    /// Activate a game whose process is attached
    pub fn attach(&mut self, slot: GameSlot) -> &TelemetryHandle {
        self.autosplitter.set_active_game(slot);
        self.handle(slot).update(|s| s.attached = true);
        self.handle(slot)
    }

    pub fn set_igt(&self, slot: GameSlot, ms: i64) {
        self.handle(slot).update(|s| s.in_game_time_ms = Some(ms));
    }
}

pub fn config_with(slot: GameSlot, auto_timer: bool, game_timer: bool) -> AutosplitterConfig {
    let mut config = AutosplitterConfig::default();
    if let Some(settings) = config.games.get_mut(slot) {
        settings.auto_timer = auto_timer;
        settings.game_timer = game_timer;
    }
    config
}
