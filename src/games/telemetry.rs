//! Push-based provider
//!
//! `TelemetryProvider` is a `CapabilityProvider` whose state is written by
//! someone else: a memory-reading thread, a script engine or a host bridge
//! publishes the latest values through a [`TelemetryHandle`] and the engines
//! read them on their own tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::provider::{CapabilityProvider, Position3D, ProbeError};

/// Snapshot of everything a provider reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderState {
    pub enabled: bool,
    /// Process attached and session live
    pub attached: bool,
    /// `None` while the clock cannot be read
    pub in_game_time_ms: Option<i64>,
    pub is_loading: bool,
    pub run_started: bool,
    pub in_game: bool,
    pub is_complete: bool,
    pub position: Option<Position3D>,
    pub new_game: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<ProviderState>,
    /// Bumped every time the engine clears split progress
    reset_generation: AtomicU64,
}

/// Writer side of a [`TelemetryProvider`]
#[derive(Clone)]
pub struct TelemetryHandle {
    shared: Arc<Shared>,
}

impl TelemetryHandle {
    /// Mutate the published state
    pub fn update(&self, f: impl FnOnce(&mut ProviderState)) {
        let mut state = self.shared.state.lock();
        f(&mut *state);
    }

    /// Replace the published state, keeping the enabled flag owned by the engine
    pub fn publish(&self, mut state: ProviderState) {
        let mut current = self.shared.state.lock();
        state.enabled = current.enabled;
        *current = state;
    }

    /// Copy of the current state
    pub fn state(&self) -> ProviderState {
        self.shared.state.lock().clone()
    }

    /// Number of split-progress resets requested so far.
    ///
    /// Probes compare this against the value they last saw to know when to
    /// forget which splits they already reported.
    pub fn reset_generation(&self) -> u64 {
        self.shared.reset_generation.load(Ordering::SeqCst)
    }
}

/// Provider backed by published telemetry
pub struct TelemetryProvider {
    shared: Arc<Shared>,
    supports_igt: bool,
}

impl TelemetryProvider {
    /// Create a provider and its writer handle
    pub fn new(supports_igt: bool) -> (Self, TelemetryHandle) {
        let shared = Arc::new(Shared::default());
        let provider = Self {
            shared: shared.clone(),
            supports_igt,
        };
        (provider, TelemetryHandle { shared })
    }
}

impl CapabilityProvider for TelemetryProvider {
    fn enabled(&self) -> bool {
        self.shared.state.lock().enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.shared.state.lock().enabled = enabled;
    }

    fn is_attached(&self) -> bool {
        self.shared.state.lock().attached
    }

    fn reset_split_flags(&mut self) {
        self.shared.reset_generation.fetch_add(1, Ordering::SeqCst);
    }

    fn in_game_time(&self) -> Result<i64, ProbeError> {
        if !self.supports_igt {
            return Err(ProbeError::Unsupported);
        }
        let state = self.shared.state.lock();
        if !state.attached {
            return Err(ProbeError::Detached);
        }
        state
            .in_game_time_ms
            .ok_or_else(|| ProbeError::Read("in-game time not published".to_string()))
    }

    fn is_loading(&self) -> bool {
        self.shared.state.lock().is_loading
    }

    fn run_started(&self) -> bool {
        self.shared.state.lock().run_started
    }

    fn is_in_game(&self) -> bool {
        self.shared.state.lock().in_game
    }

    fn is_complete(&self) -> bool {
        self.shared.state.lock().is_complete
    }

    fn position(&self) -> Option<Position3D> {
        self.shared.state.lock().position
    }

    fn is_new_game(&self) -> bool {
        self.shared.state.lock().new_game
    }
}
