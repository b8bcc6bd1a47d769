//! Split and hit dispatch gates
//!
//! Probes run on their own cadence and tend to report the same split or hit
//! several times in a row. Each gate turns that stream into at most one
//! host action per cool-down window. A gate remembers when it last accepted
//! a signal instead of sleeping, so no caller is ever blocked beyond the
//! gate's own short critical section.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::{EventHandler, SignalCallback, SignalEvent};
use crate::host::SharedHost;

/// Which gate a signal goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// Advance to the next split
    Split,
    /// Register a hit on the current split
    Hit,
}

/// Last observable result of a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalStatus {
    /// No signal seen yet
    #[default]
    Idle,
    /// Signal turned into a host action
    Accepted,
    /// Dispatch disabled (practice mode, settings open, no game)
    Rejected,
    /// Arrived within the cool-down of a previous accepted signal
    Coalesced,
}

/// Counters kept per gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStats {
    pub received: u64,
    pub accepted: u64,
}

#[derive(Debug, Default)]
struct GateState {
    /// Dispatch enabled; read and written only under the gate lock
    checking: bool,
    /// Accepted splits not yet drained to the host
    pending: u32,
    last_accepted: Option<Instant>,
    status: SignalStatus,
    stats: GateStats,
}

/// One debounced gate
#[derive(Debug)]
pub struct DispatchGate {
    kind: SignalKind,
    cooldown: Duration,
    state: Mutex<GateState>,
}

impl DispatchGate {
    pub fn new(kind: SignalKind, cooldown: Duration) -> Self {
        Self {
            kind,
            cooldown,
            state: Mutex::new(GateState::default()),
        }
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    /// Run a signal through the gate. `on_accept` executes inside the
    /// gate's critical section, only for accepted signals.
    fn signal_at(&self, now: Instant, on_accept: impl FnOnce(&mut u32)) -> SignalStatus {
        let mut state = self.state.lock();
        state.stats.received += 1;

        let status = if !state.checking {
            SignalStatus::Rejected
        } else if state
            .last_accepted
            .is_some_and(|last| now.saturating_duration_since(last) < self.cooldown)
        {
            SignalStatus::Coalesced
        } else {
            state.last_accepted = Some(now);
            state.stats.accepted += 1;
            on_accept(&mut state.pending);
            SignalStatus::Accepted
        };

        state.status = status;
        status
    }

    fn take_pending(&self) -> u32 {
        std::mem::take(&mut self.state.lock().pending)
    }

    /// Switch dispatch on or off. Disabling drops undrained signals in the
    /// same critical section, so nothing accepted earlier survives it.
    /// Returns how many were dropped.
    fn set_checking(&self, checking: bool) -> u32 {
        let mut state = self.state.lock();
        state.checking = checking;
        if checking {
            0
        } else {
            std::mem::take(&mut state.pending)
        }
    }

    pub fn is_checking(&self) -> bool {
        self.state.lock().checking
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().pending > 0
    }

    pub fn status(&self) -> SignalStatus {
        self.state.lock().status
    }

    pub fn stats(&self) -> GateStats {
        self.state.lock().stats
    }
}

/// Both gates plus the switches and host they forward to
pub struct DispatchGates {
    split: DispatchGate,
    hit: DispatchGate,
    debug: AtomicBool,
    way_mode: AtomicBool,
    host: SharedHost,
    events: Mutex<EventHandler>,
}

impl DispatchGates {
    /// Create gates forwarding to `host`. Checking starts disabled.
    pub fn new(host: SharedHost, cooldown: Duration) -> Self {
        Self {
            split: DispatchGate::new(SignalKind::Split, cooldown),
            hit: DispatchGate::new(SignalKind::Hit, cooldown),
            debug: AtomicBool::new(false),
            way_mode: AtomicBool::new(false),
            host,
            events: Mutex::new(EventHandler::new()),
        }
    }

    pub fn gate(&self, kind: SignalKind) -> &DispatchGate {
        match kind {
            SignalKind::Split => &self.split,
            SignalKind::Hit => &self.hit,
        }
    }

    /// Handle a raw signal now
    pub fn signal(&self, kind: SignalKind, message: &str) -> SignalStatus {
        self.signal_at(kind, message, Instant::now())
    }

    /// Handle a raw signal observed at `now`
    pub fn signal_at(&self, kind: SignalKind, message: &str, now: Instant) -> SignalStatus {
        let debug = self.debug.load(Ordering::SeqCst);
        if debug {
            log::info!("{}", message);
        } else {
            log::debug!("{:?} signal: {}", kind, message);
        }

        let status = match kind {
            SignalKind::Split => self.split.signal_at(now, |pending| *pending += 1),
            SignalKind::Hit => self.hit.signal_at(now, |_| {
                if !debug {
                    self.host.profile_hit_go(1, self.way_mode.load(Ordering::SeqCst));
                }
            }),
        };

        if status == SignalStatus::Coalesced {
            log::debug!("{:?} signal coalesced: {}", kind, message);
        }

        // Released before running observers so they may signal again
        let listeners = self.events.lock().listeners();
        if !listeners.is_empty() {
            let event = SignalEvent::new(kind, message, status, now);
            for listener in &listeners {
                listener(event.clone());
            }
        }
        status
    }

    /// Forward accepted splits to the host. Returns how many were drained.
    pub fn drain_splits(&self) -> u32 {
        let count = self.split.take_pending();
        if count > 0 {
            if self.debug.load(Ordering::SeqCst) {
                log::info!("Debug mode: dropping {} split(s)", count);
            } else {
                log::info!("Split");
                self.host.profile_split_go(count);
            }
        }
        count
    }

    /// Enable or disable dispatch. Disabling drops undrained splits.
    pub fn set_checking(&self, checking: bool) {
        let dropped = self.split.set_checking(checking);
        self.hit.set_checking(checking);
        if dropped > 0 {
            log::debug!("Dropped {} pending split(s) while disabling dispatch", dropped);
        }
    }

    pub fn is_checking(&self) -> bool {
        self.split.is_checking()
    }

    pub fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::SeqCst);
    }

    pub fn set_way_mode(&self, way_mode: bool) {
        self.way_mode.store(way_mode, Ordering::SeqCst);
    }

    /// Register an observer for every raw signal. Observers run after the
    /// gate and handler locks are released and may raise further signals.
    pub fn on_signal(&self, callback: SignalCallback) {
        self.events.lock().on_signal(callback);
    }
}

/// Cloneable handle for probes that raise signals from their own threads
#[derive(Clone)]
pub struct SignalSender {
    gates: Arc<DispatchGates>,
}

impl SignalSender {
    pub fn new(gates: Arc<DispatchGates>) -> Self {
        Self { gates }
    }

    pub fn signal(&self, kind: SignalKind, message: &str) -> SignalStatus {
        self.gates.signal(kind, message)
    }

    pub fn split(&self, message: &str) -> SignalStatus {
        self.signal(SignalKind::Split, message)
    }

    pub fn hit(&self, message: &str) -> SignalStatus {
        self.signal(SignalKind::Hit, message)
    }
}
