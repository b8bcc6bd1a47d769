//! Events emitted by the dispatch gates

use std::sync::Arc;
use std::time::Instant;

use crate::engines::{SignalKind, SignalStatus};

/// A raw split or hit signal and what the gate made of it
#[derive(Debug, Clone)]
pub struct SignalEvent {
    pub kind: SignalKind,
    /// Diagnostic message supplied by the probe
    pub message: String,
    pub status: SignalStatus,
    /// When the signal was observed
    pub timestamp: Instant,
}

impl SignalEvent {
    pub fn new(kind: SignalKind, message: impl Into<String>, status: SignalStatus, timestamp: Instant) -> Self {
        Self {
            kind,
            message: message.into(),
            status,
            timestamp,
        }
    }

    pub fn accepted(&self) -> bool {
        self.status == SignalStatus::Accepted
    }
}

/// Callback type for signal events
pub type SignalCallback = Box<dyn Fn(SignalEvent) + Send + Sync>;

/// Registered callback, shareable so it can run outside the handler's lock
pub type SharedCallback = Arc<dyn Fn(SignalEvent) + Send + Sync>;

/// Event handler that can have multiple listeners
pub struct EventHandler {
    callbacks: Vec<SharedCallback>,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Add a callback for signal events
    pub fn on_signal(&mut self, callback: SignalCallback) {
        self.callbacks.push(Arc::from(callback));
    }

    /// Copy of the registered callbacks
    pub fn listeners(&self) -> Vec<SharedCallback> {
        self.callbacks.clone()
    }

    /// Emit an event to all listeners
    pub fn emit(&self, event: SignalEvent) {
        for callback in &self.callbacks {
            callback(event.clone());
        }
    }

    /// Check if there are any listeners
    pub fn has_listeners(&self) -> bool {
        !self.callbacks.is_empty()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
