//! Core engine abstractions
//!
//! This module contains the main types of the engine:
//! - `Autosplitter` - Owns the registry, engines and gates and exposes the ticks
//! - `TickRunner` - Drives the ticks from a worker thread
//! - `SignalEvent` - Events emitted for every raw split/hit signal
//! - `TimerObservation` / `ResetLatch` / `EngineSnapshot` - Engine state

mod autosplitter;
mod events;
mod runner;
mod state;

pub use autosplitter::{Autosplitter, SlowTickReport};
pub use events::{EventHandler, SharedCallback, SignalCallback, SignalEvent};
pub use runner::{DueTicks, TickRunner, TickSchedule};
pub use state::{EngineSnapshot, GateSnapshot, ResetLatch, TimerObservation};
