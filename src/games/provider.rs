//! Capability provider trait
//!
//! A provider is the per-game telemetry source: it owns the memory probes
//! (out of scope here) and exposes what the engines need to decide timer,
//! reset and split actions. Engines only ever read from a provider, except
//! for toggling it on or off and clearing its split progress.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 3D position in game space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Axis-aligned box on the X/Y plane with exclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub const fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self { min_x, max_x, min_y, max_y }
    }

    /// Whether the position lies strictly inside the box. Z is ignored.
    pub fn contains(&self, pos: &Position3D) -> bool {
        pos.x > self.min_x && pos.x < self.max_x && pos.y > self.min_y && pos.y < self.max_y
    }
}

/// Why a provider could not report its in-game time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("in-game time is not supported by this provider")]
    Unsupported,
    #[error("game process is not attached")]
    Detached,
    #[error("memory read failed: {0}")]
    Read(String),
}

/// Per-game telemetry source consumed by the engines
///
/// Only `enabled`, `set_enabled`, `is_attached` and `reset_split_flags` are
/// required; the remaining capabilities default to "not available".
pub trait CapabilityProvider: Send {
    /// Whether splitting is enabled for this game
    fn enabled(&self) -> bool;

    /// Enable or disable splitting for this game
    fn set_enabled(&mut self, enabled: bool);

    /// Whether the game process is attached and its session is live
    fn is_attached(&self) -> bool;

    /// Clear split progress so already-split events can fire again
    fn reset_split_flags(&mut self);

    /// In-game time in milliseconds
    fn in_game_time(&self) -> Result<i64, ProbeError> {
        Err(ProbeError::Unsupported)
    }

    /// Whether the game is on a loading screen
    fn is_loading(&self) -> bool {
        false
    }

    /// Latch set by the provider once gameplay input of a run began
    fn run_started(&self) -> bool {
        false
    }

    /// Whether the player is in gameplay (not in menus)
    fn is_in_game(&self) -> bool {
        false
    }

    /// Whether the current level has just been completed
    fn is_complete(&self) -> bool {
        false
    }

    /// Player position, if the provider tracks it
    fn position(&self) -> Option<Position3D> {
        None
    }

    /// Whether the provider detected a new game being started
    fn is_new_game(&self) -> bool {
        false
    }
}

/// Boxed provider that can be stored in the registry
pub type BoxedProvider = Box<dyn CapabilityProvider>;
