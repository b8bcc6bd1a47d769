//! NYA Core auto-timer
//!
//! Control logic that sits between per-game memory probes and a speedrun
//! hit counter: it starts and stops the run timer, resets the profile when
//! a fresh run begins and debounces split/hit signals before they reach the
//! host.
//!
//! The pieces:
//! - [`games`] - supported games, the `CapabilityProvider` trait and the
//!   registry keeping a single game active
//! - [`igt`] - in-game time resolution for the active game
//! - [`engines`] - auto-timer, auto-reset and dispatch gates
//! - [`host`] - the `TimerHost` interface the host application implements
//! - [`core`] - the `Autosplitter` tying everything together and its runner
//!
//! ```ignore
//! let registry = ActiveGameRegistry::new().with_provider(GameSlot::Sekiro, sekiro_probe);
//! let mut autosplitter = Autosplitter::new(config, registry, host);
//! autosplitter.set_active_game(GameSlot::Sekiro);
//!
//! let mut runner = TickRunner::new(autosplitter);
//! runner.start()?;
//! ```

pub mod config;
pub mod core;
pub mod engines;
pub mod games;
pub mod host;
pub mod igt;

// Re-export commonly used types
pub use self::config::{AutosplitterConfig, GameSettings, HitMode, TimingConfig};
pub use self::core::{Autosplitter, EngineSnapshot, SignalEvent, SlowTickReport, TickRunner};
pub use self::engines::{ResetOutcome, SignalKind, SignalSender, SignalStatus, TimerPolicy};
pub use self::games::{ActiveGameRegistry, CapabilityProvider, GameSlot, ProbeError, TelemetryProvider};
pub use self::host::{TimerHost, TimerTransition};
pub use self::igt::Igt;

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the engine's setup and host-facing calls
#[derive(Debug, Error)]
pub enum AutosplitterError {
    #[error("failed to read config file {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML")]
    ConfigParse {
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config TOML")]
    ConfigSerialize {
        #[source]
        source: toml::ser::Error,
    },

    #[error("failed to serialize engine snapshot")]
    Snapshot {
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown game index: {0}")]
    UnknownGameIndex(i32),

    #[error("tick runner already running")]
    AlreadyRunning,

    #[error("failed to spawn tick runner thread")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, AutosplitterError>;
