//! Decision engines
//!
//! - **Auto-timer**: starts and stops the host timer on the slow tick
//! - **Auto-reset**: resets the profile when a fresh run is detected
//! - **Dispatch**: debounced gates turning raw split/hit signals into host actions

pub mod auto_reset;
pub mod auto_timer;
pub mod dispatch;

pub use auto_reset::{AutoResetWatchdog, ResetOutcome, ResetPolicy, ResetSwitches};
pub use auto_timer::{AutoTimer, EventTrigger, TimerPolicy};
pub use dispatch::{DispatchGate, DispatchGates, GateStats, SignalKind, SignalSender, SignalStatus};
