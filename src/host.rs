//! Host timer and profile interface
//!
//! The host (the hit counter application) owns the run timer, the split
//! list and the profile. The engines reach it only through [`TimerHost`];
//! [`TimerFacade`] adds the transition filtering the auto-timer relies on.

use std::sync::Arc;

/// Primitives the host exposes to the engine
///
/// Methods take `&self` because split and hit signals may reach the host
/// from probe threads; implementations use interior mutability.
pub trait TimerHost: Send + Sync {
    /// Start (`true`) or stop (`false`) the run timer
    fn start_stop_timer(&self, start: bool);

    /// Flush the elapsed time into the host's displayed duration
    fn update_duration(&self);

    /// Reset to the first split, add an attempt, stop and reset the timer
    fn profile_reset(&self);

    /// Advance `count` splits
    fn profile_split_go(&self, count: u32);

    /// Register `count` hits, as way hits when `way_mode` is set
    fn profile_hit_go(&self, count: u32, way_mode: bool);

    /// Whether the active split is the last one
    fn current_final_split(&self) -> bool;

    /// Whether the run timer is running
    fn timer_running(&self) -> bool;

    /// Selected entry of the host's game selector
    fn active_game_index(&self) -> i32;

    fn set_active_game_index(&self, index: i32);
}

/// Shared host handle
pub type SharedHost = Arc<dyn TimerHost>;

/// Timer transitions issued by a facade call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTransition {
    Started,
    Stopped,
    /// Host already in the requested state, nothing sent
    Unchanged,
}

/// Filters timer calls so the host only sees real transitions
#[derive(Clone)]
pub struct TimerFacade {
    host: SharedHost,
}

impl TimerFacade {
    pub fn new(host: SharedHost) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &SharedHost {
        &self.host
    }

    pub fn is_running(&self) -> bool {
        self.host.timer_running()
    }

    pub fn is_final_split(&self) -> bool {
        self.host.current_final_split()
    }

    /// Bring the host timer into the requested state.
    ///
    /// With `flush_duration` the pending duration is pushed to the host both
    /// before and after the transition.
    pub fn ensure(&self, running: bool, flush_duration: bool) -> TimerTransition {
        if self.host.timer_running() == running {
            return TimerTransition::Unchanged;
        }

        if flush_duration {
            self.host.update_duration();
        }
        self.host.start_stop_timer(running);
        if flush_duration {
            self.host.update_duration();
        }

        if running {
            log::info!("Timer started");
            TimerTransition::Started
        } else {
            log::info!("Timer stopped");
            TimerTransition::Stopped
        }
    }

    pub fn profile_reset(&self) {
        self.host.profile_reset();
    }
}
