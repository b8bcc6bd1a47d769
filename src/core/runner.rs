//! Background tick runner
//!
//! Drives an [`Autosplitter`] from a worker thread: the fast tick drains
//! splits, the slow tick runs the auto-timer and auto-reset engines.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::autosplitter::Autosplitter;
use crate::config::TimingConfig;
use crate::{AutosplitterError, Result};

/// Which ticks are due at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueTicks {
    pub fast: bool,
    pub slow: bool,
}

impl DueTicks {
    pub fn any(&self) -> bool {
        self.fast || self.slow
    }
}

/// Fixed-rate schedule for the two ticks
#[derive(Debug, Clone)]
pub struct TickSchedule {
    fast: Duration,
    slow: Duration,
    next_fast: Option<Instant>,
    next_slow: Option<Instant>,
}

impl TickSchedule {
    pub fn new(fast: Duration, slow: Duration) -> Self {
        Self {
            fast,
            slow,
            next_fast: None,
            next_slow: None,
        }
    }

    pub fn from_config(timing: &TimingConfig) -> Self {
        Self::new(timing.fast_tick(), timing.slow_tick())
    }

    /// Ticks due at `now`. Both are due on the first poll; missed periods
    /// are skipped rather than replayed.
    pub fn poll(&mut self, now: Instant) -> DueTicks {
        DueTicks {
            fast: Self::advance(&mut self.next_fast, self.fast, now),
            slow: Self::advance(&mut self.next_slow, self.slow, now),
        }
    }

    fn advance(next: &mut Option<Instant>, period: Duration, now: Instant) -> bool {
        match *next {
            Some(deadline) if now < deadline => false,
            Some(deadline) => {
                let following = deadline + period;
                *next = Some(if following <= now { now + period } else { following });
                true
            }
            None => {
                *next = Some(now + period);
                true
            }
        }
    }

    /// Earliest upcoming deadline, `None` before the first poll
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.next_fast, self.next_slow) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Runs the ticks of a shared [`Autosplitter`] on a worker thread
pub struct TickRunner {
    autosplitter: Arc<Mutex<Autosplitter>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl TickRunner {
    pub fn new(autosplitter: Autosplitter) -> Self {
        Self {
            autosplitter: Arc::new(Mutex::new(autosplitter)),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Shared engine, for host calls made while the runner is active
    pub fn autosplitter(&self) -> Arc<Mutex<Autosplitter>> {
        self.autosplitter.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start ticking
    pub fn start(&mut self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(AutosplitterError::AlreadyRunning);
        }

        let schedule = TickSchedule::from_config(&self.autosplitter.lock().config().timing);
        let running = self.running.clone();
        let autosplitter = self.autosplitter.clone();

        let handle = thread::Builder::new()
            .name("autotimer-ticks".to_string())
            .spawn(move || run_tick_loop(running, autosplitter, schedule))
            .map_err(|source| {
                self.running.store(false, Ordering::SeqCst);
                AutosplitterError::Spawn { source }
            })?;

        self.worker = Some(handle);
        log::info!("Tick runner started");
        Ok(())
    }

    /// Stop both ticks and wait for the worker to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("Tick runner thread panicked");
            }
            log::info!("Tick runner stopped");
        }
    }
}

impl Drop for TickRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_tick_loop(running: Arc<AtomicBool>, autosplitter: Arc<Mutex<Autosplitter>>, mut schedule: TickSchedule) {
    // Upper bound on one sleep so stop() is honoured promptly
    const MAX_SLEEP: Duration = Duration::from_millis(50);

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        let due = schedule.poll(now);

        if due.any() {
            let mut engine = autosplitter.lock();
            if due.fast {
                engine.tick_fast();
            }
            if due.slow {
                engine.tick_slow();
            }
        }

        let wait = schedule
            .next_deadline()
            .map_or(MAX_SLEEP, |deadline| deadline.saturating_duration_since(Instant::now()));
        thread::sleep(wait.min(MAX_SLEEP));
    }
}
