//! Free-running stopwatch, independent of code execution.
//!
//! The one-second tick is an owned [`Interval`] that exists only while the
//! stopwatch is running. Leaving `Running` drops it, so a cancelled tick can
//! never fire and there is never more than one tick source.

use crate::model::format_clock;
use std::time::Duration;
use tokio::time::{Instant, Interval};

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub elapsed_seconds: u64,
    pub running: bool,
}

#[derive(Debug)]
pub struct Stopwatch {
    phase: TimerPhase,
    elapsed: u64,
    ticker: Option<Interval>,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            phase: TimerPhase::Idle,
            elapsed: 0,
            ticker: None,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            elapsed_seconds: self.elapsed,
            running: self.phase == TimerPhase::Running,
        }
    }

    pub fn display(&self) -> String {
        format_clock(self.elapsed)
    }

    /// Idle/Paused -> Running, Running -> Paused (elapsed kept).
    ///
    /// Must be called inside a Tokio runtime: arming creates the interval.
    pub fn toggle(&mut self) {
        match self.phase {
            TimerPhase::Idle | TimerPhase::Paused => {
                let mut ticker = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                self.ticker = Some(ticker);
                self.phase = TimerPhase::Running;
            }
            TimerPhase::Running => {
                self.ticker = None;
                self.phase = TimerPhase::Paused;
            }
        }
        tracing::debug!("stopwatch -> {:?} at {}", self.phase, self.display());
    }

    /// Any state -> Idle with elapsed cleared.
    pub fn reset(&mut self) {
        self.ticker = None;
        self.phase = TimerPhase::Idle;
        self.elapsed = 0;
        tracing::debug!("stopwatch reset");
    }

    /// Wait for the next tick and count it. Pends forever when not running,
    /// which makes it safe to use as a `select!` branch. Cancel-safe.
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
                self.elapsed += 1;
            }
            None => futures::future::pending::<()>().await,
        }
    }
}
