//! Per-channel countdown timer.
//!
//! A timer is an anchor instant plus an accumulated duration. The anchor is
//! set by the first [`Timer::add_interval`] call and never moves afterwards;
//! the duration only grows. All reads and the read-modify-write in
//! `add_interval` go through a single [`parking_lot::RwLock`].

use chrono::{DateTime, Local, TimeDelta, Utc};
use parking_lot::RwLock;

use crate::error::TimerError;

/// Display format for end times, e.g. `02 Jan 06 15:04 -0700`.
pub const END_TIME_FORMAT: &str = "%d %b %y %H:%M %z";

/// Copy of a timer's fields at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerState {
    /// When the countdown was started; `None` until the first `addtime`.
    pub start: Option<DateTime<Utc>>,
    /// Total time added so far.
    pub duration: TimeDelta,
}

impl TimerState {
    pub fn has_started(&self) -> bool {
        self.start.is_some()
    }

    /// `start + duration`.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.start?.checked_add_signed(self.duration)
    }

    /// Remaining time at `now`; negative once the countdown has run out.
    pub fn time_left_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        Some(self.end_time()? - now)
    }

    /// Time since the countdown started.
    pub fn up_for(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        Some(now - self.start?)
    }
}

/// Countdown owned by one channel.
#[derive(Debug, Default)]
pub struct Timer {
    state: RwLock<TimerState>,
}

impl Timer {
    /// Create an unstarted timer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_started(&self) -> bool {
        self.state.read().has_started()
    }

    pub fn snapshot(&self) -> TimerState {
        *self.state.read()
    }

    pub fn up_for(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.snapshot().up_for(now)
    }

    /// Remaining time against the wall clock.
    pub fn time_left(&self) -> Option<TimeDelta> {
        self.time_left_at(Utc::now())
    }

    pub fn time_left_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.snapshot().time_left_at(now)
    }

    #[cfg(test)]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.snapshot().end_time()
    }

    /// Add `count` intervals of `unit`, starting the countdown at `at` if it
    /// has not started yet.
    ///
    /// The started check, the start assignment and the addition happen under
    /// one write lock. On overflow the timer is left untouched.
    pub fn add_interval(
        &self,
        count: u32,
        unit: TimeDelta,
        at: DateTime<Utc>,
    ) -> Result<TimerState, TimerError> {
        let count = i32::try_from(count).map_err(|_| TimerError::Overflow)?;
        let added = unit.checked_mul(count).ok_or(TimerError::Overflow)?;

        let mut state = self.state.write();
        let start = state.start.unwrap_or(at);
        let duration = state
            .duration
            .checked_add(&added)
            .ok_or(TimerError::Overflow)?;
        start
            .checked_add_signed(duration)
            .ok_or(TimerError::Overflow)?;

        state.start = Some(start);
        state.duration = duration;
        Ok(*state)
    }
}

/// Format a duration truncated toward zero to whole seconds: `5m0s`,
/// `1h0m0s`, `59s`, `0s`, `-2m3s`.
pub fn format_duration(d: TimeDelta) -> String {
    let secs = d.num_seconds();
    if secs == 0 {
        return "0s".to_string();
    }

    let sign = if secs < 0 { "-" } else { "" };
    let total = secs.unsigned_abs();
    let (h, m, s) = (total / 3600, total % 3600 / 60, total % 60);

    if h > 0 {
        format!("{sign}{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{sign}{m}m{s}s")
    } else {
        format!("{sign}{s}s")
    }
}

/// Format an end time in the local zone with [`END_TIME_FORMAT`].
pub fn format_end_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(END_TIME_FORMAT).to_string()
}
