//! Timer state structure and management

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::utils::minutes_to_duration;

/// Coordinator-side view of the reminder timer.
///
/// `active` is true exactly when `next_fire_at` is set, and `period_minutes`
/// is always positive. The fields are a cache of the wake-up schedule and may
/// be rebuilt from it at any time.
#[derive(Debug, Clone)]
pub struct TimerState {
    active: bool,
    period_minutes: f64,
    next_fire_at: Option<Instant>,
}

impl TimerState {
    /// Create an inactive timer with the given default period
    pub fn new(default_period_minutes: f64) -> Self {
        Self {
            active: false,
            period_minutes: default_period_minutes,
            next_fire_at: None,
        }
    }

    /// Mark the timer running with a new period, first firing one period from `now`
    pub fn start(&mut self, period_minutes: f64, now: Instant) {
        self.period_minutes = period_minutes;
        self.arm(now + minutes_to_duration(period_minutes));
    }

    /// Delay the next fire by `minutes` while keeping the configured period
    pub fn snooze(&mut self, minutes: f64, now: Instant) {
        self.arm(now + minutes_to_duration(minutes));
    }

    /// Point the next fire at an explicit instant and mark the timer running
    pub fn arm(&mut self, next_fire_at: Instant) {
        self.active = true;
        self.next_fire_at = Some(next_fire_at);
    }

    /// Recompute the next fire one period after `now`; no-op when inactive.
    ///
    /// Returns the new fire time, if any.
    pub fn reschedule_from(&mut self, now: Instant) -> Option<Instant> {
        if self.active {
            self.next_fire_at = Some(now + self.period());
        }
        self.next_fire_at
    }

    /// Adopt the period reported by the wake-up schedule
    pub fn resync(&mut self, period_minutes: f64, next_fire_at: Instant) {
        self.period_minutes = period_minutes;
        self.arm(next_fire_at);
    }

    /// Clear the timer
    pub fn stop(&mut self) {
        self.active = false;
        self.next_fire_at = None;
    }

    /// Check if the timer is active
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn period_minutes(&self) -> f64 {
        self.period_minutes
    }

    pub fn period(&self) -> Duration {
        minutes_to_duration(self.period_minutes)
    }

    pub fn next_fire_at(&self) -> Option<Instant> {
        self.next_fire_at
    }

    /// Whole seconds until the next fire, if the timer is active
    pub fn seconds_left(&self, now: Instant) -> Option<u64> {
        self.next_fire_at.map(|at| seconds_until(at, now))
    }
}

/// Point-in-time copy of the timer for status reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub active: bool,
    pub period_minutes: f64,
    pub seconds_left: Option<u64>,
    pub next_fire_at: Option<DateTime<Utc>>,
}

impl TimerState {
    pub fn snapshot(&self, now: Instant) -> TimerSnapshot {
        let next_fire_at = self.next_fire_at
            .and_then(|at| chrono::Duration::from_std(at.saturating_duration_since(now)).ok())
            .map(|remaining| Utc::now() + remaining);

        TimerSnapshot {
            active: self.active,
            period_minutes: self.period_minutes,
            seconds_left: self.seconds_left(now),
            next_fire_at,
        }
    }
}

/// `max(0, floor((at - now) / 1s))`
pub fn seconds_until(at: Instant, now: Instant) -> u64 {
    at.saturating_duration_since(now).as_secs()
}
