//! Elapsed-time gates pacing the periodic activities of a main loop.
//!
//! A gate never resets itself: [`TimerGate::expired`] can be asked any number of
//! times and only [`TimerGate::reset`] (or [`TimerGate::fire`]) commits.

use embassy_time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerGate {
    last_fire: Instant,
    period: Duration,
}

impl TimerGate {
    /// Creates a gate that first expires `period` after `now`.
    #[must_use]
    pub const fn new(period: Duration, now: Instant) -> Self {
        Self {
            last_fire: now,
            period,
        }
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    #[must_use]
    pub const fn last_fire(&self) -> Instant {
        self.last_fire
    }

    /// Changes the period without touching the last fire time.
    pub const fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    /// Time since the last reset. A `now` before the last reset reads as zero.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_fire)
    }

    #[must_use]
    pub fn expired(&self, now: Instant) -> bool {
        self.elapsed(now) >= self.period
    }

    pub const fn reset(&mut self, now: Instant) {
        self.last_fire = now;
    }

    /// Resets the gate and returns `true` if it had expired.
    pub fn fire(&mut self, now: Instant) -> bool {
        let expired = self.expired(now);
        if expired {
            self.reset(now);
        }
        expired
    }
}
