//! Countdowns advanced by the owning tick loop.
//!
//! Nothing in the simulation registers callbacks. Periodic work (regen, AI
//! decisions, spawn attempts) owns a [`Countdown`] and asks it each tick
//! whether it fired; one-shot delays (weapon reload) use [`Cooldown`].

use serde::{Deserialize, Serialize};

/// Slack absorbing float drift when summing fixed timesteps.
const TIMER_EPSILON: f32 = 1e-5;

/// A repeating countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    period: f32,
    remaining: f32,
}

impl Countdown {
    /// Creates a countdown that first fires after one full period.
    #[must_use]
    pub const fn new(period: f32) -> Self {
        Self {
            period,
            remaining: period,
        }
    }

    /// The repeat period in seconds.
    #[must_use]
    pub const fn period(&self) -> f32 {
        self.period
    }

    /// Seconds until the next firing.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Advances by `dt`. Returns true if the countdown elapsed this tick.
    ///
    /// At most one firing is reported per call; overshoot carries into the
    /// next period.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        if self.remaining > TIMER_EPSILON {
            return false;
        }
        self.remaining += self.period;
        if self.remaining <= TIMER_EPSILON {
            self.remaining = self.period;
        }
        true
    }

    /// Restarts a full period.
    pub fn reset(&mut self) {
        self.remaining = self.period;
    }

    /// Changes the period and restarts.
    pub fn restart_with(&mut self, period: f32) {
        self.period = period;
        self.remaining = period;
    }
}

/// A one-shot delay, ready once it reaches zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    remaining: f32,
}

impl Cooldown {
    /// A cooldown that is ready immediately.
    #[must_use]
    pub const fn ready() -> Self {
        Self { remaining: 0.0 }
    }

    /// True once the delay has elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining <= TIMER_EPSILON
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    /// Starts a new delay of `seconds`.
    pub fn start(&mut self, seconds: f32) {
        self.remaining = seconds.max(0.0);
    }

    /// Advances by `dt`.
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    /// Makes the cooldown ready immediately.
    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }
}
