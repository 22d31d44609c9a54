//! Transition tick scheduling
//!
//! On the device, the transition engine is driven from the PWM timer
//! overflow interrupt through [`OverflowPrescaler`]. Hosts and RTOS
//! targets without that interrupt use [`TransitionTicker`], which paces
//! the same cadence from [`Instant`]s.

use embassy_time::{Duration, Instant};

use crate::color::RGB_MAX;

/// Reference system clock
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// PWM carrier frequency: one overflow per `RGB_MAX + 1` clocks (~976 Hz)
pub const PWM_CARRIER_HZ: u32 = SYSTEM_CLOCK_HZ / (RGB_MAX as u32 + 1);

/// PWM overflows per transition tick
pub const TRANSITION_PRESCALER: u8 = 10;

/// Period between transition ticks (~100 Hz)
pub const TRANSITION_PERIOD: Duration = Duration::from_micros(
    1_000_000 * TRANSITION_PRESCALER as u64 / PWM_CARRIER_HZ as u64,
);

/// Count-down divider from PWM overflows to transition ticks
#[derive(Debug, Clone)]
pub struct OverflowPrescaler {
    countdown: u8,
}

impl OverflowPrescaler {
    /// Create a prescaler at the start of a period
    pub const fn new() -> Self {
        Self {
            countdown: TRANSITION_PRESCALER,
        }
    }

    /// Record one PWM overflow
    ///
    /// Returns `true` on every `TRANSITION_PRESCALER`-th call.
    pub fn on_overflow(&mut self) -> bool {
        self.countdown -= 1;
        if self.countdown == 0 {
            self.countdown = TRANSITION_PRESCALER;
            return true;
        }
        false
    }
}

impl Default for OverflowPrescaler {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of polling the ticker
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// Whether a transition tick is due now
    pub due: bool,
    /// The deadline for the next tick
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero if behind schedule)
    pub sleep_duration: Duration,
}

/// Fixed-period ticker paced by the caller's clock
///
/// If the caller falls more than two periods behind, the backlog is
/// dropped instead of replayed as a burst of ticks.
#[derive(Debug, Clone)]
pub struct TransitionTicker {
    next_tick: Instant,
    period: Duration,
}

impl TransitionTicker {
    /// Create a ticker with the device cadence, first due at `start`
    pub fn new(start: Instant) -> Self {
        Self::with_period(start, TRANSITION_PERIOD)
    }

    /// Create a ticker with a custom `period`, first due at `start`
    pub fn with_period(start: Instant, period: Duration) -> Self {
        Self {
            next_tick: start,
            period,
        }
    }

    /// Check whether a tick is due at `now` and schedule the next one
    pub fn poll(&mut self, now: Instant) -> TickResult {
        if now.as_micros() > self.next_tick.as_micros() + 2 * self.period.as_micros() {
            self.next_tick = now;
        }

        let due = now >= self.next_tick;
        if due {
            self.next_tick += self.period;
        }

        let sleep_duration = if self.next_tick > now {
            self.next_tick - now
        } else {
            Duration::from_micros(0)
        };

        TickResult {
            due,
            next_deadline: self.next_tick,
            sleep_duration,
        }
    }

    /// Period between ticks
    pub fn period(&self) -> Duration {
        self.period
    }
}
