//! Bus timing derived from a free-running tick counter

use embassy_time::Duration;

/// Nominal length of the short phase of a bit cell
pub const SHORT_PULSE: Duration = Duration::from_micros(35);
/// Nominal length of the long phase of a bit cell
pub const LONG_PULSE: Duration = Duration::from_micros(65);
/// Nominal length of the attention pulse opening every command
pub const ATTENTION_PULSE: Duration = Duration::from_micros(570);
/// How long to wait for a device to answer a talk command
pub const RESPONSE_TIMEOUT: Duration = Duration::from_micros(250);

/// Reference counter: 16 MHz system clock divided by 64
pub const REFERENCE_TICK_HZ: u32 = 250_000;
/// Reference counter width (8 bits)
pub const REFERENCE_COUNTER_MASK: u32 = 0xFF;

/// Free-running hardware counter
///
/// The counter wraps at `MASK + 1`; all comparisons use modular
/// subtraction, so no measured interval may exceed `MASK` ticks.
pub trait TickCounter {
    /// Largest counter value (`2^width - 1`)
    const MASK: u32;

    /// Read the counter
    fn now(&mut self) -> u32;

    /// Ticks elapsed since `start`, modulo the counter width
    fn ticks_since(&mut self, start: u32) -> u32 {
        self.now().wrapping_sub(start) & Self::MASK
    }
}

/// Bus timing is not representable on the chosen counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    /// Short and long pulses collapse to the same tick count
    TooCoarse,
    /// A pulse or timeout is longer than the counter can measure
    CounterTooNarrow,
}

impl core::fmt::Display for TimingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimingError::TooCoarse => {
                write!(f, "tick rate too low to tell short from long pulses")
            }
            TimingError::CounterTooNarrow => {
                write!(f, "bus pulse exceeds the tick counter range")
            }
        }
    }
}

impl core::error::Error for TimingError {}

/// Pulse widths in counter ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdbTiming {
    pub short: u32,
    pub long: u32,
    pub attention: u32,
    pub timeout: u32,
}

#[allow(clippy::cast_possible_truncation)]
const fn to_ticks(duration: Duration, tick_hz: u32) -> u32 {
    (duration.as_micros() * tick_hz as u64 / 1_000_000) as u32
}

impl AdbTiming {
    /// Timing of the reference device
    pub const REFERENCE: Self = Self {
        short: to_ticks(SHORT_PULSE, REFERENCE_TICK_HZ),
        long: to_ticks(LONG_PULSE, REFERENCE_TICK_HZ),
        attention: to_ticks(ATTENTION_PULSE, REFERENCE_TICK_HZ),
        timeout: to_ticks(RESPONSE_TIMEOUT, REFERENCE_TICK_HZ),
    };

    /// Derive tick counts for a counter running at `tick_hz` with width `counter_mask`
    pub const fn from_tick_hz(tick_hz: u32, counter_mask: u32) -> Result<Self, TimingError> {
        let timing = Self {
            short: to_ticks(SHORT_PULSE, tick_hz),
            long: to_ticks(LONG_PULSE, tick_hz),
            attention: to_ticks(ATTENTION_PULSE, tick_hz),
            timeout: to_ticks(RESPONSE_TIMEOUT, tick_hz),
        };
        match timing.check(counter_mask) {
            Ok(()) => Ok(timing),
            Err(err) => Err(err),
        }
    }

    /// Derive tick counts for the counter `C` running at `tick_hz`
    pub const fn for_counter<C: TickCounter>(tick_hz: u32) -> Result<Self, TimingError> {
        Self::from_tick_hz(tick_hz, C::MASK)
    }

    /// Check that every wait fits a counter of width `counter_mask`
    ///
    /// Waits longer than the counter range would never observe their
    /// bound and spin forever.
    pub const fn check(&self, counter_mask: u32) -> Result<(), TimingError> {
        if self.short == 0 || self.short >= self.long {
            return Err(TimingError::TooCoarse);
        }
        if self.attention > counter_mask
            || self.timeout > counter_mask
            || self.bit_cell() > counter_mask
        {
            return Err(TimingError::CounterTooNarrow);
        }
        Ok(())
    }

    /// Length of one bit cell
    pub const fn bit_cell(&self) -> u32 {
        self.short + self.long
    }

    /// Low phases shorter than this are ones
    pub const fn bit_threshold(&self) -> u32 {
        self.bit_cell() / 2
    }
}

/// Outcome of a bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wait {
    /// The condition cleared after this many ticks
    Cleared(u32),
    TimedOut,
}

/// Spin while `condition` holds, for at most `bound` ticks
pub(crate) fn wait_while<C, E, F>(clock: &mut C, bound: u32, mut condition: F) -> Result<Wait, E>
where
    C: TickCounter,
    F: FnMut() -> Result<bool, E>,
{
    let start = clock.now();
    loop {
        if !condition()? {
            return Ok(Wait::Cleared(clock.ticks_since(start)));
        }
        if clock.ticks_since(start) >= bound {
            return Ok(Wait::TimedOut);
        }
    }
}

/// Spin for `ticks`
pub(crate) fn busy_wait<C: TickCounter>(clock: &mut C, ticks: u32) {
    let start = clock.now();
    while clock.ticks_since(start) < ticks {}
}
