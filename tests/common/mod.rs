//! Shared test infrastructure for lightpaint-core integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use lightpaint_core::adb::AdbTiming;
use lightpaint_core::color::RGB_MAX;
use lightpaint_core::{AdbBus, LedOutput, Rgb, TickCounter, TimingError};

// ============================================================================
// Recording LED
// ============================================================================

/// LED that records every color written
#[derive(Debug, Default)]
pub struct RecordingLed {
    pub history: Vec<Rgb>,
}

impl RecordingLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Rgb> {
        self.history.last().copied()
    }

    pub fn writes(&self) -> usize {
        self.history.len()
    }
}

impl LedOutput for RecordingLed {
    fn write(&mut self, color: Rgb) {
        self.history.push(color);
    }
}

// ============================================================================
// Simulated ADB line
// ============================================================================

/// Ticks between the host releasing the line and the device answering
pub const DEVICE_RESPONSE_DELAY: u64 = 40;

#[derive(Debug, Default)]
struct SimState {
    /// Absolute simulated time in ticks
    time: u64,
    host_low: bool,
    /// Time of the most recent host release
    anchor: u64,
    /// Device low intervals, relative to `anchor`
    device_low: Vec<(u64, u64)>,
    /// Host level changes as `(time, high)`
    host_edges: Vec<(u64, bool)>,
}

impl SimState {
    fn line_high(&self) -> bool {
        if self.host_low {
            return false;
        }
        let t = self.time - self.anchor;
        !self
            .device_low
            .iter()
            .any(|&(start, end)| t >= start && t < end)
    }
}

/// Test-side handle on the simulated bus
#[derive(Clone)]
pub struct SimHandle(Rc<RefCell<SimState>>);

impl SimHandle {
    /// Have the device answer every talk with `bytes`
    pub fn respond_with(&self, bytes: &[u8], timing: &AdbTiming) {
        self.0.borrow_mut().device_low = device_waveform(bytes, timing);
    }

    /// Have the device pull the line low and never let go
    pub fn hold_low(&self) {
        self.0.borrow_mut().device_low = vec![(DEVICE_RESPONSE_DELAY, u64::MAX)];
    }

    /// Have the device go quiet after the first `sent` data bits of `bytes`
    pub fn respond_cut_off(&self, bytes: &[u8], sent: usize, timing: &AdbTiming) {
        self.0.borrow_mut().device_low = cut_off_waveform(bytes, sent, timing);
    }

    /// Have the device send the first `sent` data bits of `bytes`, then
    /// pull the line low and never let go
    pub fn hold_low_after(&self, bytes: &[u8], sent: usize, timing: &AdbTiming) {
        let bits = std::iter::once(true).chain(data_bits(bytes).take(sent));
        let (mut intervals, end) = waveform(bits, timing);
        intervals.push((end, u64::MAX));
        self.0.borrow_mut().device_low = intervals;
    }

    /// Have the device stay silent
    pub fn silence(&self) {
        self.0.borrow_mut().device_low.clear();
    }

    pub fn time(&self) -> u64 {
        self.0.borrow().time
    }

    pub fn host_edges(&self) -> Vec<(u64, bool)> {
        self.0.borrow().host_edges.clone()
    }

    pub fn clear_edges(&self) {
        self.0.borrow_mut().host_edges.clear();
    }
}

/// Open-drain line shared by the host and the simulated device
pub struct SimLine(Rc<RefCell<SimState>>);

impl ErrorType for SimLine {
    type Error = Infallible;
}

impl InputPin for SimLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.borrow().line_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.borrow().line_high())
    }
}

impl OutputPin for SimLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        if !state.host_low {
            state.host_low = true;
            let time = state.time;
            state.host_edges.push((time, false));
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        if state.host_low {
            state.host_low = false;
            let time = state.time;
            state.anchor = time;
            state.host_edges.push((time, true));
        }
        Ok(())
    }
}

/// 8-bit counter that advances one tick per read
pub struct SimClock(Rc<RefCell<SimState>>);

impl TickCounter for SimClock {
    const MASK: u32 = 0xFF;

    #[allow(clippy::cast_possible_truncation)]
    fn now(&mut self) -> u32 {
        let mut state = self.0.borrow_mut();
        state.time += 1;
        (state.time & 0xFF) as u32
    }
}

pub fn sim_bus() -> (AdbBus<SimLine, SimClock>, SimHandle) {
    sim_bus_with(AdbTiming::REFERENCE).unwrap()
}

/// Simulated bus with custom timing, failing like [`AdbBus::new`]
pub fn sim_bus_with(
    timing: AdbTiming,
) -> Result<(AdbBus<SimLine, SimClock>, SimHandle), TimingError> {
    let state = Rc::new(RefCell::new(SimState::default()));
    let bus = AdbBus::new(SimLine(state.clone()), SimClock(state.clone()), timing)?;
    Ok((bus, SimHandle(state)))
}

/// Low intervals for `bits` sent back to back, and the time after the last one
fn waveform(bits: impl IntoIterator<Item = bool>, timing: &AdbTiming) -> (Vec<(u64, u64)>, u64) {
    let short = u64::from(timing.short);
    let long = u64::from(timing.long);
    let mut intervals = Vec::new();
    let mut t = DEVICE_RESPONSE_DELAY;
    for bit in bits {
        let (low, high) = if bit { (short, long) } else { (long, short) };
        intervals.push((t, t + low));
        t += low + high;
    }
    (intervals, t)
}

/// Bits of `bytes`, MSB first
fn data_bits(bytes: &[u8]) -> impl Iterator<Item = bool> + '_ {
    bytes
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |shift| byte & (1 << shift) != 0))
}

/// Device answer: start bit, `bytes` MSB first, stop bit
pub fn device_waveform(bytes: &[u8], timing: &AdbTiming) -> Vec<(u64, u64)> {
    let bits = std::iter::once(true)
        .chain(data_bits(bytes))
        .chain(std::iter::once(false));
    waveform(bits, timing).0
}

/// Device answer that stops after the first `sent` data bits of `bytes`
pub fn cut_off_waveform(bytes: &[u8], sent: usize, timing: &AdbTiming) -> Vec<(u64, u64)> {
    let bits = std::iter::once(true).chain(data_bits(bytes).take(sent));
    waveform(bits, timing).0
}

/// Split host edges into transactions and decode the bits of each
///
/// The attention pulse merges with the first start bit, so each decoded
/// transaction starts with the command byte.
pub fn decode_host_transactions(edges: &[(u64, bool)], timing: &AdbTiming) -> Vec<Vec<bool>> {
    let threshold = u64::from(timing.bit_threshold());
    let mut transactions: Vec<Vec<bool>> = Vec::new();
    for pair in edges.windows(2) {
        let [(fall, false), (rise, true)] = pair else {
            continue;
        };
        let low = rise - fall;
        if low > u64::from(timing.attention) / 2 {
            transactions.push(Vec::new());
        } else if let Some(bits) = transactions.last_mut() {
            bits.push(low < threshold);
        }
    }
    transactions
}

/// Pack bits MSB first
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .filter(|chunk| chunk.len() == 8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit)))
        .collect()
}

/// Encode an absolute-mode register 0 report
///
/// Only pressure bits 2..8 survive the round trip.
#[allow(clippy::cast_possible_truncation)]
pub fn absolute_report(x: u16, y: u16, pressure: u8) -> [u8; 5] {
    [
        ((y >> 2) & 0x7F) as u8,
        ((x >> 2) & 0x7F) as u8,
        (((x >> 9) & 0x07) | (((y >> 9) & 0x07) << 4)) as u8,
        (((x >> 12) & 0x07) | (((y >> 12) & 0x07) << 4)) as u8,
        ((pressure >> 2) & 0x07) | (((pressure >> 5) & 0x07) << 4),
    ]
}

// ============================================================================
// Mock buttons and PWM
// ============================================================================

/// Button pin with pull-up; reads low while pressed
pub struct MockButton {
    pub pressed: bool,
}

impl ErrorType for MockButton {
    type Error = Infallible;
}

impl InputPin for MockButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.pressed)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pressed)
    }
}

/// PWM channel that rejects every duty cycle
pub struct FailingPwm;

#[derive(Debug)]
pub struct PwmFault;

impl pwm::Error for PwmFault {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

impl pwm::ErrorType for FailingPwm {
    type Error = PwmFault;
}

impl SetDutyCycle for FailingPwm {
    fn max_duty_cycle(&self) -> u16 {
        RGB_MAX
    }

    fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
        Err(PwmFault)
    }
}

/// PWM channel remembering its last duty cycle
pub struct MockPwm {
    pub max: u16,
    pub duty: u16,
}

impl pwm::ErrorType for MockPwm {
    type Error = Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty;
        Ok(())
    }
}
