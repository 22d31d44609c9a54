//! Apple Desktop Bus host, bit-banged on a single open-drain line
//!
//! Every transaction runs inside a critical section: the bit timing loops
//! must not be preempted. Do not call into the bus from inside another
//! critical section.

mod timing;
pub mod touchpad;

use embedded_hal::digital::{InputPin, OutputPin};

pub use timing::{
    ATTENTION_PULSE, AdbTiming, LONG_PULSE, REFERENCE_COUNTER_MASK, REFERENCE_TICK_HZ,
    RESPONSE_TIMEOUT, SHORT_PULSE, TickCounter, TimingError,
};
use timing::{Wait, busy_wait, wait_while};

/// Largest register payload a device sends
pub const MAX_RESPONSE: usize = 8;

/// Command nibble of a command byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdbCommand {
    Listen = 0b1000,
    Talk = 0b1100,
}

/// Compose a command byte from command, device address and register
pub const fn command_byte(command: AdbCommand, address: u8, register: u8) -> u8 {
    command as u8 | ((address & 0x0F) << 4) | (register & 0x03)
}

/// Default address of the touchpad
pub const TOUCHPAD_ADDRESS: u8 = 3;

/// Talk register 0: position report
pub const TALK_REGISTER_0: u8 = command_byte(AdbCommand::Talk, TOUCHPAD_ADDRESS, 0);
/// Talk register 1: device mode
pub const TALK_REGISTER_1: u8 = command_byte(AdbCommand::Talk, TOUCHPAD_ADDRESS, 1);
/// Talk register 3: address and handler
pub const TALK_REGISTER_3: u8 = command_byte(AdbCommand::Talk, TOUCHPAD_ADDRESS, 3);
/// Listen register 1: device mode
pub const LISTEN_REGISTER_1: u8 = command_byte(AdbCommand::Listen, TOUCHPAD_ADDRESS, 1);
/// Listen register 3: address and handler
pub const LISTEN_REGISTER_3: u8 = command_byte(AdbCommand::Listen, TOUCHPAD_ADDRESS, 3);

/// Bus transaction failure
///
/// A device that does not answer at all is not an error: talk commands
/// then report zero bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdbError<E> {
    /// The device pulled the line low but never completed the start bit
    NoStartBit,
    /// The line could not be driven or read
    Pin(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for AdbError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AdbError::NoStartBit => write!(f, "response started but start bit never completed"),
            AdbError::Pin(err) => write!(f, "bus pin error: {err:?}"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for AdbError<E> {}

/// ADB host on one open-drain line
///
/// `P` must behave as an open-drain output with pull-up: `set_low` pulls
/// the line down, `set_high` releases it, `is_high` reads the line.
pub struct AdbBus<P, C> {
    pin: P,
    clock: C,
    timing: AdbTiming,
}

impl<P, C> AdbBus<P, C>
where
    P: InputPin + OutputPin,
    C: TickCounter,
{
    /// Create a bus host
    ///
    /// Fails if `timing` does not fit the range of `C`.
    pub fn new(pin: P, clock: C, timing: AdbTiming) -> Result<Self, TimingError> {
        timing.check(C::MASK)?;
        Ok(Self { pin, clock, timing })
    }

    /// Give back the line and the counter
    pub fn release(self) -> (P, C) {
        (self.pin, self.clock)
    }

    /// Timing in use
    pub fn timing(&self) -> &AdbTiming {
        &self.timing
    }

    /// Send `command`, then either write `bytes_to_send` bytes of `data` or,
    /// when `bytes_to_send` is 0, read the device's answer into `data`.
    ///
    /// Returns the number of bytes received: 0 after a write, and 0 for a
    /// talk command nobody answered. A truncated answer returns the bytes
    /// completed before the line went quiet.
    pub fn execute_command(
        &mut self,
        command: u8,
        data: &mut [u8; MAX_RESPONSE],
        bytes_to_send: usize,
    ) -> Result<usize, AdbError<P::Error>> {
        critical_section::with(|_| self.transaction(command, data, bytes_to_send))
    }

    /// Read touchpad register 0, the steady-state poll
    pub fn poll(&mut self, buffer: &mut [u8; MAX_RESPONSE]) -> Result<usize, AdbError<P::Error>> {
        self.execute_command(TALK_REGISTER_0, buffer, 0)
    }

    /// Send a talk command and read the answer
    pub fn talk(
        &mut self,
        command: u8,
        buffer: &mut [u8; MAX_RESPONSE],
    ) -> Result<usize, AdbError<P::Error>> {
        self.execute_command(command, buffer, 0)
    }

    /// Send a listen command followed by `payload` (at most 8 bytes are sent)
    pub fn listen(&mut self, command: u8, payload: &[u8]) -> Result<(), AdbError<P::Error>> {
        let mut data = [0u8; MAX_RESPONSE];
        let len = payload.len().min(MAX_RESPONSE);
        data[..len].copy_from_slice(&payload[..len]);
        if len == 0 {
            // A listen without payload is still a write, never a read
            critical_section::with(|_| self.send_command(command))?;
            return Ok(());
        }
        self.execute_command(command, &mut data, len).map(|_| ())
    }

    fn transaction(
        &mut self,
        command: u8,
        data: &mut [u8; MAX_RESPONSE],
        bytes_to_send: usize,
    ) -> Result<usize, AdbError<P::Error>> {
        self.send_command(command)?;

        if bytes_to_send > 0 {
            self.write_bit(true)?;
            for &byte in data.iter().take(bytes_to_send) {
                self.write_byte(byte)?;
            }
            self.write_bit(false)?;
            return Ok(0);
        }

        self.read_response(data)
    }

    /// Attention pulse, start bit, command byte, stop bit
    fn send_command(&mut self, command: u8) -> Result<(), AdbError<P::Error>> {
        self.pin.set_low().map_err(AdbError::Pin)?;
        busy_wait(&mut self.clock, self.timing.attention);

        self.write_bit(true)?;
        self.write_byte(command)?;
        self.write_bit(false)
    }

    /// A one is low `short` then high `long`; a zero is the reverse
    fn write_bit(&mut self, bit: bool) -> Result<(), AdbError<P::Error>> {
        let (low, high) = if bit {
            (self.timing.short, self.timing.long)
        } else {
            (self.timing.long, self.timing.short)
        };

        self.pin.set_low().map_err(AdbError::Pin)?;
        busy_wait(&mut self.clock, low);
        self.pin.set_high().map_err(AdbError::Pin)?;
        busy_wait(&mut self.clock, high);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), AdbError<P::Error>> {
        for shift in (0..8).rev() {
            self.write_bit(byte & (1 << shift) != 0)?;
        }
        Ok(())
    }

    fn read_response(&mut self, data: &mut [u8; MAX_RESPONSE]) -> Result<usize, AdbError<P::Error>> {
        let timing = self.timing;
        let Self { pin, clock, .. } = self;

        // Device answers by pulling the line low
        if wait_while(clock, timing.timeout, || line_is_high(pin))? == Wait::TimedOut {
            return Ok(0);
        }

        // ... and releasing it to finish the start bit
        if wait_while(clock, timing.timeout, || line_is_low(pin))? == Wait::TimedOut {
            return Err(AdbError::NoStartBit);
        }

        let cell = timing.bit_cell();
        for (received, byte) in data.iter_mut().enumerate() {
            *byte = 0;
            for shift in (0..8).rev() {
                if wait_while(clock, cell, || line_is_high(pin))? == Wait::TimedOut {
                    return Ok(received);
                }
                let Wait::Cleared(low) = wait_while(clock, cell, || line_is_low(pin))? else {
                    return Ok(received);
                };
                if low < timing.bit_threshold() {
                    *byte |= 1 << shift;
                }
            }
        }

        Ok(MAX_RESPONSE)
    }
}

fn line_is_high<P: InputPin>(pin: &mut P) -> Result<bool, AdbError<P::Error>> {
    pin.is_high().map_err(AdbError::Pin)
}

fn line_is_low<P: InputPin>(pin: &mut P) -> Result<bool, AdbError<P::Error>> {
    pin.is_low().map_err(AdbError::Pin)
}
