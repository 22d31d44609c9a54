//! Absolute-mode touchpad reports

use embedded_hal::digital::{InputPin, OutputPin};

use super::{
    AdbBus, AdbError, LISTEN_REGISTER_1, LISTEN_REGISTER_3, MAX_RESPONSE, TALK_REGISTER_1,
    TickCounter,
};

/// Bytes in an absolute-mode register 0 report
pub const REPORT_LEN: usize = 5;

/// Register 3 payload: enabled, address 3, device handler 4
const REGISTER_3_ABSOLUTE: [u8; 2] = [0b0110_0011, 4];

/// Register 1 byte selecting relative (non-zero) or absolute (zero) reports
const REGISTER_1_MODE_BYTE: usize = 6;

/// One absolute position report from the digitizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerSample {
    /// Horizontal position
    pub x: u16,
    /// Vertical position
    pub y: u16,
    /// Finger pressure, 0 when lifted
    pub pressure: u8,
    /// Physical pad button
    pub pad_button: bool,
    /// Tap gesture flag
    pub gesture: bool,
}

impl PointerSample {
    /// Sample with no pad button or gesture flag
    pub const fn new(x: u16, y: u16, pressure: u8) -> Self {
        Self {
            x,
            y,
            pressure,
            pad_button: false,
            gesture: false,
        }
    }

    /// Unpack a register 0 report, `None` if it is too short
    pub fn decode(report: &[u8]) -> Option<Self> {
        let &[d0, d1, d2, d3, d4, ..] = report else {
            return None;
        };

        let x = (u16::from(d1 & 0x7F) << 2)
            | (u16::from(d2 & 0x07) << 9)
            | (u16::from(d3 & 0x07) << 12);
        let y = (u16::from(d0 & 0x7F) << 2)
            | (u16::from(d2 & 0x70) << (9 - 4))
            | (u16::from(d3 & 0x70) << (12 - 4));
        let pressure = ((d4 & 0x07) << 2) | ((d4 & 0x70) << (5 - 4));

        Some(Self {
            x,
            y,
            pressure,
            pad_button: d0 & 0x80 != 0,
            gesture: d1 & 0x80 != 0,
        })
    }

    /// A finger is on the pad
    ///
    /// Zero pressure or a zero coordinate means the finger was lifted.
    pub const fn is_touching(&self) -> bool {
        self.pressure != 0 && self.x != 0 && self.y != 0
    }
}

/// Switch the touchpad to absolute reports
///
/// Returns `false` if register 1 could not be read back in full, in which
/// case it is left untouched.
pub fn enable_absolute_mode<P, C>(bus: &mut AdbBus<P, C>) -> Result<bool, AdbError<P::Error>>
where
    P: InputPin + OutputPin,
    C: TickCounter,
{
    bus.listen(LISTEN_REGISTER_3, &REGISTER_3_ABSOLUTE)?;

    let mut register_1 = [0u8; MAX_RESPONSE];
    let received = bus.talk(TALK_REGISTER_1, &mut register_1)?;
    if received <= REGISTER_1_MODE_BYTE {
        return Ok(false);
    }

    register_1[REGISTER_1_MODE_BYTE] = 0x00;
    bus.listen(LISTEN_REGISTER_1, &register_1[..=REGISTER_1_MODE_BYTE])?;
    Ok(true)
}
