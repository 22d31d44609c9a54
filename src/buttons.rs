//! Preset buttons

use embedded_hal::digital::InputPin;

/// `N` active-low buttons with pull-ups
///
/// A released button reads high; [`ButtonBank::read_mask`] inverts that
/// into a pressed mask with bit `i` set while button `i` is held.
pub struct ButtonBank<P, const N: usize> {
    pins: [P; N],
}

impl<P: InputPin, const N: usize> ButtonBank<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        const { assert!(N <= 8, "button masks are 8 bits wide") };
        Self { pins }
    }

    /// Read all buttons into a pressed mask
    pub fn read_mask(&mut self) -> Result<u8, P::Error> {
        let mut mask = 0;
        for (index, pin) in self.pins.iter_mut().enumerate() {
            if pin.is_low()? {
                mask |= 1 << index;
            }
        }
        Ok(mask)
    }
}
