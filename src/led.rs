//! PWM-backed RGB LED

use embedded_hal::pwm::SetDutyCycle;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::LedOutput;
use crate::color::{RGB_MAX, Rgb};

/// Three PWM channels driving one RGB LED
///
/// Set-points are rescaled from `0..=RGB_MAX` to each channel's own
/// `max_duty_cycle`, so a timer with TOP = `RGB_MAX` passes them through
/// unchanged.
pub struct PwmLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    current: Rgb,
}

impl<R: SetDutyCycle, G: SetDutyCycle, B: SetDutyCycle> PwmLed<R, G, B> {
    /// Create an LED that starts off
    pub fn new(red: R, green: G, blue: B) -> Self {
        Self {
            red,
            green,
            blue,
            current: Rgb::default(),
        }
    }

    /// Last color written
    pub fn current(&self) -> Rgb {
        self.current
    }

    /// Give back the PWM channels
    pub fn release(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn scale<C: SetDutyCycle>(channel: &mut C, value: u16) {
    let max = u32::from(channel.max_duty_cycle());
    let duty = u32::from(value.min(RGB_MAX)) * max / u32::from(RGB_MAX);
    match channel.set_duty_cycle(duty as u16) {
        Ok(()) => {}
        #[cfg(feature = "esp32-log")]
        Err(err) => println!("[PwmLed.write] error setting duty cycle {}: {:?}", duty, err),
        #[cfg(not(feature = "esp32-log"))]
        Err(_) => {}
    }
}

impl<R: SetDutyCycle, G: SetDutyCycle, B: SetDutyCycle> LedOutput for PwmLed<R, G, B> {
    fn write(&mut self, color: Rgb) {
        scale(&mut self.red, color.r);
        scale(&mut self.green, color.g);
        scale(&mut self.blue, color.b);
        self.current = color;
    }
}
