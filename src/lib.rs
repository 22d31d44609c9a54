#![no_std]

pub mod adb;
pub mod buttons;
pub mod color;
pub mod config;
pub mod input;
pub mod led;
pub mod painter;
pub mod scheduler;
pub mod transition;

pub use adb::touchpad::PointerSample;
pub use adb::{AdbBus, AdbError, AdbTiming, TickCounter, TimingError};
pub use buttons::ButtonBank;
pub use color::{Hsv, Rgb, hsv2rgb};
pub use config::{LightpainterConfig, TouchpadBounds, ValueRange};
pub use input::{DragGesture, InputController, extract_single_button};
pub use led::PwmLed;
pub use painter::{Lightpainter, ServiceError, SharedLightpainter};
pub use scheduler::{OverflowPrescaler, TransitionTicker};
pub use transition::TransitionEngine;
pub use embassy_time::{Duration, Instant};

/// Abstract LED output
///
/// Implement this trait to drive the RGB LED on different hardware.
/// Set-points are 14-bit duty cycles, see [`color::RGB_MAX`].
pub trait LedOutput {
    /// Write a color to the LED
    fn write(&mut self, color: Rgb);
}
