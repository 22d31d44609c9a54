//! Fixed-point color model
//!
//! Colors are edited and interpolated as 14-bit HSV triples and emitted as
//! 14-bit RGB duty-cycle set-points.

mod hsv;
mod lerp;

pub use hsv::{hsv2rgb, hue_ramp};
pub use lerp::{lerp, lerp_hsv, lerp_hue};

/// Precision of every HSV component
pub const HSV_BITS: u32 = 14;
/// Largest nominal HSV component value
pub const HSV_MAX: i32 = (1 << HSV_BITS) - 1;
/// Full hue circle, one past `HSV_MAX`
pub const HUE_RANGE: i32 = HSV_MAX + 1;

/// PWM precision of the RGB output
pub const RGB_BITS: u32 = 14;
/// Largest RGB duty-cycle set-point
pub const RGB_MAX: u16 = (1 << RGB_BITS) - 1;

/// RGB duty-cycle set-points, each in `0..=RGB_MAX`
pub type Rgb = smart_leds::RGB<u16>;

/// Fixed-point HSV color
///
/// `hue` is circular modulo [`HUE_RANGE`]. `sat` is clamped to `HSV_MAX`,
/// `val` may reach `2 * HSV_MAX` when value boost is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsv {
    /// Hue, circular modulo [`HUE_RANGE`]
    pub hue: u16,
    /// Saturation, 0 is gray and `HSV_MAX` the pure hue
    pub sat: u16,
    /// Value (brightness)
    pub val: u16,
}

impl Hsv {
    /// Zero value, renders as LED off
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a color from raw fixed-point components
    pub const fn new(hue: u16, sat: u16, val: u16) -> Self {
        Self { hue, sat, val }
    }
}

/// LED switched off
pub const RGB_OFF: Rgb = Rgb { r: 0, g: 0, b: 0 };
