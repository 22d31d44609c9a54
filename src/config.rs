//! Device configuration

use crate::color::HSV_MAX;
use crate::transition::DEFAULT_VELOCITY;

/// Axis edited by a vertical drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAxis {
    Value,
    Hue,
    Saturation,
}

/// Usable extent of the touchpad surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchpadBounds {
    pub x_min: u16,
    pub x_max: u16,
    pub y_min: u16,
    pub y_max: u16,
}

impl TouchpadBounds {
    /// Bounds measured on the reference touchpad
    pub const REFERENCE: Self = Self {
        x_min: 250,
        x_max: 6500,
        y_min: 500,
        y_max: 4500,
    };

    /// Split the X extent into three equal regions: value, hue, saturation
    pub const fn region(&self, x: u16) -> EditAxis {
        let width = self.x_max.saturating_sub(self.x_min) as u32;
        let first = width / 3 + self.x_min as u32;
        let second = width * 2 / 3 + self.x_min as u32;

        let x = x as u32;
        if x < first {
            EditAxis::Value
        } else if x < second {
            EditAxis::Hue
        } else {
            EditAxis::Saturation
        }
    }
}

/// Allowed range of value edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueRange {
    /// `0..=HSV_MAX`
    #[default]
    Nominal,
    /// `0..=2 * HSV_MAX`; the color model still clamps output at `HSV_MAX`
    Boost,
}

impl ValueRange {
    /// Largest value an edit may reach
    pub const fn max(self) -> i32 {
        match self {
            Self::Nominal => HSV_MAX,
            Self::Boost => HSV_MAX * 2,
        }
    }
}

/// Configuration for the lightpainter
#[derive(Debug, Clone, Copy)]
pub struct LightpainterConfig {
    /// Surface extent used to pick the edit axis
    pub touchpad: TouchpadBounds,
    /// Clamp range of value edits
    pub value_range: ValueRange,
    /// Initial fade velocity of every preset pair
    pub default_velocity: u32,
}

impl LightpainterConfig {
    /// Configuration of the reference device
    pub const REFERENCE: Self = Self {
        touchpad: TouchpadBounds::REFERENCE,
        value_range: ValueRange::Nominal,
        default_velocity: DEFAULT_VELOCITY,
    };
}

impl Default for LightpainterConfig {
    fn default() -> Self {
        Self::REFERENCE
    }
}
