//! Touch and button input
//!
//! [`InputController`] owns the presets and turns drag gestures and button
//! edges into color edits, LED updates and transition membership changes.

mod gesture;

pub use gesture::{DragGesture, GestureTracker};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::LedOutput;
use crate::adb::touchpad::PointerSample;
use crate::color::{HSV_MAX, HUE_RANGE, Hsv, RGB_OFF, hsv2rgb};
use crate::config::{EditAxis, LightpainterConfig, TouchpadBounds};
use crate::transition::TransitionEngine;

/// 1-based index of the only set bit of `mask`
///
/// Returns 0 when no bit or more than one bit is set, meaning there is no
/// definite owner.
#[allow(clippy::cast_possible_truncation)]
pub const fn extract_single_button(mask: u8) -> u8 {
    if !mask.is_power_of_two() {
        return 0;
    }
    mask.trailing_zeros() as u8 + 1
}

/// Presets with evenly spaced hues at full saturation and value
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn default_presets<const N: usize>() -> [Hsv; N] {
    let mut presets = [Hsv::BLACK; N];
    let mut i = 0;
    while i < N {
        let hue = (i as i32 * HUE_RANGE / N as i32) as u16;
        presets[i] = Hsv::new(hue, HSV_MAX as u16, HSV_MAX as u16);
        i += 1;
    }
    presets
}

/// Preset storage plus the per-event input handlers
#[derive(Debug, Clone)]
pub struct InputController<const N: usize> {
    presets: [Hsv; N],
    /// Last color edited or previewed, target of edits with no owning button
    scratch: Hsv,
    tracker: GestureTracker,
    touchpad: TouchpadBounds,
    value_max: i32,
}

impl<const N: usize> InputController<N> {
    /// Buttons beyond `N` are ignored
    #[allow(clippy::cast_possible_truncation)]
    const BUTTON_MASK: u8 = ((1u16 << N) - 1) as u8;

    /// Create a controller with the default presets
    pub const fn new(config: &LightpainterConfig) -> Self {
        const { assert!(N > 0 && N <= 8, "button masks are 8 bits wide") };
        let presets = default_presets::<N>();
        Self {
            scratch: presets[0],
            presets,
            tracker: GestureTracker::new(),
            touchpad: config.touchpad,
            value_max: config.value_range.max(),
        }
    }

    /// All stored presets
    pub fn presets(&self) -> &[Hsv; N] {
        &self.presets
    }

    /// Stored preset `index`, if it exists
    pub fn preset(&self, index: usize) -> Option<Hsv> {
        self.presets.get(index).copied()
    }

    /// Replace a stored preset
    pub fn set_preset(&mut self, index: usize, color: Hsv) {
        if let Some(preset) = self.presets.get_mut(index) {
            *preset = color;
        }
    }

    /// Feed one pointer sample through the gesture tracker
    pub fn track(&mut self, sample: PointerSample, buttons: u8) -> Option<DragGesture> {
        self.tracker.track(sample, buttons)
    }

    /// Handle one drag gesture step
    ///
    /// With exactly two presets fading, vertical motion tunes the fade
    /// velocity of that pair. Otherwise the gesture edits the axis chosen
    /// by its begin position, committing to the preset of the single held
    /// button (if any) and previewing the result on the LED.
    pub fn drag_action<L: LedOutput>(
        &mut self,
        gesture: &DragGesture,
        engine: &mut TransitionEngine<N>,
        led: &mut L,
    ) {
        let buttons = gesture.buttons & Self::BUTTON_MASK;
        if gesture.is_end && buttons == 0 {
            led.write(RGB_OFF);
            return;
        }

        if engine.len() == 2 {
            if let Some((from, to)) = engine.current_pair() {
                engine.set_velocity(from, to, gesture.rel_y / 2);
            }
            return;
        }

        let owner = match extract_single_button(buttons) {
            0 => None,
            button => Some(usize::from(button) - 1),
        };
        let base = owner.map_or(self.scratch, |index| self.presets[index]);
        let color = self.edit(base, self.touchpad.region(gesture.begin_x), gesture.rel_y);

        self.scratch = color;
        if let Some(index) = owner {
            self.presets[index] = color;
        }
        led.write(hsv2rgb(color));
    }

    /// Handle a change of the held-button mask
    ///
    /// Newly pressed buttons join the fade cycle, released ones leave it.
    /// A single remaining button shows its preset; none switches the LED off.
    pub fn button_change<L: LedOutput>(
        &mut self,
        previous: u8,
        current: u8,
        engine: &mut TransitionEngine<N>,
        led: &mut L,
    ) {
        let previous = previous & Self::BUTTON_MASK;
        let current = current & Self::BUTTON_MASK;
        let changed = previous ^ current;

        for preset in 0..N {
            let bit = 1 << preset;
            if changed & bit == 0 {
                continue;
            }
            if current & bit != 0 {
                engine.add(preset);
            } else {
                engine.remove(preset);
            }
        }

        #[cfg(feature = "esp32-log")]
        println!(
            "[InputController.button_change] {:#06b} -> {:#06b}, active {:?}",
            previous,
            current,
            engine.members()
        );

        match extract_single_button(current) {
            0 if current == 0 => {
                led.write(RGB_OFF);
                engine.reset();
            }
            0 => {}
            button => {
                led.write(hsv2rgb(self.presets[usize::from(button) - 1]));
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn edit(&self, color: Hsv, axis: EditAxis, delta: i32) -> Hsv {
        let mut color = color;
        match axis {
            EditAxis::Value => {
                color.val = (i32::from(color.val) + delta).clamp(0, self.value_max) as u16;
            }
            EditAxis::Hue => {
                color.hue = ((i32::from(color.hue) + delta) & HSV_MAX) as u16;
            }
            EditAxis::Saturation => {
                color.sat = (i32::from(color.sat) + delta).clamp(0, HSV_MAX) as u16;
            }
        }
        color
    }
}
