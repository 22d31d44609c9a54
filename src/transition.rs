//! Multi-preset cross-fade engine
//!
//! Cycles through the active presets in the order they were added, fading
//! from each one to the next. Progress is a fixed-point offset in
//! `0..=TRANSITION_MAX`, advanced once per tick by the velocity stored for
//! the pair currently fading.

use heapless::Vec;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::LedOutput;
use crate::color::{Hsv, hsv2rgb, lerp_hsv};

/// Precision of the transition offset
pub const TRANSITION_BITS: u32 = 14;
/// One full fade between two presets
pub const TRANSITION_MAX: u32 = 1 << TRANSITION_BITS;
/// Velocity that completes one fade in about a second at 100 Hz
pub const DEFAULT_VELOCITY: u32 = TRANSITION_MAX / 100;

/// Symmetric per-pair velocity table
///
/// Keyed by the unordered pair of preset indices; the diagonal is unused.
#[derive(Debug, Clone)]
pub struct VelocityTable<const N: usize> {
    cells: [[u32; N]; N],
}

impl<const N: usize> VelocityTable<N> {
    /// Create a table with every pair set to `initial` (clamped)
    pub const fn new(initial: u32) -> Self {
        let initial = if initial > TRANSITION_MAX {
            TRANSITION_MAX
        } else {
            initial
        };
        Self {
            cells: [[initial; N]; N],
        }
    }

    /// Velocity for the pair `(a, b)`, or 0 for the diagonal or out-of-range indices
    pub fn get(&self, a: usize, b: usize) -> u32 {
        if a == b || a >= N || b >= N {
            return 0;
        }
        self.cells[a][b]
    }

    /// Adjust the velocity for `(a, b)` by `delta`, clamped to `0..=TRANSITION_MAX`
    ///
    /// Returns the stored value.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn adjust(&mut self, a: usize, b: usize, delta: i32) -> u32 {
        if a == b || a >= N || b >= N {
            return 0;
        }
        let value = (self.cells[a][b] as i32)
            .saturating_add(delta)
            .clamp(0, TRANSITION_MAX as i32) as u32;
        self.cells[a][b] = value;
        self.cells[b][a] = value;
        value
    }
}

/// Cross-fade state shared between the tick interrupt and the main loop
#[derive(Debug, Clone)]
pub struct TransitionEngine<const N: usize> {
    /// Active presets in fade order
    active: Vec<u8, N>,
    /// Index into `active` of the preset being faded from
    segment: usize,
    /// Progress from `active[segment]` to the next preset
    offset: u32,
    velocities: VelocityTable<N>,
}

impl<const N: usize> TransitionEngine<N> {
    /// Create an idle engine with every pair velocity set to `velocity`
    pub const fn new(velocity: u32) -> Self {
        Self {
            active: Vec::new(),
            segment: 0,
            offset: 0,
            velocities: VelocityTable::new(velocity),
        }
    }

    /// Clear the active set
    pub fn reset(&mut self) {
        self.active.clear();
        self.segment = 0;
        self.offset = 0;
    }

    /// Append a preset to the fade cycle
    ///
    /// Returns `false` if it was already active or the cycle is full.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add(&mut self, preset: usize) -> bool {
        if preset >= N || self.contains(preset) {
            return false;
        }
        if self.active.push(preset as u8).is_err() {
            return false;
        }
        self.offset = 0;
        #[cfg(feature = "esp32-log")]
        println!("[TransitionEngine.add] preset {} -> {:?}", preset, self.active);
        true
    }

    /// Remove a preset from the fade cycle, keeping the order of the rest
    ///
    /// Returns `false` if it was not active.
    pub fn remove(&mut self, preset: usize) -> bool {
        let Some(position) = self.position(preset) else {
            return false;
        };
        self.active.remove(position);
        self.segment = 0;
        self.offset = 0;
        #[cfg(feature = "esp32-log")]
        println!("[TransitionEngine.remove] preset {} -> {:?}", preset, self.active);
        true
    }

    /// Advance the fade by one step and write the blended color
    ///
    /// Does nothing while fewer than two presets are active. Returns the
    /// color written to `led`.
    pub fn tick<L: LedOutput>(&mut self, presets: &[Hsv; N], led: &mut L) -> Option<Hsv> {
        let (from, to) = self.current_pair()?;

        let color = lerp_hsv(presets[from], presets[to], self.offset, TRANSITION_MAX);
        led.write(hsv2rgb(color));

        self.offset += self.velocities.get(from, to);
        if self.offset > TRANSITION_MAX {
            self.offset -= TRANSITION_MAX;
            self.segment = (self.segment + 1) % self.active.len();
        }

        Some(color)
    }

    /// Adjust the velocity for the unordered pair `(a, b)` by `delta`
    pub fn set_velocity(&mut self, a: usize, b: usize, delta: i32) -> u32 {
        self.velocities.adjust(a, b, delta)
    }

    /// Velocity stored for the unordered pair `(a, b)`
    pub fn velocity(&self, a: usize, b: usize) -> u32 {
        self.velocities.get(a, b)
    }

    /// The pair currently fading, `(from, to)`, if a fade is running
    pub fn current_pair(&self) -> Option<(usize, usize)> {
        let len = self.active.len();
        if len < 2 {
            return None;
        }
        let from = self.active[self.segment % len];
        let to = self.active[(self.segment + 1) % len];
        Some((usize::from(from), usize::from(to)))
    }

    /// Check if a fade is running
    pub fn is_fading(&self) -> bool {
        self.active.len() >= 2
    }

    /// Active presets in fade order
    pub fn members(&self) -> &[u8] {
        &self.active
    }

    /// Number of active presets
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Check if no preset is active
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Current fade progress in `0..=TRANSITION_MAX`
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Index into the active set of the preset being faded from
    pub fn segment(&self) -> usize {
        self.segment
    }

    fn contains(&self, preset: usize) -> bool {
        self.position(preset).is_some()
    }

    fn position(&self, preset: usize) -> Option<usize> {
        self.active.iter().position(|&p| usize::from(p) == preset)
    }
}
