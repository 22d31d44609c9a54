//! Pointer samples to drag gestures

use crate::adb::touchpad::PointerSample;

/// One step of a touch-down-to-lift-off drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragGesture {
    /// Position where the finger went down
    pub begin_x: u16,
    pub begin_y: u16,
    pub current_x: u16,
    pub current_y: u16,
    /// Motion since the previous sample, zero on the first and last step
    pub rel_x: i32,
    pub rel_y: i32,
    pub pressure: u8,
    /// Buttons held while this step was produced
    pub buttons: u8,
    pub is_begin: bool,
    pub is_end: bool,
}

/// Diffs consecutive samples into drag gestures
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    touching: bool,
    begin: (u16, u16),
    last: (u16, u16),
}

impl GestureTracker {
    /// Create a tracker with no finger down
    pub const fn new() -> Self {
        Self {
            touching: false,
            begin: (0, 0),
            last: (0, 0),
        }
    }

    /// Feed one sample; returns the gesture step it produces, if any
    ///
    /// A lifted sample ends a drag in progress and is otherwise ignored.
    pub fn track(&mut self, sample: PointerSample, buttons: u8) -> Option<DragGesture> {
        if !sample.is_touching() {
            if !self.touching {
                return None;
            }
            self.touching = false;
            return Some(DragGesture {
                begin_x: self.begin.0,
                begin_y: self.begin.1,
                current_x: self.last.0,
                current_y: self.last.1,
                rel_x: 0,
                rel_y: 0,
                pressure: 0,
                buttons,
                is_begin: false,
                is_end: true,
            });
        }

        let is_begin = !self.touching;
        if is_begin {
            self.begin = (sample.x, sample.y);
        }
        let (rel_x, rel_y) = if is_begin {
            (0, 0)
        } else {
            (
                i32::from(sample.x) - i32::from(self.last.0),
                i32::from(sample.y) - i32::from(self.last.1),
            )
        };

        self.touching = true;
        self.last = (sample.x, sample.y);

        Some(DragGesture {
            begin_x: self.begin.0,
            begin_y: self.begin.1,
            current_x: sample.x,
            current_y: sample.y,
            rel_x,
            rel_y,
            pressure: sample.pressure,
            buttons,
            is_begin,
            is_end: false,
        })
    }

    /// Check if a drag is in progress
    pub const fn is_touching(&self) -> bool {
        self.touching
    }
}
