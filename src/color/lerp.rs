use super::{HSV_MAX, HUE_RANGE, Hsv};

/// Linear interpolation from `from` to `to` at `progress / full`
#[allow(clippy::cast_possible_wrap)]
#[inline]
pub const fn lerp(from: i32, to: i32, progress: u32, full: u32) -> i32 {
    if full == 0 {
        return from;
    }
    from + (to - from) * progress as i32 / full as i32
}

/// Interpolate a hue along the short arc of the hue circle
///
/// When the endpoints are more than half a circle apart, the smaller one is
/// lifted by a full circle before interpolating.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn lerp_hue(from: u16, to: u16, progress: u32, full: u32) -> u16 {
    let mut from = i32::from(from) & HSV_MAX;
    let mut to = i32::from(to) & HSV_MAX;

    if (from - to).abs() > HUE_RANGE / 2 {
        if from < to {
            from += HUE_RANGE;
        } else {
            to += HUE_RANGE;
        }
    }

    (lerp(from, to, progress, full) & HSV_MAX) as u16
}

/// Interpolate two colors: hue on the short arc, saturation and value linearly
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn lerp_hsv(from: Hsv, to: Hsv, progress: u32, full: u32) -> Hsv {
    Hsv {
        hue: lerp_hue(from.hue, to.hue, progress, full),
        sat: lerp(i32::from(from.sat), i32::from(to.sat), progress, full) as u16,
        val: lerp(i32::from(from.val), i32::from(to.val), progress, full) as u16,
    }
}
