use super::{HSV_BITS, HSV_MAX, HUE_RANGE, Hsv, RGB_BITS, Rgb};

/// Width of one of the six hue ramp segments
const SEGMENT_WIDTH: i32 = HUE_RANGE / 6;

/// Divisor of the intra-segment ramp
const RAMP_DIVISOR: i32 = HSV_MAX / 6;

/// Hue ramp: red, magenta, blue, cyan, green, yellow, back to red.
///
/// The top few hue values land in a seventh segment, which holds red.
const HUE_RAMP: [[i32; 3]; 8] = [
    [HSV_MAX, 0, 0],
    [HSV_MAX, 0, HSV_MAX],
    [0, 0, HSV_MAX],
    [0, HSV_MAX, HSV_MAX],
    [0, HSV_MAX, 0],
    [HSV_MAX, HSV_MAX, 0],
    [HSV_MAX, 0, 0],
    [HSV_MAX, 0, 0],
];

/// Interpolate the hue ramp at `hue`, in HSV precision.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ramp(hue: u16) -> [i32; 3] {
    let h = i32::from(hue) & HSV_MAX;
    let index = (h / SEGMENT_WIDTH) as usize;
    let offset = h % SEGMENT_WIDTH;

    let from = HUE_RAMP[index];
    let to = HUE_RAMP[index + 1];
    [
        from[0] + (to[0] - from[0]) * offset / RAMP_DIVISOR,
        from[1] + (to[1] - from[1]) * offset / RAMP_DIVISOR,
        from[2] + (to[2] - from[2]) * offset / RAMP_DIVISOR,
    ]
}

/// Unscaled hue ramp value at `hue` (full value, full saturation)
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hue_ramp(hue: u16) -> Rgb {
    let [r, g, b] = ramp(hue);
    Rgb::new(r as u16, g as u16, b as u16)
}

/// Convert a fixed-point HSV color to RGB duty-cycle set-points.
///
/// Order of operations is fixed: clamp value, wrap hue, invert
/// saturation, lerp the ramp, scale by value, blend toward value by the
/// inverted saturation, shift to output precision.
///
/// Scaling by value truncates before the saturation blend, so at full
/// saturation and full value each channel lands up to 1 LSB below
/// [`hue_ramp`] (pure red is 16382, not 16383).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hsv2rgb(color: Hsv) -> Rgb {
    let v = i32::from(color.val).min(HSV_MAX);
    // Inverted: 0 keeps the full hue, HUE_RANGE is pure gray
    let s = HUE_RANGE - i32::from(color.sat).min(HSV_MAX);

    let channel = |c: i32| {
        let c = (c * v) >> HSV_BITS;
        let c = c + (((v - c) * s) >> HSV_BITS);
        (c >> (HSV_BITS - RGB_BITS)) as u16
    };

    let [r, g, b] = ramp(color.hue);
    Rgb::new(channel(r), channel(g), channel(b))
}
