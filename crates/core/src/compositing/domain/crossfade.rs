//! Opacity envelope and alpha blending for overlay windows.

use ndarray::Zip;

use crate::shared::frame::Frame;

/// Overlay opacity at timeline time `t` for a window `[start, start + duration)`.
///
/// Ramps from 0 to 1 over the `fade` seconds before `start`, holds at 1
/// inside the window, then ramps back to 0 over the `fade` seconds after it.
/// A zero `fade` gives hard cuts.
pub fn opacity(t: f64, start: f64, duration: f64, fade: f64) -> f32 {
    let end = start + duration;
    if t >= start && t < end {
        return 1.0;
    }
    if fade <= 0.0 {
        return 0.0;
    }
    let alpha = if t < start {
        (t - (start - fade)) / fade
    } else {
        (end + fade - t) / fade
    };
    alpha.clamp(0.0, 1.0) as f32
}

/// Blends `overlay` onto `base` in place: `base * (1 - alpha) + overlay * alpha`.
///
/// Both frames must share the same size.
pub fn blend_into(base: &mut Frame, overlay: &Frame, alpha: f32) {
    debug_assert_eq!(base.size(), overlay.size(), "blend frames must share a size");
    if alpha <= 0.0 {
        return;
    }
    if alpha >= 1.0 {
        base.data_mut().copy_from_slice(overlay.data());
        return;
    }

    let inverse = 1.0 - alpha;
    let top = overlay.as_ndarray();
    let mut bottom = base.as_ndarray_mut();
    Zip::from(&mut bottom).and(&top).for_each(|b, &o| {
        *b = (*b as f32 * inverse + o as f32 * alpha).round() as u8;
    });
}
