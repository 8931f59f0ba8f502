//! Angle helpers.
//!
//! Everything here works in radians. Degrees only appear at the file
//! boundary, where `f64::to_radians` is all that is needed.

use core::f64::consts::{PI, TAU};

use libm::{fabs, floor};

/// Tolerance used when deciding whether an angle lies inside a sampled range.
///
/// Grid bounds are stored as `f32` degrees, so anything finer than this is
/// representation noise rather than a real excursion.
pub const ANGLE_TOLERANCE: f64 = 1e-6;

/// Wrap an angle into `[0, 2π)`.
///
/// # Example
/// ```rust
/// use daff_core::wrap_two_pi;
/// use core::f64::consts::PI;
///
/// assert!((wrap_two_pi(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
/// assert_eq!(wrap_two_pi(2.0 * PI), 0.0);
/// ```
#[inline]
pub fn wrap_two_pi(angle: f64) -> f64 {
    let wrapped = angle - TAU * floor(angle / TAU);
    // floor() can leave exactly TAU behind for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Smallest absolute difference between two azimuths, in `[0, π]`.
#[inline]
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let d = wrap_two_pi(a - b);
    if d > PI { TAU - d } else { d }
}

/// `true` if `value` lies in `[low, high]` within [`ANGLE_TOLERANCE`].
#[inline]
pub(crate) fn within(value: f64, low: f64, high: f64) -> bool {
    value >= low - ANGLE_TOLERANCE && value <= high + ANGLE_TOLERANCE
}

/// `true` if two angles are equal within [`ANGLE_TOLERANCE`].
#[inline]
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    fabs(a - b) <= ANGLE_TOLERANCE
}
