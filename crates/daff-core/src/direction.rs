//! Unit vectors on the sphere and the two DAFF views.
//!
//! Conversions between angles and vectors live here so that the grid and
//! the orientation transform agree on one convention:
//!
//! | View | Angles | Unit vector |
//! |------|--------|-------------|
//! | Data | alpha ∈ [0, 2π), beta ∈ [0, π] from the south pole | `e = beta - π/2`, `(cos e cos α, cos e sin α, sin e)` |
//! | Object | phi ∈ [0, 2π), theta ∈ [-π/2, π/2] | `(cos θ cos φ, cos θ sin φ, sin θ)` |

use core::f64::consts::FRAC_PI_2;

use libm::{asin, atan2, cos, sin, sqrt};

use crate::angle::wrap_two_pi;

/// Horizontal vector length below which a direction counts as a pole.
const POLE_EPSILON: f64 = 1e-9;

/// Coordinate view used for a directional query or a record coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Internal sampling coordinates `(alpha, beta)`.
    Data,
    /// Caller-facing coordinates `(phi, theta)`, rotated by the orientation.
    Object,
}

impl View {
    /// Integer code used at the binding boundary (data = 0, object = 1).
    pub fn code(self) -> i32 {
        match self {
            View::Data => 0,
            View::Object => 1,
        }
    }

    /// Inverse of [`View::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(View::Data),
            1 => Some(View::Object),
            _ => None,
        }
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            View::Data => "data view",
            View::Object => "object view",
        }
    }
}

/// A unit vector in Cartesian coordinates.
///
/// +z points to the north pole (beta = π in the data view, theta = π/2 in
/// the object view); azimuth zero lies on +x and grows towards +y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Direction {
    /// Build a direction from azimuth and elevation (radians).
    #[inline]
    pub fn from_azimuth_elevation(azimuth: f64, elevation: f64) -> Self {
        let ce = cos(elevation);
        Self {
            x: ce * cos(azimuth),
            y: ce * sin(azimuth),
            z: sin(elevation),
        }
    }

    /// Build a direction from data-view angles `(alpha, beta)`.
    #[inline]
    pub fn from_data_view(alpha: f64, beta: f64) -> Self {
        Self::from_azimuth_elevation(alpha, beta - FRAC_PI_2)
    }

    /// Build a direction from object-view angles `(phi, theta)`.
    #[inline]
    pub fn from_object_view(phi: f64, theta: f64) -> Self {
        Self::from_azimuth_elevation(phi, theta)
    }

    /// Azimuth in `[0, 2π)` and elevation in `[-π/2, π/2]`.
    ///
    /// At the poles the azimuth is undefined and reported as zero.
    pub fn azimuth_elevation(self) -> (f64, f64) {
        let z = self.z.clamp(-1.0, 1.0);
        let elevation = asin(z);
        let azimuth = if self.is_polar() {
            0.0
        } else {
            wrap_two_pi(atan2(self.y, self.x))
        };
        (azimuth, elevation)
    }

    /// Data-view angles `(alpha, beta)`.
    #[inline]
    pub fn to_data_view(self) -> (f64, f64) {
        let (azimuth, elevation) = self.azimuth_elevation();
        (azimuth, elevation + FRAC_PI_2)
    }

    /// Object-view angles `(phi, theta)`.
    #[inline]
    pub fn to_object_view(self) -> (f64, f64) {
        self.azimuth_elevation()
    }

    /// `true` if the direction points (numerically) straight at a pole.
    #[inline]
    pub fn is_polar(self) -> bool {
        sqrt(self.x * self.x + self.y * self.y) < POLE_EPSILON
    }

    /// Squared chord length between two unit vectors.
    ///
    /// Monotonic in the great-circle angle, so it is enough for ranking.
    #[inline]
    pub fn chord_squared(self, other: Direction) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Great-circle angle to `other` in radians.
    #[inline]
    pub fn angle_to(self, other: Direction) -> f64 {
        let half_chord = sqrt(self.chord_squared(other)) * 0.5;
        2.0 * asin(half_chord.min(1.0))
    }
}
