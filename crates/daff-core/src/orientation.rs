//! Yaw/pitch/roll orientation and the data-view ↔ object-view transform.
//!
//! A DAFF file stores a default orientation that rotates its data frame
//! into the object frame. The rotation is applied as
//! `R = Rz(yaw) · Ry(pitch) · Rx(roll)`, where positive yaw turns +x
//! towards +y, positive pitch raises +x towards +z and positive roll turns
//! +y towards +z.
//!
//! ```rust
//! use daff_core::{Orientation, ViewTransform};
//! use core::f64::consts::FRAC_PI_2;
//!
//! let transform = ViewTransform::new(Orientation::new(90.0, 0.0, 0.0));
//! let (phi, theta) = transform.data_to_object(0.0, FRAC_PI_2);
//! assert!((phi - FRAC_PI_2).abs() < 1e-9);
//! assert!(theta.abs() < 1e-9);
//! ```

use libm::{cos, sin};

use crate::direction::Direction;

/// Orientation as yaw, pitch and roll in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Rotation about +z in degrees.
    pub yaw: f32,
    /// Rotation raising +x towards +z, in degrees.
    pub pitch: f32,
    /// Rotation about +x in degrees.
    pub roll: f32,
}

impl Orientation {
    /// No rotation.
    pub const IDENTITY: Orientation = Orientation {
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    /// Create an orientation from yaw, pitch and roll in degrees.
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// `true` if all three angles are zero.
    pub fn is_identity(&self) -> bool {
        self.yaw == 0.0 && self.pitch == 0.0 && self.roll == 0.0
    }

    /// `true` if all three angles are finite.
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }

    /// Rotation matrix for this orientation.
    pub fn rotation(&self) -> Rotation {
        Rotation::from_orientation(*self)
    }
}

/// Orthonormal 3×3 rotation matrix (row-major).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    m: [[f64; 3]; 3],
}

impl Rotation {
    /// The identity rotation.
    pub const IDENTITY: Rotation = Rotation {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Build `Rz(yaw) · Ry(pitch) · Rx(roll)`.
    pub fn from_orientation(orientation: Orientation) -> Self {
        if orientation.is_identity() {
            return Self::IDENTITY;
        }

        let (sy, cy) = sin_cos_deg(orientation.yaw);
        let (sp, cp) = sin_cos_deg(orientation.pitch);
        let (sr, cr) = sin_cos_deg(orientation.roll);

        let rz = [[cy, -sy, 0.0], [sy, cy, 0.0], [0.0, 0.0, 1.0]];
        let ry = [[cp, 0.0, -sp], [0.0, 1.0, 0.0], [sp, 0.0, cp]];
        let rx = [[1.0, 0.0, 0.0], [0.0, cr, -sr], [0.0, sr, cr]];

        Self {
            m: mat_mul(&mat_mul(&rz, &ry), &rx),
        }
    }

    /// Rotate a direction.
    #[inline]
    pub fn apply(&self, d: Direction) -> Direction {
        let m = &self.m;
        Direction {
            x: m[0][0] * d.x + m[0][1] * d.y + m[0][2] * d.z,
            y: m[1][0] * d.x + m[1][1] * d.y + m[1][2] * d.z,
            z: m[2][0] * d.x + m[2][1] * d.y + m[2][2] * d.z,
        }
    }

    /// Rotate a direction by the inverse (transpose) rotation.
    #[inline]
    pub fn apply_inverse(&self, d: Direction) -> Direction {
        let m = &self.m;
        Direction {
            x: m[0][0] * d.x + m[1][0] * d.y + m[2][0] * d.z,
            y: m[0][1] * d.x + m[1][1] * d.y + m[2][1] * d.z,
            z: m[0][2] * d.x + m[1][2] * d.y + m[2][2] * d.z,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Converts angles between the data view and the object view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    orientation: Orientation,
    rotation: Rotation,
}

impl ViewTransform {
    /// Create a transform for the given orientation.
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            rotation: orientation.rotation(),
        }
    }

    /// The orientation this transform was built from.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Data-frame direction → object-frame direction.
    #[inline]
    pub fn data_to_object_direction(&self, d: Direction) -> Direction {
        self.rotation.apply(d)
    }

    /// Object-frame direction → data-frame direction.
    #[inline]
    pub fn object_to_data_direction(&self, d: Direction) -> Direction {
        self.rotation.apply_inverse(d)
    }

    /// `(alpha, beta)` → `(phi, theta)`, radians.
    pub fn data_to_object(&self, alpha: f64, beta: f64) -> (f64, f64) {
        self.data_to_object_direction(Direction::from_data_view(alpha, beta))
            .to_object_view()
    }

    /// `(phi, theta)` → `(alpha, beta)`, radians.
    pub fn object_to_data(&self, phi: f64, theta: f64) -> (f64, f64) {
        self.object_to_data_direction(Direction::from_object_view(phi, theta))
            .to_data_view()
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(Orientation::IDENTITY)
    }
}

#[inline]
fn sin_cos_deg(deg: f32) -> (f64, f64) {
    let rad = f64::from(deg).to_radians();
    (sin(rad), cos(rad))
}

fn mat_mul(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}
