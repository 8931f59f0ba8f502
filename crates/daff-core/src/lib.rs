//! DAFF Core - spherical sampling geometry for directional audio data
//!
//! A DAFF file samples some directional quantity (an HRIR, a loudspeaker
//! directivity, a microphone pattern) on a regular grid over the sphere.
//! This crate holds the geometry that every reader needs regardless of the
//! payload type:
//!
//! - [`angle`] - Angle wrapping and degree/radian helpers
//! - [`direction`] - Unit vectors and the two spherical views ([`View`])
//! - [`orientation`] - Yaw/pitch/roll orientation and the view transform
//! - [`grid`] - The equi-angular sampling grid and nearest-neighbour search
//!
//! # Views
//!
//! Records are addressed on disk in the **data view** `(alpha, beta)`:
//! alpha is the azimuth in `[0, 2π)`, beta the polar angle in `[0, π]`
//! measured from the south pole. Callers query in the **object view**
//! `(phi, theta)`: phi azimuth in `[0, 2π)`, theta elevation in
//! `[-π/2, π/2]`. The two are related by the file's [`Orientation`].
//!
//! All public angles in this crate are radians. The only degree values are
//! the raw grid description ([`GridSpec`]) and [`Orientation`], which mirror
//! what is stored in the file.
//!
//! # Example
//!
//! ```rust
//! use daff_core::{GridSpec, SphericalGrid};
//!
//! // 5° azimuth steps, elevation from pole to pole
//! let grid = SphericalGrid::new(GridSpec {
//!     alpha_points: 72,
//!     alpha_start: 0.0,
//!     alpha_end: 355.0,
//!     beta_points: 37,
//!     beta_start: 0.0,
//!     beta_end: 180.0,
//! })
//! .unwrap();
//!
//! assert!(grid.covers_full_sphere());
//! assert_eq!(grid.num_records(), 72 * 35 + 2);
//!
//! let hit = grid.nearest(0.0, core::f64::consts::FRAC_PI_2);
//! assert!(!hit.out_of_bounds);
//! ```
//!
//! # no_std Support
//!
//! Disable the default `std` feature to use the geometry on embedded
//! targets. Trigonometry goes through `libm` and the grid only needs `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod angle;
pub mod direction;
pub mod grid;
pub mod orientation;

pub use angle::{ANGLE_TOLERANCE, angular_difference, wrap_two_pi};
pub use direction::{Direction, View};
pub use grid::{GridError, GridSpec, Nearest, SphericalGrid};
pub use orientation::{Orientation, Rotation, ViewTransform};
