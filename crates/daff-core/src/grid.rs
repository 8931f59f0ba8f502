//! Equi-angular spherical sampling grid and nearest-neighbour search.
//!
//! A DAFF grid is described by an alpha (azimuth) range and a beta (polar)
//! range, each with a point count. Records are laid out beta row by beta
//! row, alpha ascending within a row. A row sitting exactly on a pole
//! (beta = 0° or 180°) collapses to a single record, since every alpha
//! names the same direction there.
//!
//! # Nearest neighbour
//!
//! [`SphericalGrid::nearest`] works per beta row: the two alpha samples
//! around the query are found directly from the grid step, so a lookup
//! costs O(beta points) distance evaluations rather than a scan over every
//! record. Candidates are ranked by chord length, which is monotonic in
//! the great-circle angle. Candidates whose squared chords differ by less
//! than [`TIE_EPSILON`] are treated as equidistant and the lower record
//! index wins.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f64::consts::{PI, TAU};

use libm::{cos, fabs, floor, sin};

use crate::angle::{ANGLE_TOLERANCE, approx_eq, within, wrap_two_pi};
use crate::direction::Direction;

/// Squared-chord difference below which two candidates count as a tie.
pub const TIE_EPSILON: f64 = 1e-12;

/// Tolerance in degrees for grid descriptions read from `f32` fields.
const DEGREE_TOLERANCE: f64 = 1e-4;

/// Raw grid description as stored in a DAFF main header (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Number of azimuth samples per (non-pole) row.
    pub alpha_points: u32,
    /// First azimuth sample in degrees.
    pub alpha_start: f32,
    /// Last azimuth sample in degrees.
    pub alpha_end: f32,
    /// Number of beta rows.
    pub beta_points: u32,
    /// First beta row in degrees (0 = south pole).
    pub beta_start: f32,
    /// Last beta row in degrees (180 = north pole).
    pub beta_end: f32,
}

/// Reasons a grid description is rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridError {
    /// Alpha point count is zero.
    NoAlphaPoints,
    /// Beta point count is zero.
    NoBetaPoints,
    /// A range bound is NaN or infinite.
    NonFiniteRange,
    /// Alpha range is negative, spans 360° or more, or does not match the point count.
    InvalidAlphaRange {
        /// Declared start in degrees.
        start: f32,
        /// Declared end in degrees.
        end: f32,
    },
    /// Beta range leaves `[0, 180]`, is reversed, or does not match the point count.
    InvalidBetaRange {
        /// Declared start in degrees.
        start: f32,
        /// Declared end in degrees.
        end: f32,
    },
}

impl core::fmt::Display for GridError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoAlphaPoints => write!(f, "grid has no alpha points"),
            Self::NoBetaPoints => write!(f, "grid has no beta points"),
            Self::NonFiniteRange => write!(f, "grid range is not finite"),
            Self::InvalidAlphaRange { start, end } => {
                write!(f, "invalid alpha range [{start}°, {end}°]")
            }
            Self::InvalidBetaRange { start, end } => {
                write!(f, "invalid beta range [{start}°, {end}°]")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GridError {}

/// Result of a nearest-neighbour lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nearest {
    /// Index of the closest sampled record.
    pub record: usize,
    /// The query direction lies outside the grid's angular coverage.
    pub out_of_bounds: bool,
}

#[derive(Debug, Clone, Copy)]
struct Row {
    /// Beta angle of the row in radians.
    beta: f64,
    sin_elevation: f64,
    cos_elevation: f64,
    first_record: usize,
    pole: bool,
}

/// Equi-angular sampling grid over (part of) the sphere.
#[derive(Debug, Clone)]
pub struct SphericalGrid {
    spec: GridSpec,
    alpha_points: usize,
    /// Alpha start in radians, wrapped to [0, 2π).
    alpha_start: f64,
    /// Alpha span (end - start) in radians.
    alpha_span: f64,
    alpha_resolution: f64,
    full_circle: bool,
    beta_start: f64,
    beta_end: f64,
    beta_resolution: f64,
    rows: Vec<Row>,
    num_records: usize,
}

impl SphericalGrid {
    /// Validate a grid description and precompute its rows.
    pub fn new(spec: GridSpec) -> Result<Self, GridError> {
        if spec.alpha_points == 0 {
            return Err(GridError::NoAlphaPoints);
        }
        if spec.beta_points == 0 {
            return Err(GridError::NoBetaPoints);
        }
        let bounds = [spec.alpha_start, spec.alpha_end, spec.beta_start, spec.beta_end];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(GridError::NonFiniteRange);
        }

        let alpha_err = GridError::InvalidAlphaRange {
            start: spec.alpha_start,
            end: spec.alpha_end,
        };
        let alpha_span_deg = f64::from(spec.alpha_end) - f64::from(spec.alpha_start);
        let alpha_resolution_deg = step(spec.alpha_points, alpha_span_deg).ok_or(alpha_err)?;
        if alpha_span_deg >= 360.0 - DEGREE_TOLERANCE {
            return Err(alpha_err);
        }
        let full_circle = spec.alpha_points > 1
            && fabs(alpha_resolution_deg * f64::from(spec.alpha_points) - 360.0)
                < DEGREE_TOLERANCE * f64::from(spec.alpha_points);

        let beta_err = GridError::InvalidBetaRange {
            start: spec.beta_start,
            end: spec.beta_end,
        };
        let beta_start_deg = f64::from(spec.beta_start);
        let beta_end_deg = f64::from(spec.beta_end);
        if beta_start_deg < -DEGREE_TOLERANCE || beta_end_deg > 180.0 + DEGREE_TOLERANCE {
            return Err(beta_err);
        }
        let beta_resolution_deg =
            step(spec.beta_points, beta_end_deg - beta_start_deg).ok_or(beta_err)?;

        let alpha_points = spec.alpha_points as usize;
        let mut rows = Vec::new();
        let mut next_record = 0usize;
        for b in 0..spec.beta_points {
            let beta_deg = beta_start_deg + f64::from(b) * beta_resolution_deg;
            let pole = fabs(beta_deg) < DEGREE_TOLERANCE || fabs(beta_deg - 180.0) < DEGREE_TOLERANCE;
            let beta = beta_deg.to_radians();
            let elevation = beta - core::f64::consts::FRAC_PI_2;
            rows.push(Row {
                beta,
                sin_elevation: sin(elevation),
                cos_elevation: cos(elevation),
                first_record: next_record,
                pole,
            });
            next_record += if pole { 1 } else { alpha_points };
        }

        Ok(Self {
            spec,
            alpha_points,
            alpha_start: wrap_two_pi(f64::from(spec.alpha_start).to_radians()),
            alpha_span: alpha_span_deg.to_radians(),
            alpha_resolution: alpha_resolution_deg.to_radians(),
            full_circle,
            beta_start: beta_start_deg.to_radians(),
            beta_end: beta_end_deg.to_radians(),
            beta_resolution: beta_resolution_deg.to_radians(),
            rows,
            num_records: next_record,
        })
    }

    /// The description this grid was built from.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Total number of records on the grid (pole rows count once).
    pub fn num_records(&self) -> usize {
        self.num_records
    }

    /// Number of beta rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Alpha step in radians (zero for a single alpha point).
    pub fn alpha_resolution(&self) -> f64 {
        self.alpha_resolution
    }

    /// Beta step in radians (zero for a single beta row).
    pub fn beta_resolution(&self) -> f64 {
        self.beta_resolution
    }

    /// `true` if the alpha samples wrap all the way round.
    pub fn covers_full_circle(&self) -> bool {
        self.full_circle
    }

    /// `true` if the grid covers every direction: full alpha circle and
    /// beta from pole to pole.
    pub fn covers_full_sphere(&self) -> bool {
        self.full_circle && approx_eq(self.beta_start, 0.0) && approx_eq(self.beta_end, PI)
    }

    /// Data-view coordinates `(alpha, beta)` of a record, in radians.
    ///
    /// Returns `None` if `record` is out of range.
    pub fn record_direction(&self, record: usize) -> Option<(f64, f64)> {
        if record >= self.num_records {
            return None;
        }
        // rows are sorted by first_record; find the last row starting at or before `record`
        let row_index = self.rows.partition_point(|r| r.first_record <= record) - 1;
        let row = &self.rows[row_index];
        let alpha_index = record - row.first_record;
        Some((self.alpha_at(alpha_index), row.beta))
    }

    /// `true` if a data-view direction lies inside the sampled coverage.
    pub fn contains(&self, alpha: f64, beta: f64) -> bool {
        self.contains_direction(Direction::from_data_view(alpha, beta))
    }

    /// Find the record closest to a data-view direction `(alpha, beta)`.
    ///
    /// Angles need not be normalized; the query goes through its unit
    /// vector first. The closest record is always returned, with
    /// `out_of_bounds` set if the query lies outside the grid's coverage.
    pub fn nearest(&self, alpha: f64, beta: f64) -> Nearest {
        self.nearest_direction(Direction::from_data_view(alpha, beta))
    }

    /// Find the record closest to a data-frame unit vector.
    pub fn nearest_direction(&self, query: Direction) -> Nearest {
        // every sample of a row is equidistant from a pole
        let candidates = if query.is_polar() {
            [Some(0), None]
        } else {
            let (query_alpha, _) = query.to_data_view();
            self.alpha_candidates(query_alpha)
        };

        let mut best: Option<(f64, usize)> = None;
        for row in &self.rows {
            if row.pole {
                let d = self.row_direction(row, 0);
                consider(&mut best, query.chord_squared(d), row.first_record);
                continue;
            }
            for &alpha_index in candidates.iter().flatten() {
                let d = self.row_direction(row, alpha_index);
                consider(&mut best, query.chord_squared(d), row.first_record + alpha_index);
            }
        }

        // rows is never empty, so there is always a candidate
        let record = best.map_or(0, |(_, record)| record);
        let out_of_bounds = !self.contains_direction(query);

        #[cfg(feature = "tracing")]
        tracing::trace!(record, out_of_bounds, "grid_nearest");

        Nearest {
            record,
            out_of_bounds,
        }
    }

    fn contains_direction(&self, query: Direction) -> bool {
        let (alpha, beta) = query.to_data_view();
        if !within(beta, self.beta_start, self.beta_end) {
            return false;
        }
        if query.is_polar() || self.full_circle {
            return true;
        }
        let offset = wrap_two_pi(alpha - self.alpha_start);
        offset <= self.alpha_span + ANGLE_TOLERANCE || offset >= TAU - ANGLE_TOLERANCE
    }

    /// Alpha indices worth testing in every non-pole row.
    ///
    /// Within one row the chord grows with the circular alpha difference,
    /// so the samples either side of the query are the only contenders.
    /// Outside a partial range the closest sample is one of the two ends.
    fn alpha_candidates(&self, alpha: f64) -> [Option<usize>; 2] {
        let n = self.alpha_points;
        if n == 1 {
            return [Some(0), None];
        }
        let offset = wrap_two_pi(alpha - self.alpha_start);
        if self.full_circle {
            let lower = (floor(offset / self.alpha_resolution) as usize) % n;
            return [Some(lower), Some((lower + 1) % n)];
        }
        if offset <= self.alpha_span {
            let lower = (floor(offset / self.alpha_resolution) as usize).min(n - 1);
            return [Some(lower), Some((lower + 1).min(n - 1))];
        }
        [Some(0), Some(n - 1)]
    }

    #[inline]
    fn alpha_at(&self, alpha_index: usize) -> f64 {
        wrap_two_pi(self.alpha_start + alpha_index as f64 * self.alpha_resolution)
    }

    #[inline]
    fn row_direction(&self, row: &Row, alpha_index: usize) -> Direction {
        let alpha = self.alpha_at(alpha_index);
        Direction {
            x: row.cos_elevation * cos(alpha),
            y: row.cos_elevation * sin(alpha),
            z: row.sin_elevation,
        }
    }
}

/// Sample spacing for `points` samples spread over `span` degrees.
///
/// A single point needs a zero span; several points need a positive one.
fn step(points: u32, span: f64) -> Option<f64> {
    if points == 1 {
        return (fabs(span) < DEGREE_TOLERANCE).then_some(0.0);
    }
    (span > 0.0).then(|| span / f64::from(points - 1))
}

#[inline]
fn consider(best: &mut Option<(f64, usize)>, distance: f64, record: usize) {
    let replace = match *best {
        None => true,
        Some((best_distance, best_record)) => {
            distance < best_distance - TIE_EPSILON
                || (distance <= best_distance + TIE_EPSILON && record < best_record)
        }
    };
    if replace {
        *best = Some((distance, record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    fn full_sphere_5deg() -> SphericalGrid {
        SphericalGrid::new(GridSpec {
            alpha_points: 72,
            alpha_start: 0.0,
            alpha_end: 355.0,
            beta_points: 37,
            beta_start: 0.0,
            beta_end: 180.0,
        })
        .unwrap()
    }

    fn equator_quad() -> SphericalGrid {
        SphericalGrid::new(GridSpec {
            alpha_points: 4,
            alpha_start: 0.0,
            alpha_end: 270.0,
            beta_points: 1,
            beta_start: 90.0,
            beta_end: 90.0,
        })
        .unwrap()
    }

    #[test]
    fn pole_rows_collapse() {
        let grid = full_sphere_5deg();
        assert_eq!(grid.num_rows(), 37);
        assert_eq!(grid.num_records(), 2 + 35 * 72);
        assert!(grid.covers_full_circle());
        assert!(grid.covers_full_sphere());
    }

    #[test]
    fn record_direction_layout() {
        let grid = full_sphere_5deg();
        // record 0 is the south pole
        let (_, beta) = grid.record_direction(0).unwrap();
        assert!(beta.abs() < 1e-12);
        // record 1 starts the 5° row at alpha 0
        let (alpha, beta) = grid.record_direction(1).unwrap();
        assert!(alpha.abs() < 1e-12);
        assert!((beta - 5f64.to_radians()).abs() < 1e-9);
        // record 2 is the next alpha sample
        let (alpha, _) = grid.record_direction(2).unwrap();
        assert!((alpha - 5f64.to_radians()).abs() < 1e-9);
        // last record is the north pole
        let (_, beta) = grid.record_direction(grid.num_records() - 1).unwrap();
        assert!((beta - PI).abs() < 1e-9);
        assert!(grid.record_direction(grid.num_records()).is_none());
    }

    #[test]
    fn nearest_hits_exact_samples() {
        let grid = full_sphere_5deg();
        for record in [0, 1, 100, 1234, grid.num_records() - 1] {
            let (alpha, beta) = grid.record_direction(record).unwrap();
            let hit = grid.nearest(alpha, beta);
            assert_eq!(hit.record, record);
            assert!(!hit.out_of_bounds);
        }
    }

    #[test]
    fn nearest_rounds_to_closest_step() {
        let grid = full_sphere_5deg();
        // alpha 7° is closer to 5° than to 10°
        let hit = grid.nearest(7f64.to_radians(), FRAC_PI_2);
        let (alpha, beta) = grid.record_direction(hit.record).unwrap();
        assert!((alpha - 5f64.to_radians()).abs() < 1e-9);
        assert!((beta - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn nearest_wraps_past_last_alpha() {
        let grid = full_sphere_5deg();
        // 358° is closer to 0° than to 355°
        let hit = grid.nearest(358f64.to_radians(), FRAC_PI_2);
        let (alpha, _) = grid.record_direction(hit.record).unwrap();
        assert!(alpha.abs() < 1e-9);
    }

    #[test]
    fn near_pole_query_prefers_pole() {
        let grid = full_sphere_5deg();
        let hit = grid.nearest(1.0, 1f64.to_radians());
        assert_eq!(hit.record, 0);
    }

    #[test]
    fn tie_resolves_to_lower_index() {
        let grid = equator_quad();
        let hit = grid.nearest(45f64.to_radians(), FRAC_PI_2);
        assert_eq!(hit.record, 0);
        let hit = grid.nearest(135f64.to_radians(), FRAC_PI_2);
        assert_eq!(hit.record, 1);
        // across the wrap point: 270° (index 3) vs 0° (index 0)
        let hit = grid.nearest(315f64.to_radians(), FRAC_PI_2);
        assert_eq!(hit.record, 0);
    }

    #[test]
    fn out_of_bounds_for_partial_beta() {
        let grid = equator_quad();
        let hit = grid.nearest(0.0, FRAC_PI_2 + 0.5);
        assert_eq!(hit.record, 0);
        assert!(hit.out_of_bounds);
        assert!(!grid.covers_full_sphere());
    }

    #[test]
    fn partial_alpha_range_clamps_to_ends() {
        let grid = SphericalGrid::new(GridSpec {
            alpha_points: 7,
            alpha_start: 0.0,
            alpha_end: 180.0,
            beta_points: 1,
            beta_start: 90.0,
            beta_end: 90.0,
        })
        .unwrap();
        assert!(!grid.covers_full_circle());

        // 350° is 10° from alpha 0 and 170° from alpha 180
        let hit = grid.nearest(350f64.to_radians(), FRAC_PI_2);
        assert_eq!(hit.record, 0);
        assert!(hit.out_of_bounds);

        // 200° is closest to the last sample
        let hit = grid.nearest(200f64.to_radians(), FRAC_PI_2);
        assert_eq!(hit.record, 6);
        assert!(hit.out_of_bounds);

        let hit = grid.nearest(95f64.to_radians(), FRAC_PI_2);
        assert_eq!(hit.record, 3);
        assert!(!hit.out_of_bounds);
    }

    #[test]
    fn rejects_bad_descriptions() {
        let base = GridSpec {
            alpha_points: 4,
            alpha_start: 0.0,
            alpha_end: 270.0,
            beta_points: 3,
            beta_start: 0.0,
            beta_end: 180.0,
        };
        assert_eq!(
            SphericalGrid::new(GridSpec { alpha_points: 0, ..base }).unwrap_err(),
            GridError::NoAlphaPoints
        );
        assert_eq!(
            SphericalGrid::new(GridSpec { beta_points: 0, ..base }).unwrap_err(),
            GridError::NoBetaPoints
        );
        assert!(matches!(
            SphericalGrid::new(GridSpec { alpha_end: 360.0, alpha_points: 5, ..base }),
            Err(GridError::InvalidAlphaRange { .. })
        ));
        assert!(matches!(
            SphericalGrid::new(GridSpec { beta_end: 200.0, ..base }),
            Err(GridError::InvalidBetaRange { .. })
        ));
        assert!(matches!(
            SphericalGrid::new(GridSpec { beta_points: 1, ..base }),
            Err(GridError::InvalidBetaRange { .. })
        ));
        assert_eq!(
            SphericalGrid::new(GridSpec { alpha_start: f32::NAN, ..base }).unwrap_err(),
            GridError::NonFiniteRange
        );
    }

    #[test]
    fn grid_error_display() {
        let err = GridError::InvalidBetaRange { start: 10.0, end: 5.0 };
        assert_eq!(err.to_string(), "invalid beta range [10°, 5°]");
    }
}
