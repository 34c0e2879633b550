//! Builder that interpolates scattered points onto a [`SurfaceGrid`].
//!
//! ```
//! use volgrid::surface::{SurfaceBuilder, SurfacePoint};
//!
//! let points: Vec<SurfacePoint> = [(0.25, 90.0, 0.24), (0.25, 110.0, 0.21), (1.0, 90.0, 0.22), (1.0, 110.0, 0.20)]
//!     .iter()
//!     .map(|&(time, strike, value)| SurfacePoint { time, strike, value })
//!     .collect();
//!
//! let grid = SurfaceBuilder::new().add_points(points).build().unwrap();
//! assert_eq!(grid.shape(), (30, 30));
//! assert_eq!(grid.defined_count(), 900);
//! ```

use crate::error::VolGridError;
use crate::surface::interp::LinearInterpolator;
use crate::surface::{SurfaceGrid, SurfacePoint};
use crate::types::{Strike, Tenor};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Samples per axis when none is configured.
pub const DEFAULT_AXIS_RESOLUTION: usize = 30;

/// Builds a regular grid from scattered `(time, strike, value)` points.
///
/// Axes span the observed `[min, max]` time and strike ranges with
/// `axis_resolution` evenly spaced samples each. Every node is evaluated by
/// piecewise-linear interpolation over a Delaunay triangulation of the
/// points. Nodes outside the convex hull are `None`; so is every node when
/// fewer than three non-collinear points are supplied.
///
/// The builder does not care which quantity `value` holds.
///
/// # Examples
///
/// ```
/// use volgrid::surface::{SurfaceBuilder, SurfacePoint};
///
/// let grid = SurfaceBuilder::new()
///     .axis_resolution(10)
///     .add_point(SurfacePoint { time: 0.2, strike: 95.0, value: 0.3 })
///     .add_point(SurfacePoint { time: 0.8, strike: 105.0, value: 0.2 })
///     .build()?;
///
/// // Two points cannot be triangulated.
/// assert!(grid.is_fully_undefined());
/// assert_eq!(grid.times.first(), Some(&0.2));
/// assert_eq!(grid.times.last(), Some(&0.8));
/// # Ok::<(), volgrid::VolGridError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SurfaceBuilder {
    axis_resolution: usize,
    points: Vec<SurfacePoint>,
}

impl SurfaceBuilder {
    /// Create a builder with a 30 × 30 grid and no points.
    pub fn new() -> Self {
        Self {
            axis_resolution: DEFAULT_AXIS_RESOLUTION,
            points: Vec::new(),
        }
    }

    /// Set the number of samples per axis (at least 2).
    pub fn axis_resolution(mut self, n: usize) -> Self {
        self.axis_resolution = n;
        self
    }

    pub fn add_point(mut self, point: SurfacePoint) -> Self {
        self.points.push(point);
        self
    }

    pub fn add_points(mut self, points: impl IntoIterator<Item = SurfacePoint>) -> Self {
        self.points.extend(points);
        self
    }

    /// Interpolate the points onto the grid.
    ///
    /// An empty (or entirely non-finite) point set yields an empty grid.
    ///
    /// # Errors
    /// Returns [`VolGridError::InvalidInput`] if the axis resolution is below 2.
    pub fn build(self) -> crate::error::Result<SurfaceGrid> {
        if self.axis_resolution < 2 {
            return Err(VolGridError::InvalidInput {
                message: format!(
                    "axis resolution must be at least 2, got {}",
                    self.axis_resolution
                ),
            });
        }

        let finite: Vec<SurfacePoint> = self
            .points
            .into_iter()
            .filter(|p| p.time.is_finite() && p.strike.is_finite() && p.value.is_finite())
            .collect();

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_points = finite.len(),
            resolution = self.axis_resolution,
            "surface build started"
        );

        let Some(((t_lo, t_hi), (k_lo, k_hi))) = axis_ranges(&finite) else {
            return Ok(SurfaceGrid::from_axes(Vec::new(), Vec::new(), Vec::new()));
        };
        let times = linspace(t_lo, t_hi, self.axis_resolution);
        let strikes = linspace(k_lo, k_hi, self.axis_resolution);

        let z = match LinearInterpolator::new(&finite) {
            Some(interp) => {
                #[cfg(feature = "logging")]
                tracing::debug!(
                    sites = interp.site_count(),
                    triangles = interp.triangle_count(),
                    "triangulation complete"
                );
                evaluate_rows(&interp, &times, &strikes)
            }
            None => {
                #[cfg(feature = "logging")]
                tracing::debug!("degenerate point set, grid left undefined");
                vec![vec![None; times.len()]; strikes.len()]
            }
        };

        let grid = SurfaceGrid::from_axes(times, strikes, z);

        #[cfg(feature = "logging")]
        tracing::debug!(
            defined = grid.defined_count(),
            t_min = t_lo,
            t_max = t_hi,
            k_min = k_lo,
            k_max = k_hi,
            "surface build complete"
        );

        Ok(grid)
    }

    /// Interpolate `points` at arbitrary `(tenor, strike)` queries.
    ///
    /// Each answer is `None` outside the convex hull, and all are `None` when
    /// the points cannot be triangulated.
    ///
    /// # Examples
    /// ```
    /// use volgrid::surface::{SurfaceBuilder, SurfacePoint};
    /// use volgrid::types::{Strike, Tenor};
    ///
    /// let points = [
    ///     SurfacePoint { time: 0.1, strike: 90.0, value: 0.25 },
    ///     SurfacePoint { time: 0.1, strike: 110.0, value: 0.30 },
    ///     SurfacePoint { time: 1.0, strike: 100.0, value: 0.22 },
    /// ];
    /// let out = SurfaceBuilder::interpolate(&points, &[(Tenor(0.1), Strike(100.0)), (Tenor(5.0), Strike(100.0))]);
    /// assert!((out[0].unwrap() - 0.275).abs() < 1e-12);
    /// assert_eq!(out[1], None);
    /// ```
    pub fn interpolate(points: &[SurfacePoint], queries: &[(Tenor, Strike)]) -> Vec<Option<f64>> {
        match LinearInterpolator::new(points) {
            Some(interp) => queries
                .iter()
                .map(|&(t, k)| interp.eval(t.0, k.0))
                .collect(),
            None => vec![None; queries.len()],
        }
    }
}

impl Default for SurfaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `((t_min, t_max), (k_min, k_max))`, or `None` for an empty set.
fn axis_ranges(points: &[SurfacePoint]) -> Option<((f64, f64), (f64, f64))> {
    let first = points.first()?;
    let init = ((first.time, first.time), (first.strike, first.strike));
    Some(points.iter().fold(init, |((tl, th), (kl, kh)), p| {
        (
            (tl.min(p.time), th.max(p.time)),
            (kl.min(p.strike), kh.max(p.strike)),
        )
    }))
}

/// `n` evenly spaced samples from `lo` to `hi`, endpoints exact.
fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let step = (hi - lo) / (n - 1) as f64;
    let mut out: Vec<f64> = (0..n).map(|i| lo + step * i as f64).collect();
    if let Some(last) = out.last_mut() {
        *last = hi;
    }
    out
}

fn evaluate_rows(
    interp: &LinearInterpolator,
    times: &[f64],
    strikes: &[f64],
) -> Vec<Vec<Option<f64>>> {
    let row = |&k: &f64| -> Vec<Option<f64>> { times.iter().map(|&t| interp.eval(t, k)).collect() };

    #[cfg(feature = "parallel")]
    return strikes.par_iter().map(row).collect();
    #[cfg(not(feature = "parallel"))]
    strikes.iter().map(row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pt(time: f64, strike: f64, value: f64) -> SurfacePoint {
        SurfacePoint {
            time,
            strike,
            value,
        }
    }

    fn triangle() -> Vec<SurfacePoint> {
        vec![pt(0.1, 90.0, 0.25), pt(0.1, 110.0, 0.30), pt(1.0, 100.0, 0.22)]
    }

    #[test]
    fn default_grid_is_30_by_30() {
        let grid = SurfaceBuilder::new().add_points(triangle()).build().unwrap();
        assert_eq!(grid.shape(), (30, 30));
        assert_eq!(grid.z.len(), 30);
        assert!(grid.z.iter().all(|row| row.len() == 30));
        assert_eq!(grid.times[0], 0.1);
        assert_eq!(grid.times[29], 1.0);
        assert_eq!(grid.strikes[0], 90.0);
        assert_eq!(grid.strikes[29], 110.0);
    }

    #[test]
    fn near_node_interpolates_between_short_dated_points() {
        // Odd resolution puts strike 100 exactly on the grid.
        let grid = SurfaceBuilder::new()
            .axis_resolution(21)
            .add_points(triangle())
            .build()
            .unwrap();
        assert_abs_diff_eq!(grid.strikes[10], 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.value_at(10, 0).unwrap(), 0.275, epsilon = 1e-9);
    }

    #[test]
    fn far_query_is_undefined() {
        let out = SurfaceBuilder::interpolate(
            &triangle(),
            &[(Tenor(5.0), Strike(100.0)), (Tenor(0.5), Strike(100.0))],
        );
        assert_eq!(out[0], None);
        assert!(out[1].is_some());
    }

    #[test]
    fn triangle_masks_corners() {
        let grid = SurfaceBuilder::new()
            .axis_resolution(11)
            .add_points(triangle())
            .build()
            .unwrap();
        // Far-time corners at the extreme strikes are outside the triangle.
        assert_eq!(grid.value_at(0, 10), None);
        assert_eq!(grid.value_at(10, 10), None);
        // The apex (t = 1, K = 100) is a data point.
        assert_abs_diff_eq!(grid.value_at(5, 10).unwrap(), 0.22, epsilon = 1e-9);
        assert!(grid.defined_count() > 0);
        assert!(grid.defined_count() < 121);
    }

    #[test]
    fn defined_values_stay_within_input_range() {
        let grid = SurfaceBuilder::new().add_points(triangle()).build().unwrap();
        for v in grid.z.iter().flatten().flatten() {
            assert!((0.22 - 1e-12..=0.30 + 1e-12).contains(v), "value {v}");
        }
    }

    #[test]
    fn rectangle_of_points_fills_grid() {
        let pts = vec![
            pt(0.25, 80.0, 0.3),
            pt(0.25, 120.0, 0.26),
            pt(2.0, 80.0, 0.24),
            pt(2.0, 120.0, 0.22),
        ];
        let grid = SurfaceBuilder::new().add_points(pts).build().unwrap();
        assert_eq!(grid.defined_count(), 900);
    }

    #[test]
    fn fewer_than_three_points_leaves_grid_undefined() {
        let grid = SurfaceBuilder::new()
            .add_points(triangle().into_iter().take(2))
            .build()
            .unwrap();
        assert_eq!(grid.shape(), (30, 30));
        assert!(grid.is_fully_undefined());
    }

    #[test]
    fn collinear_points_leave_grid_undefined() {
        let pts = vec![pt(0.1, 90.0, 0.2), pt(0.2, 100.0, 0.21), pt(0.3, 110.0, 0.22)];
        let grid = SurfaceBuilder::new().add_points(pts).build().unwrap();
        assert!(grid.is_fully_undefined());
        assert_eq!(grid.times[0], 0.1);
        assert_eq!(grid.strikes[29], 110.0);
    }

    #[test]
    fn empty_input_yields_empty_grid() {
        let grid = SurfaceBuilder::new().build().unwrap();
        assert_eq!(grid.shape(), (0, 0));
        assert!(grid.is_fully_undefined());
    }

    #[test]
    fn non_finite_points_do_not_stretch_axes() {
        let mut pts = triangle();
        pts.push(pt(f64::INFINITY, 100.0, 0.2));
        pts.push(pt(0.5, 300.0, f64::NAN));
        let grid = SurfaceBuilder::new().add_points(pts).build().unwrap();
        assert_eq!(grid.times[29], 1.0);
        assert_eq!(grid.strikes[29], 110.0);
    }

    #[test]
    fn resolution_below_two_is_rejected() {
        for n in [0, 1] {
            let result = SurfaceBuilder::new()
                .axis_resolution(n)
                .add_points(triangle())
                .build();
            assert!(matches!(result, Err(VolGridError::InvalidInput { .. })));
        }
    }

    #[test]
    fn linspace_hits_both_endpoints() {
        let xs = linspace(0.1, 0.7, 7);
        assert_eq!(xs.len(), 7);
        assert_eq!(xs[0], 0.1);
        assert_eq!(xs[6], 0.7);
        assert_abs_diff_eq!(xs[3], 0.4, epsilon = 1e-15);
    }
}
