//! Scattered-to-grid volatility surface construction.
//!
//! Calibrated quotes form a cloud of `(time, strike, value)` points. This
//! module turns that cloud into a regular grid suitable for plotting:
//!
//! - [`select_points`] — pick the scalar field ([`DisplayMode`]) feeding the surface
//! - [`SurfaceBuilder`] — triangulate the points and linearly interpolate onto the grid
//! - [`SurfaceGrid`] — the resulting rectilinear grid, `None` outside the data's convex hull

pub mod builder;
pub mod field;
pub(crate) mod interp;
pub(crate) mod triangulation;

pub use builder::{DEFAULT_AXIS_RESOLUTION, SurfaceBuilder};
pub use field::{AxisLabels, DisplayMode, select_points, vol_diff};

use serde::{Deserialize, Serialize};

/// One scattered sample of the field being interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    /// Time to expiry in years.
    pub time: f64,
    pub strike: f64,
    pub value: f64,
}

/// A regular grid over time-to-expiry × strike.
///
/// Laid out like `meshgrid(times, strikes)`: row `i` is `strikes[i]`,
/// column `j` is `times[j]`, so `x[i][j] == times[j]` and
/// `y[i][j] == strikes[i]`. A `None` in `z` marks a node outside the convex
/// hull of the input points, or every node when the input is degenerate.
///
/// # Examples
/// ```
/// use volgrid::surface::{SurfaceBuilder, SurfacePoint};
///
/// let grid = SurfaceBuilder::new()
///     .axis_resolution(5)
///     .add_points([
///         SurfacePoint { time: 0.1, strike: 90.0, value: 0.25 },
///         SurfacePoint { time: 0.1, strike: 110.0, value: 0.30 },
///         SurfacePoint { time: 1.0, strike: 100.0, value: 0.22 },
///     ])
///     .build()?;
///
/// assert_eq!(grid.times.len(), 5);
/// // Row 2 is strike 100, column 0 is time 0.1: the midpoint of two samples.
/// assert!((grid.value_at(2, 0).unwrap() - 0.275).abs() < 1e-12);
/// // The corner (t = 1.0, K = 90) lies outside the triangle.
/// assert_eq!(grid.value_at(0, 4), None);
/// # Ok::<(), volgrid::VolGridError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGrid {
    pub times: Vec<f64>,
    pub strikes: Vec<f64>,
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub z: Vec<Vec<Option<f64>>>,
}

impl SurfaceGrid {
    /// Assemble the meshgrid arrays around already-evaluated `z` rows.
    pub(crate) fn from_axes(times: Vec<f64>, strikes: Vec<f64>, z: Vec<Vec<Option<f64>>>) -> Self {
        let x = strikes.iter().map(|_| times.clone()).collect();
        let y = strikes.iter().map(|&k| vec![k; times.len()]).collect();
        Self {
            times,
            strikes,
            x,
            y,
            z,
        }
    }

    /// `(rows, cols)`, i.e. `(strikes.len(), times.len())`.
    pub fn shape(&self) -> (usize, usize) {
        (self.strikes.len(), self.times.len())
    }

    /// Value at grid node `(row, col)`; `None` if undefined or out of range.
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        self.z.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Number of nodes holding an interpolated value.
    pub fn defined_count(&self) -> usize {
        self.z.iter().flatten().filter(|v| v.is_some()).count()
    }

    pub fn is_fully_undefined(&self) -> bool {
        self.defined_count() == 0
    }
}
