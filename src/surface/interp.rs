//! Piecewise-linear interpolation over a Delaunay triangulation.

use std::collections::HashSet;

use crate::surface::SurfacePoint;
use crate::surface::triangulation::{self, GEOM_EPS, UnitScale};

type Pt = [f64; 2];

/// Linear interpolant of scattered `(time, strike) → value` samples.
///
/// Queries inside the convex hull of the sites are answered from the
/// enclosing triangle; queries outside it are `None`.
#[derive(Debug, Clone)]
pub(crate) struct LinearInterpolator {
    scale: UnitScale,
    sites: Vec<Pt>,
    values: Vec<f64>,
    triangles: Vec<[usize; 3]>,
    hull: Vec<Pt>,
}

impl LinearInterpolator {
    /// Triangulate `points`, or `None` if they do not span a 2D region.
    ///
    /// Non-finite points are ignored and repeated `(time, strike)` sites keep
    /// their first value.
    pub(crate) fn new(points: &[SurfacePoint]) -> Option<Self> {
        let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(points.len());
        let mut raw: Vec<Pt> = Vec::with_capacity(points.len());
        let mut values: Vec<f64> = Vec::with_capacity(points.len());
        for p in points {
            if !(p.time.is_finite() && p.strike.is_finite() && p.value.is_finite()) {
                continue;
            }
            // `+ 0.0` folds -0.0 onto 0.0 so both hash alike.
            let key = ((p.time + 0.0).to_bits(), (p.strike + 0.0).to_bits());
            if seen.insert(key) {
                raw.push([p.time, p.strike]);
                values.push(p.value);
            }
        }
        if raw.len() < 3 {
            return None;
        }

        let scale = UnitScale::fit(&raw)?;
        let sites: Vec<Pt> = raw.iter().map(|&p| scale.apply(p)).collect();
        let hull = triangulation::convex_hull(&sites);
        if hull.len() < 3 {
            return None;
        }
        let triangles = triangulation::delaunay(&sites);
        if triangles.is_empty() {
            return None;
        }

        Some(Self {
            scale,
            sites,
            values,
            triangles,
            hull,
        })
    }

    pub(crate) fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub(crate) fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Interpolated value at `(time, strike)`, `None` outside the hull.
    pub(crate) fn eval(&self, time: f64, strike: f64) -> Option<f64> {
        if !time.is_finite() || !strike.is_finite() {
            return None;
        }
        let q = self.scale.apply([time, strike]);
        if !triangulation::hull_contains(&self.hull, q) {
            return None;
        }

        // The containing triangle maximises the smallest barycentric weight.
        // Points on the hull boundary that fall in a numerically missing
        // sliver get the nearest triangle's clamped weights instead.
        let mut best: Option<([usize; 3], [f64; 3])> = None;
        let mut best_min = f64::NEG_INFINITY;
        for tri in &self.triangles {
            let w = self.barycentric(tri, q);
            let min = w[0].min(w[1]).min(w[2]);
            if min > best_min {
                best_min = min;
                best = Some((*tri, w));
                if min >= -GEOM_EPS {
                    break;
                }
            }
        }

        let (tri, w) = best?;
        let clamped = w.map(|x| x.max(0.0));
        let total: f64 = clamped.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let value = (0..3)
            .map(|i| clamped[i] * self.values[tri[i]])
            .sum::<f64>()
            / total;
        Some(value)
    }

    fn barycentric(&self, tri: &[usize; 3], q: Pt) -> [f64; 3] {
        let (a, b, c) = (self.sites[tri[0]], self.sites[tri[1]], self.sites[tri[2]]);
        let area = triangulation::orient(a, b, c);
        [
            triangulation::orient(b, c, q) / area,
            triangulation::orient(c, a, q) / area,
            triangulation::orient(a, b, q) / area,
        ]
    }
}
