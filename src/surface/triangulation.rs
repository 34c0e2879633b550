//! Delaunay triangulation and convex hull of scattered 2D sites.
//!
//! Sites are triangulated with the Bowyer-Watson algorithm after an affine
//! map onto the unit square. The map leaves the convex hull and barycentric
//! coordinates unchanged while keeping circumcircle tests well conditioned
//! when the two axes differ by orders of magnitude (years vs. strike points).
//!
//! # References
//! - Bowyer, A. "Computing Dirichlet tessellations" (1981)
//! - Watson, D.F. "Computing the n-dimensional Delaunay tessellation" (1981)
//! - Andrew, A.M. "Another efficient algorithm for convex hulls in two dimensions" (1979)

/// Half-extent of the enclosing super-triangle, in unit-square coordinates.
const SUPER_SCALE: f64 = 1e5;

/// Orientation / hull tolerance in unit-square coordinates.
pub(crate) const GEOM_EPS: f64 = 1e-9;

type Pt = [f64; 2];

/// Twice the signed area of `(a, b, c)`; positive when counter-clockwise.
#[inline]
pub(crate) fn orient(a: Pt, b: Pt, c: Pt) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Affine map from data coordinates onto `[0, 1]²`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnitScale {
    origin: Pt,
    span: Pt,
}

impl UnitScale {
    /// Bounding-box scale of `points`, or `None` if either axis has zero extent.
    pub(crate) fn fit(points: &[Pt]) -> Option<Self> {
        let mut lo = [f64::INFINITY; 2];
        let mut hi = [f64::NEG_INFINITY; 2];
        for p in points {
            for axis in 0..2 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
        }
        let span = [hi[0] - lo[0], hi[1] - lo[1]];
        if !(span[0] > 0.0 && span[1] > 0.0) || !span[0].is_finite() || !span[1].is_finite() {
            return None;
        }
        Some(Self { origin: lo, span })
    }

    #[inline]
    pub(crate) fn apply(&self, p: Pt) -> Pt {
        [
            (p[0] - self.origin[0]) / self.span[0],
            (p[1] - self.origin[1]) / self.span[1],
        ]
    }
}

/// Convex hull in counter-clockwise order, collinear boundary points removed.
///
/// Returns fewer than three vertices when all points are collinear.
pub(crate) fn convex_hull(points: &[Pt]) -> Vec<Pt> {
    let mut sorted: Vec<Pt> = points.to_vec();
    sorted.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<Pt> = Vec::with_capacity(2 * sorted.len());
    for pass in [sorted.clone(), sorted.iter().rev().copied().collect()] {
        let start = hull.len();
        for p in pass {
            while hull.len() >= start + 2
                && orient(hull[hull.len() - 2], hull[hull.len() - 1], p) <= GEOM_EPS * GEOM_EPS
            {
                hull.pop();
            }
            hull.push(p);
        }
        // Last point of each chain is the first of the next.
        hull.pop();
    }
    hull
}

/// Whether `p` lies inside or on the CCW `hull`, within [`GEOM_EPS`].
pub(crate) fn hull_contains(hull: &[Pt], p: Pt) -> bool {
    if hull.len() < 3 {
        return false;
    }
    (0..hull.len()).all(|i| {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let len = ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt();
        orient(a, b, p) >= -GEOM_EPS * len
    })
}

#[derive(Debug, Clone, Copy)]
struct Triangle {
    v: [usize; 3],
    center: Pt,
    radius_sq: f64,
}

impl Triangle {
    fn new(v: [usize; 3], pts: &[Pt]) -> Self {
        let (a, b, c) = (pts[v[0]], pts[v[1]], pts[v[2]]);
        let d = 2.0 * orient(a, b, c);
        if d == 0.0 {
            return Self {
                v,
                center: [f64::NAN; 2],
                radius_sq: f64::INFINITY,
            };
        }
        let (bx, by) = (b[0] - a[0], b[1] - a[1]);
        let (cx, cy) = (c[0] - a[0], c[1] - a[1]);
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        Self {
            v,
            center: [a[0] + ux, a[1] + uy],
            radius_sq: ux * ux + uy * uy,
        }
    }

    fn circumcircle_contains(&self, p: Pt) -> bool {
        if self.radius_sq.is_infinite() {
            return true;
        }
        let dx = p[0] - self.center[0];
        let dy = p[1] - self.center[1];
        dx * dx + dy * dy < self.radius_sq
    }

    fn edges(&self) -> [(usize, usize); 3] {
        [
            (self.v[0], self.v[1]),
            (self.v[1], self.v[2]),
            (self.v[2], self.v[0]),
        ]
    }
}

/// Delaunay triangulation of distinct unit-square sites.
///
/// Triangles index into `sites` and are oriented counter-clockwise.
pub(crate) fn delaunay(sites: &[Pt]) -> Vec<[usize; 3]> {
    let n = sites.len();
    if n < 3 {
        return Vec::new();
    }

    let mut pts: Vec<Pt> = sites.to_vec();
    pts.push([0.5 - 2.0 * SUPER_SCALE, 0.5 - SUPER_SCALE]);
    pts.push([0.5 + 2.0 * SUPER_SCALE, 0.5 - SUPER_SCALE]);
    pts.push([0.5, 0.5 + 2.0 * SUPER_SCALE]);

    let mut triangles = vec![Triangle::new([n, n + 1, n + 2], &pts)];

    for i in 0..n {
        let p = pts[i];
        let mut bad: Vec<bool> = triangles.iter().map(|t| t.circumcircle_contains(p)).collect();

        // Shrink the cavity until every boundary edge sees `p` on its left,
        // so the re-triangulated cavity is star-shaped around `p`.
        let boundary = loop {
            let boundary = cavity_boundary(&triangles, &bad);
            let offender = boundary
                .iter()
                .find(|&&(a, b, owner)| {
                    orient(pts[a], pts[b], p) <= 0.0
                        && !contains_point(&triangles[owner], &pts, p)
                })
                .map(|&(_, _, owner)| owner);
            match offender {
                Some(owner) => bad[owner] = false,
                None => break boundary,
            }
        };

        let mut kept: Vec<Triangle> = triangles
            .iter()
            .zip(&bad)
            .filter(|&(_, &is_bad)| !is_bad)
            .map(|(t, _)| *t)
            .collect();
        for (a, b, _) in boundary {
            if orient(pts[a], pts[b], p) > 0.0 {
                kept.push(Triangle::new([a, b, i], &pts));
            }
        }
        triangles = kept;
    }

    triangles
        .into_iter()
        .filter(|t| t.v.iter().all(|&v| v < n))
        .map(|t| t.v)
        .collect()
}

/// Edges of the bad region that are not shared by two bad triangles, with
/// the index of the bad triangle that owns each.
fn cavity_boundary(triangles: &[Triangle], bad: &[bool]) -> Vec<(usize, usize, usize)> {
    let mut edges: Vec<(usize, usize, usize)> = Vec::new();
    for (idx, tri) in triangles.iter().enumerate() {
        if !bad[idx] {
            continue;
        }
        for (a, b) in tri.edges() {
            edges.push((a, b, idx));
        }
    }
    edges
        .iter()
        .filter(|&&(a, b, _)| !edges.iter().any(|&(c, d, _)| c == b && d == a))
        .copied()
        .collect()
}

fn contains_point(tri: &Triangle, pts: &[Pt], p: Pt) -> bool {
    tri.edges()
        .iter()
        .all(|&(a, b)| orient(pts[a], pts[b], p) >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn area(tri: &[usize; 3], pts: &[Pt]) -> f64 {
        0.5 * orient(pts[tri[0]], pts[tri[1]], pts[tri[2]])
    }

    fn hull_area(hull: &[Pt]) -> f64 {
        (0..hull.len())
            .map(|i| {
                let a = hull[i];
                let b = hull[(i + 1) % hull.len()];
                a[0] * b[1] - b[0] * a[1]
            })
            .sum::<f64>()
            * 0.5
    }

    #[test]
    fn unit_square_two_triangles() {
        let pts = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let tris = delaunay(&pts);
        assert_eq!(tris.len(), 2);
        let total: f64 = tris.iter().map(|t| area(t, &pts)).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        assert!(tris.iter().all(|t| area(t, &pts) > 0.0));
    }

    #[test]
    fn lattice_triangulation_covers_hull() {
        // 5 x 4 lattice: many cocircular quadruples.
        let mut pts = Vec::new();
        for i in 0..5 {
            for j in 0..4 {
                pts.push([i as f64 / 4.0, j as f64 / 3.0]);
            }
        }
        let tris = delaunay(&pts);
        assert_eq!(tris.len(), 2 * 4 * 3);
        let total: f64 = tris.iter().map(|t| area(t, &pts)).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
        assert!(tris.iter().all(|t| area(t, &pts) > 0.0));
    }

    #[test]
    fn scattered_triangulation_covers_hull() {
        let pts: Vec<Pt> = (0..40)
            .map(|i| {
                let x = ((i * 37) % 41) as f64 / 40.0;
                let y = ((i * 17 + 5) % 43) as f64 / 42.0;
                [x, y]
            })
            .collect();
        let tris = delaunay(&pts);
        let hull = convex_hull(&pts);
        let total: f64 = tris.iter().map(|t| area(t, &pts)).sum();
        assert_abs_diff_eq!(total, hull_area(&hull), epsilon = 1e-9);
    }

    #[test]
    fn collinear_sites_have_no_triangles() {
        let pts = [[0.0, 0.0], [0.5, 0.5], [1.0, 1.0]];
        assert!(delaunay(&pts).is_empty());
        assert!(convex_hull(&pts).len() < 3);
    }

    #[test]
    fn hull_drops_interior_and_collinear_points() {
        let pts = [[0.0, 0.0], [0.5, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.4, 0.6]];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert_abs_diff_eq!(hull_area(&hull), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hull_contains_boundary_and_rejects_outside() {
        let hull = convex_hull(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        assert!(hull_contains(&hull, [0.25, 0.25]));
        assert!(hull_contains(&hull, [0.5, 0.5]));
        assert!(hull_contains(&hull, [0.0, 0.0]));
        assert!(!hull_contains(&hull, [0.6, 0.6]));
        assert!(!hull_contains(&hull, [-0.01, 0.5]));
    }

    #[test]
    fn unit_scale_maps_bounding_box() {
        let s = UnitScale::fit(&[[0.1, 90.0], [1.0, 110.0], [0.5, 100.0]]).unwrap();
        assert_eq!(s.apply([0.1, 90.0]), [0.0, 0.0]);
        assert_eq!(s.apply([1.0, 110.0]), [1.0, 1.0]);
        assert!(UnitScale::fit(&[[0.1, 90.0], [0.1, 110.0]]).is_none());
    }
}
