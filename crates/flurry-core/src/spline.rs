//! Pure spline math: Catmull-Rom path evaluation by arc length.
//!
//! Provides non-uniform (centripetal or chordal) Catmull-Rom interpolation and
//! an [`ArcLengthSpline`] that maps a normalized distance `u ∈ [0, 1]` to a
//! point and an orientation basis, so that equal steps of `u` move equal
//! distances along the path.

use crate::Vec3;

/// A sampled point along a spline with computed basis vectors.
#[derive(Debug, Clone, Copy)]
pub struct SplineSample {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// Normalized arc-length parameter in [0, 1].
    pub u: f32,
}

/// Non-uniform Catmull-Rom (Barry-Goldman pyramid) between `p1` and `p2`.
///
/// `alpha = 0.5` is centripetal, `alpha = 1.0` chordal. Knot intervals are
/// `|p_{i+1} - p_i|^alpha`; coincident points fall back to a unit interval.
pub fn catmull_rom_nonuniform(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32, alpha: f32) -> Vec3 {
    let knot = |a: Vec3, b: Vec3| {
        let d = (b - a).length().powf(alpha);
        if d < 1e-4 {
            1.0
        } else {
            d
        }
    };
    let t0 = 0.0;
    let t1 = t0 + knot(p0, p1);
    let t2 = t1 + knot(p1, p2);
    let t3 = t2 + knot(p2, p3);
    let tt = t1 + (t2 - t1) * t;

    let a1 = p0 * ((t1 - tt) / (t1 - t0)) + p1 * ((tt - t0) / (t1 - t0));
    let a2 = p1 * ((t2 - tt) / (t2 - t1)) + p2 * ((tt - t1) / (t2 - t1));
    let a3 = p2 * ((t3 - tt) / (t3 - t2)) + p3 * ((tt - t2) / (t3 - t2));
    let b1 = a1 * ((t2 - tt) / (t2 - t0)) + a2 * ((tt - t0) / (t2 - t0));
    let b2 = a2 * ((t3 - tt) / (t3 - t1)) + a3 * ((tt - t1) / (t3 - t1));
    b1 * ((t2 - tt) / (t2 - t1)) + b2 * ((tt - t1) / (t2 - t1))
}

/// Open Catmull-Rom path, pre-tessellated into a polyline with cumulative
/// lengths for constant-speed evaluation.
#[derive(Debug, Clone)]
pub struct ArcLengthSpline {
    polyline: Vec<Vec3>,
    cumulative: Vec<f32>,
}

impl ArcLengthSpline {
    /// Tessellate an open spline through `points`.
    ///
    /// Phantom endpoints are created by reflecting the first and last
    /// segments outward. `subdivisions` polyline steps are taken per segment.
    /// Fewer than two points yields a degenerate path at the single point
    /// (or the origin).
    pub fn open(points: &[Vec3], alpha: f32, subdivisions: usize) -> Self {
        let n = points.len();
        if n < 2 {
            let p = points.first().copied().unwrap_or(Vec3::ZERO);
            return Self {
                polyline: vec![p],
                cumulative: vec![0.0],
            };
        }

        let phantom_start = points[0] * 2.0 - points[1];
        let phantom_end = points[n - 1] * 2.0 - points[n - 2];
        let mut extended = Vec::with_capacity(n + 2);
        extended.push(phantom_start);
        extended.extend_from_slice(points);
        extended.push(phantom_end);

        let subdivisions = subdivisions.max(1);
        let mut polyline = Vec::with_capacity((n - 1) * subdivisions + 1);
        polyline.push(points[0]);
        for seg in 0..n - 1 {
            let (p0, p1, p2, p3) = (
                extended[seg],
                extended[seg + 1],
                extended[seg + 2],
                extended[seg + 3],
            );
            for j in 1..=subdivisions {
                let t = j as f32 / subdivisions as f32;
                polyline.push(catmull_rom_nonuniform(p0, p1, p2, p3, t, alpha));
            }
        }

        let mut cumulative = Vec::with_capacity(polyline.len());
        let mut total = 0.0_f32;
        cumulative.push(0.0);
        for pair in polyline.windows(2) {
            total += (pair[1] - pair[0]).length();
            cumulative.push(total);
        }

        Self {
            polyline,
            cumulative,
        }
    }

    /// Total path length
    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn end(&self) -> Vec3 {
        self.polyline[self.polyline.len() - 1]
    }

    /// Point at normalized arc length `u` (clamped to [0, 1]).
    pub fn point_at(&self, u: f32) -> Vec3 {
        let (i, frac) = self.locate(u);
        if i + 1 >= self.polyline.len() {
            return self.end();
        }
        self.polyline[i].lerp(self.polyline[i + 1], frac)
    }

    /// Unit tangent at normalized arc length `u`.
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        let len = self.polyline.len();
        if len < 2 {
            return Vec3::new(0.0, 0.0, 1.0);
        }
        let (i, _) = self.locate(u);
        let i = i.min(len - 2);
        (self.polyline[i + 1] - self.polyline[i]).normalized()
    }

    /// Point and orientation basis at `u`. `right` is perpendicular to world
    /// up and the tangent; a vertical tangent falls back to +X.
    pub fn sample_at(&self, u: f32) -> SplineSample {
        let position = self.point_at(u);
        let forward = self.tangent_at(u);
        let mut right = Vec3::UP.cross(&forward).normalized();
        if right.length_squared() < 1e-8 {
            right = Vec3::new(1.0, 0.0, 0.0);
        }
        let up = forward.cross(&right).normalized();
        SplineSample {
            position,
            forward,
            right,
            up,
            u: u.clamp(0.0, 1.0),
        }
    }

    /// Polyline index and fraction within that step for arc length `u`.
    fn locate(&self, u: f32) -> (usize, f32) {
        let total = self.length();
        if total <= 0.0 {
            return (0, 0.0);
        }
        let target = u.clamp(0.0, 1.0) * total;
        let i = match self
            .cumulative
            .binary_search_by(|c| c.partial_cmp(&target).unwrap_or(std::cmp::Ordering::Less))
        {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let i = i.min(self.cumulative.len() - 1);
        if i + 1 >= self.cumulative.len() {
            return (i, 0.0);
        }
        let step = self.cumulative[i + 1] - self.cumulative[i];
        let frac = if step > 0.0 {
            (target - self.cumulative[i]) / step
        } else {
            0.0
        };
        (i, frac)
    }
}
