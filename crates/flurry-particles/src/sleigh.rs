//! The moving light: a sleigh flying in from the distance and spiralling up
//! the tree.
//!
//! The whole flight is one chordal Catmull-Rom curve evaluated by arc length,
//! so the sleigh moves at constant speed. A single progress value drives both
//! the exposed pose and the light position used for activation.

use flurry_core::spline::ArcLengthSpline;
use flurry_core::Vec3;
use serde::Serialize;
use std::f32::consts::TAU;

const START: Vec3 = Vec3::new(120.0, 60.0, -120.0);
/// Distance of the single approach point out along the spiral's start tangent
const APPROACH_DISTANCE: f32 = 40.0;
const SPIRAL_STEPS: usize = 200;
const SPIRAL_TURNS: f32 = 4.5;
const SPIRAL_HEIGHT: f32 = 15.12;
const SPIRAL_BASE_RADIUS: f32 = 6.72;
const SPIRAL_TOP_RADIUS: f32 = 0.12;
const CHORDAL: f32 = 1.0;
const SUBDIVISIONS: usize = 12;

/// Progress at which the sleigh counts as having reached the treetop
pub const REACHED_TOP: f32 = 0.99;
/// Default seconds from tree entry to the top
pub const FLIGHT_DURATION: f32 = 10.0;

/// Sleigh position and orientation basis at some progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SleighPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub progress: f32,
}

#[derive(Debug, Clone)]
pub struct SleighPath {
    curve: ArcLengthSpline,
    duration: f32,
}

impl Default for SleighPath {
    fn default() -> Self {
        Self::new(FLIGHT_DURATION)
    }
}

impl SleighPath {
    pub fn new(duration: f32) -> Self {
        let curve = ArcLengthSpline::open(&control_points(), CHORDAL, SUBDIVISIONS);
        log::debug!("[sleigh] flight path length {:.1}", curve.length());
        Self { curve, duration }
    }

    pub fn length(&self) -> f32 {
        self.curve.length()
    }

    /// Fraction of the flight completed `since_entry` seconds after the tree
    /// formed, clamped to [0, 1].
    pub fn progress(&self, since_entry: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (since_entry / self.duration).clamp(0.0, 1.0)
    }

    pub fn point_at(&self, progress: f32) -> Vec3 {
        self.curve.point_at(progress)
    }

    pub fn pose_at(&self, progress: f32) -> SleighPose {
        let s = self.curve.sample_at(progress);
        SleighPose {
            position: s.position,
            forward: s.forward,
            right: s.right,
            up: s.up,
            progress: s.u,
        }
    }

    /// Light position while the sleigh is in flight; `None` before it sets
    /// off and once it has landed.
    pub fn light_at(&self, progress: f32) -> Option<Vec3> {
        (progress > 0.0 && progress < 1.0).then(|| self.curve.point_at(progress))
    }

    pub fn reached_top(progress: f32) -> bool {
        progress >= REACHED_TOP
    }
}

/// Start point, one approach point out along the spiral's start tangent, then the spiral from the tree base to just under the top.
fn control_points() -> Vec<Vec3> {
    let spiral: Vec<Vec3> = (0..=SPIRAL_STEPS)
        .map(|i| {
            let t = i as f32 / SPIRAL_STEPS as f32;
            let angle = t * SPIRAL_TURNS * TAU;
            let y = -SPIRAL_HEIGHT / 2.0 + t * SPIRAL_HEIGHT;
            let r = SPIRAL_BASE_RADIUS + (SPIRAL_TOP_RADIUS - SPIRAL_BASE_RADIUS) * t;
            Vec3::new(angle.cos() * r, y, angle.sin() * r)
        })
        .collect();

    let outward = (spiral[0] - spiral[1]).normalized();
    let mut points = Vec::with_capacity(spiral.len() + 2);
    points.push(START);
    points.push(spiral[0] + outward * APPROACH_DISTANCE);
    points.extend(spiral);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_far_away_and_ends_at_the_top() {
        let path = SleighPath::default();
        assert!((path.point_at(0.0) - START).length() < 1e-3);
        let top = path.point_at(1.0);
        assert!((top.y - SPIRAL_HEIGHT / 2.0).abs() < 1e-3);
        assert!((top.x * top.x + top.z * top.z).sqrt() < SPIRAL_TOP_RADIUS + 1e-3);
    }

    #[test]
    fn approach_is_one_point_off_the_spiral_base() {
        let points = control_points();
        assert_eq!(points.len(), SPIRAL_STEPS + 3);
        assert_eq!(points[0], START);
        let base = points[2];
        assert!((base.y + SPIRAL_HEIGHT / 2.0).abs() < 1e-4);
        assert!(((points[1] - base).length() - APPROACH_DISTANCE).abs() < 1e-3);
        // Out along the tangent, away from the first spiral step
        assert!((points[1] - points[3]).length() > APPROACH_DISTANCE);
    }

    #[test]
    fn progress_clamps_over_duration() {
        let path = SleighPath::new(10.0);
        assert_eq!(path.progress(-1.0), 0.0);
        assert!((path.progress(5.0) - 0.5).abs() < 1e-6);
        assert_eq!(path.progress(30.0), 1.0);
        assert!(!SleighPath::reached_top(path.progress(9.8)));
        assert!(SleighPath::reached_top(path.progress(9.95)));
    }

    #[test]
    fn light_only_in_flight() {
        let path = SleighPath::default();
        assert!(path.light_at(0.0).is_none());
        assert!(path.light_at(0.4).is_some());
        assert!(path.light_at(1.0).is_none());
    }

    #[test]
    fn constant_speed_along_the_curve() {
        let path = SleighPath::default();
        let steps = 100;
        let expected = path.length() / steps as f32;
        // Chord length never exceeds the arc length covered
        for i in 0..steps {
            let a = path.point_at(i as f32 / steps as f32);
            let b = path.point_at((i + 1) as f32 / steps as f32);
            assert!((b - a).length() <= expected + 1e-2);
        }
    }

    #[test]
    fn pose_basis_is_orthonormal() {
        let pose = SleighPath::default().pose_at(0.5);
        assert!((pose.forward.length() - 1.0).abs() < 1e-3);
        assert!((pose.right.length() - 1.0).abs() < 1e-3);
        assert!(pose.forward.dot(&pose.right).abs() < 1e-3);
        assert!(pose.up.y > 0.0);
    }
}
