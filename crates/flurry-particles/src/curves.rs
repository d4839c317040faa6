//! Scalar easing helpers shared by the integration regimes

/// Fraction of the remaining distance covered this frame by exponential
/// smoothing at `rate` per second.
pub fn smoothing_factor(delta: f32, rate: f32) -> f32 {
    (delta * rate).clamp(0.0, 1.0)
}

/// Linear ramp from 0 at `start` to 1 at `start + duration`
pub fn ramp(elapsed: f32, start: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return if elapsed >= start { 1.0 } else { 0.0 };
    }
    ((elapsed - start) / duration).clamp(0.0, 1.0)
}

/// Linear fade from 1 at age 0 to 0 at `duration`
pub fn fade_out(age: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    (1.0 - age / duration).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_factor_clamps() {
        assert_eq!(smoothing_factor(1.0, 5.0), 1.0);
        assert_eq!(smoothing_factor(-1.0, 5.0), 0.0);
        assert!((smoothing_factor(0.1, 2.0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn ramp_and_fade() {
        assert_eq!(ramp(0.5, 1.0, 2.0), 0.0);
        assert!((ramp(2.0, 1.0, 2.0) - 0.5).abs() < 1e-6);
        assert_eq!(ramp(9.0, 1.0, 2.0), 1.0);
        assert_eq!(fade_out(2.0, 1.5), 0.0);
        assert!((fade_out(0.75, 1.5) - 0.5).abs() < 1e-6);
    }
}
