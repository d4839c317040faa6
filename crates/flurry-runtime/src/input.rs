//! Pointer input: telling a tap apart from a drag

/// Thresholds for a press/release pair to count as a tap
#[derive(Debug, Clone, Copy)]
pub struct TapThresholds {
    /// Max horizontal travel in pixels
    pub max_dx: f64,
    /// Max vertical travel in pixels
    pub max_dy: f64,
    /// Max press duration in seconds
    pub max_duration: f64,
}

impl Default for TapThresholds {
    fn default() -> Self {
        Self {
            max_dx: 10.0,
            max_dy: 10.0,
            max_duration: 0.3,
        }
    }
}

/// Tracks the pointer between press and release. Drags (e.g. orbiting the
/// camera) are ignored; short, still presses are reported as taps.
#[derive(Debug, Default)]
pub struct TapGesture {
    thresholds: TapThresholds,
    /// Position and time of the current press
    pressed: Option<(f64, f64, f64)>,
}

impl TapGesture {
    pub fn new(thresholds: TapThresholds) -> Self {
        Self {
            thresholds,
            pressed: None,
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, now: f64) {
        self.pressed = Some((x, y, now));
    }

    /// Returns true if this release completes a tap.
    pub fn pointer_up(&mut self, x: f64, y: f64, now: f64) -> bool {
        let Some((x0, y0, t0)) = self.pressed.take() else {
            return false;
        };
        (x - x0).abs() < self.thresholds.max_dx
            && (y - y0).abs() < self.thresholds.max_dy
            && (now - t0) < self.thresholds.max_duration
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_still_press_is_a_tap() {
        let mut g = TapGesture::default();
        g.pointer_down(100.0, 100.0, 1.0);
        assert!(g.is_pressed());
        assert!(g.pointer_up(104.0, 97.0, 1.2));
        assert!(!g.is_pressed());
    }

    #[test]
    fn drag_is_not_a_tap() {
        let mut g = TapGesture::default();
        g.pointer_down(100.0, 100.0, 1.0);
        assert!(!g.pointer_up(130.0, 100.0, 1.1));
    }

    #[test]
    fn long_press_is_not_a_tap() {
        let mut g = TapGesture::default();
        g.pointer_down(0.0, 0.0, 1.0);
        assert!(!g.pointer_up(0.0, 0.0, 1.5));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut g = TapGesture::default();
        assert!(!g.pointer_up(0.0, 0.0, 0.0));
    }
}
