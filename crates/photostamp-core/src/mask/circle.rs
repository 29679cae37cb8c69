//! Circular clip inscribed in the output canvas.

use serde::{Deserialize, Serialize};

/// Sub-samples per axis when estimating edge coverage.
const SUPERSAMPLE: u32 = 4;

/// Circle clip in output-canvas pixel coordinates.
///
/// # Example
/// ```ignore
/// use photostamp_core::mask::CircleClip;
///
/// let clip = CircleClip::inscribed(100, 100);
/// assert_eq!(clip.coverage(50, 50), 255);
/// assert_eq!(clip.coverage(0, 0), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleClip {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl CircleClip {
    pub fn new(center_x: f64, center_y: f64, radius: f64) -> Self {
        Self {
            center_x,
            center_y,
            radius: radius.max(0.0),
        }
    }

    /// Circle centered on a `width x height` canvas with radius
    /// `min(width, height) / 2`.
    pub fn inscribed(width: u32, height: u32) -> Self {
        Self::new(
            f64::from(width) / 2.0,
            f64::from(height) / 2.0,
            f64::from(width.min(height)) / 2.0,
        )
    }

    /// Check if a point lies inside the circle (boundary included).
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Fraction of pixel `(px, py)` inside the circle, scaled to 0-255.
    ///
    /// Interior and exterior pixels short-circuit; only pixels straddling
    /// the edge are supersampled.
    pub fn coverage(&self, px: u32, py: u32) -> u8 {
        let x0 = f64::from(px);
        let y0 = f64::from(py);

        // Farthest and nearest pixel corners decide the fast paths.
        let far_x = (x0 - self.center_x).abs().max((x0 + 1.0 - self.center_x).abs());
        let far_y = (y0 - self.center_y).abs().max((y0 + 1.0 - self.center_y).abs());
        if far_x * far_x + far_y * far_y <= self.radius * self.radius {
            return 255;
        }

        let near_x = (self.center_x.clamp(x0, x0 + 1.0) - self.center_x).abs();
        let near_y = (self.center_y.clamp(y0, y0 + 1.0) - self.center_y).abs();
        if near_x * near_x + near_y * near_y >= self.radius * self.radius {
            return 0;
        }

        let step = 1.0 / f64::from(SUPERSAMPLE);
        let mut inside = 0u32;
        for sy in 0..SUPERSAMPLE {
            for sx in 0..SUPERSAMPLE {
                let x = x0 + (f64::from(sx) + 0.5) * step;
                let y = y0 + (f64::from(sy) + 0.5) * step;
                if self.contains(x, y) {
                    inside += 1;
                }
            }
        }

        let total = SUPERSAMPLE * SUPERSAMPLE;
        ((inside * 255 + total / 2) / total) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inscribed_uses_short_side() {
        let clip = CircleClip::inscribed(400, 100);
        assert_eq!(clip.center_x, 200.0);
        assert_eq!(clip.center_y, 50.0);
        assert_eq!(clip.radius, 50.0);
    }

    #[test]
    fn test_center_fully_covered() {
        let clip = CircleClip::inscribed(100, 100);
        assert_eq!(clip.coverage(50, 50), 255);
        assert_eq!(clip.coverage(49, 49), 255);
    }

    #[test]
    fn test_corners_fully_clipped() {
        let clip = CircleClip::inscribed(100, 60);
        assert_eq!(clip.coverage(0, 0), 0);
        assert_eq!(clip.coverage(99, 0), 0);
        assert_eq!(clip.coverage(0, 59), 0);
        assert_eq!(clip.coverage(99, 59), 0);
    }

    #[test]
    fn test_edge_is_partial() {
        // Pixel straddling the leftmost point of the circle
        let clip = CircleClip::new(10.0, 10.5, 9.5);
        let c = clip.coverage(0, 10);
        assert!(c > 0 && c < 255, "edge coverage should be partial, got {}", c);
    }

    #[test]
    fn test_contains_boundary() {
        let clip = CircleClip::new(0.0, 0.0, 5.0);
        assert!(clip.contains(3.0, 4.0));
        assert!(!clip.contains(3.0, 4.1));
    }

    #[test]
    fn test_negative_radius_clamped() {
        let clip = CircleClip::new(1.0, 1.0, -3.0);
        assert_eq!(clip.radius, 0.0);
        assert_eq!(clip.coverage(0, 0), 0);
    }

    #[test]
    fn test_coverage_monotonic_toward_center() {
        let clip = CircleClip::inscribed(64, 64);
        let mut prev = 0;
        for x in 0..32 {
            let c = clip.coverage(x, 32);
            assert!(c >= prev, "coverage should not drop toward the center");
            prev = c;
        }
        assert_eq!(prev, 255);
    }
}
