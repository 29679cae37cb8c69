//! Canvas-centered rotation and bilinear source sampling.
//!
//! The rotation pivots on the center of the *output* canvas, not the source
//! image: the crop is drawn 1:1 into the canvas and the drawing is turned
//! around the canvas center. Positive angles turn clockwise on screen
//! (y axis points down).
//!
//! # Algorithm
//!
//! Drawing uses inverse mapping: for each output pixel center we rotate back
//! by the angle to find the point in the unrotated crop, then sample the
//! source there. For rotation by angle θ around pivot `c`:
//! ```text
//! crop_x = cx + (dst_x - cx) * cos(θ) + (dst_y - cy) * sin(θ)
//! crop_y = cy - (dst_x - cx) * sin(θ) + (dst_y - cy) * cos(θ)
//! ```

use crate::decode::SourceImage;

/// Angles closer than this to a multiple of 90° snap to it.
const ANGLE_EPSILON: f64 = 0.001;

/// Rotation of the drawing around a pivot on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationTransform {
    pub pivot_x: f64,
    pub pivot_y: f64,
    /// Angle normalized to `[0, 360)` degrees.
    pub degrees: f64,
    cos: f64,
    sin: f64,
}

impl RotationTransform {
    /// Rotation by `degrees` around the center of a `width x height` canvas.
    ///
    /// Non-finite angles are treated as no rotation.
    pub fn about_center(width: u32, height: u32, degrees: f64) -> Self {
        let degrees = if degrees.is_finite() {
            normalize_degrees(degrees)
        } else {
            0.0
        };
        let (cos, sin) = quarter_turn(degrees).unwrap_or_else(|| {
            let radians = degrees.to_radians();
            (radians.cos(), radians.sin())
        });

        Self {
            pivot_x: f64::from(width) / 2.0,
            pivot_y: f64::from(height) / 2.0,
            degrees,
            cos,
            sin,
        }
    }

    /// Rotation angle in radians.
    pub fn radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    /// True when the transform leaves every point where it is.
    pub fn is_identity(&self) -> bool {
        self.cos == 1.0 && self.sin == 0.0
    }

    /// Map a point of the unrotated drawing onto the canvas.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.pivot_x;
        let dy = y - self.pivot_y;
        (
            self.pivot_x + dx * self.cos - dy * self.sin,
            self.pivot_y + dx * self.sin + dy * self.cos,
        )
    }

    /// Map a canvas point back into the unrotated drawing.
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.pivot_x;
        let dy = y - self.pivot_y;
        (
            self.pivot_x + dx * self.cos + dy * self.sin,
            self.pivot_y - dx * self.sin + dy * self.cos,
        )
    }
}

/// Fold any angle into `[0, 360)`, snapping values within epsilon of 360 to 0.
fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    if normalized < ANGLE_EPSILON || 360.0 - normalized < ANGLE_EPSILON {
        0.0
    } else {
        normalized
    }
}

/// Exact `(cos, sin)` for quarter turns so 90° steps stay pixel-exact.
fn quarter_turn(degrees: f64) -> Option<(f64, f64)> {
    const TURNS: [(f64, (f64, f64)); 4] = [
        (0.0, (1.0, 0.0)),
        (90.0, (0.0, 1.0)),
        (180.0, (-1.0, 0.0)),
        (270.0, (0.0, -1.0)),
    ];
    TURNS
        .iter()
        .find(|(angle, _)| (degrees - angle).abs() < ANGLE_EPSILON)
        .map(|(_, cs)| *cs)
}

/// Inclusive pixel-index window a sampler may read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl SampleBounds {
    /// Pixels of `image` covered by the span `x..x+width`, `y..y+height`.
    pub fn covering(image: &SourceImage, x: f64, y: f64, width: f64, height: f64) -> Self {
        let last_x = f64::from(image.width.saturating_sub(1));
        let last_y = f64::from(image.height.saturating_sub(1));
        let min_x = x.floor().clamp(0.0, last_x);
        let min_y = y.floor().clamp(0.0, last_y);
        Self {
            min_x: min_x as u32,
            min_y: min_y as u32,
            max_x: ((x + width).ceil() - 1.0).clamp(min_x, last_x) as u32,
            max_y: ((y + height).ceil() - 1.0).clamp(min_y, last_y) as u32,
        }
    }
}

/// Premultiplied RGBA of a source pixel, as floats.
#[inline]
fn premultiplied_f64(image: &SourceImage, px: u32, py: u32) -> [f64; 4] {
    let idx = (py as usize * image.width as usize + px as usize) * 4;
    let a = f64::from(image.pixels[idx + 3]);
    [
        f64::from(image.pixels[idx]) * a / 255.0,
        f64::from(image.pixels[idx + 1]) * a / 255.0,
        f64::from(image.pixels[idx + 2]) * a / 255.0,
        a,
    ]
}

/// Sample the source with bilinear interpolation at pixel-index coordinates.
///
/// `(x, y)` is in pixel-index space (pixel `i` is centered on `i`). Taps
/// outside `bounds` are clamped to its edge, so crop borders never bleed in
/// neighbouring source pixels. Interpolation happens on premultiplied
/// values and the result is premultiplied RGBA8.
pub fn sample_bilinear(image: &SourceImage, x: f64, y: f64, bounds: SampleBounds) -> [u8; 4] {
    let x = x.clamp(f64::from(bounds.min_x), f64::from(bounds.max_x));
    let y = y.clamp(f64::from(bounds.min_y), f64::from(bounds.max_y));

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(bounds.max_x);
    let y1 = (y0 + 1).min(bounds.max_y);

    let fx = x - f64::from(x0);
    let fy = y - f64::from(y0);

    let p00 = premultiplied_f64(image, x0, y0);
    let p10 = premultiplied_f64(image, x1, y0);
    let p01 = premultiplied_f64(image, x0, y1);
    let p11 = premultiplied_f64(image, x1, y1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}
