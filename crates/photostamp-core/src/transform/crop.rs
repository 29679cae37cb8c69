//! Crop rectangles and the crop-selection state that produces them.
//!
//! # Coordinate System
//!
//! - Crop rectangles are in source-pixel coordinates
//! - Origin is the top-left corner of the (orientation-corrected) source
//! - The selection's pan center is normalized (0.0 to 1.0)
//!
//! # Example
//!
//! ```ignore
//! // Square crop at 2x zoom, centered
//! let selection = CropSelection::new(AspectRatio::Square, 2.0, 0.5, 0.5);
//! let rect = selection.to_crop_rect(400, 300);
//! assert_eq!((rect.width, rect.height), (150.0, 150.0));
//! ```

use serde::{Deserialize, Serialize};

use super::CropShape;
use crate::error::CompositeError;

/// Smallest zoom the crop UI allows (image fills the frame).
pub const MIN_ZOOM: f64 = 1.0;
/// Largest zoom the crop UI allows.
pub const MAX_ZOOM: f64 = 3.0;

/// Rounding slack when checking a rectangle against the image edges.
const BOUNDS_EPSILON: f64 = 1e-6;

/// A crop rectangle in source-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Crop covering the whole source image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, f64::from(width), f64::from(height))
    }

    /// Output canvas size for this rectangle.
    ///
    /// Fractional sizes are truncated the way a canvas truncates its
    /// `width`/`height` attributes.
    ///
    /// # Errors
    ///
    /// `InvalidCropRegion` if a coordinate is not finite, either side is not
    /// positive, or the truncated size is zero.
    pub fn output_size(&self) -> Result<(u32, u32), CompositeError> {
        if ![self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(CompositeError::invalid_crop(
                "crop rectangle has non-finite coordinates",
            ));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(CompositeError::invalid_crop(format!(
                "crop size {}x{} must be positive",
                self.width, self.height
            )));
        }

        let width = self.width.floor().min(f64::from(u32::MAX)) as u32;
        let height = self.height.floor().min(f64::from(u32::MAX)) as u32;
        if width == 0 || height == 0 {
            return Err(CompositeError::invalid_crop(format!(
                "crop size {}x{} is smaller than one pixel",
                self.width, self.height
            )));
        }
        Ok((width, height))
    }

    /// Check that the rectangle lies inside a `source_width x source_height` image.
    pub fn ensure_within(&self, source_width: u32, source_height: u32) -> Result<(), CompositeError> {
        let max_x = f64::from(source_width) + BOUNDS_EPSILON;
        let max_y = f64::from(source_height) + BOUNDS_EPSILON;

        if self.x < -BOUNDS_EPSILON
            || self.y < -BOUNDS_EPSILON
            || self.x + self.width > max_x
            || self.y + self.height > max_y
        {
            return Err(CompositeError::invalid_crop(format!(
                "crop ({}, {}, {}x{}) lies outside the {}x{} source image",
                self.x, self.y, self.width, self.height, source_width, source_height
            )));
        }
        Ok(())
    }
}

/// Aspect ratio the crop frame is locked to.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AspectRatio {
    /// Same ratio as the source image.
    #[default]
    Original,
    /// 1:1.
    Square,
    /// Arbitrary `width:height`.
    Ratio { width: f64, height: f64 },
}

impl AspectRatio {
    /// Width divided by height, falling back to the image's own ratio
    /// for degenerate custom ratios.
    pub fn value(self, image_width: u32, image_height: u32) -> f64 {
        let original = f64::from(image_width) / f64::from(image_height.max(1));
        match self {
            AspectRatio::Original => original,
            AspectRatio::Square => 1.0,
            AspectRatio::Ratio { width, height } => {
                let ratio = width / height;
                if ratio.is_finite() && ratio > 0.0 {
                    ratio
                } else {
                    original
                }
            }
        }
    }
}

/// Transient crop UI state: aspect lock, zoom and pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSelection {
    pub aspect: AspectRatio,
    /// Zoom factor, clamped to `MIN_ZOOM..=MAX_ZOOM`.
    pub zoom: f64,
    /// Pan center, normalized to the image width.
    pub center_x: f64,
    /// Pan center, normalized to the image height.
    pub center_y: f64,
}

impl Default for CropSelection {
    fn default() -> Self {
        Self {
            aspect: AspectRatio::Original,
            zoom: MIN_ZOOM,
            center_x: 0.5,
            center_y: 0.5,
        }
    }
}

impl CropSelection {
    pub fn new(aspect: AspectRatio, zoom: f64, center_x: f64, center_y: f64) -> Self {
        let zoom = if zoom.is_finite() { zoom } else { MIN_ZOOM };
        Self {
            aspect,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            center_x: if center_x.is_finite() { center_x.clamp(0.0, 1.0) } else { 0.5 },
            center_y: if center_y.is_finite() { center_y.clamp(0.0, 1.0) } else { 0.5 },
        }
    }

    /// A circular crop is always drawn in a square frame.
    pub fn with_shape(mut self, shape: CropShape) -> Self {
        if shape == CropShape::Circle {
            self.aspect = AspectRatio::Square;
        }
        self
    }

    /// Resolve the selection against a concrete image size.
    ///
    /// The frame is the largest rectangle of the requested aspect that fits
    /// the image, shrunk by the zoom factor, centered on the pan point and
    /// pushed back inside the image. All edges land on whole pixels.
    pub fn to_crop_rect(&self, image_width: u32, image_height: u32) -> CropRect {
        if image_width == 0 || image_height == 0 {
            return CropRect::new(0.0, 0.0, 0.0, 0.0);
        }

        let img_w = f64::from(image_width);
        let img_h = f64::from(image_height);
        let ratio = self.aspect.value(image_width, image_height);

        let (fit_w, fit_h) = if img_w / img_h > ratio {
            (img_h * ratio, img_h)
        } else {
            (img_w, img_w / ratio)
        };

        let zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let width = (fit_w / zoom).round().clamp(1.0, img_w);
        let height = (fit_h / zoom).round().clamp(1.0, img_h);

        let x = (self.center_x * img_w - width / 2.0)
            .round()
            .clamp(0.0, img_w - width);
        let y = (self.center_y * img_h - height / 2.0)
            .round()
            .clamp(0.0, img_h - height);

        CropRect::new(x, y, width, height)
    }
}
