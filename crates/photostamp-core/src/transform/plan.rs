//! Resolve a crop, an angle and a shape into a composite plan.

use serde::{Deserialize, Serialize};

use super::{CropRect, RotationTransform};
use crate::error::CompositeError;
use crate::mask::CircleClip;

/// Output shape of the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropShape {
    #[default]
    Rectangle,
    /// Everything outside the inscribed circle becomes transparent.
    Circle,
}

/// Everything the compositor needs to know about geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositePlan {
    /// Source region drawn into the canvas.
    pub crop: CropRect,
    /// Output canvas width, equal to the crop width.
    pub width: u32,
    /// Output canvas height, equal to the crop height.
    pub height: u32,
    /// Rotation applied while drawing the crop.
    pub rotation: RotationTransform,
    /// Clip applied after drawing, before the label.
    pub clip: Option<CircleClip>,
}

/// Build a [`CompositePlan`] for one generate action.
///
/// The canvas is exactly `crop.width x crop.height`; rotation turns the
/// drawing around the canvas center and never changes the canvas size.
///
/// # Errors
///
/// `InvalidCropRegion` when the crop has a non-positive or non-finite side.
pub fn resolve(
    crop: &CropRect,
    rotation_degrees: f64,
    shape: CropShape,
) -> Result<CompositePlan, CompositeError> {
    let (width, height) = crop.output_size()?;

    if !rotation_degrees.is_finite() {
        tracing::warn!(rotation_degrees, "ignoring non-finite rotation");
    }
    let rotation = RotationTransform::about_center(width, height, rotation_degrees);

    let clip = match shape {
        CropShape::Rectangle => None,
        CropShape::Circle => Some(CircleClip::inscribed(width, height)),
    };

    tracing::debug!(
        width,
        height,
        degrees = rotation.degrees,
        ?shape,
        "resolved composite plan"
    );

    Ok(CompositePlan {
        crop: *crop,
        width,
        height,
        rotation,
        clip,
    })
}
