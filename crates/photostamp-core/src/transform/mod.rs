//! Geometry resolution: crop rectangles, rotation and the composite plan.
//!
//! This module turns what the crop UI hands over into a concrete plan the
//! compositor executes.
//!
//! # Draw Order
//!
//! The plan encodes this order, and it must not change:
//! 1. Rotate the canvas around its center
//! 2. Draw the crop 1:1 into the full canvas
//! 3. Undo the rotation
//! 4. Apply the circular clip (circle shape only)
//! 5. Paint the date label, always axis-aligned
//!
//! # Coordinate System
//!
//! - Crop coordinates are source pixels, origin top-left
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - The rotation pivot is the output canvas center, not the source center

mod crop;
mod plan;
mod rotation;

pub use crop::{AspectRatio, CropRect, CropSelection, MAX_ZOOM, MIN_ZOOM};
pub use plan::{resolve, CompositePlan, CropShape};
pub use rotation::{sample_bilinear, RotationTransform, SampleBounds};
