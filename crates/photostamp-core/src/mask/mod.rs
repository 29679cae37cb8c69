//! Shape masks applied to the composite.
//!
//! Only the circular crop needs one today: after the photo is drawn, every
//! pixel is scaled by how much of it lies inside the circle, which is the
//! "keep where both overlap" compositing rule. Pixels fully outside end up
//! transparent, pixels fully inside keep their alpha untouched.

pub mod circle;

pub use circle::CircleClip;
