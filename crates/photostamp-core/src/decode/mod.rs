//! Source image loading for Photostamp.
//!
//! This module turns the bytes handed over by the browser's file picker into a
//! [`SourceImage`] the compositor can borrow:
//! - JPG, PNG and WebP are accepted; the format is sniffed from content
//! - EXIF orientation is applied the same way an `<img>` element would
//! - Pixels are normalized to straight-alpha RGBA8
//!
//! # Architecture
//!
//! Decoding is the only step of the pipeline that waits on anything. It is a
//! blocking call here; the bindings run it once per upload and keep the result.
//!
//! # Examples
//!
//! ```ignore
//! use photostamp_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.webp").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod source;
mod types;

pub use source::{decode_image, get_orientation};
pub use types::{DecodeError, Orientation, SourceImage};
