//! Output encoding for Photostamp.
//!
//! The flattened surface is always written as PNG so the circular clip's
//! transparency survives the download.
//!
//! # Examples
//!
//! ```ignore
//! use photostamp_core::encode::encode_png;
//!
//! let pixels = vec![128u8; 100 * 100 * 4]; // Gray, opaque-ish image
//! let png_bytes = encode_png(&pixels, 100, 100).unwrap();
//! println!("Encoded {} bytes", png_bytes.len());
//! ```

mod png;

pub use png::{encode_png, EncodeError, PNG_SIGNATURE};
