//! Photostamp Core - photo compositing library
//!
//! Turns an uploaded photo, a crop, a rotation, an optional circular clip
//! and a calendar date into a PNG with a `YYYY/MM/DD` stamp in its
//! bottom-left corner.
//!
//! # Example
//!
//! ```ignore
//! use photostamp_core::{composite_bytes, CalendarDate, CropRect, CropShape};
//!
//! let result = composite_bytes(
//!     &bytes,
//!     &CropRect::new(0.0, 0.0, 640.0, 480.0),
//!     12.5,
//!     CropShape::Circle,
//!     CalendarDate::from_ymd_opt(2024, 3, 7),
//! )?;
//! assert_eq!(result.file_name, "photo_2024-03-07.png");
//! ```

pub mod composite;
pub mod decode;
pub mod encode;
pub mod error;
pub mod label;
pub mod mask;
pub mod session;
pub mod transform;

pub use composite::{composite, composite_bytes, CompositeResult, Compositor};
pub use decode::{decode_image, DecodeError, SourceImage};
pub use encode::{encode_png, EncodeError};
pub use error::CompositeError;
pub use label::{format_date_text, format_label, output_file_name, DateLabel, LabelStyle};
pub use session::{EditSession, EditSettings, GenerateRequest, SessionEvent};
pub use transform::{resolve, AspectRatio, CompositePlan, CropRect, CropSelection, CropShape};

/// A calendar date with no time or zone.
pub type CalendarDate = chrono::NaiveDate;

/// Crate version, reported by the bindings.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
