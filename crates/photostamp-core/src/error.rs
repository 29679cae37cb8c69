//! Pipeline-level error conditions.
//!
//! Every condition here is recoverable by the user: re-upload, re-crop or
//! pick a date, then generate again. A failed composite never touches a
//! previously generated result.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Reasons a composite attempt is aborted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompositeError {
    /// The source image could not be decoded, or none was loaded.
    #[error("ImageLoadFailed: {0}")]
    ImageLoadFailed(#[from] DecodeError),

    /// The crop selection is missing, degenerate or outside the image.
    #[error("InvalidCropRegion: {reason}")]
    InvalidCropRegion { reason: String },

    /// No date was picked before generating.
    #[error("MissingDate: no date selected")]
    MissingDate,

    /// PNG encoding of the finished surface failed.
    #[error("EncodeFailed: {0}")]
    EncodeFailed(#[from] EncodeError),
}

impl CompositeError {
    pub(crate) fn invalid_crop(reason: impl Into<String>) -> Self {
        CompositeError::InvalidCropRegion {
            reason: reason.into(),
        }
    }

    /// Stable condition name for the UI layer.
    pub fn code(&self) -> &'static str {
        match self {
            CompositeError::ImageLoadFailed(_) => "ImageLoadFailed",
            CompositeError::InvalidCropRegion { .. } => "InvalidCropRegion",
            CompositeError::MissingDate => "MissingDate",
            CompositeError::EncodeFailed(_) => "EncodeFailed",
        }
    }
}
