//! WASM-compatible wrapper types for image data and results.
//!
//! These wrap the core Photostamp types and handle the conversion between
//! Rust and JavaScript data representations.

use photostamp_core::{CompositeError, CompositeResult, SourceImage};
use wasm_bindgen::prelude::*;

/// A decoded source image, kept in WASM memory between composites.
///
/// # Memory Management
///
/// `pixels()` copies the data out to a `Uint8Array`. Keep the image on the
/// WASM side and pass it back to `composite_photo` instead of round-tripping
/// the pixels.
#[wasm_bindgen]
pub struct JsSourceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsSourceImage {
    /// Create an image from straight-alpha RGBA data (4 bytes per pixel),
    /// e.g. the `data` of a canvas `ImageData`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsSourceImage {
        JsSourceImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes in the pixel buffer (width * height * 4).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// RGBA pixel data as a `Uint8Array` copy.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory. Optional; the finalizer does it too.
    pub fn free(self) {}
}

impl JsSourceImage {
    pub(crate) fn from_source(img: SourceImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Clone into a core image.
    ///
    /// A buffer whose length is not `width * height * 4` is rejected as
    /// `ImageLoadFailed` instead of being sampled out of bounds.
    pub(crate) fn to_source(&self) -> Result<SourceImage, CompositeError> {
        let image = SourceImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        };
        image.validate()?;
        Ok(image)
    }
}

/// A finished composite.
#[wasm_bindgen]
pub struct JsCompositeResult {
    inner: CompositeResult,
}

#[wasm_bindgen]
impl JsCompositeResult {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Suggested download name, `photo_YYYY-MM-DD.png`.
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.file_name.clone()
    }

    /// The stamped `YYYY/MM/DD` text.
    #[wasm_bindgen(getter)]
    pub fn label_text(&self) -> String {
        self.inner.label_text.clone()
    }

    /// PNG bytes as a `Uint8Array`, ready for a `Blob`.
    pub fn png(&self) -> Vec<u8> {
        self.inner.png.clone()
    }
}

impl JsCompositeResult {
    pub(crate) fn from_result(inner: CompositeResult) -> Self {
        Self { inner }
    }
}

/// Convert a pipeline error for JavaScript, logging it to the console.
pub(crate) fn to_js_error(err: CompositeError) -> JsValue {
    let message = err.to_string();
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}
