//! Photostamp WASM - WebAssembly bindings for Photostamp
//!
//! This crate exposes photostamp-core to the browser widget.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrappers for images and results
//! - `decode` - Upload decoding (JPG, PNG, WebP)
//! - `composite` - One-shot compositing and label helpers
//! - `session` - Observable editing session
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, composite_photo } from '@photostamp/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! const result = composite_photo(image, 0, 0, image.width, image.height,
//!                                0, false, '2024-03-07');
//! ```

use wasm_bindgen::prelude::*;

mod composite;
mod decode;
mod session;
mod types;

pub use composite::{
    composite_bytes, composite_photo, default_label_style, format_date_label, label_layout,
    output_file_name,
};
pub use decode::{decode_image, is_supported_image};
pub use session::JsEditSession;
pub use types::{JsCompositeResult, JsSourceImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    photostamp_core::VERSION.to_string()
}
