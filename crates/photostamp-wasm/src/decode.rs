//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@photostamp/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height}`);
//! ```

use crate::types::{to_js_error, JsSourceImage};
use photostamp_core::decode;
use wasm_bindgen::prelude::*;

/// Decode a JPG, PNG or WebP upload.
///
/// EXIF orientation is applied, so the result matches what an `<img>`
/// element would show.
///
/// # Errors
///
/// An `ImageLoadFailed: ...` string if the bytes are empty, in an
/// unsupported format or corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsSourceImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsSourceImage::from_source)
        .map_err(|e| to_js_error(e.into()))
}

/// Check whether the bytes look like a format `decode_image` accepts.
#[wasm_bindgen]
pub fn is_supported_image(bytes: &[u8]) -> bool {
    image_sniff(bytes).is_some()
}

fn image_sniff(bytes: &[u8]) -> Option<&'static str> {
    const SIGNATURES: [(&[u8], &str); 3] = [
        (&[0xFF, 0xD8, 0xFF], "jpeg"),
        (&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], "png"),
        (b"RIFF", "webp"),
    ];
    SIGNATURES
        .iter()
        .find(|(magic, name)| {
            bytes.starts_with(magic) && (*name != "webp" || bytes.get(8..12) == Some(&b"WEBP"[..]))
        })
        .map(|(_, name)| *name)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_image_invalid() {
        assert!(decode_image(&[0, 1, 2, 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_image_empty() {
        let err = decode_image(&[]).err().unwrap();
        assert!(err.as_string().unwrap().starts_with("ImageLoadFailed"));
    }

    #[wasm_bindgen_test]
    fn test_decode_png() {
        let png = photostamp_core::encode_png(&[10, 20, 30, 255].repeat(6), 3, 2).unwrap();
        let img = decode_image(&png).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
    }
}
