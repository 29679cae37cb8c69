//! Compositing WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, composite_photo } from '@photostamp/wasm';
//!
//! const image = decode_image(bytes);
//! const result = composite_photo(image, crop.x, crop.y, crop.width, crop.height,
//!                                rotation, shape === 'circle', dateInput.value);
//! const blob = new Blob([result.png()], { type: 'image/png' });
//! link.download = result.file_name;
//! ```

use chrono::NaiveDate;
use photostamp_core::{
    label, CompositeError, CompositeResult, Compositor, CropRect, CropShape, LabelStyle,
    SourceImage,
};
use wasm_bindgen::prelude::*;

use crate::types::{to_js_error, JsCompositeResult, JsSourceImage};

/// Parse the value of an `<input type="date">` (`YYYY-MM-DD`).
///
/// An empty or malformed value counts as no date.
pub(crate) fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub(crate) fn shape_from_flag(circle: bool) -> CropShape {
    if circle {
        CropShape::Circle
    } else {
        CropShape::Rectangle
    }
}

/// Read an optional style override; `undefined` and `null` mean defaults.
pub(crate) fn style_from_js(style: JsValue) -> Result<LabelStyle, JsValue> {
    if style.is_undefined() || style.is_null() {
        return Ok(LabelStyle::default());
    }
    serde_wasm_bindgen::from_value(style).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn run_composite(
    image: &SourceImage,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation_degrees: f64,
    circle: bool,
    date: Option<&str>,
    style: LabelStyle,
) -> Result<CompositeResult, CompositeError> {
    Compositor::new(style).composite_photo(
        image,
        &CropRect::new(x, y, width, height),
        rotation_degrees,
        shape_from_flag(circle),
        parse_date(date),
    )
}

/// Composite a decoded image into a date-stamped PNG.
///
/// # Arguments
///
/// * `image` - Source from `decode_image`
/// * `x`, `y`, `width`, `height` - Crop in source pixels
/// * `rotation_degrees` - Clockwise rotation around the output center
/// * `circle` - Clip to the inscribed circle
/// * `date` - `YYYY-MM-DD`, as given by a date input
/// * `style` - Optional partial `LabelStyle` override
///
/// # Errors
///
/// A string starting with `ImageLoadFailed`, `InvalidCropRegion` or
/// `MissingDate`.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn composite_photo(
    image: &JsSourceImage,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation_degrees: f64,
    circle: bool,
    date: Option<String>,
    style: JsValue,
) -> Result<JsCompositeResult, JsValue> {
    let style = style_from_js(style)?;
    let source = image.to_source().map_err(to_js_error)?;
    run_composite(
        &source,
        x,
        y,
        width,
        height,
        rotation_degrees,
        circle,
        date.as_deref(),
        style,
    )
    .map(JsCompositeResult::from_result)
    .map_err(to_js_error)
}

/// Decode and composite in one call.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn composite_bytes(
    bytes: &[u8],
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation_degrees: f64,
    circle: bool,
    date: Option<String>,
) -> Result<JsCompositeResult, JsValue> {
    photostamp_core::composite_bytes(
        bytes,
        &CropRect::new(x, y, width, height),
        rotation_degrees,
        shape_from_flag(circle),
        parse_date(date.as_deref()),
    )
    .map(JsCompositeResult::from_result)
    .map_err(to_js_error)
}

/// The `YYYY/MM/DD` label text for a date input value.
#[wasm_bindgen]
pub fn format_date_label(date: &str) -> Result<String, JsValue> {
    parse_date(Some(date))
        .map(label::format_date_text)
        .ok_or_else(|| to_js_error(CompositeError::MissingDate))
}

/// The download name, `photo_YYYY-MM-DD.png`, for a date input value.
#[wasm_bindgen]
pub fn output_file_name(date: &str) -> Result<String, JsValue> {
    parse_date(Some(date))
        .map(label::output_file_name)
        .ok_or_else(|| to_js_error(CompositeError::MissingDate))
}

/// Label geometry for a preview overlay, as a plain JS object.
#[wasm_bindgen]
pub fn label_layout(date: &str, width: u32, height: u32, style: JsValue) -> Result<JsValue, JsValue> {
    let style = style_from_js(style)?;
    let date = parse_date(Some(date)).ok_or_else(|| to_js_error(CompositeError::MissingDate))?;
    let layout = label::format_label(date, width, height, &style);
    serde_wasm_bindgen::to_value(&layout).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Default label style, as a plain JS object.
#[wasm_bindgen]
pub fn default_label_style() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&LabelStyle::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
