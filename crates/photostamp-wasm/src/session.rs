//! Editing session WASM bindings.
//!
//! `JsEditSession` keeps the decoded source and the current settings on the
//! WASM side and calls back into JavaScript whenever they change.
//!
//! ```typescript
//! const session = new JsEditSession();
//! session.subscribe((event: string) => {
//!   if (event === 'result-cleared') downloadButton.disabled = true;
//! });
//! session.load_source(bytes);
//! session.select_crop(1, 1, 1.5, 0.5, 0.5);
//! session.set_date(dateInput.value);
//! const result = session.generate();
//! ```

use photostamp_core::{AspectRatio, CompositeError, CropRect, CropSelection, EditSession};
use wasm_bindgen::prelude::*;

use crate::composite::{parse_date, shape_from_flag, style_from_js};
use crate::types::{to_js_error, JsCompositeResult, JsSourceImage};

#[wasm_bindgen]
pub struct JsEditSession {
    inner: EditSession,
}

impl Default for JsEditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl JsEditSession {
    fn install_source(&mut self, image: &JsSourceImage) -> Result<(), CompositeError> {
        self.inner.set_source(image.to_source()?)
    }
}

#[wasm_bindgen]
impl JsEditSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsEditSession {
        JsEditSession {
            inner: EditSession::new(),
        }
    }

    /// Call `callback(eventName)` on every session change.
    pub fn subscribe(&mut self, callback: js_sys::Function) {
        self.inner.subscribe(move |event| {
            // A throwing listener must not break the session.
            let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(event.name()));
        });
    }

    /// Decode and install an upload. On failure the previous image stays.
    pub fn load_source(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load_source(bytes).map_err(to_js_error)
    }

    /// Install an already-decoded image. A malformed buffer is rejected
    /// and the previous image, crop and result stay.
    pub fn set_source(&mut self, image: &JsSourceImage) -> Result<(), JsValue> {
        self.install_source(image).map_err(to_js_error)
    }

    pub fn set_crop(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.inner.set_crop(CropRect::new(x, y, width, height));
    }

    /// Set the crop from zoom and pan.
    ///
    /// A non-positive aspect means "same as the image". Returns `false`
    /// when no source is loaded.
    pub fn select_crop(
        &mut self,
        aspect_width: f64,
        aspect_height: f64,
        zoom: f64,
        center_x: f64,
        center_y: f64,
    ) -> bool {
        let rect = match self.inner.source() {
            Some(source) => {
                let aspect = if aspect_width > 0.0 && aspect_height > 0.0 {
                    AspectRatio::Ratio {
                        width: aspect_width,
                        height: aspect_height,
                    }
                } else {
                    AspectRatio::Original
                };
                CropSelection::new(aspect, zoom, center_x, center_y)
                    .with_shape(self.inner.settings().shape)
                    .to_crop_rect(source.width, source.height)
            }
            None => return false,
        };
        self.inner.set_crop(rect);
        true
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.inner.set_rotation(degrees);
    }

    pub fn set_circle(&mut self, circle: bool) {
        self.inner.set_shape(shape_from_flag(circle));
    }

    /// Set the date from a date input value; empty clears it.
    pub fn set_date(&mut self, date: Option<String>) {
        self.inner.set_date(parse_date(date.as_deref()));
    }

    pub fn set_style(&mut self, style: JsValue) -> Result<(), JsValue> {
        self.inner.set_style(style_from_js(style)?);
        Ok(())
    }

    /// Composite the current settings. Errors keep the previous result.
    pub fn generate(&mut self) -> Result<JsCompositeResult, JsValue> {
        self.inner
            .generate()
            .map(|r| JsCompositeResult::from_result(r.clone()))
            .map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn has_result(&self) -> bool {
        self.inner.result().is_some()
    }

    /// Latest result, or `undefined` once the source changed.
    pub fn result(&self) -> Option<JsCompositeResult> {
        self.inner
            .result()
            .cloned()
            .map(JsCompositeResult::from_result)
    }
}
