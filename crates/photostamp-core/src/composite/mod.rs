//! The compositing pipeline.
//!
//! [`Compositor::composite`] executes a [`CompositePlan`] against a borrowed
//! [`SourceImage`], in this fixed order:
//! 1. Allocate a transparent `crop.width x crop.height` surface
//! 2. Rotate around the canvas center
//! 3. Draw the crop region 1:1 into the whole surface
//! 4. Return to the unrotated frame
//! 5. Apply the circular clip, if the plan has one
//! 6. Paint the label box, then the label text, axis-aligned
//! 7. Encode as PNG
//!
//! Later steps overwrite or clip earlier ones, so the label is never rotated
//! and never clipped by the circle.
//!
//! The pipeline is stateless: identical inputs give byte-identical PNGs.

mod surface;

pub use surface::{over, scale, PremulRgba8, Surface};

use chrono::NaiveDate;

use crate::decode::{decode_image, SourceImage};
use crate::error::CompositeError;
use crate::label::{format_label, glyph, output_file_name, DateLabel, LabelRect, LabelStyle};
use crate::transform::{resolve, sample_bilinear, CompositePlan, CropRect, CropShape, SampleBounds};

/// A finished composite, ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeResult {
    /// PNG-encoded output.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// `YYYY/MM/DD` text that was stamped.
    pub label_text: String,
    /// `photo_YYYY-MM-DD.png`.
    pub file_name: String,
}

/// Runs composite plans with a given label style.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    style: LabelStyle,
}

impl Compositor {
    pub fn new(style: LabelStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    /// Full pipeline for one generate action.
    ///
    /// # Errors
    ///
    /// - `ImageLoadFailed` if `image` is empty or its pixel buffer is the wrong size
    /// - `MissingDate` if no date was picked
    /// - `InvalidCropRegion` if the crop is degenerate or leaves the image
    #[tracing::instrument(skip(self, image), fields(src_w = image.width, src_h = image.height))]
    pub fn composite_photo(
        &self,
        image: &SourceImage,
        crop: &CropRect,
        rotation_degrees: f64,
        shape: CropShape,
        date: Option<NaiveDate>,
    ) -> Result<CompositeResult, CompositeError> {
        image.validate()?;
        let date = date.ok_or(CompositeError::MissingDate)?;

        let plan = resolve(crop, rotation_degrees, shape)?;
        crop.ensure_within(image.width, image.height)?;

        let label = format_label(date, plan.width, plan.height, &self.style);
        let png = self.composite(image, &plan, &label)?;

        tracing::debug!(bytes = png.len(), "composite finished");

        Ok(CompositeResult {
            png,
            width: plan.width,
            height: plan.height,
            label_text: label.text,
            file_name: output_file_name(date),
        })
    }

    /// Execute `plan` and `label` against `image` and encode the result.
    pub fn composite(
        &self,
        image: &SourceImage,
        plan: &CompositePlan,
        label: &DateLabel,
    ) -> Result<Vec<u8>, CompositeError> {
        let surface = self.render(image, plan, label)?;
        Ok(surface.encode_png()?)
    }

    /// Steps 1-6: everything but encoding.
    pub fn render(
        &self,
        image: &SourceImage,
        plan: &CompositePlan,
        label: &DateLabel,
    ) -> Result<Surface, CompositeError> {
        let mut surface = draw_source(image, plan)?;
        if let Some(clip) = &plan.clip {
            apply_clip(&mut surface, |x, y| clip.coverage(x, y));
        }
        self.paint_label(&mut surface, label);
        Ok(surface)
    }

    fn paint_label(&self, surface: &mut Surface, label: &DateLabel) {
        let [r, g, b] = self.style.background;
        fill_rect(
            surface,
            &label.box_rect,
            [r, g, b, 255],
            self.style.background_opacity,
        );

        let [r, g, b] = self.style.text_color;
        draw_text(
            surface,
            label,
            [r, g, b, 255],
            self.style.bold,
        );
    }
}

/// Composite with the default label style.
pub fn composite(
    image: &SourceImage,
    crop: &CropRect,
    rotation_degrees: f64,
    shape: CropShape,
    date: Option<NaiveDate>,
) -> Result<CompositeResult, CompositeError> {
    Compositor::default().composite_photo(image, crop, rotation_degrees, shape, date)
}

/// Decode uploaded bytes, then composite. The decode is the pipeline's only
/// wait; nothing is drawn if it fails.
pub fn composite_bytes(
    bytes: &[u8],
    crop: &CropRect,
    rotation_degrees: f64,
    shape: CropShape,
    date: Option<NaiveDate>,
) -> Result<CompositeResult, CompositeError> {
    let image = decode_image(bytes)?;
    composite(&image, crop, rotation_degrees, shape, date)
}

/// Steps 1-4: allocate the surface and draw the rotated crop into it.
pub(crate) fn draw_source(image: &SourceImage, plan: &CompositePlan) -> Result<Surface, CompositeError> {
    image.validate()?;
    let mut surface = Surface::new(plan.width, plan.height).ok_or_else(|| {
        CompositeError::invalid_crop(format!(
            "cannot allocate a {}x{} surface",
            plan.width, plan.height
        ))
    })?;

    let crop = &plan.crop;
    let bounds = SampleBounds::covering(image, crop.x, crop.y, crop.width, crop.height);
    let canvas_w = f64::from(plan.width);
    let canvas_h = f64::from(plan.height);

    for y in 0..plan.height {
        for x in 0..plan.width {
            let cx = f64::from(x) + 0.5;
            let cy = f64::from(y) + 0.5;
            let (dx, dy) = if plan.rotation.is_identity() {
                (cx, cy)
            } else {
                plan.rotation.invert(cx, cy)
            };

            // Outside the drawn crop the canvas stays transparent.
            if dx < 0.0 || dy < 0.0 || dx >= canvas_w || dy >= canvas_h {
                continue;
            }

            let px = sample_bilinear(image, crop.x + dx - 0.5, crop.y + dy - 0.5, bounds);
            surface.set(x, y, px);
        }
    }

    Ok(surface)
}

/// Step 5: keep only where the surface and the clip overlap.
pub(crate) fn apply_clip(surface: &mut Surface, coverage: impl Fn(u32, u32) -> u8) {
    for y in 0..surface.height() {
        for x in 0..surface.width() {
            let c = coverage(x, y);
            if c != 255 {
                let px = scale(surface.get(x, y), c);
                surface.set(x, y, px);
            }
        }
    }
}

/// Pixel span `[start, end)` touched by the interval `lo..hi`, clipped to `0..limit`.
fn pixel_span(lo: f64, hi: f64, limit: u32) -> (u32, u32) {
    let max = f64::from(limit);
    let start = lo.floor().clamp(0.0, max) as u32;
    let end = hi.ceil().clamp(0.0, max) as u32;
    (start, end)
}

/// Fill `rect` with `color`, weighting edge pixels by how much of them it covers.
pub(crate) fn fill_rect(surface: &mut Surface, rect: &LabelRect, color: PremulRgba8, opacity: f64) {
    let (x0, x1) = pixel_span(rect.x, rect.right(), surface.width());
    let (y0, y1) = pixel_span(rect.y, rect.bottom(), surface.height());

    for y in y0..y1 {
        let py = f64::from(y);
        let cover_y = (rect.bottom().min(py + 1.0) - rect.y.max(py)).clamp(0.0, 1.0);
        for x in x0..x1 {
            let px = f64::from(x);
            let cover_x = (rect.right().min(px + 1.0) - rect.x.max(px)).clamp(0.0, 1.0);
            let coverage = cover_x * cover_y;
            if coverage > 0.0 {
                surface.blend(x, y, color, opacity * coverage);
            }
        }
    }
}

/// Draw the label glyphs, each in a `font_size` square cell on the baseline.
pub(crate) fn draw_text(surface: &mut Surface, label: &DateLabel, color: PremulRgba8, bold: bool) {
    let size = label.font_size_px;
    if size <= 0.0 {
        return;
    }
    let (origin_x, baseline) = label.text_origin;
    let top = baseline - size;
    let grid = glyph::GLYPH_GRID as f64;
    let (y0, y1) = pixel_span(top, baseline, surface.height());

    for (i, ch) in label.text.chars().enumerate() {
        let rows = glyph::glyph_rows(ch);
        let left = origin_x + i as f64 * size * glyph::ADVANCE_EM;
        let (x0, x1) = pixel_span(left, left + size, surface.width());

        for y in y0..y1 {
            let v = (f64::from(y) + 0.5 - top) / size;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let row = (v * grid) as usize;
            for x in x0..x1 {
                let u = (f64::from(x) + 0.5 - left) / size;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                let col = (u * grid) as usize;
                if glyph::is_inked(&rows, col, row, bold) {
                    surface.blend(x, y, color, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use crate::mask::CircleClip;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    /// Opaque image whose red channel encodes x and green encodes y.
    fn coordinate_image(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 128, 255]);
            }
        }
        SourceImage::new(width, height, pixels)
    }

    fn decode(png: &[u8]) -> image::RgbaImage {
        image::load_from_memory(png).unwrap().into_rgba8()
    }

    #[test]
    fn test_output_matches_crop_size() {
        let img = coordinate_image(200, 150);
        let crop = CropRect::new(10.0, 20.0, 120.0, 90.0);
        let result = composite(&img, &crop, 0.0, CropShape::Rectangle, Some(date())).unwrap();

        assert_eq!((result.width, result.height), (120, 90));
        assert_eq!(decode(&result.png).dimensions(), (120, 90));
    }

    #[test]
    fn test_size_ignores_rotation_and_shape() {
        let img = coordinate_image(200, 150);
        let crop = CropRect::new(0.0, 0.0, 77.0, 41.0);
        for shape in [CropShape::Rectangle, CropShape::Circle] {
            for angle in [0.0, 33.0, 90.0, 271.5] {
                let result = composite(&img, &crop, angle, shape, Some(date())).unwrap();
                assert_eq!(decode(&result.png).dimensions(), (77, 41));
            }
        }
    }

    #[test]
    fn test_result_names() {
        let img = coordinate_image(50, 50);
        let result = composite(&img, &CropRect::full(50, 50), 0.0, CropShape::Rectangle, Some(date())).unwrap();
        assert_eq!(result.label_text, "2024/03/07");
        assert_eq!(result.file_name, "photo_2024-03-07.png");
    }

    #[test]
    fn test_crop_is_copied_one_to_one() {
        let img = coordinate_image(100, 100);
        let plan = resolve(&CropRect::new(30.0, 40.0, 20.0, 10.0), 0.0, CropShape::Rectangle).unwrap();
        let surface = draw_source(&img, &plan).unwrap();

        assert_eq!(surface.straight(0, 0), [30, 40, 128, 255]);
        assert_eq!(surface.straight(19, 9), [49, 49, 128, 255]);
    }

    #[test]
    fn test_half_turn_flips_crop() {
        let img = coordinate_image(100, 100);
        let plan = resolve(&CropRect::new(30.0, 40.0, 20.0, 10.0), 180.0, CropShape::Rectangle).unwrap();
        let surface = draw_source(&img, &plan).unwrap();

        assert_eq!(surface.straight(0, 0), [49, 49, 128, 255]);
        assert_eq!(surface.straight(19, 9), [30, 40, 128, 255]);
    }

    #[test]
    fn test_rotation_leaves_corners_transparent() {
        let img = coordinate_image(100, 100);
        let plan = resolve(&CropRect::new(0.0, 0.0, 100.0, 40.0), 45.0, CropShape::Rectangle).unwrap();
        let surface = draw_source(&img, &plan).unwrap();

        assert_eq!(surface.get(0, 0)[3], 0);
        assert_eq!(surface.get(50, 20)[3], 255);
    }

    #[test]
    fn test_circle_clears_corner_keeps_center() {
        let img = coordinate_image(100, 100);
        let crop = CropRect::full(100, 100);
        let result = composite(&img, &crop, 0.0, CropShape::Circle, Some(date())).unwrap();
        let out = decode(&result.png);

        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(99, 0).0[3], 0);
        assert_eq!(out.get_pixel(50, 50).0, [50, 50, 128, 255]);
    }

    #[test]
    fn test_circle_center_keeps_source_alpha() {
        let img = SourceImage::filled(60, 60, [10, 200, 30, 90]);
        let crop = CropRect::full(60, 60);
        let result = composite(&img, &crop, 0.0, CropShape::Circle, Some(date())).unwrap();
        let out = decode(&result.png);

        assert_eq!(out.get_pixel(30, 30).0[3], 90);
    }

    #[test]
    fn test_rectangle_only_label_changes_alpha() {
        let img = SourceImage::filled(200, 120, [40, 80, 120, 200]);
        let crop = CropRect::full(200, 120);
        let plan = resolve(&crop, 0.0, CropShape::Rectangle).unwrap();
        let compositor = Compositor::default();
        let label = format_label(date(), plan.width, plan.height, compositor.style());

        let drawn = draw_source(&img, &plan).unwrap();
        let finished = compositor.render(&img, &plan, &label).unwrap();
        let b = label.box_rect;

        for y in 0..plan.height {
            for x in 0..plan.width {
                let inside_box = f64::from(x) + 1.0 > b.x
                    && f64::from(x) < b.right()
                    && f64::from(y) + 1.0 > b.y
                    && f64::from(y) < b.bottom();
                if !inside_box {
                    assert_eq!(
                        finished.get(x, y)[3],
                        drawn.get(x, y)[3],
                        "alpha changed outside label at ({}, {})",
                        x,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn test_label_darkens_box_and_draws_white_text() {
        let img = SourceImage::filled(400, 300, [255, 255, 255, 255]);
        let crop = CropRect::full(400, 300);
        let plan = resolve(&crop, 0.0, CropShape::Rectangle).unwrap();
        let compositor = Compositor::default();
        let label = format_label(date(), plan.width, plan.height, compositor.style());
        let surface = compositor.render(&img, &plan, &label).unwrap();

        // Box interior at the left padding, away from any glyph.
        assert_eq!(surface.straight(20, 270), [76, 76, 76, 255]);
        // Top-left of the canvas is untouched.
        assert_eq!(surface.straight(0, 0), [255, 255, 255, 255]);

        // Some pixel in the text rectangle is pure white again.
        let t = label.text_rect();
        let mut white = 0;
        for y in (t.y as u32)..(t.bottom() as u32) {
            for x in (t.x as u32)..(t.right() as u32) {
                if surface.straight(x, y) == [255, 255, 255, 255] {
                    white += 1;
                }
            }
        }
        assert!(white > 0, "label text should be drawn");
    }

    #[test]
    fn test_label_is_painted_over_clipped_corner() {
        let img = SourceImage::filled(400, 400, [0, 0, 255, 255]);
        let crop = CropRect::full(400, 400);
        let result = composite(&img, &crop, 0.0, CropShape::Circle, Some(date())).unwrap();
        let out = decode(&result.png);

        // Bottom-left label box lies outside the circle but stays visible.
        let px = out.get_pixel(20, 370).0;
        assert_eq!(px[3], 179);
    }

    #[test]
    fn test_clip_coverage_is_applied() {
        let mut surface = Surface::new(2, 1).unwrap();
        surface.set(0, 0, [255, 255, 255, 255]);
        surface.set(1, 0, [255, 255, 255, 255]);
        apply_clip(&mut surface, |x, _| if x == 0 { 0 } else { 255 });
        assert_eq!(surface.get(0, 0), [0, 0, 0, 0]);
        assert_eq!(surface.get(1, 0), [255, 255, 255, 255]);

        let clip = CircleClip::inscribed(2, 1);
        assert_eq!(clip.radius, 0.5);
    }

    #[test]
    fn test_fill_rect_partial_edges() {
        let mut surface = Surface::new(4, 1).unwrap();
        let rect = LabelRect {
            x: 0.5,
            y: 0.0,
            width: 2.0,
            height: 1.0,
        };
        fill_rect(&mut surface, &rect, [0, 0, 0, 255], 1.0);

        assert_eq!(surface.get(0, 0)[3], 128);
        assert_eq!(surface.get(1, 0)[3], 255);
        assert_eq!(surface.get(2, 0)[3], 128);
        assert_eq!(surface.get(3, 0)[3], 0);
    }

    #[test]
    fn test_invalid_crop_produces_nothing() {
        let img = coordinate_image(100, 100);
        let crop = CropRect::new(0.0, 0.0, 0.0, 50.0);
        let err = composite(&img, &crop, 0.0, CropShape::Rectangle, Some(date())).unwrap_err();
        assert!(matches!(err, CompositeError::InvalidCropRegion { .. }));
    }

    #[test]
    fn test_crop_outside_image_is_invalid() {
        let img = coordinate_image(100, 100);
        let crop = CropRect::new(60.0, 0.0, 50.0, 50.0);
        let err = composite(&img, &crop, 0.0, CropShape::Rectangle, Some(date())).unwrap_err();
        assert_eq!(err.code(), "InvalidCropRegion");
    }

    #[test]
    fn test_missing_date() {
        let img = coordinate_image(10, 10);
        let err = composite(&img, &CropRect::full(10, 10), 0.0, CropShape::Rectangle, None).unwrap_err();
        assert_eq!(err, CompositeError::MissingDate);
    }

    #[test]
    fn test_empty_image_is_load_failure() {
        let img = SourceImage::new(0, 0, vec![]);
        let err = composite(&img, &CropRect::full(10, 10), 0.0, CropShape::Rectangle, Some(date())).unwrap_err();
        assert_eq!(err, CompositeError::ImageLoadFailed(DecodeError::Empty));
    }

    #[test]
    fn test_short_pixel_buffer_is_load_failure() {
        let img = SourceImage {
            width: 10,
            height: 10,
            pixels: vec![255; 8],
        };
        let err = composite(&img, &CropRect::full(10, 10), 0.0, CropShape::Rectangle, Some(date())).unwrap_err();
        assert_eq!(
            err,
            CompositeError::ImageLoadFailed(DecodeError::PixelBufferMismatch {
                expected: 400,
                actual: 8
            })
        );
    }

    #[test]
    fn test_render_rejects_short_pixel_buffer() {
        let img = SourceImage {
            width: 20,
            height: 20,
            pixels: vec![0; 20 * 4],
        };
        let plan = resolve(&CropRect::full(20, 20), 30.0, CropShape::Circle).unwrap();
        let compositor = Compositor::default();
        let label = format_label(date(), plan.width, plan.height, compositor.style());
        let err = compositor.render(&img, &plan, &label).unwrap_err();
        assert_eq!(err.code(), "ImageLoadFailed");
    }

    #[test]
    fn test_composite_bytes_reports_decode_failure() {
        let err = composite_bytes(b"not an image", &CropRect::full(10, 10), 0.0, CropShape::Rectangle, Some(date()))
            .unwrap_err();
        assert_eq!(err.code(), "ImageLoadFailed");
    }

    #[test]
    fn test_composite_bytes_round_trip() {
        let img = coordinate_image(64, 48);
        let png = encode_source(&img);
        let result = composite_bytes(&png, &CropRect::new(8.0, 8.0, 32.0, 32.0), 0.0, CropShape::Rectangle, Some(date()))
            .unwrap();
        let out = decode(&result.png);
        assert_eq!(out.get_pixel(0, 0).0, [8, 8, 128, 255]);
    }

    #[test]
    fn test_custom_style_is_used() {
        let compositor = Compositor::new(LabelStyle {
            background_opacity: 1.0,
            ..LabelStyle::default()
        });

        let img = SourceImage::filled(400, 300, [255, 255, 255, 255]);
        let crop = CropRect::full(400, 300);
        let plan = resolve(&crop, 0.0, CropShape::Rectangle).unwrap();
        let label = format_label(date(), plan.width, plan.height, compositor.style());
        let surface = compositor.render(&img, &plan, &label).unwrap();

        assert_eq!(surface.straight(20, 270), [0, 0, 0, 255]);
    }

    fn encode_source(img: &SourceImage) -> Vec<u8> {
        crate::encode::encode_png(&img.pixels, img.width, img.height).unwrap()
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn gradient_image(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[
                    (x * 7 % 256) as u8,
                    (y * 5 % 256) as u8,
                    ((x + y) % 256) as u8,
                    (128 + (x * y) % 128) as u8,
                ]);
            }
        }
        SourceImage::new(width, height, pixels)
    }

    fn shape_strategy() -> impl Strategy<Value = CropShape> {
        prop_oneof![Just(CropShape::Rectangle), Just(CropShape::Circle)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: Identical inputs give byte-identical output.
        #[test]
        fn prop_composite_is_deterministic(
            (w, h) in (8u32..=48, 8u32..=48),
            angle in 0.0f64..360.0,
            shape in shape_strategy(),
        ) {
            let img = gradient_image(64, 64);
            let crop = CropRect::new(4.0, 4.0, f64::from(w), f64::from(h));
            let date = NaiveDate::from_ymd_opt(2024, 3, 7);

            let a = composite(&img, &crop, angle, shape, date).unwrap();
            let b = composite(&img, &crop, angle, shape, date).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Property: Output size always equals the crop size.
        #[test]
        fn prop_output_size_equals_crop(
            (x, y) in (0u32..=16, 0u32..=16),
            (w, h) in (1u32..=48, 1u32..=48),
            angle in -720.0f64..720.0,
            shape in shape_strategy(),
        ) {
            let img = gradient_image(64, 64);
            let crop = CropRect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h));
            let date = NaiveDate::from_ymd_opt(2001, 1, 1);

            let result = composite(&img, &crop, angle, shape, date).unwrap();
            let out = image::load_from_memory(&result.png).unwrap();
            prop_assert_eq!((out.width(), out.height()), (w, h));
        }

        /// Property: With a circle, the top-left pixel is always transparent.
        #[test]
        fn prop_circle_corner_transparent(
            side in 8u32..=64,
            angle in 0.0f64..360.0,
        ) {
            let img = gradient_image(64, 64);
            let crop = CropRect::new(0.0, 0.0, f64::from(side), f64::from(side));
            let date = NaiveDate::from_ymd_opt(2024, 3, 7);

            let result = composite(&img, &crop, angle, CropShape::Circle, date).unwrap();
            let out = image::load_from_memory(&result.png).unwrap().into_rgba8();
            prop_assert_eq!(out.get_pixel(0, 0).0[3], 0);
        }
    }
}
