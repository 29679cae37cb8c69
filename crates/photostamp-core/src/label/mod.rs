//! Date label formatting and placement.
//!
//! The label is the `YYYY/MM/DD` token burned into the bottom-left corner of
//! the output. Its size follows the output width (5%, capped at 32px) and
//! the same token, with `/` swapped for `-`, names the downloaded file.
//!
//! ## Layout
//!
//! ```text
//!  ┌──────────────────────── canvas ────────────────────────┐
//!  │                                                        │
//!  │  ┌─ box ─────────────┐  box.y = H - font - 3p          │
//!  │  │ p  2024/03/07  p  │  text baseline = H - 2p         │
//!  │  └───────────────────┘  box bottom = H - p             │
//!  │ p                                                      │
//!  └────────────────────────────────────────────────────────┘
//! ```

pub mod glyph;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub use glyph::measure_text;

/// Label tunables. Defaults give the standard date stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    /// Font size as a fraction of output width.
    pub font_size_ratio: f64,
    /// Font size cap in pixels.
    pub max_font_size_px: f64,
    /// Padding as a fraction of font size.
    pub padding_ratio: f64,
    /// Background box color (RGB).
    pub background: [u8; 3],
    /// Background box opacity (0.0 to 1.0).
    pub background_opacity: f64,
    /// Text color (RGB, drawn opaque).
    pub text_color: [u8; 3],
    /// Thicken strokes for a bold face.
    pub bold: bool,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size_ratio: 0.05,
            max_font_size_px: 32.0,
            padding_ratio: 0.75,
            background: [0, 0, 0],
            background_opacity: 0.7,
            text_color: [255, 255, 255],
            bold: true,
        }
    }
}

impl LabelStyle {
    /// Font size for an output of the given width.
    pub fn font_size_for(&self, output_width: u32) -> f64 {
        (f64::from(output_width) * self.font_size_ratio).min(self.max_font_size_px)
    }
}

/// Axis-aligned rectangle on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelRect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &LabelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// A fully laid-out date label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateLabel {
    /// `YYYY/MM/DD`.
    pub text: String,
    pub font_size_px: f64,
    pub padding_px: f64,
    /// Background box.
    pub box_rect: LabelRect,
    /// Left end of the text baseline.
    pub text_origin: (f64, f64),
    /// Measured text advance.
    pub text_width: f64,
}

impl DateLabel {
    /// Bounds of the rendered glyph cells.
    pub fn text_rect(&self) -> LabelRect {
        let (x, baseline) = self.text_origin;
        LabelRect {
            x,
            y: baseline - self.font_size_px,
            width: self.text_width,
            height: self.font_size_px,
        }
    }
}

/// Format a date as `YYYY/MM/DD` with zero-padded month and day.
pub fn format_date_text(date: NaiveDate) -> String {
    format!("{:04}/{:02}/{:02}", date.year(), date.month(), date.day())
}

/// The date token used in file names: `YYYY-MM-DD`.
pub fn file_name_token(date: NaiveDate) -> String {
    format_date_text(date).replace('/', "-")
}

/// Download name for a composite stamped with `date`.
pub fn output_file_name(date: NaiveDate) -> String {
    format!("photo_{}.png", file_name_token(date))
}

/// Lay out the label for a `width x height` output.
///
/// The box is anchored `padding` from the left and bottom edges; the text
/// sits `2 * padding` from the left edge with its baseline `2 * padding`
/// above the bottom, so the glyphs always fall inside the box.
pub fn format_label(date: NaiveDate, width: u32, height: u32, style: &LabelStyle) -> DateLabel {
    let text = format_date_text(date);
    let font_size_px = style.font_size_for(width);
    let padding_px = font_size_px * style.padding_ratio;
    let text_width = measure_text(&text, font_size_px);
    let canvas_h = f64::from(height);

    let box_rect = LabelRect {
        x: padding_px,
        y: canvas_h - font_size_px - padding_px * 3.0,
        width: text_width + padding_px * 2.0,
        height: font_size_px + padding_px * 2.0,
    };
    let text_origin = (padding_px * 2.0, canvas_h - padding_px * 2.0);

    tracing::debug!(
        text = %text,
        font_size_px,
        padding_px,
        box_x = box_rect.x,
        box_y = box_rect.y,
        "laid out date label"
    );

    DateLabel {
        text,
        font_size_px,
        padding_px,
        box_rect,
        text_origin,
        text_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_text_is_zero_padded() {
        assert_eq!(format_date_text(date(2024, 3, 7)), "2024/03/07");
        assert_eq!(format_date_text(date(1999, 12, 31)), "1999/12/31");
    }

    #[test]
    fn test_file_name_token() {
        assert_eq!(file_name_token(date(2024, 3, 7)), "2024-03-07");
        assert_eq!(output_file_name(date(2024, 3, 7)), "photo_2024-03-07.png");
    }

    #[test]
    fn test_font_size_scales_with_width() {
        let style = LabelStyle::default();
        assert!((style.font_size_for(100) - 5.0).abs() < 1e-9);
        assert!((style.font_size_for(400) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_font_size_is_capped() {
        let style = LabelStyle::default();
        assert_eq!(style.font_size_for(1000), 32.0);
        assert_eq!(style.font_size_for(4000), 32.0);
    }

    #[test]
    fn test_layout_at_default_style() {
        let label = format_label(date(2024, 3, 7), 400, 300, &LabelStyle::default());

        assert_eq!(label.text, "2024/03/07");
        assert!((label.font_size_px - 20.0).abs() < 1e-9);
        assert!((label.padding_px - 15.0).abs() < 1e-9);
        assert!((label.text_width - 200.0).abs() < 1e-9);

        let b = label.box_rect;
        assert!((b.x - 15.0).abs() < 1e-9);
        assert!((b.bottom() - 285.0).abs() < 1e-9);
        assert!((b.height - 50.0).abs() < 1e-9);
        assert!((b.width - 230.0).abs() < 1e-9);

        assert!((label.text_origin.0 - 30.0).abs() < 1e-9);
        assert!((label.text_origin.1 - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_box_contains_text() {
        let label = format_label(date(2024, 3, 7), 1000, 800, &LabelStyle::default());
        assert!(label.box_rect.contains_rect(&label.text_rect()));
    }

    #[test]
    fn test_style_deserializes_partial_overrides() {
        use serde::de::value::{Error, MapDeserializer};

        let entries = vec![("max_font_size_px", 48.0f64)];
        let de: MapDeserializer<'_, _, Error> = MapDeserializer::new(entries.into_iter());
        let style = LabelStyle::deserialize(de).unwrap();

        assert_eq!(style.max_font_size_px, 48.0);
        assert_eq!(style.padding_ratio, 0.75);
        assert!(style.bold);
    }
}
