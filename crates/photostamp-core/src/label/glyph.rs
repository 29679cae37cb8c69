//! Bitmap glyphs for the date label.
//!
//! Glyphs come from the `font8x8` public-domain 8x8 font and are scaled
//! to a square `font_size x font_size` cell with nearest-neighbour lookup.
//! Every glyph advances by exactly one cell, so text width is a pure
//! function of character count and font size.

use font8x8::{UnicodeFonts, BASIC_FONTS};

/// Rows and columns in a source glyph.
pub const GLYPH_GRID: usize = 8;

/// Horizontal advance of one glyph, in ems.
pub const ADVANCE_EM: f64 = 1.0;

/// Measured width of `text` at `font_size` pixels.
pub fn measure_text(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * ADVANCE_EM
}

/// Row bitmaps for `ch`, substituting `?` for characters the font lacks.
pub fn glyph_rows(ch: char) -> [u8; GLYPH_GRID] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; GLYPH_GRID])
}

/// Whether the glyph cell `(col, row)` is inked.
///
/// Bit `n` of a row is column `n` counted from the left. Bold weight also
/// inks a cell when its left neighbour is inked.
#[inline]
pub fn is_inked(rows: &[u8; GLYPH_GRID], col: usize, row: usize, bold: bool) -> bool {
    if col >= GLYPH_GRID || row >= GLYPH_GRID {
        return false;
    }
    let bits = rows[row];
    let set = |c: usize| (bits >> c) & 1 == 1;
    set(col) || (bold && col > 0 && set(col - 1))
}
