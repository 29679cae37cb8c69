//! Premultiplied RGBA8 drawing surface.

use crate::encode::{encode_png, EncodeError};

/// A premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over blend of `src` onto `dst`, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Scale every channel of a premultiplied pixel by `coverage / 255`.
pub fn scale(px: PremulRgba8, coverage: u8) -> PremulRgba8 {
    match coverage {
        255 => px,
        0 => [0, 0, 0, 0],
        c => [
            mul_div255(u16::from(px[0]), u16::from(c)),
            mul_div255(u16::from(px[1]), u16::from(c)),
            mul_div255(u16::from(px[2]), u16::from(c)),
            mul_div255(u16::from(px[3]), u16::from(c)),
        ],
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

/// Output surface the compositor draws into. Starts fully transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a transparent surface. Returns `None` for a zero-sized one.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let len = (width as usize).checked_mul(height as usize)?.checked_mul(4)?;
        Some(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Premultiplied pixel at `(x, y)`. Panics if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> PremulRgba8 {
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn set(&mut self, x: u32, y: u32, px: PremulRgba8) {
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Blend `src` over the pixel at `(x, y)`.
    pub fn blend(&mut self, x: u32, y: u32, src: PremulRgba8, opacity: f64) {
        let px = over(self.get(x, y), src, opacity);
        self.set(x, y, px);
    }

    /// Raw premultiplied bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Straight-alpha RGBA pixel at `(x, y)`.
    pub fn straight(&self, x: u32, y: u32) -> [u8; 4] {
        demultiply(self.get(x, y))
    }

    /// Convert the whole surface to straight-alpha RGBA bytes.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        self.data
            .chunks_exact(4)
            .flat_map(|p| demultiply([p[0], p[1], p[2], p[3]]))
            .collect()
    }

    /// Encode the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, EncodeError> {
        encode_png(&self.to_straight_rgba(), self.width, self.height)
    }
}

fn demultiply(px: PremulRgba8) -> [u8; 4] {
    let a = u32::from(px[3]);
    match a {
        0 => [0, 0, 0, 0],
        255 => px,
        _ => {
            let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
            [un(px[0]), un(px[1]), un(px[2]), px[3]]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_surface_is_refused() {
        assert!(Surface::new(0, 10).is_none());
        assert!(Surface::new(10, 0).is_none());
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let s = Surface::new(3, 2).unwrap();
        assert_eq!(s.data().len(), 24);
        assert!(s.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_over_opaque_replaces() {
        let out = over([10, 20, 30, 255], [255, 255, 255, 255], 1.0);
        assert_eq!(out, [255, 255, 255, 255]);
    }

    #[test]
    fn test_over_onto_transparent() {
        let out = over([0, 0, 0, 0], [0, 0, 0, 255], 0.7);
        assert_eq!(out, [0, 0, 0, 179]);
    }

    #[test]
    fn test_over_darkens_opaque_white() {
        let out = over([255, 255, 255, 255], [0, 0, 0, 255], 0.7);
        assert_eq!(out[3], 255);
        assert_eq!(out[0], 76);
    }

    #[test]
    fn test_over_zero_opacity_is_noop() {
        let dst = [1, 2, 3, 4];
        assert_eq!(over(dst, [255, 255, 255, 255], 0.0), dst);
    }

    #[test]
    fn test_scale() {
        assert_eq!(scale([200, 100, 50, 255], 255), [200, 100, 50, 255]);
        assert_eq!(scale([200, 100, 50, 255], 0), [0, 0, 0, 0]);
        assert_eq!(scale([200, 100, 50, 255], 128), [100, 50, 25, 128]);
    }

    #[test]
    fn test_demultiply_round_trips_opaque_and_clear() {
        assert_eq!(demultiply([1, 2, 3, 255]), [1, 2, 3, 255]);
        assert_eq!(demultiply([0, 0, 0, 0]), [0, 0, 0, 0]);
        assert_eq!(demultiply([64, 32, 0, 128]), [128, 64, 0, 128]);
    }
}
