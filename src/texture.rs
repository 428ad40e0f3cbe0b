//! Texture Sampling
//!
//! A `Texture` owns a copy of an `Image` taken at construction time (value
//! semantics — the texture and the source image diverge afterwards, so
//! external mutation can never alias into an in-flight draw) and exposes
//! nearest-neighbor sampling in normalized coordinates.
//!
//! Sampling contract: `u` and `v` must be in [0, 1] and the sampling call
//! must match the texture's channel count (`sample_rgb` for 3-channel,
//! `sample_rgba` for 4-channel). Both are checked with `debug_assert!`;
//! violating them in a release build is a caller bug.

use crate::image::Image;

/// Read-only sampling view over an owned pixel buffer
#[derive(Clone)]
pub struct Texture {
    image: Image,
}

impl Texture {
    /// Take an owned copy of `image` for sampling
    pub fn from_image(image: &Image) -> Self {
        Self {
            image: image.clone(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn num_channels(&self) -> u32 {
        self.image.num_channels()
    }

    /// Nearest texel for normalized coordinates: uv scaled onto the
    /// [0, dim-1] texel grid and rounded to the closest center. In-range
    /// input can never index out of bounds, including uv = 1.0.
    #[inline]
    fn texel_index(&self, u: f32, v: f32) -> usize {
        debug_assert!(
            self.image.width() > 0 && self.image.height() > 0,
            "sampling a zero-sized texture"
        );
        debug_assert!((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v));
        let x = (u * (self.image.width() - 1) as f32).round() as u32;
        let y = (v * (self.image.height() - 1) as f32).round() as u32;
        self.image.pixel_index(x, y)
    }

    /// Sample a 3-channel texture, scaling bytes to [0, 1]
    #[inline]
    pub fn sample_rgb(&self, u: f32, v: f32) -> [f32; 3] {
        debug_assert_eq!(self.image.num_channels(), 3);
        let idx = self.texel_index(u, v);
        let data = self.image.data();
        [
            data[idx] as f32 / 255.0,
            data[idx + 1] as f32 / 255.0,
            data[idx + 2] as f32 / 255.0,
        ]
    }

    /// Sample a 4-channel texture, scaling bytes to [0, 1]
    #[inline]
    pub fn sample_rgba(&self, u: f32, v: f32) -> [f32; 4] {
        debug_assert_eq!(self.image.num_channels(), 4);
        let idx = self.texel_index(u, v);
        let data = self.image.data();
        [
            data[idx] as f32 / 255.0,
            data[idx + 1] as f32 / 255.0,
            data[idx + 2] as f32 / 255.0,
            data[idx + 3] as f32 / 255.0,
        ]
    }

    /// Sample with the channel count dispatched at runtime; 3-channel
    /// textures get an opaque alpha. Convenience for generic fragment
    /// shaders that accept either format.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        match self.image.num_channels() {
            3 => {
                let [r, g, b] = self.sample_rgb(u, v);
                [r, g, b, 1.0]
            },
            4 => self.sample_rgba(u, v),
            n => {
                debug_assert!(false, "unsupported texture channel count: {}", n);
                [0.0, 0.0, 0.0, 1.0]
            },
        }
    }
}

// ============================================================================
// TextureTable
// ============================================================================

/// The `slot -> texture` lookup handed to fragment shaders for one draw.
/// Materialized from a primitive's bindings before the draw starts and valid
/// for its whole duration.
pub struct TextureTable<'a> {
    slots: Vec<&'a Texture>,
}

impl<'a> TextureTable<'a> {
    /// A table with no bound textures
    pub const fn empty() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn from_slots(slots: Vec<&'a Texture>) -> Self {
        Self { slots }
    }

    /// Texture bound at `slot`, or None when the slot is unbound
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&'a Texture> {
        self.slots.get(slot).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ============================================================================
// Procedural Texture Generators
// ============================================================================

impl Texture {
    /// Generate a checkerboard pattern (RGBA)
    pub fn checkerboard(size: u32, tile_size: u32, c1: [u8; 3], c2: [u8; 3]) -> Self {
        let mut image = Image::new(size, size, 4);
        for y in 0..size {
            for x in 0..size {
                let checker = ((x / tile_size) + (y / tile_size)) % 2 == 0;
                let [r, g, b] = if checker { c1 } else { c2 };
                image.set_pixel(x, y, &[r, g, b, 255]);
            }
        }
        Self { image }
    }

    /// Generate an XOR pattern (RGBA, classic test texture)
    pub fn xor_pattern(size: u32) -> Self {
        let mut image = Image::new(size, size, 4);
        for y in 0..size {
            for x in 0..size {
                let v = (x ^ y) as u8;
                image.set_pixel(x, y, &[v, v, v, 255]);
            }
        }
        Self { image }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_4x4() -> Texture {
        // Distinct value per texel so corner samples are unambiguous
        let mut image = Image::new(4, 4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let v = (y * 4 + x) as u8 * 16;
                image.set_pixel(x, y, &[v, v, v, 255]);
            }
        }
        Texture::from_image(&image)
    }

    #[test]
    fn test_sample_origin_hits_top_left_texel() {
        let tex = gradient_4x4();
        let c = tex.sample_rgba(0.0, 0.0);
        assert_eq!(c[0], 0.0);
    }

    #[test]
    fn test_sample_near_one_hits_bottom_right_texel() {
        let tex = gradient_4x4();
        // uv just below 1.0 must hit the last texel, never out of bounds
        let c = tex.sample_rgba(0.9999, 0.9999);
        let expected = 15.0 * 16.0 / 255.0;
        assert!((c[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_sample_exact_one_stays_in_bounds() {
        let tex = gradient_4x4();
        let c = tex.sample_rgba(1.0, 1.0);
        let expected = 15.0 * 16.0 / 255.0;
        assert!((c[0] - expected).abs() < 1e-6);
    }

    #[test]
    #[should_panic]
    fn test_sample_zero_sized_texture_panics() {
        let tex = Texture::from_image(&Image::new(0, 0, 4));
        let _ = tex.sample_rgba(0.0, 0.0);
    }

    #[test]
    fn test_value_semantics_after_construction() {
        let mut image = Image::new(2, 2, 4);
        image.set_pixel(0, 0, &[100, 0, 0, 255]);
        let tex = Texture::from_image(&image);
        // Mutating the source image must not affect the texture
        image.set_pixel(0, 0, &[200, 0, 0, 255]);
        let c = tex.sample_rgba(0.0, 0.0);
        assert!((c[0] - 100.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_rgb_sampling() {
        let mut image = Image::new(2, 2, 3);
        image.set_pixel(0, 0, &[255, 0, 0]);
        image.set_pixel(1, 1, &[0, 0, 255]);
        let tex = Texture::from_image(&image);
        assert_eq!(tex.sample_rgb(0.0, 0.0), [1.0, 0.0, 0.0]);
        assert_eq!(tex.sample_rgb(1.0, 1.0), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_checkerboard_alternates() {
        let tex = Texture::checkerboard(4, 1, [255, 255, 255], [0, 0, 0]);
        let a = tex.sample_rgba(0.0, 0.0);
        let b = tex.sample_rgba(1.0 / 3.0, 0.0);
        assert_ne!(a, b);
    }
}
