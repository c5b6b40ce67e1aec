/// Straight-alpha RGBA color with channels in `[0, 1]`.
///
/// Shapes store this value and encode it into vertex data as an ABGR packed
/// float (see [`Color::abgr_packed_float`]). Blending happens on the GPU with
/// straight-alpha factors.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    /// Mask applied to packed ints before reinterpreting them as `f32`.
    ///
    /// Clears the low alpha bit so the pattern can never be a NaN.
    pub const PACKED_FLOAT_MASK: u32 = 0xFEFF_FFFF;

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Creates a color from 8-bit channels.
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    #[inline]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Packs the channels as `0xAABBGGRR`.
    ///
    /// Each channel is clamped to `[0, 1]` and rounded to 8 bits.
    #[inline]
    pub fn abgr_packed_int(self) -> u32 {
        (channel_u8(self.a) << 24)
            | (channel_u8(self.b) << 16)
            | (channel_u8(self.g) << 8)
            | channel_u8(self.r)
    }

    /// Packs the color into one `f32` whose little-endian bytes are `R, G, B, A`.
    ///
    /// This is the layout read by a normalized `4 x u8` vertex attribute.
    #[inline]
    pub fn abgr_packed_float(self) -> f32 {
        f32::from_bits(self.abgr_packed_int() & Self::PACKED_FLOAT_MASK)
    }

    /// Inverse of [`Color::abgr_packed_float`], up to 8-bit precision.
    #[inline]
    pub fn from_abgr_packed_float(packed: f32) -> Self {
        let [r, g, b, a] = packed.to_bits().to_le_bytes();
        Self::from_u8(r, g, b, a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[inline]
fn channel_u8(c: f32) -> u32 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_int_is_abgr() {
        let c = Color::from_u8(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.abgr_packed_int(), 0x4433_2211);
    }

    #[test]
    fn packed_float_bytes_are_rgba_in_memory() {
        let c = Color::from_u8(10, 20, 30, 40);
        let bytes = c.abgr_packed_float().to_bits().to_le_bytes();
        assert_eq!(bytes, [10, 20, 30, 40]);
    }

    #[test]
    fn packed_float_clears_alpha_low_bit() {
        let bits = Color::WHITE.abgr_packed_float().to_bits();
        assert_eq!(bits, 0xFEFF_FFFF);
        assert!(!Color::WHITE.abgr_packed_float().is_nan());
    }

    #[test]
    fn out_of_range_channels_are_clamped() {
        let c = Color::new(2.0, -1.0, 0.0, 1.0);
        assert_eq!(c.abgr_packed_int(), 0xFF00_00FF);
    }

    #[test]
    fn unpack_round_trips_even_alpha() {
        let c = Color::from_u8(200, 100, 50, 128);
        assert_eq!(Color::from_abgr_packed_float(c.abgr_packed_float()), c);
    }
}
