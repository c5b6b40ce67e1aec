/// Size of the render target in scene units.
///
/// The position/color shader maps `[0, width] x [0, height]` onto NDC with +Y down.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Builds a viewport from a physical surface size and a DPI scale factor.
    #[inline]
    pub fn from_physical(width: u32, height: u32, scale_factor: f32) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self::new(width as f32 / scale, height as f32 / scale)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Size clamped to at least one unit per axis, safe to divide by in shaders.
    #[inline]
    pub fn clamped_size(self) -> [f32; 2] {
        [self.width.max(1.0), self.height.max(1.0)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_physical_divides_by_scale() {
        let v = Viewport::from_physical(1600, 1200, 2.0);
        assert_eq!(v, Viewport::new(800.0, 600.0));
        assert!(v.is_valid());
    }

    #[test]
    fn zero_size_is_invalid_but_clamped_for_shaders() {
        let v = Viewport::from_physical(0, 0, 0.0);
        assert!(!v.is_valid());
        assert_eq!(v.clamped_size(), [1.0, 1.0]);
    }
}
