use glam::Affine2;

use super::Vec2;

/// Local-to-scene transform of a 2D shape.
///
/// Applied in this order to a local point:
/// 1. scale around `scale_center`
/// 2. rotate by `rotation` degrees around `rotation_center`
/// 3. translate by `position`
///
/// Centers are expressed in local coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2d {
    pub position: Vec2,
    /// Degrees; positive values rotate clockwise on a +Y-down screen.
    pub rotation: f32,
    pub scale: Vec2,
    pub rotation_center: Vec2,
    pub scale_center: Vec2,
}

impl Transform2d {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            position: Vec2::zero(),
            rotation: 0.0,
            scale: Vec2::splat(1.0),
            rotation_center: Vec2::zero(),
            scale_center: Vec2::zero(),
        }
    }

    #[inline]
    pub fn from_position(position: Vec2) -> Self {
        Self { position, ..Self::identity() }
    }

    /// Whether this transform maps every point to itself plus `position`.
    #[inline]
    pub fn is_translation_only(&self) -> bool {
        self.rotation == 0.0 && self.scale == Vec2::splat(1.0)
    }

    /// Composes the full affine matrix.
    pub fn matrix(&self) -> Affine2 {
        let sc: glam::Vec2 = self.scale_center.into();
        let rc: glam::Vec2 = self.rotation_center.into();

        let scale = Affine2::from_translation(sc)
            * Affine2::from_scale(self.scale.into())
            * Affine2::from_translation(-sc);
        let rotate = Affine2::from_translation(rc)
            * Affine2::from_angle(self.rotation.to_radians())
            * Affine2::from_translation(-rc);

        Affine2::from_translation(self.position.into()) * rotate * scale
    }

    #[inline]
    pub fn local_to_scene(&self, p: Vec2) -> Vec2 {
        if self.is_translation_only() {
            return p + self.position;
        }
        self.matrix().transform_point2(p.into()).into()
    }

    /// Maps a scene point back into local space.
    ///
    /// Returns `None` when the transform collapses an axis (zero scale).
    pub fn scene_to_local(&self, p: Vec2) -> Option<Vec2> {
        if self.is_translation_only() {
            return Some(p - self.position);
        }
        let m = self.matrix();
        if m.matrix2.determinant().abs() <= f32::EPSILON {
            return None;
        }
        Some(m.inverse().transform_point2(p.into()).into())
    }

    /// Column-major 3x3 matrix padded to WGSL `mat3x3<f32>` layout (16-byte columns).
    pub fn to_padded_columns(&self) -> [[f32; 4]; 3] {
        let m = self.matrix();
        let (x, y, t) = (m.matrix2.x_axis, m.matrix2.y_axis, m.translation);
        [
            [x.x, x.y, 0.0, 0.0],
            [y.x, y.y, 0.0, 0.0],
            [t.x, t.y, 1.0, 0.0],
        ]
    }
}

impl Default for Transform2d {
    fn default() -> Self {
        Self::identity()
    }
}
