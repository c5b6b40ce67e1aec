use anyhow::Result;

use crate::coords::{Rect, Transform2d, Vec2};
use crate::paint::Color;
use crate::render::{DrawType, RenderContext};

/// Construction options shared by buffer-backed shapes.
#[derive(Debug, Clone)]
pub struct ShapeOptions {
    /// Update-frequency hint for the shape's vertex buffer.
    pub draw_type: DrawType,
    /// Straight-alpha blending when drawn.
    pub blending: bool,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            draw_type: DrawType::Static,
            blending: true,
        }
    }
}

/// State every rectangular-bounds shape carries: transform, size, color, flags.
///
/// Mutating size or color here does not touch vertex data; go through the
/// [`Shape`] setters so the owning shape can recompute its buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeBase {
    transform: Transform2d,
    size: Vec2,
    color: Color,
    visible: bool,
    blending: bool,
}

impl ShapeBase {
    /// Rotation and scale centers start at the middle of the bounding box.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let center = Vec2::new(width * 0.5, height * 0.5);
        Self {
            transform: Transform2d {
                position: Vec2::new(x, y),
                rotation_center: center,
                scale_center: center,
                ..Transform2d::identity()
            },
            size: Vec2::new(width, height),
            color: Color::WHITE,
            visible: true,
            blending: false,
        }
    }

    #[inline]
    pub fn transform(&self) -> &Transform2d {
        &self.transform
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    #[inline]
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.transform.position = Vec2::new(x, y);
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    /// Degrees, clockwise on screen.
    #[inline]
    pub fn set_rotation(&mut self, degrees: f32) {
        self.transform.rotation = degrees;
    }

    #[inline]
    pub fn set_rotation_center(&mut self, center: Vec2) {
        self.transform.rotation_center = center;
    }

    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.transform.scale
    }

    #[inline]
    pub fn set_scale(&mut self, scale: Vec2) {
        self.transform.scale = scale;
    }

    #[inline]
    pub fn set_scale_center(&mut self, center: Vec2) {
        self.transform.scale_center = center;
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[inline]
    pub fn is_blending_enabled(&self) -> bool {
        self.blending
    }

    #[inline]
    pub fn set_blending_enabled(&mut self, blending: bool) {
        self.blending = blending;
    }

    #[inline]
    pub fn convert_local_to_scene(&self, local: Vec2) -> Vec2 {
        self.transform.local_to_scene(local)
    }

    /// Returns `None` when the shape is scaled to zero on some axis.
    #[inline]
    pub fn convert_scene_to_local(&self, scene: Vec2) -> Option<Vec2> {
        self.transform.scene_to_local(scene)
    }

    /// Axis-aligned bounds of the transformed bounding box, in scene units.
    pub fn scene_bounds(&self) -> Rect {
        let (w, h) = (self.size.x, self.size.y);
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(w, 0.0),
            Vec2::new(w, h),
            Vec2::new(0.0, h),
        ];
        let scene = corners.map(|c| self.convert_local_to_scene(c));
        Rect::from_points(scene)
            .unwrap_or_else(|| Rect::from_origin_size(self.transform.position, Vec2::zero()))
    }

    pub(crate) fn set_size_raw(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub(crate) fn set_color_raw(&mut self, color: Color) {
        self.color = color;
    }
}

/// A drawable entity with a rectangular bounding box.
///
/// Implementors keep vertex data in sync through `on_update_vertices` and
/// `on_update_color`; the provided setters call them.
pub trait Shape {
    fn base(&self) -> &ShapeBase;

    fn base_mut(&mut self) -> &mut ShapeBase;

    /// Recomputes vertex positions from the current size.
    fn on_update_vertices(&mut self);

    /// Rewrites the vertex colors from the current color.
    fn on_update_color(&mut self);

    /// Issues the bind/draw/unbind sequence for this shape.
    fn draw_geometry(&mut self, ctx: &mut dyn RenderContext) -> Result<()>;

    /// Reference point in scene coordinates. Defaults to the box center.
    fn pivot_point(&self) -> Vec2 {
        let base = self.base();
        base.convert_local_to_scene(base.size() * 0.5)
    }

    /// Hit test against the shape's footprint. Defaults to the bounding box.
    fn contains(&self, scene_point: Vec2) -> bool {
        let base = self.base();
        base.convert_scene_to_local(scene_point)
            .is_some_and(|p| Rect::from_origin_size(Vec2::zero(), base.size()).contains(p))
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.base_mut().set_size_raw(width, height);
        self.on_update_vertices();
    }

    fn set_width(&mut self, width: f32) {
        let height = self.base().height();
        self.set_size(width, height);
    }

    fn set_height(&mut self, height: f32) {
        let width = self.base().width();
        self.set_size(width, height);
    }

    fn set_color(&mut self, color: Color) {
        self.base_mut().set_color_raw(color);
        self.on_update_color();
    }

    fn set_alpha(&mut self, alpha: f32) {
        let color = self.base().color().with_alpha(alpha);
        self.set_color(color);
    }

    /// Whether the shape lies completely outside `view`.
    fn is_culled(&self, view: Rect) -> bool {
        !view.overlaps(self.base().scene_bounds())
    }

    /// Draws the shape unless it is hidden or outside the context's view bounds.
    fn draw(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        if !self.base().is_visible() {
            return Ok(());
        }
        if let Some(view) = ctx.view_bounds() {
            if self.is_culled(view) {
                return Ok(());
            }
        }
        self.draw_geometry(ctx)
    }
}
