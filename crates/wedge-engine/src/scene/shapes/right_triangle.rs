use std::sync::Arc;

use anyhow::{ensure, Context, Result};

use crate::coords::Vec2;
use crate::render::{
    BufferManager, DrawState, PrimitiveType, RenderContext, ShaderProgram, VertexAttributes,
    VertexBuffer,
};
use crate::scene::{Shape, ShapeBase, ShapeOptions};

/// Which half of the bounding box the triangle covers.
///
/// Fixed for the lifetime of a [`RightTriangle`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Orientation {
    /// Vertices `(0, 0)`, `(0, h)`, `(w, h)`: right angle at the bottom-left corner.
    Left,
    /// Vertices `(w, 0)`, `(0, h)`, `(w, h)`: right angle at the bottom-right corner.
    Right,
}

/// A right triangle filling one half of its `width x height` bounding box.
///
/// Owns a three-vertex buffer laid out as `[x, y, packed_color]` per vertex and
/// drawn as a triangle strip with the position/color program.
#[derive(Debug)]
pub struct RightTriangle {
    base: ShapeBase,
    orientation: Orientation,
    buffer: VertexBuffer,
    program: Arc<ShaderProgram>,
}

impl RightTriangle {
    pub const VERTEX_INDEX_X: usize = 0;
    pub const VERTEX_INDEX_Y: usize = Self::VERTEX_INDEX_X + 1;
    pub const COLOR_INDEX: usize = Self::VERTEX_INDEX_Y + 1;

    pub const VERTEX_SIZE: usize = 2 + 1;
    pub const VERTICES_PER_TRIANGLE: usize = 3;
    pub const TRIANGLE_SIZE: usize = Self::VERTEX_SIZE * Self::VERTICES_PER_TRIANGLE;

    /// Creates a triangle with a static vertex buffer from `manager` and blending on.
    pub fn new(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        manager: &mut dyn BufferManager,
        program: Arc<ShaderProgram>,
        orientation: Orientation,
    ) -> Result<Self> {
        Self::with_options(
            x,
            y,
            width,
            height,
            manager,
            program,
            orientation,
            ShapeOptions::default(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_options(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        manager: &mut dyn BufferManager,
        program: Arc<ShaderProgram>,
        orientation: Orientation,
        options: ShapeOptions,
    ) -> Result<Self> {
        let buffer = manager
            .allocate(
                "right triangle",
                Self::TRIANGLE_SIZE,
                options.draw_type,
                VertexAttributes::position_color(),
            )
            .context("failed to allocate right triangle vertex buffer")?;

        let mut triangle = Self::with_buffer(x, y, width, height, buffer, program, orientation)?;
        triangle.base.set_blending_enabled(options.blending);
        Ok(triangle)
    }

    /// Creates a triangle around a caller-supplied buffer.
    ///
    /// The buffer must hold at least [`Self::TRIANGLE_SIZE`] floats and use the
    /// program's vertex layout.
    pub fn with_buffer(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        buffer: VertexBuffer,
        program: Arc<ShaderProgram>,
        orientation: Orientation,
    ) -> Result<Self> {
        ensure!(
            buffer.capacity() >= Self::TRIANGLE_SIZE,
            "right triangle needs {} floats, buffer `{}` holds {}",
            Self::TRIANGLE_SIZE,
            buffer.label(),
            buffer.capacity()
        );
        ensure!(
            buffer.attributes() == &program.attributes,
            "buffer `{}` layout does not match shader program `{}`",
            buffer.label(),
            program.name
        );

        let mut triangle = Self {
            base: ShapeBase::new(x, y, width, height),
            orientation,
            buffer,
            program,
        };

        triangle.on_update_vertices();
        triangle.on_update_color();
        triangle.base.set_blending_enabled(true);

        Ok(triangle)
    }

    /// Vertex positions in local coordinates for a `width x height` box.
    pub fn local_vertices(width: f32, height: f32, orientation: Orientation) -> [Vec2; 3] {
        let x0 = match orientation {
            Orientation::Left => 0.0,
            Orientation::Right => width,
        };
        [
            Vec2::new(x0, 0.0),
            Vec2::new(0.0, height),
            Vec2::new(width, height),
        ]
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline]
    pub fn buffer(&self) -> &VertexBuffer {
        &self.buffer
    }

    /// Mutable access for hosts that need to invalidate GPU storage.
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut VertexBuffer {
        &mut self.buffer
    }

    #[inline]
    pub fn program(&self) -> &Arc<ShaderProgram> {
        &self.program
    }

    /// Vertex positions as currently stored in the buffer.
    pub fn vertices(&self) -> [Vec2; 3] {
        let data = self.buffer.data();
        std::array::from_fn(|i| {
            let v = i * Self::VERTEX_SIZE;
            Vec2::new(data[v + Self::VERTEX_INDEX_X], data[v + Self::VERTEX_INDEX_Y])
        })
    }

    /// Packed color slots as currently stored in the buffer.
    pub fn packed_colors(&self) -> [f32; 3] {
        let data = self.buffer.data();
        std::array::from_fn(|i| data[i * Self::VERTEX_SIZE + Self::COLOR_INDEX])
    }
}

impl Shape for RightTriangle {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn on_update_vertices(&mut self) {
        let vertices =
            Self::local_vertices(self.base.width(), self.base.height(), self.orientation);

        let data = self.buffer.data_mut();
        for (i, v) in vertices.iter().enumerate() {
            let at = i * Self::VERTEX_SIZE;
            data[at + Self::VERTEX_INDEX_X] = v.x;
            data[at + Self::VERTEX_INDEX_Y] = v.y;
        }

        self.buffer.set_dirty_on_hardware();
    }

    fn on_update_color(&mut self) {
        let packed = self.base.color().abgr_packed_float();

        let data = self.buffer.data_mut();
        for i in 0..Self::VERTICES_PER_TRIANGLE {
            data[i * Self::VERTEX_SIZE + Self::COLOR_INDEX] = packed;
        }

        self.buffer.set_dirty_on_hardware();
    }

    fn draw_geometry(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        let state = DrawState {
            transform: *self.base.transform(),
            blending: self.base.is_blending_enabled(),
        };

        ctx.bind(&mut self.buffer, &self.program, &state)?;
        let drawn = ctx.draw(PrimitiveType::TriangleStrip, Self::VERTICES_PER_TRIANGLE as u32);
        ctx.unbind(&self.buffer, &self.program);
        drawn
    }

    /// `(w/3, 2h/3)` for [`Orientation::Right`], `(2w/3, 2h/3)` for [`Orientation::Left`],
    /// mapped to scene coordinates.
    fn pivot_point(&self) -> Vec2 {
        let (w, h) = (self.base.width(), self.base.height());
        let x = match self.orientation {
            Orientation::Right => w / 3.0,
            Orientation::Left => 2.0 * w / 3.0,
        };
        self.base.convert_local_to_scene(Vec2::new(x, 2.0 * h / 3.0))
    }

    /// Point-in-triangle test, edges included.
    fn contains(&self, scene_point: Vec2) -> bool {
        let Some(p) = self.base.convert_scene_to_local(scene_point) else {
            return false;
        };
        let [a, b, c] = self.vertices();

        let d0 = (b - a).perp_dot(p - a);
        let d1 = (c - b).perp_dot(p - b);
        let d2 = (a - c).perp_dot(p - c);

        let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
        let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
        !(has_neg && has_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::paint::Color;
    use crate::render::testing::{Call, RecordingContext};
    use crate::render::{BufferId, BufferState, DrawType, ShaderRegistry, VertexBufferManager};

    fn approx(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    fn triangle(w: f32, h: f32, orientation: Orientation) -> RightTriangle {
        let mut manager = VertexBufferManager::new();
        let shaders = ShaderRegistry::with_builtins();
        let program = shaders.position_color().unwrap();
        RightTriangle::new(0.0, 0.0, w, h, &mut manager, program, orientation).unwrap()
    }

    fn area(v: [Vec2; 3]) -> f32 {
        ((v[1] - v[0]).perp_dot(v[2] - v[0]) * 0.5).abs()
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn right_orientation_vertices() {
        let t = triangle(10.0, 20.0, Orientation::Right);
        assert_eq!(
            t.vertices(),
            [Vec2::new(10.0, 0.0), Vec2::new(0.0, 20.0), Vec2::new(10.0, 20.0)]
        );
    }

    #[test]
    fn left_orientation_vertices() {
        let t = triangle(10.0, 20.0, Orientation::Left);
        assert_eq!(
            t.vertices(),
            [Vec2::new(0.0, 0.0), Vec2::new(0.0, 20.0), Vec2::new(10.0, 20.0)]
        );
    }

    #[test]
    fn both_orientations_cover_half_the_box() {
        for orientation in [Orientation::Left, Orientation::Right] {
            let t = triangle(10.0, 20.0, orientation);
            assert_eq!(area(t.vertices()), 100.0, "{orientation:?}");
        }
    }

    #[test]
    fn buffer_layout_is_interleaved() {
        let t = triangle(10.0, 20.0, Orientation::Right);
        let packed = Color::WHITE.abgr_packed_float();
        assert_eq!(t.buffer().capacity(), RightTriangle::TRIANGLE_SIZE);
        assert_eq!(
            t.buffer().data(),
            &[10.0, 0.0, packed, 0.0, 20.0, packed, 10.0, 20.0, packed]
        );
    }

    #[test]
    fn resize_recomputes_vertices() {
        let mut t = triangle(10.0, 20.0, Orientation::Right);
        t.set_size(4.0, 6.0);
        assert_eq!(
            t.vertices(),
            [Vec2::new(4.0, 0.0), Vec2::new(0.0, 6.0), Vec2::new(4.0, 6.0)]
        );

        t.set_width(8.0);
        assert_eq!(t.vertices()[0], Vec2::new(8.0, 0.0));
        t.set_height(2.0);
        assert_eq!(t.vertices()[2], Vec2::new(8.0, 2.0));
        assert!(t.buffer().is_dirty());
    }

    // ── pivot ─────────────────────────────────────────────────────────────

    #[test]
    fn pivot_point_right() {
        let t = triangle(10.0, 20.0, Orientation::Right);
        assert!(approx(t.pivot_point(), Vec2::new(3.333, 13.333)));
    }

    #[test]
    fn pivot_point_left() {
        let t = triangle(10.0, 20.0, Orientation::Left);
        assert!(approx(t.pivot_point(), Vec2::new(6.667, 13.333)));
    }

    #[test]
    fn geometry_holds_across_sizes() {
        let sizes = [(10.0, 20.0), (0.5, 3.0), (1000.0, 1.0), (1.0, 1000.0), (7.25, 0.125)];
        for (w, h) in sizes {
            for orientation in [Orientation::Left, Orientation::Right] {
                let t = triangle(w, h, orientation);
                let x0 = match orientation {
                    Orientation::Left => 0.0,
                    Orientation::Right => w,
                };
                assert_eq!(
                    t.vertices(),
                    [Vec2::new(x0, 0.0), Vec2::new(0.0, h), Vec2::new(w, h)],
                    "{w}x{h} {orientation:?}"
                );

                let expected_area = w * h * 0.5;
                assert!(
                    (area(t.vertices()) - expected_area).abs() <= expected_area * 1e-5,
                    "{w}x{h} {orientation:?}"
                );

                let pivot_x = match orientation {
                    Orientation::Left => 2.0 * w / 3.0,
                    Orientation::Right => w / 3.0,
                };
                let pivot = t.pivot_point();
                let expected = Vec2::new(pivot_x, 2.0 * h / 3.0);
                assert!(
                    pivot.distance(expected) <= w.max(h) * 1e-5,
                    "{w}x{h} {orientation:?}: {pivot:?} vs {expected:?}"
                );
            }
        }
    }

    #[test]
    fn pivot_point_follows_position_and_rotation() {
        let mut t = triangle(10.0, 20.0, Orientation::Right);
        t.base_mut().set_position(100.0, 50.0);
        assert!(approx(t.pivot_point(), Vec2::new(103.333, 63.333)));

        // Half a turn about the box center (5, 10) mirrors the local point.
        t.base_mut().set_rotation(180.0);
        assert!(approx(t.pivot_point(), Vec2::new(106.667, 56.667)));
    }

    // ── color ─────────────────────────────────────────────────────────────

    #[test]
    fn set_color_writes_every_slot_and_marks_dirty() {
        let mut t = triangle(10.0, 20.0, Orientation::Left);
        let mut ctx = RecordingContext::new();
        t.draw(&mut ctx).unwrap();
        assert_eq!(t.buffer().state(), BufferState::Clean);

        let red = Color::RED.with_alpha(0.5);
        t.set_color(red);

        assert_eq!(t.packed_colors(), [red.abgr_packed_float(); 3]);
        assert_eq!(t.buffer().state(), BufferState::Dirty);
    }

    #[test]
    fn set_alpha_keeps_rgb() {
        let mut t = triangle(10.0, 20.0, Orientation::Left);
        t.set_color(Color::BLUE);
        t.set_alpha(0.0);
        assert_eq!(t.base().color(), Color::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(t.packed_colors()[1], Color::new(0.0, 0.0, 1.0, 0.0).abgr_packed_float());
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_binds_draws_strip_and_unbinds() {
        let mut t = triangle(10.0, 20.0, Orientation::Right);
        let mut ctx = RecordingContext::new();
        t.draw(&mut ctx).unwrap();

        let id = t.buffer().id();
        assert_eq!(
            ctx.calls,
            vec![
                Call::Bind {
                    buffer: id,
                    program: ShaderProgram::POSITION_COLOR.to_owned(),
                    state: DrawState { transform: *t.base().transform(), blending: true },
                    synced: true,
                },
                Call::Draw(PrimitiveType::TriangleStrip, 3),
                Call::Unbind(id),
            ]
        );
    }

    #[test]
    fn color_change_triggers_exactly_one_sync() {
        let mut t = triangle(10.0, 20.0, Orientation::Right);
        let mut ctx = RecordingContext::new();

        t.draw(&mut ctx).unwrap();
        t.draw(&mut ctx).unwrap();
        assert_eq!(ctx.sync_count(), 1);

        t.set_color(Color::GREEN);
        t.draw(&mut ctx).unwrap();
        t.draw(&mut ctx).unwrap();
        assert_eq!(ctx.sync_count(), 2);

        let at = RightTriangle::COLOR_INDEX * 4;
        let slot: [u8; 4] = ctx.uploads[1][at..at + 4].try_into().unwrap();
        assert_eq!(f32::from_le_bytes(slot), Color::GREEN.abgr_packed_float());
    }

    #[test]
    fn invalidated_buffer_is_uploaded_again() {
        let mut t = triangle(10.0, 20.0, Orientation::Left);
        let mut ctx = RecordingContext::new();
        t.draw(&mut ctx).unwrap();

        t.buffer_mut().invalidate_hardware();
        t.draw(&mut ctx).unwrap();
        assert_eq!(ctx.sync_count(), 2);
        assert_eq!(ctx.uploads[0], ctx.uploads[1]);
    }

    #[test]
    fn invisible_shape_issues_nothing() {
        let mut t = triangle(10.0, 20.0, Orientation::Right);
        t.base_mut().set_visible(false);
        let mut ctx = RecordingContext::new();
        t.draw(&mut ctx).unwrap();
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn culled_shape_issues_nothing() {
        let mut t = triangle(10.0, 20.0, Orientation::Right);
        t.base_mut().set_position(500.0, 500.0);

        let mut ctx = RecordingContext {
            view: Some(Rect::new(0.0, 0.0, 100.0, 100.0)),
            ..Default::default()
        };
        t.draw(&mut ctx).unwrap();
        assert!(ctx.calls.is_empty());

        t.base_mut().set_position(95.0, 95.0);
        t.draw(&mut ctx).unwrap();
        assert_eq!(ctx.calls.len(), 3);
    }

    #[test]
    fn bind_error_propagates_and_buffer_stays_dirty() {
        let mut t = triangle(10.0, 20.0, Orientation::Right);
        let mut ctx = RecordingContext { fail_bind: true, ..Default::default() };

        let err = t.draw(&mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "context lost");
        assert!(t.buffer().is_dirty());
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn blending_follows_options() {
        let mut manager = VertexBufferManager::new();
        let program = ShaderRegistry::with_builtins().position_color().unwrap();
        let options = ShapeOptions { draw_type: DrawType::Dynamic, blending: false };
        let t = RightTriangle::with_options(
            0.0, 0.0, 1.0, 1.0, &mut manager, program, Orientation::Left, options,
        )
        .unwrap();

        assert!(!t.base().is_blending_enabled());
        assert_eq!(t.buffer().draw_type(), DrawType::Dynamic);
        assert_eq!(manager.allocations(), 1);
    }

    // ── hit testing ───────────────────────────────────────────────────────

    #[test]
    fn contains_matches_orientation() {
        let right = triangle(10.0, 10.0, Orientation::Right);
        let left = triangle(10.0, 10.0, Orientation::Left);

        // Upper-right region belongs to the right triangle only.
        assert!(right.contains(Vec2::new(8.0, 3.0)));
        assert!(!left.contains(Vec2::new(8.0, 3.0)));

        // Upper-left region belongs to the left triangle only.
        assert!(left.contains(Vec2::new(2.0, 3.0)));
        assert!(!right.contains(Vec2::new(2.0, 3.0)));

        // Hypotenuse and corners count as inside.
        assert!(right.contains(Vec2::new(5.0, 5.0)));
        assert!(left.contains(Vec2::new(0.0, 0.0)));
        assert!(!right.contains(Vec2::new(11.0, 5.0)));
    }

    #[test]
    fn contains_uses_scene_coordinates() {
        let mut t = triangle(10.0, 10.0, Orientation::Right);
        t.base_mut().set_position(20.0, 20.0);
        assert!(t.contains(Vec2::new(28.0, 23.0)));
        assert!(!t.contains(Vec2::new(8.0, 3.0)));
    }

    // ── construction errors ───────────────────────────────────────────────

    #[test]
    fn undersized_buffer_is_rejected() {
        let buffer = VertexBuffer::new(
            BufferId(7),
            "small",
            6,
            DrawType::Static,
            VertexAttributes::position_color(),
        );
        let program = ShaderRegistry::with_builtins().position_color().unwrap();
        let err =
            RightTriangle::with_buffer(0.0, 0.0, 1.0, 1.0, buffer, program, Orientation::Right)
                .unwrap_err();
        assert!(err.to_string().contains("needs 9 floats"));
    }

    #[test]
    fn manager_failure_propagates() {
        struct Exhausted;
        impl BufferManager for Exhausted {
            fn allocate(
                &mut self,
                _label: &str,
                _capacity: usize,
                _draw_type: DrawType,
                _attributes: VertexAttributes,
            ) -> Result<VertexBuffer> {
                anyhow::bail!("out of buffer memory")
            }
        }

        let program = ShaderRegistry::with_builtins().position_color().unwrap();
        let err = RightTriangle::new(0.0, 0.0, 1.0, 1.0, &mut Exhausted, program, Orientation::Left)
            .unwrap_err();
        assert_eq!(err.root_cause().to_string(), "out of buffer memory");
    }
}
