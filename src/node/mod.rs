//! Render node data structures.
//!
//! A render node is the per-display-object record of what must be
//! rasterized. It persists across frames; its per-frame draw data is emptied
//! by [`RenderNode::clean_before_render`] before the owner repopulates it.
//!
//! Frame lifecycle:
//! - empty: just constructed or just cleaned
//! - accumulating: draw calls appended, `render_count() > 0`
//! - consumed: the rasterizer has read the draw data
//! - back to empty through `clean_before_render`
//!
//! `need_redraw` is independent of the draw data: a node can need a redraw
//! because its transform changed without receiving new draw calls.

mod bitmap;
mod graphics;
mod group;
mod text;

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::Region;
use crate::path::{CapsStyle, GradientType, JointStyle, PathHandle};
use crate::transform::Transform;

pub use bitmap::{BitmapData, BitmapNode, ImageDraw};
pub use graphics::GraphicsNode;
pub use group::{GroupNode, SetAlphaNode, SetTransformNode};
pub use text::{TextDraw, TextFormat, TextNode};

/// Shared handle to a render node.
///
/// The display object owns the node's lifetime; the facade that writes to it
/// and the rasterizer that reads it hold clones of this handle.
pub type RenderNodeRef = Rc<RefCell<RenderNode>>;

/// Type tag used by rasterizers to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RenderNodeType {
    Bitmap = 1,
    Text,
    Graphics,
    Group,
    SetTransform,
    SetAlpha,
}

/// Variant-specific node state.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Bitmap(BitmapNode),
    Text(TextNode),
    Graphics(GraphicsNode),
    Group(GroupNode),
    SetTransform(SetTransformNode),
    SetAlpha(SetAlphaNode),
}

impl NodeKind {
    pub fn node_type(&self) -> RenderNodeType {
        match self {
            NodeKind::Bitmap(_) => RenderNodeType::Bitmap,
            NodeKind::Text(_) => RenderNodeType::Text,
            NodeKind::Graphics(_) => RenderNodeType::Graphics,
            NodeKind::Group(_) => RenderNodeType::Group,
            NodeKind::SetTransform(_) => RenderNodeType::SetTransform,
            NodeKind::SetAlpha(_) => RenderNodeType::SetAlpha,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderNode {
    /// Set by the owner's invalidation path, cleared by the rasterizer.
    pub need_redraw: bool,
    /// Whether the node moved since the last frame.
    pub moved: bool,
    /// Concatenated alpha on stage, written by the rasterizer.
    pub render_alpha: f64,
    /// Effective visibility on stage, written by the rasterizer.
    pub render_visible: bool,
    /// Transform relative to the display root, written by the rasterizer.
    pub render_matrix: Transform,
    /// Screen-space region of the node's own content.
    pub render_region: Region,
    render_count: usize,
    kind: NodeKind,
}

impl RenderNode {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            need_redraw: false,
            moved: false,
            render_alpha: 1.0,
            render_visible: true,
            render_matrix: Transform::IDENTITY,
            render_region: Region::default(),
            render_count: 0,
            kind,
        }
    }

    pub fn bitmap() -> Self {
        Self::with_kind(NodeKind::Bitmap(BitmapNode::default()))
    }

    pub fn text() -> Self {
        Self::with_kind(NodeKind::Text(TextNode::default()))
    }

    pub fn graphics() -> Self {
        Self::with_kind(NodeKind::Graphics(GraphicsNode::default()))
    }

    pub fn group() -> Self {
        Self::with_kind(NodeKind::Group(GroupNode::default()))
    }

    pub fn set_transform_node() -> Self {
        Self::with_kind(NodeKind::SetTransform(SetTransformNode::default()))
    }

    pub fn set_alpha_node() -> Self {
        Self::with_kind(NodeKind::SetAlpha(SetAlphaNode::default()))
    }

    /// Wrap this node in a shared handle.
    pub fn into_ref(self) -> RenderNodeRef {
        Rc::new(RefCell::new(self))
    }

    pub fn node_type(&self) -> RenderNodeType {
        self.kind.node_type()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Number of primitives appended since the last frame reset.
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    /// Empty the per-frame draw data before the owner repopulates it.
    ///
    /// Persistent variant state (text style, retained graphics paths) is
    /// left alone. Calling this twice is the same as calling it once.
    pub fn clean_before_render(&mut self) {
        self.render_count = 0;
        match &mut self.kind {
            NodeKind::Bitmap(node) => node.clean_before_render(),
            NodeKind::Text(node) => node.clean_before_render(),
            NodeKind::Graphics(node) => node.clean_before_render(),
            NodeKind::Group(node) => node.clean_before_render(),
            NodeKind::SetTransform(node) => node.clean_before_render(),
            NodeKind::SetAlpha(node) => node.clean_before_render(),
        }
    }

    /// Record one appended primitive.
    pub(crate) fn count_draw(&mut self) {
        self.render_count += 1;
    }

    pub fn as_bitmap(&self) -> Option<&BitmapNode> {
        match &self.kind {
            NodeKind::Bitmap(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match &self.kind {
            NodeKind::Text(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextNode> {
        match &mut self.kind {
            NodeKind::Text(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_graphics(&self) -> Option<&GraphicsNode> {
        match &self.kind {
            NodeKind::Graphics(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match &self.kind {
            NodeKind::Group(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_graphics_mut(&mut self) -> Option<&mut GraphicsNode> {
        match &mut self.kind {
            NodeKind::Graphics(node) => Some(node),
            _ => None,
        }
    }

    // -- per-variant draw calls --

    /// Open a solid fill path. `None` on non-graphics nodes.
    pub fn begin_fill(
        &mut self,
        color: u32,
        alpha: f64,
        before: Option<PathHandle>,
    ) -> Option<PathHandle> {
        let handle = self.as_graphics_mut()?.begin_fill(color, alpha, before);
        self.count_draw();
        Some(handle)
    }

    /// Open a gradient fill path. `None` on non-graphics nodes.
    pub fn begin_gradient_fill(
        &mut self,
        gradient_type: GradientType,
        colors: Vec<u32>,
        alphas: Vec<f64>,
        ratios: Vec<f64>,
        matrix: Option<&Transform>,
        before: Option<PathHandle>,
    ) -> Option<PathHandle> {
        let handle = self.as_graphics_mut()?.begin_gradient_fill(
            gradient_type,
            colors,
            alphas,
            ratios,
            matrix,
            before,
        );
        self.count_draw();
        Some(handle)
    }

    /// Open a stroke path. `None` on non-graphics nodes.
    pub fn line_style(
        &mut self,
        thickness: f64,
        color: u32,
        alpha: f64,
        caps: Option<CapsStyle>,
        joints: Option<JointStyle>,
        miter_limit: f64,
    ) -> Option<PathHandle> {
        let handle = self.as_graphics_mut()?.line_style(
            thickness,
            color,
            alpha,
            caps,
            joints,
            miter_limit,
        );
        self.count_draw();
        Some(handle)
    }

    /// Append one image draw. No-op on non-bitmap nodes.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image(
        &mut self,
        source_x: f64,
        source_y: f64,
        source_w: f64,
        source_h: f64,
        draw_x: f64,
        draw_y: f64,
        draw_w: f64,
        draw_h: f64,
    ) {
        if let NodeKind::Bitmap(node) = &mut self.kind {
            node.draws.push(ImageDraw {
                source_x,
                source_y,
                source_w,
                source_h,
                draw_x,
                draw_y,
                draw_w,
                draw_h,
            });
            self.count_draw();
        }
    }

    /// Set the image for this frame. No-op on non-bitmap nodes.
    pub fn set_image(&mut self, image: Option<BitmapData>, matrix: Option<Transform>) {
        if let NodeKind::Bitmap(node) = &mut self.kind {
            node.image = image;
            node.matrix = matrix;
        }
    }

    pub fn set_smoothing(&mut self, smoothing: bool) {
        if let NodeKind::Bitmap(node) = &mut self.kind {
            node.smoothing = smoothing;
        }
    }

    /// Append one line of text. No-op on non-text nodes.
    pub fn draw_text(&mut self, x: f64, y: f64, text: impl Into<String>, format: TextFormat) {
        if let NodeKind::Text(node) = &mut self.kind {
            node.draws.push(TextDraw {
                x,
                y,
                text: text.into(),
                format,
            });
            self.count_draw();
        }
    }

    /// Append a child node. No-op on non-group nodes.
    pub fn add_node(&mut self, child: RenderNodeRef) {
        if let NodeKind::Group(node) = &mut self.kind {
            node.children.push(child);
            self.count_draw();
        }
    }

    /// Append a transform. No-op on non-set-transform nodes.
    pub fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) {
        if let NodeKind::SetTransform(node) = &mut self.kind {
            node.transforms.push(Transform::new(a, b, c, d, tx, ty));
            self.count_draw();
        }
    }

    /// Set this frame's alpha, replacing any earlier value. No-op on
    /// non-set-alpha nodes.
    pub fn set_alpha(&mut self, alpha: f64) {
        if let NodeKind::SetAlpha(node) = &mut self.kind {
            node.alpha = Some(alpha);
            self.render_count = 1;
        }
    }
}
