use crate::path::{
    CapsStyle, FillStyle, GradientFill, GradientType, JointStyle, Path2D, PathHandle, PathStyle,
    StrokeStyle,
};
use crate::transform::Transform;

/// Gradient matrices are given in the caller's unit box convention; this
/// scale maps them onto unit gradient space.
const GRADIENT_SCALE: f64 = 819.2;

/// Retained vector geometry.
///
/// Paths are persistent node state: they survive frame resets and are only
/// dropped by [`GraphicsNode::clear`].
#[derive(Debug, Clone, Default)]
pub struct GraphicsNode {
    paths: Vec<Path2D>,
    next_handle: u64,
    /// Set whenever the recorded geometry changes.
    pub dirty_render: bool,
}

impl GraphicsNode {
    pub fn paths(&self) -> &[Path2D] {
        &self.paths
    }

    pub fn path(&self, handle: PathHandle) -> Option<&Path2D> {
        self.paths.iter().find(|p| p.handle() == handle)
    }

    /// Path for `handle`, or `None` once it has been cleared.
    pub fn path_mut(&mut self, handle: PathHandle) -> Option<&mut Path2D> {
        self.dirty_render = true;
        self.paths.iter_mut().find(|p| p.handle() == handle)
    }

    /// Open a solid fill path. It is placed just before `before` when that
    /// path is still present, so the fill is rasterized underneath it.
    pub fn begin_fill(&mut self, color: u32, alpha: f64, before: Option<PathHandle>) -> PathHandle {
        self.insert(PathStyle::Fill(FillStyle::Solid { color, alpha }), before)
    }

    /// Open a gradient fill path.
    ///
    /// `matrix` maps the caller's gradient box; without one the gradient
    /// spans 100 units around the origin.
    pub fn begin_gradient_fill(
        &mut self,
        gradient_type: GradientType,
        colors: Vec<u32>,
        alphas: Vec<f64>,
        ratios: Vec<f64>,
        matrix: Option<&Transform>,
        before: Option<PathHandle>,
    ) -> PathHandle {
        let matrix = match matrix {
            Some(m) => Transform::new(
                m.a * GRADIENT_SCALE,
                m.b * GRADIENT_SCALE,
                m.c * GRADIENT_SCALE,
                m.d * GRADIENT_SCALE,
                m.tx,
                m.ty,
            ),
            None => Transform::scale(100.0),
        };
        let fill = GradientFill {
            gradient_type,
            colors,
            alphas,
            ratios,
            matrix,
        };
        self.insert(PathStyle::Fill(FillStyle::Gradient(fill)), before)
    }

    /// Open a stroke path. Missing caps/joints default to round.
    pub fn line_style(
        &mut self,
        thickness: f64,
        color: u32,
        alpha: f64,
        caps: Option<CapsStyle>,
        joints: Option<JointStyle>,
        miter_limit: f64,
    ) -> PathHandle {
        let style = StrokeStyle {
            thickness,
            color,
            alpha,
            caps: caps.unwrap_or(CapsStyle::Round),
            joints: joints.unwrap_or(JointStyle::Round),
            miter_limit,
        };
        self.insert(PathStyle::Stroke(style), None)
    }

    /// Drop every recorded path.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.dirty_render = true;
    }

    /// Frame reset. Retained paths are not per-frame data.
    pub(crate) fn clean_before_render(&mut self) {}

    fn insert(&mut self, style: PathStyle, before: Option<PathHandle>) -> PathHandle {
        self.next_handle += 1;
        let handle = PathHandle(self.next_handle);
        let path = Path2D::new(handle, style);
        let index = before.and_then(|b| self.paths.iter().position(|p| p.handle() == b));
        match index {
            Some(index) => self.paths.insert(index, path),
            None => self.paths.push(path),
        }
        self.dirty_render = true;
        handle
    }
}
