//! Recorded vector paths.
//!
//! A [`Path2D`] is an ordered list of drawing commands plus the style it was
//! opened with. Fill and stroke paths are separate instances, so clearing one
//! never disturbs the other.

use crate::transform::Transform;

/// Identifier of a path inside a graphics node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathHandle(pub(crate) u64);

/// A single recorded drawing command in local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    /// Quadratic Bézier curve.
    CurveTo {
        control_x: f64,
        control_y: f64,
        anchor_x: f64,
        anchor_y: f64,
    },
    CubicCurveTo {
        control_x1: f64,
        control_y1: f64,
        control_x2: f64,
        control_y2: f64,
        anchor_x: f64,
        anchor_y: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Rounded rectangle; `ellipse_height` of 0 reuses `ellipse_width`.
    RoundRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        ellipse_width: f64,
        ellipse_height: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
    },
    /// Ellipse inscribed in the given box.
    Ellipse {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Circular arc; angles are in radians, normalized to `[0, 2π)`.
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapsStyle {
    /// Flat end exactly at the endpoint.
    None,
    #[default]
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JointStyle {
    Bevel,
    Miter,
    #[default]
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineScaleMode {
    #[default]
    Normal,
    None,
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientType {
    #[default]
    Linear,
    Radial,
}

impl GradientType {
    /// Parse `"linear"` / `"radial"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(GradientType::Linear),
            "radial" => Some(GradientType::Radial),
            _ => None,
        }
    }
}

/// Gradient fill as recorded by a graphics node.
///
/// The arrays are kept exactly as supplied; the rasterizer decides what to do
/// with mismatched lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientFill {
    pub gradient_type: GradientType,
    pub colors: Vec<u32>,
    pub alphas: Vec<f64>,
    /// Stop positions in `0..=255`.
    pub ratios: Vec<f64>,
    /// Maps unit gradient space (`[-1, 1]`) into local space.
    pub matrix: Transform,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FillStyle {
    Solid { color: u32, alpha: f64 },
    Gradient(GradientFill),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub thickness: f64,
    pub color: u32,
    pub alpha: f64,
    pub caps: CapsStyle,
    pub joints: JointStyle,
    pub miter_limit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathStyle {
    Fill(FillStyle),
    Stroke(StrokeStyle),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path2D {
    handle: PathHandle,
    style: PathStyle,
    commands: Vec<PathCommand>,
}

impl Path2D {
    pub(crate) fn new(handle: PathHandle, style: PathStyle) -> Self {
        Self {
            handle,
            style,
            commands: Vec::new(),
        }
    }

    pub fn handle(&self) -> PathHandle {
        self.handle
    }

    pub fn style(&self) -> &PathStyle {
        &self.style
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_fill(&self) -> bool {
        matches!(self.style, PathStyle::Fill(_))
    }

    pub fn is_stroke(&self) -> bool {
        matches!(self.style, PathStyle::Stroke(_))
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::LineTo { x, y });
    }

    pub fn curve_to(&mut self, control_x: f64, control_y: f64, anchor_x: f64, anchor_y: f64) {
        self.commands.push(PathCommand::CurveTo {
            control_x,
            control_y,
            anchor_x,
            anchor_y,
        });
    }

    pub fn cubic_curve_to(
        &mut self,
        control_x1: f64,
        control_y1: f64,
        control_x2: f64,
        control_y2: f64,
        anchor_x: f64,
        anchor_y: f64,
    ) {
        self.commands.push(PathCommand::CubicCurveTo {
            control_x1,
            control_y1,
            control_x2,
            control_y2,
            anchor_x,
            anchor_y,
        });
    }

    pub fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(PathCommand::Rect {
            x,
            y,
            width,
            height,
        });
    }

    pub fn draw_round_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        ellipse_width: f64,
        ellipse_height: f64,
    ) {
        self.commands.push(PathCommand::RoundRect {
            x,
            y,
            width,
            height,
            ellipse_width,
            ellipse_height,
        });
    }

    pub fn draw_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.commands.push(PathCommand::Circle { x, y, radius });
    }

    pub fn draw_ellipse(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(PathCommand::Ellipse {
            x,
            y,
            width,
            height,
        });
    }

    pub fn draw_arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        self.commands.push(PathCommand::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        });
    }
}
