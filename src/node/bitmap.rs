use std::fmt;
use std::rc::Rc;

use resvg::tiny_skia::{self, ColorU8, Pixmap};

use crate::error::{RenderError, Result};
use crate::transform::Transform;

/// Decoded image pixels (premultiplied RGBA), shared between nodes.
#[derive(Clone)]
pub struct BitmapData {
    pixmap: Rc<Pixmap>,
    origin_restricted: bool,
}

impl BitmapData {
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self {
            pixmap: Rc::new(pixmap),
            origin_restricted: false,
        }
    }

    /// Decode a raster image (PNG, JPEG).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut pixmap = Pixmap::new(width, height)
            .ok_or(RenderError::SurfaceAllocation { width, height })?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(Self::from_pixmap(pixmap))
    }

    /// Rasterize an SVG document at `scale`.
    pub fn from_svg_bytes(bytes: &[u8], scale: f32) -> Result<Self> {
        let tree = resvg::usvg::Tree::from_data(bytes, &resvg::usvg::Options::default())
            .map_err(|e| RenderError::Decode(e.to_string()))?;
        let size = tree.size();

        let width = (size.width() * scale).ceil() as u32;
        let height = (size.height() * scale).ceil() as u32;
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceAllocation { width, height })?;

        let transform = tiny_skia::Transform::from_scale(scale, scale);
        resvg::render(&tree, transform, &mut pixmap.as_mut());
        Ok(Self::from_pixmap(pixmap))
    }

    /// Mark the image as coming from a restricted origin. Drawing it taints
    /// the destination buffer.
    pub fn with_origin_restricted(mut self, restricted: bool) -> Self {
        self.origin_restricted = restricted;
        self
    }

    pub fn is_origin_restricted(&self) -> bool {
        self.origin_restricted
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl fmt::Debug for BitmapData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapData")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("origin_restricted", &self.origin_restricted)
            .finish()
    }
}

/// One image draw: a source rect of the bitmap mapped onto a destination
/// rect in local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDraw {
    pub source_x: f64,
    pub source_y: f64,
    pub source_w: f64,
    pub source_h: f64,
    pub draw_x: f64,
    pub draw_y: f64,
    pub draw_w: f64,
    pub draw_h: f64,
}

#[derive(Debug, Clone)]
pub struct BitmapNode {
    /// Image for this frame.
    pub image: Option<BitmapData>,
    /// Whether scaled draws are filtered.
    pub smoothing: bool,
    /// Extra transform for this frame's draws.
    pub matrix: Option<Transform>,
    pub draws: Vec<ImageDraw>,
}

impl Default for BitmapNode {
    fn default() -> Self {
        Self {
            image: None,
            smoothing: true,
            matrix: None,
            draws: Vec::new(),
        }
    }
}

impl BitmapNode {
    pub(crate) fn clean_before_render(&mut self) {
        self.draws.clear();
        self.image = None;
        self.matrix = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::RenderNode;

    const SVG: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"><rect width="4" height="2" fill="red"/></svg>"#;

    #[test]
    fn test_svg_decode_size() {
        let bitmap = BitmapData::from_svg_bytes(SVG, 2.0).unwrap();
        assert_eq!(bitmap.width(), 8);
        assert_eq!(bitmap.height(), 4);
        assert!(!bitmap.is_origin_restricted());
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = BitmapData::from_bytes(b"not an image").unwrap_err();
        assert_eq!(err.code(), crate::error::DECODE_FAILED);
    }

    #[test]
    fn test_frame_reset_drops_transient_state_only() {
        let bitmap = BitmapData::from_svg_bytes(SVG, 1.0).unwrap();
        let mut node = RenderNode::bitmap();
        node.set_smoothing(false);
        node.set_image(Some(bitmap), Some(Transform::scale(2.0)));
        node.draw_image(0.0, 0.0, 4.0, 2.0, 0.0, 0.0, 8.0, 4.0);

        node.clean_before_render();
        let bitmap_node = node.as_bitmap().unwrap();
        assert!(bitmap_node.image.is_none());
        assert!(bitmap_node.matrix.is_none());
        assert!(bitmap_node.draws.is_empty());
        assert!(!bitmap_node.smoothing);
    }
}
