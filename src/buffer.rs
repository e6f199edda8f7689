//! Off-screen pixel surfaces.
//!
//! [`RenderBuffer`] is the surface contract the rasterizer and hit-testing
//! rely on. [`PixmapBuffer`] implements it on a tiny-skia pixmap, and
//! [`ScratchBuffer`] lends out a small per-thread buffer for hit-tests.

use std::cell::RefCell;
use std::fmt;
use std::io::Cursor;
use std::ops::{Deref, DerefMut};

use base64::Engine;
use image::{ImageFormat, RgbImage, RgbaImage};
use resvg::tiny_skia::{self, BlendMode, FillRule, Mask, Paint, Pixmap, PixmapPaint};

use crate::error::{RenderError, Result};
use crate::geometry::Region;
use crate::renderer::RendererConfig;

/// Side length of the scratch buffer used by hit-tests.
pub const SCRATCH_SIZE: u32 = 3;

/// An off-screen pixel surface.
pub trait RenderBuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Reallocate the surface and clear it. With `use_max_size`, a dimension
    /// never shrinks below its current value.
    fn resize(&mut self, width: u32, height: u32, use_max_size: bool) -> Result<()>;

    /// Reallocate the surface, keeping the current pixels at the given offset.
    fn resize_to(&mut self, width: u32, height: u32, offset_x: i32, offset_y: i32) -> Result<()>;

    /// Clear `regions` (shifted by the offset) to transparent and restrict
    /// drawing to them until the matching [`end_clip`](Self::end_clip).
    fn begin_clip(&mut self, regions: &[Region], offset_x: f64, offset_y: f64);

    fn end_clip(&mut self);

    /// Straight-alpha RGBA of one pixel.
    fn get_pixel(&self, x: i32, y: i32) -> Result<[u8; 4]>;

    /// Encode the surface as a `data:` URL. Unsupported types fall back to
    /// PNG. `quality` is in `0..=1` and only used for JPEG.
    fn to_data_url(&self, mime: &str, quality: Option<f64>) -> Result<String>;

    /// Make every pixel transparent.
    fn clear(&mut self);

    /// Release the surface memory, leaving a 1x1 surface.
    fn destroy(&mut self);
}

/// Render buffer backed by a tiny-skia pixmap.
#[derive(Clone)]
pub struct PixmapBuffer {
    pixmap: Pixmap,
    clips: Vec<Mask>,
    tainted: bool,
    jpeg_quality: f64,
}

impl fmt::Debug for PixmapBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixmapBuffer")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("clip_depth", &self.clips.len())
            .field("tainted", &self.tainted)
            .finish()
    }
}

fn allocate(width: u32, height: u32) -> Result<Pixmap> {
    let width = width.max(1);
    let height = height.max(1);
    Pixmap::new(width, height).ok_or(RenderError::SurfaceAllocation { width, height })
}

impl PixmapBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_config(width, height, &RendererConfig::default())
    }

    pub fn with_config(width: u32, height: u32, config: &RendererConfig) -> Result<Self> {
        Ok(Self {
            pixmap: allocate(width, height)?,
            clips: Vec::new(),
            tainted: false,
            jpeg_quality: config.jpeg_quality,
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// The surface plus the active clip mask, for drawing.
    pub fn surface_and_clip(&mut self) -> (&mut Pixmap, Option<&Mask>) {
        (&mut self.pixmap, self.clips.last())
    }

    /// Record that origin-restricted pixels were drawn into this buffer.
    pub fn taint(&mut self) {
        self.tainted = true;
    }

    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    fn demultiplied(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixmap.data().len());
        for pixel in self.pixmap.pixels() {
            let color = pixel.demultiply();
            data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        data
    }

    fn encode(&self, mime: &str, quality: Option<f64>) -> Result<Vec<u8>> {
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let mut bytes = Vec::new();
        let mut cursor = Cursor::new(&mut bytes);

        if mime == "image/jpeg" {
            // Premultiplied color is the surface composited over black.
            let rgb: Vec<u8> = self
                .pixmap
                .pixels()
                .iter()
                .flat_map(|p| [p.red(), p.green(), p.blue()])
                .collect();
            let quality = quality.unwrap_or(self.jpeg_quality).clamp(0.0, 1.0);
            let quality = ((quality * 100.0).round() as u8).max(1);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
            let image = RgbImage::from_raw(width, height, rgb)
                .ok_or_else(|| RenderError::Decode("surface size mismatch".to_string()))?;
            image
                .write_with_encoder(encoder)
                .map_err(|source| RenderError::Encode {
                    mime: mime.to_string(),
                    source,
                })?;
        } else {
            let image = RgbaImage::from_raw(width, height, self.demultiplied())
                .ok_or_else(|| RenderError::Decode("surface size mismatch".to_string()))?;
            image
                .write_to(&mut cursor, ImageFormat::Png)
                .map_err(|source| RenderError::Encode {
                    mime: "image/png".to_string(),
                    source,
                })?;
        }
        Ok(bytes)
    }
}

impl RenderBuffer for PixmapBuffer {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn resize(&mut self, width: u32, height: u32, use_max_size: bool) -> Result<()> {
        let (width, height) = if use_max_size {
            (width.max(self.width()), height.max(self.height()))
        } else {
            (width, height)
        };
        self.pixmap = allocate(width, height)?;
        self.clips.clear();
        self.tainted = false;
        log::debug!("render buffer resized to {}x{}", self.width(), self.height());
        Ok(())
    }

    fn resize_to(&mut self, width: u32, height: u32, offset_x: i32, offset_y: i32) -> Result<()> {
        let mut pixmap = allocate(width, height)?;
        pixmap.draw_pixmap(
            offset_x,
            offset_y,
            self.pixmap.as_ref(),
            &PixmapPaint::default(),
            tiny_skia::Transform::identity(),
            None,
        );
        self.pixmap = pixmap;
        self.clips.clear();
        log::debug!(
            "render buffer resized to {}x{} keeping content at ({}, {})",
            width,
            height,
            offset_x,
            offset_y
        );
        Ok(())
    }

    fn begin_clip(&mut self, regions: &[Region], offset_x: f64, offset_y: f64) {
        let Some(mut mask) = Mask::new(self.width(), self.height()) else {
            return;
        };

        let mut builder = tiny_skia::PathBuilder::new();
        for region in regions.iter().filter(|r| !r.is_empty()) {
            let rect = tiny_skia::Rect::from_xywh(
                (region.min_x + offset_x) as f32,
                (region.min_y + offset_y) as f32,
                region.width as f32,
                region.height as f32,
            );
            if let Some(rect) = rect {
                builder.push_rect(rect);
            }
        }
        if let Some(path) = builder.finish() {
            mask.fill_path(&path, FillRule::Winding, false, tiny_skia::Transform::identity());

            let paint = Paint {
                blend_mode: BlendMode::Clear,
                ..Default::default()
            };
            self.pixmap.fill_path(
                &path,
                &paint,
                FillRule::Winding,
                tiny_skia::Transform::identity(),
                self.clips.last(),
            );
        }

        // Nested clips only narrow the enclosing one.
        if let Some(outer) = self.clips.last() {
            for (inner, outer) in mask.data_mut().iter_mut().zip(outer.data()) {
                *inner = (*inner).min(*outer);
            }
        }
        log::debug!("begin clip with {} region(s)", regions.len());
        self.clips.push(mask);
    }

    fn end_clip(&mut self) {
        if self.clips.pop().is_none() {
            log::warn!("end_clip without a matching begin_clip");
        }
    }

    fn get_pixel(&self, x: i32, y: i32) -> Result<[u8; 4]> {
        if self.tainted {
            return Err(RenderError::ReadbackBlocked);
        }
        let out_of_range = RenderError::PixelOutOfRange {
            x,
            y,
            width: self.width(),
            height: self.height(),
        };
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return Err(out_of_range);
        }
        let color = self
            .pixmap
            .pixel(x as u32, y as u32)
            .ok_or(out_of_range)?
            .demultiply();
        Ok([color.red(), color.green(), color.blue(), color.alpha()])
    }

    fn to_data_url(&self, mime: &str, quality: Option<f64>) -> Result<String> {
        if self.tainted {
            return Err(RenderError::ReadbackBlocked);
        }
        let mime = match mime {
            "image/png" | "image/jpeg" => mime,
            other => {
                log::debug!("unsupported image type {:?}, encoding as PNG", other);
                "image/png"
            }
        };
        let bytes = self.encode(mime, quality)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(format!("data:{};base64,{}", mime, encoded))
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn destroy(&mut self) {
        if let Some(pixmap) = Pixmap::new(1, 1) {
            self.pixmap = pixmap;
        }
        self.clips.clear();
        self.tainted = false;
    }
}

thread_local! {
    static SCRATCH: RefCell<Option<PixmapBuffer>> = const { RefCell::new(None) };
}

/// The per-thread hit-test buffer, held for the lifetime of this guard.
///
/// Dropping the guard hands the buffer back to the thread's slot. If the
/// slot is already empty because another guard holds the buffer, a fresh
/// buffer is allocated instead and discarded on drop.
pub struct ScratchBuffer {
    buffer: Option<PixmapBuffer>,
}

impl ScratchBuffer {
    pub fn acquire() -> Result<Self> {
        let buffer = match SCRATCH.with(|slot| slot.borrow_mut().take()) {
            Some(buffer) => buffer,
            None => PixmapBuffer::new(SCRATCH_SIZE, SCRATCH_SIZE)?,
        };
        Ok(Self {
            buffer: Some(buffer),
        })
    }
}

impl Deref for ScratchBuffer {
    type Target = PixmapBuffer;

    fn deref(&self) -> &PixmapBuffer {
        // Only `drop` empties the option.
        match &self.buffer {
            Some(buffer) => buffer,
            None => unreachable!("scratch buffer used after release"),
        }
    }
}

impl DerefMut for ScratchBuffer {
    fn deref_mut(&mut self) -> &mut PixmapBuffer {
        match &mut self.buffer {
            Some(buffer) => buffer,
            None => unreachable!("scratch buffer used after release"),
        }
    }
}

impl Drop for ScratchBuffer {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            let _ = SCRATCH.try_with(|slot| {
                let mut slot = slot.borrow_mut();
                if slot.is_none() {
                    *slot = Some(buffer);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_red(buffer: &mut PixmapBuffer) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 0, 0, 255);
        let rect = tiny_skia::Rect::from_xywh(0.0, 0.0, 100.0, 100.0).unwrap();
        let (pixmap, clip) = buffer.surface_and_clip();
        pixmap.fill_rect(rect, &paint, tiny_skia::Transform::identity(), clip);
    }

    #[test]
    fn test_get_pixel_reads_straight_alpha() {
        let mut buffer = PixmapBuffer::new(4, 4).unwrap();
        fill_red(&mut buffer);
        assert_eq!(buffer.get_pixel(1, 1).unwrap(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_get_pixel_out_of_range() {
        let buffer = PixmapBuffer::new(3, 3).unwrap();
        let err = buffer.get_pixel(3, 0).unwrap_err();
        assert_eq!(err.code(), crate::error::PIXEL_OUT_OF_RANGE);
        assert!(buffer.get_pixel(-1, 0).is_err());
        assert!(buffer.get_pixel(0, 3).is_err());
        assert!(buffer.get_pixel(5, 1).is_err());
    }

    #[test]
    fn test_get_pixel_past_row_end_does_not_wrap() {
        let mut buffer = PixmapBuffer::new(3, 3).unwrap();
        fill_red(&mut buffer);
        assert!(matches!(
            buffer.get_pixel(3, 1),
            Err(RenderError::PixelOutOfRange { x: 3, y: 1, width: 3, height: 3 })
        ));
    }

    #[test]
    fn test_tainted_buffer_blocks_readback() {
        let mut buffer = PixmapBuffer::new(3, 3).unwrap();
        buffer.taint();
        assert!(matches!(buffer.get_pixel(0, 0), Err(RenderError::ReadbackBlocked)));
        assert!(matches!(
            buffer.to_data_url("image/png", None),
            Err(RenderError::ReadbackBlocked)
        ));
    }

    #[test]
    fn test_resize_clears_and_keeps_max() {
        let mut buffer = PixmapBuffer::new(10, 10).unwrap();
        fill_red(&mut buffer);
        buffer.resize(4, 20, true).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (10, 20));
        assert_eq!(buffer.get_pixel(0, 0).unwrap()[3], 0);

        buffer.resize(4, 4, false).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (4, 4));
    }

    #[test]
    fn test_resize_to_keeps_content_at_offset() {
        let mut buffer = PixmapBuffer::new(2, 2).unwrap();
        fill_red(&mut buffer);
        buffer.resize_to(6, 6, 3, 3).unwrap();
        assert_eq!(buffer.get_pixel(0, 0).unwrap()[3], 0);
        assert_eq!(buffer.get_pixel(3, 3).unwrap(), [255, 0, 0, 255]);
        assert_eq!(buffer.get_pixel(4, 4).unwrap(), [255, 0, 0, 255]);
        assert_eq!(buffer.get_pixel(5, 5).unwrap()[3], 0);
    }

    #[test]
    fn test_clip_clears_and_restricts() {
        let mut buffer = PixmapBuffer::new(10, 10).unwrap();
        fill_red(&mut buffer);
        buffer.begin_clip(&[Region::new(0.0, 0.0, 5.0, 5.0)], 0.0, 0.0);
        assert_eq!(buffer.get_pixel(2, 2).unwrap()[3], 0);
        assert_eq!(buffer.get_pixel(7, 7).unwrap()[3], 255);

        buffer.begin_clip(&[Region::new(3.0, 3.0, 8.0, 8.0)], 0.0, 0.0);
        fill_red(&mut buffer);
        assert_eq!(buffer.get_pixel(4, 4).unwrap()[3], 255);
        assert_eq!(buffer.get_pixel(1, 1).unwrap()[3], 0);
        buffer.end_clip();
        buffer.end_clip();

        fill_red(&mut buffer);
        assert_eq!(buffer.get_pixel(1, 1).unwrap()[3], 255);
    }

    #[test]
    fn test_data_url_prefix_and_fallback() {
        let buffer = PixmapBuffer::new(2, 2).unwrap();
        let png = buffer.to_data_url("image/png", None).unwrap();
        assert!(png.starts_with("data:image/png;base64,iVBORw0KGgo"));
        let fallback = buffer.to_data_url("image/webp", None).unwrap();
        assert!(fallback.starts_with("data:image/png;base64,"));
        let jpeg = buffer.to_data_url("image/jpeg", Some(0.5)).unwrap();
        assert!(jpeg.starts_with("data:image/jpeg;base64,/9j/"));
    }

    #[test]
    fn test_destroy_shrinks_to_one_pixel() {
        let mut buffer = PixmapBuffer::new(50, 50).unwrap();
        buffer.taint();
        buffer.destroy();
        assert_eq!((buffer.width(), buffer.height()), (1, 1));
        assert!(!buffer.is_tainted());
    }

    #[test]
    fn test_scratch_buffer_is_reused() {
        {
            let mut scratch = ScratchBuffer::acquire().unwrap();
            scratch.resize(7, 7, false).unwrap();
        }
        let scratch = ScratchBuffer::acquire().unwrap();
        assert_eq!(scratch.width(), 7);

        // Nested acquisition gets its own buffer.
        let nested = ScratchBuffer::acquire().unwrap();
        assert_eq!(nested.width(), SCRATCH_SIZE);
    }
}
