//! Error catalog for the rendering core.
//!
//! Every error carries a stable catalog number so host applications can
//! localize or log it without matching on message text.

use thiserror::Error;

/// Catalog number for blocked pixel readback.
pub const READBACK_BLOCKED: u32 = 1039;
/// Catalog number for readback outside the surface.
pub const PIXEL_OUT_OF_RANGE: u32 = 1040;
/// Catalog number for a surface that cannot be allocated.
pub const SURFACE_ALLOCATION: u32 = 1041;
/// Catalog number for image encoding failures.
pub const ENCODE_FAILED: u32 = 1042;
/// Catalog number for bitmap decoding failures.
pub const DECODE_FAILED: u32 = 1043;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("#1039: pixel data cannot be read back because the buffer holds origin-restricted content")]
    ReadbackBlocked,
    #[error("#1040: pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    PixelOutOfRange {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    #[error("#1041: cannot allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("#1042: failed to encode buffer as {mime}: {source}")]
    Encode {
        mime: String,
        #[source]
        source: image::ImageError,
    },
    #[error("#1043: failed to decode bitmap: {0}")]
    Decode(String),
}

impl RenderError {
    /// Stable catalog number of this error.
    pub fn code(&self) -> u32 {
        match self {
            RenderError::ReadbackBlocked => READBACK_BLOCKED,
            RenderError::PixelOutOfRange { .. } => PIXEL_OUT_OF_RANGE,
            RenderError::SurfaceAllocation { .. } => SURFACE_ALLOCATION,
            RenderError::Encode { .. } => ENCODE_FAILED,
            RenderError::Decode(_) => DECODE_FAILED,
        }
    }
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_messages() {
        let errors = [
            RenderError::ReadbackBlocked,
            RenderError::PixelOutOfRange {
                x: 5,
                y: -1,
                width: 3,
                height: 3,
            },
            RenderError::SurfaceAllocation {
                width: 0,
                height: 0,
            },
            RenderError::Decode("bad header".into()),
        ];
        for err in errors {
            let prefix = format!("#{}:", err.code());
            assert!(err.to_string().starts_with(&prefix), "{}", err);
        }
    }

    #[test]
    fn test_readback_code_is_stable() {
        assert_eq!(RenderError::ReadbackBlocked.code(), 1039);
    }
}
