//! Error taxonomy for the SVG encode pipeline.
//!
//! Each stage of the pipeline has its own error type. [`SvgWriterError`] is the
//! top-level error returned by the public entry points and wraps the first
//! stage error encountered without altering its message.

use thiserror::Error;

/// Errors raised while turning a platform image into a canonical bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageConversionError {
    /// The image handle has no backing pixel buffer.
    #[error("Image has no backing raster")]
    NoRaster,

    /// Width or height is zero, or the dimensions overflow addressable memory.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Row stride is shorter than one row of pixels.
    #[error("Invalid row stride: {stride} bytes, need at least {min}")]
    InvalidStride { stride: usize, min: usize },

    /// Pixel buffer is shorter than the declared geometry requires.
    #[error("Pixel buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    /// Pixel buffer length differs from the exact size the geometry requires.
    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The drawing surface could not be allocated.
    #[error("Can't allocate {width}x{height} drawing surface")]
    SurfaceAllocation { width: u32, height: u32 },
}

/// Errors raised by a payload compressor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    /// The requested encoder feature is not available.
    #[error("Unsupported encoder option: {0}")]
    Unsupported(String),

    /// The encoder failed internally.
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Errors raised while writing the SVG document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SvgWriteError {
    /// The payload to embed is empty.
    #[error("Payload is empty")]
    EmptyPayload,

    /// The payload is not a readable image of the tagged format.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// XML serialization failed.
    #[error("XML write failed: {0}")]
    Xml(String),
}

/// Top-level error for the encode entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SvgWriterError {
    #[error(transparent)]
    ImageConversion(#[from] ImageConversionError),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    SvgWrite(#[from] SvgWriteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_display() {
        let err = ImageConversionError::InvalidDimensions {
            width: 0,
            height: 10,
        };
        assert_eq!(err.to_string(), "Invalid dimensions: 0x10");

        let err = ImageConversionError::NoRaster;
        assert_eq!(err.to_string(), "Image has no backing raster");
    }

    #[test]
    fn test_top_level_error_is_transparent() {
        let err: SvgWriterError = ImageConversionError::NoRaster.into();
        assert_eq!(err.to_string(), "Image has no backing raster");

        let err: SvgWriterError = SvgWriteError::EmptyPayload.into();
        assert_eq!(err.to_string(), "Payload is empty");
        assert!(matches!(
            err,
            SvgWriterError::SvgWrite(SvgWriteError::EmptyPayload)
        ));
    }

    #[test]
    fn test_compression_error_display() {
        let err = CompressionError::Unsupported("progressive JPEG".to_string());
        assert_eq!(err.to_string(), "Unsupported encoder option: progressive JPEG");
    }
}
