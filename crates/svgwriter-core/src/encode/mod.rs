//! Payload compressors.
//!
//! This module provides functionality for:
//! - Quantized palette PNG encoding (lossy color reduction, lossless alpha)
//! - Baseline or progressive JPEG encoding with configurable quality
//!
//! Both encoders consume a [`CanonicalBitmap`] and sit behind the
//! [`Compressor`] trait so the pipeline can be driven by any implementation,
//! including test doubles.
//!
//! # Examples
//!
//! ```ignore
//! use svgwriter_core::encode::{Compressor, JpegCompressor};
//!
//! let bitmap = svgwriter_core::canonicalize(&image).unwrap();
//! let jpeg_bytes = JpegCompressor::default().compress(&bitmap).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod jpeg;
mod png;
pub mod quantize;

use serde::{Deserialize, Serialize};

use crate::bitmap::CanonicalBitmap;
use crate::error::CompressionError;

pub use self::jpeg::{encode_jpeg, JpegCompressor, JpegOptions, DEFAULT_JPEG_QUALITY};
pub use self::png::{encode_png_quantized, PngOptions, PngQuantCompressor, DEFAULT_PNG_SPEED};

/// Encoded payload format embedded in the SVG document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    Png,
    Jpeg,
}

impl PayloadFormat {
    /// MIME type used in the data URI.
    pub fn mime_type(self) -> &'static str {
        match self {
            PayloadFormat::Png => "image/png",
            PayloadFormat::Jpeg => "image/jpeg",
        }
    }

    /// The matching `image` crate format, used to read payload headers.
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            PayloadFormat::Png => image::ImageFormat::Png,
            PayloadFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }

    /// PNG for bitmaps with any transparency, JPEG for fully opaque ones.
    pub fn for_bitmap(bitmap: &CanonicalBitmap) -> Self {
        if bitmap.has_transparency() {
            PayloadFormat::Png
        } else {
            PayloadFormat::Jpeg
        }
    }
}

/// An external compressor turning a canonical bitmap into payload bytes.
pub trait Compressor {
    /// Format of the bytes returned by [`Compressor::compress`].
    fn format(&self) -> PayloadFormat;

    /// Encode `bitmap`. The result must be a complete, non-empty file.
    fn compress(&self, bitmap: &CanonicalBitmap) -> Result<Vec<u8>, CompressionError>;
}

impl<C: Compressor + ?Sized> Compressor for &C {
    fn format(&self) -> PayloadFormat {
        (**self).format()
    }

    fn compress(&self, bitmap: &CanonicalBitmap) -> Result<Vec<u8>, CompressionError> {
        (**self).compress(bitmap)
    }
}
