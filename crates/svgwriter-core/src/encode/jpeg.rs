//! JPEG encoding of canonical bitmaps.
//!
//! This module uses the `jpeg-encoder` crate, which writes both baseline and
//! progressive files. JPEG has no alpha channel, so the bitmap is flattened
//! to RGB first: with premultiplication enabled the premultiplied color is
//! kept as-is (alpha composited over black), otherwise colors are
//! unpremultiplied.

use jpeg_encoder::{ColorType, Encoder};
use serde::{Deserialize, Serialize};

use super::{Compressor, PayloadFormat};
use crate::bitmap::{unpremultiply, CanonicalBitmap, CANONICAL_BYTES_PER_PIXEL};
use crate::error::CompressionError;

/// Quality used by the default JPEG pipeline.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.8;

/// Options for the JPEG compressor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JpegOptions {
    /// Quality on a 0.0 to 1.0 scale. Out-of-range values are clamped.
    pub quality: f32,
    /// Progressive scan order instead of a single baseline scan.
    pub progressive: bool,
    /// Encode premultiplied color instead of straight color.
    pub premultiply: bool,
}

impl Default for JpegOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
            progressive: false,
            premultiply: true,
        }
    }
}

/// Encode a canonical bitmap to JPEG bytes.
///
/// # Errors
///
/// Returns `CompressionError::Unsupported` when a dimension exceeds the
/// 65535 pixel JPEG limit and `CompressionError::EncodingFailed` if the
/// encoder fails.
///
/// # Quality Guidelines
///
/// * 0.9-1.0: High quality, suitable for archival
/// * 0.8-0.9: Good quality, the pipeline default
/// * 0.6-0.8: Medium quality, acceptable for web
/// * Below 0.6: Low quality, visible artifacts
pub fn encode_jpeg(
    bitmap: &CanonicalBitmap,
    options: &JpegOptions,
) -> Result<Vec<u8>, CompressionError> {
    let (width, height) = match (
        u16::try_from(bitmap.width()),
        u16::try_from(bitmap.height()),
    ) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(CompressionError::Unsupported(format!(
                "{}x{} exceeds the JPEG size limit",
                bitmap.width(),
                bitmap.height()
            )))
        }
    };

    let quality = encoder_quality(options.quality);
    let rgb = flatten_to_rgb(bitmap, options.premultiply);

    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer, quality);
    encoder.set_progressive(options.progressive);
    encoder
        .encode(&rgb, width, height, ColorType::Rgb)
        .map_err(|e| CompressionError::EncodingFailed(e.to_string()))?;

    log::trace!(
        "JPEG encoder produced {} bytes at quality {} (progressive: {})",
        buffer.len(),
        quality,
        options.progressive
    );

    Ok(buffer)
}

/// Map a 0.0-1.0 quality to the encoder's 1-100 scale.
fn encoder_quality(quality: f32) -> u8 {
    let quality = if quality.is_nan() {
        DEFAULT_JPEG_QUALITY
    } else {
        quality.clamp(0.0, 1.0)
    };
    ((quality * 100.0).round() as u8).clamp(1, 100)
}

fn flatten_to_rgb(bitmap: &CanonicalBitmap, premultiply: bool) -> Vec<u8> {
    let pixels = bitmap.pixels();
    let mut rgb = Vec::with_capacity(pixels.len() / CANONICAL_BYTES_PER_PIXEL * 3);
    for px in pixels.chunks_exact(CANONICAL_BYTES_PER_PIXEL) {
        if premultiply {
            rgb.extend_from_slice(&px[..3]);
        } else {
            let a = px[3];
            rgb.extend_from_slice(&[
                unpremultiply(px[0], a),
                unpremultiply(px[1], a),
                unpremultiply(px[2], a),
            ]);
        }
    }
    rgb
}

/// [`Compressor`] producing baseline JPEG payloads.
#[derive(Debug, Clone, Default)]
pub struct JpegCompressor {
    options: JpegOptions,
}

impl JpegCompressor {
    pub fn new(options: JpegOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &JpegOptions {
        &self.options
    }
}

impl Compressor for JpegCompressor {
    fn format(&self) -> PayloadFormat {
        PayloadFormat::Jpeg
    }

    fn compress(&self, bitmap: &CanonicalBitmap) -> Result<Vec<u8>, CompressionError> {
        encode_jpeg(bitmap, &self.options)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
