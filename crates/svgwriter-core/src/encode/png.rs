//! Quantized palette PNG encoding.
//!
//! The canonical bitmap is unpremultiplied, reduced to a palette by
//! `imagequant` through [`quantize`](super::quantize::quantize) and written
//! as an 8-bit indexed PNG with `PLTE` and, when needed, `tRNS` chunks.

use serde::{Deserialize, Serialize};

use super::quantize::{quantize, MAX_SPEED, MIN_SPEED};
use super::{Compressor, PayloadFormat};
use crate::bitmap::CanonicalBitmap;
use crate::error::CompressionError;

/// Speed used by the default PNG pipeline.
pub const DEFAULT_PNG_SPEED: u8 = 9;

/// Options for the quantizing PNG compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PngOptions {
    /// Quantization speed, 1 (thorough) to 10 (fastest).
    pub speed: u8,
    /// Palette size limit, 2 to 256.
    pub max_colors: u16,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            speed: DEFAULT_PNG_SPEED,
            max_colors: 256,
        }
    }
}

/// Encode a canonical bitmap as a quantized palette PNG.
///
/// # Errors
///
/// Returns `CompressionError::EncodingFailed` if quantization or the PNG
/// writer fails.
pub fn encode_png_quantized(
    bitmap: &CanonicalBitmap,
    options: &PngOptions,
) -> Result<Vec<u8>, CompressionError> {
    let straight = bitmap.to_straight_rgba();
    let quantized = quantize(
        &straight,
        bitmap.width(),
        bitmap.height(),
        options.max_colors,
        options.speed,
    )?;

    let mut palette = Vec::with_capacity(quantized.palette.len() * 3);
    let mut trns = Vec::with_capacity(quantized.palette.len());
    for [r, g, b, a] in &quantized.palette {
        palette.extend_from_slice(&[*r, *g, *b]);
        trns.push(*a);
    }

    let mut out = Vec::with_capacity(quantized.indices.len() / 2 + 1024);
    {
        let mut encoder = png::Encoder::new(&mut out, bitmap.width(), bitmap.height());
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(palette);
        if quantized.has_transparency() {
            encoder.set_trns(trns);
        }
        encoder.set_compression(compression_for_speed(options.speed));

        let mut writer = encoder.write_header().map_err(encoding_failed)?;
        writer
            .write_image_data(&quantized.indices)
            .map_err(encoding_failed)?;
        writer.finish().map_err(encoding_failed)?;
    }

    log::trace!(
        "PNG encoder produced {} bytes with {} palette entries",
        out.len(),
        quantized.palette.len()
    );

    Ok(out)
}

fn compression_for_speed(speed: u8) -> png::Compression {
    let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    if speed >= 7 {
        png::Compression::Fast
    } else {
        png::Compression::Default
    }
}

fn encoding_failed(err: png::EncodingError) -> CompressionError {
    CompressionError::EncodingFailed(err.to_string())
}

/// [`Compressor`] producing quantized palette PNG payloads.
#[derive(Debug, Clone, Default)]
pub struct PngQuantCompressor {
    options: PngOptions,
}

impl PngQuantCompressor {
    pub fn new(options: PngOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PngOptions {
        &self.options
    }
}

impl Compressor for PngQuantCompressor {
    fn format(&self) -> PayloadFormat {
        PayloadFormat::Png
    }

    fn compress(&self, bitmap: &CanonicalBitmap) -> Result<Vec<u8>, CompressionError> {
        encode_png_quantized(bitmap, &self.options)
    }
}
