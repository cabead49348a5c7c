//! SVG encode pipeline.
//!
//! Every entry point runs the same synchronous chain:
//!
//! 1. Canonicalize the platform image
//! 2. Compress the canonical bitmap to a PNG or JPEG payload
//! 3. Wrap the payload in an SVG document
//!
//! The first failure aborts the chain and is returned unchanged; no partial
//! document is ever produced. The compressed image is always the canonical
//! bitmap, never the caller's input.

use serde::{Deserialize, Serialize};

use crate::bitmap::{CanonicalBitmap, PlatformImage};
use crate::canonicalize::canonicalize;
use crate::encode::{
    Compressor, JpegCompressor, JpegOptions, PayloadFormat, PngOptions, PngQuantCompressor,
};
use crate::error::SvgWriterError;
use crate::svg::{DocumentWriter, SvgDocumentWriter};

/// Options for [`encode_with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Payload format. `None` picks PNG for images with transparency and
    /// JPEG otherwise.
    pub format: Option<PayloadFormat>,
    pub png: PngOptions,
    pub jpeg: JpegOptions,
}

/// Canonicalize, compress and wrap with pluggable collaborators.
#[derive(Debug, Clone, Default)]
pub struct SvgEncoder<C, W = SvgDocumentWriter> {
    compressor: C,
    writer: W,
}

impl<C: Compressor> SvgEncoder<C> {
    pub fn new(compressor: C) -> Self {
        Self {
            compressor,
            writer: SvgDocumentWriter,
        }
    }
}

impl<C: Compressor, W: DocumentWriter> SvgEncoder<C, W> {
    pub fn with_writer(compressor: C, writer: W) -> Self {
        Self { compressor, writer }
    }

    /// Run the full pipeline on a platform image.
    pub fn encode<I>(&self, image: &I) -> Result<Vec<u8>, SvgWriterError>
    where
        I: PlatformImage + ?Sized,
    {
        let bitmap = canonicalize(image)?;
        self.encode_canonical(&bitmap)
    }

    /// Compress and wrap an already canonical bitmap.
    pub fn encode_canonical(&self, bitmap: &CanonicalBitmap) -> Result<Vec<u8>, SvgWriterError> {
        let format = self.compressor.format();
        let payload = self.compressor.compress(bitmap)?;
        log::debug!(
            "Compressed {}x{} bitmap to {} byte {} payload",
            bitmap.width(),
            bitmap.height(),
            payload.len(),
            format.mime_type()
        );

        Ok(self.writer.write_document(&payload, format)?)
    }
}

/// Encode `image` as an SVG document embedding a quantized PNG.
///
/// Uses quantization speed 9 (fastest, least thorough).
///
/// # Errors
///
/// Returns the first `ImageConversion`, `Compression` or `SvgWrite` error hit.
///
/// # Example
///
/// ```ignore
/// use svgwriter_core::{encode_as_png, PixelBuffer, PixelFormat};
///
/// let red = PixelBuffer::new(2, 2, PixelFormat::Rgba8, [255, 0, 0, 255].repeat(4));
/// let svg = encode_as_png(&red).unwrap();
/// assert!(String::from_utf8(svg).unwrap().contains("image/png"));
/// ```
pub fn encode_as_png<I>(image: &I) -> Result<Vec<u8>, SvgWriterError>
where
    I: PlatformImage + ?Sized,
{
    SvgEncoder::new(PngQuantCompressor::default()).encode(image)
}

/// Encode `image` as an SVG document embedding a JPEG.
///
/// Uses quality 0.8, baseline (non-progressive) encoding and premultiplied
/// color.
pub fn encode_as_jpeg<I>(image: &I) -> Result<Vec<u8>, SvgWriterError>
where
    I: PlatformImage + ?Sized,
{
    SvgEncoder::new(JpegCompressor::default()).encode(image)
}

/// Encode `image` with an explicit format, or pick one automatically.
pub fn encode_as_svg<I>(image: &I, format: Option<PayloadFormat>) -> Result<Vec<u8>, SvgWriterError>
where
    I: PlatformImage + ?Sized,
{
    encode_with_options(
        image,
        &EncodeOptions {
            format,
            ..Default::default()
        },
    )
}

/// Encode `image` using caller-supplied compressor options.
pub fn encode_with_options<I>(image: &I, options: &EncodeOptions) -> Result<Vec<u8>, SvgWriterError>
where
    I: PlatformImage + ?Sized,
{
    let bitmap = canonicalize(image)?;
    let format = options
        .format
        .unwrap_or_else(|| PayloadFormat::for_bitmap(&bitmap));
    log::debug!("Encoding SVG with {} payload", format.mime_type());

    match format {
        PayloadFormat::Png => {
            SvgEncoder::new(PngQuantCompressor::new(options.png)).encode_canonical(&bitmap)
        }
        PayloadFormat::Jpeg => {
            SvgEncoder::new(JpegCompressor::new(options.jpeg)).encode_canonical(&bitmap)
        }
    }
}



// ============================================================================
// Property-Based Tests
// ============================================================================
