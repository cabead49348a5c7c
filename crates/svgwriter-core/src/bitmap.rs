//! Image model shared by every stage of the pipeline.
//!
//! Platform images are consumed through the [`PlatformImage`] capability
//! trait, which hands out a borrowed [`Raster`] describing the pixel layout.
//! Canonicalization turns any raster into a [`CanonicalBitmap`]: 8-bit RGBA,
//! premultiplied alpha, device RGB, tightly packed rows.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::ImageConversionError;

/// Bytes per pixel of a canonical bitmap.
pub const CANONICAL_BYTES_PER_PIXEL: usize = 4;

/// Pixel layout of a source raster. All formats are 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Red, green, blue, alpha.
    Rgba8,
    /// Blue, green, red, alpha (little-endian 32-bit ARGB).
    Bgra8,
    /// Alpha, red, green, blue (alpha-first).
    Argb8,
    /// Red, green, blue.
    Rgb8,
    /// Blue, green, red.
    Bgr8,
    /// Grayscale.
    L8,
    /// Grayscale with alpha.
    La8,
}

impl PixelFormat {
    /// Number of bytes a single pixel occupies.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 | PixelFormat::Bgra8 | PixelFormat::Argb8 => 4,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::La8 => 2,
            PixelFormat::L8 => 1,
        }
    }

    /// Whether the format carries an alpha channel.
    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 | PixelFormat::Argb8 | PixelFormat::La8
        )
    }

    /// Read one pixel as `[r, g, b, a]`. Formats without alpha report 255.
    #[inline]
    pub(crate) fn read(self, px: &[u8]) -> [u8; 4] {
        match self {
            PixelFormat::Rgba8 => [px[0], px[1], px[2], px[3]],
            PixelFormat::Bgra8 => [px[2], px[1], px[0], px[3]],
            PixelFormat::Argb8 => [px[1], px[2], px[3], px[0]],
            PixelFormat::Rgb8 => [px[0], px[1], px[2], 255],
            PixelFormat::Bgr8 => [px[2], px[1], px[0], 255],
            PixelFormat::L8 => [px[0], px[0], px[0], 255],
            PixelFormat::La8 => [px[0], px[0], px[0], px[1]],
        }
    }
}

/// How the alpha channel of a raster relates to its color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlphaMode {
    /// Color channels are independent of alpha.
    #[default]
    Straight,
    /// Color channels are already scaled by alpha.
    Premultiplied,
    /// Any alpha byte is padding; every pixel is fully opaque.
    Opaque,
}

/// Color space of the source color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Gamma-encoded device RGB. Passed through unchanged.
    #[default]
    DeviceRgb,
    /// Linear-light RGB. Encoded with the sRGB transfer curve on draw.
    LinearRgb,
}

/// Borrowed view of a platform image's pixels.
#[derive(Debug, Clone)]
pub struct Raster<'a> {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    alpha_mode: AlphaMode,
    color_space: ColorSpace,
    data: Cow<'a, [u8]>,
}

impl<'a> Raster<'a> {
    /// Describe a raster with an explicit row stride.
    ///
    /// # Errors
    ///
    /// Fails if a dimension is zero, the stride is shorter than a row, or the
    /// buffer does not cover `height` rows.
    pub fn new(
        data: impl Into<Cow<'a, [u8]>>,
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Result<Self, ImageConversionError> {
        let data = data.into();
        let invalid = ImageConversionError::InvalidDimensions { width, height };

        if width == 0 || height == 0 {
            return Err(invalid);
        }

        let row_bytes = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or(invalid.clone())?;
        if stride < row_bytes {
            return Err(ImageConversionError::InvalidStride {
                stride,
                min: row_bytes,
            });
        }

        let expected = stride
            .checked_mul(height as usize - 1)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or(invalid)?;
        if data.len() < expected {
            return Err(ImageConversionError::BufferTooSmall {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            format,
            alpha_mode: AlphaMode::default(),
            color_space: ColorSpace::default(),
            data,
        })
    }

    /// Describe a tightly packed raster (stride = width × bytes per pixel).
    pub fn packed(
        data: impl Into<Cow<'a, [u8]>>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, ImageConversionError> {
        let stride = (width as usize).saturating_mul(format.bytes_per_pixel());
        Self::new(data, width, height, stride, format)
    }

    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Pixel bytes of row `y`, without stride padding.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        let len = self.width as usize * self.format.bytes_per_pixel();
        &self.data[start..start + len]
    }

    /// True when the raster is already laid out as a canonical bitmap.
    pub fn is_canonical(&self) -> bool {
        self.format == PixelFormat::Rgba8
            && self.alpha_mode == AlphaMode::Premultiplied
            && self.color_space == ColorSpace::DeviceRgb
            && self.stride == self.width as usize * CANONICAL_BYTES_PER_PIXEL
    }
}

/// Capability interface over a platform's native image handle.
///
/// Implementors only need to hand out a raster view; the pipeline does the
/// rest. Returning [`ImageConversionError::NoRaster`] signals a handle with
/// no backing pixel buffer.
pub trait PlatformImage {
    /// Borrow the image's pixels.
    fn raster(&self) -> Result<Raster<'_>, ImageConversionError>;

    /// Image dimensions, if the image has a usable raster.
    fn dimensions(&self) -> Option<(u32, u32)> {
        self.raster().ok().map(|r| (r.width(), r.height()))
    }
}

/// Scale a straight color channel by alpha, rounding to nearest.
#[inline]
pub(crate) fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u16 * a as u16 + 127) / 255) as u8
}

/// Undo [`premultiply`]. Fully transparent pixels become black.
#[inline]
pub(crate) fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let a = a as u32;
    ((c as u32 * 255 + a / 2) / a).min(255) as u8
}

/// An 8-bit RGBA, premultiplied, device-RGB bitmap with stride = width × 4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl CanonicalBitmap {
    /// Assemble a bitmap from a finished drawing surface.
    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * CANONICAL_BYTES_PER_PIXEL,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Premultiply tightly packed straight RGBA pixels.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidDimensions` on zero dimensions and with
    /// `BufferSizeMismatch` when the buffer is not exactly
    /// `width * height * 4` bytes.
    pub fn from_straight_rgba(
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Self, ImageConversionError> {
        if width == 0 || height == 0 {
            return Err(ImageConversionError::InvalidDimensions { width, height });
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CANONICAL_BYTES_PER_PIXEL))
            .ok_or(ImageConversionError::InvalidDimensions { width, height })?;
        if rgba.len() != expected {
            return Err(ImageConversionError::BufferSizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }

        let pixels = rgba
            .chunks_exact(CANONICAL_BYTES_PER_PIXEL)
            .flat_map(|px| {
                let a = px[3];
                [
                    premultiply(px[0], a),
                    premultiply(px[1], a),
                    premultiply(px[2], a),
                    a,
                ]
            })
            .collect();
        Ok(Self::from_parts(width, height, pixels))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * CANONICAL_BYTES_PER_PIXEL
    }

    /// Premultiplied RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Premultiplied `[r, g, b, a]` at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = y as usize * self.stride() + x as usize * CANONICAL_BYTES_PER_PIXEL;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Whether any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels
            .chunks_exact(CANONICAL_BYTES_PER_PIXEL)
            .any(|px| px[3] != 255)
    }

    /// Convert to straight (non-premultiplied) RGBA bytes.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len());
        for px in self.pixels.chunks_exact(CANONICAL_BYTES_PER_PIXEL) {
            let a = px[3];
            out.extend_from_slice(&[
                unpremultiply(px[0], a),
                unpremultiply(px[1], a),
                unpremultiply(px[2], a),
                a,
            ]);
        }
        out
    }

    /// Straight-alpha copy as an `image::RgbaImage`.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba())
    }
}

impl PlatformImage for CanonicalBitmap {
    fn raster(&self) -> Result<Raster<'_>, ImageConversionError> {
        Ok(
            Raster::packed(self.pixels.as_slice(), self.width, self.height, PixelFormat::Rgba8)?
                .with_alpha_mode(AlphaMode::Premultiplied),
        )
    }
}

/// Owned pixel buffer with an explicit layout description.
///
/// This is the generic adapter for callers whose native image type is just
/// bytes plus metadata. A buffer built with [`PixelBuffer::detached`] has no
/// backing pixels and fails canonicalization with
/// [`ImageConversionError::NoRaster`].
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    alpha_mode: AlphaMode,
    color_space: ColorSpace,
    data: Option<Vec<u8>>,
}

impl PixelBuffer {
    /// Wrap tightly packed pixels.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            stride: (width as usize).saturating_mul(format.bytes_per_pixel()),
            format,
            alpha_mode: AlphaMode::default(),
            color_space: ColorSpace::default(),
            data: Some(data),
        }
    }

    /// An image handle of the given geometry with no pixel storage.
    pub fn detached(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            data: None,
            ..Self::new(width, height, format, Vec::new())
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }
}

impl PlatformImage for PixelBuffer {
    fn raster(&self) -> Result<Raster<'_>, ImageConversionError> {
        let data = self
            .data
            .as_deref()
            .ok_or(ImageConversionError::NoRaster)?;
        Ok(
            Raster::new(data, self.width, self.height, self.stride, self.format)?
                .with_alpha_mode(self.alpha_mode)
                .with_color_space(self.color_space),
        )
    }
}

impl PlatformImage for image::RgbaImage {
    fn raster(&self) -> Result<Raster<'_>, ImageConversionError> {
        let (width, height) = self.dimensions();
        Raster::packed(self.as_raw().as_slice(), width, height, PixelFormat::Rgba8)
    }
}

impl PlatformImage for image::RgbImage {
    fn raster(&self) -> Result<Raster<'_>, ImageConversionError> {
        let (width, height) = self.dimensions();
        Raster::packed(self.as_raw().as_slice(), width, height, PixelFormat::Rgb8)
    }
}

impl PlatformImage for image::DynamicImage {
    fn raster(&self) -> Result<Raster<'_>, ImageConversionError> {
        let (width, height) = (self.width(), self.height());
        match self {
            image::DynamicImage::ImageRgba8(img) => img.raster(),
            image::DynamicImage::ImageRgb8(img) => img.raster(),
            image::DynamicImage::ImageLuma8(img) => {
                Raster::packed(img.as_raw().as_slice(), width, height, PixelFormat::L8)
            }
            image::DynamicImage::ImageLumaA8(img) => {
                Raster::packed(img.as_raw().as_slice(), width, height, PixelFormat::La8)
            }
            // Wider sample types are narrowed to 8 bits up front
            other => Raster::packed(other.to_rgba8().into_raw(), width, height, PixelFormat::Rgba8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_format_sizes() {
        assert_eq!(PixelFormat::Rgba8.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Bgr8.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::La8.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::L8.bytes_per_pixel(), 1);
        assert!(PixelFormat::Argb8.has_alpha());
        assert!(!PixelFormat::Rgb8.has_alpha());
    }

    #[test]
    fn test_pixel_format_channel_order() {
        assert_eq!(PixelFormat::Bgra8.read(&[1, 2, 3, 4]), [3, 2, 1, 4]);
        assert_eq!(PixelFormat::Argb8.read(&[4, 1, 2, 3]), [1, 2, 3, 4]);
        assert_eq!(PixelFormat::L8.read(&[9]), [9, 9, 9, 255]);
        assert_eq!(PixelFormat::La8.read(&[9, 7]), [9, 9, 9, 7]);
    }

    #[test]
    fn test_raster_rejects_zero_dimensions() {
        let result = Raster::packed(Vec::<u8>::new(), 0, 4, PixelFormat::Rgba8);
        assert!(matches!(
            result,
            Err(ImageConversionError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_raster_rejects_short_stride() {
        let data = vec![0u8; 64];
        let result = Raster::new(data.as_slice(), 4, 4, 8, PixelFormat::Rgba8);
        assert_eq!(
            result.unwrap_err(),
            ImageConversionError::InvalidStride { stride: 8, min: 16 }
        );
    }

    #[test]
    fn test_raster_rejects_short_buffer() {
        let data = vec![0u8; 10];
        let result = Raster::packed(data.as_slice(), 2, 2, PixelFormat::Rgba8);
        assert_eq!(
            result.unwrap_err(),
            ImageConversionError::BufferTooSmall {
                expected: 16,
                actual: 10
            }
        );
    }

    #[test]
    fn test_raster_last_row_needs_no_padding() {
        // 2 rows of 3 RGB pixels with a 12-byte stride: 12 + 9 bytes suffice
        let data = vec![0u8; 21];
        let raster = Raster::new(data.as_slice(), 3, 2, 12, PixelFormat::Rgb8).unwrap();
        assert_eq!(raster.row(1).len(), 9);
    }

    #[test]
    fn test_premultiply_bounds() {
        assert_eq!(premultiply(255, 255), 255);
        assert_eq!(premultiply(200, 0), 0);
        assert_eq!(premultiply(255, 128), 128);
        assert_eq!(unpremultiply(128, 128), 255);
        assert_eq!(unpremultiply(50, 0), 0);
    }

    #[test]
    fn test_canonical_bitmap_straight_conversion() {
        let bitmap = CanonicalBitmap::from_parts(2, 1, vec![64, 0, 0, 128, 0, 0, 0, 0]);
        assert_eq!(bitmap.to_straight_rgba(), vec![128, 0, 0, 128, 0, 0, 0, 0]);
        assert!(bitmap.has_transparency());
        assert_eq!(bitmap.pixel(0, 0), [64, 0, 0, 128]);
    }

    #[test]
    fn test_from_straight_rgba() {
        let bitmap = CanonicalBitmap::from_straight_rgba(2, 1, &[255, 0, 0, 128, 9, 9, 9, 0])
            .unwrap();
        assert_eq!(bitmap.pixels(), &[128, 0, 0, 128, 0, 0, 0, 0]);

        assert!(matches!(
            CanonicalBitmap::from_straight_rgba(2, 2, &[0; 12]),
            Err(ImageConversionError::BufferSizeMismatch { expected: 16, actual: 12 })
        ));
        assert!(matches!(
            CanonicalBitmap::from_straight_rgba(1, 1, &[0; 8]),
            Err(ImageConversionError::BufferSizeMismatch { expected: 4, actual: 8 })
        ));
        assert!(matches!(
            CanonicalBitmap::from_straight_rgba(0, 2, &[]),
            Err(ImageConversionError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_canonical_bitmap_raster_is_canonical() {
        let bitmap = CanonicalBitmap::from_parts(1, 1, vec![1, 2, 3, 255]);
        assert!(bitmap.raster().unwrap().is_canonical());
        assert_eq!(bitmap.dimensions(), Some((1, 1)));
    }

    #[test]
    fn test_detached_buffer_has_no_raster() {
        let buffer = PixelBuffer::detached(4, 4, PixelFormat::Rgba8);
        assert_eq!(buffer.raster().unwrap_err(), ImageConversionError::NoRaster);
        assert_eq!(buffer.dimensions(), None);
    }

    #[test]
    fn test_dynamic_image_wide_samples_are_narrowed() {
        let img = image::DynamicImage::ImageRgba16(image::ImageBuffer::new(3, 2));
        let raster = img.raster().unwrap();
        assert_eq!(raster.format(), PixelFormat::Rgba8);
        assert_eq!((raster.width(), raster.height()), (3, 2));
    }
}
