//! Scoped drawing surface used by canonicalization.
//!
//! A [`Surface`] owns a zeroed RGBA8 premultiplied buffer. Drawing a raster
//! into it performs every format, alpha and color-space conversion. The
//! buffer is released when the surface is dropped, or handed over to the
//! resulting [`CanonicalBitmap`] by [`Surface::finish`].

use crate::bitmap::{
    premultiply, unpremultiply, AlphaMode, CanonicalBitmap, ColorSpace, Raster,
    CANONICAL_BYTES_PER_PIXEL,
};
use crate::error::ImageConversionError;

/// Transfer table from 8-bit linear light to 8-bit sRGB-encoded values.
type TransferTable = [u8; 256];

/// RGBA8 premultiplied, device-RGB drawing target.
#[derive(Debug)]
pub(crate) struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// Allocate a transparent surface of `width` × `height` pixels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` for an empty extent and `SurfaceAllocation`
    /// when the byte size overflows or the allocator refuses the request.
    pub(crate) fn allocate(width: u32, height: u32) -> Result<Self, ImageConversionError> {
        if width == 0 || height == 0 {
            return Err(ImageConversionError::InvalidDimensions { width, height });
        }

        let failed = ImageConversionError::SurfaceAllocation { width, height };
        let len = (width as usize)
            .checked_mul(CANONICAL_BYTES_PER_PIXEL)
            .and_then(|stride| stride.checked_mul(height as usize))
            .ok_or(failed.clone())?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| failed)?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub(crate) fn stride(&self) -> usize {
        self.width as usize * CANONICAL_BYTES_PER_PIXEL
    }

    /// Draw `raster` with its origin at (0, 0).
    ///
    /// The raster must have exactly the surface's extent.
    pub(crate) fn draw(&mut self, raster: &Raster<'_>) {
        debug_assert_eq!(
            (raster.width(), raster.height()),
            (self.width, self.height),
            "Raster extent must match the surface"
        );

        let format = raster.format();
        let bpp = format.bytes_per_pixel();
        let alpha_mode = raster.alpha_mode();
        let transfer = match raster.color_space() {
            ColorSpace::DeviceRgb => None,
            ColorSpace::LinearRgb => Some(srgb_encode_table()),
        };

        let stride = self.stride();
        let cols = self.width as usize;

        for y in 0..self.height {
            let src = &raster.row(y)[..cols * bpp];
            let start = y as usize * stride;
            let dst = &mut self.pixels[start..start + cols * CANONICAL_BYTES_PER_PIXEL];

            for (s, d) in src
                .chunks_exact(bpp)
                .zip(dst.chunks_exact_mut(CANONICAL_BYTES_PER_PIXEL))
            {
                d.copy_from_slice(&canonical_pixel(
                    format.read(s),
                    alpha_mode,
                    transfer.as_ref(),
                ));
            }
        }
    }

    /// Consume the surface and take its pixels as a finished bitmap.
    pub(crate) fn finish(self) -> CanonicalBitmap {
        CanonicalBitmap::from_parts(self.width, self.height, self.pixels)
    }
}

/// Convert one `[r, g, b, a]` source pixel to canonical premultiplied form.
#[inline]
fn canonical_pixel(
    [r, g, b, a]: [u8; 4],
    alpha_mode: AlphaMode,
    transfer: Option<&TransferTable>,
) -> [u8; 4] {
    let encode = |c: u8| transfer.map_or(c, |t| t[c as usize]);

    match alpha_mode {
        AlphaMode::Opaque => [encode(r), encode(g), encode(b), 255],
        AlphaMode::Straight => [
            premultiply(encode(r), a),
            premultiply(encode(g), a),
            premultiply(encode(b), a),
            a,
        ],
        AlphaMode::Premultiplied if transfer.is_none() => [r.min(a), g.min(a), b.min(a), a],
        AlphaMode::Premultiplied => {
            let mut out = [0, 0, 0, a];
            for (o, c) in out.iter_mut().zip([r, g, b]) {
                *o = premultiply(encode(unpremultiply(c.min(a), a)), a);
            }
            out
        }
    }
}

/// Lookup table for the sRGB opto-electronic transfer function.
fn srgb_encode_table() -> TransferTable {
    let mut table = [0u8; 256];
    for (i, v) in table.iter_mut().enumerate() {
        let linear = i as f32 / 255.0;
        let encoded = if linear <= 0.003_130_8 {
            linear * 12.92
        } else {
            1.055 * linear.powf(1.0 / 2.4) - 0.055
        };
        *v = (encoded * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    table
}
