//! Image canonicalization.
//!
//! Converts any [`PlatformImage`] into a fresh [`CanonicalBitmap`] by drawing
//! its raster into a newly allocated surface. The input is never mutated or
//! retained.

use crate::bitmap::{CanonicalBitmap, PlatformImage};
use crate::canvas::Surface;
use crate::error::ImageConversionError;

/// Render `image` into an 8-bit RGBA, premultiplied, device-RGB bitmap.
///
/// # Errors
///
/// Returns `ImageConversionError::NoRaster` if the image has no backing
/// pixels, a layout error if the raster description is inconsistent, and
/// `SurfaceAllocation` if the drawing surface cannot be created. No partial
/// bitmap is ever returned.
///
/// # Example
///
/// ```ignore
/// use svgwriter_core::{canonicalize, PixelBuffer, PixelFormat};
///
/// let gray = PixelBuffer::new(2, 2, PixelFormat::L8, vec![10, 20, 30, 40]);
/// let bitmap = canonicalize(&gray).unwrap();
/// assert_eq!(bitmap.pixel(1, 0), [20, 20, 20, 255]);
/// ```
pub fn canonicalize<I>(image: &I) -> Result<CanonicalBitmap, ImageConversionError>
where
    I: PlatformImage + ?Sized,
{
    let raster = image.raster()?;
    let (width, height) = (raster.width(), raster.height());

    let mut surface = Surface::allocate(width, height)?;
    surface.draw(&raster);
    let bitmap = surface.finish();

    log::trace!(
        "Canonicalized {}x{} {:?}/{:?}/{:?} raster",
        width,
        height,
        raster.format(),
        raster.alpha_mode(),
        raster.color_space()
    );

    Ok(bitmap)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::bitmap::{AlphaMode, PixelBuffer, PixelFormat};
    use proptest::prelude::*;

    fn format_strategy() -> impl Strategy<Value = PixelFormat> {
        prop_oneof![
            Just(PixelFormat::Rgba8),
            Just(PixelFormat::Bgra8),
            Just(PixelFormat::Argb8),
            Just(PixelFormat::Rgb8),
            Just(PixelFormat::Bgr8),
            Just(PixelFormat::L8),
            Just(PixelFormat::La8),
        ]
    }

    fn alpha_strategy() -> impl Strategy<Value = AlphaMode> {
        prop_oneof![
            Just(AlphaMode::Straight),
            Just(AlphaMode::Premultiplied),
            Just(AlphaMode::Opaque),
        ]
    }

    fn image_strategy() -> impl Strategy<Value = PixelBuffer> {
        (1u32..=16, 1u32..=16, format_strategy(), alpha_strategy()).prop_flat_map(
            |(width, height, format, alpha)| {
                let size = width as usize * height as usize * format.bytes_per_pixel();
                prop::collection::vec(any::<u8>(), size..=size).prop_map(move |data| {
                    PixelBuffer::new(width, height, format, data).with_alpha_mode(alpha)
                })
            },
        )
    }

    proptest! {
        /// Property: Canonicalization preserves dimensions.
        #[test]
        fn prop_dimensions_preserved(img in image_strategy()) {
            let (width, height) = img.dimensions().unwrap();
            let bitmap = canonicalize(&img).unwrap();
            prop_assert_eq!((bitmap.width(), bitmap.height()), (width, height));
            prop_assert_eq!(bitmap.pixels().len(), (width * height * 4) as usize);
        }

        /// Property: Canonicalizing a canonical bitmap is bit-identical.
        #[test]
        fn prop_idempotent(img in image_strategy()) {
            let once = canonicalize(&img).unwrap();
            let twice = canonicalize(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Property: Color channels never exceed alpha after canonicalization.
        #[test]
        fn prop_output_is_valid_premultiplied(img in image_strategy()) {
            let bitmap = canonicalize(&img).unwrap();
            for px in bitmap.pixels().chunks_exact(4) {
                prop_assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
            }
        }
    }
}
