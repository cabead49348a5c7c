//! Palette quantization for PNG output, backed by `imagequant`.
//!
//! Works on straight-alpha RGBA. Alpha takes part in the palette search, so
//! transparent and translucent pixels keep their own palette entries.

use crate::error::CompressionError;

/// Slowest, most thorough speed setting.
pub const MIN_SPEED: u8 = 1;
/// Fastest, least thorough speed setting.
pub const MAX_SPEED: u8 = 10;

/// A palette and one palette index per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedImage {
    /// Straight-alpha RGBA palette entries.
    pub palette: Vec<[u8; 4]>,
    /// Row-major palette indices.
    pub indices: Vec<u8>,
}

impl QuantizedImage {
    /// Whether any palette entry is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.palette.iter().any(|c| c[3] != 255)
    }
}

/// Reduce a `width` × `height` straight RGBA image to at most `max_colors`
/// colors.
///
/// `max_colors` is clamped to 2..=256 and `speed` to
/// [`MIN_SPEED`]..=[`MAX_SPEED`].
///
/// # Errors
///
/// Returns `CompressionError::EncodingFailed` if the quantizer rejects the
/// image or fails to build a palette.
pub fn quantize(
    pixels: &[u8],
    width: u32,
    height: u32,
    max_colors: u16,
    speed: u8,
) -> Result<QuantizedImage, CompressionError> {
    let max_colors = max_colors.clamp(2, 256);
    let speed = speed.clamp(MIN_SPEED, MAX_SPEED);

    let mut attributes = imagequant::new();
    attributes.set_speed(speed as i32).map_err(quantize_failed)?;
    attributes
        .set_max_colors(max_colors as u32)
        .map_err(quantize_failed)?;

    let rgba: Vec<imagequant::RGBA> = pixels
        .chunks_exact(4)
        .map(|px| imagequant::RGBA::new(px[0], px[1], px[2], px[3]))
        .collect();
    let mut image = attributes
        .new_image(rgba, width as usize, height as usize, 0.0)
        .map_err(quantize_failed)?;

    let mut result = attributes.quantize(&mut image).map_err(quantize_failed)?;
    let (palette, indices) = result.remapped(&mut image).map_err(quantize_failed)?;

    log::trace!(
        "Quantized {}x{} image to {} colors (speed {})",
        width,
        height,
        palette.len(),
        speed
    );

    Ok(QuantizedImage {
        palette: palette.iter().map(|c| [c.r, c.g, c.b, c.a]).collect(),
        indices,
    })
}

fn quantize_failed(err: imagequant::Error) -> CompressionError {
    CompressionError::EncodingFailed(format!("quantization failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distinct_colors(width: u32, height: u32) -> Vec<u8> {
        (0..width * height)
            .flat_map(|i| [(i * 37 % 256) as u8, (i * 11 % 256) as u8, (i / 2 % 256) as u8, 255])
            .collect()
    }

    fn color_of(q: &QuantizedImage, i: usize) -> [u8; 4] {
        q.palette[q.indices[i] as usize]
    }

    #[test]
    fn test_small_palette_keeps_colors() {
        let pixels = [[255, 0, 0, 255], [0, 0, 255, 255]].concat().repeat(8);
        let q = quantize(&pixels, 4, 4, 256, 9).unwrap();

        assert_eq!(q.indices.len(), 16);
        assert!(q.palette.len() <= 4);
        assert_eq!(color_of(&q, 0), [255, 0, 0, 255]);
        assert_eq!(color_of(&q, 1), [0, 0, 255, 255]);
        assert!(!q.has_transparency());
    }

    #[test]
    fn test_reduces_to_max_colors() {
        let q = quantize(&distinct_colors(32, 32), 32, 32, 16, 9).unwrap();
        assert!(q.palette.len() <= 16);
        assert_eq!(q.indices.len(), 32 * 32);
        assert!(q.indices.iter().all(|&i| (i as usize) < q.palette.len()));
    }

    #[test]
    fn test_transparency_survives_reduction() {
        // More distinct colors than a palette holds, with the first row cleared.
        let (width, height) = (20, 20);
        let mut pixels = distinct_colors(width, height);
        for px in pixels.chunks_exact_mut(4).take(width as usize) {
            px[3] = 0;
        }

        let q = quantize(&pixels, width, height, 256, MAX_SPEED - 1).unwrap();
        assert!(q.has_transparency());
        for x in 0..width as usize {
            assert_eq!(color_of(&q, x)[3], 0, "pixel {} lost its transparency", x);
        }
        assert_eq!(color_of(&q, width as usize * 5)[3], 255);
    }

    #[test]
    fn test_options_are_clamped() {
        let pixels = distinct_colors(8, 8);
        assert!(quantize(&pixels, 8, 8, 0, 0).unwrap().palette.len() <= 2);
        assert!(quantize(&pixels, 8, 8, 1000, 200).is_ok());
    }
}
