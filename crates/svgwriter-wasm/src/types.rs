//! WASM-compatible wrapper types for image data.
//!
//! Browsers hand out pixels as straight-alpha RGBA (`ImageData`,
//! `Uint8ClampedArray`), so [`JsImage`] stores exactly that and describes it
//! to the core pipeline through the `PlatformImage` trait.

use svgwriter_core::error::ImageConversionError;
use svgwriter_core::{PixelFormat, PlatformImage, Raster};
use wasm_bindgen::prelude::*;

/// An RGBA image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. Constructing a `JsImage` copies
/// the JavaScript buffer once; encoding reads it in place.
#[wasm_bindgen]
pub struct JsImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsImage {
    /// Create a new JsImage from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `pixels` - Straight-alpha RGBA data (4 bytes per pixel, row-major order)
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsImage {
        JsImage {
            width,
            height,
            pixels,
        }
    }

    /// Copy the pixels out of a canvas `ImageData`.
    pub fn from_image_data(image_data: &web_sys::ImageData) -> JsImage {
        JsImage::new(image_data.width(), image_data.height(), image_data.data().0)
    }

    /// Copy the pixels out of a `Uint8ClampedArray` of RGBA data.
    pub fn from_rgba_array(width: u32, height: u32, pixels: &js_sys::Uint8ClampedArray) -> JsImage {
        JsImage::new(width, height, pixels.to_vec())
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }
}

impl PlatformImage for JsImage {
    fn raster(&self) -> Result<Raster<'_>, ImageConversionError> {
        Raster::packed(self.pixels.as_slice(), self.width, self.height, PixelFormat::Rgba8)
    }
}
