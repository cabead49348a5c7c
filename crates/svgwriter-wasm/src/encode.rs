//! SVG encoding WASM bindings.
//!
//! This module exposes the svgwriter-core pipeline to JavaScript. Every
//! function returns the SVG document as UTF-8 bytes or rejects with the
//! pipeline's error message.
//!
//! # Functions
//!
//! - [`encode_png_svg`] - SVG with an embedded quantized PNG
//! - [`encode_jpeg_svg`] - SVG with an embedded JPEG
//! - [`encode_svg`] - SVG with caller-supplied options
//! - [`encode_image_data_svg`] - Same as `encode_svg`, straight from `ImageData`
//!
//! # Example
//!
//! ```typescript
//! import { JsImage, encode_png_svg, encode_svg } from '@svgwriter/wasm';
//!
//! const image = JsImage.from_image_data(ctx.getImageData(0, 0, w, h));
//! const svg = encode_png_svg(image);
//! const small = encode_svg(image, { format: 'jpeg', quality: 0.6 });
//! ```

use crate::types::JsImage;
use serde::{Deserialize, Serialize};
use svgwriter_core::{EncodeOptions, PayloadFormat, SvgWriterError};
use wasm_bindgen::prelude::*;

/// JavaScript-compatible encode options.
///
/// Every field is optional; missing fields fall back to the pipeline
/// defaults. Passed from TypeScript as a plain object via serde_wasm_bindgen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsEncodeOptions {
    /// "png" or "jpeg". Omit to choose from the image's transparency.
    #[serde(default)]
    pub format: Option<PayloadFormat>,
    /// PNG quantization speed (1 to 10)
    #[serde(default)]
    pub speed: Option<u8>,
    /// PNG palette size limit (2 to 256)
    #[serde(default)]
    pub max_colors: Option<u16>,
    /// JPEG quality (0.0 to 1.0)
    #[serde(default)]
    pub quality: Option<f32>,
    /// JPEG progressive scan order
    #[serde(default)]
    pub progressive: Option<bool>,
    /// Encode premultiplied color in JPEG payloads
    #[serde(default)]
    pub premultiply: Option<bool>,
}

impl From<JsEncodeOptions> for EncodeOptions {
    fn from(js: JsEncodeOptions) -> Self {
        let mut options = EncodeOptions {
            format: js.format,
            ..Default::default()
        };
        if let Some(speed) = js.speed {
            options.png.speed = speed;
        }
        if let Some(max_colors) = js.max_colors {
            options.png.max_colors = max_colors;
        }
        if let Some(quality) = js.quality {
            options.jpeg.quality = quality;
        }
        if let Some(progressive) = js.progressive {
            options.jpeg.progressive = progressive;
        }
        if let Some(premultiply) = js.premultiply {
            options.jpeg.premultiply = premultiply;
        }
        options
    }
}

fn to_js_error(err: SvgWriterError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_options(options: JsValue) -> Result<EncodeOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(EncodeOptions::default());
    }
    let js: JsEncodeOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid encode options: {}", e)))?;
    Ok(js.into())
}

/// Encode an image as an SVG embedding a quantized PNG.
///
/// # Returns
///
/// A `Uint8Array` containing the UTF-8 SVG document, or an error if any
/// pipeline stage fails.
#[wasm_bindgen]
pub fn encode_png_svg(image: &JsImage) -> Result<Vec<u8>, JsValue> {
    svgwriter_core::encode_as_png(image).map_err(to_js_error)
}

/// Encode an image as an SVG embedding a JPEG (quality 0.8).
#[wasm_bindgen]
pub fn encode_jpeg_svg(image: &JsImage) -> Result<Vec<u8>, JsValue> {
    svgwriter_core::encode_as_jpeg(image).map_err(to_js_error)
}

/// Encode an image as an SVG with the given options object.
///
/// Pass `undefined` for the defaults with automatic format selection.
///
/// # Errors
///
/// Returns an error if the options object is malformed or any pipeline
/// stage fails.
#[wasm_bindgen]
pub fn encode_svg(image: &JsImage, options: JsValue) -> Result<Vec<u8>, JsValue> {
    let options = parse_options(options)?;
    svgwriter_core::encode_with_options(image, &options).map_err(to_js_error)
}

/// Encode canvas `ImageData` as an SVG with the given options object.
#[wasm_bindgen]
pub fn encode_image_data_svg(
    image_data: &web_sys::ImageData,
    options: JsValue,
) -> Result<Vec<u8>, JsValue> {
    encode_svg(&JsImage::from_image_data(image_data), options)
}

/// Tests for encode bindings.
///
/// Note: Functions returning `Result<T, JsValue>` only work on wasm32
/// targets. Host tests cover the option mapping and the core calls the
/// bindings forward to.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_pipeline() {
        let options: EncodeOptions = JsEncodeOptions::default().into();
        assert_eq!(options, EncodeOptions::default());
    }

    #[test]
    fn test_options_override_fields() {
        let js = JsEncodeOptions {
            format: Some(PayloadFormat::Jpeg),
            quality: Some(0.5),
            max_colors: Some(16),
            ..Default::default()
        };
        let options: EncodeOptions = js.into();
        assert_eq!(options.format, Some(PayloadFormat::Jpeg));
        assert_eq!(options.jpeg.quality, 0.5);
        assert!(options.jpeg.premultiply);
        assert_eq!(options.png.max_colors, 16);
        assert_eq!(options.png.speed, 9);
    }

    #[test]
    fn test_js_image_encodes_through_core() {
        let img = JsImage::new(3, 3, vec![255u8; 3 * 3 * 4]);
        let svg = svgwriter_core::encode_as_png(&img).unwrap();
        let text = String::from_utf8(svg).unwrap();
        assert!(text.contains("width=\"3\" height=\"3\""));
    }
}
