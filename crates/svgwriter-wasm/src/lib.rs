//! SvgWriter WASM - WebAssembly bindings for SvgWriter
//!
//! This crate provides WASM bindings to expose the svgwriter-core pipeline
//! to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `encode` - SVG encoding bindings (PNG, JPEG, options)
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsImage, encode_png_svg } from '@svgwriter/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const image = JsImage.from_image_data(ctx.getImageData(0, 0, w, h));
//! const svg = new Blob([encode_png_svg(image)], { type: 'image/svg+xml' });
//! ```

use wasm_bindgen::prelude::*;

mod encode;
mod types;

// Re-export public types
pub use encode::{
    encode_image_data_svg, encode_jpeg_svg, encode_png_svg, encode_svg, JsEncodeOptions,
};
pub use types::JsImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
