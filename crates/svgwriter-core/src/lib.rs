//! SvgWriter Core - Raster to SVG encoding library
//!
//! This crate turns an in-memory raster image into an SVG document that
//! embeds a compressed copy of the pixels, either as a quantized palette PNG
//! (keeps transparency) or as a JPEG (smaller, opaque).
//!
//! The pipeline has three stages:
//! - Canonicalization into an 8-bit RGBA premultiplied bitmap
//! - Compression of that bitmap by a [`Compressor`]
//! - Wrapping of the payload by a [`DocumentWriter`]

pub mod bitmap;
mod canonicalize;
mod canvas;
pub mod encode;
pub mod error;
pub mod pipeline;
pub mod svg;

pub use bitmap::{
    AlphaMode, CanonicalBitmap, ColorSpace, PixelBuffer, PixelFormat, PlatformImage, Raster,
};
pub use canonicalize::canonicalize;
pub use encode::{Compressor, JpegCompressor, JpegOptions, PayloadFormat, PngOptions, PngQuantCompressor};
pub use error::{CompressionError, ImageConversionError, SvgWriteError, SvgWriterError};
pub use pipeline::{
    encode_as_jpeg, encode_as_png, encode_as_svg, encode_with_options, EncodeOptions, SvgEncoder,
};
pub use svg::{wrap_as_svg, DocumentWriter, SvgDocumentWriter};
