//! SVG document writer.
//!
//! Wraps an encoded PNG or JPEG payload in a minimal SVG document: a root
//! `<svg>` element sized to the payload and one `<image>` element whose
//! `xlink:href` is a base64 data URI.
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <svg xmlns="http://www.w3.org/2000/svg" ... width="2" height="2" viewBox="0 0 2 2">
//!   <image x="0" y="0" width="2" height="2" xlink:href="data:image/png;base64,..."/>
//! </svg>
//! ```

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::ImageReader;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::encode::PayloadFormat;
use crate::error::SvgWriteError;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Wrap `payload` in an SVG document sized to the payload's pixel dimensions.
///
/// # Errors
///
/// Returns `SvgWriteError::EmptyPayload` for an empty payload and
/// `SvgWriteError::MalformedPayload` if the payload header cannot be read as
/// `format`.
pub fn wrap_as_svg(payload: &[u8], format: PayloadFormat) -> Result<Vec<u8>, SvgWriteError> {
    if payload.is_empty() {
        return Err(SvgWriteError::EmptyPayload);
    }

    let (width, height) = payload_dimensions(payload, format)?;
    let href = data_uri(payload, format);
    let width = width.to_string();
    let height = height.to_string();
    let view_box = format!("0 0 {} {}", width, height);

    let mut writer = Writer::new(Vec::with_capacity(href.len() + 256));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let mut svg = BytesStart::new("svg");
    svg.push_attribute(("xmlns", SVG_NAMESPACE));
    svg.push_attribute(("xmlns:xlink", XLINK_NAMESPACE));
    svg.push_attribute(("width", width.as_str()));
    svg.push_attribute(("height", height.as_str()));
    svg.push_attribute(("viewBox", view_box.as_str()));
    writer.write_event(Event::Start(svg)).map_err(xml_error)?;

    let mut image = BytesStart::new("image");
    image.push_attribute(("x", "0"));
    image.push_attribute(("y", "0"));
    image.push_attribute(("width", width.as_str()));
    image.push_attribute(("height", height.as_str()));
    image.push_attribute(("xlink:href", href.as_str()));
    writer.write_event(Event::Empty(image)).map_err(xml_error)?;

    writer
        .write_event(Event::End(BytesEnd::new("svg")))
        .map_err(xml_error)?;

    let document = writer.into_inner();
    log::trace!(
        "Wrote {}x{} SVG document ({} bytes) around {} byte {} payload",
        width,
        height,
        document.len(),
        payload.len(),
        format.mime_type()
    );

    Ok(document)
}

/// `data:<mime>;base64,<payload>` for the given payload.
pub fn data_uri(payload: &[u8], format: PayloadFormat) -> String {
    format!(
        "data:{};base64,{}",
        format.mime_type(),
        general_purpose::STANDARD.encode(payload)
    )
}

/// Read width and height from the payload header without decoding pixels.
fn payload_dimensions(payload: &[u8], format: PayloadFormat) -> Result<(u32, u32), SvgWriteError> {
    ImageReader::with_format(Cursor::new(payload), format.image_format())
        .into_dimensions()
        .map_err(|e| SvgWriteError::MalformedPayload(e.to_string()))
}

fn xml_error(err: impl std::fmt::Display) -> SvgWriteError {
    SvgWriteError::Xml(err.to_string())
}

/// An external writer embedding a payload into a document.
pub trait DocumentWriter {
    fn write_document(&self, payload: &[u8], format: PayloadFormat)
        -> Result<Vec<u8>, SvgWriteError>;
}

impl<W: DocumentWriter + ?Sized> DocumentWriter for &W {
    fn write_document(
        &self,
        payload: &[u8],
        format: PayloadFormat,
    ) -> Result<Vec<u8>, SvgWriteError> {
        (**self).write_document(payload, format)
    }
}

/// [`DocumentWriter`] backed by [`wrap_as_svg`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgDocumentWriter;

impl DocumentWriter for SvgDocumentWriter {
    fn write_document(
        &self,
        payload: &[u8],
        format: PayloadFormat,
    ) -> Result<Vec<u8>, SvgWriteError> {
        wrap_as_svg(payload, format)
    }
}
