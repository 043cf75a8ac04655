//! Stateless format conversion for fragment data.
//!
//! The engine maps `(source bytes, source type, target extension)` to new
//! bytes plus the resulting content type. Real transforms exist for image
//! transcoding and Markdown→HTML. The textual "downgrade" conversions
//! (HTML/CSV/JSON → plain text) reuse the byte payload verbatim and only
//! retag the content type — no markup or structure stripping is performed.
//! Matrix pairs with no implemented transform (e.g. JSON→YAML) fall through
//! to the identity conversion with the original content type.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use pulldown_cmark::{html, Parser};

use crate::fragment::base_mime;
use crate::{FragmentError, FragmentResult};

/// Result of a conversion: the transformed bytes and their content type
#[derive(Debug, Clone)]
pub struct Converted {
    pub data: Bytes,
    pub content_type: String,
}

fn image_format_for_extension(ext: &str) -> Option<(ImageFormat, &'static str)> {
    match ext {
        ".png" => Some((ImageFormat::Png, "image/png")),
        ".jpg" | ".jpeg" => Some((ImageFormat::Jpeg, "image/jpeg")),
        ".webp" => Some((ImageFormat::WebP, "image/webp")),
        ".gif" => Some((ImageFormat::Gif, "image/gif")),
        ".avif" => Some((ImageFormat::Avif, "image/avif")),
        _ => None,
    }
}

fn transcode_image(data: &[u8], format: ImageFormat, target_mime: &str) -> FragmentResult<Converted> {
    // an undecodable payload is a hard error, not an identity fallback
    let decoded = image::load_from_memory(data).map_err(FragmentError::conversion)?;

    // JPEG carries no alpha channel
    let decoded = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        _ => decoded,
    };

    let mut out = Cursor::new(Vec::new());
    decoded
        .write_to(&mut out, format)
        .map_err(FragmentError::conversion)?;

    Ok(Converted {
        data: Bytes::from(out.into_inner()),
        content_type: target_mime.to_string(),
    })
}

fn render_markdown(data: &[u8]) -> Converted {
    let source = String::from_utf8_lossy(data);
    let mut rendered = String::new();
    html::push_html(&mut rendered, Parser::new(&source));
    Converted {
        data: Bytes::from(rendered.into_bytes()),
        content_type: "text/html".to_string(),
    }
}

/// Convert fragment data to the format named by an extension token.
///
/// `source_type` is the fragment's full declared content type; the identity
/// fallback returns it unchanged. Callers are expected to have checked
/// [`Fragment::can_convert_to`](crate::Fragment::can_convert_to) first —
/// this function does not consult the conversion matrix.
pub fn convert(data: Bytes, source_type: &str, ext: &str) -> FragmentResult<Converted> {
    let source_mime = base_mime(source_type).unwrap_or_default();

    if source_mime.starts_with("image/") {
        if let Some((format, target_mime)) = image_format_for_extension(ext) {
            return transcode_image(&data, format, target_mime);
        }
    }

    if source_mime == "text/markdown" && ext == ".html" {
        return Ok(render_markdown(&data));
    }

    // retag-only conversions toward plain text
    if ext == ".txt"
        && matches!(
            source_mime.as_str(),
            "text/markdown" | "text/html" | "text/csv" | "application/json"
        )
    {
        return Ok(Converted {
            data,
            content_type: "text/plain".to_string(),
        });
    }

    // identity: same bytes, original content type
    Ok(Converted {
        data,
        content_type: source_type.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn test_png() -> Bytes {
        let pixels = ImageBuffer::from_pixel(2, 2, Rgb([255u8, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(pixels)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    #[test]
    fn test_markdown_to_html() {
        let result = convert(Bytes::from_static(b"# Title"), "text/markdown", ".html").unwrap();
        assert_eq!(result.content_type, "text/html");
        let rendered = String::from_utf8(result.data.to_vec()).unwrap();
        assert!(rendered.contains("<h1>Title</h1>"), "got: {rendered}");
    }

    #[test]
    fn test_json_to_text_retags_only() {
        let body = Bytes::from_static(b"{\"a\":1}");
        let result = convert(body.clone(), "application/json", ".txt").unwrap();
        assert_eq!(result.content_type, "text/plain");
        assert_eq!(result.data, body);
    }

    #[test]
    fn test_identity_keeps_original_type() {
        // JSON→YAML is admitted by the matrix but has no transform
        let body = Bytes::from_static(b"{\"a\":1}");
        let result = convert(body.clone(), "application/json", ".yaml").unwrap();
        assert_eq!(result.content_type, "application/json");
        assert_eq!(result.data, body);
    }

    #[test]
    fn test_identity_preserves_type_parameters() {
        let body = Bytes::from_static(b"hello");
        let result = convert(body, "text/plain; charset=utf-8", ".txt").unwrap();
        assert_eq!(result.content_type, "text/plain; charset=utf-8");
    }

    #[test]
    fn test_png_to_jpeg() {
        let result = convert(test_png(), "image/png", ".jpg").unwrap();
        assert_eq!(result.content_type, "image/jpeg");
        assert_eq!(
            image::guess_format(&result.data).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_jpeg_back_to_png() {
        let jpeg = convert(test_png(), "image/png", ".jpeg").unwrap();
        let png = convert(jpeg.data, "image/jpeg", ".png").unwrap();
        assert_eq!(png.content_type, "image/png");
        assert_eq!(image::guess_format(&png.data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_corrupt_image_is_a_hard_error() {
        let result = convert(Bytes::from_static(b"not an image"), "image/png", ".jpg");
        assert!(matches!(result, Err(FragmentError::Conversion { .. })));
    }
}
