use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";
pub const GIF_MIME: &str = "image/gif";
pub const WEBP_MIME: &str = "image/webp";
pub const BMP_MIME: &str = "image/bmp";
pub const TIFF_MIME: &str = "image/tiff";

/// Sniffs an image mime type from magic bytes. Non-image content returns None.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    let kind = infer::get(bytes)?;
    let detected = kind.mime_type();
    if detected.starts_with("image/") {
        return Some(detected);
    }
    None
}

pub fn image_format_from_mime(mime: &str) -> Option<image::ImageFormat> {
    match mime {
        "image/png" => Some(image::ImageFormat::Png),
        "image/jpeg" | "image/jpg" => Some(image::ImageFormat::Jpeg),
        "image/gif" => Some(image::ImageFormat::Gif),
        "image/webp" => Some(image::ImageFormat::WebP),
        "image/bmp" => Some(image::ImageFormat::Bmp),
        "image/tiff" => Some(image::ImageFormat::Tiff),
        _ => None,
    }
}

pub fn extension_from_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        "image/tiff" => Some("tiff"),
        _ => None,
    }
}

fn mime_from_format_name(name: &str) -> Option<&'static str> {
    match name {
        "png" | "image/png" => Some(PNG_MIME),
        "jpg" | "jpeg" | "image/jpeg" | "image/jpg" => Some(JPEG_MIME),
        "gif" | "image/gif" => Some(GIF_MIME),
        "webp" | "image/webp" => Some(WEBP_MIME),
        "bmp" | "image/bmp" => Some(BMP_MIME),
        "tiff" | "tif" | "image/tiff" => Some(TIFF_MIME),
        _ => None,
    }
}

/// Resolves the output mime for a requested format name.
///
/// "auto" preserves the source format: the declared source mime when it is a
/// supported image type, otherwise a magic-byte sniff of the source bytes,
/// otherwise `default_mime`. Unsupported explicit names also degrade to
/// `default_mime` rather than fail.
pub fn resolve_output_mime(
    requested: &str,
    source_mime: Option<&str>,
    source_bytes: &[u8],
    default_mime: &str,
) -> String {
    let requested = requested.trim().to_lowercase();
    if requested.is_empty() || requested == "auto" {
        if let Some(mime) = source_mime.filter(|mime| image_format_from_mime(mime).is_some()) {
            return mime.to_string();
        }
        if let Some(mime) = sniff_mime(source_bytes) {
            if image_format_from_mime(mime).is_some() {
                return mime.to_string();
            }
        }
        return default_mime.to_string();
    }
    mime_from_format_name(&requested)
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| default_mime.to_string())
}

/// Decodes an image payload given as a data URI or raw base64 string.
///
/// Returns the raw bytes and, for data URIs, the declared mime type.
pub fn decode_base64_image(payload: &str) -> Result<(Vec<u8>, Option<String>)> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("image payload is empty"));
    }
    let (mime, encoded) = match trimmed.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest
                .split_once(',')
                .ok_or_else(|| anyhow!("malformed data URI: missing comma"))?;
            let mime = header
                .split(';')
                .next()
                .filter(|value| !value.is_empty())
                .map(|value| value.to_lowercase());
            (mime, body)
        }
        None => (None, trimmed),
    };
    let cleaned: String = encoded.chars().filter(|ch| !ch.is_whitespace()).collect();
    let bytes = BASE64
        .decode(cleaned.as_bytes())
        .with_context(|| "failed to decode base64 image data")?;
    Ok((bytes, mime))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal magic-byte prefixes, enough for `infer`.
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];

    #[test]
    fn sniffs_common_image_types() {
        assert_eq!(sniff_mime(PNG_MAGIC), Some(PNG_MIME));
        assert_eq!(sniff_mime(JPEG_MAGIC), Some(JPEG_MIME));
        assert_eq!(sniff_mime(b"not an image"), None);
    }

    #[test]
    fn auto_preserves_the_source_format() {
        let mime = resolve_output_mime("auto", Some(JPEG_MIME), &[], PNG_MIME);
        assert_eq!(mime, JPEG_MIME);
    }

    #[test]
    fn auto_falls_back_to_sniffing_then_default() {
        assert_eq!(
            resolve_output_mime("auto", None, JPEG_MAGIC, PNG_MIME),
            JPEG_MIME
        );
        assert_eq!(
            resolve_output_mime("auto", None, b"garbage", PNG_MIME),
            PNG_MIME
        );
    }

    #[test]
    fn unsupported_formats_degrade_to_the_default() {
        assert_eq!(resolve_output_mime("heic", None, &[], PNG_MIME), PNG_MIME);
        assert_eq!(resolve_output_mime("pdf", None, &[], PNG_MIME), PNG_MIME);
    }

    #[test]
    fn explicit_format_names_are_coerced() {
        assert_eq!(resolve_output_mime("JPEG", None, &[], PNG_MIME), JPEG_MIME);
        assert_eq!(
            resolve_output_mime("image/webp", None, &[], PNG_MIME),
            WEBP_MIME
        );
    }

    #[test]
    fn decodes_raw_base64() {
        let encoded = BASE64.encode(b"hello");
        let (bytes, mime) = decode_base64_image(&encoded).unwrap();
        assert_eq!(bytes, b"hello");
        assert_eq!(mime, None);
    }

    #[test]
    fn decodes_data_uris_with_mime() {
        let payload = format!("data:image/png;base64,{}", BASE64.encode(b"hello"));
        let (bytes, mime) = decode_base64_image(&payload).unwrap();
        assert_eq!(bytes, b"hello");
        assert_eq!(mime.as_deref(), Some("image/png"));
    }

    #[test]
    fn rejects_empty_and_malformed_payloads() {
        assert!(decode_base64_image("").is_err());
        assert!(decode_base64_image("data:image/png;base64").is_err());
        assert!(decode_base64_image("!!not base64!!").is_err());
    }
}
