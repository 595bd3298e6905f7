//! In-memory image payloads and data-URL plumbing.
//!
//! The synthesis provider consumes and produces base64-encoded images, so the
//! whole pipeline moves images around as data URLs. This module owns the
//! encode/decode logic and the magic-byte sniffing used to reject non-image
//! uploads before any network call is made.

use crate::error::{FitroomError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Raw image bytes together with their detected MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    /// Wraps bytes whose image type is sniffed from magic numbers.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedMedia` if the bytes are not a recognized image
    /// format. `hint` is used in the error message (a filename or MIME type
    /// supplied by the caller) so the user sees what was rejected.
    pub fn from_bytes(bytes: Vec<u8>, hint: &str) -> Result<Self> {
        match sniff_image_mime(&bytes) {
            Some(mime) => Ok(Self {
                mime: mime.to_string(),
                bytes,
            }),
            None => Err(FitroomError::unsupported_media(hint)),
        }
    }

    /// Encodes this image as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    /// Decodes a `data:` URL back into image bytes.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedMedia` when the URL is not a `data:` URL or does
    /// not carry an image MIME type, and a base64 `Serialization` error when
    /// the payload is malformed.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| FitroomError::unsupported_media(url.chars().take(32).collect::<String>()))?;
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| FitroomError::unsupported_media(rest.chars().take(32).collect::<String>()))?;
        if !mime.starts_with("image/") {
            return Err(FitroomError::unsupported_media(mime));
        }
        let bytes = BASE64.decode(payload)?;
        Ok(Self {
            mime: mime.to_string(),
            bytes,
        })
    }
}

/// Sniffs an image MIME type from leading magic bytes.
///
/// Covers the formats the upload screen accepts: PNG, JPEG, WebP, GIF,
/// AVIF and HEIC/HEIF. Returns `None` for everything else.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    // ISO-BMFF containers carry an `ftyp` box at offset 4 whose brand
    // distinguishes AVIF from HEIC/HEIF.
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return match &bytes[8..12] {
            b"avif" | b"avis" => Some("image/avif"),
            b"heic" | b"heix" | b"mif1" | b"msf1" => Some("image/heic"),
            _ => None,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(sniff_image_mime(PNG_HEADER), Some("image/png"));
        assert_eq!(sniff_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_image_mime(b"GIF89a trailing"), Some("image/gif"));
        assert_eq!(
            sniff_image_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            Some("image/webp")
        );
        assert_eq!(
            sniff_image_mime(b"\x00\x00\x00\x20ftypavif....."),
            Some("image/avif")
        );
    }

    #[test]
    fn test_sniff_rejects_non_images() {
        assert_eq!(sniff_image_mime(b"%PDF-1.7"), None);
        assert_eq!(sniff_image_mime(b"hello world"), None);
        assert_eq!(sniff_image_mime(&[]), None);
    }

    #[test]
    fn test_from_bytes_rejects_text() {
        let err = ImageData::from_bytes(b"not an image".to_vec(), "notes.txt").unwrap_err();
        assert!(err.is_unsupported_media());
    }

    #[test]
    fn test_data_url_round_trip() {
        let image = ImageData::from_bytes(PNG_HEADER.to_vec(), "photo.png").unwrap();
        let url = image.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        let decoded = ImageData::from_data_url(&url).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_from_data_url_rejects_plain_urls() {
        let err = ImageData::from_data_url("https://example.com/shirt.png").unwrap_err();
        assert!(err.is_unsupported_media());
    }

    #[test]
    fn test_from_data_url_rejects_non_image_mime() {
        let err = ImageData::from_data_url("data:text/plain;base64,aGVsbG8=").unwrap_err();
        assert!(err.is_unsupported_media());
    }
}
