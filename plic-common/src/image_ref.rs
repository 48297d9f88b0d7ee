//! Image references submitted for analysis
//!
//! An image reaches the provider either inline, as a base64 `data:` URL, or
//! as a remote URL the provider fetches itself. Both forms keep the caller's
//! original text so it can be forwarded byte-for-byte.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Prefix every inline image payload must carry
pub const INLINE_IMAGE_MARKER: &str = "data:image";

/// Raster formats recognized in inline payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Png,
    Jpeg,
    Webp,
    Gif,
}

impl MediaType {
    /// Parse a MIME type such as `image/png`.
    ///
    /// `image/jpg` is accepted as an alias for `image/jpeg` since browsers
    /// still report it for some files.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(MediaType::Png),
            "image/jpeg" | "image/jpg" => Some(MediaType::Jpeg),
            "image/webp" => Some(MediaType::Webp),
            "image/gif" => Some(MediaType::Gif),
            _ => None,
        }
    }

    /// Detect the format from the leading magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        infer::get(bytes).and_then(|kind| Self::from_mime(kind.mime_type()))
    }

    /// Canonical MIME type
    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Webp => "image/webp",
            MediaType::Gif => "image/gif",
        }
    }
}

/// Image reference: inline encoded bytes or a remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// Base64 `data:` URL carrying the image bytes
    Inline {
        media_type: MediaType,
        data_url: String,
    },
    /// Absolute URL of an image hosted elsewhere
    Remote { url: String },
}

impl ImageReference {
    /// Validate an inline `data:image/<type>;base64,<payload>` string.
    ///
    /// The payload must decode as standard base64, the declared type must
    /// be one of [`MediaType`], and the decoded bytes must carry that type's
    /// magic bytes.
    pub fn parse_inline(data: &str) -> Result<Self> {
        if !data.starts_with(INLINE_IMAGE_MARKER) {
            return Err(Error::InvalidInput(
                "Image data must be a data URL starting with data:image/".to_string(),
            ));
        }

        let (header, payload) = data["data:".len()..].split_once(',').ok_or_else(|| {
            Error::InvalidInput("Image data URL has no payload".to_string())
        })?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default();
        if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
            return Err(Error::InvalidInput(
                "Image data URL must be base64 encoded".to_string(),
            ));
        }

        let media_type = MediaType::from_mime(mime).ok_or_else(|| {
            Error::InvalidInput(format!("Unsupported image type: {}", mime))
        })?;

        if payload.is_empty() {
            return Err(Error::InvalidInput("Image data is empty".to_string()));
        }
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| Error::InvalidInput(format!("Image data is not valid base64: {}", e)))?;

        if MediaType::sniff(&bytes) != Some(media_type) {
            return Err(Error::InvalidInput(format!(
                "Image content does not match declared type {}",
                media_type.mime()
            )));
        }

        Ok(ImageReference::Inline {
            media_type,
            data_url: data.to_string(),
        })
    }

    /// Validate a remote image URL.
    ///
    /// The URL must be absolute and name a host; the original string is kept
    /// untouched rather than the parser's normalized form.
    pub fn parse_remote(data: &str) -> Result<Self> {
        let parsed = Url::parse(data)
            .map_err(|e| Error::InvalidInput(format!("Invalid image URL: {}", e)))?;
        if !parsed.has_host() {
            return Err(Error::InvalidInput(
                "Invalid image URL: no host".to_string(),
            ));
        }

        Ok(ImageReference::Remote {
            url: data.to_string(),
        })
    }

    /// Encode raw image bytes as an inline reference
    pub fn from_bytes(media_type: MediaType, bytes: &[u8]) -> Self {
        let data_url = format!("data:{};base64,{}", media_type.mime(), STANDARD.encode(bytes));
        ImageReference::Inline {
            media_type,
            data_url,
        }
    }

    /// String placed in the provider's `image_url` content part
    pub fn as_provider_url(&self) -> &str {
        match self {
            ImageReference::Inline { data_url, .. } => data_url,
            ImageReference::Remote { url } => url,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageReference::Inline { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    #[test]
    fn test_parse_inline_png() {
        let data = format!("data:image/png;base64,{}", PNG_1X1);
        let image = ImageReference::parse_inline(&data).unwrap();

        match &image {
            ImageReference::Inline { media_type, data_url } => {
                assert_eq!(*media_type, MediaType::Png);
                assert_eq!(data_url, &data);
            }
            other => panic!("expected inline, got {:?}", other),
        }
        assert_eq!(image.as_provider_url(), data);
    }

    #[test]
    fn test_parse_inline_rejects_missing_marker() {
        let err = ImageReference::parse_inline(PNG_1X1).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_parse_inline_rejects_bad_base64() {
        let err = ImageReference::parse_inline("data:image/png;base64,@@not-base64@@").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn test_parse_inline_rejects_unknown_type() {
        let data = format!("data:image/tiff;base64,{}", PNG_1X1);
        let err = ImageReference::parse_inline(&data).unwrap_err();
        assert!(err.to_string().contains("image/tiff"));
    }

    #[test]
    fn test_parse_inline_rejects_non_image_bytes() {
        // "hello world"
        let err = ImageReference::parse_inline("data:image/png;base64,aGVsbG8gd29ybGQ=").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("image/png"));
    }

    #[test]
    fn test_parse_inline_rejects_mislabelled_image() {
        let data = format!("data:image/jpeg;base64,{}", PNG_1X1);
        let err = ImageReference::parse_inline(&data).unwrap_err();
        assert!(err.to_string().contains("image/jpeg"));
    }

    #[test]
    fn test_sniff() {
        assert_eq!(MediaType::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(MediaType::Jpeg));
        assert_eq!(MediaType::sniff(b"GIF89a"), Some(MediaType::Gif));
        assert_eq!(MediaType::sniff(b"hello world"), None);
    }

    #[test]
    fn test_parse_inline_requires_base64_param() {
        let err = ImageReference::parse_inline("data:image/png,rawbytes").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn test_parse_remote_keeps_original_text() {
        // Url would normalize the host to lowercase; the reference must not
        let url = "https://Images.Example.com/a%20b.png?x=1&y=2";
        let image = ImageReference::parse_remote(url).unwrap();
        assert_eq!(image.as_provider_url(), url);
        assert!(!image.is_inline());
    }

    #[test]
    fn test_parse_remote_rejects_relative_and_hostless() {
        assert!(ImageReference::parse_remote("/images/banner.png").is_err());
        assert!(ImageReference::parse_remote("not a url").is_err());
        assert!(ImageReference::parse_remote("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_from_bytes_round_trips_through_parse() {
        let image = ImageReference::from_bytes(MediaType::Jpeg, &[0xFF, 0xD8, 0xFF, 0xE0]);
        assert!(image.as_provider_url().starts_with("data:image/jpeg;base64,"));
        assert_eq!(ImageReference::parse_inline(image.as_provider_url()).unwrap(), image);
    }

    #[test]
    fn test_media_type_jpg_alias() {
        assert_eq!(MediaType::from_mime("image/jpg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_mime("IMAGE/PNG"), Some(MediaType::Png));
        assert_eq!(MediaType::from_mime("image/bmp"), None);
    }
}
