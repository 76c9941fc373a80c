//! Turning a live frame into a shareable image reference.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Default JPEG quality, on the encoder's 1-100 scale.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// A reference to an image: either an inline `data:` URL or a plain URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap an existing URL.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Inline JPEG bytes as a `data:image/jpeg;base64,` URL.
    #[must_use]
    pub fn from_jpeg(bytes: &[u8]) -> Self {
        Self(format!("{JPEG_DATA_URL_PREFIX}{}", STANDARD.encode(bytes)))
    }

    /// The reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this reference carries inline JPEG data.
    #[must_use]
    pub fn is_inline_jpeg(&self) -> bool {
        self.0.starts_with(JPEG_DATA_URL_PREFIX)
    }

    /// Recover the JPEG bytes of an inline reference.
    ///
    /// Returns `None` for plain URLs or malformed payloads.
    #[must_use]
    pub fn jpeg_bytes(&self) -> Option<Vec<u8>> {
        let payload = self.0.strip_prefix(JPEG_DATA_URL_PREFIX)?;
        STANDARD.decode(payload).ok()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inline_jpeg() {
            write!(f, "<inline jpeg, {} chars>", self.0.len())
        } else {
            f.write_str(&self.0)
        }
    }
}

/// How a frame is encoded into a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotEncoding {
    /// Flip horizontally so the still matches the mirrored preview.
    pub mirror: bool,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for SnapshotEncoding {
    fn default() -> Self {
        Self {
            mirror: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Encode a frame as JPEG and wrap it in an [`ImageRef`].
///
/// # Errors
///
/// Returns an error if the JPEG encoder rejects the frame.
pub fn encode_snapshot(frame: &RgbImage, encoding: SnapshotEncoding) -> Result<ImageRef> {
    let mut bytes = Vec::new();
    let quality = encoding.jpeg_quality.clamp(1, 100);
    if encoding.mirror {
        let mirrored = imageops::flip_horizontal(frame);
        JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(&mirrored)?;
    } else {
        JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(frame)?;
    }
    Ok(ImageRef::from_jpeg(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Left half red, right half blue.
    fn split_frame() -> RgbImage {
        RgbImage::from_fn(32, 16, |x, _| {
            if x < 16 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        })
    }

    fn decode(image: &ImageRef) -> RgbImage {
        let bytes = image.jpeg_bytes().unwrap();
        image::load_from_memory(&bytes).unwrap().to_rgb8()
    }

    #[test]
    fn test_from_jpeg_roundtrips_bytes() {
        let image = ImageRef::from_jpeg(&[0xFF, 0xD8, 0xFF]);
        assert!(image.as_str().starts_with("data:image/jpeg;base64,"));
        assert!(image.is_inline_jpeg());
        assert_eq!(image.jpeg_bytes().unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_plain_url_has_no_bytes() {
        let image = ImageRef::from_url("https://picsum.photos/id/237/200/200");
        assert!(!image.is_inline_jpeg());
        assert!(image.jpeg_bytes().is_none());
        assert_eq!(image.to_string(), "https://picsum.photos/id/237/200/200");
    }

    #[test]
    fn test_display_elides_inline_payload() {
        let image = ImageRef::from_jpeg(&[1, 2, 3]);
        assert!(image.to_string().starts_with("<inline jpeg"));
    }

    #[test]
    fn test_encode_mirrors_frame() {
        let encoded = encode_snapshot(&split_frame(), SnapshotEncoding::default()).unwrap();
        let decoded = decode(&encoded);
        assert_eq!(decoded.dimensions(), (32, 16));

        let left = decoded.get_pixel(4, 8);
        let right = decoded.get_pixel(28, 8);
        assert!(left[2] > left[0], "left side should be blue after mirroring");
        assert!(right[0] > right[2], "right side should be red after mirroring");
    }

    #[test]
    fn test_encode_without_mirror_keeps_orientation() {
        let encoding = SnapshotEncoding {
            mirror: false,
            ..SnapshotEncoding::default()
        };
        let decoded = decode(&encode_snapshot(&split_frame(), encoding).unwrap());

        let left = decoded.get_pixel(4, 8);
        assert!(left[0] > left[2]);
    }

    #[test]
    fn test_serialize_is_plain_string() {
        let image = ImageRef::from_url("x");
        assert_eq!(serde_json::to_string(&image).unwrap(), r#""x""#);
    }
}
