//! Image format detection for uploaded bytes.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Image formats accepted by the image stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG / JFIF
    Jpeg,
    /// GIF87a / GIF89a
    Gif,
    /// RIFF WebP
    WebP,
    /// SVG (XML text)
    Svg,
}

impl ImageFormat {
    /// File extension used for stored objects, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            ImageFormat::Svg => "svg",
        }
    }

    /// MIME type served for the format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Format for a file extension (case-insensitive, `jpeg` accepted).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff";
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_MAGIC: &[u8] = b"WEBP";
const HEADER_LEN: usize = 256;

/// Detect the image format of a file.
///
/// # Example
/// ```no_run
/// use folio::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("cover.png").unwrap();
/// println!("{} ({})", format, format.extension());
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<ImageFormat> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    File::open(path)?
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the image format from the leading bytes of a file.
///
/// # Returns
/// * `Ok(ImageFormat)` if the data starts with a known signature
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<ImageFormat> {
    if data.starts_with(PNG_MAGIC) {
        return Ok(ImageFormat::Png);
    }
    if data.starts_with(JPEG_MAGIC) {
        return Ok(ImageFormat::Jpeg);
    }
    if data.starts_with(GIF87_MAGIC) || data.starts_with(GIF89_MAGIC) {
        return Ok(ImageFormat::Gif);
    }
    if data.len() >= 12 && data.starts_with(RIFF_MAGIC) && &data[8..12] == WEBP_MAGIC {
        return Ok(ImageFormat::WebP);
    }
    if looks_like_svg(data) {
        return Ok(ImageFormat::Svg);
    }
    Err(Error::UnknownFormat)
}

/// SVG has no magic number: accept text whose first element is `<svg`,
/// optionally after an XML declaration, doctype or comments.
fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(HEADER_LEN)];
    let Ok(text) = std::str::from_utf8(head).or_else(|e| {
        std::str::from_utf8(&head[..e.valid_up_to()])
    }) else {
        return false;
    };
    let mut rest = text.trim_start_matches('\u{feff}').trim_start();
    loop {
        if rest.starts_with("<svg") {
            return true;
        }
        let skip_to = if rest.starts_with("<?") {
            rest.find("?>").map(|i| i + 2)
        } else if rest.starts_with("<!--") {
            rest.find("-->").map(|i| i + 3)
        } else if rest.starts_with("<!") {
            rest.find('>').map(|i| i + 1)
        } else {
            None
        };
        match skip_to {
            Some(i) => rest = rest[i..].trim_start(),
            None => return false,
        }
    }
}

/// Check if bytes are a supported image.
pub fn is_image_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Resolve the format of an upload: sniffed from the bytes, falling back
/// to the extension of the suggested file name.
pub fn resolve_upload_format(data: &[u8], suggested_name: &str) -> Result<ImageFormat> {
    detect_format_from_bytes(data).or_else(|err| {
        Path::new(suggested_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .ok_or(err)
    })
}
