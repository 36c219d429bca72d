//! Image classification by byte signature, with pixel size and resolution.
//!
//! The format of an embedded image is decided from its leading bytes, never
//! from its filename or declared content type. The [`ImageRegistry`] holds
//! the recognizers in a fixed order; the first match picks the parser that
//! reads the format's header into an [`Image`] descriptor.
//!
//! # Example
//!
//! ```no_run
//! use docx_oxml::image::Image;
//!
//! let image = Image::from_file("figure.png")?;
//! println!("{}x{} px at {} dpi", image.px_width(), image.px_height(), image.horz_dpi());
//! # Ok::<(), docx_oxml::Error>(())
//! ```

mod bmp;
mod gif;
mod jpeg;
pub mod length;
mod png;
mod registry;
pub mod stream;
mod tiff;

use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::Result;

pub use length::Emu;
pub use registry::{ImageRegistry, Recognizer, HEADER_LEN};
pub use stream::{ByteOrder, StreamReader};

/// Resolution assumed when a format records none.
pub const DEFAULT_DPI: u32 = 72;

/// Attribute key for horizontal resolution in dots per inch.
pub const HORZ_DPI: &str = "horz_dpi";
/// Attribute key for vertical resolution in dots per inch.
pub const VERT_DPI: &str = "vert_dpi";

/// Recognized image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Tiff,
    Bmp,
}

impl ImageFormat {
    /// MIME type used for the image part.
    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Default filename extension, without the dot.
    pub fn default_ext(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Bmp => "bmp",
        }
    }
}

/// Format-specific header values, keyed by name.
///
/// `horz_dpi` and `vert_dpi` are always readable through the accessors,
/// which fall back to [`DEFAULT_DPI`] when the value is absent or zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ImageAttributes(BTreeMap<&'static str, u32>);

impl ImageAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.0.get(key).copied()
    }

    pub fn insert(&mut self, key: &'static str, value: u32) {
        self.0.insert(key, value);
    }

    pub fn set_dpi(&mut self, horz: u32, vert: u32) {
        self.insert(HORZ_DPI, horz);
        self.insert(VERT_DPI, vert);
    }

    pub fn horz_dpi(&self) -> u32 {
        dpi_or_default(self.get(HORZ_DPI))
    }

    pub fn vert_dpi(&self) -> u32 {
        dpi_or_default(self.get(VERT_DPI))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn dpi_or_default(value: Option<u32>) -> u32 {
    match value {
        Some(dpi) if dpi > 0 => dpi,
        _ => DEFAULT_DPI,
    }
}

/// What a format parser extracts from the image header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHeader {
    pub format: ImageFormat,
    pub px_width: u32,
    pub px_height: u32,
    pub attrs: ImageAttributes,
}

/// An image blob with its classified format and intrinsic size.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    blob: Vec<u8>,
    filename: Option<String>,
    format: ImageFormat,
    px_width: u32,
    px_height: u32,
    attrs: ImageAttributes,
}

impl Image {
    pub(crate) fn from_header(blob: Vec<u8>, filename: Option<String>, header: ImageHeader) -> Self {
        Self {
            blob,
            filename,
            format: header.format,
            px_width: header.px_width,
            px_height: header.px_height,
            attrs: header.attrs,
        }
    }

    /// Read and classify the file at `path`. The filename is the path's
    /// final component.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let blob = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        ImageRegistry::standard().parse_blob(blob, filename)
    }

    /// Read and classify a whole stream, from its start. The image has no
    /// filename.
    pub fn from_stream<R: Read + Seek>(stream: &mut R) -> Result<Self> {
        ImageRegistry::standard().classify_and_parse(stream, None)
    }

    /// Classify bytes already in memory.
    pub fn from_blob(blob: Vec<u8>, filename: Option<String>) -> Result<Self> {
        ImageRegistry::standard().parse_blob(blob, filename)
    }

    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn px_width(&self) -> u32 {
        self.px_width
    }

    pub fn px_height(&self) -> u32 {
        self.px_height
    }

    pub fn attrs(&self) -> &ImageAttributes {
        &self.attrs
    }

    pub fn horz_dpi(&self) -> u32 {
        self.attrs.horz_dpi()
    }

    pub fn vert_dpi(&self) -> u32 {
        self.attrs.vert_dpi()
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// Extension for the image part: the filename's own extension when it
    /// has one, otherwise the format default.
    pub fn ext(&self) -> &str {
        self.filename
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .unwrap_or_else(|| self.format.default_ext())
    }

    /// Hex SHA-1 digest of the blob, used to deduplicate image parts.
    pub fn sha1(&self) -> String {
        sha1_smol::Sha1::from(&self.blob).digest().to_string()
    }

    /// Native width at the image's horizontal resolution.
    pub fn width(&self) -> Emu {
        Emu::from_px(self.px_width, self.horz_dpi())
    }

    /// Native height at the image's vertical resolution.
    pub fn height(&self) -> Emu {
        Emu::from_px(self.px_height, self.vert_dpi())
    }

    /// Display size for requested dimensions.
    ///
    /// With neither given, the native size. With one given, the other is
    /// scaled to keep the aspect ratio. With both given, both are used as is.
    pub fn scaled_dimensions(&self, width: Option<Emu>, height: Option<Emu>) -> (Emu, Emu) {
        let (native_w, native_h) = (self.width(), self.height());
        match (width, height) {
            (None, None) => (native_w, native_h),
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => {
                let h = if native_w.0 == 0 {
                    native_h
                } else {
                    Emu(scale(native_h.0, w.0, native_w.0))
                };
                (w, h)
            }
            (None, Some(h)) => {
                let w = if native_h.0 == 0 {
                    native_w
                } else {
                    Emu(scale(native_w.0, h.0, native_h.0))
                };
                (w, h)
            }
        }
    }
}

/// `value * num / den` without intermediate overflow, saturating at the
/// `i64` range.
fn scale(value: i64, num: i64, den: i64) -> i64 {
    let scaled = i128::from(value) * i128::from(num) / i128::from(den);
    i64::try_from(scaled).unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX })
}
