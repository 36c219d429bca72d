//! Ordered registry of image format recognizers.

use std::io::{Read, Seek, SeekFrom};

use super::{Image, ImageHeader, bmp, gif, jpeg, png, tiff};
use crate::error::{Error, Result};

/// Number of leading bytes handed to recognizers.
pub const HEADER_LEN: usize = 32;

/// Decides from the header prefix whether a format applies.
pub type Matcher = fn(&[u8]) -> bool;

/// Reads the full blob of a recognized format.
pub type Parser = fn(&[u8]) -> Result<ImageHeader>;

/// One (signature matcher, parser) pair.
#[derive(Debug, Clone, Copy)]
pub struct Recognizer {
    pub name: &'static str,
    pub matches: Matcher,
    pub parse: Parser,
}

/// Recognizers tried in registration order; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    recognizers: Vec<Recognizer>,
}

impl ImageRegistry {
    /// A registry with no formats.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard registry (cached).
    pub fn standard() -> &'static Self {
        use std::sync::LazyLock;
        static STANDARD: LazyLock<ImageRegistry> = LazyLock::new(ImageRegistry::build_standard);
        &STANDARD
    }

    fn build_standard() -> Self {
        let mut registry = Self::new();
        registry.register("png", png::matches, png::parse);
        registry.register("jpeg/jfif", jpeg::matches_jfif, jpeg::parse);
        registry.register("jpeg/exif", jpeg::matches_exif, jpeg::parse);
        registry.register("jpeg", jpeg::matches, jpeg::parse);
        registry.register("gif", gif::matches, gif::parse);
        registry.register("tiff", tiff::matches, tiff::parse);
        registry.register("bmp", bmp::matches, bmp::parse);
        registry
    }

    /// Append a recognizer; it is tried after every earlier one.
    pub fn register(&mut self, name: &'static str, matches: Matcher, parse: Parser) {
        self.recognizers.push(Recognizer {
            name,
            matches,
            parse,
        });
    }

    pub fn recognizers(&self) -> &[Recognizer] {
        &self.recognizers
    }

    /// The first recognizer whose matcher accepts the header prefix of `blob`.
    pub fn classify(&self, blob: &[u8]) -> Result<&Recognizer> {
        let header = &blob[..blob.len().min(HEADER_LEN)];
        self.recognizers
            .iter()
            .find(|r| (r.matches)(header))
            .ok_or_else(|| Error::UnrecognizedFormat {
                prefix: header.to_vec(),
            })
    }

    /// Classify and parse bytes already in memory.
    pub fn parse_blob(&self, blob: Vec<u8>, filename: Option<String>) -> Result<Image> {
        let recognizer = self.classify(&blob)?;
        log::debug!(
            "classified {} byte image as {}",
            blob.len(),
            recognizer.name
        );
        let header = (recognizer.parse)(&blob)?;
        Ok(Image::from_header(blob, filename, header))
    }

    /// Rewind `stream`, read it to the end and classify the bytes.
    ///
    /// The stream is left wherever reading stopped.
    pub fn classify_and_parse<R: Read + Seek>(
        &self,
        stream: &mut R,
        filename: Option<String>,
    ) -> Result<Image> {
        stream.seek(SeekFrom::Start(0))?;
        let mut blob = Vec::new();
        stream.read_to_end(&mut blob)?;
        self.parse_blob(blob, filename)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::image::{ImageAttributes, ImageFormat};

    fn fake_parse(_: &[u8]) -> Result<ImageHeader> {
        Ok(ImageHeader {
            format: ImageFormat::Bmp,
            px_width: 1,
            px_height: 2,
            attrs: ImageAttributes::new(),
        })
    }

    #[test]
    fn test_standard_order() {
        let names: Vec<_> = ImageRegistry::standard()
            .recognizers()
            .iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(
            names,
            vec!["png", "jpeg/jfif", "jpeg/exif", "jpeg", "gif", "tiff", "bmp"]
        );
    }

    #[test]
    fn test_first_registered_wins() {
        let mut registry = ImageRegistry::new();
        registry.register("anything", |_| true, fake_parse);
        registry.register("png", png::matches, png::parse);
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(registry.classify(&png).unwrap().name, "anything");
    }

    #[test]
    fn test_unrecognized_carries_prefix() {
        let data = vec![0xAAu8; 40];
        match ImageRegistry::standard().parse_blob(data, None) {
            Err(Error::UnrecognizedFormat { prefix }) => assert_eq!(prefix, vec![0xAA; HEADER_LEN]),
            other => panic!("expected unrecognized format, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_registry_recognizes_nothing() {
        let registry = ImageRegistry::new();
        assert!(matches!(
            registry.classify(b"GIF89a"),
            Err(Error::UnrecognizedFormat { .. })
        ));
    }

    #[test]
    fn test_stream_is_rewound() {
        let mut registry = ImageRegistry::new();
        registry.register("fake", |h| h.starts_with(b"FAKE"), fake_parse);
        let mut stream = Cursor::new(b"FAKE image".to_vec());
        stream.set_position(6);
        let image = registry.classify_and_parse(&mut stream, None).unwrap();
        assert_eq!(image.blob(), b"FAKE image");
        assert_eq!(image.px_height(), 2);
    }
}
