//! GIF: logical screen descriptor.

use super::stream::{ByteOrder, StreamReader};
use super::{DEFAULT_DPI, ImageAttributes, ImageFormat, ImageHeader};
use crate::error::Result;

pub fn matches(header: &[u8]) -> bool {
    header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a")
}

/// Width and height are little-endian u16 fields right after the signature.
/// GIF records no resolution.
pub fn parse(blob: &[u8]) -> Result<ImageHeader> {
    let reader = StreamReader::new(blob, ByteOrder::LittleEndian);
    let px_width = u32::from(reader.read_u16(6)?);
    let px_height = u32::from(reader.read_u16(8)?);
    let mut attrs = ImageAttributes::new();
    attrs.set_dpi(DEFAULT_DPI, DEFAULT_DPI);
    Ok(ImageHeader {
        format: ImageFormat::Gif,
        px_width,
        px_height,
        attrs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_screen() {
        let mut data = b"GIF89a".to_vec();
        data.extend_from_slice(&[0x90, 0x01, 0x2C, 0x01, 0xF7, 0, 0]);
        assert!(matches(&data));
        let header = parse(&data).unwrap();
        assert_eq!((header.px_width, header.px_height), (400, 300));
        assert_eq!(header.attrs.horz_dpi(), 72);
    }

    #[test]
    fn test_old_signature_and_truncation() {
        assert!(matches(b"GIF87a"));
        assert!(!matches(b"GIF88a"));
        assert!(parse(b"GIF87a\x01").is_err());
    }
}
