//! JPEG: marker scan for the frame header, JFIF or Exif for resolution.

use super::stream::{ByteOrder, StreamReader};
use super::tiff::Ifd;
use super::{ImageAttributes, ImageFormat, ImageHeader};
use crate::error::{Error, Result};

const SOI: &[u8] = &[0xFF, 0xD8];

const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;

const JFIF_ID: &[u8] = b"JFIF\0";
const EXIF_ID: &[u8] = b"Exif\0\0";

pub fn matches_jfif(header: &[u8]) -> bool {
    header.starts_with(SOI) && header.get(6..10) == Some(b"JFIF".as_slice())
}

pub fn matches_exif(header: &[u8]) -> bool {
    header.starts_with(SOI) && header.get(6..10) == Some(b"Exif".as_slice())
}

/// Any other JPEG: just the start-of-image marker.
pub fn matches(header: &[u8]) -> bool {
    header.starts_with(SOI)
}

/// Start-of-frame markers; C4 (DHT), C8 (JPG) and CC (DAC) share the range
/// but are not frame headers.
fn is_sof(marker: u8) -> bool {
    matches!(
        marker,
        0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF
    )
}

/// Markers that stand alone, without a length field.
fn is_standalone(marker: u8) -> bool {
    matches!(marker, 0x01 | 0xD0..=0xD7 | 0xD8)
}

pub fn parse(blob: &[u8]) -> Result<ImageHeader> {
    let reader = StreamReader::new(blob, ByteOrder::BigEndian);
    let mut attrs = ImageAttributes::new();
    let mut pos = SOI.len();

    loop {
        // Markers are 0xFF followed by a code; extra 0xFF bytes are fill.
        let Some(found) = memchr::memchr(0xFF, &blob[pos.min(blob.len())..]) else {
            break;
        };
        pos += found;
        while blob.get(pos + 1) == Some(&0xFF) {
            pos += 1;
        }
        let marker = reader.read_u8(pos + 1)?;
        let segment = pos + 2;

        if marker == 0x00 || is_standalone(marker) {
            pos = segment;
            continue;
        }
        if marker == SOS || marker == EOI {
            break;
        }

        let length = reader.read_u16(segment)? as usize;
        if length < 2 {
            return Err(Error::InvalidImage(format!(
                "JPEG segment length {length} at offset {pos}"
            )));
        }

        if is_sof(marker) {
            let px_height = u32::from(reader.read_u16(segment + 3)?);
            let px_width = u32::from(reader.read_u16(segment + 5)?);
            log::trace!("JPEG frame marker {marker:#04x} at {pos}");
            return Ok(ImageHeader {
                format: ImageFormat::Jpeg,
                px_width,
                px_height,
                attrs,
            });
        }

        match marker {
            APP0 if reader.read_bytes(segment + 2, JFIF_ID.len()).ok() == Some(JFIF_ID) => {
                read_jfif(&reader, segment, &mut attrs)?;
            }
            APP1 if reader.read_bytes(segment + 2, EXIF_ID.len()).ok() == Some(EXIF_ID) => {
                // A broken Exif block loses only the resolution.
                if let Ok(ifd) = Ifd::read(blob, segment + 2 + EXIF_ID.len()) {
                    let (horz, vert) = ifd.dpi();
                    attrs.set_dpi(horz, vert);
                }
            }
            _ => {}
        }
        pos = segment + length;
    }

    Err(Error::InvalidImage(
        "JPEG has no start-of-frame marker".to_string(),
    ))
}

/// JFIF APP0: identifier (5) | version (2) | units (1) | x density (2) | y density (2)
fn read_jfif(reader: &StreamReader<'_>, segment: usize, attrs: &mut ImageAttributes) -> Result<()> {
    let units = reader.read_u8(segment + 9)?;
    let x_density = reader.read_u16(segment + 10)?;
    let y_density = reader.read_u16(segment + 12)?;
    let to_dpi = |density: u16| match units {
        1 => Some(u32::from(density)),
        2 => Some((f64::from(density) * 2.54).round() as u32),
        _ => None,
    };
    if let (Some(horz), Some(vert)) = (to_dpi(x_density), to_dpi(y_density)) {
        attrs.set_dpi(horz, vert);
    }
    Ok(())
}
