//! PNG: `IHDR` for size, `pHYs` for resolution.

use super::stream::{ByteOrder, StreamReader};
use super::{ImageAttributes, ImageFormat, ImageHeader};
use crate::error::{Error, Result};

const SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// `pHYs` unit specifier for pixels per meter.
const UNIT_METER: u8 = 1;

pub fn matches(header: &[u8]) -> bool {
    header.starts_with(SIGNATURE)
}

pub fn parse(blob: &[u8]) -> Result<ImageHeader> {
    let reader = StreamReader::new(blob, ByteOrder::BigEndian);
    let mut size = None;
    let mut attrs = ImageAttributes::new();

    // chunk: length (4) | type (4) | data (length) | crc (4)
    let mut offset = SIGNATURE.len();
    while reader.remaining(offset) >= 8 {
        let length = reader.read_u32(offset)? as usize;
        let kind = reader.read_str(offset + 4, 4)?;
        let data = offset + 8;
        match kind {
            "IHDR" => {
                size = Some((reader.read_u32(data)?, reader.read_u32(data + 4)?));
                attrs.insert("bit_depth", u32::from(reader.read_u8(data + 8)?));
                attrs.insert("color_type", u32::from(reader.read_u8(data + 9)?));
            }
            "pHYs" => {
                let horz_ppu = reader.read_u32(data)?;
                let vert_ppu = reader.read_u32(data + 4)?;
                if reader.read_u8(data + 8)? == UNIT_METER {
                    attrs.set_dpi(ppm_to_dpi(horz_ppu), ppm_to_dpi(vert_ppu));
                }
            }
            "IDAT" | "IEND" => break,
            _ => {}
        }
        offset = data.saturating_add(length).saturating_add(4);
    }

    let (px_width, px_height) =
        size.ok_or_else(|| Error::InvalidImage("PNG has no IHDR chunk".to_string()))?;
    Ok(ImageHeader {
        format: ImageFormat::Png,
        px_width,
        px_height,
        attrs,
    })
}

fn ppm_to_dpi(ppm: u32) -> u32 {
    (f64::from(ppm) * 0.0254).round() as u32
}
