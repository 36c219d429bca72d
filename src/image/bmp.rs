//! BMP: `BITMAPINFOHEADER` size and resolution.

use super::stream::{ByteOrder, StreamReader};
use super::{ImageAttributes, ImageFormat, ImageHeader};
use crate::error::Result;

pub fn matches(header: &[u8]) -> bool {
    header.starts_with(b"BM")
}

// offsets into the file
const WIDTH: usize = 0x12;
const HEIGHT: usize = 0x16;
const BIT_COUNT: usize = 0x1C;
const X_PELS_PER_METER: usize = 0x26;
const Y_PELS_PER_METER: usize = 0x2A;

/// A negative height marks a top-down bitmap; the size is its magnitude.
pub fn parse(blob: &[u8]) -> Result<ImageHeader> {
    let reader = StreamReader::new(blob, ByteOrder::LittleEndian);
    let px_width = reader.read_i32(WIDTH)?.unsigned_abs();
    let px_height = reader.read_i32(HEIGHT)?.unsigned_abs();

    let mut attrs = ImageAttributes::new();
    attrs.insert("bit_depth", u32::from(reader.read_u16(BIT_COUNT)?));
    let horz = ppm_to_dpi(reader.read_i32(X_PELS_PER_METER)?);
    let vert = ppm_to_dpi(reader.read_i32(Y_PELS_PER_METER)?);
    attrs.set_dpi(horz, vert);

    Ok(ImageHeader {
        format: ImageFormat::Bmp,
        px_width,
        px_height,
        attrs,
    })
}

/// Zero (absent) or negative resolutions map to 0, which reads as the default.
fn ppm_to_dpi(ppm: i32) -> u32 {
    if ppm <= 0 {
        return 0;
    }
    (f64::from(ppm) * 0.0254).round() as u32
}
