//! TIFF: first IFD for size and resolution.
//!
//! Also used for the TIFF structure embedded in JPEG Exif segments.

use std::collections::HashMap;

use super::stream::{ByteOrder, StreamReader};
use super::{DEFAULT_DPI, ImageAttributes, ImageFormat, ImageHeader};
use crate::error::{Error, Result};

const BIG_ENDIAN_MARK: &[u8] = b"MM\x00\x2a";
const LITTLE_ENDIAN_MARK: &[u8] = b"II\x2a\x00";

const IMAGE_WIDTH: u16 = 256;
const IMAGE_LENGTH: u16 = 257;
const X_RESOLUTION: u16 = 282;
const Y_RESOLUTION: u16 = 283;
const RESOLUTION_UNIT: u16 = 296;

const UNIT_NONE: u32 = 1;
const UNIT_CENTIMETER: u32 = 3;

// field types
const SHORT: u16 = 3;
const LONG: u16 = 4;
const RATIONAL: u16 = 5;

pub fn matches(header: &[u8]) -> bool {
    header.starts_with(BIG_ENDIAN_MARK) || header.starts_with(LITTLE_ENDIAN_MARK)
}

pub fn parse(blob: &[u8]) -> Result<ImageHeader> {
    let ifd = Ifd::read(blob, 0)?;
    let px_width = ifd
        .get(IMAGE_WIDTH)
        .ok_or_else(|| Error::InvalidImage("TIFF has no ImageWidth tag".to_string()))?;
    let px_height = ifd
        .get(IMAGE_LENGTH)
        .ok_or_else(|| Error::InvalidImage("TIFF has no ImageLength tag".to_string()))?;

    let mut attrs = ImageAttributes::new();
    let (horz, vert) = ifd.dpi();
    attrs.set_dpi(horz, vert);
    Ok(ImageHeader {
        format: ImageFormat::Tiff,
        px_width: px_width.round() as u32,
        px_height: px_height.round() as u32,
        attrs,
    })
}

/// Numeric values of the first image file directory, by tag.
#[derive(Debug, Default)]
pub(crate) struct Ifd {
    values: HashMap<u16, f64>,
}

impl Ifd {
    /// Read IFD0 of a TIFF structure starting at `base` in `data`.
    pub(crate) fn read(data: &[u8], base: usize) -> Result<Self> {
        let order = match data.get(base..base + 4) {
            Some(mark) if mark == BIG_ENDIAN_MARK => ByteOrder::BigEndian,
            Some(mark) if mark == LITTLE_ENDIAN_MARK => ByteOrder::LittleEndian,
            _ => return Err(Error::InvalidImage("missing TIFF byte-order mark".to_string())),
        };
        let reader = StreamReader::new(data, order).with_base(base);
        let ifd_offset = reader.read_u32(4)? as usize;
        let count = reader.read_u16(ifd_offset)? as usize;

        let mut values = HashMap::new();
        for i in 0..count {
            let entry = ifd_offset + 2 + i * 12;
            let tag = reader.read_u16(entry)?;
            let field_type = reader.read_u16(entry + 2)?;
            let value = match field_type {
                SHORT => f64::from(reader.read_u16(entry + 8)?),
                LONG => f64::from(reader.read_u32(entry + 8)?),
                RATIONAL => {
                    let offset = reader.read_u32(entry + 8)? as usize;
                    let numerator = reader.read_u32(offset)?;
                    let denominator = reader.read_u32(offset + 4)?;
                    if denominator == 0 {
                        continue;
                    }
                    f64::from(numerator) / f64::from(denominator)
                }
                _ => continue,
            };
            values.insert(tag, value);
        }
        log::trace!("read {} TIFF tags", values.len());
        Ok(Self { values })
    }

    pub(crate) fn get(&self, tag: u16) -> Option<f64> {
        self.values.get(&tag).copied()
    }

    /// Horizontal and vertical resolution in dots per inch.
    pub(crate) fn dpi(&self) -> (u32, u32) {
        (self.resolution(X_RESOLUTION), self.resolution(Y_RESOLUTION))
    }

    fn resolution(&self, tag: u16) -> u32 {
        let unit = self.get(RESOLUTION_UNIT).map(|u| u as u32).unwrap_or(2);
        match self.get(tag) {
            None => DEFAULT_DPI,
            Some(_) if unit == UNIT_NONE => DEFAULT_DPI,
            Some(value) if unit == UNIT_CENTIMETER => (value * 2.54).round() as u32,
            Some(value) => value.round() as u32,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a minimal TIFF structure.
    ///
    /// `entries` are (tag, type, value); rationals store `value / 1` in a
    /// data area after the IFD.
    pub(crate) fn tiff_bytes(order: ByteOrder, entries: &[(u16, u16, u32)]) -> Vec<u8> {
        let u16b = |v: u16| match order {
            ByteOrder::BigEndian => v.to_be_bytes(),
            ByteOrder::LittleEndian => v.to_le_bytes(),
        };
        let u32b = |v: u32| match order {
            ByteOrder::BigEndian => v.to_be_bytes(),
            ByteOrder::LittleEndian => v.to_le_bytes(),
        };

        let mut out = match order {
            ByteOrder::BigEndian => BIG_ENDIAN_MARK.to_vec(),
            ByteOrder::LittleEndian => LITTLE_ENDIAN_MARK.to_vec(),
        };
        out.extend_from_slice(&u32b(8));
        out.extend_from_slice(&u16b(entries.len() as u16));

        let data_start = 8 + 2 + entries.len() * 12 + 4;
        let mut data = Vec::new();
        for &(tag, field_type, value) in entries {
            out.extend_from_slice(&u16b(tag));
            out.extend_from_slice(&u16b(field_type));
            out.extend_from_slice(&u32b(1));
            match field_type {
                SHORT => {
                    out.extend_from_slice(&u16b(value as u16));
                    out.extend_from_slice(&[0, 0]);
                }
                RATIONAL => {
                    out.extend_from_slice(&u32b((data_start + data.len()) as u32));
                    data.extend_from_slice(&u32b(value));
                    data.extend_from_slice(&u32b(1));
                }
                _ => out.extend_from_slice(&u32b(value)),
            }
        }
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend(data);
        out
    }

    #[test]
    fn test_big_endian() {
        let data = tiff_bytes(
            ByteOrder::BigEndian,
            &[
                (IMAGE_WIDTH, SHORT, 640),
                (IMAGE_LENGTH, LONG, 480),
                (X_RESOLUTION, RATIONAL, 300),
                (Y_RESOLUTION, RATIONAL, 200),
            ],
        );
        assert!(matches(&data));
        let header = parse(&data).unwrap();
        assert_eq!((header.px_width, header.px_height), (640, 480));
        assert_eq!(header.attrs.horz_dpi(), 300);
        assert_eq!(header.attrs.vert_dpi(), 200);
    }

    #[test]
    fn test_little_endian_centimeters() {
        let data = tiff_bytes(
            ByteOrder::LittleEndian,
            &[
                (IMAGE_WIDTH, LONG, 100),
                (IMAGE_LENGTH, LONG, 50),
                (X_RESOLUTION, RATIONAL, 118),
                (Y_RESOLUTION, RATIONAL, 118),
                (RESOLUTION_UNIT, SHORT, 3),
            ],
        );
        let header = parse(&data).unwrap();
        assert_eq!((header.px_width, header.px_height), (100, 50));
        // 118 dots/cm is about 300 dpi
        assert_eq!(header.attrs.horz_dpi(), 300);
    }

    #[test]
    fn test_no_absolute_unit_uses_default() {
        let data = tiff_bytes(
            ByteOrder::LittleEndian,
            &[
                (IMAGE_WIDTH, LONG, 1),
                (IMAGE_LENGTH, LONG, 1),
                (X_RESOLUTION, RATIONAL, 300),
                (RESOLUTION_UNIT, SHORT, 1),
            ],
        );
        assert_eq!(parse(&data).unwrap().attrs.horz_dpi(), 72);
    }

    #[test]
    fn test_missing_size_tags() {
        let data = tiff_bytes(ByteOrder::BigEndian, &[(X_RESOLUTION, RATIONAL, 72)]);
        assert!(matches!(parse(&data), Err(Error::InvalidImage(_))));
    }
}
