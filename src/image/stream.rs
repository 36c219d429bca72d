//! Bounds-checked, endian-aware reads over an image blob.

use crate::error::{Error, Result};

/// Byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

/// Reads fixed-width fields at offsets relative to a base position.
///
/// Every read is bounds-checked; running past the end of the data is an
/// [`Error::InvalidImage`] rather than a panic.
#[derive(Debug, Clone, Copy)]
pub struct StreamReader<'a> {
    data: &'a [u8],
    order: ByteOrder,
    base: usize,
}

impl<'a> StreamReader<'a> {
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            order,
            base: 0,
        }
    }

    /// A reader over the same data whose offsets start at `base`.
    ///
    /// Used for structures embedded in another format, such as the TIFF
    /// header inside a JPEG Exif segment.
    pub fn with_base(self, base: usize) -> Self {
        Self {
            base: self.base + base,
            ..self
        }
    }

    pub fn with_order(self, order: ByteOrder) -> Self {
        Self { order, ..self }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Bytes available from `offset` to the end.
    pub fn remaining(&self, offset: usize) -> usize {
        self.data.len().saturating_sub(self.base + offset)
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let start = self.base.checked_add(offset);
        let end = start.and_then(|s| s.checked_add(len));
        match (start, end) {
            (Some(start), Some(end)) if end <= self.data.len() => Ok(&self.data[start..end]),
            _ => Err(Error::InvalidImage(format!(
                "unexpected end of data reading {} bytes at offset {}",
                len,
                self.base.saturating_add(offset)
            ))),
        }
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let bytes = self.read_bytes(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        Ok(self.read_bytes(offset, 1)?[0])
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        let bytes = self.read_array::<2>(offset)?;
        Ok(match self.order {
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
        })
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let bytes = self.read_array::<4>(offset)?;
        Ok(match self.order {
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
        })
    }

    pub fn read_i32(&self, offset: usize) -> Result<i32> {
        let bytes = self.read_array::<4>(offset)?;
        Ok(match self.order {
            ByteOrder::BigEndian => i32::from_be_bytes(bytes),
            ByteOrder::LittleEndian => i32::from_le_bytes(bytes),
        })
    }

    /// Fixed-length ASCII field, such as a PNG chunk type.
    pub fn read_str(&self, offset: usize, len: usize) -> Result<&'a str> {
        std::str::from_utf8(self.read_bytes(offset, len)?)
            .map_err(|_| Error::InvalidImage(format!("non-ASCII field at offset {offset}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endianness() {
        let data = [0x12, 0x34, 0x56, 0x78];
        let be = StreamReader::new(&data, ByteOrder::BigEndian);
        let le = be.with_order(ByteOrder::LittleEndian);
        assert_eq!(be.read_u16(0).unwrap(), 0x1234);
        assert_eq!(le.read_u16(0).unwrap(), 0x3412);
        assert_eq!(be.read_u32(0).unwrap(), 0x12345678);
        assert_eq!(le.read_u32(0).unwrap(), 0x78563412);
    }

    #[test]
    fn test_base_offset() {
        let data = [0xFF, 0xFF, 0x00, 0x2A];
        let reader = StreamReader::new(&data, ByteOrder::BigEndian).with_base(2);
        assert_eq!(reader.read_u16(0).unwrap(), 42);
        assert_eq!(reader.remaining(0), 2);
    }

    #[test]
    fn test_signed_read() {
        let data = (-600i32).to_le_bytes();
        let reader = StreamReader::new(&data, ByteOrder::LittleEndian);
        assert_eq!(reader.read_i32(0).unwrap(), -600);
    }

    #[test]
    fn test_out_of_bounds_is_error() {
        let data = [0u8; 3];
        let reader = StreamReader::new(&data, ByteOrder::BigEndian);
        assert!(matches!(reader.read_u32(0), Err(Error::InvalidImage(_))));
        assert!(reader.read_u8(usize::MAX).is_err());
    }
}
