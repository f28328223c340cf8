//! Bit-level I/O shared by both codecs.
//!
//! [`BitReader`] and [`BitWriter`] are the only capabilities the coding logic
//! consumes. Bits are packed most-significant first. Bit-oriented and
//! byte-oriented calls may follow each other freely; byte calls on an
//! unaligned stream take the slow path through the bit buffer.
//!
//! End of stream at a natural boundary is reported as `Ok(None)`. Running out
//! of data in the middle of a structure (a variable-width integer, a header
//! leaf) is an error.

mod debug;
mod reader;
mod writer;

pub use debug::DebugWriter;
pub use reader::StreamBitReader;
pub use writer::StreamBitWriter;

use std::io::{Read, Seek};

use crate::error::{CompressError, Result};

/// Largest number of bits transferred by a single `read_bits`/`write_bits`.
pub const MAX_BITS: u32 = 31;

/// A readable byte stream that can also be repositioned.
pub trait SeekRead: Read + Seek {}

impl<T: Read + Seek + ?Sized> SeekRead for T {}

pub trait BitReader {
    /// Next bit, or `None` once the stream is exhausted.
    fn read_bit(&mut self) -> Result<Option<bool>>;

    /// Reads `count` bits into an integer. The first bit read lands in the
    /// highest position. Returns `None` if fewer than `count` bits remain.
    fn read_bits(&mut self, count: u32) -> Result<Option<u32>>;

    /// Next byte, or `None` if fewer than eight bits remain.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Fills as much of `buf` as the stream allows and returns how many bytes
    /// were read. Returns `None` only when `buf` is non-empty and no byte was
    /// available.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<Option<usize>>;

    /// Reads a little-endian base-128 integer written by
    /// [`BitWriter::write_int`].
    fn read_int(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0u32;
        loop {
            let byte = self
                .read_byte()?
                .ok_or(CompressError::UnexpectedEof("variable-width integer"))?;
            let group = u32::from(byte & 0x7f);
            if shift > 28 || (shift == 28 && group > 0x0f) {
                return Err(CompressError::invalid_format(
                    "variable-width integer overflows 32 bits",
                ));
            }
            value |= group << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Total length of the underlying stream in bytes.
    fn length(&self) -> u64;

    /// Repositions to the first byte, dropping any partially consumed byte.
    fn reset(&mut self) -> Result<()>;
}

pub trait BitWriter {
    fn write_bit(&mut self, bit: bool) -> Result<()>;

    /// Writes the low `count` bits of `value`, highest first.
    fn write_bits(&mut self, value: u32, count: u32) -> Result<()>;

    fn write_byte(&mut self, byte: u8) -> Result<()>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Writes `value` seven bits at a time, least significant group first,
    /// setting the high bit of every byte that has a successor.
    fn write_int(&mut self, value: u32) -> Result<()> {
        let mut value = value;
        loop {
            let high = value >> 7;
            let mut byte = (value & 0x7f) as u8;
            if high != 0 {
                byte |= 0x80;
            }
            self.write_byte(byte)?;
            value = high;
            if value == 0 {
                return Ok(());
            }
        }
    }

    /// Pads a partial byte with zero bits and pushes everything to the sink.
    fn flush(&mut self) -> Result<()>;
}

pub(crate) fn check_bit_count(count: u32) -> Result<()> {
    if count > MAX_BITS {
        return Err(CompressError::invalid_argument(format!(
            "bit count {} is out of range 0..={}",
            count, MAX_BITS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_bytes(value: u32) -> Vec<u8> {
        let mut writer = StreamBitWriter::new(Vec::new());
        writer.write_int(value).unwrap();
        writer.flush().unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_varint_layout() {
        assert_eq!(int_bytes(0), vec![0x00]);
        assert_eq!(int_bytes(127), vec![0x7f]);
        assert_eq!(int_bytes(128), vec![0x80, 0x01]);
        assert_eq!(int_bytes(300), vec![0xac, 0x02]);
        assert_eq!(int_bytes(u32::MAX), vec![0xff, 0xff, 0xff, 0xff, 0x0f]);
    }

    #[test]
    fn test_varint_read() {
        for value in [0, 1, 127, 128, 16_383, 16_384, 1 << 28, u32::MAX] {
            let bytes = int_bytes(value);
            let mut reader = StreamBitReader::from_bytes(&bytes).unwrap();
            assert_eq!(reader.read_int().unwrap(), value);
        }
    }

    #[test]
    fn test_varint_truncated() {
        let mut reader = StreamBitReader::from_bytes(&[0x80, 0x80]).unwrap();
        assert!(matches!(
            reader.read_int(),
            Err(CompressError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn test_varint_overflow() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0x7f];
        let mut reader = StreamBitReader::from_bytes(&bytes).unwrap();
        assert!(matches!(
            reader.read_int(),
            Err(CompressError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_varint_after_unaligned_bits() {
        let mut writer = StreamBitWriter::new(Vec::new());
        writer.write_bit(true).unwrap();
        writer.write_int(1000).unwrap();
        writer.flush().unwrap();
        let bytes = writer.into_inner();

        let mut reader = StreamBitReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.read_bit().unwrap(), Some(true));
        assert_eq!(reader.read_int().unwrap(), 1000);
    }

    #[test]
    fn test_bit_count_range() {
        assert!(check_bit_count(0).is_ok());
        assert!(check_bit_count(31).is_ok());
        assert!(check_bit_count(32).is_err());
    }
}
