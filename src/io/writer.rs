//! `BitWriter` over any byte sink.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bitstream_io::{BigEndian, BitWrite};

use super::{check_bit_count, BitWriter};
use crate::config::CompressionConfig;
use crate::error::{CompressError, Result};

/// Packs bits MSB-first into a byte sink. A trailing partial byte only
/// reaches the sink on [`BitWriter::flush`].
pub struct StreamBitWriter<W: Write> {
    inner: bitstream_io::BitWriter<W, BigEndian>,
}

impl<W: Write> StreamBitWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: bitstream_io::BitWriter::endian(writer, BigEndian),
        }
    }

    /// Returns the sink. Call `flush` first or a partial byte is lost.
    pub fn into_inner(self) -> W {
        self.inner.into_writer()
    }
}

impl StreamBitWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>, config: &CompressionConfig) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::with_capacity(config.buffer_size, file)))
    }
}

impl<W: Write> BitWriter for StreamBitWriter<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.inner.write_bit(bit)?;
        Ok(())
    }

    fn write_bits(&mut self, value: u32, count: u32) -> Result<()> {
        check_bit_count(count)?;
        if count == 0 {
            return Ok(());
        }
        let mask = (1u32 << count) - 1;
        self.inner.write(count, value & mask)?;
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.inner.byte_aligned() {
            self.inner.write_bytes(&[byte])?;
        } else {
            self.inner.write(8, byte)?;
        }
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.inner.byte_aligned() {
            self.inner.write_bytes(bytes)?;
        } else {
            for &byte in bytes {
                self.inner.write(8, byte)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.byte_align()?;
        let writer = self.inner.writer().ok_or_else(|| {
            CompressError::invalid_argument("bit writer is not byte-aligned after padding")
        })?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finish(mut writer: StreamBitWriter<Vec<u8>>) -> Vec<u8> {
        writer.flush().unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_bits_msb_first_with_padding() {
        let mut writer = StreamBitWriter::new(Vec::new());
        writer.write_bit(true).unwrap();
        writer.write_bits(0b011, 3).unwrap();
        assert_eq!(finish(writer), vec![0b1011_0000]);
    }

    #[test]
    fn test_write_bits_ignores_high_bits() {
        let mut writer = StreamBitWriter::new(Vec::new());
        writer.write_bits(0xffff_ff0f, 8).unwrap();
        assert_eq!(finish(writer), vec![0x0f]);
    }

    #[test]
    fn test_write_bits_wide() {
        let mut writer = StreamBitWriter::new(Vec::new());
        writer.write_bits(0x1234, 16).unwrap();
        writer.write_bits(0x7fff_ffff, 31).unwrap();
        writer.write_bit(false).unwrap();
        assert_eq!(finish(writer), vec![0x12, 0x34, 0xff, 0xff, 0xff, 0xfe]);
    }

    #[test]
    fn test_bit_count_out_of_range() {
        let mut writer = StreamBitWriter::new(Vec::new());
        assert!(matches!(
            writer.write_bits(1, 32),
            Err(CompressError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unaligned_bytes() {
        let mut writer = StreamBitWriter::new(Vec::new());
        writer.write_bit(false).unwrap();
        writer.write_bytes(&[0xff, 0x00]).unwrap();
        writer.write_byte(0x80).unwrap();
        assert_eq!(finish(writer), vec![0x7f, 0x80, 0x40, 0x00]);
    }

    #[test]
    fn test_aligned_bytes() {
        let mut writer = StreamBitWriter::new(Vec::new());
        writer.write_bytes(b"tez").unwrap();
        writer.write_byte(b'!').unwrap();
        assert_eq!(finish(writer), b"tez!".to_vec());
    }

    #[test]
    fn test_flush_on_aligned_stream_adds_nothing() {
        let mut writer = StreamBitWriter::new(Vec::new());
        writer.write_bits(0xa5, 8).unwrap();
        writer.flush().unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.into_inner(), vec![0xa5]);
    }
}
