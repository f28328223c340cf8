//! `BitReader` over any seekable byte source.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use bitstream_io::{BigEndian, BitRead};

use super::{check_bit_count, BitReader};
use crate::config::{CompressionConfig, MAX_STREAM_LEN};
use crate::error::{CompressError, Result};

/// Reads bits MSB-first from a seekable stream whose length is measured once,
/// up front. Tracking the remaining bit count lets every read report end of
/// stream before touching the source, so a short read never consumes input.
pub struct StreamBitReader<R: Read + Seek> {
    inner: bitstream_io::BitReader<R, BigEndian>,
    length: u64,
    bits_left: u64,
}

impl<R: Read + Seek> StreamBitReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        Self::with_limit(reader, MAX_STREAM_LEN)
    }

    /// Measures the stream and rewinds it to the start. Streams longer than
    /// `max_len` (or a signed 32-bit count) are rejected.
    pub fn with_limit(mut reader: R, max_len: u64) -> Result<Self> {
        let length = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let max = max_len.min(MAX_STREAM_LEN);
        if length > max {
            return Err(CompressError::StreamTooLong { length, max });
        }

        Ok(Self {
            inner: bitstream_io::BitReader::endian(reader, BigEndian),
            length,
            bits_left: length * 8,
        })
    }

    /// Bits not yet consumed.
    pub fn bits_remaining(&self) -> u64 {
        self.bits_left
    }

    pub fn into_inner(self) -> R {
        self.inner.into_reader()
    }
}

impl<'a> StreamBitReader<Cursor<&'a [u8]>> {
    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        Self::new(Cursor::new(data))
    }
}

impl StreamBitReader<Cursor<Vec<u8>>> {
    /// Drains a source that cannot seek (a pipe, stdin) into memory so it can
    /// be measured and rewound. Reads at most one byte past the limit.
    pub fn buffered<S: Read>(source: S, max_len: u64) -> Result<Self> {
        let max = max_len.min(MAX_STREAM_LEN);
        let mut data = Vec::new();
        source.take(max + 1).read_to_end(&mut data)?;
        Self::with_limit(Cursor::new(data), max)
    }
}

impl StreamBitReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, config: &CompressionConfig) -> Result<Self> {
        let file = File::open(path)?;
        Self::with_limit(
            BufReader::with_capacity(config.buffer_size, file),
            config.stream_limit(),
        )
    }
}

impl<R: Read + Seek> BitReader for StreamBitReader<R> {
    fn read_bit(&mut self) -> Result<Option<bool>> {
        if self.bits_left == 0 {
            return Ok(None);
        }
        let bit = self.inner.read_bit()?;
        self.bits_left -= 1;
        Ok(Some(bit))
    }

    fn read_bits(&mut self, count: u32) -> Result<Option<u32>> {
        check_bit_count(count)?;
        if count == 0 {
            return Ok(Some(0));
        }
        if self.bits_left < u64::from(count) {
            return Ok(None);
        }
        let bits = self.inner.read::<u32>(count)?;
        self.bits_left -= u64::from(count);
        Ok(Some(bits))
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.bits_left < 8 {
            return Ok(None);
        }
        let byte = if self.inner.byte_aligned() {
            let mut buf = [0u8; 1];
            self.inner.read_bytes(&mut buf)?;
            buf[0]
        } else {
            self.inner.read::<u8>(8)?
        };
        self.bits_left -= 8;
        Ok(Some(byte))
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        if buf.is_empty() {
            return Ok(Some(0));
        }
        let available = usize::try_from(self.bits_left / 8).unwrap_or(usize::MAX);
        let count = buf.len().min(available);
        if count == 0 {
            return Ok(None);
        }
        self.inner.read_bytes(&mut buf[..count])?;
        self.bits_left -= count as u64 * 8;
        Ok(Some(count))
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.byte_align();
        let reader = self.inner.reader().ok_or_else(|| {
            CompressError::invalid_argument("bit reader is not byte-aligned after alignment")
        })?;
        reader.seek(SeekFrom::Start(0))?;
        self.bits_left = self.length * 8;
        Ok(())
    }
}
