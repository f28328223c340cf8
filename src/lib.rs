//! tez-compress: lossless byte-stream compression.
//!
//! Two interchangeable codecs share one bit-level I/O layer:
//! - Huffman coding with the code tree serialized as a self-describing header
//! - LZW with an implicit dictionary and codes that widen as it grows
//!
//! Both implement [`Compressor`], which maps a [`BitReader`](io::BitReader)
//! onto a [`BitWriter`](io::BitWriter) and back, and adds helpers for byte
//! buffers, seekable streams and files.

pub mod config;
pub mod error;
pub mod huffman;
pub mod io;
pub mod lzw;
pub mod priority_queue;

use std::fmt;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

pub use crate::config::CompressionConfig;
pub use crate::error::{CompressError, Result};
pub use crate::huffman::{HuffmanCode, HuffmanCompressor};
pub use crate::lzw::LzwCompressor;
pub use crate::priority_queue::PriorityQueue;

use crate::io::{BitReader, BitWriter, SeekRead, StreamBitReader, StreamBitWriter};

/// An injective mapping from one bit stream onto another.
///
/// `expand` may fail after part of its output has already been written when
/// the compressed input is corrupt or truncated.
pub trait Compressor {
    fn compress(&self, reader: &mut dyn BitReader, writer: &mut dyn BitWriter) -> Result<()>;

    fn expand(&self, reader: &mut dyn BitReader, writer: &mut dyn BitWriter) -> Result<()>;

    fn config(&self) -> &CompressionConfig;

    fn compress_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut reader =
            StreamBitReader::with_limit(Cursor::new(input), self.config().stream_limit())?;
        let mut writer = StreamBitWriter::new(Vec::new());
        self.compress(&mut reader, &mut writer)?;
        Ok(writer.into_inner())
    }

    fn expand_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut reader =
            StreamBitReader::with_limit(Cursor::new(input), self.config().stream_limit())?;
        let mut writer = StreamBitWriter::new(Vec::new());
        self.expand(&mut reader, &mut writer)?;
        Ok(writer.into_inner())
    }

    fn compress_stream(&self, input: &mut dyn SeekRead, output: &mut dyn Write) -> Result<()> {
        let mut reader = StreamBitReader::with_limit(input, self.config().stream_limit())?;
        let mut writer = StreamBitWriter::new(output);
        self.compress(&mut reader, &mut writer)?;
        writer.flush()
    }

    fn expand_stream(&self, input: &mut dyn SeekRead, output: &mut dyn Write) -> Result<()> {
        let mut reader = StreamBitReader::with_limit(input, self.config().stream_limit())?;
        let mut writer = StreamBitWriter::new(output);
        self.expand(&mut reader, &mut writer)?;
        writer.flush()
    }

    /// Like [`compress_stream`](Self::compress_stream) for sources that cannot
    /// seek. The whole input is buffered in memory first.
    fn compress_reader(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let mut reader = StreamBitReader::buffered(input, self.config().stream_limit())?;
        let mut writer = StreamBitWriter::new(output);
        self.compress(&mut reader, &mut writer)?;
        writer.flush()
    }

    fn expand_reader(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<()> {
        let mut reader = StreamBitReader::buffered(input, self.config().stream_limit())?;
        let mut writer = StreamBitWriter::new(output);
        self.expand(&mut reader, &mut writer)?;
        writer.flush()
    }

    fn compress_file(&self, input: &Path, output: &Path) -> Result<()> {
        debug!(input = %input.display(), output = %output.display(), "compressing file");
        let mut reader = StreamBitReader::open(input, self.config())?;
        let mut writer = StreamBitWriter::create(output, self.config())?;
        self.compress(&mut reader, &mut writer)?;
        writer.flush()
    }

    fn expand_file(&self, input: &Path, output: &Path) -> Result<()> {
        debug!(input = %input.display(), output = %output.display(), "expanding file");
        let mut reader = StreamBitReader::open(input, self.config())?;
        let mut writer = StreamBitWriter::create(output, self.config())?;
        self.expand(&mut reader, &mut writer)?;
        writer.flush()
    }
}

/// Compression method selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CompressionMethod {
    Huffman,
    Lzw,
}

impl CompressionMethod {
    /// Maps the one-letter codes `h` (Huffman) and `z` (LZW).
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'h' => Some(CompressionMethod::Huffman),
            'z' => Some(CompressionMethod::Lzw),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            CompressionMethod::Huffman => 'h',
            CompressionMethod::Lzw => 'z',
        }
    }

    pub fn compressor(self, config: CompressionConfig) -> Result<Box<dyn Compressor>> {
        let compressor: Box<dyn Compressor> = match self {
            CompressionMethod::Huffman => Box::new(HuffmanCompressor::new(config)?),
            CompressionMethod::Lzw => Box::new(LzwCompressor::new(config)?),
        };
        Ok(compressor)
    }
}

impl FromStr for CompressionMethod {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let method = match (chars.next(), chars.next()) {
            (Some(code), None) => Self::from_code(code),
            _ => None,
        };
        method.ok_or_else(|| {
            CompressError::InvalidArgument(format!(
                "unknown compression method {:?}, expected 'h' or 'z'",
                s
            ))
        })
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Huffman => f.write_str("huffman"),
            CompressionMethod::Lzw => f.write_str("lzw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHODS: [CompressionMethod; 2] = [CompressionMethod::Huffman, CompressionMethod::Lzw];

    #[test]
    fn test_method_codes() {
        for method in METHODS {
            assert_eq!(CompressionMethod::from_code(method.code()), Some(method));
            assert_eq!(method.code().to_string().parse::<CompressionMethod>().unwrap(), method);
        }
        assert!(CompressionMethod::from_code('x').is_none());
        assert!("hz".parse::<CompressionMethod>().is_err());
        assert!("".parse::<CompressionMethod>().is_err());
    }

    #[test]
    fn test_roundtrip_bytes() {
        let data = b"the quick brown fox jumps over the lazy dog";
        for method in METHODS {
            let compressor = method.compressor(CompressionConfig::default()).unwrap();
            let compressed = compressor.compress_bytes(data).unwrap();
            assert_eq!(compressor.expand_bytes(&compressed).unwrap(), data, "{}", method);
        }
    }

    #[test]
    fn test_empty_input() {
        for method in METHODS {
            let compressor = method.compressor(CompressionConfig::default()).unwrap();
            assert!(compressor.compress_bytes(b"").unwrap().is_empty());
            assert!(compressor.expand_bytes(b"").unwrap().is_empty());
        }
    }

    #[test]
    fn test_roundtrip_stream() {
        let data = b"streams are reduced to bit readers and writers".repeat(20);
        for method in METHODS {
            let compressor = method.compressor(CompressionConfig::default()).unwrap();
            let mut compressed = Vec::new();
            compressor
                .compress_stream(&mut Cursor::new(&data), &mut compressed)
                .unwrap();
            let mut expanded = Vec::new();
            compressor
                .expand_stream(&mut Cursor::new(&compressed), &mut expanded)
                .unwrap();
            assert_eq!(expanded, data);
        }
    }

    #[test]
    fn test_roundtrip_plain_reader() {
        let data = b"pipes and stdin cannot seek".repeat(10);
        for method in METHODS {
            let compressor = method.compressor(CompressionConfig::default()).unwrap();
            let mut compressed = Vec::new();
            compressor
                .compress_reader(&mut data.as_slice(), &mut compressed)
                .unwrap();
            let mut expanded = Vec::new();
            compressor
                .expand_reader(&mut compressed.as_slice(), &mut expanded)
                .unwrap();
            assert_eq!(expanded, data, "{}", method);
        }
    }

    #[test]
    fn test_stream_limit_applies_to_helpers() {
        let config = CompressionConfig {
            max_stream_len: 4,
            ..CompressionConfig::default()
        };
        let compressor = CompressionMethod::Lzw.compressor(config).unwrap();
        let result = compressor.compress_bytes(b"too long");
        assert!(matches!(result, Err(CompressError::StreamTooLong { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CompressionConfig {
            lzw_initial_table_size: 16,
            ..CompressionConfig::default()
        };
        assert!(CompressionMethod::Lzw.compressor(config).is_err());
    }
}
