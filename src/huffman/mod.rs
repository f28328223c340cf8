//! Huffman compression and decompression
//!
//! Stream layout: the serialized code tree, the input length as a
//! variable-width integer, then one codeword per input byte. Empty input
//! compresses to nothing.

mod code;
pub mod dot;

pub use code::{FrequencyTable, HuffmanCode, HuffmanNode, NodeId, NodeKind};

use tracing::debug;

use crate::config::{CompressionConfig, MAX_STREAM_LEN};
use crate::error::{CompressError, Result};
use crate::io::{BitReader, BitWriter};
use crate::Compressor;

/// Counts every byte from the reader's current position to its end.
pub fn count_frequencies<R: BitReader + ?Sized>(reader: &mut R) -> Result<FrequencyTable> {
    let mut counts = [0u64; 256];
    while let Some(byte) = reader.read_byte()? {
        counts[byte as usize] += 1;
    }
    Ok(counts
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(symbol, &count)| (symbol as u8, count))
        .collect())
}

#[derive(Debug, Clone, Default)]
pub struct HuffmanCompressor {
    config: CompressionConfig,
}

impl HuffmanCompressor {
    pub fn new(config: CompressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Scans the rest of `reader` and builds a code from the byte counts.
    pub fn calc_huffman_code<R: BitReader + ?Sized>(&self, reader: &mut R) -> Result<HuffmanCode> {
        let freqs = count_frequencies(reader)?;
        HuffmanCode::build(&freqs, self.config.queue_capacity)
    }
}

fn checked_length(length: u64) -> Result<u32> {
    match u32::try_from(length) {
        Ok(count) if length <= MAX_STREAM_LEN => Ok(count),
        _ => Err(CompressError::StreamTooLong {
            length,
            max: MAX_STREAM_LEN,
        }),
    }
}

impl Compressor for HuffmanCompressor {
    fn compress(&self, reader: &mut dyn BitReader, writer: &mut dyn BitWriter) -> Result<()> {
        let length = reader.length();
        if length == 0 {
            return Ok(());
        }
        let count = checked_length(length)?;

        let code = self.calc_huffman_code(reader)?;
        debug!(
            length,
            symbols = code.symbol_count(),
            nodes = code.node_count(),
            "built Huffman code"
        );
        code.write_header(writer)?;
        writer.write_int(count)?;

        reader.reset()?;
        for _ in 0..count {
            let byte = reader
                .read_byte()?
                .ok_or(CompressError::UnexpectedEof("input byte"))?;
            code.encode(byte, writer)?;
        }

        writer.flush()
    }

    fn expand(&self, reader: &mut dyn BitReader, writer: &mut dyn BitWriter) -> Result<()> {
        if reader.length() == 0 {
            return Ok(());
        }

        let code = HuffmanCode::read_header(reader)?;
        let count = reader.read_int()?;
        let limit = self.config.stream_limit();
        if u64::from(count) > limit {
            return Err(CompressError::invalid_format(format!(
                "stream claims {} symbols, more than the limit of {}",
                count, limit
            )));
        }
        debug!(symbols = code.symbol_count(), count, "read Huffman header");

        for _ in 0..count {
            let byte = code.decode(reader)?;
            writer.write_byte(byte)?;
        }

        writer.flush()
    }

    fn config(&self) -> &CompressionConfig {
        &self.config
    }
}
