//! LZW compression and decompression
//!
//! The stream is nothing but variable-width codes (see [`codec`]). Both
//! dictionaries start from the 256 single-byte sequences and grow by one
//! entry per code, so the decoder rebuilds the encoder's table in lock-step.
//! There are no clear or stop codes; the stream ends when its bits run out.

pub mod codec;

use std::collections::HashMap;

use tracing::debug;

use crate::config::CompressionConfig;
use crate::error::{CompressError, Result};
use crate::io::{BitReader, BitWriter};
use crate::Compressor;

pub use codec::{ceil_log2, code_width, CodeReader, CodeWriter};

/// Number of single-byte sequences every dictionary starts with.
const ALPHABET_SIZE: u32 = 256;

fn seed_compress_dict() -> HashMap<Vec<u8>, u32> {
    (0..ALPHABET_SIZE).map(|code| (vec![code as u8], code)).collect()
}

fn seed_expand_dict() -> Vec<Vec<u8>> {
    (0..ALPHABET_SIZE).map(|code| vec![code as u8]).collect()
}

#[derive(Debug, Clone, Default)]
pub struct LzwCompressor {
    config: CompressionConfig,
}

impl LzwCompressor {
    pub fn new(config: CompressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Compressor for LzwCompressor {
    fn compress(&self, reader: &mut dyn BitReader, writer: &mut dyn BitWriter) -> Result<()> {
        let mut dict = seed_compress_dict();
        let mut codes = CodeWriter::new(writer, self.config.lzw_initial_table_size)?;
        let mut emitted = 0u64;

        // longest known sequence so far and its code
        let mut current: Vec<u8> = Vec::new();
        let mut current_code: Option<u32> = None;

        while let Some(byte) = reader.read_byte()? {
            current.push(byte);
            if let Some(&code) = dict.get(&current) {
                current_code = Some(code);
                continue;
            }

            if let Some(code) = current_code {
                codes.write_code(code)?;
                emitted += 1;
            }
            let next = u32::try_from(dict.len())
                .map_err(|_| CompressError::invalid_argument("LZW dictionary overflow"))?;
            dict.insert(std::mem::take(&mut current), next);

            current.push(byte);
            current_code = Some(u32::from(byte));
        }

        if let Some(code) = current_code {
            codes.write_code(code)?;
            emitted += 1;
        }

        debug!(
            input = reader.length(),
            codes = emitted,
            dictionary = dict.len(),
            "LZW compress finished"
        );
        codes.flush()
    }

    fn expand(&self, reader: &mut dyn BitReader, writer: &mut dyn BitWriter) -> Result<()> {
        let mut dict = seed_expand_dict();
        let mut codes = CodeReader::new(reader, self.config.lzw_initial_table_size)?;
        let mut previous: Option<Vec<u8>> = None;

        while let Some(code) = codes.read_code()? {
            let index = code as usize;
            let entry = match (dict.get(index), &previous) {
                (Some(known), _) => known.clone(),
                // the code for the entry this very step is about to create
                (None, Some(prev)) if index == dict.len() => {
                    let mut entry = prev.clone();
                    entry.push(prev[0]);
                    entry
                }
                _ => {
                    return Err(CompressError::invalid_format(format!(
                        "LZW code {} is neither known nor the next code {}",
                        code,
                        dict.len()
                    )))
                }
            };

            writer.write_bytes(&entry)?;
            if let Some(mut grown) = previous.take() {
                grown.push(entry[0]);
                dict.push(grown);
            }
            previous = Some(entry);
        }

        debug!(dictionary = dict.len(), "LZW expand finished");
        writer.flush()
    }

    fn config(&self) -> &CompressionConfig {
        &self.config
    }
}
