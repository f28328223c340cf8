//! Configuration for tez-compress

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CompressError, Result};

/// Smallest LZW table a code reader or writer accepts.
pub const MIN_LZW_TABLE_SIZE: u32 = 256;

/// Largest stream length the codecs handle (a signed 32-bit count).
pub const MAX_STREAM_LEN: u64 = i32::MAX as u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Initial capacity of the queue used while building a Huffman tree.
    pub queue_capacity: usize,
    /// Table size the LZW code stream starts from.
    pub lzw_initial_table_size: u32,
    /// Buffer capacity for file-backed streams.
    pub buffer_size: usize,
    /// Longest input accepted, in bytes.
    pub max_stream_len: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 11,
            lzw_initial_table_size: MIN_LZW_TABLE_SIZE,
            buffer_size: 64 * 1024,
            max_stream_len: MAX_STREAM_LEN,
        }
    }
}

impl CompressionConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(CompressError::invalid_argument(
                "queue capacity must be at least 1",
            ));
        }
        if self.lzw_initial_table_size < MIN_LZW_TABLE_SIZE {
            return Err(CompressError::invalid_argument(format!(
                "initial LZW table size {} is smaller than {}",
                self.lzw_initial_table_size, MIN_LZW_TABLE_SIZE
            )));
        }
        if self.buffer_size == 0 {
            return Err(CompressError::invalid_argument("buffer size must be non-zero"));
        }
        Ok(())
    }

    /// Effective stream length limit, never above a signed 32-bit count.
    pub fn stream_limit(&self) -> u64 {
        self.max_stream_len.min(MAX_STREAM_LEN)
    }
}
