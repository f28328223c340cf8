//! Variable-width LZW code stream.
//!
//! Before every code the width is recomputed as `ceil(log2(table_size))`;
//! after every code the table size grows by one. Reader and writer start
//! from the same table size, so the widths never need to be stored.

use tracing::trace;

use crate::config::MIN_LZW_TABLE_SIZE;
use crate::error::{CompressError, Result};
use crate::io::{BitReader, BitWriter, MAX_BITS};

/// `ceil(log2(x))`. Fails for zero.
pub fn ceil_log2(x: u32) -> Result<u32> {
    if x == 0 {
        return Err(CompressError::invalid_argument(
            "attempted to take the log of zero",
        ));
    }
    Ok(u32::BITS - (x - 1).leading_zeros())
}

/// Code width for a table of `table_size` entries.
pub fn code_width(table_size: u32) -> Result<u32> {
    let width = ceil_log2(table_size)?;
    if width > MAX_BITS {
        return Err(CompressError::invalid_argument(format!(
            "a table of {} entries needs {}-bit codes, more than {}",
            table_size, width, MAX_BITS
        )));
    }
    Ok(width)
}

fn check_table_size(initial_table_size: u32) -> Result<()> {
    if initial_table_size < MIN_LZW_TABLE_SIZE {
        return Err(CompressError::invalid_argument(format!(
            "initial table size {} is smaller than {}",
            initial_table_size, MIN_LZW_TABLE_SIZE
        )));
    }
    Ok(())
}

fn grow(table_size: u32, width: u32) -> Result<u32> {
    let next = table_size
        .checked_add(1)
        .ok_or_else(|| CompressError::invalid_argument("LZW table size overflow"))?;
    let next_width = ceil_log2(next)?;
    if next_width > width {
        trace!(table_size = next, width = next_width, "LZW code width grows");
    }
    Ok(next)
}

/// Writes codes without clear or stop codes.
pub struct CodeWriter<'a, W: BitWriter + ?Sized> {
    writer: &'a mut W,
    table_size: u32,
}

impl<'a, W: BitWriter + ?Sized> CodeWriter<'a, W> {
    pub fn new(writer: &'a mut W, initial_table_size: u32) -> Result<Self> {
        check_table_size(initial_table_size)?;
        Ok(Self {
            writer,
            table_size: initial_table_size,
        })
    }

    /// Fails with `InvalidArgument` if `code` is not below the table size.
    pub fn write_code(&mut self, code: u32) -> Result<()> {
        if code >= self.table_size {
            return Err(CompressError::invalid_argument(format!(
                "code {} is out of range for table size {}",
                code, self.table_size
            )));
        }
        let width = code_width(self.table_size)?;
        self.writer.write_bits(code, width)?;
        self.table_size = grow(self.table_size, width)?;
        Ok(())
    }

    pub fn table_size(&self) -> u32 {
        self.table_size
    }

    /// Width the next code will be written with.
    pub fn width(&self) -> Result<u32> {
        code_width(self.table_size)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }
}

pub struct CodeReader<'a, R: BitReader + ?Sized> {
    reader: &'a mut R,
    table_size: u32,
}

impl<'a, R: BitReader + ?Sized> CodeReader<'a, R> {
    pub fn new(reader: &'a mut R, initial_table_size: u32) -> Result<Self> {
        check_table_size(initial_table_size)?;
        Ok(Self {
            reader,
            table_size: initial_table_size,
        })
    }

    /// Next code, or `None` once fewer bits remain than the current width.
    pub fn read_code(&mut self) -> Result<Option<u32>> {
        let width = code_width(self.table_size)?;
        let Some(code) = self.reader.read_bits(width)? else {
            return Ok(None);
        };
        self.table_size = grow(self.table_size, width)?;
        Ok(Some(code))
    }

    pub fn table_size(&self) -> u32 {
        self.table_size
    }
}
