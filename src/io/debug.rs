//! A `BitWriter` that renders what it is given as text, for eyeballing headers.

use std::io::Write;

use super::{check_bit_count, BitWriter};
use crate::error::Result;

const TOKENS_PER_LINE: usize = 16;

/// Prints bits as `0 `/`1 `, bytes as lowercase hex, sixteen tokens per line.
pub struct DebugWriter<W: Write> {
    out: W,
    tokens: usize,
}

impl<W: Write> DebugWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, tokens: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn token(&mut self, text: std::fmt::Arguments<'_>) -> Result<()> {
        write!(self.out, "{} ", text)?;
        self.tokens += 1;
        if self.tokens % TOKENS_PER_LINE == 0 {
            writeln!(self.out)?;
        }
        Ok(())
    }
}

impl<W: Write> BitWriter for DebugWriter<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.token(format_args!("{}", u8::from(bit)))
    }

    fn write_bits(&mut self, value: u32, count: u32) -> Result<()> {
        check_bit_count(count)?;
        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.token(format_args!("{:x}", byte))
    }

    fn write_int(&mut self, value: u32) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Int: {} = {:x}", value, value)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut DebugWriter<Vec<u8>>)) -> String {
        let mut writer = DebugWriter::new(Vec::new());
        f(&mut writer);
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_bits_and_bytes() {
        let text = render(|w| {
            w.write_bits(0b101, 3).unwrap();
            w.write_byte(0xa0).unwrap();
            w.flush().unwrap();
        });
        assert_eq!(text, "1 0 1 a0 \n");
    }

    #[test]
    fn test_line_wrap() {
        let text = render(|w| w.write_bits(0xffff, 16).unwrap());
        assert_eq!(text, format!("{}\n", "1 ".repeat(16)));
    }

    #[test]
    fn test_int() {
        let text = render(|w| w.write_int(255).unwrap());
        assert_eq!(text, "\nInt: 255 = ff\n");
    }
}
