//! tez CLI - compress or expand a file with Huffman or LZW coding.
//!
//! `tez z c foo bar` runs LZW compression on `foo` and writes `bar`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use tez_compress::{CompressionConfig, CompressionMethod};

/// Lossless file compression with Huffman or LZW coding.
#[derive(Parser, Debug)]
#[command(name = "tez")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Compression method: h (Huffman) or z (LZW)
    #[arg(value_name = "METHOD")]
    method: CompressionMethod,

    /// c to compress, x to expand
    #[arg(value_name = "MODE", value_enum)]
    mode: Mode,

    /// File to read
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// File to write; a directory receives a file named after INPUT
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// JSON file with compression settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print sizes and timing to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Compress INPUT into OUTPUT
    #[value(name = "c")]
    Compress,
    /// Expand (decompress) INPUT into OUTPUT
    #[value(name = "x")]
    Expand,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CompressionConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CompressionConfig::default(),
    };
    let compressor = args.method.compressor(config)?;
    let output = resolve_output(&args.input, &args.output);

    let start = Instant::now();
    let outcome = match args.mode {
        Mode::Compress => compressor.compress_file(&args.input, &output),
        Mode::Expand => compressor.expand_file(&args.input, &output),
    };
    outcome.with_context(|| {
        format!(
            "Failed to {} {} into {}",
            args.mode.verb(),
            args.input.display(),
            output.display()
        )
    })?;
    let elapsed = start.elapsed();

    if args.verbose {
        let input_size = fs::metadata(&args.input)?.len();
        let output_size = fs::metadata(&output)?.len();
        eprintln!("Method: {}", args.method);
        eprintln!("Input:  {} ({} bytes)", args.input.display(), input_size);
        eprintln!("Output: {} ({} bytes)", output.display(), output_size);
        if input_size > 0 {
            eprintln!(
                "Ratio:  {:.1}%",
                output_size as f64 / input_size as f64 * 100.0
            );
        }
        eprintln!("Time:   {:.2?}", elapsed);
    }

    Ok(())
}

impl Mode {
    fn verb(self) -> &'static str {
        match self {
            Mode::Compress => "compress",
            Mode::Expand => "expand",
        }
    }
}

fn resolve_output(input: &Path, output: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) if output.is_dir() => output.join(name),
        _ => output.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from(["tez", "z", "c", "in.txt", "out.tez"]).unwrap();
        assert_eq!(args.method, CompressionMethod::Lzw);
        assert_eq!(args.mode, Mode::Compress);
        assert!(!args.verbose);

        let args = Args::try_parse_from(["tez", "h", "x", "a", "b", "--verbose"]).unwrap();
        assert_eq!(args.method, CompressionMethod::Huffman);
        assert_eq!(args.mode, Mode::Expand);
        assert!(args.verbose);
    }

    #[test]
    fn test_rejects_unknown_method_and_mode() {
        assert!(Args::try_parse_from(["tez", "q", "c", "a", "b"]).is_err());
        assert!(Args::try_parse_from(["tez", "h", "y", "a", "b"]).is_err());
        assert!(Args::try_parse_from(["tez", "h", "c", "a"]).is_err());
    }

    #[test]
    fn test_directory_output_takes_input_name() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_output(Path::new("some/where/data.bin"), dir.path());
        assert_eq!(resolved, dir.path().join("data.bin"));

        let file = dir.path().join("explicit.tez");
        assert_eq!(resolve_output(Path::new("data.bin"), &file), file);
    }
}
