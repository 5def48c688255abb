//! Buffered tab-separated output shared by every exporter.
//!
//! Uses itoa for integer formatting and ryu for float formatting
//! to avoid allocation while writing rows.

use crate::error::{FusionError, Result};
use log::info;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Buffer size for TsvWriter (1MB default).
const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Sentinel accepted wherever an output path is expected.
pub const STDOUT_SENTINEL: &str = "-";

/// Tab-separated text writer.
pub struct TsvWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    ryu_buf: ryu::Buffer,
}

impl<W: Write> TsvWriter<W> {
    /// Create a new TsvWriter with default 1MB buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    /// Create a new TsvWriter with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            ryu_buf: ryu::Buffer::new(),
        }
    }

    /// Write a string field.
    #[inline]
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.writer.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Write a tab character.
    #[inline]
    pub fn write_tab(&mut self) -> Result<()> {
        self.writer.write_all(b"\t")?;
        Ok(())
    }

    /// Write a newline character.
    #[inline]
    pub fn write_newline(&mut self) -> Result<()> {
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write an integer using itoa.
    #[inline]
    pub fn write_int<I: itoa::Integer>(&mut self, n: I) -> Result<()> {
        self.writer.write_all(self.itoa_buf.format(n).as_bytes())?;
        Ok(())
    }

    /// Write a float in its shortest round-trip form (`40.0`, `33.33`).
    #[inline]
    pub fn write_float(&mut self, f: f64) -> Result<()> {
        self.writer.write_all(self.ryu_buf.format(f).as_bytes())?;
        Ok(())
    }

    /// Write items separated by `sep`, with no trailing separator.
    pub fn write_joined<S: AsRef<str>>(&mut self, items: &[S], sep: &str) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(sep.as_bytes())?;
            }
            self.writer.write_all(item.as_ref().as_bytes())?;
        }
        Ok(())
    }

    /// Write a full row of string fields followed by a newline.
    pub fn write_row<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        self.write_joined(fields, "\t")?;
        self.write_newline()
    }

    /// Write `chrom:pos`.
    #[inline]
    pub fn write_locus(&mut self, chrom: &str, pos: u64) -> Result<()> {
        self.write_str(chrom)?;
        self.writer.write_all(b":")?;
        self.write_int(pos)
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Where a table is written: a file path, or standard output for `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Open the target for writing. The returned handle is closed on drop.
    pub fn open(&self) -> Result<Box<dyn Write>> {
        match self {
            OutputTarget::Stdout => Ok(Box::new(io::stdout().lock())),
            OutputTarget::File(path) => {
                info!("Putting output into: {}", path.display());
                Ok(Box::new(File::create(path)?))
            }
        }
    }

    /// Open the target wrapped in a [`TsvWriter`].
    pub fn writer(&self) -> Result<TsvWriter<Box<dyn Write>>> {
        Ok(TsvWriter::new(self.open()?))
    }
}

impl FromStr for OutputTarget {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Err(FusionError::InvalidFormat(
                "empty output path (use - for stdout)".to_string(),
            )),
            STDOUT_SENTINEL => Ok(OutputTarget::Stdout),
            path => Ok(OutputTarget::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "{}", STDOUT_SENTINEL),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}
