//! Streaming BED parser for gene annotation files.

use crate::error::{FusionError, Result};
use crate::interval::{Interval, Strand};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A named gene region from a BED4+ record.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneRecord {
    pub interval: Interval,
    pub name: String,
    pub strand: Strand,
}

impl GeneRecord {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64, name: impl Into<String>) -> Self {
        Self {
            interval: Interval::new(chrom, start, end),
            name: name.into(),
            strand: Strand::Unknown,
        }
    }

    #[inline]
    pub fn chrom(&self) -> &str {
        &self.interval.chrom
    }

    #[inline]
    pub fn start(&self) -> u64 {
        self.interval.start
    }

    #[inline]
    pub fn end(&self) -> u64 {
        self.interval.end
    }
}

/// A streaming BED file reader.
pub struct BedReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: String,
}

impl BedReader<File> {
    /// Open a BED file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> BedReader<R> {
    /// Create a new BED reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: String::with_capacity(1024),
        }
    }

    /// Read the next gene record.
    pub fn read_record(&mut self) -> Result<Option<GeneRecord>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            // Skip empty lines and comments
            let line = self.buffer.trim();
            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with("track")
                || line.starts_with("browser")
            {
                continue;
            }

            return self.parse_line(line).map(Some);
        }
    }

    /// Parse a single BED line.
    fn parse_line(&self, line: &str) -> Result<GeneRecord> {
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() < 3 {
            return Err(FusionError::Parse {
                line: self.line_number,
                message: format!("Expected at least 3 fields, got {}", fields.len()),
            });
        }
        if fields.len() < 4 || fields[3].is_empty() {
            return Err(FusionError::InvalidFormat(format!(
                "gene annotation line {} has no name column",
                self.line_number
            )));
        }

        let start = self.parse_position(fields[1], "start")?;
        let end = self.parse_position(fields[2], "end")?;

        if start > end {
            return Err(FusionError::Parse {
                line: self.line_number,
                message: format!("Start ({}) > end ({})", start, end),
            });
        }

        let mut record = GeneRecord::new(fields[0], start, end, fields[3]);
        if fields.len() > 5 {
            record.strand = Strand::from_field(fields[5]);
        }

        Ok(record)
    }

    fn parse_position(&self, s: &str, field_name: &str) -> Result<u64> {
        s.parse().map_err(|_| FusionError::Parse {
            line: self.line_number,
            message: format!("Invalid {} position: '{}'", field_name, s),
        })
    }

    /// Get an iterator over all records.
    pub fn records(self) -> BedRecordIter<R> {
        BedRecordIter { reader: self }
    }
}

/// Iterator over gene records.
pub struct BedRecordIter<R: Read> {
    reader: BedReader<R>,
}

impl<R: Read> Iterator for BedRecordIter<R> {
    type Item = Result<GeneRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read all gene records from a BED file.
pub fn read_genes<P: AsRef<Path>>(path: P) -> Result<Vec<GeneRecord>> {
    let reader = BedReader::from_path(path)?;
    reader.records().collect()
}

/// Parse gene records from a string (useful for testing).
pub fn parse_genes(content: &str) -> Result<Vec<GeneRecord>> {
    BedReader::new(content.as_bytes()).records().collect()
}
