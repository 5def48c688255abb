//! Reader for tab-separated fusion prediction files.
//!
//! One event per line:
//!
//! ```text
//! chrom_left  pos_left  chrom_right  pos_right  [strand_left  strand_right  [genes_left  genes_right]]
//! ```
//!
//! Gene columns are `;`-joined; `.` or an empty field means "not annotated".
//! Unannotated sides are filled from a [`GeneAnnotation`] when one is given.

use crate::annotation::GeneAnnotation;
use crate::error::{FusionError, Result};
use crate::fusion::{Breakpoint, FusionCollection, FusionEvent};
use crate::interval::Strand;
use log::debug;
use memchr::memchr_iter;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Streaming reader producing fusion events for one dataset.
pub struct FusionReader<'a, R: Read> {
    reader: BufReader<R>,
    dataset: usize,
    annotation: Option<&'a GeneAnnotation>,
    line_number: usize,
    ordinal: usize,
    buffer: String,
}

impl<'a, R: Read> FusionReader<'a, R> {
    /// Create a reader tagging events with the 1-based `dataset` index.
    pub fn new(reader: R, dataset: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            dataset,
            annotation: None,
            line_number: 0,
            ordinal: 0,
            buffer: String::with_capacity(256),
        }
    }

    /// Fill unannotated breakpoints from `annotation`.
    pub fn with_annotation(mut self, annotation: Option<&'a GeneAnnotation>) -> Self {
        self.annotation = annotation;
        self
    }

    /// Read the next fusion event.
    pub fn read_event(&mut self) -> Result<Option<FusionEvent>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let event = self.parse_line(line)?;
            self.ordinal += 1;
            return Ok(Some(event));
        }
    }

    fn parse_line(&self, line: &str) -> Result<FusionEvent> {
        let fields = split_tabs(line);

        if fields.len() < 4 {
            return Err(FusionError::Parse {
                line: self.line_number,
                message: format!("Expected at least 4 fields, got {}", fields.len()),
            });
        }

        let strand_at = |i: usize| fields.get(i).map_or(Strand::Unknown, |s| Strand::from_field(s));
        let left = Breakpoint::new(fields[0], self.parse_position(fields[1])?, strand_at(4));
        let right = Breakpoint::new(fields[2], self.parse_position(fields[3])?, strand_at(5));

        let mut left_genes = fields.get(6).map_or_else(Vec::new, |s| parse_genes(s));
        let mut right_genes = fields.get(7).map_or_else(Vec::new, |s| parse_genes(s));

        if let Some(annotation) = self.annotation {
            if left_genes.is_empty() {
                left_genes = annotation.genes_at_breakpoint(&left);
            }
            if right_genes.is_empty() {
                right_genes = annotation.genes_at_breakpoint(&right);
            }
        }

        Ok(FusionEvent::new(
            self.dataset,
            self.ordinal,
            left,
            right,
            left_genes,
            right_genes,
        ))
    }

    fn parse_position(&self, s: &str) -> Result<u64> {
        s.trim().parse().map_err(|_| FusionError::Parse {
            line: self.line_number,
            message: format!("Invalid breakpoint position: '{}'", s),
        })
    }

    /// Read every remaining event into a named collection.
    pub fn into_collection(mut self, name: impl Into<String>) -> Result<FusionCollection> {
        let mut collection = FusionCollection::new(name);
        while let Some(event) = self.read_event()? {
            collection.push(event);
        }
        debug!(
            "Read {} fusion events for '{}' ({} lines)",
            collection.len(),
            collection.name,
            self.line_number
        );
        Ok(collection)
    }
}

/// Split a line on tabs using memchr.
fn split_tabs(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(8);
    let mut start = 0;
    for tab in memchr_iter(b'\t', line.as_bytes()) {
        fields.push(&line[start..tab]);
        start = tab + 1;
    }
    fields.push(&line[start..]);
    fields
}

/// Gene names of a `;`-joined column, first occurrence kept.
fn parse_genes(field: &str) -> Vec<String> {
    let field = field.trim();
    if field == "." {
        return Vec::new();
    }

    let mut genes: Vec<String> = Vec::new();
    for gene in field.split(';').map(str::trim) {
        if !gene.is_empty() && !genes.iter().any(|g| g == gene) {
            genes.push(gene.to_string());
        }
    }
    genes
}

/// Read a fusion file as dataset `dataset` (1-based) named `name`.
pub fn read_fusions<P: AsRef<Path>>(
    path: P,
    name: &str,
    dataset: usize,
    annotation: Option<&GeneAnnotation>,
) -> Result<FusionCollection> {
    let file = File::open(path)?;
    FusionReader::new(file, dataset)
        .with_annotation(annotation)
        .into_collection(name)
}

/// Parse fusion events from a string (useful for testing).
pub fn parse_fusions(
    content: &str,
    name: &str,
    dataset: usize,
    annotation: Option<&GeneAnnotation>,
) -> Result<FusionCollection> {
    FusionReader::new(content.as_bytes(), dataset)
        .with_annotation(annotation)
        .into_collection(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bed::parse_genes as parse_gene_bed;

    #[test]
    fn test_parse_minimal_columns() {
        let content = "chr21\t39817544\tchr21\t42880008\n";
        let collection = parse_fusions(content, "A", 1, None).unwrap();

        assert_eq!(collection.len(), 1);
        let event = &collection.events()[0];
        assert_eq!(event.left.chrom, "chr21");
        assert_eq!(event.left.pos, 39817544);
        assert_eq!(event.right.pos, 42880008);
        assert_eq!(event.left.strand, Strand::Unknown);
        assert!(!event.has_genes());
    }

    #[test]
    fn test_parse_full_columns() {
        let content = "chr21\t100\tchr21\t900\t-\t+\tTMPRSS2\tERG;ERG-AS1\n";
        let collection = parse_fusions(content, "A", 2, None).unwrap();

        let event = &collection.events()[0];
        assert_eq!(event.left.strand, Strand::Minus);
        assert_eq!(event.right.strand, Strand::Plus);
        assert_eq!(event.left_genes, vec!["TMPRSS2"]);
        assert_eq!(event.right_genes, vec!["ERG", "ERG-AS1"]);
        assert_eq!(event.id().members(), &[(2, 0)]);
    }

    #[test]
    fn test_repeated_gene_names_collapsed() {
        let content = "chr1\t1\tchr2\t2\t+\t+\tX;X\tY; Z;Y\n";
        let collection = parse_fusions(content, "A", 1, None).unwrap();

        let event = &collection.events()[0];
        assert_eq!(event.left_genes, vec!["X"]);
        assert_eq!(event.right_genes, vec!["Y", "Z"]);
    }

    #[test]
    fn test_ordinals_skip_comments() {
        let content = "# header\nchr1\t1\tchr2\t2\n\nchr1\t3\tchr2\t4\n";
        let collection = parse_fusions(content, "A", 1, None).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.events()[1].id().members(), &[(1, 1)]);
    }

    #[test]
    fn test_annotation_fills_missing_genes() {
        let genes = parse_gene_bed("chr21\t0\t500\tTMPRSS2\nchr21\t800\t1000\tERG\n").unwrap();
        let annotation = GeneAnnotation::from_genes(genes);
        let content = "chr21\t100\tchr21\t900\t.\t.\t.\t.\n";

        let collection = parse_fusions(content, "A", 1, Some(&annotation)).unwrap();
        let event = &collection.events()[0];
        assert_eq!(event.left_genes, vec!["TMPRSS2"]);
        assert_eq!(event.right_genes, vec!["ERG"]);
    }

    #[test]
    fn test_too_few_fields() {
        let result = parse_fusions("chr1\t100\tchr2\n", "A", 1, None);
        assert!(matches!(result, Err(FusionError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_invalid_position() {
        let result = parse_fusions("chr1\t100\tchr2\t200\nchr1\tabc\tchr2\t200\n", "A", 1, None);
        match result {
            Err(FusionError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("abc"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
