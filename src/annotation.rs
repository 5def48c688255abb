//! Gene annotation lookup for fusion breakpoints.

use crate::bed::{read_genes, GeneRecord};
use crate::error::Result;
use crate::fusion::Breakpoint;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Per-chromosome gene index answering "which genes cover chrom:pos".
///
/// Genes are sorted by start; together with the longest gene length on the
/// chromosome this bounds the backwards scan from the query position.
#[derive(Debug, Default)]
pub struct GeneAnnotation {
    genes_by_chrom: FxHashMap<String, ChromGenes>,
    len: usize,
}

#[derive(Debug, Default)]
struct ChromGenes {
    genes: Vec<GeneRecord>,
    max_len: u64,
}

impl GeneAnnotation {
    /// Create a new empty annotation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load genes from a BED4+ file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_genes(read_genes(path)?))
    }

    /// Build an index from gene records.
    pub fn from_genes(genes: Vec<GeneRecord>) -> Self {
        let len = genes.len();
        let mut by_chrom: FxHashMap<String, ChromGenes> = FxHashMap::default();

        for gene in genes {
            let entry = by_chrom.entry(gene.chrom().to_string()).or_default();
            entry.max_len = entry.max_len.max(gene.interval.len());
            entry.genes.push(gene);
        }

        // Sort each chromosome's genes by start position
        for chrom_genes in by_chrom.values_mut() {
            chrom_genes.genes.sort_by(|a, b| a.interval.cmp(&b.interval));
        }

        Self {
            genes_by_chrom: by_chrom,
            len,
        }
    }

    /// Names of all genes whose interval contains `pos`, ordered by start.
    pub fn genes_at(&self, chrom: &str, pos: u64) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();

        if let Some(chrom_genes) = self.genes_by_chrom.get(chrom) {
            let genes = &chrom_genes.genes;
            // First gene starting after pos
            let upper = genes.partition_point(|g| g.start() <= pos);
            let lower_bound = pos.saturating_sub(chrom_genes.max_len);

            let mut hits: Vec<&GeneRecord> = genes[..upper]
                .iter()
                .rev()
                .take_while(|g| g.start() >= lower_bound)
                .filter(|g| g.interval.contains(chrom, pos))
                .collect();
            hits.reverse();

            for gene in hits {
                if !names.contains(&gene.name) {
                    names.push(gene.name.clone());
                }
            }
        }

        names
    }

    /// Genes covering a fusion breakpoint.
    pub fn genes_at_breakpoint(&self, breakpoint: &Breakpoint) -> Vec<String> {
        self.genes_at(&breakpoint.chrom, breakpoint.pos)
    }

    /// Get the total number of genes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the annotation is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
