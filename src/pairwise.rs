//! Per-pair match export: one file per ordered pair of datasets.
//!
//! Separate from the tiered overlay; it has its own precondition
//! ([`OverlapComplex::compute_pairwise_matches`]) and shares no state with it.

use crate::compare::{FusionComparator, MatchOptions};
use crate::error::{FusionError, Result};
use crate::fusion::FusionEvent;
use crate::output::TsvWriter;
use crate::overlap::{OverlapComplex, MERGED_NAME_JOIN};
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File naming for per-pair exports: `<prefix><A><join><basename(B)><suffix>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairwiseNaming {
    pub prefix: String,
    pub join: String,
    pub suffix: String,
}

impl Default for PairwiseNaming {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            join: MERGED_NAME_JOIN.to_string(),
            suffix: ".txt".to_string(),
        }
    }
}

impl PairwiseNaming {
    pub fn file_name(&self, a: &str, b: &str) -> String {
        let b = Path::new(b)
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| b.to_string());
        format!("{}{}{}{}{}", self.prefix, a, self.join, b, self.suffix)
    }
}

impl<C: FusionComparator> OverlapComplex<C> {
    /// Compare every pair of registered datasets and keep the matching pairs.
    ///
    /// Entry `[i][j]` holds `(event in i, event in j)` index pairs; the diagonal
    /// stays empty.
    pub fn compute_pairwise_matches(&mut self, options: MatchOptions) {
        let n = self.datasets.len();
        let mut matrix = vec![vec![Vec::new(); n]; n];

        for i in 0..n {
            for j in i + 1..n {
                let outcome = self
                    .comparator
                    .compare(&self.datasets[i], &self.datasets[j], options);
                matrix[j][i] = outcome.pairs.iter().map(|&(x, y)| (y, x)).collect();
                matrix[i][j] = outcome.pairs;
            }
        }

        self.pairwise = Some(matrix);
    }

    /// Matching pairs between datasets `i` and `j` (0-based), if computed.
    pub fn pairwise_matches(&self, i: usize, j: usize) -> Option<&[(usize, usize)]> {
        self.pairwise
            .as_ref()
            .and_then(|m| m.get(i))
            .and_then(|row| row.get(j))
            .map(Vec::as_slice)
    }

    /// Write one match file per ordered pair of datasets into `dir`.
    pub fn export_pairwise(&self, dir: &Path, naming: &PairwiseNaming) -> Result<Vec<PathBuf>> {
        let matrix = self
            .pairwise
            .as_ref()
            .ok_or(FusionError::MissingPairwiseMatches)?;
        let mut written = Vec::new();

        for (i, row) in matrix.iter().enumerate() {
            for (j, pairs) in row.iter().enumerate() {
                if i == j {
                    continue;
                }
                let a = &self.datasets[i];
                let b = &self.datasets[j];
                let path = dir.join(naming.file_name(&a.name, &b.name));
                info!("exporting: {}", naming.file_name(&a.name, &b.name));

                let mut out = TsvWriter::new(File::create(&path)?);
                write_pair_header(&mut out, &a.name, &b.name)?;
                for &(x, y) in pairs {
                    write_event(&mut out, &a.events()[x])?;
                    out.write_tab()?;
                    write_event(&mut out, &b.events()[y])?;
                    out.write_newline()?;
                }
                out.flush()?;
                written.push(path);
            }
        }

        Ok(written)
    }
}

fn write_pair_header<W: Write>(out: &mut TsvWriter<W>, a: &str, b: &str) -> Result<()> {
    let mut columns = Vec::with_capacity(6);
    for name in [a, b] {
        columns.push(format!("[{}]-position", name));
        columns.push(format!("[{}]-left-junction-associated-genes", name));
        columns.push(format!("[{}]-right-junction-associated-genes", name));
    }
    out.write_row(&columns)
}

fn write_event<W: Write>(out: &mut TsvWriter<W>, event: &FusionEvent) -> Result<()> {
    event.write_position(out)?;
    out.write_tab()?;
    out.write_joined(&event.left_genes, ";")?;
    out.write_tab()?;
    out.write_joined(&event.right_genes, ";")
}
