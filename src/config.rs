//! Run configuration for an overlap computation.
//!
//! One [`OverlapConfig`] is built per run (by the CLI or a library caller)
//! and passed by reference to the engine; nothing here is process-global.

use crate::compare::MatchOptions;
use crate::error::{FusionError, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// What the overlap run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One row per fusion, at the largest combination it was found in.
    List,
    /// Triangular table of intersection counts and percentages.
    #[default]
    Summary,
    /// Summary table plus a junction file per merged combination.
    Extensive,
}

impl FromStr for OutputFormat {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(OutputFormat::List),
            "summary" => Ok(OutputFormat::Summary),
            "extensive" => Ok(OutputFormat::Extensive),
            other => Err(FusionError::InvalidFormat(format!(
                "Invalid output format '{}'. Use: list, summary, extensive",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::List => "list",
            OutputFormat::Summary => "summary",
            OutputFormat::Extensive => "extensive",
        };
        write!(f, "{}", name)
    }
}

/// Options for one overlap run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapConfig {
    /// Drop merged collections once no later tier reads them.
    pub sparse: bool,
    pub output_format: OutputFormat,
    pub exact_gene_match: bool,
    pub strand_specific: bool,
    /// Directory for per-combination junction files (extensive output).
    pub export_dir: Option<PathBuf>,
}

impl OverlapConfig {
    pub fn new(output_format: OutputFormat) -> Self {
        Self {
            output_format,
            ..Self::default()
        }
    }

    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn with_exact_gene_match(mut self, egm: bool) -> Self {
        self.exact_gene_match = egm;
        self
    }

    pub fn with_strand_specific(mut self, strand_specific: bool) -> Self {
        self.strand_specific = strand_specific;
        self
    }

    pub fn with_export_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.export_dir = dir;
        self
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            exact_gene_match: self.exact_gene_match,
            strand_specific: self.strand_specific,
        }
    }

    /// Reject combinations the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.sparse && self.output_format != OutputFormat::Summary {
            return Err(FusionError::SparseListExport);
        }
        if self.output_format == OutputFormat::Extensive && self.export_dir.is_none() {
            return Err(FusionError::InvalidFormat(
                "extensive output requires an export directory".to_string(),
            ));
        }
        Ok(())
    }
}
