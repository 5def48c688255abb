// Clippy allows for the whole crate
#![allow(clippy::type_complexity)]

//! Multi-way overlap of gene-fusion prediction datasets.
//!
//! Fusion predictions from several tools are reconciled by the genes their
//! breakpoints fall in. Every combination of two or more datasets is merged
//! bottom-up over the combination lattice and reported either as a fused
//! event list or as a triangular table of intersection sizes.
//!
//! # Example
//!
//! ```rust,no_run
//! use fusion_overlap::prelude::*;
//!
//! let genes = GeneAnnotation::from_path("genes.bed").unwrap();
//! let mut complex = OverlapComplex::new();
//! complex.add(read_fusions("defuse.txt", "defuse", 1, Some(&genes)).unwrap());
//! complex.add(read_fusions("star.txt", "star", 2, Some(&genes)).unwrap());
//!
//! let config = OverlapConfig::new(OutputFormat::Summary).with_sparse(true);
//! complex.overlay(&config).unwrap();
//! complex.export_summary(&OutputTarget::Stdout).unwrap();
//! ```

pub mod annotation;
pub mod bed;
pub mod combinations;
pub mod compare;
pub mod config;
pub mod error;
pub mod fusion;
pub mod interval;
pub mod output;
pub mod overlap;
pub mod pairwise;
pub mod reader;
pub mod summary;

// Re-export commonly used types
pub use annotation::GeneAnnotation;
pub use combinations::{combination_table, CombinationKey};
pub use compare::{ComparisonOutcome, FusionComparator, MatchOptions, SpanningGeneComparator};
pub use config::{OutputFormat, OverlapConfig};
pub use error::{FusionError, Result};
pub use fusion::{Breakpoint, EventId, FusionCollection, FusionEvent, MatchedSet};
pub use overlap::{OverlapComplex, OverlayStats};
pub use reader::read_fusions;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::annotation::GeneAnnotation;
    pub use crate::combinations::{combination_table, CombinationKey};
    pub use crate::compare::{FusionComparator, MatchOptions, SpanningGeneComparator};
    pub use crate::config::{OutputFormat, OverlapConfig};
    pub use crate::fusion::{Breakpoint, FusionCollection, FusionEvent};
    pub use crate::output::{OutputTarget, TsvWriter};
    pub use crate::overlap::OverlapComplex;
    pub use crate::pairwise::PairwiseNaming;
    pub use crate::reader::{parse_fusions, read_fusions};
}
