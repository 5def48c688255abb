//! Error type shared by readers, the overlap engine and the exporters.

use std::io;
use thiserror::Error;

/// Errors that can occur while loading datasets or computing overlaps.
#[derive(Error, Debug)]
pub enum FusionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A merge input was not present when its combination was processed.
    #[error("Combination '{0}' has no merged collection; tiers were processed out of order")]
    MissingCombination(String),

    #[error("Sparse mode discards merged collections and cannot be combined with list or extensive output")]
    SparseListExport,

    #[error("Pairwise matches have not been computed; run compute_pairwise_matches first")]
    MissingPairwiseMatches,
}

pub type Result<T> = std::result::Result<T, FusionError>;
