//! Pairwise fusion comparison by spanning genes.
//!
//! The overlap engine only sees the [`FusionComparator`] trait: given two
//! collections it gets back the merged collection, the matching pairs and the
//! ids of the events that were reconciled.

use crate::fusion::{FusionCollection, FusionEvent, MatchedSet};
use rayon::prelude::*;

/// Minimum number of candidate pairs before the search runs on the rayon pool.
/// Below this, thread dispatch costs more than the comparisons themselves.
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Result of comparing two collections.
#[derive(Debug, Clone, Default)]
pub struct ComparisonOutcome {
    /// Events present in both inputs, one per reconciled pair.
    pub merged: FusionCollection,
    /// Every matching `(index in a, index in b)` pair.
    pub pairs: Vec<(usize, usize)>,
    /// Ids of the events of either input that went into `merged`.
    pub matched: MatchedSet,
}

/// Matching flags forwarded by the engine to the comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Require identical gene sets instead of overlapping ones.
    pub exact_gene_match: bool,
    /// Only compare left-to-left and right-to-right.
    pub strand_specific: bool,
}

/// The comparison service consumed by the overlap engine.
pub trait FusionComparator {
    fn compare(
        &self,
        a: &FusionCollection,
        b: &FusionCollection,
        options: MatchOptions,
    ) -> ComparisonOutcome;
}

/// Matches fusions whose breakpoints are annotated with shared genes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanningGeneComparator;

impl SpanningGeneComparator {
    pub fn new() -> Self {
        Self
    }

    /// Gene lists for the merged event, oriented like `a`, if the two match.
    pub fn match_events(
        a: &FusionEvent,
        b: &FusionEvent,
        options: MatchOptions,
    ) -> Option<(Vec<String>, Vec<String>)> {
        if !a.has_genes() || !b.has_genes() {
            return None;
        }

        let forward = match_sides(
            &a.left_genes,
            &a.right_genes,
            &b.left_genes,
            &b.right_genes,
            options.exact_gene_match,
        );
        if forward.is_some() || options.strand_specific {
            return forward;
        }

        match_sides(
            &a.left_genes,
            &a.right_genes,
            &b.right_genes,
            &b.left_genes,
            options.exact_gene_match,
        )
    }

    fn candidates(
        a: &FusionCollection,
        b: &FusionCollection,
        options: MatchOptions,
    ) -> Vec<Vec<(usize, Vec<String>, Vec<String>)>> {
        let search = |ea: &FusionEvent| {
            b.iter()
                .enumerate()
                .filter_map(|(j, eb)| {
                    Self::match_events(ea, eb, options).map(|(left, right)| (j, left, right))
                })
                .collect::<Vec<_>>()
        };

        if a.len().saturating_mul(b.len()) < PARALLEL_THRESHOLD {
            a.iter().map(search).collect()
        } else {
            a.events().par_iter().map(search).collect()
        }
    }
}

impl FusionComparator for SpanningGeneComparator {
    fn compare(
        &self,
        a: &FusionCollection,
        b: &FusionCollection,
        options: MatchOptions,
    ) -> ComparisonOutcome {
        let candidates = Self::candidates(a, b, options);

        let mut merged = FusionCollection::new(format!("{}_vs._{}", a.name, b.name));
        let mut pairs = Vec::new();
        let mut matched = MatchedSet::default();
        let mut consumed = vec![false; b.len()];

        for (i, (ea, hits)) in a.iter().zip(candidates).enumerate() {
            let mut taken = false;
            for (j, left, right) in hits {
                pairs.push((i, j));
                if taken || consumed[j] {
                    continue;
                }

                let eb = &b.events()[j];
                merged.push(ea.merged_with(eb, left, right));
                matched.insert(ea.id());
                matched.insert(eb.id());
                consumed[j] = true;
                taken = true;
            }
        }

        ComparisonOutcome {
            merged,
            pairs,
            matched,
        }
    }
}

fn match_sides(
    a_left: &[String],
    a_right: &[String],
    b_left: &[String],
    b_right: &[String],
    exact: bool,
) -> Option<(Vec<String>, Vec<String>)> {
    let left = shared_genes(a_left, b_left, exact)?;
    let right = shared_genes(a_right, b_right, exact)?;
    Some((left, right))
}

/// Genes of `a` also present in `b`; `None` when they do not qualify as a match.
///
/// Gene lists are compared as sets: repeated names count once.
fn shared_genes(a: &[String], b: &[String], exact: bool) -> Option<Vec<String>> {
    let mut shared: Vec<String> = Vec::with_capacity(a.len());
    for gene in a {
        if b.contains(gene) && !shared.contains(gene) {
            shared.push(gene.clone());
        }
    }

    if exact {
        let same = !shared.is_empty() && b.iter().all(|g| shared.contains(g));
        return same.then_some(shared);
    }
    (!shared.is_empty()).then_some(shared)
}
