//! Multi-way overlap of fusion datasets over the combination lattice.
//!
//! Every subset of two or more datasets is merged bottom-up: the merge for
//! `{i1, …, ir}` is the comparison of the merge for `{i1, …, ir-1}` with the
//! single dataset `ir`. Tiers (all subsets of one size) are processed in
//! ascending size and, within a tier, in lexicographic order, so both inputs of
//! a merge always exist when it runs. The total number of comparisons is
//! `2^n - n - 1`.
//!
//! List output lags one tier behind the merges: the rows for tier `r - 1` are
//! written once tier `r` has finished, because only then is the set of events
//! that were carried into a larger combination known.

use crate::combinations::{combination_table, CombinationKey, Tier};
use crate::compare::{FusionComparator, MatchOptions, SpanningGeneComparator};
use crate::config::{OutputFormat, OverlapConfig};
use crate::error::{FusionError, Result};
use crate::fusion::{FusionCollection, MatchedSet};
use crate::output::TsvWriter;
use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Separator used when naming merged collections.
pub const MERGED_NAME_JOIN: &str = "_vs._";

/// Counters reported after an overlay run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayStats {
    pub tiers: usize,
    pub merges: usize,
    /// Largest number of merged/single collections held at once.
    pub peak_live_collections: usize,
    /// Collections dropped by the sparse reclaimer.
    pub reclaimed: usize,
    pub rows_written: usize,
}

impl fmt::Display for OverlayStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tiers={} merges={} peak_live={} reclaimed={} rows={}",
            self.tiers, self.merges, self.peak_live_collections, self.reclaimed, self.rows_written
        )
    }
}

/// Dataset registry plus the per-run merge state.
///
/// One instance per run; the intermediate collections and the size totals are
/// owned here and never shared across runs.
pub struct OverlapComplex<C: FusionComparator = SpanningGeneComparator> {
    pub(crate) datasets: Vec<Rc<FusionCollection>>,
    pub(crate) dataset_names: Vec<String>,
    /// Merged collection per combination. Pruned in sparse mode.
    results: FxHashMap<CombinationKey, Rc<FusionCollection>>,
    /// Event count per combination, singletons included. Never pruned.
    pub(crate) totals: FxHashMap<CombinationKey, usize>,
    pub(crate) comparator: C,
    pub(crate) pairwise: Option<Vec<Vec<Vec<(usize, usize)>>>>,
}

impl OverlapComplex<SpanningGeneComparator> {
    pub fn new() -> Self {
        Self::with_comparator(SpanningGeneComparator)
    }
}

impl Default for OverlapComplex<SpanningGeneComparator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FusionComparator> OverlapComplex<C> {
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            datasets: Vec::new(),
            dataset_names: Vec::new(),
            results: FxHashMap::default(),
            totals: FxHashMap::default(),
            comparator,
            pairwise: None,
        }
    }

    /// Register a dataset and return its 1-based index.
    pub fn add(&mut self, dataset: FusionCollection) -> usize {
        let index = self.datasets.len() + 1;
        debug!(
            "Registered dataset {} '{}' with {} events",
            index,
            dataset.name,
            dataset.len()
        );
        self.totals
            .insert(CombinationKey::single(index), dataset.len());
        self.dataset_names.push(dataset.name.clone());
        self.datasets.push(Rc::new(dataset));
        index
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn dataset_names(&self) -> &[String] {
        &self.dataset_names
    }

    /// Dataset by 1-based index.
    pub fn dataset(&self, index: usize) -> Option<&FusionCollection> {
        index
            .checked_sub(1)
            .and_then(|i| self.datasets.get(i))
            .map(|d| d.as_ref())
    }

    /// Event count recorded for a combination.
    pub fn total(&self, key: &CombinationKey) -> Option<usize> {
        self.totals.get(key).copied()
    }

    pub fn totals(&self) -> &FxHashMap<CombinationKey, usize> {
        &self.totals
    }

    /// Merged collection currently held for a combination.
    pub fn merged(&self, key: &CombinationKey) -> Option<&FusionCollection> {
        self.results.get(key).map(|c| c.as_ref())
    }

    /// Dataset names of a combination joined by `glue`.
    pub fn label(&self, key: &CombinationKey, glue: &str) -> String {
        key.indices()
            .iter()
            .filter_map(|&i| self.dataset_names.get(i - 1))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(glue)
    }

    /// Run every tier, keeping only counts and (unless sparse) collections.
    ///
    /// Use [`overlay_to_list`](Self::overlay_to_list) for list output.
    pub fn overlay(&mut self, config: &OverlapConfig) -> Result<OverlayStats> {
        if config.output_format == OutputFormat::List {
            return Err(FusionError::InvalidFormat(
                "list output needs a destination writer".to_string(),
            ));
        }
        self.run_tiers::<io::Sink>(config, None)
    }

    /// Run every tier, writing the fused event list to `out`.
    pub fn overlay_to_list<W: Write>(
        &mut self,
        config: &OverlapConfig,
        out: &mut TsvWriter<W>,
    ) -> Result<OverlayStats> {
        if config.output_format != OutputFormat::List {
            return Err(FusionError::InvalidFormat(format!(
                "list export requested with output format '{}'",
                config.output_format
            )));
        }
        self.run_tiers(config, Some(out))
    }

    fn run_tiers<W: Write>(
        &mut self,
        config: &OverlapConfig,
        mut list: Option<&mut TsvWriter<W>>,
    ) -> Result<OverlayStats> {
        config.validate()?;

        let n = self.datasets.len();
        let options = config.match_options();
        let mut stats = OverlayStats::default();

        self.results.clear();
        for (i, dataset) in self.datasets.iter().enumerate() {
            self.results
                .insert(CombinationKey::single(i + 1), Rc::clone(dataset));
        }
        stats.peak_live_collections = self.results.len();

        if let Some(out) = list.as_deref_mut() {
            self.write_list_header(out)?;
        }

        let table = combination_table(n);
        if table.is_empty() {
            info!("{} dataset(s) registered; nothing to overlap", n);
            if let Some(out) = list {
                out.flush()?;
            }
            return Ok(stats);
        }

        // Keys whose rows are written once the current tier has completed.
        let mut pending_export: Vec<CombinationKey> =
            (1..=n).map(CombinationKey::single).collect();

        for tier in &table {
            let size = tier.first().map_or(0, CombinationKey::len);
            info!("Merging {} combinations of {} datasets", tier.len(), size);

            if config.sparse {
                stats.reclaimed += self.reclaim(tier);
            }

            let mut matched = MatchedSet::default();
            for key in tier {
                self.merge(key, options, config, &mut matched)?;
                stats.merges += 1;
                stats.peak_live_collections = stats.peak_live_collections.max(self.results.len());
            }

            if let Some(out) = list.as_deref_mut() {
                stats.rows_written += self.export_keys(out, &pending_export, &matched)?;
            }
            pending_export = tier.clone();
            stats.tiers += 1;
        }

        if let Some(out) = list {
            stats.rows_written += self.export_keys(out, &pending_export, &MatchedSet::default())?;
            out.flush()?;
        }

        info!("Overlay finished: {}", stats);
        Ok(stats)
    }

    /// Merge `key` from its base combination and its last dataset.
    fn merge(
        &mut self,
        key: &CombinationKey,
        options: MatchOptions,
        config: &OverlapConfig,
        matched: &mut MatchedSet,
    ) -> Result<()> {
        let (base, tail) = key
            .split_last()
            .ok_or_else(|| FusionError::MissingCombination(key.to_string()))?;
        let a = self
            .results
            .get(&base)
            .ok_or_else(|| FusionError::MissingCombination(base.to_string()))?;
        let b = self
            .results
            .get(&tail)
            .ok_or_else(|| FusionError::MissingCombination(tail.to_string()))?;

        let outcome = self.comparator.compare(a, b, options);
        matched.extend(outcome.matched);

        let mut merged = outcome.merged;
        merged.name = self.label(key, MERGED_NAME_JOIN);
        debug!(
            "{} ({}): {} x {} -> {}",
            key,
            merged.name,
            a.len(),
            b.len(),
            merged.len()
        );

        if config.output_format == OutputFormat::Extensive {
            if let Some(dir) = &config.export_dir {
                merged.export_junctions(dir.join(format!("{}.junctions.txt", merged.name)))?;
            }
        }

        self.totals.insert(key.clone(), merged.len());
        self.results.insert(key.clone(), Rc::new(merged));
        Ok(())
    }

    /// Drop every held collection the upcoming tier does not read.
    fn reclaim(&mut self, tier: &Tier) -> usize {
        let keep: FxHashSet<CombinationKey> = tier
            .iter()
            .filter_map(CombinationKey::split_last)
            .flat_map(|(base, tail)| [base, tail])
            .collect();

        let before = self.results.len();
        self.results.retain(|key, _| keep.contains(key));
        let removed = before - self.results.len();
        debug!("Reclaimed {} collections, {} kept", removed, self.results.len());
        removed
    }

    fn write_list_header<W: Write>(&self, out: &mut TsvWriter<W>) -> Result<()> {
        out.write_str("Left-genes\tRight-genes")?;
        for name in &self.dataset_names {
            out.write_tab()?;
            out.write_str(name)?;
        }
        out.write_newline()
    }

    fn export_keys<W: Write>(
        &self,
        out: &mut TsvWriter<W>,
        keys: &[CombinationKey],
        matched: &MatchedSet,
    ) -> Result<usize> {
        let mut rows = 0;
        for key in keys {
            let collection = self
                .results
                .get(key)
                .ok_or_else(|| FusionError::MissingCombination(key.to_string()))?;
            rows += collection.export_list(out, &self.dataset_names, matched)?;
        }
        Ok(rows)
    }
}
